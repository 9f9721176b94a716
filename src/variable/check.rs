use crate::{
  tensor::Tensor,
  variable::Variable,
  scalar::Real,
  config::no_grad,
  error::Result,
};


/// Central difference of `f` at `x`, shifting every element by `eps` at once.
///
/// Returns `(f(x + eps) - f(x - eps)) / 2eps`. This is only the derivative of
/// `f` when `f` works elementwise. The evaluations are not recorded.

pub fn numerical_diff<T, F>(f: F, x: &Variable<T>, eps: T) -> Result<Tensor<T>>
where
  T: Real,
  F: Fn(&Variable<T>) -> Result<Variable<T>>,
{
  let _guard = no_grad();
  let two = T::one() + T::one();
  let prev = f(&Variable::new(x.data().map(|a| a - eps )))?;
  let next = f(&Variable::new(x.data().map(|a| a + eps )))?;
  Ok(Tensor::sub(next.data(), prev.data())?.scale(T::one() / (two * eps)))
}


/// Compute a function's gradient with respect to `input` numerically
/// and compare it to the automatically derived solution.
///
/// Each element of `input` is perturbed on its own, and the outputs of
/// `f` are summed, so `f` does not have to be elementwise. Returns the
/// largest absolute difference between both gradients.

pub fn check_gradients<T, F>(f: F, input: &Tensor<T>, eps: T) -> Result<T>
where
  T: Real,
  F: Fn(&Variable<T>) -> Result<Variable<T>>,
{
  let two = T::one() + T::one();

  // Compute gradient using auto diff
  let var = input.tracked();
  f(&var)?.backward()?;
  let grad = var.grad().unwrap_or_else(|| Tensor::zeros_like(input) );

  // Compute gradient numerically for every element of input
  let _guard = no_grad();
  let shifted = |i: usize, delta: T| {
    let mut data = input.raw().to_vec();
    data[i] += delta;
    Tensor::from_parts(input.shape().clone(), data).tracked()
  };
  let mut numeric = Vec::with_capacity(input.size());
  for i in 0..input.size() {
    let next = f(&shifted(i, eps))?.data().sum();
    let prev = f(&shifted(i, -eps))?.data().sum();
    numeric.push((next - prev) / (two * eps));
  }
  let numeric = Tensor::from_parts(input.shape().clone(), numeric);

  grad.max_abs_diff(&numeric)
}
