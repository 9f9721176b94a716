use crate::{
  tensor::Tensor,
  variable::{ Variable, Function, Outputs },
  scalar::Real,
  error::{ Error, Result },
  ops,
};


fn unary<'a, T: Real>(op: &'static str, inputs: &'a [Tensor<T>]) -> Result<&'a Tensor<T>> {
  match inputs {
    [x] => Ok(x),
    _ => Err(Error::ArityMismatch { op, what: "inputs", expected: 1, got: inputs.len() }),
  }
}

fn binary<'a, T: Real>(op: &'static str, inputs: &'a [Tensor<T>]) -> Result<(&'a Tensor<T>, &'a Tensor<T>)> {
  match inputs {
    [x0, x1] => Ok((x0, x1)),
    _ => Err(Error::ArityMismatch { op, what: "inputs", expected: 2, got: inputs.len() }),
  }
}

fn grad<'a, T: Real>(op: &'static str, grads: &'a [Tensor<T>]) -> Result<&'a Tensor<T>> {
  match grads {
    [gy] => Ok(gy),
    _ => Err(Error::ArityMismatch { op, what: "output gradients", expected: 1, got: grads.len() }),
  }
}


#[derive(Debug, Clone, Copy, Default)]
pub struct Neg;

impl Neg {
  const NAME: &'static str = "neg";
}

impl<T: Real> Function<T> for Neg {
  fn name(&self) -> &'static str { Self::NAME }

  fn forward(&self, inputs: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    Ok(unary(Self::NAME, inputs)?.neg().into())
  }

  fn backward(&self, _inputs: &[Tensor<T>], grads: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    Ok(grad(Self::NAME, grads)?.neg().into())
  }
}


#[derive(Debug, Clone, Copy, Default)]
pub struct Square;

impl Square {
  const NAME: &'static str = "square";
}

impl<T: Real> Function<T> for Square {
  fn name(&self) -> &'static str { Self::NAME }

  fn forward(&self, inputs: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    Ok(unary(Self::NAME, inputs)?.sqr().into())
  }

  fn backward(&self, inputs: &[Tensor<T>], grads: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    let x = unary(Self::NAME, inputs)?;
    let gy = grad(Self::NAME, grads)?;
    let two = T::one() + T::one();
    Ok(Tensor::mul(&x.scale(two), gy)?.into())
  }
}


/// Raise to a constant power.

#[derive(Debug, Clone, Copy)]
pub struct Pow<T: Real> {
  pub c: T,
}

impl<T: Real> Pow<T> {
  const NAME: &'static str = "pow";
}

impl<T: Real> Function<T> for Pow<T> {
  fn name(&self) -> &'static str { Self::NAME }

  fn forward(&self, inputs: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    Ok(unary(Self::NAME, inputs)?.powf(self.c).into())
  }

  fn backward(&self, inputs: &[Tensor<T>], grads: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    let x = unary(Self::NAME, inputs)?;
    let gy = grad(Self::NAME, grads)?;
    Ok(Tensor::mul(&x.powf(self.c - T::one()).scale(self.c), gy)?.into())
  }
}


#[derive(Debug, Clone, Copy, Default)]
pub struct Exp;

impl Exp {
  const NAME: &'static str = "exp";
}

impl<T: Real> Function<T> for Exp {
  fn name(&self) -> &'static str { Self::NAME }

  fn forward(&self, inputs: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    Ok(unary(Self::NAME, inputs)?.exp().into())
  }

  fn backward(&self, inputs: &[Tensor<T>], grads: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    let x = unary(Self::NAME, inputs)?;
    let gy = grad(Self::NAME, grads)?;
    Ok(Tensor::mul(&x.exp(), gy)?.into())
  }
}


#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

impl Add {
  const NAME: &'static str = "add";
}

impl<T: Real> Function<T> for Add {
  fn name(&self) -> &'static str { Self::NAME }

  fn forward(&self, inputs: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    let (x0, x1) = binary(Self::NAME, inputs)?;
    Ok(x0.add(x1)?.into())
  }

  fn backward(&self, _inputs: &[Tensor<T>], grads: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    let gy = grad(Self::NAME, grads)?;
    Ok((gy.clone(), gy.clone()).into())
  }
}


#[derive(Debug, Clone, Copy, Default)]
pub struct Sub;

impl Sub {
  const NAME: &'static str = "sub";
}

impl<T: Real> Function<T> for Sub {
  fn name(&self) -> &'static str { Self::NAME }

  fn forward(&self, inputs: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    let (x0, x1) = binary(Self::NAME, inputs)?;
    Ok(x0.sub(x1)?.into())
  }

  fn backward(&self, _inputs: &[Tensor<T>], grads: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    let gy = grad(Self::NAME, grads)?;
    Ok((gy.clone(), gy.neg()).into())
  }
}


#[derive(Debug, Clone, Copy, Default)]
pub struct Mul;

impl Mul {
  const NAME: &'static str = "mul";
}

impl<T: Real> Function<T> for Mul {
  fn name(&self) -> &'static str { Self::NAME }

  fn forward(&self, inputs: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    let (x0, x1) = binary(Self::NAME, inputs)?;
    Ok(x0.mul(x1)?.into())
  }

  fn backward(&self, inputs: &[Tensor<T>], grads: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    let (x0, x1) = binary(Self::NAME, inputs)?;
    let gy = grad(Self::NAME, grads)?;
    Ok((gy.mul(x1)?, gy.mul(x0)?).into())
  }
}


#[derive(Debug, Clone, Copy, Default)]
pub struct Div;

impl Div {
  const NAME: &'static str = "div";
}

impl<T: Real> Function<T> for Div {
  fn name(&self) -> &'static str { Self::NAME }

  fn forward(&self, inputs: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    let (x0, x1) = binary(Self::NAME, inputs)?;
    Ok(x0.div(x1)?.into())
  }

  fn backward(&self, inputs: &[Tensor<T>], grads: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    let (x0, x1) = binary(Self::NAME, inputs)?;
    let gy = grad(Self::NAME, grads)?;
    let gx0 = gy.div(x1)?;
    let gx1 = gy.mul(&Tensor::div(&x0.neg(), &x1.sqr())?)?;
    Ok((gx0, gx1).into())
  }
}


impl<T: Real> Variable<T> {
  pub fn square(&self) -> Result<Self> {
    ops::square(self)
  }

  pub fn exp(&self) -> Result<Self> {
    ops::exp(self)
  }

  pub fn powf(&self, c: T) -> Result<Self> {
    ops::pow(self, c)
  }
}


// Operators panic where the functions in ops return an error

fn expect_op<T: Real>(result: Result<Variable<T>>) -> Variable<T> {
  result.unwrap_or_else(|err| panic!("{err}") )
}

impl<T: Real> std::ops::Neg for &Variable<T> {
  type Output = Variable<T>;

  fn neg(self) -> Self::Output {
    expect_op(ops::neg(self))
  }
}

impl<T: Real> std::ops::Neg for Variable<T> {
  type Output = Variable<T>;

  fn neg(self) -> Self::Output {
    -&self
  }
}

macro_rules! add_operator {
  (@reflected $op:ident, $meth:ident, $symbol:tt, $t:ty) => {
    impl std::ops::$op<&Variable<$t>> for $t { // T * &var
      type Output = Variable<$t>;

      fn $meth(self, rhs: &Variable<$t>) -> Variable<$t> {
        &Variable::scalar(self) $symbol rhs
      }
    }

    impl std::ops::$op<Variable<$t>> for $t { // T * var
      type Output = Variable<$t>;

      fn $meth(self, rhs: Variable<$t>) -> Variable<$t> {
        &Variable::scalar(self) $symbol &rhs
      }
    }
  };

  ($op:ident, $meth:ident, $symbol:tt) => {
    impl<T: Real> std::ops::$op for &Variable<T> { // &var * &other
      type Output = Variable<T>;

      fn $meth(self, rhs: Self) -> Variable<T> {
        expect_op(ops::$meth(self, rhs))
      }
    }

    impl<T: Real> std::ops::$op for Variable<T> { // var * other
      type Output = Variable<T>;

      fn $meth(self, rhs: Self) -> Variable<T> {
        &self $symbol &rhs
      }
    }

    impl<T: Real> std::ops::$op<Variable<T>> for &Variable<T> { // &var * other
      type Output = Variable<T>;

      fn $meth(self, rhs: Variable<T>) -> Variable<T> {
        self $symbol &rhs
      }
    }

    impl<T: Real> std::ops::$op<&Variable<T>> for Variable<T> { // var * &other
      type Output = Variable<T>;

      fn $meth(self, rhs: &Variable<T>) -> Variable<T> {
        &self $symbol rhs
      }
    }

    impl<T: Real> std::ops::$op<T> for &Variable<T> { // &var * T
      type Output = Variable<T>;

      fn $meth(self, rhs: T) -> Variable<T> {
        self $symbol &Variable::scalar(rhs)
      }
    }

    impl<T: Real> std::ops::$op<T> for Variable<T> { // var * T
      type Output = Variable<T>;

      fn $meth(self, rhs: T) -> Variable<T> {
        &self $symbol &Variable::scalar(rhs)
      }
    }

    add_operator!(@reflected $op, $meth, $symbol, f32);
    add_operator!(@reflected $op, $meth, $symbol, f64);
  };
}

add_operator!(Add, add, +);
add_operator!(Sub, sub, -);
add_operator!(Mul, mul, *);
add_operator!(Div, div, /);


#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;

  use super::*;
  use crate::{ Shape, check_gradients };

  fn grad_of(var: &Variable<f64>) -> f64 {
    var.grad().unwrap().item().unwrap()
  }

  #[test]
  fn forward() {
    let x0 = Variable::scalar(2.0);
    let x1 = Variable::scalar(5.0);
    assert_eq!(ops::add(&x0, &x1).unwrap().item(), Ok(7.0));
    assert_eq!(ops::sub(&x0, &x1).unwrap().item(), Ok(-3.0));
    assert_eq!(ops::mul(&x0, &x1).unwrap().item(), Ok(10.0));
    assert_eq!(ops::div(&x0, &x1).unwrap().item(), Ok(0.4));
    assert_eq!(ops::neg(&x0).unwrap().item(), Ok(-2.0));
    assert_eq!(ops::square(&x0).unwrap().item(), Ok(4.0));
    assert_eq!(ops::pow(&x0, 3.0).unwrap().item(), Ok(8.0));
    assert_eq!(ops::exp(&x0).unwrap().item(), Ok(2.0f64.exp()));
  }

  #[test]
  fn backward_binary() {
    let x0 = Variable::scalar(3.0);
    let x1 = Variable::scalar(2.0);

    ops::mul(&x0, &x1).unwrap().backward().unwrap();
    assert_eq!((grad_of(&x0), grad_of(&x1)), (2.0, 3.0));

    x0.clear_grad();
    x1.clear_grad();
    ops::sub(&x0, &x1).unwrap().backward().unwrap();
    assert_eq!((grad_of(&x0), grad_of(&x1)), (1.0, -1.0));

    x0.clear_grad();
    x1.clear_grad();
    ops::div(&x0, &x1).unwrap().backward().unwrap();
    assert_eq!((grad_of(&x0), grad_of(&x1)), (0.5, -0.75));
  }

  #[test]
  fn backward_unary() {
    let x = Variable::scalar(3.0);
    x.square().unwrap().backward().unwrap();
    assert_eq!(grad_of(&x), 6.0);

    x.clear_grad();
    x.powf(3.0).unwrap().backward().unwrap();
    assert_eq!(grad_of(&x), 27.0);

    x.clear_grad();
    ops::neg(&x).unwrap().backward().unwrap();
    assert_eq!(grad_of(&x), -1.0);

    x.clear_grad();
    x.exp().unwrap().backward().unwrap();
    assert_relative_eq!(grad_of(&x), 3.0f64.exp());
  }

  #[test]
  fn elementwise() {
    let x = Variable::new(Tensor::vec(&[1.0, 2.0, 3.0]));
    let y = x.square().unwrap();
    y.backward().unwrap();
    assert_eq!(y.data(), &Tensor::vec(&[1.0, 4.0, 9.0]));
    assert_eq!(x.grad(), Some(Tensor::vec(&[2.0, 4.0, 6.0])));
  }

  #[test]
  fn shape_mismatch() {
    let x0 = Variable::new(Tensor::vec(&[1.0, 2.0]));
    let x1 = Variable::new(Tensor::vec(&[1.0, 2.0, 3.0]));
    let err = ops::add(&x0, &x1).unwrap_err();
    assert_eq!(err, Error::ShapeMismatch { lhs: Shape::new(&[2]), rhs: Shape::new(&[3]) });
  }

  #[test]
  #[should_panic(expected = "shape mismatch")]
  fn operator_panics_on_mismatch() {
    let x0 = Variable::new(Tensor::vec(&[1.0, 2.0]));
    let x1 = Variable::new(Tensor::vec(&[1.0, 2.0, 3.0]));
    let _ = x0 * x1;
  }

  #[test]
  fn kernel_names() {
    let x = Variable::scalar(2.0f32);
    let names: Vec<_> = [ops::neg(&x), ops::square(&x), ops::pow(&x, 3.0), ops::exp(&x)]
      .into_iter()
      .map(|y| y.unwrap().creator().unwrap().name() )
      .collect();
    assert_eq!(names, vec!["neg", "square", "pow", "exp"]);
    assert_eq!(Function::<f64>::name(&Div), "div");
    assert_eq!(Function::<f32>::name(&Pow { c: 2.0f32 }), "pow");
  }

  #[test]
  fn wrong_arity() {
    let x = Variable::scalar(1.0);
    let err = Variable::apply(Add, &[&x]).unwrap_err();
    assert_eq!(err, Error::ArityMismatch { op: "add", what: "inputs", expected: 2, got: 1 });
  }

  #[test]
  fn operators() {
    let x = Variable::scalar(2.0f64);
    assert_eq!((-&x).item(), Ok(-2.0));
    assert_eq!((&x + &x).item(), Ok(4.0));
    assert_eq!((&x * 3.0).item(), Ok(6.0));
    assert_eq!((x.clone() - 0.5).item(), Ok(1.5));
    assert_eq!((1.0f64 / &x).item(), Ok(0.5));
    assert_eq!((3.0f64 - x.clone()).item(), Ok(1.0));
    assert_eq!((10.0f64 * &x + 1.0).item(), Ok(21.0));

    let y = Variable::scalar(2.0f32);
    assert_eq!((2.0f32 + &y).item(), Ok(4.0));
  }

  #[test]
  fn reflected_operands() {
    let x = Variable::scalar(2.0f64);
    let y1 = 2.0f64 - &x;
    let y2 = &x - 1.0;
    assert_eq!(y1.item(), Ok(0.0));
    assert_eq!(y2.item(), Ok(1.0));

    y1.backward().unwrap();
    assert_eq!(grad_of(&x), -1.0);
    x.clear_grad();
    y2.backward().unwrap();
    assert_eq!(grad_of(&x), 1.0);
  }

  #[test]
  fn sphere() {
    let x = Variable::scalar(1.0);
    let y = Variable::scalar(1.0);
    let z = x.powf(2.0).unwrap() + y.powf(2.0).unwrap();
    z.backward().unwrap();
    assert_eq!((grad_of(&x), grad_of(&y)), (2.0, 2.0));
  }

  #[test]
  fn matyas() {
    let x = Variable::scalar(1.0f64);
    let y = Variable::scalar(1.0f64);
    let z = 0.26f64 * (x.powf(2.0).unwrap() + y.powf(2.0).unwrap()) - 0.48f64 * &x * &y;
    z.backward().unwrap();
    assert_relative_eq!(grad_of(&x), 0.04, epsilon = 1e-12);
    assert_relative_eq!(grad_of(&y), 0.04, epsilon = 1e-12);
  }

  #[test]
  fn goldstein_price() {
    let x = Variable::scalar(1.0f64);
    let y = Variable::scalar(1.0f64);
    let sq = |v: Variable<f64>| v.powf(2.0).unwrap();
    let z = (1.0 + sq(&x + &y + 1.0) * (19.0 - 14.0 * &x + 3.0 * sq(x.clone()) - 14.0 * &y + 6.0 * &x * &y + 3.0 * sq(y.clone())))
      * (30.0 + sq(2.0 * &x - 3.0 * &y) * (18.0 - 32.0 * &x + 12.0 * sq(x.clone()) + 48.0 * &y - 36.0 * &x * &y + 27.0 * sq(y.clone())));
    z.backward().unwrap();
    assert_relative_eq!(grad_of(&x), -5376.0, epsilon = 1e-9);
    assert_relative_eq!(grad_of(&y), 8064.0, epsilon = 1e-9);
  }

  #[test]
  fn kernels_match_finite_differences() {
    let x = Tensor::vec(&[0.3, 1.2, 2.0]);
    let eps = 1e-4;
    assert!(check_gradients(|x| x.square(), &x, eps).unwrap() < 1e-6);
    assert!(check_gradients(|x| x.powf(2.5), &x, eps).unwrap() < 1e-6);
    assert!(check_gradients(|x| x.exp(), &x, eps).unwrap() < 1e-6);
    assert!(check_gradients(|x| ops::neg(x), &x, eps).unwrap() < 1e-6);
    assert!(check_gradients(|x| ops::div(&Variable::scalar(1.0), x), &x, eps).unwrap() < 1e-5);
    assert!(check_gradients(|x| ops::mul(x, &x.exp()?), &x, eps).unwrap() < 1e-5);
  }
}
