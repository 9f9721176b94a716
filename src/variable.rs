use std::rc::Rc;
use std::cell::{ OnceCell, RefCell };
use std::fmt::Debug;

use tracing::{ debug_span, trace };

mod function;
mod schedule;
mod check;
pub(crate) mod mops;

pub use function::{ Function, FunctionNode, Outputs };
pub use check::{ numerical_diff, check_gradients };

use crate::{
  internal::*,
  tensor::Tensor,
  shape::Shape,
  scalar::Real,
  config::is_backprop_enabled,
  error::{ Error, Result },
};
use schedule::Schedule;


/// Node in a computation graph, holding a [Variable]'s value and gradient,
/// as well as the operation that created it.

pub(crate) struct Node<T: Real> {
  pub id: usize,
  data: Tensor<T>,
  name: Option<String>,
  pub(crate) grad: RefCell<Option<Tensor<T>>>,
  creator: OnceCell<Rc<FunctionNode<T>>>,
}


/// Value tracked in a computation graph.
///
/// Variables are created from a [Tensor] by user code, in which case they are
/// leaves of the graph, or returned by operations on other variables. As long
/// as recording is enabled (see [config](crate::config)), the latter remember
/// the operation that created them, so that [backward](Variable::backward)
/// can compute gradients for every variable involved.
///
/// Cloning a variable is cheap and yields a handle to the same node.

#[derive(Clone)]
pub struct Variable<T: Real> {
  pub(crate) node: Rc<Node<T>>,
}

impl<T: Real> From<T> for Variable<T> {
  fn from(value: T) -> Self {
    Self::scalar(value)
  }
}

impl<T: Real> From<Tensor<T>> for Variable<T> {
  fn from(tensor: Tensor<T>) -> Self {
    Self::new(tensor)
  }
}

impl<T: Real> From<&Variable<T>> for Variable<T> {
  fn from(var: &Variable<T>) -> Self {
    var.clone()
  }
}

impl<T: Real> Variable<T> {
  pub fn new(data: Tensor<T>) -> Self {
    Self::leaf(data, None)
  }

  pub fn named(data: Tensor<T>, name: &str) -> Self {
    Self::leaf(data, Some(name.to_string()))
  }

  /// Leaf holding a zero-dimensional tensor.

  pub fn scalar(item: T) -> Self {
    Self::new(Tensor::scalar(item))
  }

  fn leaf(data: Tensor<T>, name: Option<String>) -> Self {
    Self {
      node: Rc::new(Node {
        id: make_id(),
        data,
        name,
        grad: RefCell::new(None),
        creator: OnceCell::new(),
      }),
    }
  }

  pub fn id(&self) -> usize {
    self.node.id
  }

  pub fn data(&self) -> &Tensor<T> {
    &self.node.data
  }

  pub fn name(&self) -> Option<&str> {
    self.node.name.as_deref()
  }

  pub fn shape(&self) -> &Shape {
    self.node.data.shape()
  }

  pub fn ndim(&self) -> usize {
    self.node.data.rank()
  }

  pub fn size(&self) -> usize {
    self.node.data.size()
  }

  /// Extent of the first dimension, zero for scalars.

  pub fn len(&self) -> usize {
    self.shape().dims.first().copied().unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn dtype(&self) -> &'static str {
    self.node.data.dtype()
  }

  pub fn item(&self) -> Result<T> {
    self.node.data.item()
  }

  /// Gradient accumulated by previous backward passes.
  ///
  /// It has the same shape as this variable's value, also when a scalar
  /// took part in an operation with a larger operand.

  pub fn grad(&self) -> Option<Tensor<T>> {
    self.node.grad.borrow().clone()
  }

  /// Seed this variable's gradient, for instance before calling [backward](Self::backward)
  /// on a result that should not start from ones.

  pub fn set_grad(&self, grad: Tensor<T>) {
    self.node.grad.replace(Some(grad));
  }

  /// Forget the gradient accumulated so far.

  pub fn clear_grad(&self) {
    self.node.grad.replace(None);
  }

  pub fn creator(&self) -> Option<Rc<FunctionNode<T>>> {
    self.node.creator.get().cloned()
  }

  pub fn is_leaf(&self) -> bool {
    self.node.creator.get().is_none()
  }

  /// Depth of this variable in its graph. Leaves are generation zero,
  /// everything else sits one above its creator.

  pub fn generation(&self) -> usize {
    self.node.creator.get().map_or(0, |creator| creator.generation + 1 )
  }

  /// Run `func` on the given inputs and record the call in the graph.
  ///
  /// When recording is disabled the results are computed all the same,
  /// but they become leaves and nothing about the call is retained.

  pub fn apply(func: impl Function<T> + 'static, inputs: &[&Self]) -> Result<Outputs<Self>> {
    let values: Vec<Tensor<T>> = inputs.iter().map(|input| input.data().clone() ).collect();
    let outputs: Vec<Self> = func.forward(&values)?
      .into_vec()
      .into_iter()
      .map(Self::new)
      .collect();

    if is_backprop_enabled() {
      let record = Rc::new(FunctionNode {
        id: make_id(),
        generation: inputs.iter().map(|input| input.generation() ).max().unwrap_or(0),
        inputs: inputs.iter().map(|&input| input.clone() ).collect(),
        outputs: outputs.iter().map(|output| Rc::downgrade(&output.node) ).collect(),
        func: Box::new(func),
      });
      for output in &outputs {
        let fresh = output.node.creator.set(record.clone()).is_ok();
        debug_assert!(fresh, "output of {} already has a creator", record.name());
      }
    } else {
      trace!(op = func.name(), "not recorded");
    }

    Ok(Outputs::from_vec(outputs))
  }

  /// Like [apply](Self::apply), for operations with exactly one result.

  pub fn call(func: impl Function<T> + 'static, inputs: &[&Self]) -> Result<Self> {
    let op = func.name();
    match Self::apply(func, inputs)? {
      Outputs::Single(output) => Ok(output),
      Outputs::Multiple(outputs) => Err(Error::ArityMismatch {
        op,
        what: "outputs",
        expected: 1,
        got: outputs.len(),
      }),
    }
  }

  /// Compute gradients for every variable this one was computed from.
  ///
  /// Gradients of intermediate results are released as soon as they have been
  /// propagated. Use [backward_with](Self::backward_with) to keep them.

  pub fn backward(&self) -> Result<()> {
    self.backward_with(false)
  }

  /// Compute gradients for every variable this one was computed from.
  ///
  /// Starts from this variable's gradient, or from ones if none was set.
  /// Gradients reaching a variable along several paths are summed. Unless
  /// `retain_grad` is set, each operation's outputs lose their gradient once
  /// it has been propagated to the operation's inputs, so only leaves keep theirs.

  pub fn backward_with(&self, retain_grad: bool) -> Result<()> {
    let span = debug_span!("backward", root = self.node.id, retain_grad);
    let _enter = span.enter();

    if self.node.grad.borrow().is_none() {
      self.set_grad(Tensor::ones_like(&self.node.data));
    }

    let mut schedule = Schedule::new();
    if let Some(creator) = self.node.creator.get() {
      schedule.push(creator);
    }

    while let Some(func) = schedule.pop() {
      trace!(op = func.name(), generation = func.generation, pending = schedule.len(), "propagate");

      let grads = func.output_grads()?;
      let values: Vec<Tensor<T>> = func.inputs.iter().map(|input| input.data().clone() ).collect();
      let input_grads = func.func.backward(&values, &grads)?.into_vec();
      if input_grads.len() != func.inputs.len() {
        return Err(Error::ArityMismatch {
          op: func.name(),
          what: "input gradients",
          expected: func.inputs.len(),
          got: input_grads.len(),
        })
      }

      for (input, grad) in func.inputs.iter().zip(input_grads) {
        input.accumulate_grad(grad)?;
        if let Some(creator) = input.node.creator.get() {
          schedule.push(creator);
        }
      }

      if !retain_grad {
        func.clear_output_grads();
      }
    }
    Ok(())
  }

  fn accumulate_grad(&self, grad: Tensor<T>) -> Result<()> {
    // Single-element inputs were stretched in forward, so sum their share back
    let grad = if self.size() == 1 && grad.shape() != self.shape() {
      Tensor::from_parts(self.shape().clone(), vec![grad.sum()])
    } else {
      grad
    };
    let sum = match self.node.grad.borrow().as_ref() {
      Some(prev) => Some(Tensor::add(prev, &grad)?),
      None => None,
    };
    self.node.grad.replace(Some(sum.unwrap_or(grad)));
    Ok(())
  }
}

impl<T: Real> Debug for Variable<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Variable")
      .field("id", &self.node.id)
      .field("name", &self.node.name)
      .field("data", &self.node.data)
      .field("grad", &self.node.grad.borrow())
      .field("generation", &self.generation())
      .finish()
  }
}

impl<T: Real> std::fmt::Display for Variable<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self.name() {
      Some(name) => write!(f, "variable({name}: {})", self.data()),
      None => write!(f, "variable({})", self.data()),
    }
  }
}
