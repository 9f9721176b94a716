use std::rc::{ Rc, Weak };
use std::fmt::Debug;

use crate::{
  tensor::Tensor,
  scalar::Real,
  error::{ Error, Result },
  variable::{ Variable, Node },
};


/// One or several values produced by an operation.
///
/// Most operations have a single result, so callers get [Outputs::Single] for
/// those and only deal with a sequence when there really is more than one.

#[derive(Debug, Clone, PartialEq)]
pub enum Outputs<X> {
  Single(X),
  Multiple(Vec<X>),
}

impl<X> Outputs<X> {
  /// Wrap a sequence, unpacking it when it holds exactly one value.

  pub fn from_vec(mut values: Vec<X>) -> Self {
    if values.len() == 1 {
      if let Some(value) = values.pop() { return Self::Single(value) }
    }
    Self::Multiple(values)
  }

  pub fn len(&self) -> usize {
    match self {
      Self::Single(_) => 1,
      Self::Multiple(values) => values.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn into_vec(self) -> Vec<X> {
    match self {
      Self::Single(value) => vec![value],
      Self::Multiple(values) => values,
    }
  }
}

impl<X> From<X> for Outputs<X> {
  fn from(value: X) -> Self {
    Self::Single(value)
  }
}

impl<X> From<(X, X)> for Outputs<X> {
  fn from(values: (X, X)) -> Self {
    Self::Multiple(vec![values.0, values.1])
  }
}

impl<X> From<Vec<X>> for Outputs<X> {
  fn from(values: Vec<X>) -> Self {
    Self::from_vec(values)
  }
}


/// Differentiable operation on tensors.
///
/// Implementors supply the forward formula and its vector-Jacobian product.
/// Recording the operation into a graph is handled by [Variable::apply], so
/// both formulas only ever see raw tensors.
///
/// Both formulas default to [Error::NotImplemented].

pub trait Function<T: Real>: Debug {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  /// Compute the results of this operation from its input values.

  fn forward(&self, _inputs: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    Err(Error::NotImplemented { op: self.name(), method: "forward" })
  }

  /// Map gradients of the outputs to gradients of the inputs.
  ///
  /// `inputs` are the values the operation was called with, `grads` hold one
  /// gradient per output. Must return one gradient per input, in input order.

  fn backward(&self, _inputs: &[Tensor<T>], _grads: &[Tensor<T>]) -> Result<Outputs<Tensor<T>>> {
    Err(Error::NotImplemented { op: self.name(), method: "backward" })
  }
}


/// Recorded application of a [Function] inside a computation graph.
///
/// Holds its inputs strongly and its outputs weakly: outputs own their
/// creator, so the reverse edge must not keep them alive.

pub struct FunctionNode<T: Real> {
  pub(crate) id: usize,
  pub(crate) func: Box<dyn Function<T>>,
  pub(crate) generation: usize,
  pub(crate) inputs: Vec<Variable<T>>,
  pub(crate) outputs: Vec<Weak<Node<T>>>,
}

impl<T: Real> FunctionNode<T> {
  pub fn name(&self) -> &'static str {
    self.func.name()
  }

  /// Highest generation among this operation's inputs.

  pub fn generation(&self) -> usize {
    self.generation
  }

  pub fn inputs(&self) -> &[Variable<T>] {
    &self.inputs
  }

  /// Outputs that are still alive.

  pub fn outputs(&self) -> Vec<Option<Variable<T>>> {
    self.outputs.iter()
      .map(|output| output.upgrade().map(|node| Variable { node }) )
      .collect()
  }

  pub(crate) fn output_grads(&self) -> Result<Vec<Tensor<T>>> {
    self.outputs.iter()
      .enumerate()
      .map(|(index, output)| {
        let grad = output.upgrade().and_then(|node| {
          let grad = node.grad.borrow().clone();
          grad
        });
        grad.ok_or(Error::MissingGradient { op: self.name(), index })
      })
      .collect()
  }

  pub(crate) fn clear_output_grads(&self) {
    for node in self.outputs.iter().filter_map(Weak::upgrade) {
      node.grad.replace(None);
    }
  }
}

impl<T: Real> Drop for FunctionNode<T> {
  // Unlink the chain of records behind this one iteratively, so that
  // dropping a deep graph does not recurse once per operation.
  fn drop(&mut self) {
    let mut stack = std::mem::take(&mut self.inputs);
    while let Some(input) = stack.pop() {
      let Ok(mut node) = Rc::try_unwrap(input.node) else { continue };
      let Some(creator) = node.creator.take() else { continue };
      if let Ok(mut record) = Rc::try_unwrap(creator) {
        stack.append(&mut record.inputs);
      }
    }
  }
}

impl<T: Real> Debug for FunctionNode<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FunctionNode")
      .field("func", &self.func)
      .field("generation", &self.generation)
      .field("inputs", &self.inputs.iter().map(|input| input.id() ).collect::<Vec<_>>())
      .field("outputs", &self.outputs.len())
      .finish()
  }
}
