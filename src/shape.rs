use serde::{Serialize, Deserialize};

use crate::internal::*;


/// The shape of a [Tensor](crate::Tensor).
///
/// Tensors are always stored contiguously, so a shape is fully
/// described by its dimensions. A shape without dimensions is a scalar.

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
  pub dims: Vec<usize>,
}

impl Shape {
  pub fn new(dims: &[usize]) -> Self {
    Self { dims: dims.to_vec() }
  }

  pub fn scalar() -> Self {
    Self { dims: vec![] }
  }

  pub fn size(&self) -> usize {
    self.dims.iter().product()
  }

  pub fn rank(&self) -> usize {
    self.dims.len()
  }

  /// Shape resulting from an elementwise operation between two tensors.
  ///
  /// Equal shapes combine trivially. A single-element operand stretches to
  /// the other operand's shape. Anything else is incompatible.

  pub fn broadcast(&self, other: &Self) -> Option<Self> {
    if self.dims == other.dims {
      Some(self.clone())
    } else if self.size() == 1 && other.rank() >= self.rank() {
      Some(other.clone())
    } else if other.size() == 1 && self.rank() >= other.rank() {
      Some(self.clone())
    } else {
      None
    }
  }
}

impl std::ops::Index<isize> for Shape {
  type Output = usize;

  fn index(&self, i: isize) -> &usize {
    &self.dims[negative_index(i, self.rank(), false)]
  }
}

impl std::fmt::Display for Shape {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Shape{:?}", self.dims)
  }
}
