use crate::shape::Shape;


/// Everything that can go wrong while building or differentiating a graph.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
  /// Elementwise operands whose shapes cannot be combined.
  #[error("shape mismatch: cannot combine {lhs} with {rhs}")]
  ShapeMismatch { lhs: Shape, rhs: Shape },

  /// Tensor data whose length does not fit the requested shape.
  #[error("{shape} requires {expected} elements, got {got}")]
  ElementCountMismatch { shape: Shape, expected: usize, got: usize },

  #[error("cannot extract item from non-scalar {shape}")]
  NotAScalar { shape: Shape },

  /// An operation kind that does not supply one of its formulas.
  #[error("operation {op} does not implement {method}")]
  NotImplemented { op: &'static str, method: &'static str },

  /// An operation received or returned the wrong number of values.
  #[error("operation {op} expected {expected} {what}, got {got}")]
  ArityMismatch { op: &'static str, what: &'static str, expected: usize, got: usize },

  /// An output gradient was read before it was seeded, or its node was already dropped.
  #[error("missing gradient for output {index} of {op}")]
  MissingGradient { op: &'static str, index: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
