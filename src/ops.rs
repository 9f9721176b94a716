//! Differentiable operations on [Variable]s.
//!
//! Each function runs one operation kind and records it in the graph
//! (unless recording is disabled). The operation kinds themselves are
//! exported as well, for use with [Variable::apply].

use crate::{
  variable::Variable,
  scalar::Real,
  error::Result,
};

pub use crate::variable::mops::{ Neg, Square, Pow, Exp, Add, Sub, Mul, Div };


pub fn neg<T: Real>(x: &Variable<T>) -> Result<Variable<T>> {
  Variable::call(Neg, &[x])
}

pub fn square<T: Real>(x: &Variable<T>) -> Result<Variable<T>> {
  Variable::call(Square, &[x])
}

/// Raise `x` to the constant power `c`.

pub fn pow<T: Real>(x: &Variable<T>, c: T) -> Result<Variable<T>> {
  Variable::call(Pow { c }, &[x])
}

pub fn exp<T: Real>(x: &Variable<T>) -> Result<Variable<T>> {
  Variable::call(Exp, &[x])
}

pub fn add<T: Real>(x0: &Variable<T>, x1: &Variable<T>) -> Result<Variable<T>> {
  Variable::call(Add, &[x0, x1])
}

pub fn sub<T: Real>(x0: &Variable<T>, x1: &Variable<T>) -> Result<Variable<T>> {
  Variable::call(Sub, &[x0, x1])
}

pub fn mul<T: Real>(x0: &Variable<T>, x1: &Variable<T>) -> Result<Variable<T>> {
  Variable::call(Mul, &[x0, x1])
}

pub fn div<T: Real>(x0: &Variable<T>, x1: &Variable<T>) -> Result<Variable<T>> {
  Variable::call(Div, &[x0, x1])
}
