//! Define-by-run automatic differentiation for tensor operations.
//! Tiny. Few dependencies. CPU only.
//!
//! # Features
//!
//! - **Eager recording** — Every operation applied to a [Variable] runs
//! immediately and records itself into a computation graph on the fly.
//!
//! - **Generation ordered back-prop** — Gradients flow through arbitrary
//! diamonds and fan-ins, with every operation visited exactly once, after all
//! its consumers.
//!
//! - **Extensible** — New differentiable operations only need to implement the
//! [Function] trait with a forward formula and its vector-Jacobian product.
//!
//! - **Memory friendly** — Intermediate gradients are released as soon as
//! they have been propagated, and recording can be switched off entirely with
//! [no_grad].
//!
//! # Examples
//!
//! Differentiating a composite function:
//! ```
//! use microdiff::{ ops, Tensor, Variable };
//!
//! let x = Variable::new(Tensor::scalar(0.5f64));
//! let y = ops::square(&ops::exp(&ops::square(&x)?)?)?;
//! y.backward()?;
//!
//! let grad = x.grad().unwrap().item()?;
//! assert!((grad - 3.297442541400256).abs() < 1e-12);
//! # Ok::<(), microdiff::Error>(())
//! ```
//!
//! Operators record just the same:
//! ```
//! use microdiff::Variable;
//!
//! let x = Variable::scalar(1.0f64);
//! let y = Variable::scalar(1.0f64);
//! let z = 0.26f64 * (&x * &x + &y * &y) - 0.48f64 * &x * &y;
//! z.backward().unwrap();
//!
//! assert!((x.grad().unwrap().item().unwrap() - 0.04).abs() < 1e-12);
//! ```

mod internal;
mod shape;
mod tensor;
mod variable;
mod error;

pub mod config;
pub mod ops;
pub mod scalar;

pub use shape::Shape;
pub use tensor::Tensor;
pub use variable::{ Variable, Function, FunctionNode, Outputs, numerical_diff, check_gradients };
pub use error::{ Error, Result };
pub use config::{ Setting, no_grad, using_config };
