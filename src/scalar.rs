use rand::distributions::uniform::SampleUniform;
use num_traits::{ Num, NumCast, NumAssignOps };


/// All types that may be stored in a [Tensor](crate::Tensor).
///
/// This trait gets implemented automatically for all types
/// that satisfy its dependent traits.

pub trait Inner: PartialEq + Clone + Copy + std::fmt::Debug + 'static {}
impl<T: PartialEq + Clone + Copy + std::fmt::Debug + 'static> Inner for T {}


/// All numeric types.
///
/// Elementwise arithmetic, sums and ones/zeros constructors
/// are available for tensors of these.

pub trait Numeric: Inner + PartialOrd + Num + NumCast + NumAssignOps + std::iter::Sum {}
impl<T: Inner + PartialOrd + Num + NumCast + NumAssignOps + std::iter::Sum> Numeric for T {}


/// All continuous numeric types.
///
/// Only tensors of these can be wrapped in a [Variable](crate::Variable)
/// and differentiated.

pub trait Real: Numeric + num_traits::Signed + num_traits::real::Real + SampleUniform + std::fmt::Display {}
impl<T: Numeric + num_traits::Signed + num_traits::real::Real + SampleUniform + std::fmt::Display> Real for T {}
