use std::rc::Rc;

use rand::Rng;
use itertools::Itertools;
use serde::{Serialize, Deserialize};

mod lops;

use crate::{
  shape::Shape,
  variable::Variable,
  scalar::{ Inner, Numeric, Real },
  error::{ Error, Result },
};


/// Immutable multidimensional array.
///
/// Tensors are the values flowing through a computation graph. Their storage
/// is reference counted, so cloning a tensor is cheap and never copies data.
/// Every operation produces a fresh tensor.
///
/// [Real] tensors can be wrapped in a [Variable] by calling
/// [tracked](Tensor::tracked).

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tensor<T: Inner> {
  shape: Shape,
  data: Rc<Vec<T>>,
}

impl<T: Inner> PartialEq for Tensor<T> {
  fn eq(&self, rhs: &Self) -> bool {
    self.shape == rhs.shape && self.data == rhs.data
  }
}

impl<T: Inner> Tensor<T> {
  pub fn from_shape(shape: Shape, data: Vec<T>) -> Result<Self> {
    if shape.size() != data.len() {
      return Err(Error::ElementCountMismatch { expected: shape.size(), got: data.len(), shape })
    }
    Ok(Self::from_parts(shape, data))
  }

  pub fn new(shape: &[usize], data: Vec<T>) -> Result<Self> {
    Self::from_shape(Shape::new(shape), data)
  }

  pub(crate) fn from_parts(shape: Shape, data: Vec<T>) -> Self {
    debug_assert_eq!(shape.size(), data.len());
    Self { shape, data: Rc::new(data) }
  }

  /// Zero-dimensional tensor holding a single item.

  pub fn scalar(item: T) -> Self {
    Self::from_parts(Shape::scalar(), vec![item])
  }

  pub fn vec(vec: &[T]) -> Self {
    Self::from_parts(Shape::new(&[vec.len()]), vec.to_vec())
  }

  pub fn fill(shape: &[usize], filler: T) -> Self {
    Self::from_parts(Shape::new(shape), vec![filler; shape.iter().product()])
  }

  pub fn shape(&self) -> &Shape {
    &self.shape
  }

  pub fn size(&self) -> usize {
    self.shape.size()
  }

  pub fn rank(&self) -> usize {
    self.shape.rank()
  }

  /// Name of the inner element type, such as `f64`.

  pub fn dtype(&self) -> &'static str {
    std::any::type_name::<T>()
  }

  pub fn raw(&self) -> &[T] {
    &self.data
  }

  pub fn item(&self) -> Result<T> {
    if self.size() != 1 {
      return Err(Error::NotAScalar { shape: self.shape.clone() })
    }
    Ok(self.data[0])
  }

  pub fn map<O, F>(&self, cb: F) -> Tensor<O>
  where
    O: Inner,
    F: FnMut(T) -> O,
  {
    let data = self.data.iter().copied().map(cb).collect();
    Tensor::from_parts(self.shape.clone(), data)
  }

  /// Combine two tensors elementwise.
  ///
  /// Single-element operands are stretched to the shape of the other side.

  pub fn zip<O, F>(&self, rhs: &Self, mut cb: F) -> Result<Tensor<O>>
  where
    O: Inner,
    F: FnMut((T, T)) -> O,
  {
    let shape = self.shape.broadcast(&rhs.shape)
      .ok_or_else(|| Error::ShapeMismatch { lhs: self.shape.clone(), rhs: rhs.shape.clone() })?;
    let data = if self.size() == rhs.size() {
      self.data.iter().copied().zip(rhs.data.iter().copied()).map(cb).collect()
    } else if self.size() == 1 {
      let lhs = self.data[0];
      rhs.data.iter().map(|&b| cb((lhs, b)) ).collect()
    } else {
      let r = rhs.data[0];
      self.data.iter().map(|&a| cb((a, r)) ).collect()
    };
    Ok(Tensor::from_parts(shape, data))
  }
}

impl<T: Numeric> Tensor<T> {
  pub fn ones(shape: &[usize]) -> Self {
    Self::fill(shape, T::one())
  }

  pub fn zeros(shape: &[usize]) -> Self {
    Self::fill(shape, T::zero())
  }

  pub fn ones_like(other: &Self) -> Self {
    Self::ones(&other.shape.dims)
  }

  pub fn zeros_like(other: &Self) -> Self {
    Self::zeros(&other.shape.dims)
  }

  pub fn sum(&self) -> T {
    self.data.iter().copied().sum()
  }
}

impl<T: Real> Tensor<T> {
  /// Uniformly distributed values in `[0, 1)`.

  pub fn rand(shape: &[usize]) -> Self {
    let mut rng = rand::thread_rng();
    let data = (0..shape.iter().product())
      .map(|_| rng.gen_range(T::zero(), T::one()) )
      .collect();
    Self::from_parts(Shape::new(shape), data)
  }

  /// Wrap this tensor in a leaf [Variable].

  pub fn tracked(&self) -> Variable<T> {
    Variable::new(self.clone())
  }

  /// Largest absolute elementwise difference to another tensor.

  pub fn max_abs_diff(&self, rhs: &Self) -> Result<T> {
    let diff = self.zip(rhs, |(a, b)| num_traits::real::Real::abs(a - b) )?;
    Ok(diff.data.iter().copied().fold(T::zero(), |acc, d| if d > acc { d } else { acc }))
  }
}

impl<T: Inner + std::fmt::Display> std::fmt::Display for Tensor<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    print_chunks(&self.shape.dims, &self.data, f)
  }
}

fn print_chunks<T: std::fmt::Display>(dims: &[usize], vec: &[T], f: &mut std::fmt::Formatter) -> std::fmt::Result {
  match dims {
    [] => write!(f, "{}", vec[0]),
    [_] => write!(f, "[{}]", vec.iter().join(", ")),
    [n, rest @ ..] => {
      write!(f, "[")?;
      let len = if *n == 0 { 0 } else { vec.len() / n };
      for (i, chunk) in vec.chunks(len.max(1)).take(*n).enumerate() {
        if i > 0 { write!(f, ", ")? }
        print_chunks(rest, chunk, f)?;
      }
      write!(f, "]")
    },
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn construct() {
    let x = Tensor::new(&[2,3], vec![1, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(x.size(), 6);
    assert_eq!(x.rank(), 2);
    assert_eq!(x.shape()[-1], 3);
    assert_eq!(x.dtype(), "i32");
  }

  #[test]
  fn element_count_mismatch() {
    let err = Tensor::new(&[2,2], vec![1.0, 2.0, 3.0]).unwrap_err();
    assert_eq!(err, Error::ElementCountMismatch { shape: Shape::new(&[2,2]), expected: 4, got: 3 });
  }

  #[test]
  fn scalar() {
    let x = Tensor::scalar(0.5);
    assert_eq!(x.rank(), 0);
    assert_eq!(x.size(), 1);
    assert_eq!(x.item(), Ok(0.5));
    assert!(Tensor::vec(&[1.0, 2.0]).item().is_err());
  }

  #[test]
  fn like() {
    let x = Tensor::new(&[3,2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    assert_eq!(Tensor::ones_like(&x), Tensor::fill(&[3,2], 1.0));
    assert_eq!(Tensor::zeros_like(&x).sum(), 0.0);
    assert_eq!(x.sum(), 21.0);
  }

  #[test]
  fn zip_stretches_scalars() {
    let x = Tensor::vec(&[1, 2, 3]);
    assert_eq!(x.zip(&Tensor::scalar(10), |(a, b)| a * b ), Ok(Tensor::vec(&[10, 20, 30])));
    assert_eq!(Tensor::scalar(10).zip(&x, |(a, b)| a - b ), Ok(Tensor::vec(&[9, 8, 7])));
    assert!(x.zip(&Tensor::vec(&[1, 2]), |(a, b)| a + b ).is_err());
  }

  #[test]
  fn uniform() {
    let y = Tensor::<f32>::rand(&[4, 4]);
    assert_eq!(y.size(), 16);
    assert!(y.raw().iter().all(|&v| v >= 0.0 && v < 1.0 ));
  }

  #[test]
  fn display() {
    assert_eq!(Tensor::scalar(1.5).to_string(), "1.5");
    assert_eq!(Tensor::vec(&[1, 2]).to_string(), "[1, 2]");
    assert_eq!(Tensor::new(&[2,2], vec![1, 2, 3, 4]).unwrap().to_string(), "[[1, 2], [3, 4]]");
  }

  #[test]
  fn serialize() {
    let x = Tensor::new(&[2,3], vec![0.5, 0.75, 1.0, 1.25, 1.5, 1.75]).unwrap();
    let bytes = postcard::to_allocvec(&x).unwrap();
    let y: Tensor<f64> = postcard::from_bytes(&bytes).unwrap();
    assert_eq!(x, y);
  }
}
