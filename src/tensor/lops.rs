use crate::{
  tensor::Tensor,
  scalar::{ Numeric, Real },
  error::Result,
};


/// Elementwise kernels of the host array type.
///
/// Binary kernels are fallible because operand shapes may not fit.
/// The `std::ops` operators below panic instead.

impl<T: Numeric> Tensor<T> {
  pub fn add(&self, rhs: &Self) -> Result<Self> {
    self.zip(rhs, |(a, b)| a + b )
  }

  pub fn sub(&self, rhs: &Self) -> Result<Self> {
    self.zip(rhs, |(a, b)| a - b )
  }

  pub fn mul(&self, rhs: &Self) -> Result<Self> {
    self.zip(rhs, |(a, b)| a * b )
  }

  pub fn div(&self, rhs: &Self) -> Result<Self> {
    self.zip(rhs, |(a, b)| a / b )
  }

  pub fn scale(&self, factor: T) -> Self {
    self.map(|a| a * factor )
  }
}

impl<T: Real> Tensor<T> {
  pub fn neg(&self) -> Self {
    self.map(|a| -a )
  }

  pub fn exp(&self) -> Self {
    self.map(|a| a.exp() )
  }

  pub fn powf(&self, exp: T) -> Self {
    self.map(|a| a.powf(exp) )
  }

  pub fn sqr(&self) -> Self {
    self.map(|a| a * a )
  }
}

impl<T: Real> std::ops::Neg for &Tensor<T> {
  type Output = Tensor<T>;

  fn neg(self) -> Self::Output {
    Tensor::neg(self)
  }
}

impl<T: Real> std::ops::Neg for Tensor<T> {
  type Output = Tensor<T>;

  fn neg(self) -> Self::Output {
    Tensor::neg(&self)
  }
}

macro_rules! add_operator {
  ($op:ident, $meth:ident, $symbol:tt) => {
    impl<T: Numeric> std::ops::$op for &Tensor<T> { // &tensor * &other
      type Output = Tensor<T>;

      fn $meth(self, rhs: Self) -> Tensor<T> {
        Tensor::$meth(self, rhs).unwrap_or_else(|err| panic!("{err}") )
      }
    }

    impl<T: Numeric> std::ops::$op for Tensor<T> { // tensor * other
      type Output = Tensor<T>;

      fn $meth(self, rhs: Self) -> Tensor<T> {
        &self $symbol &rhs
      }
    }

    impl<T: Numeric> std::ops::$op<Tensor<T>> for &Tensor<T> { // &tensor * other
      type Output = Tensor<T>;

      fn $meth(self, rhs: Tensor<T>) -> Tensor<T> {
        self $symbol &rhs
      }
    }

    impl<T: Numeric> std::ops::$op<&Tensor<T>> for Tensor<T> { // tensor * &other
      type Output = Tensor<T>;

      fn $meth(self, rhs: &Tensor<T>) -> Tensor<T> {
        &self $symbol rhs
      }
    }

    impl<T: Numeric> std::ops::$op<T> for &Tensor<T> { // &tensor * T
      type Output = Tensor<T>;

      fn $meth(self, rhs: T) -> Tensor<T> {
        self $symbol &Tensor::scalar(rhs)
      }
    }

    impl<T: Numeric> std::ops::$op<T> for Tensor<T> { // tensor * T
      type Output = Tensor<T>;

      fn $meth(self, rhs: T) -> Tensor<T> {
        &self $symbol &Tensor::scalar(rhs)
      }
    }
  };
}

add_operator!(Add, add, +);
add_operator!(Sub, sub, -);
add_operator!(Mul, mul, *);
add_operator!(Div, div, /);
