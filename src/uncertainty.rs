//! A small value type carrying a nominal value and a standard
//! deviation, with first-order (linear) error propagation through the
//! arithmetic the conversion engine performs.
//!
//! The propagation rules assume independent errors. Only the operators
//! the engine actually uses are provided; this is deliberately not a
//! general uncertainty-arithmetic library.

use std::ops::{Add, Sub, Mul, Div, Neg};

/// A nominal value with a one-sigma uncertainty. An exact quantity is
/// represented with `sigma == 0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uncertain {
  pub value: f64,
  pub sigma: f64,
}

impl Uncertain {
  pub fn new(value: f64, sigma: f64) -> Self {
    Self { value, sigma: sigma.abs() }
  }

  /// A quantity with no uncertainty attached.
  pub fn exact(value: f64) -> Self {
    Self { value, sigma: 0.0 }
  }

  pub fn nominal(&self) -> f64 {
    self.value
  }

  pub fn std_dev(&self) -> f64 {
    self.sigma
  }

  /// True if any uncertainty is attached.
  pub fn has_sigma(&self) -> bool {
    self.sigma != 0.0
  }

  /// `self` raised to an integer power.
  pub fn powi(self, n: i32) -> Self {
    self.powf(n as f64)
  }

  /// `self` raised to an arbitrary power: `d(x^n) = n x^(n-1) dx`.
  pub fn powf(self, n: f64) -> Self {
    Self {
      value: self.value.powf(n),
      sigma: (n * self.value.powf(n - 1.0) * self.sigma).abs(),
    }
  }

  pub fn sqrt(self) -> Self {
    self.powf(0.5)
  }

  /// Base-10 logarithm: `d(log10 x) = dx / (x ln 10)`.
  pub fn log10(self) -> Self {
    Self {
      value: self.value.log10(),
      sigma: (self.sigma / (self.value * std::f64::consts::LN_10)).abs(),
    }
  }

  /// Ten to the power `self`: `d(10^x) = 10^x ln 10 dx`.
  pub fn exp10(self) -> Self {
    let value = 10f64.powf(self.value);
    Self {
      value,
      sigma: (value * std::f64::consts::LN_10 * self.sigma).abs(),
    }
  }
}

impl From<f64> for Uncertain {
  fn from(value: f64) -> Self {
    Uncertain::exact(value)
  }
}

impl Add for Uncertain {
  type Output = Uncertain;

  fn add(self, rhs: Self) -> Self {
    Uncertain {
      value: self.value + rhs.value,
      sigma: self.sigma.hypot(rhs.sigma),
    }
  }
}

impl Sub for Uncertain {
  type Output = Uncertain;

  fn sub(self, rhs: Self) -> Self {
    Uncertain {
      value: self.value - rhs.value,
      sigma: self.sigma.hypot(rhs.sigma),
    }
  }
}

impl Mul for Uncertain {
  type Output = Uncertain;

  fn mul(self, rhs: Self) -> Self {
    Uncertain {
      value: self.value * rhs.value,
      sigma: (rhs.value * self.sigma).hypot(self.value * rhs.sigma),
    }
  }
}

impl Div for Uncertain {
  type Output = Uncertain;

  fn div(self, rhs: Self) -> Self {
    Uncertain {
      value: self.value / rhs.value,
      sigma: (self.sigma / rhs.value).hypot(self.value * rhs.sigma / (rhs.value * rhs.value)),
    }
  }
}

impl Neg for Uncertain {
  type Output = Uncertain;

  fn neg(self) -> Self {
    Uncertain {
      value: -self.value,
      sigma: self.sigma,
    }
  }
}

impl Mul<f64> for Uncertain {
  type Output = Uncertain;

  fn mul(self, rhs: f64) -> Self {
    Uncertain {
      value: self.value * rhs,
      sigma: (self.sigma * rhs).abs(),
    }
  }
}

impl Mul<Uncertain> for f64 {
  type Output = Uncertain;

  fn mul(self, rhs: Uncertain) -> Uncertain {
    rhs * self
  }
}

impl Div<f64> for Uncertain {
  type Output = Uncertain;

  fn div(self, rhs: f64) -> Self {
    Uncertain {
      value: self.value / rhs,
      sigma: (self.sigma / rhs).abs(),
    }
  }
}

impl Div<Uncertain> for f64 {
  type Output = Uncertain;

  fn div(self, rhs: Uncertain) -> Uncertain {
    Uncertain::exact(self) / rhs
  }
}

impl Add<f64> for Uncertain {
  type Output = Uncertain;

  fn add(self, rhs: f64) -> Self {
    Uncertain {
      value: self.value + rhs,
      sigma: self.sigma,
    }
  }
}

impl Sub<f64> for Uncertain {
  type Output = Uncertain;

  fn sub(self, rhs: f64) -> Self {
    Uncertain {
      value: self.value - rhs,
      sigma: self.sigma,
    }
  }
}
