//! Fahrenheit and Celsius, the two affine temperature scales. Both
//! reduce to Kelvin; the converter prefix carries any metric prefix
//! applied to the unit (`kF`, `dC`, ...).

use crate::uncertainty::Uncertain;

pub fn fahrenheit_to_kelvin(a: Uncertain, prefix: f64) -> Uncertain {
  (a * prefix + 459.67) * (5.0 / 9.0)
}

pub fn kelvin_to_fahrenheit(a: Uncertain, prefix: f64) -> Uncertain {
  (a * (9.0 / 5.0) - 459.67) / prefix
}

pub fn celsius_to_kelvin(a: Uncertain, prefix: f64) -> Uncertain {
  a * prefix + 273.15
}

pub fn kelvin_to_celsius(a: Uncertain, prefix: f64) -> Uncertain {
  (a - 273.15) / prefix
}
