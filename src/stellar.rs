//! Derived stellar parameters from measured quantities: radius from
//! luminosity and temperature, surface gravity from mass and radius,
//! mass from gravity and radius.
//!
//! Each input is a measurement in an arbitrary commensurate unit and
//! is brought to the working system through the conversion engine, so
//! `derive_radius` accepts a luminosity in `erg/s` as readily as in
//! `Lsol`.

use crate::constants::{GRAV_CONSTANT, GRAV_CONSTANT_CGS, STEFAN_BOLTZMANN};
use crate::error::ConvertError;
use crate::units::convert::{convert, Context, Value};

use std::f64::consts::PI;

/// A measured quantity: value, optional one-sigma error, and the unit
/// it was measured in.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
  pub value: f64,
  pub error: Option<f64>,
  pub unit: String,
}

impl Measure {
  pub fn new(value: f64, unit: &str) -> Self {
    Self { value, error: None, unit: unit.to_owned() }
  }

  pub fn with_error(value: f64, error: f64, unit: &str) -> Self {
    Self { value, error: Some(error), unit: unit.to_owned() }
  }

  fn to_value(&self) -> Value {
    match self.error {
      Some(e) => Value::Uncertain(self.value, e),
      None => Value::Scalar(self.value),
    }
  }

  fn convert_to(&self, unit: &str) -> Result<(f64, f64), ConvertError> {
    match convert(&self.unit, unit, self.to_value(), &Context::default())? {
      Value::Scalar(v) => Ok((v, 0.0)),
      Value::Uncertain(v, s) => Ok((v, s)),
      _ => Err(ConvertError::arity("expected a numeric measurement")),
    }
  }
}

/// Stellar radius from luminosity and effective temperature through
/// the Stefan-Boltzmann law, `R = sqrt(L / (4 pi sigma T^4))`.
/// The result is in the requested unit.
pub fn derive_radius(
  luminosity: &Measure,
  temperature: &Measure,
  unit: &str,
) -> Result<(f64, f64), ConvertError> {
  let (lum, lum_e) = luminosity.convert_to("W")?;
  let (teff, teff_e) = temperature.convert_to("K")?;
  let radius = (lum / (4.0 * PI * STEFAN_BOLTZMANN * teff.powi(4))).sqrt();
  // Linear propagation: dR/dL = R/(2L), dR/dT = -2R/T.
  let dl = radius / (2.0 * lum) * lum_e;
  let dt = 2.0 * radius / teff * teff_e;
  let sigma = dl.hypot(dt);
  let out = Measure::with_error(radius, sigma, "m");
  out.convert_to(unit)
}

/// Surface gravity as `log10(g)` with g in cm/s2, from mass and
/// radius.
pub fn derive_logg(mass: &Measure, radius: &Measure) -> Result<(f64, f64), ConvertError> {
  let (m, m_e) = mass.convert_to("g")?;
  let (r, r_e) = radius.convert_to("cm")?;
  let g = GRAV_CONSTANT_CGS * m / (r * r);
  let logg = g.log10();
  // d(log g)/dM = 1/(M ln 10), d(log g)/dR = -2/(R ln 10).
  let dm = m_e / (m * std::f64::consts::LN_10);
  let dr = 2.0 * r_e / (r * std::f64::consts::LN_10);
  Ok((logg, dm.hypot(dr)))
}

/// Stellar mass from surface gravity and radius, `M = g R^2 / G`, in
/// the requested unit.
pub fn derive_mass(
  gravity: &Measure,
  radius: &Measure,
  unit: &str,
) -> Result<(f64, f64), ConvertError> {
  let (g, g_e) = gravity.convert_to("m/s2")?;
  let (r, r_e) = radius.convert_to("m")?;
  let mass = g * r * r / GRAV_CONSTANT;
  let dg = mass / g * g_e;
  let dr = 2.0 * mass / r * r_e;
  let out = Measure::with_error(mass, dg.hypot(dr), "kg");
  out.convert_to(unit)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::constants::{SOLAR_LUMINOSITY, SOLAR_MASS, SOLAR_RADIUS};
  use approx::assert_relative_eq;

  #[test]
  fn test_sun_radius_from_luminosity() {
    let lum = Measure::new(1.0, "Lsol");
    let teff = (SOLAR_LUMINOSITY / (4.0 * PI * STEFAN_BOLTZMANN * SOLAR_RADIUS.powi(2)))
      .powf(0.25);
    let t = Measure::new(teff, "K");
    let (radius, _) = derive_radius(&lum, &t, "Rsol").unwrap();
    assert_relative_eq!(radius, 1.0, max_relative = 1e-10);
  }

  #[test]
  fn test_sun_logg() {
    let mass = Measure::new(1.0, "Msol");
    let radius = Measure::new(1.0, "Rsol");
    let (logg, sigma) = derive_logg(&mass, &radius).unwrap();
    assert_relative_eq!(logg, 4.438, max_relative = 1e-3);
    assert_relative_eq!(sigma, 0.0);
  }

  #[test]
  fn test_mass_round_trips_gravity() {
    let g_sun = GRAV_CONSTANT * SOLAR_MASS / SOLAR_RADIUS.powi(2);
    let gravity = Measure::new(g_sun, "m/s2");
    let radius = Measure::new(1.0, "Rsol");
    let (mass, _) = derive_mass(&gravity, &radius, "Msol").unwrap();
    assert_relative_eq!(mass, 1.0, max_relative = 1e-10);
  }

  #[test]
  fn test_error_propagation_in_logg() {
    let mass = Measure::with_error(1.0, 0.1, "Msol");
    let radius = Measure::new(1.0, "Rsol");
    let (_, sigma) = derive_logg(&mass, &radius).unwrap();
    assert_relative_eq!(sigma, 0.1 / std::f64::consts::LN_10, max_relative = 1e-10);
  }
}
