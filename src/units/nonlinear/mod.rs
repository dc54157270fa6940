//! Non-linear unit kinds and the converter that carries them through
//! a unit expression.
//!
//! A non-linear unit cannot be reduced to a multiplicative factor:
//! temperatures are affine, magnitudes logarithmic, calendar dates and
//! sky frames structural. At most one may appear in an expression; the
//! converter remembers its kind together with the linear prefix
//! accumulated around it.

pub mod coords;
pub mod julian;
pub mod magnitude;
pub mod temperature;

use crate::error::ConvertError;
use crate::units::convert::{Payload, SiContext};

use self::coords::Frame;

/// The registered non-linear unit families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonlinearKind {
  Fahrenheit,
  Celsius,
  VegaMag,
  ABMag,
  STMag,
  AmplitudeMag,
  ColorIndex,
  JulianDayCalendar,
  ModifiedJulianDay,
  Equatorial,
  Galactic,
  Ecliptic,
}

/// A non-linear unit occurrence inside an expression: the kind plus
/// the linear prefix gathered from SI scalings and numeric factors,
/// and the power the unit was raised to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonlinearConverter {
  pub kind: NonlinearKind,
  pub prefix: f64,
  pub power: i64,
}

impl NonlinearConverter {
  pub fn new(kind: NonlinearKind) -> Self {
    Self { kind, prefix: 1.0, power: 1 }
  }

  /// Folds a linear factor into the prefix, as in `mC` or `10-3F`.
  pub fn scale(mut self, factor: f64) -> Self {
    self.prefix *= factor;
    self
  }

  /// Records the power the unit carries in the expression.
  pub fn raise_power(mut self, power: i64) -> Self {
    self.power *= power;
    self
  }

  /// Applies the unit's transfer function towards SI.
  pub fn forward(&self, payload: Payload, ctx: &SiContext) -> Result<Payload, ConvertError> {
    match self.kind {
      NonlinearKind::Fahrenheit => {
        let u = payload.into_num()?;
        Ok(Payload::Num(temperature::fahrenheit_to_kelvin(u, self.prefix)))
      }
      NonlinearKind::Celsius => {
        let u = payload.into_num()?;
        Ok(Payload::Num(temperature::celsius_to_kelvin(u, self.prefix)))
      }
      NonlinearKind::VegaMag => Ok(Payload::Num(magnitude::vega(payload.into_num()?, ctx, false)?)),
      NonlinearKind::ABMag => Ok(Payload::Num(magnitude::ab(payload.into_num()?, ctx, false)?)),
      NonlinearKind::STMag => Ok(Payload::Num(magnitude::st(payload.into_num()?, ctx, false)?)),
      NonlinearKind::AmplitudeMag => {
        Ok(Payload::Num(magnitude::amplitude(payload.into_num()?, self.prefix, false)?))
      }
      NonlinearKind::ColorIndex => {
        Ok(Payload::Num(magnitude::color(payload.into_num()?, ctx, false)?))
      }
      NonlinearKind::JulianDayCalendar => {
        let date = payload.into_date()?;
        Ok(Payload::Num(crate::uncertainty::Uncertain::exact(julian::calendar_to_jd(&date))))
      }
      NonlinearKind::ModifiedJulianDay => {
        let zero = julian::modified_jd_zero_point(ctx.jtype.as_deref().unwrap_or("MJD"))?;
        Ok(Payload::Num(payload.into_num()? + zero))
      }
      NonlinearKind::Equatorial | NonlinearKind::Galactic | NonlinearKind::Ecliptic => {
        let coord = payload.into_coord()?;
        let out = coords::to_equatorial(self.frame(), &coord, ctx.epoch.as_deref())?;
        Ok(Payload::Coord(out))
      }
    }
  }

  /// Applies the unit's transfer function away from SI.
  pub fn inverse(&self, payload: Payload, ctx: &SiContext) -> Result<Payload, ConvertError> {
    match self.kind {
      NonlinearKind::Fahrenheit => {
        let u = payload.into_num()?;
        Ok(Payload::Num(temperature::kelvin_to_fahrenheit(u, self.prefix)))
      }
      NonlinearKind::Celsius => {
        let u = payload.into_num()?;
        Ok(Payload::Num(temperature::kelvin_to_celsius(u, self.prefix)))
      }
      NonlinearKind::VegaMag => Ok(Payload::Num(magnitude::vega(payload.into_num()?, ctx, true)?)),
      NonlinearKind::ABMag => Ok(Payload::Num(magnitude::ab(payload.into_num()?, ctx, true)?)),
      NonlinearKind::STMag => Ok(Payload::Num(magnitude::st(payload.into_num()?, ctx, true)?)),
      NonlinearKind::AmplitudeMag => {
        Ok(Payload::Num(magnitude::amplitude(payload.into_num()?, self.prefix, true)?))
      }
      NonlinearKind::ColorIndex => {
        Ok(Payload::Num(magnitude::color(payload.into_num()?, ctx, true)?))
      }
      NonlinearKind::JulianDayCalendar => {
        let u = payload.into_num()?;
        Ok(Payload::Date(julian::jd_to_calendar(u.value)))
      }
      NonlinearKind::ModifiedJulianDay => {
        let zero = julian::modified_jd_zero_point(ctx.jtype.as_deref().unwrap_or("MJD"))?;
        Ok(Payload::Num(payload.into_num()? - zero))
      }
      NonlinearKind::Equatorial | NonlinearKind::Galactic | NonlinearKind::Ecliptic => {
        let coord = payload.into_coord()?;
        let out = coords::from_equatorial(self.frame(), &coord, ctx.epoch.as_deref())?;
        Ok(Payload::Coord(out))
      }
    }
  }

  fn frame(&self) -> Frame {
    match self.kind {
      NonlinearKind::Equatorial => Frame::Equatorial,
      NonlinearKind::Galactic => Frame::Galactic,
      NonlinearKind::Ecliptic => Frame::Ecliptic,
      _ => Frame::Equatorial,
    }
  }
}
