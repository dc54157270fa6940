//! The conversion engine: breaks both unit expressions down to their
//! SI signatures, then scales, bridges or transforms the value across.

use crate::error::ConvertError;
use crate::uncertainty::Uncertain;
use crate::units::breakdown::breakdown;
use crate::units::decompose::{components, Scale};
use crate::units::nonlinear::coords::SkyCoord;
use crate::units::nonlinear::julian::CalendarDate;
use crate::units::switch::SWITCH;

use once_cell::sync::Lazy;
use regex::Regex;

use std::collections::BTreeSet;

/// A value entering or leaving the engine. Most conversions take a
/// scalar or a value with a one-sigma error; calendar dates and sky
/// coordinates ride through the same pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
  Scalar(f64),
  /// Value with its one-sigma uncertainty.
  Uncertain(f64, f64),
  Date(CalendarDate),
  Coord(SkyCoord),
}

impl Value {
  fn into_payload(self) -> (Payload, bool) {
    match self {
      Value::Scalar(v) => (Payload::Num(Uncertain::exact(v)), false),
      Value::Uncertain(v, s) => (Payload::Num(Uncertain::new(v, s)), true),
      Value::Date(d) => (Payload::Date(d), false),
      Value::Coord(c) => (Payload::Coord(c), false),
    }
  }

  /// The scalar inside, discarding any uncertainty.
  pub fn scalar(&self) -> Option<f64> {
    match self {
      Value::Scalar(v) => Some(*v),
      Value::Uncertain(v, _) => Some(*v),
      _ => None,
    }
  }

  pub fn date(&self) -> Option<&CalendarDate> {
    match self {
      Value::Date(d) => Some(d),
      _ => None,
    }
  }

  pub fn coord(&self) -> Option<&SkyCoord> {
    match self {
      Value::Coord(c) => Some(c),
      _ => None,
    }
  }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self {
    Value::Scalar(v)
  }
}

impl From<(f64, f64)> for Value {
  fn from((v, s): (f64, f64)) -> Self {
    Value::Uncertain(v, s)
  }
}

impl From<CalendarDate> for Value {
  fn from(d: CalendarDate) -> Self {
    Value::Date(d)
  }
}

impl From<SkyCoord> for Value {
  fn from(c: SkyCoord) -> Self {
    Value::Coord(c)
  }
}

/// What actually flows through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Payload {
  Num(Uncertain),
  Date(CalendarDate),
  Coord(SkyCoord),
}

impl Payload {
  pub(crate) fn into_num(self) -> Result<Uncertain, ConvertError> {
    match self {
      Payload::Num(u) => Ok(u),
      Payload::Date(_) => Err(ConvertError::arity("got a calendar date where a number was expected")),
      Payload::Coord(_) => Err(ConvertError::arity("got a sky coordinate where a number was expected")),
    }
  }

  pub(crate) fn into_date(self) -> Result<CalendarDate, ConvertError> {
    match self {
      Payload::Date(d) => Ok(d),
      _ => Err(ConvertError::arity("expected a calendar date")),
    }
  }

  pub(crate) fn into_coord(self) -> Result<SkyCoord, ConvertError> {
    match self {
      Payload::Coord(c) => Ok(c),
      _ => Err(ConvertError::arity("expected a sky coordinate")),
    }
  }

  // Dates and coordinates admit no linear scaling; a factor of one
  // passes them through untouched.
  fn scale(self, factor: f64) -> Result<Payload, ConvertError> {
    match self {
      Payload::Num(u) => Ok(Payload::Num(u * factor)),
      other if factor == 1.0 => Ok(other),
      _ => Err(ConvertError::arity("cannot scale a calendar date or sky coordinate")),
    }
  }

  fn unscale(self, factor: f64) -> Result<Payload, ConvertError> {
    match self {
      Payload::Num(u) => Ok(Payload::Num(u / factor)),
      other if factor == 1.0 => Ok(other),
      _ => Err(ConvertError::arity("cannot scale a calendar date or sky coordinate")),
    }
  }
}

/// A reference quantity in the conversion context: already in SI, or
/// a value (with optional error) in an explicit unit.
#[derive(Debug, Clone, PartialEq)]
pub enum CtxQuantity {
  Si(f64),
  WithUnit { value: f64, error: Option<f64>, unit: String },
}

impl CtxQuantity {
  fn to_si(&self, name: &str) -> Result<(Uncertain, bool), ConvertError> {
    match self {
      CtxQuantity::Si(v) => Ok((Uncertain::exact(*v), false)),
      CtxQuantity::WithUnit { value, error, unit } => {
        let (scale, _) = breakdown(unit)?;
        let factor = match scale {
          Scale::Linear(f) => f,
          Scale::Nonlinear(_) => {
            return Err(ConvertError::MalformedExpression(format!(
              "non-linear unit in context quantity '{}'",
              name,
            )))
          }
        };
        match error {
          Some(e) => Ok((Uncertain::new(factor * value, factor * e), true)),
          None => Ok((Uncertain::exact(factor * value), false)),
        }
      }
    }
  }
}

/// Reference quantities and settings steering a conversion. Tuple
/// quantities are normalized to SI before the conversion proper.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
  pub wave: Option<CtxQuantity>,
  pub freq: Option<CtxQuantity>,
  pub ang_diam: Option<CtxQuantity>,
  pub radius: Option<CtxQuantity>,
  pub pix: Option<CtxQuantity>,
  pub photband: Option<String>,
  /// Modified Julian day flavour: MJD, COROT or HIP.
  pub jtype: Option<String>,
  pub epoch: Option<String>,
}

impl Context {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn wave(mut self, value: f64, unit: &str) -> Self {
    self.wave = Some(CtxQuantity::WithUnit { value, error: None, unit: unit.to_owned() });
    self
  }

  pub fn wave_with_error(mut self, value: f64, error: f64, unit: &str) -> Self {
    self.wave = Some(CtxQuantity::WithUnit { value, error: Some(error), unit: unit.to_owned() });
    self
  }

  pub fn freq(mut self, value: f64, unit: &str) -> Self {
    self.freq = Some(CtxQuantity::WithUnit { value, error: None, unit: unit.to_owned() });
    self
  }

  pub fn ang_diam(mut self, value: f64, unit: &str) -> Self {
    self.ang_diam = Some(CtxQuantity::WithUnit { value, error: None, unit: unit.to_owned() });
    self
  }

  pub fn radius(mut self, value: f64, unit: &str) -> Self {
    self.radius = Some(CtxQuantity::WithUnit { value, error: None, unit: unit.to_owned() });
    self
  }

  pub fn pix(mut self, value: f64, unit: &str) -> Self {
    self.pix = Some(CtxQuantity::WithUnit { value, error: None, unit: unit.to_owned() });
    self
  }

  pub fn photband(mut self, photband: &str) -> Self {
    self.photband = Some(photband.to_owned());
    self
  }

  pub fn jtype(mut self, jtype: &str) -> Self {
    self.jtype = Some(jtype.to_owned());
    self
  }

  pub fn epoch(mut self, epoch: &str) -> Self {
    self.epoch = Some(epoch.to_owned());
    self
  }

  fn to_si(&self) -> Result<SiContext, ConvertError> {
    fn put(
      slot: &mut Option<Uncertain>,
      q: &Option<CtxQuantity>,
      name: &str,
      carried: &mut bool,
    ) -> Result<(), ConvertError> {
      if let Some(q) = q {
        let (u, has_sigma) = q.to_si(name)?;
        *carried |= has_sigma;
        *slot = Some(u);
      }
      Ok(())
    }
    let mut ctx = SiContext::default();
    let mut carried = false;
    put(&mut ctx.wave, &self.wave, "wave", &mut carried)?;
    put(&mut ctx.freq, &self.freq, "freq", &mut carried)?;
    put(&mut ctx.ang_diam, &self.ang_diam, "ang_diam", &mut carried)?;
    put(&mut ctx.radius, &self.radius, "radius", &mut carried)?;
    put(&mut ctx.pix, &self.pix, "pix", &mut carried)?;
    ctx.carried_sigma = carried;
    ctx.photband = self.photband.as_deref().map(str::to_uppercase);
    ctx.jtype = self.jtype.clone();
    ctx.epoch = self.epoch.clone();
    Ok(ctx)
  }
}

/// The context after normalization to SI.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SiContext {
  pub wave: Option<Uncertain>,
  pub freq: Option<Uncertain>,
  pub ang_diam: Option<Uncertain>,
  pub radius: Option<Uncertain>,
  pub pix: Option<Uncertain>,
  pub photband: Option<String>,
  pub jtype: Option<String>,
  pub epoch: Option<String>,
  /// True when a context quantity carried an uncertainty, so the
  /// result keeps its sigma even for an exact input.
  pub carried_sigma: bool,
}

// '[unit]' marks a logarithmic axis.
static LOG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.*)\]").unwrap());

fn strip_log(unit: &str) -> (&str, bool) {
  match LOG_RE.captures(unit) {
    Some(caps) => match caps.get(1) {
      Some(inner) => (inner.as_str(), true),
      None => (unit, false),
    },
    None => (unit, false),
  }
}

/// Converts `value` from one unit expression to another.
///
/// Commensurate units are scaled directly. Non-commensurate units are
/// bridged through the physical transforms in the switch table, which
/// consume reference quantities from the context. The result carries
/// an uncertainty when the input or any context quantity did.
pub fn convert(from: &str, to: &str, value: Value, ctx: &Context) -> Result<Value, ConvertError> {
  let si_ctx = ctx.to_si()?;
  let (payload, had_sigma) = value.into_payload();
  let out = convert_payload(from, to, payload, &si_ctx)?;
  Ok(match out {
    Payload::Num(u) => {
      if had_sigma || si_ctx.carried_sigma {
        Value::Uncertain(u.nominal(), u.std_dev())
      } else {
        Value::Scalar(u.nominal())
      }
    }
    Payload::Date(d) => Value::Date(d),
    Payload::Coord(c) => Value::Coord(c),
  })
}

/// Scalar-to-scalar conversion with an empty context.
pub fn convert_scalar(from: &str, to: &str, value: f64) -> Result<f64, ConvertError> {
  convert(from, to, Value::Scalar(value), &Context::default())?
    .scalar()
    .ok_or_else(|| ConvertError::arity("conversion did not produce a number"))
}

/// Converts a value with its one-sigma error, with an empty context.
pub fn convert_with_error(
  from: &str,
  to: &str,
  value: f64,
  error: f64,
) -> Result<(f64, f64), ConvertError> {
  match convert(from, to, Value::Uncertain(value, error), &Context::default())? {
    Value::Uncertain(v, s) => Ok((v, s)),
    Value::Scalar(v) => Ok((v, 0.0)),
    _ => Err(ConvertError::arity("conversion did not produce a number")),
  }
}

/// Batch conversion: `from` and `to` broadcast against the values
/// when given as single-element slices. Elements that fail to convert
/// come back as NaN.
pub fn nconvert(from: &[&str], to: &[&str], values: &[f64], ctx: &Context) -> Vec<f64> {
  values
    .iter()
    .enumerate()
    .map(|(i, &value)| {
      let (f, t) = match broadcast_units(from, to, i) {
        Some(pair) => pair,
        None => {
          log::debug!("no unit for element {}", i);
          return f64::NAN;
        }
      };
      match convert(f, t, Value::Scalar(value), ctx) {
        Ok(out) => out.scalar().unwrap_or(f64::NAN),
        Err(e) => {
          log::debug!("conversion of element {} from {} to {} failed: {}", i, f, t, e);
          f64::NAN
        }
      }
    })
    .collect()
}

/// Batch conversion of values paired with their one-sigma errors.
/// Broadcasting and failure handling as in [`nconvert`]; a failing
/// element comes back as a NaN pair.
pub fn nconvert_with_errors(
  from: &[&str],
  to: &[&str],
  values: &[f64],
  errors: &[f64],
  ctx: &Context,
) -> Vec<(f64, f64)> {
  values
    .iter()
    .zip(errors)
    .enumerate()
    .map(|(i, (&value, &error))| {
      let (f, t) = match broadcast_units(from, to, i) {
        Some(pair) => pair,
        None => {
          log::debug!("no unit for element {}", i);
          return (f64::NAN, f64::NAN);
        }
      };
      match convert(f, t, Value::Uncertain(value, error), ctx) {
        Ok(Value::Uncertain(v, s)) => (v, s),
        Ok(Value::Scalar(v)) => (v, 0.0),
        Ok(_) => (f64::NAN, f64::NAN),
        Err(e) => {
          log::debug!("conversion of element {} from {} to {} failed: {}", i, f, t, e);
          (f64::NAN, f64::NAN)
        }
      }
    })
    .collect()
}

fn broadcast_units<'a>(from: &[&'a str], to: &[&'a str], i: usize) -> Option<(&'a str, &'a str)> {
  let f = if from.len() == 1 { Some(&from[0]) } else { from.get(i) };
  let t = if to.len() == 1 { Some(&to[0]) } else { to.get(i) };
  match (f, t) {
    (Some(f), Some(t)) => Some((*f, *t)),
    _ => None,
  }
}

pub(crate) fn convert_num(
  from: &str,
  to: &str,
  value: Uncertain,
  ctx: &SiContext,
) -> Result<Uncertain, ConvertError> {
  convert_payload(from, to, Payload::Num(value), ctx)?.into_num()
}

pub(crate) fn convert_payload(
  from: &str,
  to: &str,
  payload: Payload,
  ctx: &SiContext,
) -> Result<Payload, ConvertError> {
  let (from_unit, from_logged) = strip_log(from);
  let (to_unit, to_logged) = strip_log(to);

  let mut payload = payload;
  if from_logged {
    payload = Payload::Num(payload.into_num()?.exp10());
  }

  let (fac_from, uni_from) = breakdown(from_unit)?;
  // 'SI' as a target means the from-side signature itself.
  let (fac_to, uni_to) = if to_unit == "SI" {
    (Scale::Linear(1.0), uni_from.clone())
  } else {
    breakdown(to_unit)?
  };

  let mut ctx = ctx.clone();
  if uni_from != uni_to && ctx.wave.is_none() {
    if uni_from == "m1" {
      if let (Payload::Num(u), Scale::Linear(f)) = (&payload, &fac_from) {
        ctx.wave = Some(*u * *f);
        log::warn!("no reference wavelength given; taking the input value itself");
      }
    } else if uni_from == "cy1 s-1" {
      if let (Payload::Num(u), Scale::Linear(f)) = (&payload, &fac_from) {
        ctx.freq = Some(*u * *f);
        log::warn!("no reference frequency given; taking the input value itself");
      }
    }
  }

  log::debug!("convert {} ({}) to {} ({})", from_unit, uni_from, to_unit, uni_to);

  let mid = if uni_from == uni_to {
    match fac_from {
      Scale::Nonlinear(nl) => nl.forward(payload, &ctx)?,
      Scale::Linear(f) => payload.scale(f)?,
    }
  } else {
    bridge(from, to, payload, fac_from, &uni_from, &uni_to, &ctx)?
  };

  let out = match fac_to {
    Scale::Nonlinear(nl) => nl.inverse(mid, &ctx)?,
    Scale::Linear(f) => mid.unscale(f)?,
  };

  if to_logged {
    Ok(Payload::Num(out.into_num()?.log10()))
  } else {
    Ok(out)
  }
}

/// Crosses a dimensional gap: cancels the shared part of the two
/// signatures, pushes the to-side surplus to the left with negated
/// powers, and hands the leftover signature to the switch table.
fn bridge(
  from: &str,
  to: &str,
  payload: Payload,
  fac_from: Scale,
  uni_from: &str,
  uni_to: &str,
  ctx: &SiContext,
) -> Result<Payload, ConvertError> {
  let mut start = payload.into_num()?;
  let from_tokens: BTreeSet<&str> = uni_from.split_whitespace().collect();
  let to_tokens: BTreeSet<&str> = uni_to.split_whitespace().collect();
  let mut left_parts: Vec<String> = Vec::new();
  for token in from_tokens.difference(&to_tokens) {
    let c = components(token)?;
    left_parts.push(format!("{}{}", c.si, c.power));
  }
  for token in to_tokens.difference(&from_tokens) {
    let c = components(token)?;
    left_parts.push(format!("{}{}", c.si, -c.power));
  }
  let (_, leftover) = breakdown(&left_parts.join(" "))?;
  let mut key: String = leftover.split_whitespace().collect();

  // Angular leftovers are peeled off first; at most one applies.
  let mut fac_from = fac_from;
  for marker in ["rad2", "rad-2", "rad1", "rad-1"] {
    if key.contains(marker) {
      let bridge_fn = SWITCH[format!("{}_to_", marker).as_str()];
      start = match fac_from {
        Scale::Linear(f) => bridge_fn(start, ctx)? * f,
        Scale::Nonlinear(nl) => {
          bridge_fn(nl.forward(Payload::Num(start), ctx)?.into_num()?, ctx)?
        }
      };
      key = key.replace(marker, "");
      fac_from = Scale::Linear(1.0);
      break;
    }
  }

  if key.is_empty() {
    return match fac_from {
      Scale::Linear(f) => Ok(Payload::Num(start * f)),
      Scale::Nonlinear(nl) => nl.forward(Payload::Num(start), ctx),
    };
  }

  let switch_key = format!("{}_to_", key);
  let bridge_fn = match SWITCH.get(switch_key.as_str()) {
    Some(f) => *f,
    None => {
      return Err(ConvertError::UnsupportedConversion {
        from: from.to_owned(),
        to: to.to_owned(),
        key: switch_key,
      })
    }
  };
  let staged = match fac_from {
    Scale::Nonlinear(nl) => nl.forward(Payload::Num(start), ctx)?.into_num()?,
    Scale::Linear(f) => start * f,
  };
  Ok(Payload::Num(bridge_fn(staged, ctx)?))
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;

  fn scalar(from: &str, to: &str, value: f64) -> f64 {
    convert_scalar(from, to, value).unwrap()
  }

  #[test]
  fn test_linear_scaling() {
    assert_relative_eq!(scalar("km", "cm", 1.0), 100000.0);
    assert_relative_eq!(scalar("m/s", "km/h", 1.0), 3.6, max_relative = 1e-12);
    assert_relative_eq!(
      scalar("km/h", "nRsol/s", 1.0),
      0.39939292275740873,
      max_relative = 1e-12,
    );
  }

  #[test]
  fn test_error_propagation() {
    let (v, e) = convert_with_error("m/s", "km/h", 1.0, 0.1).unwrap();
    assert_relative_eq!(v, 3.6, max_relative = 1e-12);
    assert_relative_eq!(e, 0.36, max_relative = 1e-12);
    let (v, e) = convert_with_error("m", "km", 1000.0, 10.0).unwrap();
    assert_relative_eq!(v, 1.0);
    assert_relative_eq!(e, 0.01);
  }

  #[test]
  fn test_scalar_in_scalar_out() {
    let out = convert("m", "km", Value::Scalar(1000.0), &Context::default()).unwrap();
    assert_eq!(out, Value::Scalar(1.0));
  }

  #[test]
  fn test_context_sigma_is_carried() {
    let ctx = Context::new().wave_with_error(10000.0, 100.0, "A");
    let out = convert("Jy", "erg/s/cm2/A", Value::Scalar(1e-3), &ctx).unwrap();
    match out {
      Value::Uncertain(_, s) => assert!(s > 0.0),
      other => panic!("expected an uncertain result, got {:?}", other),
    }
  }

  #[test]
  fn test_temperature() {
    assert_relative_eq!(scalar("F", "K", 123.0), 323.7055555555555, max_relative = 1e-12);
    assert_relative_eq!(scalar("C", "K", 0.0), 273.15);
    assert_relative_eq!(scalar("K", "C", 273.15), 0.0, epsilon = 1e-10);
  }

  #[test]
  fn test_fnu_to_flambda_with_wave() {
    let ctx = Context::new().wave(10000.0, "A");
    let out = convert("Jy", "erg/s/cm2/A", Value::Scalar(333.56409519815202), &ctx).unwrap();
    let v = out.scalar().unwrap();
    assert_relative_eq!(v, 1e-10, max_relative = 1e-10);
  }

  #[test]
  fn test_fnu_to_flambda_with_freq() {
    let wave = 1e-6;
    let by_wave = convert(
      "Jy",
      "W/m3",
      Value::Scalar(1.0),
      &Context::new().wave(wave, "m"),
    )
    .unwrap();
    let by_freq = convert(
      "Jy",
      "W/m3",
      Value::Scalar(1.0),
      &Context::new().freq(crate::constants::SPEED_OF_LIGHT / wave, "hz"),
    )
    .unwrap();
    assert_relative_eq!(
      by_wave.scalar().unwrap(),
      by_freq.scalar().unwrap(),
      max_relative = 1e-12,
    );
  }

  #[test]
  fn test_solid_angle() {
    assert_relative_eq!(scalar("sr", "deg2", 1.0), 3282.806350011744, max_relative = 1e-10);
  }

  #[test]
  fn test_per_steradian_with_angular_diameter() {
    let ctx = Context::new().ang_diam(2.0, "rad");
    let out = convert("W/m2", "W/m2/sr", Value::Scalar(std::f64::consts::PI), &ctx).unwrap();
    assert_relative_eq!(out.scalar().unwrap(), 1.0, max_relative = 1e-12);
  }

  #[test]
  fn test_default_wavelength_inference() {
    // With no reference wavelength, A to km/s takes the input itself.
    let shifted = convert("A", "km/s", Value::Scalar(4553.0), &Context::default()).unwrap();
    assert_relative_eq!(shifted.scalar().unwrap(), 0.0, epsilon = 1e-9);
  }

  #[test]
  fn test_doppler_shift() {
    let ctx = Context::new().wave(4553.0, "A");
    let out = convert("A", "km/s", Value::Scalar(4553.455), &ctx).unwrap();
    let expected = 0.455 / 4553.0 * crate::constants::SPEED_OF_LIGHT / 1000.0;
    assert_relative_eq!(out.scalar().unwrap(), expected, max_relative = 1e-9);
  }

  #[test]
  fn test_calendar_to_julian_day() {
    let date = CalendarDate::new(1985, 7, 11.31458);
    let out = convert("CD", "JD", Value::Date(date), &Context::default()).unwrap();
    assert_relative_eq!(out.scalar().unwrap(), 2446257.81458, max_relative = 1e-12);
    let back = convert("JD", "CD", Value::Scalar(2446257.81458), &Context::default()).unwrap();
    let d = back.date().unwrap();
    assert_eq!((d.year, d.month), (1985, 7));
    assert_relative_eq!(d.day, 11.31458, max_relative = 1e-9);
  }

  #[test]
  fn test_modified_julian_day_flavours() {
    let ctx = Context::new().jtype("COROT");
    let out = convert("MJD", "JD", Value::Scalar(0.0), &ctx).unwrap();
    assert_relative_eq!(out.scalar().unwrap(), 2451545.0);
    let out = convert("MJD", "JD", Value::Scalar(0.0), &Context::default()).unwrap();
    assert_relative_eq!(out.scalar().unwrap(), 2400000.5);
  }

  #[test]
  fn test_coordinate_frames() {
    let sgr = SkyCoord::parse_equatorial("17:45:40.4", "-29:00:28.1").unwrap();
    let out = convert("equ", "gal", Value::Coord(sgr), &Context::new().epoch("2000")).unwrap();
    let gal = out.coord().unwrap();
    assert_relative_eq!(gal.lon(), 6.282224277178722, max_relative = 1e-6);
    assert_relative_eq!(gal.lat(), -0.00082517883389919317, epsilon = 1e-6);
  }

  #[test]
  fn test_magnitude_to_flux() {
    let ctx = Context::new().photband("JOHNSON.V");
    let entry = crate::photometry::calibration().get("JOHNSON.V").unwrap();
    let out = convert("mag", "W/m3", Value::Scalar(entry.vegamag), &ctx).unwrap();
    assert_relative_eq!(out.scalar().unwrap(), entry.flam0 * 1e7, max_relative = 1e-10);
    let back = convert("W/m3", "mag", Value::Scalar(entry.flam0 * 1e7), &ctx).unwrap();
    assert_relative_eq!(back.scalar().unwrap(), entry.vegamag, epsilon = 1e-10);
  }

  #[test]
  fn test_magnitude_to_jansky() {
    // mag to Jy crosses both the zero point and the Flam/Fnu bridge.
    let ctx = Context::new().photband("JOHNSON.V");
    let entry = crate::photometry::calibration().get("JOHNSON.V").unwrap();
    let out = convert("mag", "Jy", Value::Scalar(entry.vegamag), &ctx).unwrap();
    let wave = entry.eff_wave * 1e-10;
    let expected = entry.flam0 * 1e7 * wave * wave / crate::constants::SPEED_OF_LIGHT / 1e-26;
    assert_relative_eq!(out.scalar().unwrap(), expected, max_relative = 1e-10);
  }

  #[test]
  fn test_logarithmic_brackets() {
    assert_relative_eq!(scalar("[m]", "m", 3.0), 1000.0, max_relative = 1e-12);
    assert_relative_eq!(scalar("m", "[m]", 1000.0), 3.0, max_relative = 1e-12);
    assert_relative_eq!(scalar("[cm]", "[m]", 2.0), 0.0, epsilon = 1e-12);
  }

  #[test]
  fn test_si_target() {
    assert_relative_eq!(scalar("km", "SI", 1.0), 1000.0);
    assert_relative_eq!(scalar("erg/s/cm2/A", "SI", 1.0), 1e7, max_relative = 1e-12);
  }

  #[test]
  fn test_unknown_unit() {
    assert!(matches!(
      convert_scalar("flurbs", "m", 1.0),
      Err(ConvertError::UnknownUnit(_)),
    ));
  }

  #[test]
  fn test_unsupported_conversion() {
    let err = convert_scalar("kg", "m", 1.0).unwrap_err();
    match err {
      ConvertError::UnsupportedConversion { key, .. } => assert_eq!(key, "kg1m-1_to_"),
      other => panic!("unexpected error {:?}", other),
    }
  }

  #[test]
  fn test_nconvert_broadcasts_and_substitutes_nan() {
    let out = nconvert(
      &["km"],
      &["m"],
      &[1.0, 2.0, 3.0],
      &Context::default(),
    );
    assert_eq!(out, vec![1000.0, 2000.0, 3000.0]);
    let out = nconvert(&["km", "kg"], &["m", "m"], &[1.0, 1.0], &Context::default());
    assert_relative_eq!(out[0], 1000.0);
    assert!(out[1].is_nan());
  }

  #[test]
  fn test_nconvert_with_errors() {
    let out = nconvert_with_errors(
      &["km"],
      &["m"],
      &[1.0, 2.0],
      &[0.1, 0.2],
      &Context::default(),
    );
    assert_relative_eq!(out[0].0, 1000.0);
    assert_relative_eq!(out[0].1, 100.0);
    assert_relative_eq!(out[1].0, 2000.0);
    assert_relative_eq!(out[1].1, 200.0);
    let out = nconvert_with_errors(
      &["km", "kg"],
      &["m", "m"],
      &[1.0, 1.0],
      &[0.1, 0.1],
      &Context::default(),
    );
    assert_relative_eq!(out[0].0, 1000.0);
    assert!(out[1].0.is_nan() && out[1].1.is_nan());
  }
}
