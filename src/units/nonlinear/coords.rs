//! Sky-coordinate frames. Every frame converts through the same wire
//! encoding: a complex number whose real part is the
//! right-ascension-like angle and whose imaginary part is the
//! declination-like angle, both in radians, equatorial J2000.
//!
//! The galactic and ecliptic rotations are fixed J2000 matrices, so
//! only the 2000 epoch is supported.

use crate::error::ConvertError;

use num::complex::Complex64;
use once_cell::sync::Lazy;
use regex::Regex;

use std::f64::consts::{PI, TAU};

/// An angle pair on the sky, in radians. Which frame the pair lives in
/// is decided by the unit it is tagged with (`equ`, `gal`, `ecl`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyCoord(pub Complex64);

static SEXAGESIMAL_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^([+-]?)(\d+):(\d+):(\d+(?:\.\d*)?)$").unwrap());

impl SkyCoord {
  pub fn new(lon: f64, lat: f64) -> Self {
    Self(Complex64::new(lon, lat))
  }

  /// Longitude-like angle (right ascension, galactic longitude, ...).
  pub fn lon(&self) -> f64 {
    self.0.re
  }

  /// Latitude-like angle (declination, galactic latitude, ...).
  pub fn lat(&self) -> f64 {
    self.0.im
  }

  /// Parses an equatorial pair: right ascension as sexagesimal hours,
  /// declination as sexagesimal degrees.
  pub fn parse_equatorial(ra: &str, dec: &str) -> Result<Self, ConvertError> {
    Ok(Self::new(parse_hours(ra)?, parse_degrees(dec)?))
  }

  /// Parses a longitude/latitude pair, both as sexagesimal degrees
  /// (galactic and ecliptic input).
  pub fn parse_degrees(lon: &str, lat: &str) -> Result<Self, ConvertError> {
    Ok(Self::new(parse_degrees(lon)?, parse_degrees(lat)?))
  }
}

/// Sexagesimal hour angle (`"17:45:40.4"`) to radians.
pub fn parse_hours(input: &str) -> Result<f64, ConvertError> {
  Ok(parse_sexagesimal(input)? * 15.0 * PI / 180.0)
}

/// Sexagesimal degrees (`"-29:00:28.1"`) to radians.
pub fn parse_degrees(input: &str) -> Result<f64, ConvertError> {
  Ok(parse_sexagesimal(input)? * PI / 180.0)
}

fn parse_sexagesimal(input: &str) -> Result<f64, ConvertError> {
  let caps = SEXAGESIMAL_RE
    .captures(input.trim())
    .ok_or_else(|| ConvertError::MalformedExpression(input.to_owned()))?;
  let sign = if &caps[1] == "-" { -1.0 } else { 1.0 };
  let whole: f64 = caps[2].parse().unwrap_or(f64::NAN);
  let minutes: f64 = caps[3].parse().unwrap_or(f64::NAN);
  let seconds: f64 = caps[4].parse().unwrap_or(f64::NAN);
  Ok(sign * (whole + minutes / 60.0 + seconds / 3600.0))
}

/// Equatorial-to-galactic rotation matrix, J2000 (Hipparcos
/// convention). Row-major; the inverse rotation is the transpose.
const EQU_TO_GAL: [[f64; 3]; 3] = [
  [-0.054875539726, -0.873437108010, -0.483834985808],
  [0.494109453312, -0.444829589425, 0.746982251810],
  [-0.867666135858, -0.198076386122, 0.455983795705],
];

/// Mean obliquity of the ecliptic, J2000 (84381.448 arcsec).
const OBLIQUITY_J2000: f64 = 23.439291111 * PI / 180.0;

/// Which frame a nonlinear coordinate leaf converts from/to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
  Equatorial,
  Galactic,
  Ecliptic,
}

/// Only the J2000 epoch is supported by the fixed rotation matrices.
pub fn check_epoch(epoch: Option<&str>) -> Result<(), ConvertError> {
  match epoch.unwrap_or("2000") {
    "2000" | "2000.0" | "J2000" => Ok(()),
    other => Err(ConvertError::missing(format!("unsupported coordinate epoch '{}'", other))),
  }
}

fn to_vector(coord: &SkyCoord) -> [f64; 3] {
  let (lon, lat) = (coord.lon(), coord.lat());
  [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

fn to_angles(v: [f64; 3]) -> SkyCoord {
  let lon = v[1].atan2(v[0]).rem_euclid(TAU);
  let lat = v[2].asin();
  SkyCoord::new(lon, lat)
}

fn rotate(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
  [
    m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
    m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
    m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
  ]
}

fn rotate_transposed(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
  [
    m[0][0] * v[0] + m[1][0] * v[1] + m[2][0] * v[2],
    m[0][1] * v[0] + m[1][1] * v[1] + m[2][1] * v[2],
    m[0][2] * v[0] + m[1][2] * v[1] + m[2][2] * v[2],
  ]
}

fn ecliptic_matrix() -> [[f64; 3]; 3] {
  let (s, c) = OBLIQUITY_J2000.sin_cos();
  [[1.0, 0.0, 0.0], [0.0, c, s], [0.0, -s, c]]
}

/// Native frame coordinates to the equatorial wire encoding.
pub fn to_equatorial(frame: Frame, coord: &SkyCoord, epoch: Option<&str>) -> Result<SkyCoord, ConvertError> {
  check_epoch(epoch)?;
  match frame {
    Frame::Equatorial => Ok(*coord),
    Frame::Galactic => Ok(to_angles(rotate_transposed(&EQU_TO_GAL, to_vector(coord)))),
    Frame::Ecliptic => Ok(to_angles(rotate_transposed(&ecliptic_matrix(), to_vector(coord)))),
  }
}

/// Equatorial wire encoding back to the native frame.
pub fn from_equatorial(frame: Frame, coord: &SkyCoord, epoch: Option<&str>) -> Result<SkyCoord, ConvertError> {
  check_epoch(epoch)?;
  match frame {
    Frame::Equatorial => Ok(*coord),
    Frame::Galactic => Ok(to_angles(rotate(&EQU_TO_GAL, to_vector(coord)))),
    Frame::Ecliptic => Ok(to_angles(rotate(&ecliptic_matrix(), to_vector(coord)))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::{assert_abs_diff_eq, assert_relative_eq};

  #[test]
  fn test_parse_sexagesimal() {
    assert_relative_eq!(parse_hours("12:00:00").unwrap(), PI, max_relative = 1e-12);
    assert_relative_eq!(
      parse_degrees("-29:00:28.1").unwrap(),
      -(29.0 + 28.1 / 3600.0) * PI / 180.0,
      max_relative = 1e-12,
    );
    assert!(parse_degrees("12d00m00s").is_err());
  }

  #[test]
  fn test_galactic_center_to_equatorial() {
    let gc = SkyCoord::new(0.0, 0.0);
    let equ = to_equatorial(Frame::Galactic, &gc, None).unwrap();
    assert_abs_diff_eq!(equ.lon(), 4.64964, epsilon = 1e-4);
    assert_abs_diff_eq!(equ.lat(), -0.50503, epsilon = 1e-4);
  }

  #[test]
  fn test_sgr_a_to_galactic() {
    let equ = SkyCoord::parse_equatorial("17:45:40.4", "-29:00:28.1").unwrap();
    let gal = from_equatorial(Frame::Galactic, &equ, Some("2000")).unwrap();
    assert_abs_diff_eq!(gal.lon(), 6.28222, epsilon = 1e-3);
    assert_abs_diff_eq!(gal.lat(), -0.000825, epsilon = 1e-3);
  }

  #[test]
  fn test_ecliptic_round_trip() {
    let native = SkyCoord::new(1.25, -0.3);
    let equ = to_equatorial(Frame::Ecliptic, &native, None).unwrap();
    let back = from_equatorial(Frame::Ecliptic, &equ, None).unwrap();
    assert_abs_diff_eq!(back.lon(), native.lon(), epsilon = 1e-12);
    assert_abs_diff_eq!(back.lat(), native.lat(), epsilon = 1e-12);
  }

  #[test]
  fn test_ecliptic_pole() {
    // The north ecliptic pole sits at dec = 90 - obliquity.
    let pole = to_equatorial(Frame::Ecliptic, &SkyCoord::new(0.0, PI / 2.0), None).unwrap();
    assert_abs_diff_eq!(pole.lat(), PI / 2.0 - OBLIQUITY_J2000, epsilon = 1e-12);
  }

  #[test]
  fn test_unknown_epoch_rejected() {
    let c = SkyCoord::new(0.0, 0.0);
    assert!(to_equatorial(Frame::Galactic, &c, Some("1950")).is_err());
  }
}
