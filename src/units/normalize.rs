//! Alias and syntax normalization: the first stage of unit parsing.
//!
//! A raw unit string like `"erg/s/cm2/angstrom"` is rewritten into the
//! canonical whitespace-separated token form `"erg s-1 cm-2 A-1"`:
//! spelling aliases are resolved first, then every `/`-divided token
//! is re-emitted with the sign of its exponent flipped.

use crate::error::ConvertError;
use crate::units::tables::ALIASES;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// `(numeric factor)(basis letters)(signed exponent)`.
pub(crate) static TOKEN_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^(\d*)(.+?)(-?\d+)$").unwrap());

/// Rewrites a raw unit string into normalized token form. Fails if a
/// divided token matches no recognizable pattern.
pub fn normalize(unit: &str) -> Result<String, ConvertError> {
  let mut unit = unit.to_owned();
  for (alias, canonical) in ALIASES {
    unit = unit.replace(alias, canonical);
  }

  if !unit.contains('/') {
    return Ok(unit);
  }

  let mut out: Vec<String> = Vec::new();
  for token in unit.split_whitespace() {
    let mut parts = token.split('/');
    // Everything before the first slash keeps its exponent.
    let head = parts.next().unwrap_or("");
    if !head.is_empty() {
      out.push(head.to_owned());
    }
    for after_div in parts {
      let mut piece = after_div.to_owned();
      if piece.is_empty() {
        return Err(ConvertError::MalformedExpression(token.to_owned()));
      }
      if !piece.ends_with(|c: char| c.is_ascii_digit()) {
        piece.push('1');
      }
      let caps = TOKEN_RE
        .captures(&piece)
        .ok_or_else(|| ConvertError::MalformedExpression(token.to_owned()))?;
      let factor = caps.get(1).map_or("", |m| m.as_str());
      let basis = caps.get(2).map_or("", |m| m.as_str());
      let power: i64 = caps[3]
        .parse()
        .map_err(|_| ConvertError::MalformedExpression(token.to_owned()))?;
      out.push(format!("{}{}{}", factor, basis, -power));
    }
  }
  Ok(out.iter().join(" "))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_no_division_passthrough() {
    assert_eq!(normalize("erg s-1 cm-2 A-1").unwrap(), "erg s-1 cm-2 A-1");
  }

  #[test]
  fn test_alias_resolution() {
    assert_eq!(normalize("erg s-1 cm-2 angstrom-1").unwrap(), "erg s-1 cm-2 A-1");
    assert_eq!(normalize("micron").unwrap(), "mum");
    assert_eq!(normalize("Hz").unwrap(), "hz");
    assert_eq!(normalize("Jansky").unwrap(), "Jy");
  }

  #[test]
  fn test_division_rewrite() {
    assert_eq!(normalize("erg/s/cm2/A").unwrap(), "erg s-1 cm-2 A-1");
    assert_eq!(normalize("m/s").unwrap(), "m s-1");
    assert_eq!(normalize("km/h").unwrap(), "km h-1");
    assert_eq!(normalize("cy/d").unwrap(), "cy d-1");
  }

  #[test]
  fn test_division_with_explicit_exponent() {
    assert_eq!(normalize("W/m2").unwrap(), "W m-2");
    assert_eq!(normalize("kg/m-1").unwrap(), "kg m1");
  }

  #[test]
  fn test_division_keeps_numeric_factor() {
    assert_eq!(normalize("10mW m-2/nm").unwrap(), "10mW m-2 nm-1");
  }

  #[test]
  fn test_mixed_token() {
    assert_eq!(normalize("erg s-1 cm-2/A").unwrap(), "erg s-1 cm-2 A-1");
  }

  #[test]
  fn test_caret_stripped() {
    assert_eq!(normalize("m^2").unwrap(), "m2");
    assert_eq!(normalize("m**2").unwrap(), "m2");
  }

  #[test]
  fn test_malformed_division() {
    assert!(matches!(
      normalize("m/2").unwrap_err(),
      ConvertError::MalformedExpression(_),
    ));
  }
}
