//! Resolution of a single normalized token into its scale, SI basis
//! and power.

use crate::error::ConvertError;
use crate::units::nonlinear::NonlinearConverter;
use crate::units::normalize::TOKEN_RE;
use crate::units::tables::{BaseFactor, FACTORS, SCALINGS, SCALINGS_BY_LENGTH};

use once_cell::sync::Lazy;
use regex::Regex;

/// What a token contributes to the running conversion: either a plain
/// multiplicative factor or a non-linear converter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
  Linear(f64),
  Nonlinear(NonlinearConverter),
}

/// A fully resolved token: its scale towards SI, the SI basis string
/// it reduces to, and the power it carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Component {
  pub scale: Scale,
  pub si: &'static str,
  pub power: i64,
}

// Compact scientific notation at the head of a token, two digits of
// mantissa and exponent: "10-14" is 10^-14, "30+05" is 30^5.
static SCI_PLAIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d\d[-+]\d\d").unwrap());
// The e-form equivalent, "10e-14".
static SCI_E_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d\d[eE][-+]\d\d").unwrap());

fn strip_sci_factor(token: &str) -> Result<(f64, &str), ConvertError> {
  let bad = || ConvertError::MalformedExpression(token.to_owned());
  if SCI_PLAIN_RE.is_match(token) {
    let mantissa: f64 = token[0..2].parse().map_err(|_| bad())?;
    let exponent: f64 = token[2..5].parse().map_err(|_| bad())?;
    return Ok((mantissa.powf(exponent), &token[5..]));
  }
  if SCI_E_RE.is_match(token) {
    let mantissa: f64 = token[0..2].parse().map_err(|_| bad())?;
    let exponent: f64 = token[3..6].parse().map_err(|_| bad())?;
    return Ok((mantissa.powf(exponent), &token[6..]));
  }
  Ok((1.0, token))
}

/// Splits one normalized token into factor, basis and power, then
/// resolves the basis against the unit table, trying SI prefixes
/// longest-first when the bare name is unknown.
///
/// `components("km1")` is `(Linear(1000.0), "m", 1)`;
/// `components("hg3")` is `(Linear(0.1), "kg", 3)`.
pub fn components(token: &str) -> Result<Component, ConvertError> {
  let (sci, rest) = strip_sci_factor(token)?;
  let mut factor = sci;
  if rest.is_empty() {
    return Err(ConvertError::MalformedExpression(token.to_owned()));
  }
  let mut piece = rest.to_owned();
  if !piece.ends_with(|c: char| c.is_ascii_digit()) {
    piece.push('1');
  }
  let caps = TOKEN_RE
    .captures(&piece)
    .ok_or_else(|| ConvertError::MalformedExpression(token.to_owned()))?;
  let head = &caps[1];
  if !head.is_empty() {
    let parsed: f64 = head
      .parse()
      .map_err(|_| ConvertError::MalformedExpression(token.to_owned()))?;
    factor *= parsed;
  }
  let basis = caps[2].to_owned();
  let power: i64 = caps[3]
    .parse()
    .map_err(|_| ConvertError::MalformedExpression(token.to_owned()))?;

  let def = match FACTORS.get(basis.as_str()) {
    Some(def) => def,
    None => {
      let mut resolved = None;
      for prefix in SCALINGS_BY_LENGTH.iter() {
        if let Some(bare) = basis.strip_prefix(prefix) {
          if let (Some(scale), Some(def)) = (SCALINGS.get(prefix), FACTORS.get(bare)) {
            factor *= scale;
            resolved = Some(def);
            break;
          }
        }
      }
      resolved.ok_or_else(|| ConvertError::UnknownUnit(basis.clone()))?
    }
  };

  let scale = match def.factor {
    BaseFactor::Linear(f) => Scale::Linear(factor * f),
    BaseFactor::Nonlinear(kind) => Scale::Nonlinear(NonlinearConverter::new(kind).scale(factor)),
  };
  Ok(Component { scale, si: def.si, power })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::units::nonlinear::NonlinearKind;
  use approx::assert_relative_eq;

  fn linear(c: &Component) -> f64 {
    match c.scale {
      Scale::Linear(f) => f,
      Scale::Nonlinear(_) => panic!("expected a linear component"),
    }
  }

  #[test]
  fn test_bare_base_unit() {
    let c = components("m1").unwrap();
    assert_relative_eq!(linear(&c), 1.0);
    assert_eq!((c.si, c.power), ("m", 1));
  }

  #[test]
  fn test_prefix_longest_first() {
    let c = components("mum1").unwrap();
    assert_relative_eq!(linear(&c), 1e-6);
    assert_eq!(c.si, "m");
  }

  #[test]
  fn test_gram_reduces_to_kilogram() {
    let c = components("hg3").unwrap();
    assert_relative_eq!(linear(&c), 0.1, max_relative = 1e-12);
    assert_eq!((c.si, c.power), ("kg", 3));
    let c = components("Mg4").unwrap();
    assert_relative_eq!(linear(&c), 1000.0, max_relative = 1e-12);
  }

  #[test]
  fn test_numeric_head_factor() {
    let c = components("10mW2").unwrap();
    assert_relative_eq!(linear(&c), 0.01, max_relative = 1e-12);
    assert_eq!((c.si, c.power), ("kg m2 s-3", 2));
  }

  #[test]
  fn test_compact_scientific_factor() {
    let c = components("10-14erg1").unwrap();
    assert_relative_eq!(linear(&c), 1e-21, max_relative = 1e-12);
    assert_eq!(c.si, "kg m2 s-2");
    let c = components("10e-14erg1").unwrap();
    assert_relative_eq!(linear(&c), 1e-21, max_relative = 1e-12);
  }

  #[test]
  fn test_negative_power() {
    let c = components("cm-2").unwrap();
    assert_relative_eq!(linear(&c), 1e-2);
    assert_eq!((c.si, c.power), ("m", -2));
  }

  #[test]
  fn test_nonlinear_component_keeps_prefix() {
    let c = components("mF1").unwrap();
    match c.scale {
      Scale::Nonlinear(nl) => {
        assert_eq!(nl.kind, NonlinearKind::Fahrenheit);
        assert_relative_eq!(nl.prefix, 1e-3);
      }
      Scale::Linear(_) => panic!("expected a nonlinear component"),
    }
    assert_eq!(c.si, "K");
  }

  #[test]
  fn test_unknown_basis() {
    assert!(matches!(components("flurbs1"), Err(ConvertError::UnknownUnit(_))));
  }
}
