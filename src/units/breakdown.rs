//! Reduction of a full unit expression to a scale and a canonical SI
//! dimensional signature.

use crate::error::ConvertError;
use crate::units::decompose::{components, Scale};
use crate::units::normalize::normalize;

use itertools::Itertools;

/// Reduces `unit` to `(scale, signature)`: the total scale towards SI
/// and the canonical signature string, base tokens sorted and joined
/// with single spaces ("kg1 m-1 s-3"). A dimensionless expression
/// reduces to the empty signature.
///
/// At most one non-linear unit may occur in the expression.
pub fn breakdown(unit: &str) -> Result<(Scale, String), ConvertError> {
  let normalized = normalize(unit)?;
  let mut total = Scale::Linear(1.0);
  // Signature accumulation: basis -> summed power, insertion-ordered.
  let mut dims: Vec<(&'static str, i64)> = Vec::new();
  for token in normalized.split_whitespace() {
    let c = components(token)?;
    total = match (total, c.scale) {
      (Scale::Linear(t), Scale::Linear(f)) => Scale::Linear(t * f.powi(c.power as i32)),
      (Scale::Linear(t), Scale::Nonlinear(nl)) => {
        Scale::Nonlinear(nl.raise_power(c.power).scale(t))
      }
      (Scale::Nonlinear(nl), Scale::Linear(f)) => {
        Scale::Nonlinear(nl.scale(f.powi(c.power as i32)))
      }
      (Scale::Nonlinear(_), Scale::Nonlinear(_)) => {
        return Err(ConvertError::MalformedExpression(format!(
          "more than one non-linear unit in '{}'",
          unit,
        )))
      }
    };
    // The SI string of a composite token is itself a list of base
    // tokens; their scale is already folded into the table factor.
    for base in c.si.split_whitespace() {
      let inner = components(base)?;
      let power = inner.power * c.power;
      match dims.iter_mut().find(|(basis, _)| *basis == inner.si) {
        Some((_, p)) => *p += power,
        None => dims.push((inner.si, power)),
      }
    }
  }
  let signature = dims
    .iter()
    .filter(|(_, p)| *p != 0)
    .map(|(basis, p)| format!("{}{}", basis, p))
    .sorted()
    .join(" ");
  Ok((total, signature))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::units::nonlinear::NonlinearKind;
  use approx::assert_relative_eq;

  fn linear(unit: &str) -> (f64, String) {
    match breakdown(unit).unwrap() {
      (Scale::Linear(f), sig) => (f, sig),
      (Scale::Nonlinear(_), _) => panic!("expected a linear breakdown for {}", unit),
    }
  }

  #[test]
  fn test_simple_units() {
    let (f, sig) = linear("km");
    assert_relative_eq!(f, 1000.0);
    assert_eq!(sig, "m1");
    let (f, sig) = linear("kg");
    assert_relative_eq!(f, 1.0);
    assert_eq!(sig, "kg1");
  }

  #[test]
  fn test_flux_density_signature() {
    let (f, sig) = linear("erg/s/cm2/A");
    assert_relative_eq!(f, 1e7, max_relative = 1e-12);
    assert_eq!(sig, "kg1 m-1 s-3");
    let (f, sig) = linear("Jy");
    assert_relative_eq!(f, 1e-26);
    assert_eq!(sig, "cy-1 kg1 s-2");
  }

  #[test]
  fn test_signature_is_sorted_and_commutative() {
    let (_, a) = linear("m s-1");
    let (_, b) = linear("s-1 m");
    assert_eq!(a, b);
    assert_eq!(a, "m1 s-1");
  }

  #[test]
  fn test_cancellation_drops_basis() {
    let (f, sig) = linear("m s-1 s m-1");
    assert_relative_eq!(f, 1.0);
    assert_eq!(sig, "");
  }

  #[test]
  fn test_pure_scaling_units() {
    let (f, sig) = linear("sidereal");
    assert_relative_eq!(f, 1.0027379093);
    assert_eq!(sig, "");
    let (f, sig) = linear("pph");
    assert_relative_eq!(f, 0.01);
    assert_eq!(sig, "ampl1");
  }

  #[test]
  fn test_steradian_expands_to_rad2() {
    let (f, sig) = linear("sr");
    assert_relative_eq!(f, 1.0);
    assert_eq!(sig, "rad2");
    let (f, sig) = linear("deg2");
    assert_relative_eq!(f, (std::f64::consts::PI / 180.0).powi(2), max_relative = 1e-12);
    assert_eq!(sig, "rad2");
  }

  #[test]
  fn test_hertz_carries_cycles() {
    let (f, sig) = linear("hz");
    assert_relative_eq!(f, 1.0);
    assert_eq!(sig, "cy1 s-1");
    let (f, sig) = linear("rpm");
    assert_relative_eq!(f, 0.104719755);
    assert_eq!(sig, "rad1 s-1");
  }

  #[test]
  fn test_nonlinear_breakdown() {
    let (scale, sig) = breakdown("mF").unwrap();
    assert_eq!(sig, "K1");
    match scale {
      Scale::Nonlinear(nl) => {
        assert_eq!(nl.kind, NonlinearKind::Fahrenheit);
        assert_relative_eq!(nl.prefix, 1e-3);
      }
      Scale::Linear(_) => panic!("expected a nonlinear scale"),
    }
  }

  #[test]
  fn test_two_nonlinear_units_rejected() {
    assert!(matches!(
      breakdown("F C"),
      Err(ConvertError::MalformedExpression(_)),
    ));
  }

  #[test]
  fn test_idempotence_on_signature() {
    let (_, sig) = linear("erg/s/cm2/A");
    let (f, again) = linear(&sig);
    assert_eq!(sig, again);
    assert_relative_eq!(f, 1.0);
  }

  #[test]
  fn test_numeric_factor_in_expression() {
    let (f, sig) = linear("10mW m-2/nm");
    assert_relative_eq!(f, 0.01 / 1e-9, max_relative = 1e-12);
    assert_eq!(sig, "kg1 m-1 s-3");
  }
}
