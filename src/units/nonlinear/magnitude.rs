//! Magnitude scales: Vega, AB and ST zero-point systems, variability
//! amplitudes, and color indices.
//!
//! The zero-point systems need a passband from the context to resolve
//! their reference flux; amplitudes are passband-free. Color indices
//! recurse into the conversion engine once per constituent band.

use crate::error::ConvertError;
use crate::photometry;
use crate::uncertainty::Uncertain;
use crate::units::convert::{convert_num, SiContext};

/// Monochromatic AB reference flux, W/m2/Hz (3631 Jy).
pub const AB_ZERO_FLUX: f64 = 3.6307805477010024e-23;

/// Monochromatic ST reference flux, W/m3 (3.6307805477e-9 erg/s/cm2/A).
pub const ST_ZERO_FLUX: f64 = 0.036307805477010027;

fn passband(ctx: &SiContext) -> Result<&str, ConvertError> {
  ctx
    .photband
    .as_deref()
    .ok_or_else(|| ConvertError::missing("photometric passband (photband) not given"))
}

/// Uncalibrated zero points are NaN in the table; treat them as zero
/// so the pure flux-ratio definition still applies.
fn zero_point(mag0: f64) -> f64 {
  if mag0.is_nan() {
    0.0
  } else {
    mag0
  }
}

/// Vega magnitude to F-lambda (W/m3) or back. The reference flux is
/// the passband's `Flam0` brought to SI through the engine itself.
pub fn vega(meas: Uncertain, ctx: &SiContext, inverse: bool) -> Result<Uncertain, ConvertError> {
  let entry = photometry::calibration().get(passband(ctx)?)?;
  let f0 = convert_num(&entry.flam0_units, "W/m3", Uncertain::exact(entry.flam0), &SiContext::default())?;
  let mag0 = zero_point(entry.vegamag);
  if inverse {
    Ok((meas / f0).log10() * -2.5 + mag0)
  } else {
    Ok(((meas - mag0) / -2.5).exp10() * f0)
  }
}

/// AB magnitude to F-nu (W/m2/Hz) or back, against the fixed 3631 Jy
/// reference.
pub fn ab(meas: Uncertain, ctx: &SiContext, inverse: bool) -> Result<Uncertain, ConvertError> {
  let entry = photometry::calibration().get(passband(ctx)?)?;
  let mag0 = zero_point(entry.abmag);
  if inverse {
    Ok((meas / AB_ZERO_FLUX).log10() * -2.5)
  } else {
    Ok(((meas - mag0) / -2.5).exp10() * AB_ZERO_FLUX)
  }
}

/// ST magnitude to F-lambda (W/m3) or back, against the fixed
/// 3.631e-9 erg/s/cm2/A reference.
pub fn st(meas: Uncertain, ctx: &SiContext, inverse: bool) -> Result<Uncertain, ConvertError> {
  let entry = photometry::calibration().get(passband(ctx)?)?;
  let mag0 = zero_point(entry.stmag);
  if inverse {
    Ok((meas / ST_ZERO_FLUX).log10() * -2.5)
  } else {
    Ok(((meas - mag0) / -2.5).exp10() * ST_ZERO_FLUX)
  }
}

/// Variability amplitude in magnitudes to a fractional amplitude or
/// back. Needs no passband; the prefix carries SI scalings such as
/// `mAmag`.
pub fn amplitude(meas: Uncertain, prefix: f64, inverse: bool) -> Result<Uncertain, ConvertError> {
  if inverse {
    Ok((meas + 1.0).log10() * 2.5 / prefix)
  } else {
    Ok((meas * prefix / 2.5).exp10() - 1.0)
  }
}

fn band_ctx(system: &str, band: &str) -> SiContext {
  SiContext { photband: Some(format!("{}.{}", system, band)), ..SiContext::default() }
}

fn flux_ratio_term(system: &str, band: &str, mag: Uncertain) -> Result<Uncertain, ConvertError> {
  convert_num("mag", "SI", mag, &band_ctx(system, band))
}

fn color_term(system: &str, band: &str, flux: Uncertain) -> Result<Uncertain, ConvertError> {
  convert_num("W/m3", "mag", flux, &band_ctx(system, band))
}

/// Color index to a flux ratio or back. `B0-B1` colors map to the
/// ratio of the two band fluxes; the Stromgren curvature indices `C1`
/// and `M1` map to their double-difference flux ratios.
pub fn color(meas: Uncertain, ctx: &SiContext, inverse: bool) -> Result<Uncertain, ConvertError> {
  let photband = passband(ctx)?;
  let (system, band) = photband
    .split_once('.')
    .ok_or_else(|| ConvertError::UnknownPassband(photband.to_owned()))?;
  if let Some((band0, band1)) = band.split_once('-') {
    return if inverse {
      let m0 = color_term(system, band0, meas)?;
      let m1 = color_term(system, band1, Uncertain::exact(1.0))?;
      Ok(m0 - m1)
    } else {
      let f0 = flux_ratio_term(system, band0, meas)?;
      let f1 = flux_ratio_term(system, band1, Uncertain::exact(0.0))?;
      Ok(f0 / f1)
    };
  }
  match band.to_uppercase().as_str() {
    // c1 = (u-v) - (v-b)
    "C1" => {
      if inverse {
        let mu = color_term(system, "U", meas)?;
        let mv = color_term(system, "V", Uncertain::exact(1.0))?;
        let mb = color_term(system, "B", Uncertain::exact(1.0))?;
        Ok(mu - mv * 2.0 + mb)
      } else {
        let fu = flux_ratio_term(system, "U", meas)?;
        let fv = flux_ratio_term(system, "V", Uncertain::exact(0.0))?;
        let fb = flux_ratio_term(system, "B", Uncertain::exact(0.0))?;
        Ok(fu * fb / fv.powi(2))
      }
    }
    // m1 = (v-b) - (b-y)
    "M1" => {
      if inverse {
        let mv = color_term(system, "V", meas)?;
        let mb = color_term(system, "B", Uncertain::exact(1.0))?;
        let my = color_term(system, "Y", Uncertain::exact(1.0))?;
        Ok(mv - mb * 2.0 + my)
      } else {
        let fv = flux_ratio_term(system, "V", meas)?;
        let fb = flux_ratio_term(system, "B", Uncertain::exact(0.0))?;
        let fy = flux_ratio_term(system, "Y", Uncertain::exact(0.0))?;
        Ok(fv * fy / fb.powi(2))
      }
    }
    _ => Err(ConvertError::UnknownPassband(photband.to_owned())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;

  fn johnson_v() -> SiContext {
    band_ctx("JOHNSON", "V")
  }

  #[test]
  fn test_amplitude_round_trip() {
    let frac = amplitude(Uncertain::exact(0.1), 1.0, false).unwrap();
    assert_relative_eq!(frac.value, 10f64.powf(0.04) - 1.0, max_relative = 1e-12);
    let back = amplitude(frac, 1.0, true).unwrap();
    assert_relative_eq!(back.value, 0.1, max_relative = 1e-12);
  }

  #[test]
  fn test_amplitude_prefix() {
    // 1 ppm is roughly 1.0857 micro-magnitudes of amplitude.
    let mag = amplitude(Uncertain::exact(1e-6), 1e-6, true).unwrap();
    assert_relative_eq!(mag.value, 1.0857356, max_relative = 1e-6);
  }

  #[test]
  fn test_vega_zero_point_recovers_reference_flux() {
    let ctx = johnson_v();
    let entry = photometry::calibration().get("JOHNSON.V").unwrap();
    let flux = vega(Uncertain::exact(entry.vegamag), &ctx, false).unwrap();
    // erg/s/cm2/A to W/m3 is a factor 1e7.
    assert_relative_eq!(flux.value, entry.flam0 * 1e7, max_relative = 1e-10);
  }

  #[test]
  fn test_ab_round_trip() {
    let ctx = band_ctx("SDSS", "G");
    let flux = ab(Uncertain::exact(0.0), &ctx, false).unwrap();
    assert_relative_eq!(flux.value, AB_ZERO_FLUX, max_relative = 1e-12);
    let back = ab(flux, &ctx, true).unwrap();
    assert_relative_eq!(back.value, 0.0, epsilon = 1e-12);
  }

  #[test]
  fn test_missing_passband() {
    let err = vega(Uncertain::exact(0.0), &SiContext::default(), false).unwrap_err();
    assert!(matches!(err, ConvertError::MissingContext(_)));
  }

  #[test]
  fn test_unknown_passband() {
    let ctx = band_ctx("NOSUCH", "BAND");
    let err = ab(Uncertain::exact(0.0), &ctx, false).unwrap_err();
    assert!(matches!(err, ConvertError::UnknownPassband(_)));
  }

  #[test]
  fn test_color_round_trip() {
    let ctx = band_ctx("GENEVA", "U-B");
    let ratio = color(Uncertain::exact(0.5), &ctx, false).unwrap();
    let back = color(ratio, &ctx, true).unwrap();
    assert_relative_eq!(back.value, 0.5, max_relative = 1e-10);
  }

  #[test]
  fn test_stromgren_c1_round_trip() {
    let ctx = band_ctx("STROMGREN", "C1");
    let ratio = color(Uncertain::exact(0.3), &ctx, false).unwrap();
    let back = color(ratio, &ctx, true).unwrap();
    assert_relative_eq!(back.value, 0.3, max_relative = 1e-10);
  }
}
