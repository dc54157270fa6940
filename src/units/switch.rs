//! Physical bridges between non-commensurate quantities.
//!
//! When two units do not share a dimensional signature, the leftover
//! signature difference is looked up here; each entry is a transform
//! that consumes reference quantities from the context (wavelength,
//! frequency, angular size) to cross the gap.

use crate::constants::SPEED_OF_LIGHT;
use crate::error::ConvertError;
use crate::photometry;
use crate::uncertainty::Uncertain;
use crate::units::convert::SiContext;

use once_cell::sync::Lazy;

use std::collections::HashMap;
use std::f64::consts::PI;

pub type SwitchFn = fn(Uncertain, &SiContext) -> Result<Uncertain, ConvertError>;

/// The spectral reference point, resolved from the context. A
/// passband overrides an explicit wavelength, which overrides a
/// frequency.
enum Reference {
  Wave(Uncertain),
  Freq(Uncertain),
}

fn reference(ctx: &SiContext) -> Result<Reference, ConvertError> {
  if let Some(photband) = &ctx.photband {
    // Effective wavelengths are tabulated in Angstrom.
    let wave = photometry::effective_wavelength(photband)? * 1e-10;
    return Ok(Reference::Wave(Uncertain::exact(wave)));
  }
  if let Some(wave) = ctx.wave {
    Ok(Reference::Wave(wave))
  } else if let Some(freq) = ctx.freq {
    Ok(Reference::Freq(freq))
  } else {
    Err(ConvertError::missing(
      "reference wavelength or frequency (wave/freq/photband) not given",
    ))
  }
}

fn wave_only(ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  ctx
    .wave
    .ok_or_else(|| ConvertError::missing("reference wavelength (wave) not given"))
}

/// The solid angle subtended by the source, from its angular diameter,
/// angular radius or pixel scale.
fn surface(ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  if let Some(diam) = ctx.ang_diam {
    let radius = diam / 2.0;
    Ok(radius.powi(2) * PI)
  } else if let Some(radius) = ctx.radius {
    Ok(radius.powi(2) * PI)
  } else if let Some(pix) = ctx.pix {
    Ok(pix.powi(2))
  } else {
    Err(ConvertError::missing("angular size (ang_diam/radius/pix) not given"))
  }
}

// Doppler shift: wavelength to velocity around the reference, and
// back.
fn distance_to_velocity(arg: Uncertain, ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  let wave = wave_only(ctx)?;
  Ok((arg - wave) / wave * SPEED_OF_LIGHT)
}

fn velocity_to_distance(arg: Uncertain, ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  let wave = wave_only(ctx)?;
  Ok(wave / SPEED_OF_LIGHT * arg + wave)
}

fn distance_to_spatial_freq(arg: Uncertain, ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  let wave = match reference(ctx)? {
    Reference::Wave(w) => w,
    Reference::Freq(f) => SPEED_OF_LIGHT / f,
  };
  Ok(arg * 2.0 * PI / wave)
}

fn spatial_freq_to_distance(arg: Uncertain, ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  let wave = match reference(ctx)? {
    Reference::Wave(w) => w,
    Reference::Freq(f) => SPEED_OF_LIGHT / f,
  };
  Ok(wave * arg / (2.0 * PI))
}

fn fnu_to_flambda(arg: Uncertain, ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  match reference(ctx)? {
    Reference::Wave(w) => Ok(SPEED_OF_LIGHT / w.powi(2) * arg),
    Reference::Freq(f) => Ok(f.powi(2) / SPEED_OF_LIGHT * arg),
  }
}

fn flambda_to_fnu(arg: Uncertain, ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  match reference(ctx)? {
    Reference::Wave(w) => Ok(w.powi(2) / SPEED_OF_LIGHT * arg),
    Reference::Freq(f) => Ok(SPEED_OF_LIGHT / f.powi(2) * arg),
  }
}

fn fnu_to_nufnu(arg: Uncertain, ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  match reference(ctx)? {
    Reference::Wave(w) => Ok(SPEED_OF_LIGHT / w * arg),
    Reference::Freq(f) => Ok(f * arg),
  }
}

fn nufnu_to_fnu(arg: Uncertain, ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  match reference(ctx)? {
    Reference::Wave(w) => Ok(w / SPEED_OF_LIGHT * arg),
    Reference::Freq(f) => Ok(arg / f),
  }
}

fn lamflam_to_flam(arg: Uncertain, ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  match reference(ctx)? {
    Reference::Wave(w) => Ok(arg / w),
    Reference::Freq(f) => Ok(arg / (SPEED_OF_LIGHT / f)),
  }
}

fn flam_to_lamflam(arg: Uncertain, ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  match reference(ctx)? {
    Reference::Wave(w) => Ok(w * arg),
    Reference::Freq(f) => Ok(SPEED_OF_LIGHT / f * arg),
  }
}

fn per_sr(arg: Uncertain, ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  Ok(arg / surface(ctx)?)
}

fn times_sr(arg: Uncertain, ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  Ok(arg * surface(ctx)?)
}

fn per_cy(arg: Uncertain, _ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  Ok(arg / (2.0 * PI))
}

fn times_cy(arg: Uncertain, _ctx: &SiContext) -> Result<Uncertain, ConvertError> {
  Ok(arg * 2.0 * PI)
}

/// Leftover-signature keys to their bridging transforms. A key names
/// the from-side surplus after cancellation, spaces stripped, with
/// `_to_` appended.
pub static SWITCH: Lazy<HashMap<&'static str, SwitchFn>> = Lazy::new(|| {
  let mut table: HashMap<&'static str, SwitchFn> = HashMap::new();
  table.insert("s1_to_", distance_to_velocity as SwitchFn);
  table.insert("s-1_to_", velocity_to_distance);
  table.insert("cy-1m1_to_", distance_to_spatial_freq);
  table.insert("cy1m-1_to_", spatial_freq_to_distance);
  table.insert("cy-1m1s1_to_", fnu_to_flambda);
  table.insert("cy1m-1s-1_to_", flambda_to_fnu);
  table.insert("cy-1s1_to_", fnu_to_nufnu);
  table.insert("cy1s-1_to_", nufnu_to_fnu);
  table.insert("m1_to_", lamflam_to_flam);
  table.insert("m-1_to_", flam_to_lamflam);
  table.insert("rad2_to_", per_sr);
  table.insert("rad-2_to_", times_sr);
  table.insert("rad1_to_", per_cy);
  table.insert("rad-1_to_", times_cy);
  table
});
