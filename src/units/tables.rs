//! The static registries the engine is built on: base-unit factors,
//! metric-prefix scalings and spelling aliases. All three are
//! constructed once and never mutated afterwards.

use crate::constants::*;
use crate::units::nonlinear::NonlinearKind;

use once_cell::sync::Lazy;
use phf::phf_map;

use std::collections::HashMap;
use std::f64::consts::PI;

/// How a registered unit relates to its SI base string: either a
/// constant multiplicative factor, or one of the nonlinear leaf
/// converters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BaseFactor {
  Linear(f64),
  Nonlinear(NonlinearKind),
}

/// A registered unit: its factor (or converter) and the SI base string
/// it reduces to. The base string may itself be composite
/// (e.g. the Watt reduces to `"kg m2 s-3"`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDef {
  pub factor: BaseFactor,
  pub si: &'static str,
}

impl UnitDef {
  const fn linear(factor: f64, si: &'static str) -> Self {
    Self { factor: BaseFactor::Linear(factor), si }
  }

  const fn nonlinear(kind: NonlinearKind, si: &'static str) -> Self {
    Self { factor: BaseFactor::Nonlinear(kind), si }
  }
}

/// Base-unit factor table. Keys are case-sensitive basis letters as
/// they appear in a token after alias resolution and prefix stripping.
pub static FACTORS: Lazy<HashMap<&'static str, UnitDef>> = Lazy::new(factors_table);

fn factors_table() -> HashMap<&'static str, UnitDef> {
  use NonlinearKind::*;
  let defs = [
    // Distance
    ("m", UnitDef::linear(1e0, "m")),
    ("A", UnitDef::linear(1e-10, "m")), // Angstrom
    ("AU", UnitDef::linear(ASTRONOMICAL_UNIT, "m")),
    ("pc", UnitDef::linear(PARSEC, "m")),
    ("ly", UnitDef::linear(LIGHT_YEAR, "m")),
    ("Rsol", UnitDef::linear(SOLAR_RADIUS, "m")),
    ("Rearth", UnitDef::linear(EARTH_RADIUS, "m")),
    ("ft", UnitDef::linear(0.3048, "m")),
    ("in", UnitDef::linear(0.0254, "m")),
    ("mi", UnitDef::linear(1609.344, "m")),
    ("a0", UnitDef::linear(BOHR_RADIUS, "m")),
    ("ell", UnitDef::linear(1.143, "m")),
    ("yd", UnitDef::linear(0.9144, "m")),
    // Mass
    ("g", UnitDef::linear(1e-3, "kg")),
    ("Msol", UnitDef::linear(SOLAR_MASS, "kg")),
    ("Mearth", UnitDef::linear(EARTH_MASS, "kg")),
    ("Mjup", UnitDef::linear(JUPITER_MASS, "kg")),
    ("Mlun", UnitDef::linear(LUNAR_MASS, "kg")),
    ("lbs", UnitDef::linear(0.45359237, "kg")),
    ("st", UnitDef::linear(6.35029318, "kg")),
    // Time
    ("s", UnitDef::linear(1e0, "s")),
    ("min", UnitDef::linear(60.0, "s")),
    ("h", UnitDef::linear(3600.0, "s")),
    ("d", UnitDef::linear(24.0 * 3600.0, "s")),
    ("wk", UnitDef::linear(7.0 * 24.0 * 3600.0, "s")),
    ("mo", UnitDef::linear(30.0 * 7.0 * 24.0 * 3600.0, "s")),
    ("sidereal", UnitDef::linear(SIDEREAL_DAY, "")),
    ("yr", UnitDef::linear(365.0 * 24.0 * 3600.0, "s")),
    ("cr", UnitDef::linear(100.0 * 365.0 * 24.0 * 3600.0, "s")),
    ("hz", UnitDef::linear(1e0, "cy s-1")),
    ("JD", UnitDef::linear(1e0, "JD")),
    ("CD", UnitDef::nonlinear(JulianDayCalendar, "JD")),
    ("MJD", UnitDef::nonlinear(ModifiedJulianDay, "JD")),
    ("j", UnitDef::linear(1.0 / 60.0, "s")), // jiffy
    // Angles
    ("rad", UnitDef::linear(1e0, "rad")),
    ("cy", UnitDef::linear(1e0, "cy")),
    ("deg", UnitDef::linear(PI / 180.0, "rad")),
    ("am", UnitDef::linear(PI / 180.0 / 60.0, "rad")),
    ("as", UnitDef::linear(PI / 180.0 / 3600.0, "rad")),
    ("sr", UnitDef::linear(1.0, "rad2")),
    ("rpm", UnitDef::linear(0.104719755, "rad s-1")),
    // Coordinates
    ("complex_coord", UnitDef::linear(1e0, "complex_coord")),
    ("equ", UnitDef::nonlinear(Equatorial, "complex_coord")),
    ("gal", UnitDef::nonlinear(Galactic, "complex_coord")),
    ("ecl", UnitDef::nonlinear(Ecliptic, "complex_coord")),
    // Force
    ("N", UnitDef::linear(1e0, "kg m s-2")),
    ("dyn", UnitDef::linear(1e-5, "kg m s-2")),
    // Temperature
    ("K", UnitDef::linear(1e0, "K")),
    ("F", UnitDef::nonlinear(Fahrenheit, "K")),
    ("C", UnitDef::nonlinear(Celsius, "K")),
    // Energy and power
    ("J", UnitDef::linear(1e0, "kg m2 s-2")),
    ("W", UnitDef::linear(1e0, "kg m2 s-3")),
    ("erg", UnitDef::linear(1e-7, "kg m2 s-2")),
    ("eV", UnitDef::linear(1.60217646e-19, "kg m2 s-2")),
    ("cal", UnitDef::linear(4.1868, "kg m2 s-2")),
    ("Lsol", UnitDef::linear(SOLAR_LUMINOSITY, "kg m2 s-3")),
    // Pressure
    ("Pa", UnitDef::linear(1e0, "kg m-1 s-2")),
    ("bar", UnitDef::linear(1e5, "kg m-1 s-2")),
    ("at", UnitDef::linear(98066.5, "kg m-1 s-2")),
    ("atm", UnitDef::linear(101325.0, "kg m-1 s-2")),
    ("torr", UnitDef::linear(133.322, "kg m-1 s-2")),
    ("psi", UnitDef::linear(6894.0, "kg m-1 s-2")),
    // Area
    ("ac", UnitDef::linear(4046.8564224, "m2")),
    ("a", UnitDef::linear(100.0, "m2")),
    // Flux and magnitudes
    ("Jy", UnitDef::linear(1e-26, "kg s-2 cy-1")), // W/m2/Hz
    ("vegamag", UnitDef::nonlinear(VegaMag, "kg m-1 s-3")), // W/m2/m
    ("mag", UnitDef::nonlinear(VegaMag, "kg m-1 s-3")),
    ("STmag", UnitDef::nonlinear(STMag, "kg m-1 s-3")),
    ("ABmag", UnitDef::nonlinear(ABMag, "kg s-2 cy-1")),
    // Magnitude differences (colors)
    ("mag_color", UnitDef::nonlinear(ColorIndex, "flux_ratio")),
    ("flux_ratio", UnitDef::linear(1e0, "flux_ratio")),
    // Magnitude amplitudes
    ("ampl", UnitDef::linear(1e0, "ampl")),
    ("Amag", UnitDef::nonlinear(AmplitudeMag, "ampl")),
    ("pph", UnitDef::linear(1e-2, "ampl")),
    ("ppt", UnitDef::linear(1e-3, "ampl")),
    ("ppm", UnitDef::linear(1e-6, "ampl")),
  ];
  defs.into_iter().collect()
}

/// Metric-prefix scalings, keyed by prefix spelling.
pub static SCALINGS: phf::Map<&'static str, f64> = phf_map! {
  "y" => 1e-24,
  "z" => 1e-21,
  "a" => 1e-18,
  "f" => 1e-15,
  "p" => 1e-12,
  "n" => 1e-9,
  "mu" => 1e-6,
  "m" => 1e-3,
  "c" => 1e-2,
  "d" => 1e-1,
  "da" => 1e1,
  "h" => 1e2,
  "k" => 1e3,
  "M" => 1e6,
  "G" => 1e9,
  "T" => 1e12,
  "P" => 1e15,
  "E" => 1e18,
  "Z" => 1e21,
  "Y" => 1e24,
};

/// Prefix spellings ordered longest first, so `"das"` resolves as
/// deca-seconds rather than deci-arcseconds.
pub static SCALINGS_BY_LENGTH: Lazy<Vec<&'static str>> = Lazy::new(|| {
  let mut keys: Vec<&'static str> = SCALINGS.keys().copied().collect();
  keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
  keys
});

/// Spelling aliases, applied in order as literal substring
/// replacements before any other parsing.
pub static ALIASES: &[(&str, &str)] = &[
  ("micron", "mum"),
  ("au", "AU"),
  ("micro", "mu"),
  ("milli", "m"),
  ("kilo", "k"),
  ("mega", "M"),
  ("giga", "G"),
  ("nano", "n"),
  ("watt", "W"),
  ("Watt", "W"),
  ("Hz", "hz"),
  ("joule", "J"),
  ("Joule", "J"),
  ("jansky", "Jy"),
  ("Jansky", "Jy"),
  ("jy", "Jy"),
  ("arcsec", "as"),
  ("arcmin", "am"),
  ("cycles", "cy"),
  ("cycle", "cy"),
  ("cyc", "cy"),
  ("angstrom", "A"),
  ("Angstrom", "A"),
  ("inch", "in"),
  ("^", ""),
  ("**", ""),
  ("galactic", "gal"),
  ("equatorial", "equ"),
  ("ecliptic", "ecl"),
  ("Vegamag", "vegamag"),
];
