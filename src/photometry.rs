//! Photometric calibration data: the zero-point table consumed by the
//! magnitude converters and the response-curve cache used to resolve
//! effective wavelengths.
//!
//! Both data sets are loaded once and are immutable afterwards. A
//! built-in zero-point table is compiled in; callers may install their
//! own table (or a response-curve directory) before first use.

use crate::error::ConvertError;

use once_cell::sync::{Lazy, OnceCell};

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// One row of the zero-point calibration table. Magnitude zero points
/// may be NaN when uncalibrated; the `*_lit` flags record whether a
/// value comes from the literature.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibEntry {
  pub photband: String,
  /// Effective wavelength in Angstrom.
  pub eff_wave: f64,
  pub detector: String,
  pub vegamag: f64,
  pub vegamag_lit: i32,
  pub abmag: f64,
  pub abmag_lit: i32,
  pub stmag: f64,
  pub stmag_lit: i32,
  pub flam0: f64,
  pub flam0_units: String,
  pub flam0_lit: i32,
  pub fnu0: f64,
  pub fnu0_units: String,
  pub fnu0_lit: i32,
  pub source: String,
}

/// The zero-point table, sorted by passband for exact-key lookup.
/// Leading comment lines of the source file are preserved so the
/// write path can round-trip them.
#[derive(Debug, Clone, Default)]
pub struct CalibrationTable {
  comments: Vec<String>,
  entries: Vec<CalibEntry>,
}

const COLUMNS: [&str; 16] = [
  "photband", "eff_wave", "type", "vegamag", "vegamag_lit", "ABmag", "ABmag_lit", "STmag",
  "STmag_lit", "Flam0", "Flam0_units", "Flam0_lit", "Fnu0", "Fnu0_units", "Fnu0_lit", "source",
];

impl CalibrationTable {
  /// Parses the whitespace-column text format: leading `#` comments,
  /// a header row naming the columns, then one row per passband.
  pub fn parse(text: &str) -> Result<Self, ConvertError> {
    let mut comments = Vec::new();
    let mut lines = text.lines().peekable();
    while let Some(line) = lines.next_if(|l| l.trim_start().starts_with('#')) {
      comments.push(line.to_owned());
    }
    let header = lines
      .next()
      .ok_or_else(|| ConvertError::MalformedExpression("empty calibration table".to_owned()))?;
    let names: Vec<&str> = header.split_whitespace().collect();
    if names != COLUMNS {
      return Err(ConvertError::MalformedExpression(format!(
        "unexpected calibration header '{}'",
        header,
      )));
    }
    let mut entries = Vec::new();
    for line in lines {
      if line.trim().is_empty() || line.trim_start().starts_with('#') {
        continue;
      }
      let cols: Vec<&str> = line.split_whitespace().collect();
      if cols.len() != COLUMNS.len() {
        return Err(ConvertError::MalformedExpression(format!(
          "calibration row with {} columns: '{}'",
          cols.len(),
          line,
        )));
      }
      entries.push(CalibEntry {
        photband: cols[0].to_uppercase(),
        eff_wave: parse_float(cols[1])?,
        detector: cols[2].to_owned(),
        vegamag: parse_float(cols[3])?,
        vegamag_lit: parse_int(cols[4])?,
        abmag: parse_float(cols[5])?,
        abmag_lit: parse_int(cols[6])?,
        stmag: parse_float(cols[7])?,
        stmag_lit: parse_int(cols[8])?,
        flam0: parse_float(cols[9])?,
        flam0_units: cols[10].to_owned(),
        flam0_lit: parse_int(cols[11])?,
        fnu0: parse_float(cols[12])?,
        fnu0_units: cols[13].to_owned(),
        fnu0_lit: parse_int(cols[14])?,
        source: cols[15].to_owned(),
      });
    }
    entries.sort_by(|a, b| a.photband.cmp(&b.photband));
    Ok(Self { comments, entries })
  }

  pub fn from_path(path: &Path) -> Result<Self, ConvertError> {
    let text = std::fs::read_to_string(path)
      .map_err(|e| ConvertError::MalformedExpression(format!("{}: {}", path.display(), e)))?;
    Self::parse(&text)
  }

  /// Looks up a calibration row by exact uppercase passband key.
  pub fn get(&self, photband: &str) -> Result<&CalibEntry, ConvertError> {
    let key = photband.to_uppercase();
    self
      .entries
      .binary_search_by(|e| e.photband.as_str().cmp(key.as_str()))
      .map(|i| &self.entries[i])
      .map_err(|_| ConvertError::UnknownPassband(photband.to_owned()))
  }

  pub fn entries(&self) -> &[CalibEntry] {
    &self.entries
  }

  /// Replaces or inserts a row, keeping the table sorted.
  pub fn upsert(&mut self, entry: CalibEntry) {
    match self.entries.binary_search_by(|e| e.photband.cmp(&entry.photband)) {
      Ok(i) => self.entries[i] = entry,
      Err(i) => self.entries.insert(i, entry),
    }
  }

  /// Renders the table back to its text format: preserved leading
  /// comments, header row, then aligned columns in the original
  /// order.
  pub fn render(&self) -> String {
    let rows: Vec<[String; 16]> = self
      .entries
      .iter()
      .map(|e| {
        [
          e.photband.clone(),
          format_float(e.eff_wave),
          e.detector.clone(),
          format_float(e.vegamag),
          e.vegamag_lit.to_string(),
          format_float(e.abmag),
          e.abmag_lit.to_string(),
          format_float(e.stmag),
          e.stmag_lit.to_string(),
          format_float(e.flam0),
          e.flam0_units.clone(),
          e.flam0_lit.to_string(),
          format_float(e.fnu0),
          e.fnu0_units.clone(),
          e.fnu0_lit.to_string(),
          e.source.clone(),
        ]
      })
      .collect();
    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.len()).collect();
    for row in &rows {
      for (w, cell) in widths.iter_mut().zip(row.iter()) {
        *w = (*w).max(cell.len());
      }
    }
    let mut out = String::new();
    for comment in &self.comments {
      out.push_str(comment);
      out.push('\n');
    }
    for (i, name) in COLUMNS.iter().enumerate() {
      let _ = write!(out, "{:width$} ", name, width = widths[i]);
    }
    out.truncate(out.trim_end().len());
    out.push('\n');
    for row in &rows {
      for (i, cell) in row.iter().enumerate() {
        let _ = write!(out, "{:width$} ", cell, width = widths[i]);
      }
      out.truncate(out.trim_end().len());
      out.push('\n');
    }
    out
  }

  /// Persists the table, preserving comment lines and column order.
  pub fn save(&self, path: &Path) -> Result<(), ConvertError> {
    std::fs::write(path, self.render())
      .map_err(|e| ConvertError::MalformedExpression(format!("{}: {}", path.display(), e)))
  }
}

fn parse_float(s: &str) -> Result<f64, ConvertError> {
  s.parse()
    .map_err(|_| ConvertError::MalformedExpression(format!("bad number '{}'", s)))
}

fn parse_int(s: &str) -> Result<i32, ConvertError> {
  s.parse()
    .map_err(|_| ConvertError::MalformedExpression(format!("bad integer '{}'", s)))
}

fn format_float(v: f64) -> String {
  if v.is_nan() {
    "nan".to_owned()
  } else if v == 0.0 || (1e-4..1e7).contains(&v.abs()) {
    format!("{}", v)
  } else {
    format!("{:e}", v)
  }
}

static CALIBRATION: OnceCell<CalibrationTable> = OnceCell::new();

/// Installs a calibration table. Returns false if the table was
/// already loaded (the first load wins; the table is immutable once
/// in use).
pub fn install_calibration(table: CalibrationTable) -> bool {
  CALIBRATION.set(table).is_ok()
}

/// The process-wide calibration table, loading the built-in one on
/// first use.
pub fn calibration() -> &'static CalibrationTable {
  CALIBRATION.get_or_init(|| {
    CalibrationTable::parse(DEFAULT_ZEROPOINTS)
      .unwrap_or_else(|e| panic!("built-in zero-point table is invalid: {}", e))
  })
}

static RESPONSE_DIR: OnceCell<PathBuf> = OnceCell::new();

/// Points the response-curve cache at a directory of `SYSTEM.FILTER`
/// two-column files. Returns false if a directory was already set.
pub fn set_response_dir(path: impl Into<PathBuf>) -> bool {
  RESPONSE_DIR.set(path.into()).is_ok()
}

/// A passband transmission curve, sorted by wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurve {
  /// Wavelength in Angstrom.
  pub wave: Vec<f64>,
  pub response: Vec<f64>,
}

impl ResponseCurve {
  /// Response-weighted mean wavelength, in Angstrom.
  pub fn effective_wavelength(&self) -> f64 {
    let weight: f64 = self.response.iter().sum();
    let total: f64 = self.wave.iter().zip(&self.response).map(|(w, r)| w * r).sum();
    total / weight
  }
}

static RESPONSE_CACHE: Lazy<RwLock<HashMap<String, Arc<ResponseCurve>>>> =
  Lazy::new(|| RwLock::new(HashMap::new()));

/// Retrieves the response curve of `SYSTEM.FILTER` through the
/// read-through cache. `OPEN.BOL` is the synthetic bolometric open
/// filter.
pub fn get_response(photband: &str) -> Result<Arc<ResponseCurve>, ConvertError> {
  let key = photband.to_uppercase();
  if let Some(curve) = RESPONSE_CACHE.read().expect("response cache poisoned").get(&key) {
    return Ok(Arc::clone(curve));
  }
  let curve = Arc::new(load_response(&key)?);
  // A concurrent load of the same key produces identical content, so
  // last-writer-wins on the cache slot is harmless.
  RESPONSE_CACHE
    .write()
    .expect("response cache poisoned")
    .insert(key, Arc::clone(&curve));
  Ok(curve)
}

fn load_response(key: &str) -> Result<ResponseCurve, ConvertError> {
  if key == "OPEN.BOL" {
    let response = 1.0 / (1e10 - 1.0);
    return Ok(ResponseCurve { wave: vec![1.0, 1e10], response: vec![response, response] });
  }
  let dir = RESPONSE_DIR
    .get()
    .ok_or_else(|| ConvertError::UnknownPassband(key.to_owned()))?;
  let path = dir.join(key);
  let text = std::fs::read_to_string(&path)
    .map_err(|_| ConvertError::UnknownPassband(key.to_owned()))?;
  let mut points: Vec<(f64, f64)> = Vec::new();
  for line in text.lines() {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    let mut cols = line.split_whitespace();
    let wave = cols.next().and_then(|s| s.parse().ok());
    let response = cols.next().and_then(|s| s.parse().ok());
    match (wave, response) {
      (Some(w), Some(r)) => points.push((w, r)),
      _ => {
        return Err(ConvertError::MalformedExpression(format!(
          "bad response-curve row in {}: '{}'",
          path.display(),
          line,
        )))
      }
    }
  }
  points.sort_by(|a, b| a.0.total_cmp(&b.0));
  let (wave, response) = points.into_iter().unzip();
  Ok(ResponseCurve { wave, response })
}

/// Effective wavelength of a passband in Angstrom: from its response
/// curve when one is available, from the calibration table otherwise.
pub fn effective_wavelength(photband: &str) -> Result<f64, ConvertError> {
  if let Ok(curve) = get_response(photband) {
    return Ok(curve.effective_wavelength());
  }
  calibration().get(photband).map(|e| e.eff_wave)
}

/// True if the passband names a color index rather than a single band
/// (`SYSTEM.B0-B1`, or the Stromgren composites `M1` and `C1`).
pub fn is_color(photband: &str) -> bool {
  match photband.split_once('.') {
    Some((_, band)) => band.contains('-') || matches!(band.to_uppercase().as_str(), "M1" | "C1"),
    None => false,
  }
}

/// The compiled-in zero-point table. Values follow the common
/// literature calibrations; uncalibrated magnitudes are NaN.
const DEFAULT_ZEROPOINTS: &str = "\
# Magnitude zero points and flux calibration per passband.
# Flam0 in erg/s/cm2/A, Fnu0 in Jy; *_lit flags mark literature values.
photband eff_wave type vegamag vegamag_lit ABmag ABmag_lit STmag STmag_lit Flam0 Flam0_units Flam0_lit Fnu0 Fnu0_units Fnu0_lit source
2MASS.J 12412.1 ccd 0.0 1 0.894 1 nan 0 3.129e-10 erg/s/cm2/A 1 1594.0 Jy 1 Cohen2003
2MASS.H 16513.7 ccd 0.0 1 1.37 1 nan 0 1.133e-10 erg/s/cm2/A 1 1024.0 Jy 1 Cohen2003
2MASS.KS 21656.2 ccd 0.0 1 1.84 1 nan 0 4.283e-11 erg/s/cm2/A 1 666.7 Jy 1 Cohen2003
GENEVA.U 3464.0 pht 1.205 0 nan 0 nan 0 6.583e-9 erg/s/cm2/A 0 980.0 Jy 0 Rufener1988
GENEVA.B1 4037.0 pht 0.962 0 nan 0 nan 0 2.882e-9 erg/s/cm2/A 0 1572.0 Jy 0 Rufener1988
GENEVA.B 4227.0 pht 0.891 0 nan 0 nan 0 3.723e-9 erg/s/cm2/A 0 2218.0 Jy 0 Rufener1988
GENEVA.B2 4478.0 pht 0.991 0 nan 0 nan 0 2.302e-9 erg/s/cm2/A 0 1538.0 Jy 0 Rufener1988
GENEVA.V1 5398.0 pht 0.661 0 nan 0 nan 0 1.946e-9 erg/s/cm2/A 0 1890.0 Jy 0 Rufener1988
GENEVA.V 5488.0 pht 0.58 0 nan 0 nan 0 1.855e-9 erg/s/cm2/A 0 1862.0 Jy 0 Rufener1988
GENEVA.G 5807.0 pht 0.657 0 nan 0 nan 0 1.583e-9 erg/s/cm2/A 0 1779.0 Jy 0 Rufener1988
JOHNSON.U 3641.0 pht 0.025 1 0.77 1 nan 0 4.19e-9 erg/s/cm2/A 1 1790.0 Jy 1 Bessell1988
JOHNSON.B 4427.0 pht 0.03 1 -0.12 1 nan 0 6.6e-9 erg/s/cm2/A 1 4063.0 Jy 1 Bessell1988
JOHNSON.V 5479.0 pht 0.03 1 0.0 1 nan 0 3.61e-9 erg/s/cm2/A 1 3636.0 Jy 1 Bessell1988
SDSS.U 3561.8 ccd nan 0 0.04 1 nan 0 3.75e-9 erg/s/cm2/A 0 3767.0 Jy 1 Holberg2006
SDSS.G 4718.9 ccd nan 0 0.0 1 nan 0 5.45e-9 erg/s/cm2/A 0 3631.0 Jy 1 Holberg2006
SDSS.R 6185.2 ccd nan 0 0.0 1 nan 0 2.5e-9 erg/s/cm2/A 0 3631.0 Jy 1 Holberg2006
SDSS.I 7499.7 ccd nan 0 0.0 1 nan 0 1.39e-9 erg/s/cm2/A 0 3631.0 Jy 1 Holberg2006
SDSS.Z 8961.5 ccd nan 0 0.02 1 nan 0 8.39e-10 erg/s/cm2/A 0 3565.0 Jy 1 Holberg2006
STROMGREN.U 3474.0 pht 1.432 0 nan 0 nan 0 1.23e-8 erg/s/cm2/A 0 495.0 Jy 0 Gray1998
STROMGREN.V 4110.0 pht 0.18 0 nan 0 nan 0 8.23e-9 erg/s/cm2/A 0 1550.0 Jy 0 Gray1998
STROMGREN.B 4670.0 pht 0.18 0 nan 0 nan 0 5.95e-9 erg/s/cm2/A 0 1890.0 Jy 0 Gray1998
STROMGREN.Y 5470.0 pht 0.038 0 nan 0 nan 0 3.7e-9 erg/s/cm2/A 0 1930.0 Jy 0 Gray1998
STROMGREN.HBN 4861.0 pht 0.0 0 nan 0 nan 0 5.0e-9 erg/s/cm2/A 0 1800.0 Jy 0 Gray1998
STROMGREN.HBW 4861.0 pht 0.0 0 nan 0 nan 0 5.0e-9 erg/s/cm2/A 0 1800.0 Jy 0 Gray1998
";
