//! Physical-quantity conversion with full unit algebra.
//!
//! Unit expressions are free-form strings ("erg/s/cm2/A", "km h-1",
//! "10mW m-2/nm"); they are reduced to canonical SI dimensional
//! signatures and values are scaled, bridged or transformed across.
//! Non-commensurate units (flux densities per wavelength versus per
//! frequency, wavelengths versus velocities) are crossed through
//! physical transforms that draw reference quantities from a
//! [`Context`]. Uncertainties propagate linearly through every step.
//!
//! ```
//! use astroconv::{convert, convert_scalar, Context, Value};
//!
//! let cm = convert_scalar("km", "cm", 1.0).unwrap();
//! assert_eq!(cm, 100000.0);
//!
//! let ctx = Context::new().wave(10000.0, "A");
//! let flam = convert("Jy", "erg/s/cm2/A", Value::Scalar(333.564), &ctx).unwrap();
//! assert!(matches!(flam, Value::Scalar(_)));
//! ```

pub mod constants;
pub mod error;
pub mod photometry;
pub mod stellar;
pub mod uncertainty;
pub mod units;

pub use error::ConvertError;
pub use units::breakdown::breakdown;
pub use units::convert::{
  convert, convert_scalar, convert_with_error, nconvert, nconvert_with_errors, Context,
  CtxQuantity, Value,
};
pub use units::nonlinear::coords::SkyCoord;
pub use units::nonlinear::julian::CalendarDate;
