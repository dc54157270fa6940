use thiserror::Error;

/// Every way a single conversion can fail. All variants are
/// non-recoverable for the conversion being attempted; the only
/// recovery policy in the crate is the per-element NaN substitution of
/// [`nconvert`](crate::units::convert::nconvert).
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum ConvertError {
  /// The unit expression could not be parsed into tokens.
  #[error("malformed unit expression '{0}'")]
  MalformedExpression(String),

  /// A token's basis letters match no registered unit, with or
  /// without a metric prefix.
  #[error("unknown unit '{0}'")]
  UnknownUnit(String),

  /// The dimensional delta between source and target has no entry in
  /// the switch-function table.
  #[error("cannot convert '{from}' to '{to}': no bridge registered for '{key}'")]
  UnsupportedConversion {
    from: String,
    to: String,
    key: String,
  },

  /// A nonlinear leaf or switch function required an auxiliary
  /// quantity that was not supplied.
  #[error("missing context quantity: {0}")]
  MissingContext(String),

  /// A magnitude or color converter found no calibration row for the
  /// requested passband.
  #[error("no calibration for passband '{0}'")]
  UnknownPassband(String),

  /// The supplied value payload does not fit the conversion (for
  /// example a calendar date where a scalar is required).
  #[error("wrong argument shape: {0}")]
  ArityError(String),
}

impl ConvertError {
  pub fn missing(what: impl Into<String>) -> Self {
    Self::MissingContext(what.into())
  }

  pub fn arity(what: impl Into<String>) -> Self {
    Self::ArityError(what.into())
  }
}
