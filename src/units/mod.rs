//! Unit algebra: normalization of free-form unit expressions,
//! reduction to canonical SI signatures, and value conversion between
//! arbitrary commensurate or bridgeable units.

pub mod breakdown;
pub mod convert;
pub mod decompose;
pub mod nonlinear;
pub mod normalize;
pub mod switch;
pub mod tables;
