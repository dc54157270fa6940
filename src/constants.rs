//! Physical constants used by the conversion engine and the stellar
//! derivation helpers. All values are SI unless the name says otherwise.

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 2.99792458e8;

/// Newtonian gravitational constant (m3 kg-1 s-2).
pub const GRAV_CONSTANT: f64 = 6.6742e-11;

/// Newtonian gravitational constant in CGS (cm3 g-1 s-2).
pub const GRAV_CONSTANT_CGS: f64 = 6.6742e-8;

/// Stefan-Boltzmann constant (W m-2 K-4).
pub const STEFAN_BOLTZMANN: f64 = 5.670400e-8;

/// Solar radius (m).
pub const SOLAR_RADIUS: f64 = 6.955e8;

/// Solar mass (kg).
pub const SOLAR_MASS: f64 = 1.988547e30;

/// Solar luminosity (W).
pub const SOLAR_LUMINOSITY: f64 = 3.846e26;

/// Mean Earth radius (m).
pub const EARTH_RADIUS: f64 = 6.371e6;

/// Earth mass (kg).
pub const EARTH_MASS: f64 = 5.9742e24;

/// Jupiter mass (kg).
pub const JUPITER_MASS: f64 = 1.8986e27;

/// Lunar mass (kg).
pub const LUNAR_MASS: f64 = 7.346e22;

/// Astronomical unit (m).
pub const ASTRONOMICAL_UNIT: f64 = 1.49597870691e11;

/// Parsec (m).
pub const PARSEC: f64 = 3.0856775814913673e16;

/// Julian light year (m).
pub const LIGHT_YEAR: f64 = 9.4607304725808e15;

/// Bohr radius (m).
pub const BOHR_RADIUS: f64 = 5.2917720859e-11;

/// Length of a sidereal day in units of the mean solar day.
pub const SIDEREAL_DAY: f64 = 1.0027379093;
