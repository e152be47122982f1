//! Numeric tolerances and default settings

/// Absolute tolerance of `approx_eq` (numpy's `isclose` default)
pub const APPROX_ATOL: f64 = 1e-8;
/// Relative tolerance of `approx_eq` (numpy's `isclose` default)
pub const APPROX_RTOL: f64 = 1e-5;

/// Polynomial coefficients smaller than this times the largest are flushed to zero
pub const COEFFICIENT_EPSILON: f64 = 1e-12;
/// Relative tolerance for a vanishing quadratic or cubic discriminant
pub const DISCRIMINANT_EPSILON: f64 = 1e-12;

/// Intersection parameters this far outside 0..=1 still count as endpoint hits
pub const PARAMETER_TOLERANCE: f64 = 1e-6;

/// Target error of the adaptive arc-length quadrature, per piece
pub const QUADRATURE_TOLERANCE: f64 = 1e-10;
/// Maximum bisection depth of the adaptive quadrature
pub const QUADRATURE_MAX_DEPTH: u32 = 12;

/// `|area|` at or below this times the squared bbox diagonal counts as zero
pub const AREA_EPSILON: f64 = 1e-9;

/// Transforms kept for `restore_transform`
pub const MAX_TRANSFORM_HISTORY: usize = 15;

/// Control-point distance for one eighth of a unit circle: 4/3 tan(pi/16)
pub const CIRCLE_KAPPA: f64 = 0.265_216_489_839_544;
/// Number of cubic pieces in a full circle
pub const CIRCLE_PIECES: usize = 8;

/// Unit size of mark symbols
pub const MARK_SIZE: f64 = 0.1;
