//! Validated geometric primitives: points, offsets, angles and bounding boxes.
//!
//! Every `Point` that reaches the geometry layer is finite. User input goes
//! through `Point::try_new` (or one of the `TryFrom` conversions); internal
//! arithmetic on already-validated points uses the unchecked constructor.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::str::FromStr;

use glam::{DVec2, dvec2};
use thiserror::Error;

use crate::geom::defaults;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumericError {
    /// Value is NaN
    #[error("value is NaN")]
    NaN,
    /// Value is infinite
    #[error("value is infinite")]
    Infinite,
}

#[inline]
fn finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// `numpy.isclose` semantics: `|a - b| <= atol + rtol * |b|`.
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= defaults::APPROX_ATOL + defaults::APPROX_RTOL * b.abs()
}

/// A finite 2D point in absolute or local coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    /// Unchecked constructor for values derived from validated points.
    #[inline]
    pub(crate) const fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    /// Create a point, rejecting NaN and infinite coordinates.
    pub fn try_new(x: f64, y: f64) -> Result<Point, NumericError> {
        Ok(Point {
            x: finite(x)?,
            y: finite(y)?,
        })
    }

    /// Point at `radius` along `angle` from the origin.
    pub fn from_polar(angle: Angle, radius: f64) -> Point {
        let (sin, cos) = angle.radians().sin_cos();
        Point::new(radius * cos, radius * sin)
    }

    /// Polar form `(angle, radius)` relative to the origin.
    pub fn to_polar(self) -> (Angle, f64) {
        (
            Angle::from_radians(self.y.atan2(self.x)),
            self.x.hypot(self.y),
        )
    }

    #[inline]
    pub fn x(self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(self) -> f64 {
        self.y
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(self, other: Point) -> f64 {
        (other - self).length()
    }

    /// Component-wise approximate equality (see [`approx_eq`]).
    pub fn approx_eq(self, other: Point) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y)
    }

    #[inline]
    pub fn to_dvec2(self) -> DVec2 {
        dvec2(self.x, self.y)
    }

    #[inline]
    pub(crate) fn from_dvec2(v: DVec2) -> Point {
        Point::new(v.x, v.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl TryFrom<(f64, f64)> for Point {
    type Error = NumericError;

    fn try_from((x, y): (f64, f64)) -> Result<Self, Self::Error> {
        Point::try_new(x, y)
    }
}

impl TryFrom<[f64; 2]> for Point {
    type Error = NumericError;

    fn try_from([x, y]: [f64; 2]) -> Result<Self, Self::Error> {
        Point::try_new(x, y)
    }
}

/// Error from parsing a `"x,y"` point literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a point; expected `x,y` with finite numbers")]
pub struct ParsePointError(pub String);

impl FromStr for Point {
    type Err = ParsePointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePointError(s.to_string());
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let (x, y) = trimmed.split_once(',').ok_or_else(err)?;
        let x: f64 = x.trim().parse().map_err(|_| err())?;
        let y: f64 = y.trim().parse().map_err(|_| err())?;
        Point::try_new(x, y).map_err(|_| err())
    }
}

/// A displacement vector; `Point + Offset = Point`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Offset { dx, dy }
    }

    pub fn length(self) -> f64 {
        self.dx.hypot(self.dy)
    }

    pub fn is_finite(self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }

    #[inline]
    pub fn to_dvec2(self) -> DVec2 {
        dvec2(self.dx, self.dy)
    }
}

impl From<DVec2> for Offset {
    fn from(v: DVec2) -> Self {
        Offset::new(v.x, v.y)
    }
}

impl Add<Offset> for Point {
    type Output = Point;
    fn add(self, rhs: Offset) -> Point {
        Point::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl AddAssign<Offset> for Point {
    fn add_assign(&mut self, rhs: Offset) {
        self.x += rhs.dx;
        self.y += rhs.dy;
    }
}

impl Sub<Offset> for Point {
    type Output = Point;
    fn sub(self, rhs: Offset) -> Point {
        Point::new(self.x - rhs.dx, self.y - rhs.dy)
    }
}

impl Sub<Point> for Point {
    type Output = Offset;
    fn sub(self, rhs: Point) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Offset {
    type Output = Offset;
    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl Neg for Offset {
    type Output = Offset;
    fn neg(self) -> Offset {
        Offset::new(-self.dx, -self.dy)
    }
}

impl Mul<f64> for Offset {
    type Output = Offset;
    fn mul(self, rhs: f64) -> Offset {
        Offset::new(self.dx * rhs, self.dy * rhs)
    }
}

/// An angle in radians, counter-clockwise from the positive x axis.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub const fn from_radians(rad: f64) -> Angle {
        Angle(rad)
    }

    pub fn from_degrees(deg: f64) -> Angle {
        Angle(deg.to_radians())
    }

    /// Validated constructor for user-provided radians.
    pub fn try_from_radians(rad: f64) -> Result<Angle, NumericError> {
        finite(rad).map(Angle)
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.0.to_degrees()
    }

    /// Unit direction vector for this angle.
    pub fn unit_vector(self) -> DVec2 {
        let (sin, cos) = self.0.sin_cos();
        dvec2(cos, sin)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}rad", self.0)
    }
}

/// Error from parsing an angle literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not an angle; expected `<num>deg`, `<num>rad` or a number of radians")]
pub struct ParseAngleError(pub String);

impl FromStr for Angle {
    type Err = ParseAngleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse_angle(s).ok_or_else(|| ParseAngleError(s.to_string()))
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl Default for BBox {
    fn default() -> Self {
        BBox::new()
    }
}

impl BBox {
    /// Create an empty bounding box (will expand on first point)
    pub fn new() -> Self {
        BBox {
            min: Point::new(f64::MAX, f64::MAX),
            max: Point::new(f64::MIN, f64::MIN),
        }
    }

    /// Bounding box of a set of points.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        let mut bb = BBox::new();
        for p in points {
            bb.expand_point(p);
        }
        bb
    }

    /// Check if the bbox is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Expand to include another box; empty boxes are ignored.
    pub fn expand_bbox(&mut self, other: &BBox) {
        if other.is_empty() {
            return;
        }
        self.expand_point(other.min);
        self.expand_point(other.max);
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Squared length of the diagonal, the scale used for area tolerances.
    pub fn diagonal_sq(&self) -> f64 {
        self.width() * self.width() + self.height() * self.height()
    }

    pub fn center(&self) -> Point {
        self.min.midpoint(self.max)
    }

    /// The four corners traced counter-clockwise from `min`, closed back onto `min`.
    pub fn outline(&self) -> [Point; 5] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
            self.min,
        ]
    }
}
