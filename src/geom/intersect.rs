//! Line/curve intersection by closed-form polynomial root finding.
//!
//! Substituting a piece into the implicit form of a line,
//! `vy (x(t) - px) - vx (y(t) - py) = 0`, gives a real polynomial of degree at
//! most 3 in the curve parameter. Its real roots in 0..=1 are the crossings.

use std::f64::consts::TAU;

use glam::DVec2;

use super::defaults::{COEFFICIENT_EPSILON, DISCRIMINANT_EPSILON, PARAMETER_TOLERANCE};
use super::piece::Piece;
use crate::errors::IntersectionError;
use crate::types::{Angle, Point, approx_eq};

/// An infinite line through `point` along `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InfiniteLine {
    point: Point,
    direction: DVec2,
}

impl InfiniteLine {
    pub fn new(point: Point, direction: DVec2) -> Result<Self, IntersectionError> {
        if !direction.is_finite() || direction == DVec2::ZERO {
            return Err(IntersectionError::DegenerateLine);
        }
        Ok(InfiniteLine { point, direction })
    }

    /// Line through two points.
    pub fn through(a: Point, b: Point) -> Result<Self, IntersectionError> {
        InfiniteLine::new(a, (b - a).to_dvec2())
    }

    /// Line through `point` at `angle` from the x axis.
    pub fn at_angle(point: Point, angle: Angle) -> Self {
        InfiniteLine {
            point,
            direction: angle.unit_vector(),
        }
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn direction(&self) -> DVec2 {
        self.direction
    }

    /// Coefficients of `A(t)` for `piece`, lowest power first.
    ///
    /// The constant term is taken from the piece start relative to the line
    /// point, so shapes far from the origin keep their precision.
    fn implicit_coefficients(&self, piece: &Piece) -> [f64; 4] {
        let (vx, vy) = (self.direction.x, self.direction.y);
        let local = piece.relative_to(self.point);
        let mut c = [0.0; 4];
        for (i, ci) in c.iter_mut().enumerate() {
            *ci = vy * local.x[i] - vx * local.y[i];
        }
        c
    }
}

/// Real roots of `c[0] + c[1] t + c[2] t^2 + c[3] t^3`, ascending, duplicates merged.
///
/// Coefficients negligible next to the largest one are dropped before the
/// degree is decided. The zero polynomial is [`IntersectionError::CoincidentLines`].
pub fn solve_polynomial(coefs: [f64; 4]) -> Result<Vec<f64>, IntersectionError> {
    let largest = coefs.iter().fold(0.0f64, |m, c| m.max(c.abs()));
    if largest == 0.0 {
        return Err(IntersectionError::CoincidentLines);
    }
    let mut c = coefs;
    for ci in &mut c {
        if ci.abs() < COEFFICIENT_EPSILON * largest {
            *ci = 0.0;
        }
    }

    let roots = if c[3] != 0.0 {
        solve_cubic(c[3], c[2], c[1], c[0])
    } else if c[2] != 0.0 {
        solve_quadratic(c[2], c[1], c[0])
    } else if c[1] != 0.0 {
        vec![-c[0] / c[1]]
    } else {
        Vec::new()
    };

    let mut unique: Vec<f64> = Vec::with_capacity(roots.len());
    for r in roots.into_iter().filter(|r| r.is_finite()) {
        if !unique.iter().any(|&u| approx_eq(r, u)) {
            unique.push(r);
        }
    }
    unique.sort_by(f64::total_cmp);
    Ok(unique)
}

fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    let disc = b * b - 4.0 * a * c;
    let scale = (b * b).max((4.0 * a * c).abs());
    if disc.abs() <= DISCRIMINANT_EPSILON * scale {
        return vec![-b / (2.0 * a)];
    }
    if disc < 0.0 {
        return Vec::new();
    }
    let sign = if b >= 0.0 { 1.0 } else { -1.0 };
    let q = -0.5 * (b + sign * disc.sqrt());
    vec![q / a, c / q]
}

fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    let (b, c, d) = (b / a, c / a, d / a);
    let shift = -b / 3.0;
    // depressed: s^3 + p s + q with t = s + shift
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;

    let half_q_sq = (q / 2.0) * (q / 2.0);
    let third_p_cu = (p / 3.0) * (p / 3.0) * (p / 3.0);
    let disc = half_q_sq + third_p_cu;
    let scale = half_q_sq.max(third_p_cu.abs());

    if scale == 0.0 {
        return vec![shift];
    }
    if disc.abs() <= DISCRIMINANT_EPSILON * scale {
        let u = (-q / 2.0).cbrt();
        return vec![2.0 * u + shift, -u + shift];
    }
    if disc > 0.0 {
        let sq = disc.sqrt();
        let s = (-q / 2.0 + sq).cbrt() + (-q / 2.0 - sq).cbrt();
        return vec![s + shift];
    }

    // three real roots; disc < 0 implies p < 0
    let r = 2.0 * (-p / 3.0).sqrt();
    let phi = ((3.0 * q) / (2.0 * p) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0).acos();
    (0..3)
        .map(|k| r * (phi / 3.0 - TAU * k as f64 / 3.0).cos() + shift)
        .collect()
}

/// Curve parameters in 0..=1 where `line` crosses `piece`.
///
/// Roots within tolerance of 0 or 1 are kept and clamped onto the range.
pub fn line_piece_parameters(piece: &Piece, line: &InfiniteLine) -> Result<Vec<f64>, IntersectionError> {
    let coefs = line.implicit_coefficients(piece);

    // A(t) identically zero up to rounding of the piece's own coefficients
    let local = piece.relative_to(line.point);
    let input_scale = line.direction.length()
        * local.x.iter().chain(&local.y).fold(0.0f64, |m, c| m.max(c.abs()));
    let largest = coefs.iter().fold(0.0f64, |m, c| m.max(c.abs()));
    if largest <= COEFFICIENT_EPSILON * input_scale {
        return Err(IntersectionError::CoincidentLines);
    }

    Ok(solve_polynomial(coefs)?
        .into_iter()
        .filter(|&t| (-PARAMETER_TOLERANCE..=1.0 + PARAMETER_TOLERANCE).contains(&t))
        .map(|t| t.clamp(0.0, 1.0))
        .collect())
}

/// Points where `line` crosses `piece`.
pub fn line_piece_intersections(piece: &Piece, line: &InfiniteLine) -> Result<Vec<Point>, IntersectionError> {
    Ok(line_piece_parameters(piece, line)?
        .into_iter()
        .map(|t| piece.eval(t))
        .collect())
}
