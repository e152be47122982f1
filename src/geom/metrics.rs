//! Arc length, length parameterization and Green's-theorem moments

use super::defaults::{QUADRATURE_MAX_DEPTH, QUADRATURE_TOLERANCE};
use super::piece::Piece;
use crate::log::trace;
use crate::types::Point;

/// 8-point Gauss-Legendre nodes (positive half) and weights on [-1, 1].
const GL_NODES: [f64; 4] = [
    0.183_434_642_495_649_8,
    0.525_532_409_916_329_0,
    0.796_666_477_413_626_7,
    0.960_289_856_497_536_3,
];
const GL_WEIGHTS: [f64; 4] = [
    0.362_683_783_378_362_0,
    0.313_706_645_877_887_3,
    0.222_381_034_453_374_5,
    0.101_228_536_290_376_3,
];

/// Fixed 8-point Gauss-Legendre rule on `[a, b]`; exact for polynomials up to degree 15.
pub fn gauss_legendre(f: impl Fn(f64) -> f64, a: f64, b: f64) -> f64 {
    let half = (b - a) / 2.0;
    let mid = (a + b) / 2.0;
    let sum: f64 = GL_NODES
        .iter()
        .zip(GL_WEIGHTS)
        .map(|(&x, w)| w * (f(mid - half * x) + f(mid + half * x)))
        .sum();
    sum * half
}

/// Adaptive Gauss-Legendre by bisection. Returns `(value, error estimate)`.
pub fn adaptive_gauss_legendre(f: &impl Fn(f64) -> f64, a: f64, b: f64) -> (f64, f64) {
    fn recurse(f: &impl Fn(f64) -> f64, a: f64, b: f64, whole: f64, tol: f64, depth: u32) -> (f64, f64) {
        let mid = (a + b) / 2.0;
        let left = gauss_legendre(f, a, mid);
        let right = gauss_legendre(f, mid, b);
        let err = (left + right - whole).abs();
        if err <= tol || depth >= QUADRATURE_MAX_DEPTH {
            return (left + right, err);
        }
        let (lv, le) = recurse(f, a, mid, left, tol / 2.0, depth + 1);
        let (rv, re) = recurse(f, mid, b, right, tol / 2.0, depth + 1);
        (lv + rv, le + re)
    }

    let whole = gauss_legendre(f, a, b);
    recurse(f, a, b, whole, QUADRATURE_TOLERANCE, 0)
}

/// Length table of a sequence of pieces
#[derive(Clone, Debug, PartialEq, Default)]
pub struct PathMetrics {
    pub length: f64,
    pub piece_lengths: Vec<f64>,
    /// Running fraction of `length` after each piece; the last entry is exactly 1
    pub cumulative_weights: Vec<f64>,
    /// Accumulated quadrature error estimate, informational only
    pub length_error: f64,
}

impl PathMetrics {
    pub fn compute(pieces: &[Piece]) -> PathMetrics {
        if pieces.is_empty() {
            return PathMetrics::default();
        }

        let mut piece_lengths = Vec::with_capacity(pieces.len());
        let mut length_error = 0.0;
        for piece in pieces {
            let (len, err) = adaptive_gauss_legendre(&|t| piece.speed(t), 0.0, 1.0);
            piece_lengths.push(len);
            length_error += err;
        }
        let length: f64 = piece_lengths.iter().sum();

        let n = pieces.len();
        let mut cumulative_weights: Vec<f64> = if length > 0.0 {
            piece_lengths
                .iter()
                .scan(0.0, |acc, len| {
                    *acc += len;
                    Some(*acc / length)
                })
                .collect()
        } else {
            (1..=n).map(|i| i as f64 / n as f64).collect()
        };
        cumulative_weights[n - 1] = 1.0;

        trace!(length, length_error, pieces = n, "computed path metrics");

        PathMetrics {
            length,
            piece_lengths,
            cumulative_weights,
            length_error,
        }
    }

    /// Piece index and local parameter for a fraction in 0..=1.
    pub fn locate(&self, fraction: f64) -> Option<(usize, f64)> {
        let index = self
            .cumulative_weights
            .iter()
            .position(|&w| w >= fraction)
            .or_else(|| self.cumulative_weights.len().checked_sub(1))?;
        let lower = if index == 0 {
            0.0
        } else {
            self.cumulative_weights[index - 1]
        };
        let upper = self.cumulative_weights[index];
        let local = if upper > lower {
            (fraction - lower) / (upper - lower)
        } else {
            0.0
        };
        Some((index, local.clamp(0.0, 1.0)))
    }
}

/// Signed area and first moments of the region bounded by a closed sequence of pieces.
///
/// Returns `(A, Mx, My)` with `A = integral(y x' + 2 x y')`,
/// `Mx = integral(x^2 y') / 2` and `My = -integral(y^2 x') / 2`, with `x` and `y`
/// measured from `origin`; the centroid is `origin + (Mx / A, My / A)`.
/// Counter-clockwise outlines have positive area.
pub fn area_moments(pieces: &[Piece], origin: Point) -> (f64, f64, f64) {
    let mut area = 0.0;
    let mut mx = 0.0;
    let mut my = 0.0;
    for piece in pieces {
        let piece = piece.relative_to(origin);
        let xy = |t: f64| (piece.eval(t), piece.derivative(t));
        area += gauss_legendre(
            |t| {
                let (p, d) = xy(t);
                p.y() * d.x + 2.0 * p.x() * d.y
            },
            0.0,
            1.0,
        );
        mx += gauss_legendre(
            |t| {
                let (p, d) = xy(t);
                p.x() * p.x() * d.y
            },
            0.0,
            1.0,
        ) / 2.0;
        my -= gauss_legendre(
            |t| {
                let (p, d) = xy(t);
                p.y() * p.y() * d.x
            },
            0.0,
            1.0,
        ) / 2.0;
    }
    (area, mx, my)
}
