//! Power-basis polynomial pieces

use glam::{DVec2, dvec2};

use crate::types::Point;

#[inline]
fn horner(c: &[f64; 4], t: f64) -> f64 {
    ((c[3] * t + c[2]) * t + c[1]) * t + c[0]
}

#[inline]
fn horner_derivative(c: &[f64; 4], t: f64) -> f64 {
    (3.0 * c[3] * t + 2.0 * c[2]) * t + c[1]
}

/// One cubic polynomial pair `x(t) = x[0] + x[1] t + x[2] t^2 + x[3] t^3`
/// (and likewise for `y`), defined on `t` in 0..=1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Piece {
    pub x: [f64; 4],
    pub y: [f64; 4],
}

impl Piece {
    /// Degree-1 piece from `a` to `b`.
    pub fn from_line(a: Point, b: Point) -> Piece {
        Piece {
            x: [a.x(), b.x() - a.x(), 0.0, 0.0],
            y: [a.y(), b.y() - a.y(), 0.0, 0.0],
        }
    }

    /// Bezier control points to power basis.
    pub fn from_cubic(start: Point, ctrl1: Point, ctrl2: Point, end: Point) -> Piece {
        // from control-point differences, so the higher terms do not
        // cancel against the absolute position
        let coefs = |p0: f64, p1: f64, p2: f64, p3: f64| {
            let (d1, d2, d3) = (p1 - p0, p2 - p0, p3 - p0);
            [p0, 3.0 * d1, 3.0 * d2 - 6.0 * d1, d3 - 3.0 * d2 + 3.0 * d1]
        };
        Piece {
            x: coefs(start.x(), ctrl1.x(), ctrl2.x(), end.x()),
            y: coefs(start.y(), ctrl1.y(), ctrl2.y(), end.y()),
        }
    }

    pub fn eval(&self, t: f64) -> Point {
        Point::new(horner(&self.x, t), horner(&self.y, t))
    }

    /// Tangent `(x'(t), y'(t))`.
    pub fn derivative(&self, t: f64) -> DVec2 {
        dvec2(horner_derivative(&self.x, t), horner_derivative(&self.y, t))
    }

    pub fn speed(&self, t: f64) -> f64 {
        self.derivative(t).length()
    }

    pub fn start(&self) -> Point {
        Point::new(self.x[0], self.y[0])
    }

    /// The same piece in coordinates centred on `origin`.
    pub fn relative_to(&self, origin: Point) -> Piece {
        let mut local = *self;
        local.x[0] -= origin.x();
        local.y[0] -= origin.y();
        local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_piece_interpolates() {
        let p = Piece::from_line(Point::new(1.0, 1.0), Point::new(3.0, 5.0));
        assert_eq!(p.eval(0.0), Point::new(1.0, 1.0));
        assert_eq!(p.eval(0.5), Point::new(2.0, 3.0));
        assert_eq!(p.eval(1.0), Point::new(3.0, 5.0));
        assert_eq!(p.derivative(0.3), dvec2(2.0, 4.0));
    }

    #[test]
    fn cubic_piece_matches_bernstein_form() {
        let (p0, p1, p2, p3) = (
            Point::new(0.0, 0.0),
            Point::new(1.0, 2.0),
            Point::new(3.0, 2.0),
            Point::new(4.0, 0.0),
        );
        let piece = Piece::from_cubic(p0, p1, p2, p3);
        for t in [0.0, 0.25, 0.5, 0.9, 1.0] {
            let s = 1.0 - t;
            let bx = s * s * s * p0.x() + 3.0 * s * s * t * p1.x() + 3.0 * s * t * t * p2.x() + t * t * t * p3.x();
            let by = s * s * s * p0.y() + 3.0 * s * s * t * p1.y() + 3.0 * s * t * t * p2.y() + t * t * t * p3.y();
            let got = piece.eval(t);
            assert!((got.x() - bx).abs() < 1e-12, "x at t={t}");
            assert!((got.y() - by).abs() < 1e-12, "y at t={t}");
        }
    }

    #[test]
    fn cubic_tangent_at_ends_points_at_controls() {
        let piece = Piece::from_cubic(
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        );
        assert_eq!(piece.derivative(0.0), dvec2(0.0, 3.0));
        assert_eq!(piece.derivative(1.0), dvec2(0.0, -3.0));
    }
}
