//! Segment builders for the primitive shapes

use crate::geom::Segment;
use crate::geom::defaults::{CIRCLE_KAPPA, CIRCLE_PIECES};
use crate::types::{Angle, Offset, Point};

/// Closed ellipse of eight cubic pieces, counter-clockwise from the east point.
///
/// Adjacent pieces share their endpoints exactly, so the outline classifies as closed.
pub fn ellipse(center: Point, rx: f64, ry: f64) -> Vec<Segment> {
    let step = std::f64::consts::TAU / CIRCLE_PIECES as f64;
    let on_curve: Vec<Point> = (0..CIRCLE_PIECES)
        .map(|i| ellipse_point(center, rx, ry, Angle::from_radians(step * i as f64)))
        .collect();
    // tangent direction at angle i * step, scaled by the control distance
    let handle = |i: usize| {
        let (sin, cos) = (step * i as f64).sin_cos();
        Offset::new(-rx * sin, ry * cos) * CIRCLE_KAPPA
    };

    (0..CIRCLE_PIECES)
        .map(|i| {
            let next = (i + 1) % CIRCLE_PIECES;
            Segment::cubic(
                on_curve[i],
                on_curve[i] + handle(i),
                on_curve[next] - handle(next),
                on_curve[next],
            )
        })
        .collect()
}

/// Unit circle about the origin.
pub fn unit_circle() -> Vec<Segment> {
    ellipse(Point::ORIGIN, 1.0, 1.0)
}

/// Closed rectangle with opposite corners `a` and `b`, starting at `a`.
///
/// Counter-clockwise when `a` is the lower-left corner.
pub fn rectangle(a: Point, b: Point) -> Vec<Segment> {
    let corners = vec![a, Point::new(b.x(), a.y()), b, Point::new(a.x(), b.y()), a];
    Segment::line(corners).into_iter().collect()
}

/// Point on the ellipse at `angle` from its center.
pub fn ellipse_point(center: Point, rx: f64, ry: f64, angle: Angle) -> Point {
    let (sin, cos) = angle.radians().sin_cos();
    center + Offset::new(rx * cos, ry * sin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{InfiniteLine, Path, SegmentGeometry, Topology};

    #[test]
    fn unit_circle_is_closed_with_eight_pieces() {
        let path = Path::new(unit_circle());
        assert_eq!(path.topology(), Topology::Closed);
        assert_eq!(path.pieces().len(), 8);
    }

    #[test]
    fn unit_circle_centroid_at_origin() {
        let c = Path::new(unit_circle()).centroid().unwrap();
        assert!(c.x().abs() < 1e-3 && c.y().abs() < 1e-3, "{c}");
    }

    #[test]
    fn unit_circle_length_close_to_tau() {
        let path = Path::new(unit_circle());
        assert!((path.length() - std::f64::consts::TAU).abs() < 1e-3);
    }

    #[test]
    fn horizontal_line_hits_circle_twice() {
        let path = Path::new(unit_circle());
        let line = InfiniteLine::at_angle(Point::ORIGIN, Angle::ZERO);
        let hits = path.line_intersections(&line).unwrap();
        assert_eq!(hits.len(), 2, "{hits:?}");
        for h in hits {
            assert!((h.distance(Point::ORIGIN) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn ellipse_passes_through_axis_points() {
        let segs = ellipse(Point::new(1.0, 2.0), 3.0, 0.5);
        let path = Path::new(segs);
        let north = ellipse_point(Point::new(1.0, 2.0), 3.0, 0.5, Angle::from_degrees(90.0));
        assert!(path.segments()[1].end().approx_eq(north));
    }

    #[test]
    fn rectangle_is_closed() {
        let path = Path::new(rectangle(Point::new(0.0, 0.0), Point::new(3.0, 1.0)));
        assert!(path.is_closed());
        assert!((path.area().unwrap() - 3.0).abs() < 1e-12);
    }
}
