//! Line and cubic-Bezier segments

use enum_dispatch::enum_dispatch;

use super::piece::Piece;
use crate::errors::PathError;
use crate::transform::Transform;
use crate::types::{Offset, Point};

/// Geometry shared by every segment kind
#[enum_dispatch]
pub trait SegmentGeometry {
    fn start(&self) -> Point;
    fn end(&self) -> Point;
    /// Power-basis pieces, in order.
    fn pieces(&self) -> Vec<Piece>;
    /// Points that define the segment; their box contains the curve.
    fn control_points(&self) -> Vec<Point>;
}

/// A polyline through two or more points.
#[derive(Clone, Debug, PartialEq)]
pub struct LineSegment {
    points: Vec<Point>,
}

impl LineSegment {
    pub fn new(points: Vec<Point>) -> Result<Self, PathError> {
        if points.len() < 2 {
            return Err(PathError::TooFewPoints {
                count: points.len(),
            });
        }
        Ok(LineSegment { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

impl SegmentGeometry for LineSegment {
    fn start(&self) -> Point {
        self.points[0]
    }

    fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    fn pieces(&self) -> Vec<Piece> {
        self.points
            .windows(2)
            .map(|w| Piece::from_line(w[0], w[1]))
            .collect()
    }

    fn control_points(&self) -> Vec<Point> {
        self.points.clone()
    }
}

/// A cubic Bezier curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicSegment {
    pub start: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub end: Point,
}

impl CubicSegment {
    pub fn new(start: Point, ctrl1: Point, ctrl2: Point, end: Point) -> Self {
        CubicSegment {
            start,
            ctrl1,
            ctrl2,
            end,
        }
    }

    /// Exact degree elevation of a quadratic Bezier.
    pub fn from_quadratic(start: Point, ctrl: Point, end: Point) -> Self {
        CubicSegment {
            start,
            ctrl1: start + (ctrl - start) * (2.0 / 3.0),
            ctrl2: end + (ctrl - end) * (2.0 / 3.0),
            end,
        }
    }
}

impl SegmentGeometry for CubicSegment {
    fn start(&self) -> Point {
        self.start
    }

    fn end(&self) -> Point {
        self.end
    }

    fn pieces(&self) -> Vec<Piece> {
        vec![Piece::from_cubic(self.start, self.ctrl1, self.ctrl2, self.end)]
    }

    fn control_points(&self) -> Vec<Point> {
        vec![self.start, self.ctrl1, self.ctrl2, self.end]
    }
}

/// One segment of a path
#[enum_dispatch(SegmentGeometry)]
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Line(LineSegment),
    Cubic(CubicSegment),
}

impl Segment {
    pub fn line(points: Vec<Point>) -> Result<Segment, PathError> {
        LineSegment::new(points).map(Segment::Line)
    }

    pub fn cubic(start: Point, ctrl1: Point, ctrl2: Point, end: Point) -> Segment {
        Segment::Cubic(CubicSegment::new(start, ctrl1, ctrl2, end))
    }

    pub fn quadratic(start: Point, ctrl: Point, end: Point) -> Segment {
        Segment::Cubic(CubicSegment::from_quadratic(start, ctrl, end))
    }

    /// Apply `f` to every defining point.
    pub fn map_points(&self, mut f: impl FnMut(Point) -> Point) -> Segment {
        match self {
            Segment::Line(line) => Segment::Line(LineSegment {
                points: line.points.iter().map(|&p| f(p)).collect(),
            }),
            Segment::Cubic(c) => Segment::cubic(f(c.start), f(c.ctrl1), f(c.ctrl2), f(c.end)),
        }
    }

    pub fn transformed(&self, transform: &Transform) -> Segment {
        self.map_points(|p| transform.apply(p))
    }

    pub fn translated(&self, offset: Offset) -> Segment {
        self.map_points(|p| p + offset)
    }

    /// The same curve traversed end to start.
    pub fn reversed(&self) -> Segment {
        match self {
            Segment::Line(line) => {
                let mut points = line.points.clone();
                points.reverse();
                Segment::Line(LineSegment { points })
            }
            Segment::Cubic(c) => Segment::cubic(c.end, c.ctrl2, c.ctrl1, c.start),
        }
    }
}
