//! Paths: ordered segments with topology and metrics computed once

use super::defaults::{APPROX_ATOL, AREA_EPSILON};
use super::intersect::{InfiniteLine, line_piece_intersections};
use super::metrics::{PathMetrics, area_moments};
use super::piece::Piece;
use super::segment::{Segment, SegmentGeometry};
use crate::errors::{IntersectionError, PathError};
use crate::transform::Transform;
use crate::types::{BBox, Offset, Point};

/// How the segments of a path connect
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// No segments
    Empty,
    /// Some segment does not start where the previous one ended
    Group,
    /// Continuous, with distinct start and end
    Open,
    /// Continuous, and the last segment ends where the first starts
    Closed,
}

impl Topology {
    /// Classify by exact endpoint equality.
    pub fn classify(segments: &[Segment]) -> Topology {
        let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
            return Topology::Empty;
        };
        let continuous = segments.windows(2).all(|w| w[0].end() == w[1].start());
        if !continuous {
            Topology::Group
        } else if last.end() == first.start() {
            Topology::Closed
        } else {
            Topology::Open
        }
    }

    pub fn is_continuous(self) -> bool {
        matches!(self, Topology::Open | Topology::Closed)
    }
}

/// An ordered sequence of segments.
///
/// Pieces, lengths, weights, area and centroid are computed in [`Path::new`]
/// and never change; transforming a path builds a new one.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
    topology: Topology,
    pieces: Vec<Piece>,
    metrics: PathMetrics,
    area: Option<f64>,
    centroid: Result<Point, PathError>,
    bbox: BBox,
}

impl Default for Path {
    fn default() -> Self {
        Path::new(Vec::new())
    }
}

impl Path {
    pub fn new(segments: Vec<Segment>) -> Path {
        let topology = Topology::classify(&segments);
        let pieces: Vec<Piece> = segments.iter().flat_map(|s| s.pieces()).collect();
        let metrics = PathMetrics::compute(&pieces);
        let bbox = BBox::from_points(segments.iter().flat_map(|s| s.control_points()));

        let (area, centroid) = match topology {
            Topology::Empty => (None, Err(PathError::EmptyPath)),
            Topology::Group | Topology::Open => (None, Err(PathError::NotClosed)),
            Topology::Closed => {
                let origin = bbox.center();
                let (area, mx, my) = area_moments(&pieces, origin);
                let centroid = if area.abs() <= AREA_EPSILON * bbox.diagonal_sq() {
                    Err(PathError::DegenerateArea)
                } else {
                    Ok(origin + Offset::new(mx / area, my / area))
                };
                (Some(area), centroid)
            }
        };

        Path {
            segments,
            topology,
            pieces,
            metrics,
            area,
            centroid,
            bbox,
        }
    }

    /// The box traced as a closed counter-clockwise rectangle.
    pub fn outline(bbox: &BBox) -> Path {
        if bbox.is_empty() {
            return Path::default();
        }
        let corners = bbox.outline();
        match Segment::line(corners.to_vec()) {
            Ok(seg) => Path::new(vec![seg]),
            Err(_) => Path::default(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn is_empty(&self) -> bool {
        self.topology == Topology::Empty
    }

    pub fn is_continuous(&self) -> bool {
        self.topology.is_continuous()
    }

    pub fn is_closed(&self) -> bool {
        self.topology == Topology::Closed
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn length(&self) -> f64 {
        self.metrics.length
    }

    pub fn piece_lengths(&self) -> &[f64] {
        &self.metrics.piece_lengths
    }

    pub fn cumulative_weights(&self) -> &[f64] {
        &self.metrics.cumulative_weights
    }

    pub fn length_error(&self) -> f64 {
        self.metrics.length_error
    }

    /// Signed enclosed area, closed paths only; positive when counter-clockwise.
    pub fn area(&self) -> Option<f64> {
        self.area
    }

    pub fn centroid(&self) -> Result<Point, PathError> {
        self.centroid.clone()
    }

    /// Box over every control point.
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(|s| s.start())
    }

    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(|s| s.end())
    }

    /// Point at fraction `t` of the total length.
    pub fn point_at_fraction(&self, t: f64) -> Result<Point, PathError> {
        if self.is_empty() {
            return Err(PathError::EmptyPath);
        }
        if !(0.0..=1.0).contains(&t) {
            return Err(PathError::OutOfRangeFraction { fraction: t });
        }
        if t == 1.0 {
            if let Some(end) = self.end() {
                return Ok(end);
            }
        }
        let (index, local) = self.metrics.locate(t).ok_or(PathError::EmptyPath)?;
        Ok(self.pieces[index].eval(local))
    }

    /// Point at distance `length` along the path from its start.
    pub fn point_at_length(&self, length: f64) -> Result<Point, PathError> {
        if self.is_empty() {
            return Err(PathError::EmptyPath);
        }
        let total = self.metrics.length;
        if !(0.0..=total).contains(&length) {
            return Err(PathError::OutOfRangeLength { length, total });
        }
        let fraction = if total > 0.0 { length / total } else { 0.0 };
        self.point_at_fraction(fraction.min(1.0))
    }

    /// Every point where `line` crosses the path, with points shared by
    /// adjacent pieces reported once.
    ///
    /// Points merge when closer than `APPROX_ATOL` times the path's size
    /// (at least 1), independent of where the path sits.
    pub fn line_intersections(&self, line: &InfiniteLine) -> Result<Vec<Point>, IntersectionError> {
        let merge = APPROX_ATOL * self.bbox.diagonal_sq().sqrt().max(1.0);
        let mut points: Vec<Point> = Vec::new();
        for piece in &self.pieces {
            for p in line_piece_intersections(piece, line)? {
                if !points.iter().any(|&q| (q - p).length() <= merge) {
                    points.push(p);
                }
            }
        }
        Ok(points)
    }

    pub fn transformed(&self, transform: &Transform) -> Path {
        Path::new(self.segments.iter().map(|s| s.transformed(transform)).collect())
    }

    pub fn translated(&self, offset: Offset) -> Path {
        Path::new(self.segments.iter().map(|s| s.translated(offset)).collect())
    }

    pub fn reversed(&self) -> Path {
        Path::new(self.segments.iter().rev().map(Segment::reversed).collect())
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Path::new(iter.into_iter().collect())
    }
}
