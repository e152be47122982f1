//! Path geometry: segments, polynomial pieces, metrics and intersections

pub mod defaults;
pub mod intersect;
pub mod metrics;
pub mod path;
pub mod piece;
pub mod segment;

pub use intersect::{InfiniteLine, line_piece_intersections, line_piece_parameters, solve_polynomial};
pub use metrics::PathMetrics;
pub use path::{Path, Topology};
pub use piece::Piece;
pub use segment::{CubicSegment, LineSegment, Segment, SegmentGeometry};
