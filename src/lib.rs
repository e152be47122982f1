//! Vector-path geometry and anchor resolution for a declarative drawing DSL.
//!
//! Shapes are built from line and cubic segments, flattened into polynomial
//! pieces, and measured with Gauss-Legendre quadrature. Nodes answer anchor
//! queries (`center`, `north`, `25%`, `1.5`, `30deg`, custom names) and a
//! [`DrawingContext`] resolves positions against a current point, an affine
//! transform and the nodes drawn so far.
//!
//! ```
//! use tezpath::{DrawOptions, DrawingContext, Position};
//!
//! let mut ctx = DrawingContext::new();
//! let center = Position::xy(0.0, 0.0)?;
//! ctx.circle(&center, 1.0, 1.0, DrawOptions::named("c"))?;
//!
//! let north: Position = "c.north".parse()?;
//! let p = ctx.resolve_position(&north, false)?;
//! assert!((p.y() - 1.0).abs() < 1e-9);
//! # Ok::<(), tezpath::Error>(())
//! ```

mod log;

pub mod draw;
pub mod errors;
pub mod geom;
pub mod node;
pub mod parse;
pub mod transform;
pub mod types;

pub use draw::{
    ContextOptions, DrawOptions, DrawingContext, MarkOptions, MarkSymbol, Position, PositionKeys, RecordingSink,
    RenderSink, Style,
};
pub use errors::{AnchorError, Error, IntersectionError, PathError, PositionError, Result, TransformError};
pub use geom::{InfiniteLine, Path, Segment, Topology};
pub use node::Node;
pub use parse::AnchorKey;
pub use transform::Transform;
pub use types::{Angle, BBox, NumericError, Offset, Point};
