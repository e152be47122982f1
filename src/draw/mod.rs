//! The drawing layer on top of the geometry core
//!
//! - `position`: position grammar and its resolution
//! - `context`: DrawingContext with the current point, transform history and nodes
//! - `drawable`: Drawable trait, builtin kinds and the kind registry
//! - `marks`: mark symbols stamped at positions
//! - `shapes`: segment builders for ellipses and rectangles
//! - `sink`: styles and the RenderSink trait

pub mod context;
pub mod drawable;
pub mod marks;
pub mod position;
pub mod shapes;
pub mod sink;

pub use context::{ContextOptions, DrawOptions, DrawingContext};
pub use drawable::{Drawable, DrawableEnum, DrawableRegistry, MarkDrawable, PathDrawable};
pub use marks::{MarkOptions, MarkSymbol};
pub use position::{Displacement, Position, PositionKeys, PositionSpec};
pub use sink::{DrawableHandle, RecordingSink, RenderSink, Style};
