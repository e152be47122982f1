//! Error types with diagnostics using miette
//!
//! One closed enum per component. Every variant carries a diagnostic code of
//! the form `tezpath::<component>::<kind>`.

use miette::Diagnostic;
use thiserror::Error;

use crate::types::NumericError;

// ============================================================================
// Transform Errors
// ============================================================================

/// Errors from composing an affine transform
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("degenerate transform: {reason}")]
    #[diagnostic(
        code(tezpath::transform::degenerate),
        help("the transform must stay invertible with finite entries; the previous transform was kept")
    )]
    Degenerate { reason: &'static str },
}

// ============================================================================
// Path Errors
// ============================================================================

/// Errors from building or querying a path
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("a line segment needs at least 2 points, got {count}")]
    #[diagnostic(code(tezpath::path::too_few_points))]
    TooFewPoints { count: usize },

    #[error("path has no segments")]
    #[diagnostic(code(tezpath::path::empty))]
    EmptyPath,

    #[error("length {length} is outside the path (total length {total})")]
    #[diagnostic(
        code(tezpath::path::length_out_of_range),
        help("lengths are measured from the start and must lie in 0..={total}")
    )]
    OutOfRangeLength { length: f64, total: f64 },

    #[error("fraction {fraction} is outside 0..=1")]
    #[diagnostic(
        code(tezpath::path::fraction_out_of_range),
        help("percentages must lie between 0% and 100%")
    )]
    OutOfRangeFraction { fraction: f64 },

    #[error("path is not closed")]
    #[diagnostic(
        code(tezpath::path::not_closed),
        help("the last segment must end exactly where the first one starts")
    )]
    NotClosed,

    #[error("closed path encloses no area")]
    #[diagnostic(code(tezpath::path::degenerate_area))]
    DegenerateArea,
}

// ============================================================================
// Intersection Errors
// ============================================================================

/// Errors from the line/curve intersection solver
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum IntersectionError {
    #[error("line coincides with the curve")]
    #[diagnostic(
        code(tezpath::intersection::coincident),
        help("every parameter is a solution; the intersection is a whole segment")
    )]
    CoincidentLines,

    #[error("line direction is the zero vector")]
    #[diagnostic(code(tezpath::intersection::degenerate_line))]
    DegenerateLine,
}

// ============================================================================
// Anchor Errors
// ============================================================================

/// Errors from anchor lookup on a node
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum AnchorError {
    #[error("anchor `{key}` not found{}", node_suffix(.node))]
    #[diagnostic(code(tezpath::anchor::not_found))]
    AnchorNotFound { key: String, node: Option<String> },

    #[error("anchor `{key}` is ambiguous: the ray crosses the outline {count} times")]
    #[diagnostic(
        code(tezpath::anchor::ambiguous),
        help("angular anchors need a shape the ray from the centroid crosses once, e.g. a convex one")
    )]
    AmbiguousAnchor { key: String, count: usize },

    #[error("anchor `{key}`: the ray from the centroid never reaches the outline")]
    #[diagnostic(code(tezpath::anchor::no_intersection))]
    NoIntersection { key: String },

    #[error("angular anchor `{key}` needs a closed shape with non-zero area")]
    #[diagnostic(
        code(tezpath::anchor::angular_unsupported),
        help("use a percentage or a length along the path instead")
    )]
    AngularAnchorUnsupported { key: String },

    #[error("invalid node name `{name}`")]
    #[diagnostic(
        code(tezpath::anchor::invalid_node_name),
        help("names start with a letter, digit or `_` and continue with letters, digits, `_` or `-`")
    )]
    InvalidNodeName { name: String },

    #[error("invalid anchor name `{name}`")]
    #[diagnostic(
        code(tezpath::anchor::invalid_anchor_name),
        help("anchor names follow node-name rules and cannot shadow a builtin anchor")
    )]
    InvalidAnchorName { name: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Intersection(#[from] IntersectionError),
}

fn node_suffix(node: &Option<String>) -> String {
    match node {
        Some(name) => format!(" on node `{name}`"),
        None => String::new(),
    }
}

// ============================================================================
// Position Errors
// ============================================================================

/// Errors from resolving a position expression
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum PositionError {
    #[error("conflicting position keys: {first} and {second} cannot be combined")]
    #[diagnostic(
        code(tezpath::position::conflicting_keys),
        help("use exactly one of {{x, y}}, {{angle, radius}}, {{rel, to}} or {{name, anchor}}")
    )]
    ConflictingPositionKeys {
        first: &'static str,
        second: &'static str,
    },

    #[error("malformed position: {message}")]
    #[diagnostic(code(tezpath::position::malformed))]
    MalformedPositionSpec { message: String },

    #[error("unknown node `{name}`")]
    #[diagnostic(
        code(tezpath::position::unknown_node),
        help("nodes must be drawn with a name before they can be referenced")
    )]
    UnknownNode { name: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Anchor(#[from] AnchorError),
}

impl PositionError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        PositionError::MalformedPositionSpec {
            message: message.into(),
        }
    }
}

impl From<NumericError> for PositionError {
    fn from(err: NumericError) -> Self {
        PositionError::malformed(format!("coordinate {err}"))
    }
}

// ============================================================================
// Top-level Error
// ============================================================================

/// Any error the crate can produce
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Intersection(#[from] IntersectionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Anchor(#[from] AnchorError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Position(#[from] PositionError),

    #[error("invalid number: {0}")]
    #[diagnostic(code(tezpath::numeric))]
    Numeric(#[from] NumericError),

    #[error("unknown drawable kind `{kind}`")]
    #[diagnostic(
        code(tezpath::draw::unknown_kind),
        help("register the kind with `DrawableRegistry::register` first")
    )]
    UnknownDrawableKind { kind: String },
}

/// Convenience alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;
