//! Position expressions and their resolution to absolute points.
//!
//! A position is one of: the current point, cartesian `{x, y}`, polar
//! `{angle, radius}`, relative `{rel, to}` or an anchor `{name, anchor}`.
//! Loose key sets arrive as [`PositionKeys`] and are validated into a
//! [`Position`]; mixing key groups is an error.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::errors::PositionError;
use crate::node::Node;
use crate::parse::{AnchorKey, parse_angle, split_anchor_ref};
use crate::transform::Transform;
use crate::types::{Angle, Offset, Point};

/// A displacement in local coordinates, used by relative positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Displacement {
    Cartesian { dx: f64, dy: f64 },
    Polar { angle: Angle, radius: f64 },
}

impl Displacement {
    fn to_offset(self) -> Offset {
        match self {
            Displacement::Cartesian { dx, dy } => Offset::new(dx, dy),
            Displacement::Polar { angle, radius } => Point::from_polar(angle, radius) - Point::ORIGIN,
        }
    }
}

/// Which coordinate form a position uses
#[derive(Clone, Debug, PartialEq)]
pub enum PositionSpec {
    /// The context's current point
    Current,
    Cartesian { x: f64, y: f64 },
    Polar { angle: Angle, radius: f64 },
    /// `rel` added to `to` (default: the current point) in local coordinates
    Relative {
        rel: Displacement,
        to: Option<Box<Position>>,
    },
    /// An anchor on a registered node; already absolute
    Anchor { node: String, key: AnchorKey },
}

/// A validated position expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub spec: PositionSpec,
    /// Whether resolving this position moves the current point
    pub update: bool,
}

impl Position {
    pub fn new(spec: PositionSpec) -> Self {
        Position { spec, update: true }
    }

    pub fn current() -> Self {
        Position::new(PositionSpec::Current)
    }

    pub fn xy(x: f64, y: f64) -> Result<Self, PositionError> {
        let p = Point::try_new(x, y)?;
        Ok(Position::new(PositionSpec::Cartesian { x: p.x(), y: p.y() }))
    }

    pub fn polar(angle: Angle, radius: f64) -> Result<Self, PositionError> {
        check_finite(angle.radians(), "angle")?;
        check_finite(radius, "radius")?;
        Ok(Position::new(PositionSpec::Polar { angle, radius }))
    }

    pub fn rel(dx: f64, dy: f64) -> Result<Self, PositionError> {
        check_finite(dx, "rel")?;
        check_finite(dy, "rel")?;
        Ok(Position::new(PositionSpec::Relative {
            rel: Displacement::Cartesian { dx, dy },
            to: None,
        }))
    }

    pub fn anchor(node: impl Into<String>, key: &str) -> Self {
        Position::new(PositionSpec::Anchor {
            node: node.into(),
            key: AnchorKey::parse(key),
        })
    }

    /// Same position, resolved without moving the current point.
    pub fn without_update(mut self) -> Self {
        self.update = false;
        self
    }
}

fn check_finite(v: f64, key: &str) -> Result<f64, PositionError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PositionError::malformed(format!("`{key}` must be a finite number")))
    }
}

/// The loose key-group form of a position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionKeys {
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// `"<num>deg"`, `"<num>rad"` or a bare number of radians
    pub angle: Option<String>,
    pub radius: Option<f64>,
    pub rel: Option<Box<PositionKeys>>,
    pub to: Option<Box<PositionKeys>>,
    pub name: Option<String>,
    pub anchor: Option<String>,
    pub update: Option<bool>,
}

impl PositionKeys {
    pub fn new() -> Self {
        PositionKeys::default()
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn angle(mut self, angle: impl ToString) -> Self {
        self.angle = Some(angle.to_string());
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn rel(mut self, rel: PositionKeys) -> Self {
        self.rel = Some(Box::new(rel));
        self
    }

    pub fn to(mut self, to: PositionKeys) -> Self {
        self.to = Some(Box::new(to));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    pub fn update(mut self, update: bool) -> Self {
        self.update = Some(update);
        self
    }

    /// First key present in each group, in group order.
    fn groups(&self) -> Vec<&'static str> {
        let mut present = Vec::new();
        if self.x.is_some() {
            present.push("x");
        } else if self.y.is_some() {
            present.push("y");
        }
        if self.angle.is_some() {
            present.push("angle");
        } else if self.radius.is_some() {
            present.push("radius");
        }
        if self.rel.is_some() {
            present.push("rel");
        } else if self.to.is_some() {
            present.push("to");
        }
        if self.name.is_some() {
            present.push("name");
        } else if self.anchor.is_some() {
            present.push("anchor");
        }
        present
    }
}

impl TryFrom<PositionKeys> for Position {
    type Error = PositionError;

    fn try_from(keys: PositionKeys) -> Result<Self, Self::Error> {
        let groups = keys.groups();
        if let [first, second, ..] = groups[..] {
            return Err(PositionError::ConflictingPositionKeys { first, second });
        }
        let update = keys.update.unwrap_or(true);

        let spec = match groups.first().copied() {
            None => PositionSpec::Current,
            Some("x" | "y") => {
                let x = check_finite(keys.x.unwrap_or(0.0), "x")?;
                let y = check_finite(keys.y.unwrap_or(0.0), "y")?;
                PositionSpec::Cartesian { x, y }
            }
            Some("angle" | "radius") => {
                let (Some(angle), Some(radius)) = (keys.angle, keys.radius) else {
                    return Err(PositionError::malformed(
                        "a polar position needs both `angle` and `radius`",
                    ));
                };
                let parsed = parse_angle(&angle).ok_or_else(|| {
                    PositionError::malformed(format!("`{angle}` is not an angle"))
                })?;
                PositionSpec::Polar {
                    angle: parsed,
                    radius: check_finite(radius, "radius")?,
                }
            }
            Some("rel" | "to") => {
                let Some(rel) = keys.rel else {
                    return Err(PositionError::malformed("`to` requires `rel`"));
                };
                let rel = match Position::try_from(*rel)?.spec {
                    PositionSpec::Cartesian { x, y } => Displacement::Cartesian { dx: x, dy: y },
                    PositionSpec::Polar { angle, radius } => Displacement::Polar { angle, radius },
                    _ => {
                        return Err(PositionError::malformed("`rel` must be cartesian or polar"));
                    }
                };
                let to = match keys.to {
                    Some(to) => Some(Box::new(Position::try_from(*to)?)),
                    None => None,
                };
                PositionSpec::Relative { rel, to }
            }
            Some(_) => {
                let Some(node) = keys.name else {
                    return Err(PositionError::malformed("`anchor` requires `name`"));
                };
                let key = keys.anchor.as_deref().unwrap_or("center");
                PositionSpec::Anchor {
                    node,
                    key: AnchorKey::parse(key),
                }
            }
        };
        Ok(Position { spec, update })
    }
}

/// `"<node>.<anchor>"`
impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (node, key) = split_anchor_ref(s).ok_or_else(|| {
            PositionError::malformed(format!("`{s}` is not of the form `<node>.<anchor>`"))
        })?;
        Ok(Position::anchor(node, key))
    }
}

impl TryFrom<&str> for Position {
    type Error = PositionError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<(f64, f64)> for Position {
    type Error = PositionError;

    fn try_from((x, y): (f64, f64)) -> Result<Self, Self::Error> {
        Position::xy(x, y)
    }
}

/// `(angle, radius)` with an angle literal
impl TryFrom<(&str, f64)> for Position {
    type Error = PositionError;

    fn try_from((angle, radius): (&str, f64)) -> Result<Self, Self::Error> {
        let parsed = parse_angle(angle)
            .ok_or_else(|| PositionError::malformed(format!("`{angle}` is not an angle")))?;
        Position::polar(parsed, radius)
    }
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Position::new(PositionSpec::Cartesian { x: p.x(), y: p.y() })
    }
}

/// Read-only view of the state positions resolve against.
pub(crate) struct Resolver<'a> {
    pub transform: &'a Transform,
    pub current: Point,
    pub nodes: &'a BTreeMap<String, Node>,
}

impl Resolver<'_> {
    /// Absolute point for `position`; never moves the current point.
    pub fn resolve(&self, position: &Position) -> Result<Point, PositionError> {
        let point = match &position.spec {
            PositionSpec::Current => self.current,
            PositionSpec::Cartesian { x, y } => self.transform.apply(Point::new(*x, *y)),
            PositionSpec::Polar { angle, radius } => {
                self.transform.apply(Point::from_polar(*angle, *radius))
            }
            PositionSpec::Relative { rel, to } => {
                let reference = match to {
                    Some(to) => self.resolve(to)?,
                    None => self.current,
                };
                reference + self.transform.apply_vector(rel.to_offset())
            }
            PositionSpec::Anchor { node, key } => {
                let node = self
                    .nodes
                    .get(node)
                    .ok_or_else(|| PositionError::UnknownNode { name: node.clone() })?;
                node.resolve(key)?
            }
        };
        if !point.is_finite() {
            return Err(PositionError::malformed("position resolves to a non-finite point"));
        }
        Ok(point)
    }
}
