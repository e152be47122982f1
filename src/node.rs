//! Nodes: named groups of drawables with anchor lookup.
//!
//! A node's anchor geometry is the concatenation of its drawables' anchor
//! segments. When those segments do not connect, the geometry is replaced by
//! the counter-clockwise outline of their bounding box so that `center`,
//! percentages and angular anchors stay defined.

use std::collections::BTreeMap;

use crate::draw::drawable::{Drawable, DrawableEnum, PathDrawable};
use crate::draw::sink::Style;
use crate::errors::{AnchorError, PathError};
use crate::geom::{InfiniteLine, Path, Segment, Topology};
use crate::log::debug;
use crate::parse::{AnchorKey, is_valid_name};
use crate::types::{Angle, BBox, Offset, Point};

/// Optionally named, immutable geometry with anchors.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    name: Option<String>,
    drawables: Vec<DrawableEnum>,
    topology: Topology,
    geometry: Path,
    bbox: BBox,
    anchors: BTreeMap<String, Point>,
}

fn check_name(name: Option<String>) -> Result<Option<String>, AnchorError> {
    match name {
        Some(name) if !is_valid_name(&name) => Err(AnchorError::InvalidNodeName { name }),
        other => Ok(other),
    }
}

impl Node {
    /// Build a node from drawables.
    pub fn from_drawables(drawables: Vec<DrawableEnum>, name: Option<String>) -> Result<Node, AnchorError> {
        let name = check_name(name)?;
        let anchor_segments: Vec<Segment> = drawables
            .iter()
            .flat_map(|d| d.anchor_segments().iter().cloned())
            .collect();
        let combined = Path::new(anchor_segments);
        let topology = combined.topology();
        let geometry = match topology {
            Topology::Group => Path::outline(&combined.bbox()),
            _ => combined,
        };

        let mut bbox = BBox::new();
        for d in &drawables {
            bbox.expand_bbox(&d.path().bbox());
        }

        Ok(Node {
            name,
            drawables,
            topology,
            geometry,
            bbox,
            anchors: BTreeMap::new(),
        })
    }

    /// Build a node holding one unstyled path.
    pub fn from_segments(segments: Vec<Segment>, name: Option<String>) -> Result<Node, AnchorError> {
        Node::from_drawables(vec![PathDrawable::new(segments, Style::new()).into()], name)
    }

    /// A node that is just a point: every builtin anchor resolves to `point`.
    pub fn anchor_point(name: Option<String>, point: Point) -> Result<Node, AnchorError> {
        let name = check_name(name)?;
        let segment = Segment::line(vec![point, point])?;
        let geometry = Path::new(vec![segment]);
        Ok(Node {
            name,
            drawables: Vec::new(),
            topology: geometry.topology(),
            bbox: geometry.bbox(),
            geometry,
            anchors: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn drawables(&self) -> &[DrawableEnum] {
        &self.drawables
    }

    /// Topology of the combined anchor segments (before any bbox substitution).
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// The path anchors are resolved against.
    pub fn geometry(&self) -> &Path {
        &self.geometry
    }

    /// Box over every drawable, marks included.
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn length(&self) -> f64 {
        self.geometry.length()
    }

    pub fn centroid(&self) -> Result<Point, PathError> {
        self.geometry.centroid()
    }

    pub fn anchors(&self) -> &BTreeMap<String, Point> {
        &self.anchors
    }

    /// Register an explicit anchor.
    pub fn add_anchor(&mut self, name: &str, point: Point) -> Result<(), AnchorError> {
        if !is_valid_name(name) || AnchorKey::is_builtin_name(name) {
            return Err(AnchorError::InvalidAnchorName {
                name: name.to_string(),
            });
        }
        self.anchors.insert(name.to_string(), point);
        Ok(())
    }

    pub fn point_at_length(&self, length: f64) -> Result<Point, AnchorError> {
        Ok(self.geometry.point_at_length(length)?)
    }

    pub fn point_at_fraction(&self, fraction: f64) -> Result<Point, AnchorError> {
        Ok(self.geometry.point_at_fraction(fraction)?)
    }

    /// Resolve an anchor key string (`"north"`, `"30%"`, `"2.5"`, `"45deg"`, a custom name).
    pub fn anchor(&self, key: &str) -> Result<Point, AnchorError> {
        self.resolve(&AnchorKey::parse(key))
    }

    /// Resolve an already parsed anchor key.
    pub fn resolve(&self, key: &AnchorKey) -> Result<Point, AnchorError> {
        match key {
            AnchorKey::Center => match self.geometry.centroid() {
                Ok(c) => Ok(c),
                Err(_) => self.point_at_fraction(0.5),
            },
            AnchorKey::North => self.angular(Angle::from_degrees(90.0), key),
            AnchorKey::South => self.angular(Angle::from_degrees(-90.0), key),
            AnchorKey::West => self.angular(Angle::from_degrees(180.0), key),
            AnchorKey::East => self.angular(Angle::ZERO, key),
            AnchorKey::Start => self.point_at_fraction(0.0),
            AnchorKey::Mid => self.point_at_fraction(0.5),
            AnchorKey::End => self.point_at_fraction(1.0),
            AnchorKey::Length(l) => self.point_at_length(*l),
            AnchorKey::Fraction(t) => self.point_at_fraction(*t),
            AnchorKey::Angle(a) => self.angular(*a, key),
            AnchorKey::Custom(name) => {
                self.anchors
                    .get(name)
                    .copied()
                    .ok_or_else(|| AnchorError::AnchorNotFound {
                        key: name.clone(),
                        node: self.name.clone(),
                    })
            }
        }
    }

    /// Where the ray from the centroid at `angle` leaves the outline.
    fn angular(&self, angle: Angle, key: &AnchorKey) -> Result<Point, AnchorError> {
        let centroid = self
            .geometry
            .centroid()
            .map_err(|_| AnchorError::AngularAnchorUnsupported {
                key: key.to_string(),
            })?;

        let line = InfiniteLine::at_angle(centroid, angle);
        let dir = angle.unit_vector();
        let along_x = dir.x.abs() >= dir.y.abs();
        let hits: Vec<Point> = self
            .geometry
            .line_intersections(&line)?
            .into_iter()
            .filter(|&p| {
                let d = p - centroid;
                if along_x {
                    d.dx * dir.x > 0.0
                } else {
                    d.dy * dir.y > 0.0
                }
            })
            .collect();

        debug!(
            node = ?self.name,
            angle = angle.degrees(),
            candidates = hits.len(),
            "angular anchor"
        );

        match hits.as_slice() {
            [p] => Ok(*p),
            [] => Err(AnchorError::NoIntersection {
                key: key.to_string(),
            }),
            many => Err(AnchorError::AmbiguousAnchor {
                key: key.to_string(),
                count: many.len(),
            }),
        }
    }

    /// Copy with every drawable and explicit anchor moved by `offset`.
    pub fn translated(&self, offset: Offset) -> Node {
        let mut bbox = self.bbox;
        if !bbox.is_empty() {
            bbox.min += offset;
            bbox.max += offset;
        }
        Node {
            name: self.name.clone(),
            drawables: self.drawables.iter().map(|d| d.translated(offset)).collect(),
            topology: self.topology,
            geometry: self.geometry.translated(offset),
            bbox,
            anchors: self
                .anchors
                .iter()
                .map(|(k, p)| (k.clone(), *p + offset))
                .collect(),
        }
    }
}
