//! Drawables: styled absolute paths owned by nodes

use std::collections::BTreeMap;

use enum_dispatch::enum_dispatch;

use super::sink::Style;
use crate::errors::Error;
use crate::geom::{Path, Segment};
use crate::types::Offset;

/// Something a node can hand to the render sink.
#[enum_dispatch]
pub trait Drawable {
    /// Registry name of this drawable's kind
    fn kind(&self) -> &'static str;

    /// The absolute path to render.
    fn path(&self) -> &Path;

    /// Segments that take part in the owning node's anchor geometry.
    fn anchor_segments(&self) -> &[Segment];

    fn style(&self) -> &Style;

    fn translated(&self, offset: Offset) -> DrawableEnum;
}

/// A plain stroked or filled path; all of it counts for anchors.
#[derive(Clone, Debug, PartialEq)]
pub struct PathDrawable {
    path: Path,
    style: Style,
}

impl PathDrawable {
    pub fn new(segments: Vec<Segment>, style: Style) -> Self {
        PathDrawable {
            path: Path::new(segments),
            style,
        }
    }
}

impl Drawable for PathDrawable {
    fn kind(&self) -> &'static str {
        "path"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn anchor_segments(&self) -> &[Segment] {
        self.path.segments()
    }

    fn style(&self) -> &Style {
        &self.style
    }

    fn translated(&self, offset: Offset) -> DrawableEnum {
        PathDrawable {
            path: self.path.translated(offset),
            style: self.style.clone(),
        }
        .into()
    }
}

/// Decoration that is rendered but ignored by anchor lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkDrawable {
    path: Path,
    style: Style,
}

impl MarkDrawable {
    pub fn new(segments: Vec<Segment>, style: Style) -> Self {
        MarkDrawable {
            path: Path::new(segments),
            style,
        }
    }
}

impl Drawable for MarkDrawable {
    fn kind(&self) -> &'static str {
        "mark"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn anchor_segments(&self) -> &[Segment] {
        &[]
    }

    fn style(&self) -> &Style {
        &self.style
    }

    fn translated(&self, offset: Offset) -> DrawableEnum {
        MarkDrawable {
            path: self.path.translated(offset),
            style: self.style.clone(),
        }
        .into()
    }
}

#[enum_dispatch(Drawable)]
#[derive(Clone, Debug, PartialEq)]
pub enum DrawableEnum {
    Path(PathDrawable),
    Mark(MarkDrawable),
}

/// Builds a drawable of one kind from absolute segments and a resolved style.
pub type DrawableBuilder = fn(Vec<Segment>, Style) -> DrawableEnum;

/// Drawable kinds by name.
#[derive(Clone, Debug)]
pub struct DrawableRegistry {
    builders: BTreeMap<String, DrawableBuilder>,
}

impl Default for DrawableRegistry {
    fn default() -> Self {
        let mut registry = DrawableRegistry {
            builders: BTreeMap::new(),
        };
        registry.register("path", |segments, style| PathDrawable::new(segments, style).into());
        registry.register("mark", |segments, style| MarkDrawable::new(segments, style).into());
        registry
    }
}

impl DrawableRegistry {
    /// Register (or replace) the builder for `kind`.
    pub fn register(&mut self, kind: impl Into<String>, builder: DrawableBuilder) {
        self.builders.insert(kind.into(), builder);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.builders.keys().map(String::as_str)
    }

    pub fn build(&self, kind: &str, segments: Vec<Segment>, style: Style) -> Result<DrawableEnum, Error> {
        let builder = self.builders.get(kind).ok_or_else(|| Error::UnknownDrawableKind {
            kind: kind.to_string(),
        })?;
        Ok(builder(segments, style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn segment() -> Segment {
        Segment::line(vec![Point::ORIGIN, Point::new(1.0, 0.0)]).unwrap()
    }

    #[test]
    fn builtin_kinds() {
        let registry = DrawableRegistry::default();
        assert_eq!(registry.kinds().collect::<Vec<_>>(), vec!["mark", "path"]);

        let path = registry.build("path", vec![segment()], Style::new()).unwrap();
        assert_eq!(path.kind(), "path");
        assert_eq!(path.anchor_segments().len(), 1);

        let mark = registry.build("mark", vec![segment()], Style::new()).unwrap();
        assert_eq!(mark.kind(), "mark");
        assert!(mark.anchor_segments().is_empty());
        assert_eq!(mark.path().segments().len(), 1);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let registry = DrawableRegistry::default();
        let err = registry.build("sprite", vec![], Style::new()).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"unknown drawable kind `sprite`");
    }

    #[test]
    fn custom_kind_can_be_registered() {
        let mut registry = DrawableRegistry::default();
        registry.register("ghost", |segments, style| MarkDrawable::new(segments, style).into());
        assert!(registry.contains("ghost"));
        assert!(registry.build("ghost", vec![segment()], Style::new()).is_ok());
    }

    #[test]
    fn translated_keeps_style() {
        let d: DrawableEnum = PathDrawable::new(vec![segment()], Style::new().with("fill", "red")).into();
        let moved = d.translated(Offset::new(0.0, 2.0));
        assert_eq!(moved.path().start(), Some(Point::new(0.0, 2.0)));
        assert_eq!(moved.style().get("fill"), Some("red"));
    }
}
