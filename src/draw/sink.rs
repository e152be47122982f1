//! The rendering boundary: absolute paths plus opaque style maps go out,
//! handles come back.

use std::collections::BTreeMap;

use crate::geom::Path;

/// Style attributes, passed through to the sink uninterpreted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style(BTreeMap<String, String>);

impl Style {
    pub fn new() -> Self {
        Style::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `self` with every key of `top` written over it.
    pub fn overlay(&self, top: &Style) -> Style {
        let mut merged = self.clone();
        for (k, v) in &top.0 {
            merged.0.insert(k.clone(), v.clone());
        }
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Style(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Opaque id of something registered with a sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawableHandle(pub u64);

/// Consumer of resolved geometry, e.g. a plotting surface.
pub trait RenderSink {
    fn register_drawable(&mut self, path: &Path, style: &Style) -> DrawableHandle;
    fn remove_drawable(&mut self, handle: DrawableHandle);
}

/// A sink that keeps everything it is given in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    next: u64,
    entries: BTreeMap<DrawableHandle, (Path, Style)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, handle: DrawableHandle) -> Option<(&Path, &Style)> {
        self.entries.get(&handle).map(|(p, s)| (p, s))
    }

    /// Registered entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (DrawableHandle, &Path, &Style)> {
        self.entries.iter().map(|(h, (p, s))| (*h, p, s))
    }
}

impl RenderSink for RecordingSink {
    fn register_drawable(&mut self, path: &Path, style: &Style) -> DrawableHandle {
        let handle = DrawableHandle(self.next);
        self.next += 1;
        self.entries.insert(handle, (path.clone(), style.clone()));
        handle
    }

    fn remove_drawable(&mut self, handle: DrawableHandle) {
        self.entries.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Segment;
    use crate::types::Point;

    #[test]
    fn style_overlay_replaces_per_key() {
        let base = Style::new().with("stroke", "black").with("fill", "none");
        let top: Style = [("fill", "red")].into_iter().collect();
        let merged = base.overlay(&top);
        assert_eq!(merged.get("stroke"), Some("black"));
        assert_eq!(merged.get("fill"), Some("red"));
        assert_eq!(base.get("fill"), Some("none"));
    }

    #[test]
    fn recording_sink_registers_and_removes() {
        let mut sink = RecordingSink::new();
        let seg = Segment::line(vec![Point::ORIGIN, Point::new(1.0, 0.0)]).unwrap();
        let path = Path::new(vec![seg]);
        let a = sink.register_drawable(&path, &Style::new());
        let b = sink.register_drawable(&path, &Style::new().with("fill", "blue"));
        assert_ne!(a, b);
        assert_eq!(sink.len(), 2);

        sink.remove_drawable(a);
        assert_eq!(sink.len(), 1);
        assert!(sink.get(a).is_none());
        assert_eq!(sink.get(b).map(|(_, s)| s.get("fill")), Some(Some("blue")));
    }
}
