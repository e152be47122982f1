//! Drawing context: current point, transform stack, node registry and sink

use std::collections::{BTreeMap, VecDeque};

use super::drawable::{Drawable, DrawableRegistry};
use super::marks::MarkOptions;
use super::position::{Position, Resolver};
use super::shapes;
use super::sink::{DrawableHandle, RecordingSink, RenderSink, Style};
use crate::errors::{Error, PositionError, TransformError};
use crate::geom::Segment;
use crate::geom::defaults::MAX_TRANSFORM_HISTORY;
use crate::log::{debug, warn};
use crate::node::Node;
use crate::parse::AnchorKey;
use crate::transform::Transform;
use crate::types::{Angle, BBox, Offset, Point};

/// Settings a context starts from
#[derive(Clone, Debug)]
pub struct ContextOptions {
    /// Transforms kept for `restore_transform`
    pub history_size: usize,
    /// Default style every drawable starts from
    pub style: Style,
}

impl Default for ContextOptions {
    fn default() -> Self {
        ContextOptions {
            history_size: MAX_TRANSFORM_HISTORY,
            style: Style::new(),
        }
    }
}

/// Per-call options for the draw operations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawOptions {
    /// Register the node under this name
    pub name: Option<String>,
    /// Translate the finished shape so this anchor lands on the first position
    pub anchor: Option<String>,
    /// Overlaid on the context's default style
    pub style: Style,
}

impl DrawOptions {
    pub fn named(name: impl Into<String>) -> Self {
        DrawOptions {
            name: Some(name.into()),
            ..DrawOptions::default()
        }
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

/// Mutable drawing state.
///
/// Positions resolve against the current point and the active transform;
/// every draw call builds an immutable [`Node`], hands its drawables to the
/// sink and keeps the node for later anchor references.
#[derive(Debug)]
pub struct DrawingContext<S: RenderSink = RecordingSink> {
    current: Point,
    transform: Transform,
    history: VecDeque<Transform>,
    history_size: usize,
    nodes: BTreeMap<String, Node>,
    handles: BTreeMap<String, Vec<DrawableHandle>>,
    unnamed: Vec<(Node, Vec<DrawableHandle>)>,
    bounds: BBox,
    style: Style,
    registry: DrawableRegistry,
    sink: S,
}

impl DrawingContext<RecordingSink> {
    pub fn new() -> Self {
        DrawingContext::with_sink(RecordingSink::new())
    }
}

impl Default for DrawingContext<RecordingSink> {
    fn default() -> Self {
        DrawingContext::new()
    }
}

impl<S: RenderSink> DrawingContext<S> {
    pub fn with_sink(sink: S) -> Self {
        DrawingContext::with_options(sink, ContextOptions::default())
    }

    pub fn with_options(sink: S, options: ContextOptions) -> Self {
        DrawingContext {
            current: Point::ORIGIN,
            transform: Transform::identity(),
            history: VecDeque::new(),
            history_size: options.history_size,
            nodes: BTreeMap::new(),
            handles: BTreeMap::new(),
            unnamed: Vec::new(),
            bounds: BBox::new(),
            style: options.style,
            registry: DrawableRegistry::default(),
            sink,
        }
    }

    // ========================================================================
    // State accessors
    // ========================================================================

    pub fn current_point(&self) -> Point {
        self.current
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Extent of everything drawn so far.
    pub fn bounds(&self) -> BBox {
        self.bounds
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Named nodes, by name.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn unnamed_nodes(&self) -> impl Iterator<Item = &Node> {
        self.unnamed.iter().map(|(node, _)| node)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn registry_mut(&mut self) -> &mut DrawableRegistry {
        &mut self.registry
    }

    /// Replace the default style.
    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Resolve `position` to an absolute point.
    ///
    /// The current point moves only when both `update` and the position's own
    /// flag are set, and never on failure.
    pub fn resolve_position(&mut self, position: &Position, update: bool) -> Result<Point, PositionError> {
        let resolver = Resolver {
            transform: &self.transform,
            current: self.current,
            nodes: &self.nodes,
        };
        let point = resolver.resolve(position)?;
        if update && position.update {
            self.current = point;
        }
        Ok(point)
    }

    pub fn move_to(&mut self, position: &Position) -> Result<Point, PositionError> {
        self.resolve_position(position, true)
    }

    /// Resolve positions in order, restoring the current point if any fails.
    fn resolve_all(&mut self, positions: &[&Position]) -> Result<Vec<Point>, PositionError> {
        let saved = self.current;
        let mut points = Vec::with_capacity(positions.len());
        for position in positions {
            match self.resolve_position(position, true) {
                Ok(p) => points.push(p),
                Err(err) => {
                    self.current = saved;
                    return Err(err);
                }
            }
        }
        Ok(points)
    }

    // ========================================================================
    // Transform stack
    // ========================================================================

    fn update_transform(
        &mut self,
        op: impl FnOnce(&mut Transform) -> Result<(), TransformError>,
    ) -> Result<(), TransformError> {
        let previous = self.transform;
        let mut next = previous;
        op(&mut next)?;
        self.push_history(previous);
        self.transform = next;
        debug!(origin = %self.transform.origin(), "transform updated");
        Ok(())
    }

    fn push_history(&mut self, transform: Transform) {
        if self.history_size == 0 {
            return;
        }
        if self.history.len() == self.history_size {
            self.history.pop_front();
        }
        self.history.push_back(transform);
    }

    pub fn rotate(&mut self, angle: Angle) -> Result<(), TransformError> {
        self.update_transform(|t| t.rotate(angle))
    }

    pub fn rotate_about(&mut self, angle: Angle, pivot: Point) -> Result<(), TransformError> {
        self.update_transform(|t| t.rotate_about(angle, pivot))
    }

    pub fn translate(&mut self, v: Offset) -> Result<(), TransformError> {
        self.update_transform(|t| t.translate(v))
    }

    pub fn scale(&mut self, sx: f64, sy: f64) -> Result<(), TransformError> {
        self.update_transform(|t| t.scale(sx, sy))
    }

    pub fn set_origin(&mut self, p: Point) -> Result<(), TransformError> {
        self.update_transform(|t| t.set_origin(p))
    }

    pub fn set_viewport(&mut self, from: Point, to: Point, bounds: Offset) -> Result<(), TransformError> {
        self.update_transform(|t| t.set_viewport(from, to, bounds))
    }

    pub fn reflect(&mut self, a: f64, b: f64, c: f64) -> Result<(), TransformError> {
        self.update_transform(|t| t.reflect(a, b, c))
    }

    /// Pop the most recent transform off the history; `false` when it is empty.
    pub fn restore_transform(&mut self) -> bool {
        match self.history.pop_back() {
            Some(previous) => {
                self.transform = previous;
                true
            }
            None => false,
        }
    }

    /// Back to the identity; the replaced transform stays restorable.
    pub fn reset_transform(&mut self) {
        let previous = self.transform;
        self.push_history(previous);
        self.transform = Transform::identity();
    }

    // ========================================================================
    // Nodes and the sink
    // ========================================================================

    /// Register a finished node: its drawables go to the sink, its box
    /// extends the bounds. A named node replaces any node with that name.
    pub fn add_node(&mut self, node: Node) -> &Node {
        let handles: Vec<DrawableHandle> = node
            .drawables()
            .iter()
            .map(|d| self.sink.register_drawable(d.path(), d.style()))
            .collect();
        self.bounds.expand_bbox(&node.bbox());
        debug!(name = ?node.name(), drawables = handles.len(), "registered node");

        match node.name().map(str::to_string) {
            Some(name) => {
                if let Some(old) = self.handles.insert(name.clone(), handles) {
                    warn!(name = %name, "replacing node");
                    for handle in old {
                        self.sink.remove_drawable(handle);
                    }
                }
                self.nodes.insert(name.clone(), node);
                &self.nodes[&name]
            }
            None => {
                self.unnamed.push((node, handles));
                let last = self.unnamed.len() - 1;
                &self.unnamed[last].0
            }
        }
    }

    /// Remove a named node and detach its drawables from the sink.
    pub fn remove_node(&mut self, name: &str) -> Option<Node> {
        for handle in self.handles.remove(name).unwrap_or_default() {
            self.sink.remove_drawable(handle);
        }
        self.nodes.remove(name)
    }

    fn build(&self, kind: &str, segments: Vec<Segment>, options: &DrawOptions) -> Result<Node, Error> {
        let style = self.style.overlay(&options.style);
        let drawable = self.registry.build(kind, segments, style)?;
        Ok(Node::from_drawables(vec![drawable], options.name.clone())?)
    }

    /// Build a drawable of a registered kind from absolute segments.
    ///
    /// The placement anchor, if any, lands on the current point.
    pub fn draw(&mut self, kind: &str, segments: Vec<Segment>, options: DrawOptions) -> Result<&Node, Error> {
        let node = self.build(kind, segments, &options);
        let current = self.current;
        self.place(node, current, &options, current)
    }

    // ========================================================================
    // Draw calls
    // ========================================================================

    /// Polyline through the positions.
    pub fn line(&mut self, points: &[Position], options: DrawOptions) -> Result<&Node, Error> {
        let refs: Vec<&Position> = points.iter().collect();
        let saved = self.current;
        let resolved = self.resolve_all(&refs)?;
        let target = resolved.first().copied().unwrap_or(self.current);
        let node = Segment::line(resolved)
            .map_err(Error::from)
            .and_then(|segment| self.build("path", vec![segment], &options));
        self.place(node, target, &options, saved)
    }

    /// Axis-aligned rectangle with opposite corners `a` and `b`.
    pub fn rect(&mut self, a: &Position, b: &Position, options: DrawOptions) -> Result<&Node, Error> {
        let saved = self.current;
        let corners = self.resolve_all(&[a, b])?;
        let node = self.build("path", shapes::rectangle(corners[0], corners[1]), &options);
        self.place(node, corners[0], &options, saved)
    }

    /// Ellipse (circle when `rx == ry`) of eight cubic pieces; radii are absolute.
    pub fn circle(&mut self, center: &Position, rx: f64, ry: f64, options: DrawOptions) -> Result<&Node, Error> {
        Point::try_new(rx, ry)?;
        let saved = self.current;
        let c = self.resolve_all(&[center])?[0];
        let node = self.build("path", shapes::ellipse(c, rx, ry), &options);
        self.place(node, c, &options, saved)
    }

    /// Bezier from `start` to `end`; one control point makes a quadratic,
    /// two a cubic. Control points become anchors `ctrl-0` and `ctrl-1`.
    pub fn bezier(
        &mut self,
        start: &Position,
        end: &Position,
        ctrls: &[Position],
        options: DrawOptions,
    ) -> Result<&Node, Error> {
        let saved = self.current;
        let mut refs = vec![start, end];
        refs.extend(ctrls.iter());
        let pts = self.resolve_all(&refs)?;
        let (s, e, controls) = (pts[0], pts[1], &pts[2..]);

        let segment = match *controls {
            [c] => Segment::quadratic(s, c, e),
            [c1, c2] => Segment::cubic(s, c1, c2, e),
            _ => {
                self.current = saved;
                return Err(PositionError::malformed(format!(
                    "a bezier needs one or two control points, got {}",
                    controls.len()
                ))
                .into());
            }
        };
        let node = self.build("path", vec![segment], &options).and_then(|mut node| {
            for (i, c) in controls.iter().enumerate() {
                node.add_anchor(&format!("ctrl-{i}"), *c)?;
            }
            Ok(node)
        });
        self.place(node, s, &options, saved)
    }

    /// Stamp a mark symbol at every position.
    pub fn mark(&mut self, positions: &[Position], mark: MarkOptions, options: DrawOptions) -> Result<&Node, Error> {
        let refs: Vec<&Position> = positions.iter().collect();
        let saved = self.current;
        let points = self.resolve_all(&refs)?;
        let target = points.first().copied().unwrap_or(self.current);
        let node = mark
            .stamp(&points)
            .map_err(Error::from)
            .and_then(|segments| self.build("mark", segments, &options));
        self.place(node, target, &options, saved)
    }

    /// Register a named point.
    pub fn anchor(&mut self, name: &str, position: &Position) -> Result<&Node, Error> {
        let saved = self.current;
        let p = self.resolve_all(&[position])?[0];
        match Node::anchor_point(Some(name.to_string()), p) {
            Ok(node) => Ok(self.add_node(node)),
            Err(err) => {
                self.current = saved;
                Err(err.into())
            }
        }
    }

    /// Translate a built node onto its placement anchor and register it,
    /// rolling the current point back to `saved` when anything failed.
    fn place(
        &mut self,
        node: Result<Node, Error>,
        target: Point,
        options: &DrawOptions,
        saved: Point,
    ) -> Result<&Node, Error> {
        let placed = node.and_then(|node| match &options.anchor {
            Some(anchor) => {
                let at = node.resolve(&AnchorKey::parse(anchor))?;
                Ok(node.translated(target - at))
            }
            None => Ok(node),
        });
        match placed {
            Ok(node) => Ok(self.add_node(node)),
            Err(err) => {
                self.current = saved;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::marks::MarkSymbol;
    use crate::draw::position::PositionKeys;
    use crate::errors::AnchorError;
    use crate::geom::{SegmentGeometry, Topology};

    fn xy(x: f64, y: f64) -> Position {
        Position::xy(x, y).unwrap()
    }

    fn keys(k: PositionKeys) -> Position {
        Position::try_from(k).unwrap()
    }

    // ==================== Position tests ====================

    #[test]
    fn move_then_relative() {
        let mut ctx = DrawingContext::new();
        let p = ctx.move_to(&keys(PositionKeys::new().x(5.0).y(5.0))).unwrap();
        assert_eq!(p, Point::new(5.0, 5.0));
        assert_eq!(ctx.current_point(), Point::new(5.0, 5.0));

        let rel = keys(PositionKeys::new().rel(PositionKeys::new().x(-5.0).y(-5.0)));
        assert_eq!(ctx.move_to(&rel), Ok(Point::ORIGIN));
    }

    #[test]
    fn resolve_without_update_keeps_current_point() {
        let mut ctx = DrawingContext::new();
        ctx.resolve_position(&xy(3.0, 4.0), false).unwrap();
        assert_eq!(ctx.current_point(), Point::ORIGIN);

        ctx.resolve_position(&xy(3.0, 4.0).without_update(), true).unwrap();
        assert_eq!(ctx.current_point(), Point::ORIGIN);
    }

    #[test]
    fn failed_resolution_keeps_current_point() {
        let mut ctx = DrawingContext::new();
        ctx.move_to(&xy(1.0, 1.0)).unwrap();
        let err = ctx.move_to(&Position::anchor("nowhere", "center")).unwrap_err();
        assert!(matches!(err, PositionError::UnknownNode { .. }));
        assert_eq!(ctx.current_point(), Point::new(1.0, 1.0));
    }

    #[test]
    fn cartesian_goes_through_transform() {
        let mut ctx = DrawingContext::new();
        ctx.translate(Offset::new(10.0, 0.0)).unwrap();
        assert_eq!(ctx.move_to(&xy(1.0, 2.0)), Ok(Point::new(11.0, 2.0)));
    }

    // ==================== Transform stack tests ====================

    #[test]
    fn restore_pops_history() {
        let mut ctx = DrawingContext::new();
        ctx.translate(Offset::new(1.0, 0.0)).unwrap();
        ctx.scale(2.0, 2.0).unwrap();
        assert!(ctx.restore_transform());
        assert_eq!(ctx.transform().origin(), Point::new(1.0, 0.0));
        assert!(ctx.restore_transform());
        assert_eq!(*ctx.transform(), Transform::identity());
        assert!(!ctx.restore_transform());
    }

    #[test]
    fn history_is_bounded() {
        let options = ContextOptions {
            history_size: 3,
            ..ContextOptions::default()
        };
        let mut ctx = DrawingContext::with_options(RecordingSink::new(), options);
        for _ in 0..5 {
            ctx.translate(Offset::new(1.0, 0.0)).unwrap();
        }
        let mut restored = 0;
        while ctx.restore_transform() {
            restored += 1;
        }
        assert_eq!(restored, 3);
        assert_eq!(ctx.transform().origin(), Point::new(2.0, 0.0));
    }

    #[test]
    fn degenerate_transform_is_not_recorded() {
        let mut ctx = DrawingContext::new();
        assert!(ctx.scale(0.0, 0.0).is_err());
        assert!(!ctx.restore_transform());
    }

    #[test]
    fn reset_is_restorable() {
        let mut ctx = DrawingContext::new();
        ctx.translate(Offset::new(4.0, 4.0)).unwrap();
        ctx.reset_transform();
        assert_eq!(*ctx.transform(), Transform::identity());
        assert!(ctx.restore_transform());
        assert_eq!(ctx.transform().origin(), Point::new(4.0, 4.0));
    }

    // ==================== Draw call tests ====================

    #[test]
    fn circle_registers_named_node() {
        let mut ctx = DrawingContext::new();
        ctx.circle(&xy(0.0, 0.0), 1.0, 1.0, DrawOptions::named("c")).unwrap();
        let c = ctx.node("c").unwrap();
        assert!(c.anchor("north").unwrap().approx_eq(Point::new(0.0, 1.0)));
        assert_eq!(ctx.sink().len(), 1);
        assert!((ctx.bounds().width() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn anchors_of_earlier_nodes_are_usable() {
        let mut ctx = DrawingContext::new();
        ctx.circle(&xy(0.0, 0.0), 1.0, 1.0, DrawOptions::named("c")).unwrap();
        let east: Position = "c.east".parse().unwrap();
        let node = ctx
            .line(&[east, xy(5.0, 0.0)], DrawOptions::named("l"))
            .unwrap();
        assert!(node.anchor("start").unwrap().approx_eq(Point::new(1.0, 0.0)));
        assert_eq!(ctx.current_point(), Point::new(5.0, 0.0));
    }

    #[test]
    fn placement_anchor_moves_shape() {
        let mut ctx = DrawingContext::new();
        let options = DrawOptions::named("r").with_anchor("south");
        ctx.rect(&xy(0.0, 0.0), &xy(2.0, 2.0), options).unwrap();
        let r = ctx.node("r").unwrap();
        assert!(r.anchor("south").unwrap().approx_eq(Point::new(0.0, 0.0)));
        assert!(r.anchor("center").unwrap().approx_eq(Point::new(0.0, 1.0)));
    }

    #[test]
    fn bezier_registers_control_anchors() {
        let mut ctx = DrawingContext::new();
        let node = ctx
            .bezier(
                &xy(0.0, 0.0),
                &xy(4.0, 0.0),
                &[xy(1.0, 2.0), xy(3.0, 2.0)],
                DrawOptions::named("b"),
            )
            .unwrap();
        assert_eq!(node.anchor("ctrl-0"), Ok(Point::new(1.0, 2.0)));
        assert_eq!(node.anchor("ctrl-1"), Ok(Point::new(3.0, 2.0)));
        assert_eq!(node.anchor("end"), Ok(Point::new(4.0, 0.0)));
    }

    #[test]
    fn quadratic_bezier_is_elevated() {
        let mut ctx = DrawingContext::new();
        let node = ctx
            .bezier(&xy(0.0, 0.0), &xy(2.0, 0.0), &[xy(1.0, 2.0)], DrawOptions::default())
            .unwrap();
        assert!(node.anchor("mid").unwrap().approx_eq(Point::new(1.0, 1.0)));
        assert!(matches!(node.anchor("ctrl-1"), Err(AnchorError::AnchorNotFound { .. })));
    }

    #[test]
    fn bezier_control_count_checked() {
        let mut ctx = DrawingContext::new();
        let err = ctx
            .bezier(&xy(0.0, 0.0), &xy(1.0, 0.0), &[], DrawOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Position(PositionError::MalformedPositionSpec { .. })));
        assert_eq!(ctx.current_point(), Point::ORIGIN);
    }

    #[test]
    fn marks_have_no_anchor_geometry() {
        let mut ctx = DrawingContext::new();
        let node = ctx
            .mark(
                &[xy(0.0, 0.0), xy(1.0, 0.0)],
                MarkOptions::new(MarkSymbol::Plus),
                DrawOptions::named("m"),
            )
            .unwrap();
        assert_eq!(node.topology(), Topology::Empty);
        assert_eq!(node.drawables()[0].path().segments().len(), 4);
    }

    #[test]
    fn draw_by_kind() {
        let mut ctx = DrawingContext::new();
        let seg = Segment::line(vec![Point::ORIGIN, Point::new(1.0, 0.0)]).unwrap();
        assert!(ctx.draw("path", vec![seg.clone()], DrawOptions::default()).is_ok());
        let err = ctx.draw("sprite", vec![seg], DrawOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownDrawableKind { .. }));
        assert_eq!(ctx.unnamed_nodes().count(), 1);
    }

    #[test]
    fn styles_overlay_default() {
        let mut ctx = DrawingContext::new();
        ctx.set_style(Style::new().with("stroke", "black").with("fill", "none"));
        let options = DrawOptions::default().with_style(Style::new().with("fill", "red"));
        ctx.circle(&xy(0.0, 0.0), 1.0, 1.0, options).unwrap();
        let (_, _, style) = ctx.sink().iter().next().unwrap();
        assert_eq!(style.get("stroke"), Some("black"));
        assert_eq!(style.get("fill"), Some("red"));
    }

    #[test]
    fn replacing_named_node_detaches_old_drawables() {
        let mut ctx = DrawingContext::new();
        ctx.circle(&xy(0.0, 0.0), 1.0, 1.0, DrawOptions::named("c")).unwrap();
        ctx.circle(&xy(5.0, 0.0), 1.0, 1.0, DrawOptions::named("c")).unwrap();
        assert_eq!(ctx.sink().len(), 1);
        assert_eq!(ctx.nodes().count(), 1);
        let center = ctx.node("c").unwrap().anchor("center").unwrap();
        assert!(center.approx_eq(Point::new(5.0, 0.0)));

        assert!(ctx.remove_node("c").is_some());
        assert!(ctx.sink().is_empty());
        assert!(ctx.node("c").is_none());
    }

    #[test]
    fn anchor_registers_point_node() {
        let mut ctx = DrawingContext::new();
        ctx.anchor("pin", &xy(2.0, 3.0)).unwrap();
        let pos: Position = "pin.center".parse().unwrap();
        assert_eq!(ctx.resolve_position(&pos, false), Ok(Point::new(2.0, 3.0)));
        assert!(ctx.anchor("bad name", &xy(0.0, 0.0)).is_err());
        assert_eq!(ctx.current_point(), Point::new(2.0, 3.0));
    }

    #[test]
    fn failed_draw_rolls_back_current_point() {
        let mut ctx = DrawingContext::new();
        let err = ctx
            .line(&[xy(3.0, 3.0), Position::anchor("ghost", "center")], DrawOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Position(PositionError::UnknownNode { .. })));
        assert_eq!(ctx.current_point(), Point::ORIGIN);

        let err = ctx
            .line(&[xy(3.0, 3.0)], DrawOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Path(_)));
        assert_eq!(ctx.current_point(), Point::ORIGIN);
    }

    #[test]
    fn line_segment_endpoints() {
        let mut ctx = DrawingContext::new();
        let node = ctx
            .line(&[xy(0.0, 0.0), xy(1.0, 1.0), xy(2.0, 0.0)], DrawOptions::default())
            .unwrap();
        let seg = &node.geometry().segments()[0];
        assert_eq!(seg.end(), Point::new(2.0, 0.0));
    }
}
