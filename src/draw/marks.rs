//! Mark symbols stamped at positions (arrow heads, dots, crosses)

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::shapes;
use crate::errors::TransformError;
use crate::geom::Segment;
use crate::geom::defaults::MARK_SIZE;
use crate::transform::Transform;
use crate::types::{Angle, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkSymbol {
    Arrow,
    Triangle,
    Diamond,
    Rect,
    Bracket,
    Bar,
    Circle,
    Plus,
    X,
    Star,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mark symbol `{0}`; expected one of arrow (>), triangle (|>), diamond (<>), rect ([]), bracket (]), bar (|), circle (o), plus (+), x, star (*)")]
pub struct ParseMarkError(pub String);

impl FromStr for MarkSymbol {
    type Err = ParseMarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "arrow" | ">" => MarkSymbol::Arrow,
            "triangle" | "|>" => MarkSymbol::Triangle,
            "diamond" | "<>" => MarkSymbol::Diamond,
            "rect" | "[]" => MarkSymbol::Rect,
            "bracket" | "]" => MarkSymbol::Bracket,
            "bar" | "|" => MarkSymbol::Bar,
            "circle" | "o" => MarkSymbol::Circle,
            "plus" | "+" => MarkSymbol::Plus,
            "x" => MarkSymbol::X,
            "star" | "*" => MarkSymbol::Star,
            other => return Err(ParseMarkError(other.to_string())),
        })
    }
}

impl fmt::Display for MarkSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarkSymbol::Arrow => "arrow",
            MarkSymbol::Triangle => "triangle",
            MarkSymbol::Diamond => "diamond",
            MarkSymbol::Rect => "rect",
            MarkSymbol::Bracket => "bracket",
            MarkSymbol::Bar => "bar",
            MarkSymbol::Circle => "circle",
            MarkSymbol::Plus => "plus",
            MarkSymbol::X => "x",
            MarkSymbol::Star => "star",
        };
        f.write_str(name)
    }
}

/// Polylines from unit-size vertex lists, scaled to `MARK_SIZE`.
fn strokes(polylines: &[&[(f64, f64)]]) -> Vec<Segment> {
    polylines
        .iter()
        .filter_map(|pts| {
            Segment::line(
                pts.iter()
                    .map(|&(x, y)| Point::new(x * MARK_SIZE, y * MARK_SIZE))
                    .collect(),
            )
            .ok()
        })
        .collect()
}

impl MarkSymbol {
    /// Outline of the symbol centered (or tipped) at the origin, pointing along +x.
    pub fn unit_segments(self) -> Vec<Segment> {
        let head = 5.0 * std::f64::consts::PI / 6.0;
        let (hx, hy) = (head.cos(), head.sin());
        let d = std::f64::consts::FRAC_1_SQRT_2;
        match self {
            MarkSymbol::Arrow => strokes(&[&[(hx, hy), (0.0, 0.0), (hx, -hy)]]),
            MarkSymbol::Triangle => strokes(&[&[(hx, hy), (0.0, 0.0), (hx, -hy), (hx, hy)]]),
            MarkSymbol::Diamond => {
                strokes(&[&[(0.0, d), (d, 0.0), (0.0, -d), (-d, 0.0), (0.0, d)]])
            }
            MarkSymbol::Rect => {
                strokes(&[&[(-0.5, 1.0), (0.5, 1.0), (0.5, -1.0), (-0.5, -1.0), (-0.5, 1.0)]])
            }
            MarkSymbol::Bracket => strokes(&[&[(-1.0, 1.0), (0.0, 1.0), (0.0, -1.0), (-1.0, -1.0)]]),
            MarkSymbol::Bar => strokes(&[&[(0.0, 1.0), (0.0, -1.0)]]),
            MarkSymbol::Circle => shapes::ellipse(Point::ORIGIN, MARK_SIZE, MARK_SIZE),
            MarkSymbol::Plus => strokes(&[&[(0.0, 1.0), (0.0, -1.0)], &[(-1.0, 0.0), (1.0, 0.0)]]),
            MarkSymbol::X => strokes(&[&[(d, d), (-d, -d)], &[(-d, d), (d, -d)]]),
            MarkSymbol::Star => strokes(&[
                &[(0.0, 1.0), (0.0, -1.0)],
                &[(d, d), (-d, -d)],
                &[(-d, d), (d, -d)],
            ]),
        }
    }
}

/// How a mark is oriented and sized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkOptions {
    pub symbol: MarkSymbol,
    pub angle: Angle,
    pub scale: (f64, f64),
    /// Mirror about the y axis before rotating
    pub reverse: bool,
}

impl Default for MarkOptions {
    fn default() -> Self {
        MarkOptions::new(MarkSymbol::Arrow)
    }
}

impl MarkOptions {
    pub fn new(symbol: MarkSymbol) -> Self {
        MarkOptions {
            symbol,
            angle: Angle::ZERO,
            scale: (1.0, 1.0),
            reverse: false,
        }
    }

    pub fn with_angle(mut self, angle: Angle) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_scale(mut self, sx: f64, sy: f64) -> Self {
        self.scale = (sx, sy);
        self
    }

    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Local-to-placed transform: scale, then mirror, then rotate.
    fn placement(&self) -> Result<Transform, TransformError> {
        let mut t = Transform::identity();
        t.rotate(self.angle)?;
        if self.reverse {
            t.reflect(1.0, 0.0, 0.0)?;
        }
        t.scale(self.scale.0, self.scale.1)?;
        Ok(t)
    }

    /// Copies of the symbol at every position.
    pub fn stamp(&self, positions: &[Point]) -> Result<Vec<Segment>, TransformError> {
        let placement = self.placement()?;
        let unit: Vec<Segment> = self
            .symbol
            .unit_segments()
            .iter()
            .map(|s| s.transformed(&placement))
            .collect();
        Ok(positions
            .iter()
            .flat_map(|&p| unit.iter().map(move |s| s.translated(p - Point::ORIGIN)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Path, SegmentGeometry};

    #[test]
    fn symbols_parse_by_name_and_alias() {
        assert_eq!("arrow".parse::<MarkSymbol>(), Ok(MarkSymbol::Arrow));
        assert_eq!(">".parse::<MarkSymbol>(), Ok(MarkSymbol::Arrow));
        assert_eq!("|>".parse::<MarkSymbol>(), Ok(MarkSymbol::Triangle));
        assert_eq!("<>".parse::<MarkSymbol>(), Ok(MarkSymbol::Diamond));
        assert_eq!("[]".parse::<MarkSymbol>(), Ok(MarkSymbol::Rect));
        assert_eq!("]".parse::<MarkSymbol>(), Ok(MarkSymbol::Bracket));
        assert_eq!("|".parse::<MarkSymbol>(), Ok(MarkSymbol::Bar));
        assert_eq!("o".parse::<MarkSymbol>(), Ok(MarkSymbol::Circle));
        assert_eq!("+".parse::<MarkSymbol>(), Ok(MarkSymbol::Plus));
        assert_eq!("x".parse::<MarkSymbol>(), Ok(MarkSymbol::X));
        assert_eq!("*".parse::<MarkSymbol>(), Ok(MarkSymbol::Star));
        assert!("hexagon".parse::<MarkSymbol>().is_err());
    }

    #[test]
    fn symbol_display_round_trips() {
        for s in ["arrow", "triangle", "diamond", "rect", "bracket", "bar", "circle", "plus", "x", "star"] {
            assert_eq!(s.parse::<MarkSymbol>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn arrow_tip_is_at_the_position() {
        let segs = MarkOptions::new(MarkSymbol::Arrow)
            .stamp(&[Point::new(2.0, 3.0)])
            .unwrap();
        assert_eq!(segs.len(), 1);
        let pts = segs[0].control_points();
        assert!(pts[1].approx_eq(Point::new(2.0, 3.0)));
        assert!(pts[0].x() < 2.0);
    }

    #[test]
    fn rotated_arrow_points_up() {
        let segs = MarkOptions::new(MarkSymbol::Arrow)
            .with_angle(Angle::from_degrees(90.0))
            .stamp(&[Point::ORIGIN])
            .unwrap();
        let wing = segs[0].start();
        assert!(wing.y() < 0.0, "{wing}");
    }

    #[test]
    fn reverse_mirrors_about_y_axis() {
        let segs = MarkOptions::new(MarkSymbol::Arrow)
            .reversed(true)
            .stamp(&[Point::ORIGIN])
            .unwrap();
        assert!(segs[0].start().x() > 0.0);
    }

    #[test]
    fn stamp_repeats_per_position() {
        let segs = MarkOptions::new(MarkSymbol::Plus)
            .stamp(&[Point::ORIGIN, Point::new(1.0, 1.0), Point::new(2.0, 0.0)])
            .unwrap();
        assert_eq!(segs.len(), 6);
    }

    #[test]
    fn circle_mark_has_mark_size_radius() {
        let segs = MarkOptions::new(MarkSymbol::Circle)
            .with_scale(2.0, 2.0)
            .stamp(&[Point::new(5.0, 5.0)])
            .unwrap();
        let path = Path::new(segs);
        assert!(path.is_closed());
        let bb = path.bbox();
        assert!((bb.max.x() - 5.0 - 2.0 * MARK_SIZE).abs() < 1e-12);
    }

    #[test]
    fn zero_scale_is_rejected() {
        let err = MarkOptions::new(MarkSymbol::Bar)
            .with_scale(0.0, 1.0)
            .stamp(&[Point::ORIGIN]);
        assert!(err.is_err());
    }
}
