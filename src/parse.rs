//! Parse anchor keys, angle literals and names with the pest grammar in `coords.pest`

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::types::Angle;

#[derive(Parser)]
#[grammar = "coords.pest"]
pub struct CoordParser;

/// A parsed anchor key.
///
/// Every string is a valid key: anything that is not a builtin name, a
/// number, a percentage or an angle becomes [`AnchorKey::Custom`] and is
/// looked up in the node's explicit anchors.
#[derive(Clone, Debug, PartialEq)]
pub enum AnchorKey {
    Center,
    North,
    South,
    East,
    West,
    Start,
    Mid,
    End,
    /// Distance along the path from its start
    Length(f64),
    /// `"<num>%"`, stored as a fraction in 0..=1 when in range
    Fraction(f64),
    /// `"<num>deg"` or `"<num>rad"`
    Angle(Angle),
    Custom(String),
}

/// Names reserved for the builtin anchors.
pub const BUILTIN_ANCHORS: [&str; 8] = [
    "center", "north", "south", "east", "west", "start", "mid", "end",
];

impl AnchorKey {
    /// Parse a key. Never fails; unknown shapes fall back to `Custom`.
    pub fn parse(key: &str) -> AnchorKey {
        let key = key.trim();
        match CoordParser::parse(Rule::anchor_key, key) {
            Ok(mut pairs) => pairs
                .next()
                .and_then(|pair| pair.into_inner().next())
                .and_then(anchor_key_from_pair)
                .unwrap_or_else(|| AnchorKey::Custom(key.to_string())),
            Err(_) => AnchorKey::Custom(key.to_string()),
        }
    }

    pub fn is_builtin_name(name: &str) -> bool {
        BUILTIN_ANCHORS.contains(&name)
    }
}

fn anchor_key_from_pair(pair: Pair<Rule>) -> Option<AnchorKey> {
    match pair.as_rule() {
        Rule::percent => number_inside(pair).map(|n| AnchorKey::Fraction(n / 100.0)),
        Rule::degrees | Rule::radians => angle_from_pair(pair).map(AnchorKey::Angle),
        Rule::number => parse_finite(pair.as_str()).map(AnchorKey::Length),
        Rule::name => Some(match pair.as_str() {
            "center" => AnchorKey::Center,
            "north" => AnchorKey::North,
            "south" => AnchorKey::South,
            "east" => AnchorKey::East,
            "west" => AnchorKey::West,
            "start" => AnchorKey::Start,
            "mid" => AnchorKey::Mid,
            "end" => AnchorKey::End,
            other => AnchorKey::Custom(other.to_string()),
        }),
        _ => None,
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn number_inside(pair: Pair<Rule>) -> Option<f64> {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::number)
        .and_then(|p| parse_finite(p.as_str()))
}

fn angle_from_pair(pair: Pair<Rule>) -> Option<Angle> {
    match pair.as_rule() {
        Rule::degrees => number_inside(pair).map(Angle::from_degrees),
        Rule::radians => number_inside(pair).map(Angle::from_radians),
        Rule::number => parse_finite(pair.as_str()).map(Angle::from_radians),
        _ => None,
    }
}

impl FromStr for AnchorKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AnchorKey::parse(s))
    }
}

impl From<&str> for AnchorKey {
    fn from(s: &str) -> Self {
        AnchorKey::parse(s)
    }
}

/// Drop the rounding noise of unit conversions (`30deg` stored as radians).
fn round_display(v: f64) -> f64 {
    (v * 1e9).round() / 1e9
}

impl fmt::Display for AnchorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorKey::Center => write!(f, "center"),
            AnchorKey::North => write!(f, "north"),
            AnchorKey::South => write!(f, "south"),
            AnchorKey::East => write!(f, "east"),
            AnchorKey::West => write!(f, "west"),
            AnchorKey::Start => write!(f, "start"),
            AnchorKey::Mid => write!(f, "mid"),
            AnchorKey::End => write!(f, "end"),
            AnchorKey::Length(l) => write!(f, "{l}"),
            AnchorKey::Fraction(t) => write!(f, "{}%", round_display(t * 100.0)),
            AnchorKey::Angle(a) => write!(f, "{}deg", round_display(a.degrees())),
            AnchorKey::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Parse an angle literal: `"<num>deg"`, `"<num>rad"` or a bare number of radians.
pub fn parse_angle(s: &str) -> Option<Angle> {
    let mut pairs = CoordParser::parse(Rule::angle_literal, s.trim()).ok()?;
    let inner = pairs.next()?.into_inner().next()?;
    angle_from_pair(inner)
}

/// Split `"<node>.<anchor>"` at the first dot.
pub fn split_anchor_ref(s: &str) -> Option<(&str, &str)> {
    let s = s.trim();
    let pairs = CoordParser::parse(Rule::anchor_ref, s).ok()?;
    let mut node = None;
    let mut tail = None;
    for pair in pairs.flatten() {
        match pair.as_rule() {
            Rule::name if node.is_none() => node = Some(pair.as_str()),
            Rule::anchor_tail => tail = Some(pair.as_str()),
            _ => {}
        }
    }
    Some((node?, tail?))
}

/// Whether `name` is a valid node or anchor name.
pub fn is_valid_name(name: &str) -> bool {
    CoordParser::parse(Rule::node_name, name).is_ok()
}
