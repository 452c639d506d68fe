//! Connector geometry between consecutive steps.
//!
//! Every step `k` gets one directed connector to step `(k + 1) mod n`. Two shapes are
//! supported: a true circular arc following the layout circle, or a cubic curve whose
//! control points bow outward. Both stop short of the boxes by a per-endpoint trim.

use crate::geometry::{CircleLayout, Point, deg_to_rad};
use crate::layout::{BoxSize, LayoutEngine, Placement};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

/// Share of the nominal span that survives even when the trims ask for more.
pub const MIN_SPAN_FRACTION: f64 = 0.1;
const HIT_SAMPLES: usize = 32;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorMode {
    #[default]
    Arc,
    Bezier,
}

/// How far a connector endpoint stays away from its step.
#[derive(Debug, Clone, Copy, PartialEq, Default, SerializeDisplay, DeserializeFromStr)]
pub enum Trim {
    /// A third of the box width, measured per step.
    #[default]
    Auto,
    Degrees(f64),
    Pixels(f64),
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseTrimError {
    #[error("Invalid trim '{0}': expected \"auto\", \"<n>deg\" or \"<n>px\"")]
    Invalid(String),
}

impl FromStr for Trim {
    type Err = ParseTrimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        let invalid = || ParseTrimError::Invalid(s.to_string());
        let number = |n: &str| {
            n.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(invalid)
        };

        if raw == "auto" {
            Ok(Self::Auto)
        } else if let Some(n) = raw.strip_suffix("deg") {
            number(n).map(Self::Degrees)
        } else if let Some(n) = raw.strip_suffix("px") {
            number(n).map(Self::Pixels)
        } else {
            // bare numbers are degrees
            number(&raw).map(Self::Degrees)
        }
    }
}

impl fmt::Display for Trim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Degrees(d) => write!(f, "{d}deg"),
            Self::Pixels(p) => write!(f, "{p}px"),
        }
    }
}

impl Trim {
    /// Angular inset in radians for a step of the given size.
    pub fn angle(&self, circle: &CircleLayout, size: BoxSize) -> f64 {
        match self {
            Self::Auto => circle.chord_angle(size.width / 3.0),
            Self::Degrees(d) => deg_to_rad(*d),
            Self::Pixels(p) => circle.chord_angle(*p),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectorSettings {
    pub mode: ConnectorMode,
    pub trim: Trim,
    /// Arc radius relative to the layout radius.
    pub arc_radius_ratio: f64,
    /// Bezier control point radius relative to the layout radius.
    pub control_radius_ratio: f64,
    /// Where along the trimmed span the two control points sit.
    pub control_fractions: (f64, f64),
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            mode: ConnectorMode::Arc,
            trim: Trim::Auto,
            arc_radius_ratio: 1.0,
            control_radius_ratio: 1.12,
            control_fractions: (0.4, 0.6),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathShape {
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        span: f64,
        large_arc: bool,
        sweep: bool,
    },
    Cubic {
        c1: Point,
        c2: Point,
    },
}

/// Directed connector from step `from` to step `to`; `index` is the source step and is what
/// highlight state correlates on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorSegment {
    pub index: usize,
    pub from: usize,
    pub to: usize,
    pub start: Point,
    pub end: Point,
    pub shape: PathShape,
}

impl ConnectorSegment {
    pub fn path_data(&self) -> String {
        let (sx, sy) = (format_number(self.start.x), format_number(self.start.y));
        let (ex, ey) = (format_number(self.end.x), format_number(self.end.y));
        match self.shape {
            PathShape::Arc {
                radius,
                large_arc,
                sweep,
                ..
            } => {
                let r = format_number(radius);
                format!(
                    "M{sx},{sy} A{r},{r} 0 {},{} {ex},{ey}",
                    large_arc as u8, sweep as u8
                )
            }
            PathShape::Cubic { c1, c2 } => format!(
                "M{sx},{sy} C{},{} {},{} {ex},{ey}",
                format_number(c1.x),
                format_number(c1.y),
                format_number(c2.x),
                format_number(c2.y),
            ),
        }
    }

    /// Direction of travel at the end point, in radians.
    pub fn terminal_tangent(&self) -> f64 {
        match self.shape {
            PathShape::Arc {
                start_angle,
                span,
                sweep,
                ..
            } => {
                let end_angle = start_angle + span;
                if sweep {
                    end_angle + PI / 2.0
                } else {
                    end_angle - PI / 2.0
                }
            }
            PathShape::Cubic { c1, c2 } => [c2, c1, self.start]
                .into_iter()
                .find(|p| p.distance(self.end) > f64::EPSILON)
                .map(|p| (self.end.y - p.y).atan2(self.end.x - p.x))
                .unwrap_or(0.0),
        }
    }

    pub fn point_at(&self, t: f64) -> Point {
        match self.shape {
            PathShape::Arc {
                center,
                radius,
                start_angle,
                span,
                ..
            } => Point::polar(center, radius, start_angle + t * span),
            PathShape::Cubic { c1, c2 } => {
                let mt = 1.0 - t;
                let (a, b, c, d) = (mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t);
                Point::new(
                    a * self.start.x + b * c1.x + c * c2.x + d * self.end.x,
                    a * self.start.y + b * c1.y + c * c2.y + d * self.end.y,
                )
            }
        }
    }

    /// Approximate distance from `point` to the drawn path.
    pub fn distance_to(&self, point: Point) -> f64 {
        let samples: Vec<Point> = (0..=HIT_SAMPLES)
            .map(|i| self.point_at(i as f64 / HIT_SAMPLES as f64))
            .collect();
        samples
            .windows(2)
            .map(|w| point.distance_to_segment(w[0], w[1]))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Builds one connector per step. Fewer than two steps have nothing to connect.
pub fn build(
    circle: &CircleLayout,
    placements: &[Placement],
    settings: &ConnectorSettings,
) -> Vec<ConnectorSegment> {
    let count = placements.len();
    if count < 2 {
        return Vec::new();
    }
    let step = LayoutEngine::angle_step(count);

    placements
        .iter()
        .enumerate()
        .map(|(i, from)| {
            let to = &placements[(i + 1) % count];
            let (lead, tail) = clamp_trims(
                settings.trim.angle(circle, from.size),
                settings.trim.angle(circle, to.size),
                step,
            );
            let start_angle = from.angle + lead;
            let span = step - lead - tail;

            let (start, end, shape) = match settings.mode {
                ConnectorMode::Arc => arc(circle, start_angle, span, settings),
                ConnectorMode::Bezier => cubic(circle, start_angle, span, settings),
            };

            ConnectorSegment {
                index: i,
                from: i,
                to: (i + 1) % count,
                start,
                end,
                shape,
            }
        })
        .collect()
}

fn clamp_trims(lead: f64, tail: f64, step: f64) -> (f64, f64) {
    let total = lead + tail;
    let max_total = step * (1.0 - MIN_SPAN_FRACTION);
    if total > max_total {
        let scale = max_total / total;
        (lead * scale, tail * scale)
    } else {
        (lead, tail)
    }
}

fn arc(
    circle: &CircleLayout,
    start_angle: f64,
    span: f64,
    settings: &ConnectorSettings,
) -> (Point, Point, PathShape) {
    let radius = circle.radius * settings.arc_radius_ratio;
    let start = Point::polar(circle.center, radius, start_angle);
    let end = Point::polar(circle.center, radius, start_angle + span);
    // large-arc follows the trimmed span, not the nominal one
    let shape = PathShape::Arc {
        center: circle.center,
        radius,
        start_angle,
        span,
        large_arc: span > PI,
        sweep: true,
    };
    (start, end, shape)
}

fn cubic(
    circle: &CircleLayout,
    start_angle: f64,
    span: f64,
    settings: &ConnectorSettings,
) -> (Point, Point, PathShape) {
    let start = circle.point_at(start_angle);
    let end = circle.point_at(start_angle + span);
    let control_radius = circle.radius * settings.control_radius_ratio;
    let (f1, f2) = settings.control_fractions;
    let shape = PathShape::Cubic {
        c1: Point::polar(circle.center, control_radius, start_angle + f1 * span),
        c2: Point::polar(circle.center, control_radius, start_angle + f2 * span),
    };
    (start, end, shape)
}

/// Two decimals, trailing zeros dropped, no negative zero.
pub fn format_number(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}
