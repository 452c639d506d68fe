use derive_more::{Deref, From, Into};
use palette::Srgb;
use palette::rgb::FromHexError;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const BASELINE_MARKER: &str = "phasering-arrow";
pub const HIGHLIGHT_MARKER: &str = "phasering-arrow-highlight";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deref, From, Into, SerializeDisplay, DeserializeFromStr,
)]
pub struct HexColor(Srgb<u8>);

#[derive(Error, Debug)]
pub enum ParseColorError {
    #[error("Invalid color '{input}': {source}")]
    Hex {
        input: String,
        #[source]
        source: FromHexError,
    },
}

impl HexColor {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }

    /// Components in `0.0..=1.0`, as cairo expects them.
    pub fn components(&self) -> (f64, f64, f64) {
        self.0.into_format::<f64>().into_components()
    }
}

impl FromStr for HexColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Srgb<u8>>()
            .map(Self)
            .map_err(|source| ParseColorError::Hex {
                input: s.to_string(),
                source,
            })
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            self.0.red, self.0.green, self.0.blue
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemStyle {
    pub fill: HexColor,
    pub text: HexColor,
    pub scale: f64,
    pub highlighted: bool,
}

impl ItemStyle {
    pub fn class(&self) -> &'static str {
        if self.highlighted {
            "item highlighted"
        } else {
            "item"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorStyle {
    pub stroke: HexColor,
    pub width: f64,
    pub marker: &'static str,
    pub highlighted: bool,
}

impl ConnectorStyle {
    pub fn class(&self) -> &'static str {
        if self.highlighted {
            "connector highlighted"
        } else {
            "connector"
        }
    }
}

/// Arrowhead definition. Surfaces with native markers orient it along the path end.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: &'static str,
    pub color: HexColor,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Theme {
    pub item_fill: HexColor,
    pub item_highlight_fill: HexColor,
    pub item_text: HexColor,
    pub item_highlight_scale: f64,
    pub connector_stroke: HexColor,
    pub connector_highlight_stroke: HexColor,
    pub connector_width: f64,
    pub connector_highlight_width: f64,
    pub marker_size: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            item_fill: HexColor::new(0x33, 0x41, 0x55),
            item_highlight_fill: HexColor::new(0x63, 0x66, 0xf1),
            item_text: HexColor::new(0xf8, 0xfa, 0xfc),
            item_highlight_scale: 1.08,
            connector_stroke: HexColor::new(0x94, 0xa3, 0xb8),
            connector_highlight_stroke: HexColor::new(0x63, 0x66, 0xf1),
            connector_width: 2.0,
            connector_highlight_width: 4.0,
            marker_size: 8.0,
        }
    }
}

impl Theme {
    pub fn item_style(&self, highlighted: bool) -> ItemStyle {
        ItemStyle {
            fill: if highlighted {
                self.item_highlight_fill
            } else {
                self.item_fill
            },
            text: self.item_text,
            scale: if highlighted {
                self.item_highlight_scale
            } else {
                1.0
            },
            highlighted,
        }
    }

    pub fn connector_style(&self, highlighted: bool) -> ConnectorStyle {
        if highlighted {
            ConnectorStyle {
                stroke: self.connector_highlight_stroke,
                width: self.connector_highlight_width,
                marker: HIGHLIGHT_MARKER,
                highlighted,
            }
        } else {
            ConnectorStyle {
                stroke: self.connector_stroke,
                width: self.connector_width,
                marker: BASELINE_MARKER,
                highlighted,
            }
        }
    }

    pub fn markers(&self) -> [Marker; 2] {
        [
            Marker {
                id: BASELINE_MARKER,
                color: self.connector_stroke,
                size: self.marker_size,
            },
            Marker {
                id: HIGHLIGHT_MARKER,
                color: self.connector_highlight_stroke,
                size: self.marker_size,
            },
        ]
    }
}
