//! Stroke attributes shared by layers and drawables: true color, line
//! weight class and named line type.

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 24-bit true color packed as `(r << 16) + (g << 8) + b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RgbColor(u32);

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor(0);
    pub const WHITE: RgbColor = RgbColor(0xFF_FF_FF);

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) + ((g as u32) << 8) + b as u32)
    }

    /// Build from a packed integer; bits above 24 are discarded.
    pub fn from_packed(value: u32) -> Self {
        Self(value & 0xFF_FF_FF)
    }

    pub fn packed(self) -> u32 {
        self.0
    }

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(self) -> u8 {
        self.0 as u8
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<RgbColor> for Color {
    fn from(c: RgbColor) -> Self {
        Color::from_rgba8(c.r(), c.g(), c.b(), 255)
    }
}

impl From<Color> for RgbColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::from_rgb(rgba.r, rgba.g, rgba.b)
    }
}

/// Interchange line weights, in hundredths of a millimetre, indexed by
/// weight class.
pub const LINEWEIGHTS: [i16; 23] = [
    0, 5, 9, 13, 15, 18, 20, 25, 30, 35, 40, 50, 53, 60, 70, 80, 90, 100, 106, 120, 140, 158, 200,
];

/// A line weight class: an index into [`LINEWEIGHTS`].
///
/// The class doubles as the on-screen stroke width in pixels at zoom 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineWeight(u8);

impl LineWeight {
    pub const DEFAULT: LineWeight = LineWeight(2);

    /// Weight class, clamped into the table.
    pub fn new(class: u8) -> Self {
        Self(class.min((LINEWEIGHTS.len() - 1) as u8))
    }

    pub fn class(self) -> u8 {
        self.0
    }

    /// Stroke width in world units.
    pub fn width(self) -> f64 {
        self.0 as f64
    }

    /// Interchange value for this class.
    pub fn to_interchange(self) -> i16 {
        LINEWEIGHTS[self.0 as usize]
    }

    /// Class for an interchange value.
    ///
    /// Exact table entries map back to their own position. Values between
    /// entries pick the nearest one (lower on ties). Negative values are
    /// the "by layer / by block / default" sentinels and map to the default.
    pub fn from_interchange(value: i16) -> Self {
        if value < 0 {
            return Self::DEFAULT;
        }
        let index = LINEWEIGHTS
            .iter()
            .enumerate()
            .min_by_key(|&(_, &w)| (w - value).unsigned_abs())
            .map(|(i, _)| i)
            .unwrap_or(Self::DEFAULT.0 as usize);
        Self(index as u8)
    }
}

impl Default for LineWeight {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Named dash patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineType {
    #[default]
    Continuous,
    Dashed,
    DashedLarge,
    Dotted,
    DottedLarge,
    DashDot,
    DashDotLarge,
    DashDotDot,
    DashDotDotLarge,
}

impl LineType {
    pub const ALL: [LineType; 9] = [
        LineType::Continuous,
        LineType::Dashed,
        LineType::DashedLarge,
        LineType::Dotted,
        LineType::DottedLarge,
        LineType::DashDot,
        LineType::DashDotLarge,
        LineType::DashDotDot,
        LineType::DashDotDotLarge,
    ];

    /// Alternating on/off lengths; empty for a solid stroke.
    pub fn dash_pattern(self) -> &'static [f64] {
        match self {
            LineType::Continuous => &[],
            LineType::Dashed => &[10.0, 10.0],
            LineType::DashedLarge => &[20.0, 10.0],
            LineType::Dotted => &[1.0, 10.0],
            LineType::DottedLarge => &[1.0, 20.0],
            LineType::DashDot => &[10.0, 5.0, 1.0, 5.0],
            LineType::DashDotLarge => &[20.0, 10.0, 1.0, 10.0],
            LineType::DashDotDot => &[10.0, 5.0, 1.0, 5.0, 1.0, 5.0],
            LineType::DashDotDotLarge => &[20.0, 10.0, 1.0, 10.0, 1.0, 10.0],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LineType::Continuous => "Continuous",
            LineType::Dashed => "Dashed",
            LineType::DashedLarge => "DashedLarge",
            LineType::Dotted => "Dotted",
            LineType::DottedLarge => "DottedLarge",
            LineType::DashDot => "DashDot",
            LineType::DashDotLarge => "DashDotLarge",
            LineType::DashDotDot => "DashDotDot",
            LineType::DashDotDotLarge => "DashDotDotLarge",
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a line type name is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown line type: {0}")]
pub struct UnknownLineType(pub String);

impl FromStr for LineType {
    type Err = UnknownLineType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LineType::ALL
            .into_iter()
            .find(|lt| lt.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownLineType(s.to_string()))
    }
}

/// Per-drawable overrides of the owning layer's stroke. `None` means
/// "by layer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StrokeOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<RgbColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<LineWeight>,
}

impl StrokeOverride {
    pub fn is_by_layer(&self) -> bool {
        self.color.is_none() && self.weight.is_none()
    }
}
