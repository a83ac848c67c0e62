//! Stretch, style and weight attributes (made by FontLab https://www.fontlab.com/)
//!
//! The numeric codes returned by `code()` are the values written to the cache
//! file, so their order must never change.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// Width axis, ultra-condensed to ultra-expanded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FontStretch {
    #[default]
    Normal,
    UltraCondensed,
    ExtraCondensed,
    Condensed,
    SemiCondensed,
    SemiExpanded,
    Expanded,
    ExtraExpanded,
    UltraExpanded,
}

impl FontStretch {
    pub const ALL: [Self; 9] = [
        Self::Normal,
        Self::UltraCondensed,
        Self::ExtraCondensed,
        Self::Condensed,
        Self::SemiCondensed,
        Self::SemiExpanded,
        Self::Expanded,
        Self::ExtraExpanded,
        Self::UltraExpanded,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// OS/2 `usWidthClass` equivalent: 1 (ultra-condensed) to 9 (ultra-expanded).
    pub fn width_class(self) -> u16 {
        match self {
            Self::UltraCondensed => 1,
            Self::ExtraCondensed => 2,
            Self::Condensed => 3,
            Self::SemiCondensed => 4,
            Self::Normal => 5,
            Self::SemiExpanded => 6,
            Self::Expanded => 7,
            Self::ExtraExpanded => 8,
            Self::UltraExpanded => 9,
        }
    }

    /// Map an OS/2 width class; anything outside 1..=9 is treated as normal.
    pub fn from_width_class(class: u16) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.width_class() == class)
            .unwrap_or_default()
    }

    /// Distance along the visual width order.
    pub fn distance(self, other: Self) -> u32 {
        u32::from(self.width_class().abs_diff(other.width_class()))
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::UltraCondensed => "ultra-condensed",
            Self::ExtraCondensed => "extra-condensed",
            Self::Condensed => "condensed",
            Self::SemiCondensed => "semi-condensed",
            Self::SemiExpanded => "semi-expanded",
            Self::Expanded => "expanded",
            Self::ExtraExpanded => "extra-expanded",
            Self::UltraExpanded => "ultra-expanded",
        }
    }
}

/// Slant axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub const ALL: [Self; 3] = [Self::Normal, Self::Italic, Self::Oblique];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Italic and oblique are interchangeable for matching purposes.
    pub fn is_slanted(self) -> bool {
        self != Self::Normal
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
            Self::Oblique => "oblique",
        }
    }
}

/// Boldness axis in steps of 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u16)]
pub enum FontWeight {
    Thin = 100,
    ExtraLight = 200,
    Light = 300,
    #[default]
    Normal = 400,
    Medium = 500,
    SemiBold = 600,
    Bold = 700,
    ExtraBold = 800,
    Black = 900,
}

impl FontWeight {
    pub const ALL: [Self; 9] = [
        Self::Thin,
        Self::ExtraLight,
        Self::Light,
        Self::Normal,
        Self::Medium,
        Self::SemiBold,
        Self::Bold,
        Self::ExtraBold,
        Self::Black,
    ];

    pub fn value(self) -> u16 {
        self as u16
    }

    /// Exact lookup; only multiples of 100 in 100..=900 are accepted.
    pub fn from_value(value: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.value() == value)
    }

    /// Round an arbitrary weight class to the nearest named weight.
    pub fn nearest(raw: f32) -> Self {
        if !raw.is_finite() {
            return Self::Normal;
        }
        let step = (raw / 100.0).round().clamp(1.0, 9.0) as u16;
        Self::from_value(step * 100).unwrap_or_default()
    }

    pub fn distance(self, other: Self) -> u32 {
        u32::from(self.value().abs_diff(other.value()))
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Thin => "thin",
            Self::ExtraLight => "extra-light",
            Self::Light => "light",
            Self::Normal => "normal",
            Self::Medium => "medium",
            Self::SemiBold => "semi-bold",
            Self::Bold => "bold",
            Self::ExtraBold => "extra-bold",
            Self::Black => "black",
        }
    }
}

impl fmt::Display for FontStretch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl FromStr for FontStretch {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.keyword() == wanted)
            .ok_or_else(|| anyhow!("unknown stretch: {raw}"))
    }
}

impl FromStr for FontStyle {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.keyword() == wanted)
            .ok_or_else(|| anyhow!("unknown style: {raw}"))
    }
}

impl FromStr for FontWeight {
    type Err = Error;

    /// Accepts either a numeric weight (`700`) or a keyword (`bold`).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        if let Ok(value) = wanted.parse::<u16>() {
            return Self::from_value(value)
                .ok_or_else(|| anyhow!("weight must be a multiple of 100 in 100..=900: {raw}"));
        }
        Self::ALL
            .into_iter()
            .find(|w| w.keyword() == wanted)
            .ok_or_else(|| anyhow!("unknown weight: {raw}"))
    }
}
