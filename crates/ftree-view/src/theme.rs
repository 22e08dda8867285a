#![forbid(unsafe_code)]

//! Color palettes.
//!
//! A theme only changes colors. Geometry, spacing, and stroke widths are the
//! same in every theme, so switching themes never moves a node.

use std::fmt;

/// A compact RGBA color, `0xRRGGBBAA`, straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const TRANSPARENT: Self = Self(0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Multiply alpha by `opacity` (clamped to [0, 1]).
    #[must_use]
    pub fn with_opacity(self, opacity: f64) -> Self {
        let alpha = (f64::from(self.a()) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self::rgba(self.r(), self.g(), self.b(), alpha)
    }

    /// Parse `#rgb`, `#rrggbb`, or `#rrggbbaa`.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(
                nibble(0)? * 17,
                nibble(1)? * 17,
                nibble(2)? * 17,
            )),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }
}

impl fmt::Display for Rgba {
    /// `#rrggbb` when opaque, `#rrggbbaa` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a() == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
        } else {
            write!(f, "#{:08x}", self.0)
        }
    }
}

/// Light or dark color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// Resolve to concrete colors.
    pub const fn palette(self) -> Palette {
        match self {
            Self::Light => Palette::LIGHT,
            Self::Dark => Palette::DARK,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba,
    pub link: Rgba,
    pub node_fill: Rgba,
    pub node_stroke: Rgba,
    pub text: Rgba,
    pub toggle: Rgba,
    pub indicator: Rgba,
    pub tooltip_background: Rgba,
    pub tooltip_border: Rgba,
    pub tooltip_text: Rgba,
}

impl Palette {
    pub const LIGHT: Self = Self {
        background: Rgba::WHITE,
        link: Rgba::rgb(0x6b, 0x72, 0x80),
        node_fill: Rgba::rgb(0xcc, 0xcc, 0xcc),
        node_stroke: Rgba::rgb(0x2b, 0x6c, 0xb0),
        text: Rgba::BLACK,
        toggle: Rgba::rgb(0x00, 0x77, 0xff),
        indicator: Rgba::rgb(0xff, 0x99, 0x00),
        tooltip_background: Rgba::WHITE,
        tooltip_border: Rgba::rgb(0xd1, 0xd5, 0xdb),
        tooltip_text: Rgba::rgb(0x11, 0x18, 0x27),
    };

    pub const DARK: Self = Self {
        background: Rgba::rgb(0x1e, 0x1e, 0x1e),
        link: Rgba::rgb(0x9c, 0xa3, 0xaf),
        node_fill: Rgba::rgb(0x37, 0x41, 0x51),
        node_stroke: Rgba::rgb(0x60, 0xa5, 0xfa),
        text: Rgba::rgb(0xf3, 0xf4, 0xf6),
        toggle: Rgba::rgb(0x3b, 0x9e, 0xff),
        indicator: Rgba::rgb(0xff, 0x99, 0x00),
        tooltip_background: Rgba::rgb(0x1f, 0x29, 0x37),
        tooltip_border: Rgba::rgb(0x4b, 0x55, 0x63),
        tooltip_text: Rgba::rgb(0xe5, 0xe7, 0xeb),
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::LIGHT
    }
}
