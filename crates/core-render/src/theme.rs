//! Color themes.
//!
//! Two palettes; everything the style layer needs is a lookup here so the
//! mapping from Markdown styles to attributes stays palette-agnostic.

use crossterm::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn fg(&self) -> Color {
        match self {
            Theme::Dark => Color::Rgb { r: 212, g: 212, b: 212 },
            Theme::Light => Color::Rgb { r: 40, g: 40, b: 40 },
        }
    }

    pub fn bg(&self) -> Color {
        match self {
            Theme::Dark => Color::Rgb { r: 24, g: 24, b: 28 },
            Theme::Light => Color::Rgb { r: 250, g: 250, b: 248 },
        }
    }

    /// Bold brightens to pure white / pure black.
    pub fn bold_fg(&self) -> Color {
        match self {
            Theme::Dark => Color::White,
            Theme::Light => Color::Black,
        }
    }

    pub fn code_bg(&self) -> Color {
        match self {
            Theme::Dark => Color::Rgb { r: 42, g: 42, b: 50 },
            Theme::Light => Color::Rgb { r: 234, g: 234, b: 238 },
        }
    }

    pub fn code_fg(&self) -> Color {
        match self {
            Theme::Dark => Color::Rgb { r: 224, g: 108, b: 134 },
            Theme::Light => Color::Rgb { r: 186, g: 48, b: 76 },
        }
    }

    pub fn mark_bg(&self) -> Color {
        Color::Yellow
    }

    pub fn mark_fg(&self) -> Color {
        match self {
            Theme::Dark => Color::Black,
            Theme::Light => Color::Rgb { r: 56, g: 44, b: 0 },
        }
    }

    /// Header foregrounds used when the backend cannot scale text.
    pub fn header_fallback(&self, level: u8) -> Color {
        match level {
            1 => Color::Red,
            2 => Color::Rgb { r: 255, g: 165, b: 0 },
            3 => Color::Yellow,
            4 => Color::Rgb { r: 50, g: 205, b: 50 },
            5 => Color::Cyan,
            _ => Color::Rgb { r: 120, g: 170, b: 255 },
        }
    }
}
