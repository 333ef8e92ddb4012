//! Markdown style to render attribute resolution.
//!
//! `apply_style` is the single mapping from an `MdStyle` bit-set to the
//! concrete attributes a frame emits: colors, flags, and the glyph scale
//! regime. Precedence within the run:
//! 1. Reset to the theme's base foreground/background.
//! 2. Headers set the scale regime and bold; without text-scaling support
//!    the level picks a fallback foreground instead.
//! 3. Mark then Code override the background (and Code the foreground).
//! 4. Bold brightens, Sub/Sup dim, the rest map to backend attributes.

use crate::theme::Theme;
use core_markdown::MdStyle;
use core_terminal::TerminalCapabilities;
use crossterm::style::Color;

/// Glyph scale regime: integer scale 1..=7 plus an optional fractional
/// `num/denom` refinement (`denom > num >= 0`; zeros mean none).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FracScale {
    pub scale: u8,
    pub num: u8,
    pub denom: u8,
}

impl FracScale {
    pub const UNSCALED: FracScale = FracScale { scale: 1, num: 0, denom: 0 };

    pub fn new(scale: u8, num: u8, denom: u8) -> Self {
        debug_assert!((1..=7).contains(&scale));
        debug_assert!(denom == 0 || denom > num);
        Self { scale, num, denom }
    }

    pub fn is_scaled(&self) -> bool {
        self.scale > 1 || self.denom > 0
    }
}

/// Resolved attributes for a run of graphemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRun {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub dim: bool,
    pub scale: FracScale,
}

/// Scale regime for a header level: H1 doubles, H2 and H3 refine the
/// doubled glyph by 3/4 and 5/8, H4..H6 stay at cell size.
pub fn header_scale(level: u8) -> FracScale {
    match level {
        1 => FracScale::new(2, 0, 0),
        2 => FracScale::new(2, 3, 4),
        3 => FracScale::new(2, 5, 8),
        _ => FracScale::UNSCALED,
    }
}

/// Integer cell scale used for layout math (horizontal occupancy).
pub fn get_scale(style: MdStyle) -> u8 {
    match style.header_level() {
        Some(1..=3) => 2,
        _ => 1,
    }
}

/// Resolve `style` into concrete attributes for the coming run.
pub fn apply_style(style: MdStyle, theme: Theme, caps: &TerminalCapabilities) -> StyleRun {
    let mut run = StyleRun {
        fg: theme.fg(),
        bg: theme.bg(),
        bold: false,
        italic: false,
        underline: false,
        strike: false,
        dim: false,
        scale: FracScale::UNSCALED,
    };
    if let Some(level) = style.header_level() {
        run.bold = true;
        if caps.supports_text_scaling {
            run.scale = header_scale(level);
        } else {
            run.fg = theme.header_fallback(level);
        }
    }
    if style.contains(MdStyle::MARK) {
        run.bg = theme.mark_bg();
        run.fg = theme.mark_fg();
    }
    if style.contains(MdStyle::CODE) {
        run.bg = theme.code_bg();
        run.fg = theme.code_fg();
    }
    if style.contains(MdStyle::BOLD) {
        run.bold = true;
        run.fg = theme.bold_fg();
    }
    run.italic = style.contains(MdStyle::ITALIC);
    run.underline = style.contains(MdStyle::UNDERLINE);
    run.strike = style.contains(MdStyle::STRIKE);
    run.dim = style.intersects(MdStyle::SUB | MdStyle::SUP);
    run
}
