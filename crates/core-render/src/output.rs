//! Grapheme output driver.
//!
//! `output_grapheme` emits one grapheme cluster (or one typographic
//! replacement) through a `RenderSurface`, threading the ambient scale
//! regime through an explicit `OutputCtx` rather than process globals.
//!
//! Scaling fallback protocol: a backend that lacks fractional support
//! drops `num/denom`; one that lacks sizing entirely drops scaling. The
//! context applies both downgrades once at `set_scale` time so the hot
//! emission path never re-checks capabilities.

use crate::style::{FracScale, StyleRun};
use anyhow::Result;
use core_markdown::typographic;
use core_markdown::MdStyle;
use core_terminal::TerminalCapabilities;
use core_text::{GapBuffer, grapheme_width};
use crossterm::style::{
    Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::queue;
use std::io::Write;
use unicode_width::UnicodeWidthStr;

/// Ambient output state for a render frame.
#[derive(Debug, Clone, Copy)]
pub struct OutputCtx {
    pub text_scale: u8,
    pub frac_num: u8,
    pub frac_denom: u8,
    caps: TerminalCapabilities,
}

impl OutputCtx {
    pub fn new(caps: TerminalCapabilities) -> Self {
        Self {
            text_scale: 1,
            frac_num: 0,
            frac_denom: 0,
            caps,
        }
    }

    pub fn caps(&self) -> &TerminalCapabilities {
        &self.caps
    }

    /// Adopt a scale regime, degrading to what the backend supports.
    pub fn set_scale(&mut self, scale: FracScale) {
        if !self.caps.supports_text_scaling {
            self.text_scale = 1;
            self.frac_num = 0;
            self.frac_denom = 0;
            return;
        }
        self.text_scale = scale.scale.clamp(1, 7);
        if self.caps.supports_fractional_scaling {
            self.frac_num = scale.num;
            self.frac_denom = scale.denom;
        } else {
            self.frac_num = 0;
            self.frac_denom = 0;
        }
    }

    pub fn is_scaled(&self) -> bool {
        self.text_scale > 1 || self.frac_denom > 0
    }
}

/// Sink for styled, possibly scaled text. The driver holds the surface
/// only for the duration of a call; it retains no backend pointers.
pub trait RenderSurface {
    fn set_style(&mut self, run: &StyleRun) -> Result<()>;
    /// Emit `text` at `(scale, num, denom)`; `(1, 0, 0)` is plain text.
    fn put(&mut self, text: &str, scale: u8, num: u8, denom: u8) -> Result<()>;
    /// Terminate the current visual row.
    fn end_row(&mut self) -> Result<()>;
}

/// Emit the grapheme (or typographic replacement) at `*pos`, advancing it
/// past the consumed source bytes. Returns the cells occupied, which is
/// `width x scale` while scaling is active.
pub fn output_grapheme(
    buf: &GapBuffer,
    pos: &mut usize,
    style: MdStyle,
    ctx: &OutputCtx,
    out: &mut dyn RenderSurface,
) -> Result<u16> {
    if *pos >= buf.len() {
        return Ok(0);
    }
    if !style.contains(MdStyle::CODE)
        && let Some((replacement, src_len)) = typographic::check_typographic(buf, *pos)
    {
        out.put(replacement, ctx.text_scale, ctx.frac_num, ctx.frac_denom)?;
        *pos += src_len;
        let cells = replacement.width().max(1) as u16;
        return Ok(cells * u16::from(ctx.text_scale));
    }
    let (cells, next) = grapheme_width(buf, *pos);
    let cluster = buf.slice_string(*pos, next);
    // Control codes occupy one cell and render as a space.
    let printable = if cluster.chars().next().is_some_and(|c| c.is_control()) {
        " "
    } else {
        cluster.as_str()
    };
    out.put(printable, ctx.text_scale, ctx.frac_num, ctx.frac_denom)?;
    *pos = next;
    Ok(cells * u16::from(ctx.text_scale))
}

/// Crossterm-backed surface writing into any `Write` (stdout in the
/// binary, a byte sink in tests).
pub struct TermSurface<W: Write> {
    out: W,
}

impl<W: Write> TermSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSurface for TermSurface<W> {
    fn set_style(&mut self, run: &StyleRun) -> Result<()> {
        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(run.fg),
            SetBackgroundColor(run.bg)
        )?;
        if run.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if run.italic {
            queue!(self.out, SetAttribute(Attribute::Italic))?;
        }
        if run.underline {
            queue!(self.out, SetAttribute(Attribute::Underlined))?;
        }
        if run.strike {
            queue!(self.out, SetAttribute(Attribute::CrossedOut))?;
        }
        if run.dim {
            queue!(self.out, SetAttribute(Attribute::Dim))?;
        }
        Ok(())
    }

    fn put(&mut self, text: &str, scale: u8, num: u8, denom: u8) -> Result<()> {
        if scale > 1 || denom > 0 {
            // Text-sizing protocol: the scaled payload travels with its
            // integer scale and optional fraction.
            write!(self.out, "\x1b]66;s={scale}:n={num}:d={denom};{text}\x1b\\")?;
        } else {
            queue!(self.out, Print(text))?;
        }
        Ok(())
    }

    fn end_row(&mut self) -> Result<()> {
        queue!(
            self.out,
            SetBackgroundColor(Color::Reset),
            Print("\r\n")
        )?;
        Ok(())
    }
}

/// Test double that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub styles: Vec<StyleRun>,
    pub puts: Vec<(String, u8, u8, u8)>,
    pub rows: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.puts.iter().map(|(t, ..)| t.as_str()).collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn set_style(&mut self, run: &StyleRun) -> Result<()> {
        self.styles.push(*run);
        Ok(())
    }

    fn put(&mut self, text: &str, scale: u8, num: u8, denom: u8) -> Result<()> {
        self.puts.push((text.to_string(), scale, num, denom));
        Ok(())
    }

    fn end_row(&mut self) -> Result<()> {
        self.rows += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::header_scale;

    #[test]
    fn typographic_replacement_outside_code() {
        let buf = GapBuffer::from_str("a --- b");
        let ctx = OutputCtx::new(TerminalCapabilities::none());
        let mut out = RecordingSurface::new();
        let mut pos = 2;
        let cells = output_grapheme(&buf, &mut pos, MdStyle::empty(), &ctx, &mut out).unwrap();
        assert_eq!(cells, 1);
        assert_eq!(pos, 5);
        assert_eq!(out.puts[0].0, "\u{2014}");
    }

    #[test]
    fn code_suppresses_replacement() {
        let buf = GapBuffer::from_str("---");
        let ctx = OutputCtx::new(TerminalCapabilities::none());
        let mut out = RecordingSurface::new();
        let mut pos = 0;
        output_grapheme(&buf, &mut pos, MdStyle::CODE, &ctx, &mut out).unwrap();
        assert_eq!(pos, 1);
        assert_eq!(out.puts[0].0, "-");
    }

    #[test]
    fn scaled_emission_carries_the_regime() {
        let buf = GapBuffer::from_str("H");
        let mut ctx = OutputCtx::new(TerminalCapabilities::full());
        ctx.set_scale(header_scale(2));
        let mut out = RecordingSurface::new();
        let mut pos = 0;
        let cells = output_grapheme(&buf, &mut pos, MdStyle::H2, &ctx, &mut out).unwrap();
        assert_eq!(cells, 2); // width 1 x scale 2
        assert_eq!(out.puts[0], ("H".to_string(), 2, 3, 4));
    }

    #[test]
    fn integer_only_backend_drops_fraction() {
        let caps = TerminalCapabilities::new(true, false);
        let mut ctx = OutputCtx::new(caps);
        ctx.set_scale(header_scale(2));
        assert_eq!((ctx.text_scale, ctx.frac_num, ctx.frac_denom), (2, 0, 0));
    }

    #[test]
    fn no_sizing_backend_drops_scaling_entirely() {
        let mut ctx = OutputCtx::new(TerminalCapabilities::none());
        ctx.set_scale(header_scale(1));
        assert_eq!(ctx.text_scale, 1);
        assert!(!ctx.is_scaled());
    }

    #[test]
    fn control_codes_render_as_space() {
        let buf = GapBuffer::from_str("\t");
        let ctx = OutputCtx::new(TerminalCapabilities::none());
        let mut out = RecordingSurface::new();
        let mut pos = 0;
        let cells = output_grapheme(&buf, &mut pos, MdStyle::empty(), &ctx, &mut out).unwrap();
        assert_eq!((cells, pos), (1, 1));
        assert_eq!(out.puts[0].0, " ");
    }

    #[test]
    fn wide_cluster_cells() {
        let buf = GapBuffer::from_str("\u{6f22}");
        let mut ctx = OutputCtx::new(TerminalCapabilities::full());
        ctx.set_scale(header_scale(1));
        let mut out = RecordingSurface::new();
        let mut pos = 0;
        let cells = output_grapheme(&buf, &mut pos, MdStyle::H1, &ctx, &mut out).unwrap();
        assert_eq!(cells, 4); // 2 cells x scale 2
    }
}
