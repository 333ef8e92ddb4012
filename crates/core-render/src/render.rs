//! Styled source rendering.
//!
//! The editor shows Markdown source with live styling: delimiters stay
//! visible, recognized spans carry their resolved attributes, and logical
//! lines wrap into visual rows at the configured width (header rows wrap
//! at `width / scale` since their glyphs occupy scaled cells).
//!
//! Within a frame, style application always precedes grapheme emission
//! for the run, and the caller reparses before rendering, so the block
//! cache is never stale here.

use crate::output::{OutputCtx, RenderSurface, output_grapheme};
use crate::style::{StyleRun, apply_style, get_scale};
use crate::theme::Theme;
use anyhow::Result;
use core_markdown::inline::{check_delim, find_closing};
use core_markdown::{BlockCache, BlockKind, MdStyle};
use core_terminal::TerminalCapabilities;
use core_text::{GapBuffer, find_wrap_point};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy)]
pub struct RenderOpts {
    /// Text width in cells.
    pub width: usize,
    pub theme: Theme,
    pub caps: TerminalCapabilities,
    /// First visual row to emit (scroll offset).
    pub first_row: usize,
    /// Rows emitted to the surface; 0 means unlimited.
    pub max_rows: usize,
}

impl RenderOpts {
    pub fn new(width: usize, theme: Theme, caps: TerminalCapabilities) -> Self {
        Self {
            width: width.max(4),
            theme,
            caps,
            first_row: 0,
            max_rows: 0,
        }
    }
}

/// Where the frame put things: the cursor's visual position and the row
/// count of the whole document (clipped rows included).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedDoc {
    pub cursor_row: usize,
    pub cursor_col: usize,
    pub total_rows: usize,
}

struct NullSurface;

impl RenderSurface for NullSurface {
    fn set_style(&mut self, _run: &StyleRun) -> Result<()> {
        Ok(())
    }
    fn put(&mut self, _text: &str, _scale: u8, _num: u8, _denom: u8) -> Result<()> {
        Ok(())
    }
    fn end_row(&mut self) -> Result<()> {
        Ok(())
    }
}

struct Emitter<'a> {
    out: &'a mut dyn RenderSurface,
    opts: RenderOpts,
    row: usize,
    col: usize,
    cursor: usize,
    cursor_rc: Option<(usize, usize)>,
}

impl Emitter<'_> {
    fn visible(&self) -> bool {
        self.row >= self.opts.first_row
            && (self.opts.max_rows == 0 || self.row < self.opts.first_row + self.opts.max_rows)
    }

    fn note_cursor_here(&mut self) {
        if self.cursor_rc.is_none() {
            self.cursor_rc = Some((self.row, self.col));
        }
    }

    /// Record the cursor when it sits strictly inside an emitted run
    /// (mid-cluster or mid-replacement); it maps to the run's first cell.
    fn note_cursor_range(&mut self, a: usize, b: usize, col_at_a: usize) {
        if self.cursor_rc.is_none() && a < self.cursor && self.cursor < b {
            self.cursor_rc = Some((self.row, col_at_a));
        }
    }

    fn style(&mut self, style: MdStyle) -> Result<OutputCtx> {
        let run = apply_style(style, self.opts.theme, &self.opts.caps);
        if self.visible() {
            self.out.set_style(&run)?;
        }
        let mut ctx = OutputCtx::new(self.opts.caps);
        ctx.set_scale(run.scale);
        Ok(ctx)
    }

    fn newline(&mut self) -> Result<()> {
        if self.visible() {
            self.out.end_row()?;
        }
        self.row += 1;
        self.col = 0;
        Ok(())
    }

    fn emit_cluster(
        &mut self,
        buf: &GapBuffer,
        pos: &mut usize,
        style: MdStyle,
        ctx: &OutputCtx,
    ) -> Result<()> {
        let cells = if self.visible() {
            output_grapheme(buf, pos, style, ctx, self.out)?
        } else {
            output_grapheme(buf, pos, style, ctx, &mut NullSurface)?
        };
        self.col += cells as usize;
        Ok(())
    }

    fn emit_verbatim(&mut self, text: &str, ctx: &OutputCtx) -> Result<()> {
        if self.visible() {
            self.out.put(text, ctx.text_scale, ctx.frac_num, ctx.frac_denom)?;
        }
        self.col += text.width() * ctx.text_scale as usize;
        Ok(())
    }

    /// Render one logical line with wrapping and (optionally) inline
    /// delimiter styling.
    fn render_line(
        &mut self,
        buf: &GapBuffer,
        ls: usize,
        le: usize,
        base: MdStyle,
        inline: bool,
    ) -> Result<()> {
        let scale = get_scale(base) as usize;
        let budget = (self.opts.width / scale).max(4);
        let mut style = base;
        let mut ctx = self.style(style)?;
        let mut closers: Vec<(usize, MdStyle, usize)> = Vec::new();
        let mut split = find_wrap_point(buf, ls, le, budget).0;
        let mut p = ls;
        while p < le {
            if p >= split {
                self.newline()?;
                while p < le && buf.at(p) == b' ' {
                    if p == self.cursor {
                        self.note_cursor_here();
                    }
                    p += 1;
                }
                if p >= le {
                    break;
                }
                split = find_wrap_point(buf, p, le, budget).0;
                ctx = self.style(style)?;
            }
            if p == self.cursor {
                self.note_cursor_here();
            }
            if let Some(idx) = closers.iter().rposition(|&(off, _, _)| off == p) {
                let (_, s, d) = closers.remove(idx);
                let text = buf.slice_string(p, p + d);
                let col_before = self.col;
                self.emit_verbatim(&text, &ctx)?;
                self.note_cursor_range(p, p + d, col_before);
                p += d;
                style.remove(s & !base);
                ctx = self.style(style)?;
                continue;
            }
            if inline
                && !style.contains(MdStyle::CODE)
                && let Some((s, d)) = check_delim(buf, p)
                && !style.intersects(s)
                && let Some(close) = find_closing(buf, p, s, d, le)
            {
                style.insert(s);
                ctx = self.style(style)?;
                let text = buf.slice_string(p, p + d);
                let col_before = self.col;
                self.emit_verbatim(&text, &ctx)?;
                self.note_cursor_range(p, p + d, col_before);
                closers.push((close, s, d));
                p += d;
                continue;
            }
            let effective = if inline { style } else { base };
            let run_start = p;
            let col_before = self.col;
            self.emit_cluster(buf, &mut p, effective, &ctx)?;
            self.note_cursor_range(run_start, p, col_before);
        }
        if le == self.cursor {
            self.note_cursor_here();
        }
        self.newline()
    }
}

fn base_style_for(cache: &BlockCache, line_start: usize) -> (MdStyle, bool) {
    match cache.block_at(line_start).map(|b| &b.kind) {
        Some(BlockKind::Header { level, .. }) => (MdStyle::header(*level), true),
        Some(BlockKind::Code { .. }) => (MdStyle::CODE, false),
        Some(BlockKind::Math { .. }) => (MdStyle::empty(), false),
        _ => (MdStyle::empty(), true),
    }
}

/// Render the whole document as styled, wrapped source. Rows outside
/// `[first_row, first_row + max_rows)` are measured but not emitted.
pub fn render_document(
    buf: &GapBuffer,
    cache: &BlockCache,
    cursor: usize,
    opts: &RenderOpts,
    out: &mut dyn RenderSurface,
) -> Result<RenderedDoc> {
    let mut em = Emitter {
        out,
        opts: *opts,
        row: 0,
        col: 0,
        cursor: cursor.min(buf.len()),
        cursor_rc: None,
    };
    let mut pos = 0;
    while pos < buf.len() {
        let le = buf.line_end(pos);
        let (base, inline) = base_style_for(cache, pos);
        em.render_line(buf, pos, le, base, inline)?;
        if le >= buf.len() {
            break;
        }
        pos = le + 1;
    }
    let total_rows = em.row;
    if em.cursor_rc.is_none() {
        // Cursor past the final newline: an implicit empty last row.
        em.cursor_rc = Some((total_rows, 0));
    }
    let (cursor_row, cursor_col) = em.cursor_rc.unwrap();
    Ok(RenderedDoc {
        cursor_row,
        cursor_col,
        total_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RecordingSurface;

    fn render(src: &str, cursor: usize, width: usize) -> (RecordingSurface, RenderedDoc) {
        let buf = GapBuffer::from_str(src);
        let cache = BlockCache::from_buffer(&buf);
        let opts = RenderOpts::new(width, Theme::Dark, TerminalCapabilities::full());
        let mut out = RecordingSurface::new();
        let rd = render_document(&buf, &cache, cursor, &opts, &mut out).unwrap();
        (out, rd)
    }

    #[test]
    fn header_rows_emit_scaled_text() {
        let (out, rd) = render("# Big\n\nplain\n", 0, 40);
        assert!(out.puts.iter().any(|(t, s, ..)| t == "B" && *s == 2));
        assert!(out.puts.iter().any(|(t, s, ..)| t == "p" && *s == 1));
        assert_eq!(rd.total_rows, 3);
    }

    #[test]
    fn cursor_maps_to_row_and_scaled_col() {
        // Cursor on 'g' of "# Big": four doubled glyphs precede it.
        let (_, rd) = render("# Big\nx\n", 4, 40);
        assert_eq!(rd.cursor_row, 0);
        assert_eq!(rd.cursor_col, 8); // "# Bi" is 4 glyphs x 2 cells each
    }

    #[test]
    fn wrapped_paragraph_counts_rows() {
        let (out, rd) = render("alpha beta gamma delta\n", 0, 10);
        // "alpha beta" / "gamma " / "delta" on a 10-cell budget.
        assert_eq!(rd.total_rows, 3);
        assert_eq!(out.rows, 3);
    }

    #[test]
    fn bold_span_toggles_style_runs() {
        let (out, _) = render("a **b** c\n", 0, 40);
        assert_eq!(out.text(), "a **b** c");
        let bold_runs = out.styles.iter().filter(|r| r.bold).count();
        assert!(bold_runs >= 1);
    }

    #[test]
    fn code_block_suppresses_typographic() {
        let (out, _) = render("```\na---b\n```\n", 0, 40);
        assert!(out.text().contains("a---b"));
        assert!(!out.text().contains("\u{2014}"));
    }

    #[test]
    fn paragraph_applies_typographic() {
        let (out, _) = render("a --- b\n", 0, 40);
        assert!(out.text().contains('\u{2014}'));
    }

    #[test]
    fn clipping_skips_rows_but_keeps_geometry() {
        let src = "one\ntwo\nthree\nfour\n";
        let buf = GapBuffer::from_str(src);
        let cache = BlockCache::from_buffer(&buf);
        let mut opts = RenderOpts::new(40, Theme::Dark, TerminalCapabilities::none());
        opts.first_row = 1;
        opts.max_rows = 2;
        let mut out = RecordingSurface::new();
        let rd = render_document(&buf, &cache, src.find("three").unwrap(), &opts, &mut out).unwrap();
        assert_eq!(rd.total_rows, 4);
        assert_eq!(rd.cursor_row, 2);
        assert_eq!(out.rows, 2); // only the visible window hit the surface
        assert_eq!(out.text(), "twothree");
    }

    #[test]
    fn cursor_past_trailing_newline_lands_on_implicit_row() {
        let (_, rd) = render("abc\n", 4, 40);
        assert_eq!((rd.cursor_row, rd.cursor_col), (1, 0));
    }
}
