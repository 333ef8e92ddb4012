//! Typed block cache over the whole document.
//!
//! `recognize_at` is the single entry point turning a line start into a
//! `Block`; precedence between block forms is encoded by its match order
//! and nothing else. The cache keeps blocks ordered by span start.
//!
//! Invariants:
//! - Blocks cover every non-blank line region exactly once and never
//!   overlap; consecutive blocks satisfy `a.span.end() <= b.span.start`.
//! - Block spans include the trailing newline of their last line (when one
//!   exists), so a span end is always a line boundary.
//! - Parsing is total: when nothing else matches, the paragraph branch
//!   consumes the line, so `recognize_at` never fails.
//!
//! Incremental reparse widens the edit to blank-line boundaries and
//! splices the window. Fenced code and block math may span blank lines and
//! their closers act at a distance, so any edit touching one of those
//! blocks, or introducing a fence/math opener, falls back to the full
//! rebuild that is always correct.

use crate::block::{self, ListKind};
use crate::table::{self, TableShape};
use crate::{ImageAttrs, Span, inline};
use core_text::GapBuffer;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Header { level: u8, content: Span },
    Code { lang: Span, content: Span },
    Math { content: Span },
    Table(TableShape),
    Image(ImageAttrs),
    Rule,
    Blockquote { level: usize },
    ListItem { kind: ListKind, indent: usize, content_start: usize },
    FootnoteDef { id: Span, content: Span },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub span: Span,
}

impl Block {
    /// Navigation treats these as single units.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self.kind,
            BlockKind::Code { .. } | BlockKind::Table(_) | BlockKind::Image(_)
        )
    }

    fn shift(&mut self, delta: isize) {
        let move_span = |s: &mut Span| s.start = (s.start as isize + delta) as usize;
        move_span(&mut self.span);
        match &mut self.kind {
            BlockKind::Header { content, .. } => move_span(content),
            BlockKind::Code { lang, content } => {
                move_span(lang);
                move_span(content);
            }
            BlockKind::Math { content } => move_span(content),
            BlockKind::Image(attrs) => {
                move_span(&mut attrs.alt);
                move_span(&mut attrs.path);
                if let Some(t) = &mut attrs.title {
                    move_span(t);
                }
            }
            BlockKind::ListItem { content_start, .. } => {
                *content_start = (*content_start as isize + delta) as usize;
            }
            BlockKind::FootnoteDef { id, content } => {
                move_span(id);
                move_span(content);
            }
            BlockKind::Paragraph
            | BlockKind::Table(_)
            | BlockKind::Rule
            | BlockKind::Blockquote { .. } => {}
        }
    }
}

/// Offset past the line containing `pos`, stepping over its newline.
fn advance_line(buf: &GapBuffer, pos: usize) -> usize {
    let le = buf.line_end(pos);
    if le < buf.len() { le + 1 } else { le }
}

/// Span from `pos` through the end of the line containing `to_line`,
/// newline included.
fn span_through_line(buf: &GapBuffer, pos: usize, to_line: usize) -> Span {
    Span::from_range(pos, advance_line(buf, to_line))
}

fn trim_trailing_ws(buf: &GapBuffer, start: usize, mut end: usize) -> Span {
    while end > start && matches!(buf.at(end - 1), b' ' | b'\t') {
        end -= 1;
    }
    Span::from_range(start, end)
}

/// A line holding nothing but an image (plus surrounding spaces).
fn standalone_image(buf: &GapBuffer, pos: usize) -> Option<ImageAttrs> {
    let le = buf.line_end(pos);
    let mut i = pos;
    while i < le && buf.at(i) == b' ' {
        i += 1;
    }
    let attrs = inline::check_image(buf, i)?;
    let mut j = i + attrs.total_len;
    while j < le && buf.at(j) == b' ' {
        j += 1;
    }
    (j >= le).then_some(attrs)
}

fn footnote_definition(buf: &GapBuffer, pos: usize) -> Option<(Span, Span)> {
    let fr = inline::check_footnote(buf, pos)?;
    if !fr.is_definition {
        return None;
    }
    let mut content_start = pos + fr.total_len;
    if buf.get(content_start) == Some(b' ') {
        content_start += 1;
    }
    Some((fr.id, Span::from_range(content_start, buf.line_end(pos))))
}

/// True when the line at `pos` would start a non-paragraph block and so
/// terminates a running paragraph.
fn interrupts_paragraph(buf: &GapBuffer, pos: usize) -> bool {
    block::check_header(buf, pos).is_some()
        || block::check_hr(buf, pos).is_some()
        || block::check_blockquote(buf, pos).is_some()
        || block::check_task(buf, pos).is_some()
        || block::check_list_item(buf, pos).is_some()
        || block::check_code_block(buf, pos).is_some()
        || block::check_block_math(buf, pos).is_some()
        || table::check_table(buf, pos).is_some()
        || standalone_image(buf, pos).is_some()
        || footnote_definition(buf, pos).is_some()
}

fn paragraph_block(buf: &GapBuffer, pos: usize) -> Block {
    let first_le = buf.line_end(pos);
    // A single paragraph line followed by a setext underline promotes to a
    // header spanning both lines.
    if first_le < buf.len() {
        let underline = first_le + 1;
        if underline < buf.len()
            && !block::is_blank_line(buf, underline)
            && let Some((level, line_len)) = block::check_setext(buf, underline)
        {
            return Block {
                kind: BlockKind::Header {
                    level,
                    content: trim_trailing_ws(buf, pos, first_le),
                },
                span: Span::from_range(pos, underline + line_len),
            };
        }
    }
    let mut end = advance_line(buf, pos);
    while end < buf.len() && !block::is_blank_line(buf, end) && !interrupts_paragraph(buf, end) {
        end = advance_line(buf, end);
    }
    Block {
        kind: BlockKind::Paragraph,
        span: Span::from_range(pos, end),
    }
}

/// Recognize the block starting at the line start `pos`. Total: the
/// paragraph branch always applies when nothing more specific does.
pub fn recognize_at(buf: &GapBuffer, pos: usize) -> Block {
    if let Some(m) = block::check_code_block(buf, pos) {
        return Block {
            kind: BlockKind::Code { lang: m.lang, content: m.content },
            span: Span::new(pos, m.total_len),
        };
    }
    if let Some(m) = block::check_block_math(buf, pos) {
        return Block {
            kind: BlockKind::Math { content: m.span },
            span: span_through_line(buf, pos, pos + m.total_len - 1),
        };
    }
    if let Some(shape) = table::check_table(buf, pos) {
        return Block {
            kind: BlockKind::Table(shape),
            span: Span::new(pos, shape.total_len),
        };
    }
    if let Some(attrs) = standalone_image(buf, pos) {
        return Block {
            kind: BlockKind::Image(attrs),
            span: span_through_line(buf, pos, pos),
        };
    }
    if let Some((level, content_start)) = block::header_content(buf, pos) {
        return Block {
            kind: BlockKind::Header {
                level,
                content: trim_trailing_ws(buf, content_start, buf.line_end(pos)),
            },
            span: span_through_line(buf, pos, pos),
        };
    }
    if block::check_hr(buf, pos).is_some() {
        return Block {
            kind: BlockKind::Rule,
            span: span_through_line(buf, pos, pos),
        };
    }
    if let Some((level, _)) = block::check_blockquote(buf, pos) {
        let mut end = advance_line(buf, pos);
        while end < buf.len()
            && !block::is_blank_line(buf, end)
            && block::check_blockquote(buf, end).is_some()
        {
            end = advance_line(buf, end);
        }
        return Block {
            kind: BlockKind::Blockquote { level },
            span: Span::from_range(pos, end),
        };
    }
    if let Some((checked, content_start)) = block::check_task(buf, pos) {
        let indent = (pos..content_start)
            .take_while(|&i| buf.at(i) == b' ')
            .count();
        return Block {
            kind: BlockKind::ListItem {
                kind: if checked { ListKind::TaskChecked } else { ListKind::TaskUnchecked },
                indent,
                content_start,
            },
            span: span_through_line(buf, pos, pos),
        };
    }
    if let Some(marker) = block::check_list_item(buf, pos) {
        return Block {
            kind: BlockKind::ListItem {
                kind: marker.kind,
                indent: marker.indent,
                content_start: marker.content_start,
            },
            span: span_through_line(buf, pos, pos),
        };
    }
    if let Some((id, content)) = footnote_definition(buf, pos) {
        return Block {
            kind: BlockKind::FootnoteDef { id, content },
            span: span_through_line(buf, pos, pos),
        };
    }
    paragraph_block(buf, pos)
}

fn parse_region(buf: &GapBuffer, lo: usize, hi: usize, out: &mut Vec<Block>) {
    let mut pos = lo;
    while pos < hi {
        if block::is_blank_line(buf, pos) {
            pos = advance_line(buf, pos).max(pos + 1);
            continue;
        }
        let blk = recognize_at(buf, pos);
        let end = blk.span.end();
        debug_assert!(end <= hi, "block escaped its parse window");
        out.push(blk);
        pos = end.max(pos + 1);
    }
}

/// Start of the blank-line-delimited region containing `p`.
fn region_start(buf: &GapBuffer, p: usize) -> usize {
    let mut ls = buf.line_start(p.min(buf.len()));
    while ls > 0 {
        let prev = buf.line_start(ls - 1);
        if block::is_blank_line(buf, prev) {
            break;
        }
        ls = prev;
    }
    ls
}

/// First blank-line start at or after `p`'s region, or the document end.
/// Never returns less than `p`.
fn region_end(buf: &GapBuffer, p: usize) -> usize {
    let p = p.min(buf.len());
    let mut pos = buf.line_start(p);
    loop {
        if pos >= buf.len() {
            return buf.len();
        }
        if pos >= p && block::is_blank_line(buf, pos) {
            return pos;
        }
        let le = buf.line_end(pos);
        if le >= buf.len() {
            return buf.len();
        }
        pos = le + 1;
    }
}

/// Does `[lo, hi)` contain a line opening a fence or block math?
fn window_has_verbatim_opener(buf: &GapBuffer, lo: usize, hi: usize) -> bool {
    let mut pos = lo;
    while pos < hi {
        let mut i = pos;
        let mut cols = 0;
        while matches!(buf.get(i), Some(b' ')) && cols < 3 {
            i += 1;
            cols += 1;
        }
        if buf.starts_with(i, b"```") || buf.starts_with(i, b"$$") || buf.starts_with(i, b"\\[")
        {
            return true;
        }
        pos = advance_line(buf, pos).max(pos + 1);
    }
    false
}

/// Ordered, typed parse of the document into top-level blocks.
#[derive(Debug, Clone, Default)]
pub struct BlockCache {
    blocks: Vec<Block>,
}

impl BlockCache {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    pub fn from_buffer(buf: &GapBuffer) -> Self {
        let mut cache = Self::new();
        cache.rebuild(buf);
        cache
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Block whose span contains `pos`, if any.
    pub fn block_at(&self, pos: usize) -> Option<&Block> {
        let idx = self.blocks.partition_point(|b| b.span.end() <= pos);
        self.blocks.get(idx).filter(|b| b.span.contains(pos))
    }

    /// Full reparse of the whole document.
    pub fn rebuild(&mut self, buf: &GapBuffer) {
        self.blocks.clear();
        parse_region(buf, 0, buf.len(), &mut self.blocks);
        debug!(target: "markdown.cache", blocks = self.blocks.len(), bytes = buf.len(), "rebuild");
    }

    /// Patch the cache after an edit of `removed_len` bytes replaced by
    /// `inserted_len` bytes at `at`. `buf` is the post-edit document.
    pub fn apply_edit(
        &mut self,
        buf: &GapBuffer,
        at: usize,
        removed_len: usize,
        inserted_len: usize,
    ) {
        let delta = inserted_len as isize - removed_len as isize;
        let old_end = at + removed_len;
        let touches_verbatim = self.blocks.iter().any(|b| {
            matches!(b.kind, BlockKind::Code { .. } | BlockKind::Math { .. })
                && b.span.start <= old_end
                && at <= b.span.end()
        });
        if touches_verbatim {
            debug!(target: "markdown.cache", at, removed_len, inserted_len, "full_reparse_verbatim_block");
            self.rebuild(buf);
            return;
        }
        let mut lo = region_start(buf, at);
        let mut hi = region_end(buf, at + inserted_len);
        // Widen until every old block overlapping the window lies inside it.
        loop {
            let hi_old = (hi as isize - delta).max(0) as usize;
            let mut ext_lo = lo;
            let mut ext_hi_old = hi_old;
            for b in &self.blocks {
                if b.span.start < hi_old && b.span.end() > lo {
                    ext_lo = ext_lo.min(b.span.start);
                    ext_hi_old = ext_hi_old.max(b.span.end());
                }
            }
            if ext_lo < lo || ext_hi_old > hi_old {
                lo = ext_lo.min(lo);
                hi = region_end(buf, (ext_hi_old as isize + delta).max(0) as usize);
            } else {
                break;
            }
        }
        // The check runs on the widened window: a dragged-in fence or math
        // opener would hunt for its closer past `hi`.
        if window_has_verbatim_opener(buf, lo, hi) {
            debug!(target: "markdown.cache", at, lo, hi, "full_reparse_verbatim_opener");
            self.rebuild(buf);
            return;
        }
        let hi_old = (hi as isize - delta).max(0) as usize;

        let mut next: Vec<Block> = Vec::with_capacity(self.blocks.len() + 4);
        next.extend(
            self.blocks
                .iter()
                .take_while(|b| b.span.end() <= lo)
                .cloned(),
        );
        let kept_before = next.len();
        parse_region(buf, lo, hi, &mut next);
        let reparsed = next.len() - kept_before;
        let mut kept_after = 0usize;
        for b in self.blocks.iter().filter(|b| b.span.start >= hi_old) {
            let mut shifted = b.clone();
            shifted.shift(delta);
            next.push(shifted);
            kept_after += 1;
        }
        debug!(
            target: "markdown.cache",
            lo,
            hi,
            reparsed,
            kept = kept_before + kept_after,
            dropped = self.blocks.len() - kept_before - kept_after,
            "window_reparse"
        );
        self.blocks = next;
    }
}
