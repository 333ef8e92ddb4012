//! Cursor navigation.
//!
//! These operate purely on a buffer (plus the block cache for the
//! block-aware variants) and are free of editor state; `apply_motion`
//! wires them to the sticky column and selection. Every function returns
//! a valid byte offset, possibly equal to its input.

use core_markdown::BlockCache;
use core_text::{GapBuffer, display_width, find_wrap_point, grapheme_width};

/// Start of the grapheme cluster preceding `pos` (crossing a newline when
/// the cursor sits at a line start).
pub fn prev_grapheme(buf: &GapBuffer, pos: usize) -> usize {
    let pos = pos.min(buf.len());
    if pos == 0 {
        return 0;
    }
    if buf.at(pos - 1) == b'\n' {
        return pos - 1;
    }
    let mut p = buf.line_start(pos);
    loop {
        let (_, next) = grapheme_width(buf, p);
        if next >= pos || next <= p {
            return p;
        }
        p = next;
    }
}

/// Start of the grapheme cluster following `pos`.
pub fn next_grapheme(buf: &GapBuffer, pos: usize) -> usize {
    let pos = pos.min(buf.len());
    if pos >= buf.len() {
        return pos;
    }
    let (_, next) = grapheme_width(buf, pos);
    next.max(pos + 1).min(buf.len())
}

/// Byte offset in `[seg_start, seg_end)` whose accumulated cell width
/// reaches `target` without exceeding it; clamps to `seg_end`.
fn byte_for_col(buf: &GapBuffer, seg_start: usize, seg_end: usize, target: usize) -> usize {
    let mut pos = seg_start;
    let mut col = 0usize;
    while pos < seg_end {
        let (w, next) = grapheme_width(buf, pos);
        if next <= pos {
            break;
        }
        if col + w as usize > target {
            return pos;
        }
        col += w as usize;
        pos = next;
    }
    pos
}

/// Move `delta` logical lines, preserving the visual column in cells.
/// `sticky` carries the column across repeated vertical motions; pass the
/// previous return value back in.
pub fn move_line(
    buf: &GapBuffer,
    pos: usize,
    delta: isize,
    sticky: Option<usize>,
) -> (usize, Option<usize>) {
    if delta == 0 {
        return (pos, sticky);
    }
    let col = sticky.unwrap_or_else(|| display_width(buf, buf.line_start(pos), pos));
    let mut ls = buf.line_start(pos);
    if delta > 0 {
        for _ in 0..delta {
            let le = buf.line_end(ls);
            if le >= buf.len() {
                break;
            }
            ls = le + 1;
        }
    } else {
        for _ in 0..-delta {
            if ls == 0 {
                break;
            }
            ls = buf.line_start(ls - 1);
        }
    }
    (byte_for_col(buf, ls, buf.line_end(ls), col), Some(col))
}

/// Start offsets of the visual segments of one logical line.
fn segment_starts(buf: &GapBuffer, line_start: usize, line_end: usize, width: usize) -> Vec<usize> {
    let width = width.max(1);
    let mut starts = vec![line_start];
    let mut seg = line_start;
    loop {
        let (split, _) = find_wrap_point(buf, seg, line_end, width);
        if split >= line_end || split <= seg {
            break;
        }
        let mut next = split;
        while next < line_end && buf.at(next) == b' ' {
            next += 1;
        }
        if next >= line_end || next <= seg {
            break;
        }
        starts.push(next);
        seg = next;
    }
    starts
}

/// The split point ending the segment that begins at `seg_start`.
fn segment_split(buf: &GapBuffer, seg_start: usize, line_end: usize, width: usize) -> usize {
    find_wrap_point(buf, seg_start, line_end, width.max(1)).0
}

/// Move `delta` visual segments at wrap width `width`, preserving the
/// visual column within the destination segment. Downward motion on the
/// last line clamps to the line end rather than the document end.
pub fn move_visual_line(
    buf: &GapBuffer,
    pos: usize,
    delta: isize,
    width: usize,
    sticky: Option<usize>,
) -> (usize, Option<usize>) {
    let pos = pos.min(buf.len());
    let mut line_start = buf.line_start(pos);
    let mut starts = segment_starts(buf, line_start, buf.line_end(pos), width);
    let mut idx = starts.partition_point(|&s| s <= pos).saturating_sub(1);
    let col = sticky.unwrap_or_else(|| display_width(buf, starts[idx], pos));

    if delta > 0 {
        for _ in 0..delta {
            if idx + 1 < starts.len() {
                idx += 1;
            } else {
                let le = buf.line_end(line_start);
                if le >= buf.len() {
                    return (le, Some(col));
                }
                line_start = le + 1;
                starts = segment_starts(buf, line_start, buf.line_end(line_start), width);
                idx = 0;
            }
        }
    } else {
        for _ in 0..-delta {
            if idx > 0 {
                idx -= 1;
            } else if line_start == 0 {
                break;
            } else {
                line_start = buf.line_start(line_start - 1);
                starts = segment_starts(buf, line_start, buf.line_end(line_start), width);
                idx = starts.len() - 1;
            }
        }
    }
    let seg_start = starts[idx];
    let split = segment_split(buf, seg_start, buf.line_end(line_start), width);
    (byte_for_col(buf, seg_start, split, col), Some(col))
}

/// Visual-line motion that treats atomic blocks (tables, fenced code,
/// standalone images) as single units: moving down from inside one lands
/// immediately after it, moving up lands one byte before it, each
/// consuming one step. With `skip_blocks` off this is `move_visual_line`.
pub fn move_visual_line_block_aware(
    buf: &GapBuffer,
    cache: &BlockCache,
    pos: usize,
    delta: isize,
    width: usize,
    skip_blocks: bool,
    sticky: Option<usize>,
) -> (usize, Option<usize>) {
    if !skip_blocks || delta == 0 {
        return move_visual_line(buf, pos, delta, width, sticky);
    }
    let mut p = pos.min(buf.len());
    let mut st = sticky;
    let dir: isize = delta.signum();
    for _ in 0..delta.abs() {
        let line = buf.line_start(p);
        match cache.block_at(line).filter(|b| b.is_atomic()) {
            Some(b) if dir > 0 => {
                p = b.span.end().min(buf.len());
                st = None;
            }
            Some(b) => {
                p = b.span.start.saturating_sub(1);
                st = None;
            }
            None => {
                let (np, ns) = move_visual_line(buf, p, dir, width, st);
                p = np;
                st = ns;
            }
        }
    }
    (p, st)
}

/// Next word start: skip the rest of the current word, then the
/// whitespace after it. Word boundaries are ASCII whitespace.
pub fn word_right(buf: &GapBuffer, pos: usize) -> usize {
    let mut i = pos.min(buf.len());
    while i < buf.len() && !buf.at(i).is_ascii_whitespace() {
        i += 1;
    }
    while i < buf.len() && buf.at(i).is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Previous word start: skip the whitespace before the cursor, then the
/// word before that.
pub fn word_left(buf: &GapBuffer, pos: usize) -> usize {
    let mut i = pos.min(buf.len());
    while i > 0 && buf.at(i - 1).is_ascii_whitespace() {
        i -= 1;
    }
    while i > 0 && !buf.at(i - 1).is_ascii_whitespace() {
        i -= 1;
    }
    i
}

/// Jump past the atomic block containing `pos`; no-op elsewhere.
pub fn skip_block_forward(buf: &GapBuffer, cache: &BlockCache, pos: usize) -> usize {
    match cache.block_at(pos).filter(|b| b.is_atomic()) {
        Some(b) => b.span.end().min(buf.len()),
        None => pos,
    }
}

/// Jump to just before the atomic block containing `pos`; no-op
/// elsewhere. Clamps to the document start when the block opens it.
pub fn skip_block_backward(cache: &BlockCache, pos: usize) -> usize {
    match cache.block_at(pos).filter(|b| b.is_atomic()) {
        Some(b) => b.span.start.saturating_sub(1),
        None => pos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_markdown::BlockCache;

    #[test]
    fn move_line_scenario() {
        let buf = GapBuffer::from_str("A\nB\nC");
        assert_eq!(move_line(&buf, 2, 1, None).0, 4);
        assert_eq!(move_line(&buf, 2, -1, None).0, 0);
    }

    #[test]
    fn move_line_clamps_column_to_short_line() {
        let buf = GapBuffer::from_str("long line here\nab\nanother long one");
        let (p, sticky) = move_line(&buf, 10, 1, None);
        assert_eq!(p, 17); // end of "ab"
        let (p, _) = move_line(&buf, p, 1, sticky);
        // Sticky column restores the original offset on the long line.
        assert_eq!(display_width(&buf, buf.line_start(p), p), 10);
    }

    #[test]
    fn move_line_wide_clusters_round_down() {
        let buf = GapBuffer::from_str("\u{6f22}\u{5b57}\u{6f22}\n0123456");
        // Column 3 falls mid-way into the second wide cluster.
        let (p, _) = move_line(&buf, 10, -1, Some(3));
        assert_eq!(p, 3); // start of the cluster that would cross col 3
    }

    #[test]
    fn visual_line_down_and_back_up() {
        // Width 10: "alpha beta gamma delta" wraps as
        // "alpha beta" / "gamma " / "delta".
        let buf = GapBuffer::from_str("alpha beta gamma delta");
        let (down, sticky) = move_visual_line(&buf, 2, 1, 10, None);
        assert_eq!(down, 13); // col 2 within "gamma"
        let (up, _) = move_visual_line(&buf, down, -1, 10, sticky);
        assert_eq!(up, 2);
    }

    #[test]
    fn visual_line_last_line_clamps_to_line_end() {
        let buf = GapBuffer::from_str("one\ntiny");
        let (p, _) = move_visual_line(&buf, 5, 1, 40, None);
        assert_eq!(p, 8); // line_end of "tiny", not past it
        let (p2, _) = move_visual_line(&buf, 8, 1, 40, None);
        assert_eq!(p2, 8);
    }

    #[test]
    fn visual_line_crosses_logical_lines() {
        let buf = GapBuffer::from_str("wrap me around here\nnext");
        // Width 8 wraps line one as "wrap me " / "around " / "here".
        let (p, _) = move_visual_line(&buf, 0, 3, 8, None);
        assert_eq!(p, 20); // first segment of "next"
        let (q, _) = move_visual_line(&buf, p, -1, 8, None);
        assert_eq!(buf.line_start(q), 0);
        assert!(q >= 15); // the "here" segment
    }

    #[test]
    fn block_aware_skips_over_table() {
        let src = "before\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\nafter\n";
        let buf = GapBuffer::from_str(src);
        let cache = BlockCache::from_buffer(&buf);
        let table_start = src.find("| a").unwrap();
        let after_start = src.find("after").unwrap();
        // Down from inside the table lands right after the block.
        let (p, _) =
            move_visual_line_block_aware(&buf, &cache, table_start + 2, 1, 80, true, None);
        assert_eq!(p, src.find("\nafter").unwrap()); // the blank line before "after"
        let (p2, _) = move_visual_line_block_aware(&buf, &cache, p, 1, 80, true, None);
        assert_eq!(buf.line_start(p2), after_start);
        // Up from inside the table lands one byte before the block.
        let (q, _) =
            move_visual_line_block_aware(&buf, &cache, table_start + 2, -1, 80, true, None);
        assert_eq!(q, table_start - 1);
    }

    #[test]
    fn word_motions() {
        let buf = GapBuffer::from_str("foo  bar\nbaz qux");
        assert_eq!(word_right(&buf, 0), 5);
        assert_eq!(word_right(&buf, 5), 9);
        assert_eq!(word_right(&buf, 13), 16);
        assert_eq!(word_left(&buf, 16), 13);
        assert_eq!(word_left(&buf, 13), 9);
        assert_eq!(word_left(&buf, 9), 5);
        assert_eq!(word_left(&buf, 5), 0);
        assert_eq!(word_left(&buf, 0), 0);
        assert_eq!(word_right(&buf, 16), 16);
    }

    #[test]
    fn block_skips_are_noop_outside_atomic_blocks() {
        let buf = GapBuffer::from_str("just a paragraph\n");
        let cache = BlockCache::from_buffer(&buf);
        assert_eq!(skip_block_forward(&buf, &cache, 3), 3);
        assert_eq!(skip_block_backward(&cache, 3), 3);
    }

    #[test]
    fn block_skips_jump_out_of_code() {
        let src = "```\nlet a = 1;\n```\ntail\n";
        let buf = GapBuffer::from_str(src);
        let cache = BlockCache::from_buffer(&buf);
        let inside = src.find("let").unwrap();
        assert_eq!(skip_block_forward(&buf, &cache, inside), src.find("tail").unwrap());
        assert_eq!(skip_block_backward(&cache, inside), 0); // block opens the doc
    }

    #[test]
    fn prev_next_grapheme_cross_lines_and_clusters() {
        let buf = GapBuffer::from_str("a\u{1f600}\nb");
        assert_eq!(next_grapheme(&buf, 0), 1);
        assert_eq!(next_grapheme(&buf, 1), 5);
        assert_eq!(prev_grapheme(&buf, 5), 1);
        assert_eq!(prev_grapheme(&buf, 6), 5); // across the newline
        assert_eq!(prev_grapheme(&buf, 0), 0);
    }
}
