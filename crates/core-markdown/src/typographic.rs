//! Typographic source replacements.
//!
//! Applied by the output driver outside `Code` spans only. Longer matches
//! win (`---` before `--`), and `--` refuses a following `-` so a dash run
//! never decomposes into en dash + stray hyphen.

use core_text::GapBuffer;

/// Replacement text and consumed source length at `pos`, if any.
pub fn check_typographic(buf: &GapBuffer, pos: usize) -> Option<(&'static str, usize)> {
    match buf.get(pos)? {
        b'-' => {
            if buf.starts_with(pos, b"---") {
                Some(("\u{2014}", 3))
            } else if buf.starts_with(pos, b"--") && buf.get(pos + 2) != Some(b'-') {
                Some(("\u{2013}", 2))
            } else {
                None
            }
        }
        b'.' => buf.starts_with(pos, b"...").then_some(("\u{2026}", 3)),
        b'(' => {
            if buf.starts_with(pos, b"(c)") || buf.starts_with(pos, b"(C)") {
                Some(("\u{a9}", 3))
            } else if buf.starts_with(pos, b"(r)") || buf.starts_with(pos, b"(R)") {
                Some(("\u{ae}", 3))
            } else if buf.starts_with(pos, b"(p)") || buf.starts_with(pos, b"(P)") {
                Some(("\u{a7}", 3))
            } else if buf.starts_with(pos, b"(tm)") || buf.starts_with(pos, b"(TM)") {
                Some(("\u{2122}", 4))
            } else {
                None
            }
        }
        b'+' => buf.starts_with(pos, b"+-").then_some(("\u{b1}", 2)),
        b'<' => buf.starts_with(pos, b"<<").then_some(("\u{ab}", 2)),
        b'>' => buf.starts_with(pos, b">>").then_some(("\u{bb}", 2)),
        _ => None,
    }
}
