//! Line-level construct recognizers.
//!
//! All functions expect `pos` at a line start (callers pass
//! `buf.line_start(p)`), tolerate arbitrary positions, and return `None`
//! rather than erroring. Leading indentation follows the 0–3 column rule:
//! a tab counts four columns and four or more columns means indented text,
//! which this grammar does not treat as a block opener.

use crate::{Match1, Span};
use core_text::GapBuffer;

/// Count leading space/tab columns. `None` when the count exceeds `max`.
fn leading_cols(buf: &GapBuffer, pos: usize, max: usize) -> Option<(usize, usize)> {
    let mut cols = 0usize;
    let mut i = pos;
    loop {
        match buf.get(i) {
            Some(b' ') => {
                cols += 1;
                i += 1;
            }
            Some(b'\t') => {
                cols += 4;
                i += 1;
            }
            _ => break,
        }
        if cols > max {
            return None;
        }
    }
    Some((cols, i))
}

/// True when the line containing `pos` holds only spaces and tabs.
pub fn is_blank_line(buf: &GapBuffer, pos: usize) -> bool {
    let ls = buf.line_start(pos);
    let le = buf.line_end(pos);
    (ls..le).all(|i| matches!(buf.at(i), b' ' | b'\t'))
}

/// ATX header level (1..=6) at a line start, if any.
pub fn check_header(buf: &GapBuffer, pos: usize) -> Option<u8> {
    header_content(buf, pos).map(|(level, _)| level)
}

/// ATX header level plus the offset of the first content byte (past the
/// `#` run and the whitespace after it).
pub fn header_content(buf: &GapBuffer, pos: usize) -> Option<(u8, usize)> {
    let (_, mut i) = leading_cols(buf, pos, 3)?;
    let mut level = 0u8;
    while buf.get(i) == Some(b'#') {
        level += 1;
        i += 1;
        if level > 6 {
            return None;
        }
    }
    if level == 0 {
        return None;
    }
    match buf.get(i) {
        None | Some(b'\n') => Some((level, i)),
        Some(b' ' | b'\t') => {
            while matches!(buf.get(i), Some(b' ' | b'\t')) {
                i += 1;
            }
            Some((level, i))
        }
        _ => None,
    }
}

/// Setext underline: a run of `=` (level 1) or `-` (level 2) after 0–3
/// spaces, then only trailing whitespace. Returns `(level, line_len)`
/// where `line_len` includes the terminating newline when present.
pub fn check_setext(buf: &GapBuffer, pos: usize) -> Option<(u8, usize)> {
    let (_, mut i) = leading_cols(buf, pos, 3)?;
    let marker = match buf.get(i)? {
        b @ (b'=' | b'-') => b,
        _ => return None,
    };
    let level = if marker == b'=' { 1 } else { 2 };
    while buf.get(i) == Some(marker) {
        i += 1;
    }
    while matches!(buf.get(i), Some(b' ' | b'\t')) {
        i += 1;
    }
    match buf.get(i) {
        None => Some((level, i - pos)),
        Some(b'\n') => Some((level, i + 1 - pos)),
        _ => None,
    }
}

/// `{#id}` anywhere on the line containing `pos`; the span covers the id
/// characters only. Content is at least one byte, neither `}` nor newline.
pub fn heading_id(buf: &GapBuffer, pos: usize) -> Option<Span> {
    let ls = buf.line_start(pos);
    let le = buf.line_end(pos);
    let mut i = ls;
    while i < le {
        if buf.at(i) == b'{' && buf.get(i + 1) == Some(b'#') {
            let id_start = i + 2;
            let mut j = id_start;
            while j < le && buf.at(j) != b'}' {
                j += 1;
            }
            if j < le && j > id_start {
                return Some(Span::from_range(id_start, j));
            }
        }
        i += 1;
    }
    None
}

/// Fenced code block match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBlockMatch {
    pub content: Span,
    pub lang: Span,
    pub total_len: usize,
}

/// Opening ```` ``` ```` fence (0–3 leading spaces, optional language to
/// end of line) through its closing fence. A missing closer is no match.
pub fn check_code_block(buf: &GapBuffer, pos: usize) -> Option<CodeBlockMatch> {
    let (_, i) = leading_cols(buf, pos, 3)?;
    if !buf.starts_with(i, b"```") {
        return None;
    }
    let mut lang_start = i + 3;
    let open_end = buf.line_end(lang_start);
    while lang_start < open_end && buf.at(lang_start) == b' ' {
        lang_start += 1;
    }
    let mut lang_end = open_end;
    while lang_end > lang_start && buf.at(lang_end - 1) == b' ' {
        lang_end -= 1;
    }
    let lang = Span::from_range(lang_start, lang_end);
    if open_end >= buf.len() {
        return None; // opener is the last line, nothing can close it
    }
    let content_start = open_end + 1;
    let mut line = content_start;
    loop {
        let lend = buf.line_end(line);
        let mut k = line;
        while k < lend && buf.at(k) == b' ' {
            k += 1;
        }
        if buf.starts_with(k, b"```") && (k + 3..lend).all(|m| matches!(buf.at(m), b' ' | b'\t'))
        {
            let total_end = if lend < buf.len() { lend + 1 } else { lend };
            return Some(CodeBlockMatch {
                content: Span::from_range(content_start, line),
                lang,
                total_len: total_end - pos,
            });
        }
        if lend >= buf.len() {
            return None;
        }
        line = lend + 1;
    }
}

/// Horizontal rule: at least three of one marker from `-*_` with only
/// whitespace interleaved. Returns the total length through the newline.
pub fn check_hr(buf: &GapBuffer, pos: usize) -> Option<usize> {
    let (_, mut i) = leading_cols(buf, pos, 3)?;
    let marker = match buf.get(i)? {
        b @ (b'-' | b'*' | b'_') => b,
        _ => return None,
    };
    let mut count = 0usize;
    loop {
        match buf.get(i) {
            Some(b) if b == marker => {
                count += 1;
                i += 1;
            }
            Some(b' ' | b'\t') => i += 1,
            Some(b'\n') => {
                i += 1;
                break;
            }
            None => break,
            Some(_) => return None,
        }
    }
    (count >= 3).then_some(i - pos)
}

/// Blockquote nesting level (>= 1) and the offset of the first content
/// byte after the optional single space following the last `>`.
pub fn check_blockquote(buf: &GapBuffer, pos: usize) -> Option<(usize, usize)> {
    let (_, mut i) = leading_cols(buf, pos, 3)?;
    if buf.get(i) != Some(b'>') {
        return None;
    }
    let mut level = 0usize;
    loop {
        match buf.get(i) {
            Some(b'>') => {
                level += 1;
                i += 1;
            }
            Some(b' ') if buf.get(i + 1) == Some(b'>') => i += 1,
            _ => break,
        }
    }
    let content = if buf.get(i) == Some(b' ') { i + 1 } else { i };
    Some((level, content))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
    TaskUnchecked,
    TaskChecked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub kind: ListKind,
    pub indent: usize,
    pub content_start: usize,
}

/// Unordered (`-`, `*`, `+`) or ordered (1–9 digits plus `.` or `)`)
/// list marker. A marker directly followed by a newline opens an empty
/// item. Leading spaces become the item indent.
pub fn check_list_item(buf: &GapBuffer, pos: usize) -> Option<ListMarker> {
    let mut i = pos;
    let mut indent = 0usize;
    while buf.get(i) == Some(b' ') {
        indent += 1;
        i += 1;
    }
    match buf.get(i)? {
        b'-' | b'*' | b'+' => match buf.get(i + 1) {
            Some(b' ') => Some(ListMarker {
                kind: ListKind::Unordered,
                indent,
                content_start: i + 2,
            }),
            Some(b'\n') | None => Some(ListMarker {
                kind: ListKind::Unordered,
                indent,
                content_start: i + 1,
            }),
            _ => None,
        },
        b'0'..=b'9' => {
            let mut j = i;
            while matches!(buf.get(j), Some(b'0'..=b'9')) {
                j += 1;
                if j - i > 9 {
                    return None;
                }
            }
            if !matches!(buf.get(j), Some(b'.' | b')')) {
                return None;
            }
            match buf.get(j + 1) {
                Some(b' ') => Some(ListMarker {
                    kind: ListKind::Ordered,
                    indent,
                    content_start: j + 2,
                }),
                Some(b'\n') | None => Some(ListMarker {
                    kind: ListKind::Ordered,
                    indent,
                    content_start: j + 1,
                }),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Task marker `- [ ]` / `- [x]` / `- [X]`; returns `(checked,
/// content_start)` with the optional space after `]` consumed.
pub fn check_task(buf: &GapBuffer, pos: usize) -> Option<(bool, usize)> {
    let mut i = pos;
    while buf.get(i) == Some(b' ') {
        i += 1;
    }
    let checked = if buf.starts_with(i, b"- [x]") || buf.starts_with(i, b"- [X]") {
        true
    } else if buf.starts_with(i, b"- [ ]") {
        false
    } else {
        return None;
    };
    let mut content = i + 5;
    if buf.get(content) == Some(b' ') {
        content += 1;
    }
    Some((checked, content))
}

/// Block math opened by `$$` or `\[` at a line start. The closer may sit
/// on the same line or at a later line start after leading whitespace;
/// without one there is no match. The span covers the content between the
/// delimiters.
pub fn check_block_math(buf: &GapBuffer, pos: usize) -> Option<Match1> {
    let (_, i) = leading_cols(buf, pos, 3)?;
    let closer: &[u8] = if buf.starts_with(i, b"$$") {
        b"$$"
    } else if buf.starts_with(i, b"\\[") {
        b"\\]"
    } else {
        return None;
    };
    let open_end = i + 2;
    let first_line_end = buf.line_end(open_end);
    let mut j = open_end;
    while j + 2 <= first_line_end {
        if buf.starts_with(j, closer) {
            return Some(Match1 {
                span: Span::from_range(open_end, j),
                total_len: j + 2 - pos,
            });
        }
        j += 1;
    }
    if first_line_end >= buf.len() {
        return None;
    }
    let mut line = first_line_end + 1;
    loop {
        let lend = buf.line_end(line);
        let mut k = line;
        while k < lend && matches!(buf.at(k), b' ' | b'\t') {
            k += 1;
        }
        if buf.starts_with(k, closer) {
            return Some(Match1 {
                span: Span::from_range(open_end, k),
                total_len: k + 2 - pos,
            });
        }
        if lend >= buf.len() {
            return None;
        }
        line = lend + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atx_header_levels_and_indent_rule() {
        assert_eq!(check_header(&GapBuffer::from_str("# One"), 0), Some(1));
        assert_eq!(check_header(&GapBuffer::from_str("###### Six"), 0), Some(6));
        assert_eq!(check_header(&GapBuffer::from_str("   ## In"), 0), Some(2));
        assert_eq!(check_header(&GapBuffer::from_str("    # Deep"), 0), None);
        assert_eq!(check_header(&GapBuffer::from_str("\t# Tab"), 0), None);
        assert_eq!(check_header(&GapBuffer::from_str("####### Seven"), 0), None);
        assert_eq!(check_header(&GapBuffer::from_str("#nospace"), 0), None);
        assert_eq!(check_header(&GapBuffer::from_str("##\nx"), 0), Some(2));
    }

    #[test]
    fn header_content_skips_marker_whitespace() {
        let b = GapBuffer::from_str("##   Title");
        assert_eq!(header_content(&b, 0), Some((2, 5)));
    }

    #[test]
    fn setext_underlines() {
        assert_eq!(check_setext(&GapBuffer::from_str("====\n"), 0), Some((1, 5)));
        assert_eq!(check_setext(&GapBuffer::from_str("--  \n"), 0), Some((2, 5)));
        assert_eq!(check_setext(&GapBuffer::from_str("==="), 0), Some((1, 3)));
        assert_eq!(check_setext(&GapBuffer::from_str("== x"), 0), None);
    }

    #[test]
    fn heading_id_span() {
        let b = GapBuffer::from_str("## Title {#custom-id}\nrest");
        let id = heading_id(&b, 3).unwrap();
        assert_eq!(b.slice_string(id.start, id.end()), "custom-id");
        assert_eq!(heading_id(&GapBuffer::from_str("{#}"), 0), None);
    }

    #[test]
    fn code_block_scenario() {
        let b = GapBuffer::from_str("```js\nlet x=1;\n```");
        let m = check_code_block(&b, 0).unwrap();
        assert_eq!(b.slice_string(m.content.start, m.content.end()), "let x=1;\n");
        assert_eq!(b.slice_string(m.lang.start, m.lang.end()), "js");
        assert_eq!(m.total_len, b.len());
    }

    #[test]
    fn code_block_unclosed_is_no_match() {
        assert_eq!(check_code_block(&GapBuffer::from_str("```\nabc"), 0), None);
        assert_eq!(check_code_block(&GapBuffer::from_str("```rust"), 0), None);
    }

    #[test]
    fn code_block_close_with_leading_spaces() {
        let b = GapBuffer::from_str("```\nbody\n  ```\nafter");
        let m = check_code_block(&b, 0).unwrap();
        assert_eq!(b.slice_string(m.content.start, m.content.end()), "body\n");
        assert_eq!(m.total_len, 15); // through the closing fence line's newline
    }

    #[test]
    fn horizontal_rules() {
        assert_eq!(check_hr(&GapBuffer::from_str("---\n"), 0), Some(4));
        assert_eq!(check_hr(&GapBuffer::from_str("* * *"), 0), Some(5));
        assert_eq!(check_hr(&GapBuffer::from_str("___"), 0), Some(3));
        assert_eq!(check_hr(&GapBuffer::from_str("--"), 0), None);
        assert_eq!(check_hr(&GapBuffer::from_str("-*-"), 0), None);
        assert_eq!(check_hr(&GapBuffer::from_str("--- x"), 0), None);
    }

    #[test]
    fn blockquote_levels() {
        assert_eq!(check_blockquote(&GapBuffer::from_str("> a"), 0), Some((1, 2)));
        assert_eq!(check_blockquote(&GapBuffer::from_str(">> b"), 0), Some((2, 3)));
        assert_eq!(check_blockquote(&GapBuffer::from_str("> > c"), 0), Some((2, 4)));
        assert_eq!(check_blockquote(&GapBuffer::from_str(">"), 0), Some((1, 1)));
        assert_eq!(check_blockquote(&GapBuffer::from_str("plain"), 0), None);
    }

    #[test]
    fn list_markers() {
        let m = check_list_item(&GapBuffer::from_str("- item"), 0).unwrap();
        assert_eq!((m.kind, m.indent, m.content_start), (ListKind::Unordered, 0, 2));
        let m = check_list_item(&GapBuffer::from_str("  * x"), 0).unwrap();
        assert_eq!((m.kind, m.indent, m.content_start), (ListKind::Unordered, 2, 4));
        let m = check_list_item(&GapBuffer::from_str("12) go"), 0).unwrap();
        assert_eq!((m.kind, m.content_start), (ListKind::Ordered, 4));
        let m = check_list_item(&GapBuffer::from_str("3.\nnext"), 0).unwrap();
        assert_eq!(m.content_start, 2); // empty item
        assert_eq!(check_list_item(&GapBuffer::from_str("1234567890. x"), 0), None);
        assert_eq!(check_list_item(&GapBuffer::from_str("-dash"), 0), None);
        assert_eq!(check_list_item(&GapBuffer::from_str("1:x"), 0), None);
    }

    #[test]
    fn task_markers() {
        assert_eq!(check_task(&GapBuffer::from_str("- [ ] todo"), 0), Some((false, 6)));
        assert_eq!(check_task(&GapBuffer::from_str("- [x] done"), 0), Some((true, 6)));
        assert_eq!(check_task(&GapBuffer::from_str("  - [X]"), 0), Some((true, 7)));
        assert_eq!(check_task(&GapBuffer::from_str("- [y] no"), 0), None);
    }

    #[test]
    fn block_math_single_and_multi_line() {
        let s = GapBuffer::from_str("$$x^2$$");
        let m = check_block_math(&s, 0).unwrap();
        assert_eq!(s.slice_string(m.span.start, m.span.end()), "x^2");
        assert_eq!(m.total_len, 7);

        let multi = GapBuffer::from_str("$$\n\\frac{a}{b}\n$$\nafter");
        let m = check_block_math(&multi, 0).unwrap();
        assert_eq!(m.span.start, 2);
        assert_eq!(multi.slice_string(m.span.start, m.span.end()), "\n\\frac{a}{b}\n");
        assert_eq!(m.total_len, 17);

        let brackets = GapBuffer::from_str("\\[\nE = mc^2\n  \\]");
        let m = check_block_math(&brackets, 0).unwrap();
        assert_eq!(m.total_len, brackets.len());

        assert_eq!(check_block_math(&GapBuffer::from_str("$$\nnope"), 0), None);
    }
}
