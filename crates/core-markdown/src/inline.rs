//! Inline construct recognizers.
//!
//! Contract:
//! - Input is `(buffer, byte position)`; output is a match record with the
//!   full syntactic extent or `None`. No recognizer reads past the document
//!   or panics on arbitrary positions.
//! - Code spans never cross a newline; other delimiter pairs never cross a
//!   paragraph break. Callers enforce both by bounding `find_closing`.

use crate::style::MdStyle;
use crate::{Autolink, FootnoteRef, ImageAttrs, Match1, Match2, Span};
use core_text::GapBuffer;

/// Examine up to three bytes at `pos` for an inline delimiter.
///
/// Returns the style the delimiter toggles and the delimiter length.
pub fn check_delim(buf: &GapBuffer, pos: usize) -> Option<(MdStyle, usize)> {
    match buf.get(pos)? {
        b'*' => {
            if buf.starts_with(pos, b"***") {
                Some((MdStyle::BOLD | MdStyle::ITALIC, 3))
            } else if buf.starts_with(pos, b"**") {
                Some((MdStyle::BOLD, 2))
            } else {
                Some((MdStyle::ITALIC, 1))
            }
        }
        b'_' => buf.starts_with(pos, b"__").then_some((MdStyle::UNDERLINE, 2)),
        b'=' => {
            if buf.starts_with(pos, b"===") {
                Some((MdStyle::UNDERLINE, 3))
            } else if buf.starts_with(pos, b"==") {
                Some((MdStyle::MARK, 2))
            } else {
                None
            }
        }
        b'~' => {
            if buf.starts_with(pos, b"~~") {
                Some((MdStyle::STRIKE, 2))
            } else {
                Some((MdStyle::SUB, 1))
            }
        }
        b'^' => Some((MdStyle::SUP, 1)),
        b'`' => {
            // Three backticks open a fence, not a code span.
            if buf.starts_with(pos, b"```") {
                None
            } else {
                Some((MdStyle::CODE, 1))
            }
        }
        _ => None,
    }
}

/// Offset of the delimiter closing the one opened at `pos`, scanning no
/// further than `end` (exclusive). A match has the same style and the same
/// delimiter length.
pub fn find_closing(
    buf: &GapBuffer,
    pos: usize,
    style: MdStyle,
    dlen: usize,
    end: usize,
) -> Option<usize> {
    let end = end.min(buf.len());
    let mut i = pos + dlen;
    while i < end {
        if let Some((s, d)) = check_delim(buf, i)
            && s == style
            && d == dlen
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// `[text](url)`. Neither part crosses a newline or contains its closing
/// delimiter; a preceding `!` means this is an image, not a link.
pub fn check_link(buf: &GapBuffer, pos: usize) -> Option<Match2> {
    if buf.get(pos)? != b'[' {
        return None;
    }
    if pos > 0 && buf.at(pos - 1) == b'!' {
        return None;
    }
    let text_start = pos + 1;
    let mut i = text_start;
    loop {
        match buf.get(i)? {
            b']' => break,
            b'\n' => return None,
            _ => i += 1,
        }
    }
    let text = Span::from_range(text_start, i);
    i += 1;
    if buf.get(i)? != b'(' {
        return None;
    }
    let url_start = i + 1;
    i = url_start;
    loop {
        match buf.get(i)? {
            b')' => break,
            b'\n' => return None,
            _ => i += 1,
        }
    }
    Some(Match2 {
        spans: [text, Span::from_range(url_start, i)],
        total_len: i + 1 - pos,
    })
}

/// `![alt](path "title"?)` with an optional `{ width=N[px|%] height=N[px|%] }`
/// trailer separated by spaces only. Percent dimensions encode negative,
/// unset dimensions zero, bare numbers default to pixels.
pub fn check_image(buf: &GapBuffer, pos: usize) -> Option<ImageAttrs> {
    if buf.get(pos)? != b'!' || buf.get(pos + 1)? != b'[' {
        return None;
    }
    let alt_start = pos + 2;
    let mut i = alt_start;
    loop {
        match buf.get(i)? {
            b']' => break,
            b'\n' => return None,
            _ => i += 1,
        }
    }
    let alt = Span::from_range(alt_start, i);
    i += 1;
    if buf.get(i)? != b'(' {
        return None;
    }
    let path_start = i + 1;
    i = path_start;
    while let Some(b) = buf.get(i) {
        if b == b')' || b == b' ' || b == b'\n' {
            break;
        }
        i += 1;
    }
    let path = Span::from_range(path_start, i);
    let mut title = None;
    while buf.get(i) == Some(b' ') {
        i += 1;
    }
    if buf.get(i) == Some(b'"') {
        let title_start = i + 1;
        i = title_start;
        loop {
            match buf.get(i)? {
                b'"' => break,
                b'\n' => return None,
                _ => i += 1,
            }
        }
        title = Some(Span::from_range(title_start, i));
        i += 1;
        while buf.get(i) == Some(b' ') {
            i += 1;
        }
    }
    if buf.get(i)? != b')' {
        return None;
    }
    i += 1;
    let mut total_len = i - pos;
    let (mut width, mut height) = (0i32, 0i32);
    let mut j = i;
    while buf.get(j) == Some(b' ') {
        j += 1;
    }
    if buf.get(j) == Some(b'{')
        && let Some((w, h, after)) = parse_dimension_block(buf, j)
    {
        width = w;
        height = h;
        total_len = after - pos;
    }
    Some(ImageAttrs {
        alt,
        title,
        path,
        width,
        height,
        total_len,
    })
}

/// Parse `{ width=N[px|%] height=N[px|%] }` starting at the `{`.
/// Returns `(width, height, offset past '}')`; keys may appear in either
/// order and either may be absent.
fn parse_dimension_block(buf: &GapBuffer, open: usize) -> Option<(i32, i32, usize)> {
    let mut i = open + 1;
    let (mut width, mut height) = (0i32, 0i32);
    loop {
        while buf.get(i) == Some(b' ') {
            i += 1;
        }
        match buf.get(i)? {
            b'}' => return Some((width, height, i + 1)),
            b'\n' => return None,
            _ => {}
        }
        let (is_width, value_at) = if buf.starts_with(i, b"width=") {
            (true, i + 6)
        } else if buf.starts_with(i, b"height=") {
            (false, i + 7)
        } else {
            return None;
        };
        let (value, after) = parse_dimension_value(buf, value_at)?;
        if is_width {
            width = value;
        } else {
            height = value;
        }
        i = after;
    }
}

fn parse_dimension_value(buf: &GapBuffer, at: usize) -> Option<(i32, usize)> {
    let mut i = at;
    let mut value: i64 = 0;
    while let Some(b @ b'0'..=b'9') = buf.get(i) {
        value = value * 10 + i64::from(b - b'0');
        i += 1;
        if i - at > 9 {
            return None;
        }
    }
    if i == at {
        return None;
    }
    if buf.starts_with(i, b"px") {
        Some((value as i32, i + 2))
    } else if buf.get(i) == Some(b'%') {
        Some((-(value as i32), i + 1))
    } else {
        Some((value as i32, i))
    }
}

/// `[^id]` reference, or definition when the marker opens a line and is
/// immediately followed by `:`. The id is non-empty and contains neither
/// spaces nor newlines.
pub fn check_footnote(buf: &GapBuffer, pos: usize) -> Option<FootnoteRef> {
    if !buf.starts_with(pos, b"[^") {
        return None;
    }
    let id_start = pos + 2;
    let mut i = id_start;
    loop {
        match buf.get(i)? {
            b']' => break,
            b' ' | b'\n' => return None,
            _ => i += 1,
        }
    }
    if i == id_start {
        return None;
    }
    let id = Span::from_range(id_start, i);
    let mut total_len = i + 1 - pos;
    let is_definition = buf.line_start(pos) == pos && buf.get(i + 1) == Some(b':');
    if is_definition {
        total_len += 1;
    }
    Some(FootnoteRef {
        id,
        is_definition,
        total_len,
    })
}

/// Inline math in any of its three shapes: `` $`…`$ ``, `\(…\)`, or
/// `$…$` (where the opener is a single `$`, a preceding backslash
/// suppresses the match, and `\` escapes the next byte inside). None of
/// the shapes crosses a newline.
pub fn check_inline_math(buf: &GapBuffer, pos: usize) -> Option<Match1> {
    if buf.starts_with(pos, b"$`") {
        let start = pos + 2;
        let mut i = start;
        loop {
            match buf.get(i)? {
                b'\n' => return None,
                b'`' if buf.get(i + 1) == Some(b'$') => break,
                _ => i += 1,
            }
        }
        return Some(Match1 {
            span: Span::from_range(start, i),
            total_len: i + 2 - pos,
        });
    }
    if buf.starts_with(pos, b"\\(") {
        let start = pos + 2;
        let mut i = start;
        loop {
            match buf.get(i)? {
                b'\n' => return None,
                b'\\' if buf.get(i + 1) == Some(b')') => break,
                _ => i += 1,
            }
        }
        return Some(Match1 {
            span: Span::from_range(start, i),
            total_len: i + 2 - pos,
        });
    }
    if buf.get(pos)? == b'$' {
        if buf.get(pos + 1) == Some(b'$') {
            return None;
        }
        if pos > 0 && buf.at(pos - 1) == b'\\' {
            return None;
        }
        let start = pos + 1;
        let mut i = start;
        loop {
            match buf.get(i)? {
                b'\n' => return None,
                b'\\' => i += 2,
                b'$' => break,
                _ => i += 1,
            }
        }
        if i == start {
            return None;
        }
        return Some(Match1 {
            span: Span::from_range(start, i),
            total_len: i + 1 - pos,
        });
    }
    None
}

fn is_scheme_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'+' || b == b'.' || b == b'-'
}

/// `<scheme:…>` URI or `<local@domain>` email autolink. The span excludes
/// the angle brackets; `is_email` distinguishes the two shapes.
pub fn check_autolink(buf: &GapBuffer, pos: usize) -> Option<Autolink> {
    if buf.get(pos)? != b'<' {
        return None;
    }
    let inner = pos + 1;
    if let Some(end) = autolink_uri_end(buf, inner) {
        return Some(Autolink {
            span: Span::from_range(inner, end),
            total_len: end + 1 - pos,
            is_email: false,
        });
    }
    if let Some(end) = autolink_email_end(buf, inner) {
        return Some(Autolink {
            span: Span::from_range(inner, end),
            total_len: end + 1 - pos,
            is_email: true,
        });
    }
    None
}

/// Offset of the closing `>` for a URI body starting at `inner`, if the
/// bytes form `scheme ':' uri-chars '>'` with a 2..=32 byte scheme.
fn autolink_uri_end(buf: &GapBuffer, inner: usize) -> Option<usize> {
    if !buf.get(inner)?.is_ascii_alphabetic() {
        return None;
    }
    let mut i = inner;
    while let Some(b) = buf.get(i) {
        if !is_scheme_byte(b) {
            break;
        }
        i += 1;
    }
    let scheme_len = i - inner;
    if !(2..=32).contains(&scheme_len) || buf.get(i)? != b':' {
        return None;
    }
    i += 1;
    while let Some(b) = buf.get(i) {
        match b {
            b'>' => return Some(i),
            b'<' | b' ' | b'\n' => return None,
            _ if b.is_ascii_control() => return None,
            _ => i += 1,
        }
    }
    None
}

/// Offset of the closing `>` for an email body starting at `inner`:
/// local part, `@`, then a domain of alphanumerics, `.` and `-` that
/// contains at least one dot and ends with neither `.` nor `-`.
fn autolink_email_end(buf: &GapBuffer, inner: usize) -> Option<usize> {
    let mut i = inner;
    while let Some(b) = buf.get(i) {
        if b == b'@' || b == b'>' || b == b'<' || b == b' ' || b == b'\n' || !b.is_ascii_graphic() {
            break;
        }
        i += 1;
    }
    if i == inner || buf.get(i)? != b'@' {
        return None;
    }
    let domain_start = i + 1;
    let mut j = domain_start;
    let mut saw_dot = false;
    let mut last = 0u8;
    while let Some(b) = buf.get(j) {
        match b {
            b'>' => {
                if j == domain_start || !saw_dot || last == b'.' || last == b'-' {
                    return None;
                }
                return Some(j);
            }
            b'.' => saw_dot = true,
            b'-' => {}
            _ if b.is_ascii_alphanumeric() => {}
            _ => return None,
        }
        last = b;
        j += 1;
    }
    None
}
