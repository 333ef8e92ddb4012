//! GFM table recognition.
//!
//! A table is a header row, a delimiter row directly below it with the
//! same column count, and zero or more body rows; the first line that does
//! not parse as a row ends the table. Cell boundaries split on unescaped
//! `|` with ASCII spaces trimmed. Leading and trailing pipes are optional
//! and counted independently: both present means cells = pipes - 1, one
//! present means cells = pipes, neither means cells = pipes + 1.

use crate::Span;
use core_text::GapBuffer;

pub const MAX_COLS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellAlign {
    #[default]
    Default,
    Left,
    Right,
    Center,
}

/// Table recognition result. `row_count` counts the header and body rows;
/// the delimiter row shapes `align` but is not itself a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableShape {
    pub col_count: usize,
    pub row_count: usize,
    pub align: [CellAlign; MAX_COLS],
    pub total_len: usize,
}

/// One parsed row: trimmed cell spans plus the offset past the row's line
/// (including its newline when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<Span>,
    pub end: usize,
}

/// Parse the line at `pos` as a table row. A row needs at least one
/// unescaped pipe and must not be blank.
pub fn check_table_row(buf: &GapBuffer, pos: usize) -> Option<TableRow> {
    let ls = buf.line_start(pos.min(buf.len()));
    let le = buf.line_end(ls);
    if ls == le {
        return None;
    }
    let mut pipes = Vec::new();
    let mut i = ls;
    while i < le {
        if buf.at(i) == b'|' && (i == ls || buf.at(i - 1) != b'\\') {
            pipes.push(i);
        }
        i += 1;
    }
    if pipes.is_empty() {
        return None;
    }
    let mut first_content = ls;
    while first_content < le && buf.at(first_content) == b' ' {
        first_content += 1;
    }
    let mut last_content = le;
    while last_content > first_content && buf.at(last_content - 1) == b' ' {
        last_content -= 1;
    }
    let has_lead = pipes.first() == Some(&first_content);
    let has_trail = pipes.last() == Some(&(last_content - 1)) && last_content > first_content;

    let mut bounds = Vec::with_capacity(pipes.len() + 2);
    bounds.push(ls);
    for p in &pipes {
        bounds.push(*p); // segment ends before the pipe
        bounds.push(p + 1); // next segment starts after it
    }
    bounds.push(le);
    let mut segments: Vec<Span> = bounds
        .chunks(2)
        .map(|c| Span::from_range(c[0], c[1]))
        .collect();
    if has_lead {
        segments.remove(0);
    }
    if has_trail {
        segments.pop();
    }
    let cells = segments
        .into_iter()
        .map(|s| trim_ascii_spaces(buf, s))
        .collect();
    let end = if le < buf.len() { le + 1 } else { le };
    Some(TableRow { cells, end })
}

fn trim_ascii_spaces(buf: &GapBuffer, span: Span) -> Span {
    let mut a = span.start;
    let mut b = span.end();
    while a < b && buf.at(a) == b' ' {
        a += 1;
    }
    while b > a && buf.at(b - 1) == b' ' {
        b -= 1;
    }
    Span::from_range(a, b)
}

/// Alignment encoded by a delimiter cell: optional `:`, one or more `-`,
/// optional `:`; anything else disqualifies the row.
fn delimiter_alignment(buf: &GapBuffer, cell: Span) -> Option<CellAlign> {
    let mut i = cell.start;
    let end = cell.end();
    let left = i < end && buf.at(i) == b':';
    if left {
        i += 1;
    }
    let mut dashes = 0usize;
    while i < end && buf.at(i) == b'-' {
        dashes += 1;
        i += 1;
    }
    let right = i < end && buf.at(i) == b':';
    if right {
        i += 1;
    }
    if dashes == 0 || i != end {
        return None;
    }
    Some(match (left, right) {
        (true, true) => CellAlign::Center,
        (true, false) => CellAlign::Left,
        (false, true) => CellAlign::Right,
        (false, false) => CellAlign::Default,
    })
}

/// Full table match starting at the line containing `pos`.
pub fn check_table(buf: &GapBuffer, pos: usize) -> Option<TableShape> {
    let header = check_table_row(buf, pos)?;
    let col_count = header.cells.len();
    if col_count == 0 || col_count > MAX_COLS {
        return None;
    }
    if header.end >= buf.len() {
        return None; // nothing below the header row
    }
    let delim = check_table_row(buf, header.end)?;
    if delim.cells.len() != col_count {
        return None;
    }
    let mut align = [CellAlign::Default; MAX_COLS];
    for (k, cell) in delim.cells.iter().enumerate() {
        align[k] = delimiter_alignment(buf, *cell)?;
    }
    let mut row_count = 1usize; // the header
    let mut end = delim.end;
    while end < buf.len() {
        match check_table_row(buf, end) {
            Some(row) => {
                row_count += 1;
                end = row.end;
            }
            None => break,
        }
    }
    Some(TableShape {
        col_count,
        row_count,
        align,
        total_len: end - pos,
    })
}
