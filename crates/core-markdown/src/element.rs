//! Element lookup at the cursor.
//!
//! `find_element_at` answers "what inline element is the cursor inside?"
//! for follow-link, edit-image, and preview actions. It back-scans a
//! bounded window and keeps the smallest enclosing match so nested shapes
//! (a footnote inside a sentence holding a link) resolve to the innermost
//! element.

use crate::inline;
use crate::{Autolink, FootnoteRef, ImageAttrs, Match1, Match2, Span};
use core_text::GapBuffer;

/// How far behind the cursor candidate starts are probed.
pub const ELEMENT_SCAN_BACK: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementAt {
    Image(ImageAttrs),
    Link(Match2),
    Footnote(FootnoteRef),
    Math(Match1),
    Autolink(Autolink),
}

fn consider(best: &mut Option<(ElementAt, Span)>, candidate: ElementAt, span: Span) {
    match best {
        Some((_, held)) if held.len <= span.len => {}
        _ => *best = Some((candidate, span)),
    }
}

/// Smallest image / link / footnote / inline-math / autolink element whose
/// source span contains `cursor`.
pub fn find_element_at(buf: &GapBuffer, cursor: usize) -> Option<(ElementAt, Span)> {
    let cursor = cursor.min(buf.len());
    let lo = cursor.saturating_sub(ELEMENT_SCAN_BACK);
    let mut best: Option<(ElementAt, Span)> = None;
    for start in lo..=cursor {
        let encloses = |total: usize| start <= cursor && cursor < start + total;
        if let Some(img) = inline::check_image(buf, start)
            && encloses(img.total_len)
        {
            consider(&mut best, ElementAt::Image(img), Span::new(start, img.total_len));
        }
        if let Some(link) = inline::check_link(buf, start)
            && encloses(link.total_len)
        {
            consider(&mut best, ElementAt::Link(link), Span::new(start, link.total_len));
        }
        if let Some(fr) = inline::check_footnote(buf, start)
            && encloses(fr.total_len)
        {
            consider(&mut best, ElementAt::Footnote(fr), Span::new(start, fr.total_len));
        }
        if let Some(m) = inline::check_inline_math(buf, start)
            && encloses(m.total_len)
        {
            consider(&mut best, ElementAt::Math(m), Span::new(start, m.total_len));
        }
        if let Some(a) = inline::check_autolink(buf, start)
            && encloses(a.total_len)
        {
            consider(&mut best, ElementAt::Autolink(a), Span::new(start, a.total_len));
        }
    }
    best
}
