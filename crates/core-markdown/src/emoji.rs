//! Emoji shortcode resolution (`:name:`).
//!
//! Names are 1..=64 bytes of alphanumerics, `_`, `-`, `+`, starting with an
//! alphanumeric or `+`/`-`, resolved through a static table sorted for
//! binary search. Unknown names are left alone for the renderer to print
//! verbatim.

use core_text::GapBuffer;

const MAX_NAME: usize = 64;

/// Sorted by name; `check_shortcode` binary-searches it.
static SHORTCODES: &[(&str, &str)] = &[
    ("+1", "\u{1f44d}"),
    ("-1", "\u{1f44e}"),
    ("100", "\u{1f4af}"),
    ("airplane", "\u{2708}\u{fe0f}"),
    ("apple", "\u{1f34e}"),
    ("art", "\u{1f3a8}"),
    ("bell", "\u{1f514}"),
    ("book", "\u{1f4d6}"),
    ("boom", "\u{1f4a5}"),
    ("bug", "\u{1f41b}"),
    ("bulb", "\u{1f4a1}"),
    ("cat", "\u{1f431}"),
    ("clap", "\u{1f44f}"),
    ("cloud", "\u{2601}\u{fe0f}"),
    ("coffee", "\u{2615}"),
    ("computer", "\u{1f4bb}"),
    ("construction", "\u{1f6a7}"),
    ("cry", "\u{1f622}"),
    ("dog", "\u{1f436}"),
    ("eyes", "\u{1f440}"),
    ("fire", "\u{1f525}"),
    ("gift", "\u{1f381}"),
    ("grin", "\u{1f601}"),
    ("heart", "\u{2764}\u{fe0f}"),
    ("hourglass", "\u{231b}"),
    ("joy", "\u{1f602}"),
    ("key", "\u{1f511}"),
    ("laughing", "\u{1f606}"),
    ("lock", "\u{1f512}"),
    ("mag", "\u{1f50d}"),
    ("memo", "\u{1f4dd}"),
    ("moon", "\u{1f319}"),
    ("muscle", "\u{1f4aa}"),
    ("ok_hand", "\u{1f44c}"),
    ("package", "\u{1f4e6}"),
    ("pencil", "\u{270f}\u{fe0f}"),
    ("point_right", "\u{1f449}"),
    ("pray", "\u{1f64f}"),
    ("question", "\u{2753}"),
    ("rainbow", "\u{1f308}"),
    ("rocket", "\u{1f680}"),
    ("rotating_light", "\u{1f6a8}"),
    ("smile", "\u{1f604}"),
    ("smiley", "\u{1f603}"),
    ("sparkles", "\u{2728}"),
    ("star", "\u{2b50}"),
    ("sunny", "\u{2600}\u{fe0f}"),
    ("tada", "\u{1f389}"),
    ("thinking", "\u{1f914}"),
    ("thumbsdown", "\u{1f44e}"),
    ("thumbsup", "\u{1f44d}"),
    ("warning", "\u{26a0}\u{fe0f}"),
    ("wave", "\u{1f44b}"),
    ("wrench", "\u{1f527}"),
    ("x", "\u{274c}"),
    ("zap", "\u{26a1}"),
];

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'+'
}

/// `:name:` at `pos`; returns the replacement and total source length.
pub fn check_shortcode(buf: &GapBuffer, pos: usize) -> Option<(&'static str, usize)> {
    if buf.get(pos)? != b':' {
        return None;
    }
    let name_start = pos + 1;
    let first = buf.get(name_start)?;
    if !(first.is_ascii_alphanumeric() || first == b'+' || first == b'-') {
        return None;
    }
    let mut tmp = [0u8; MAX_NAME];
    let mut len = 0usize;
    loop {
        match buf.get(name_start + len)? {
            b':' => break,
            b if is_name_byte(b) => {
                if len == MAX_NAME {
                    return None;
                }
                tmp[len] = b;
                len += 1;
            }
            _ => return None,
        }
    }
    if len == 0 {
        return None;
    }
    let name = std::str::from_utf8(&tmp[..len]).ok()?;
    SHORTCODES
        .binary_search_by(|(n, _)| n.cmp(&name))
        .ok()
        .map(|i| (SHORTCODES[i].1, len + 2))
}
