//! Gap-buffer byte storage.
//!
//! The document is a single byte sequence with a movable contiguous free
//! region (the gap). Edits move the gap to the edit site, so a run of
//! keystrokes at one location costs amortized O(1) per byte; random reads
//! translate a logical index across the gap in O(1).
//!
//! Contract:
//! - Concatenating the spans before and after the gap yields the document.
//! - `at(i)` is defined for `0 <= i < len()`; `get` is the non-panicking
//!   probe recognizers use to look past the end.
//! - Only `insert` can fail (`BufferError::OutOfMemory`); a failed insert
//!   leaves the buffer byte-for-byte unchanged.
//! - `codepoint_at` follows UTF-8 continuation rules; malformed input
//!   yields U+FFFD and advances one byte.

use thiserror::Error;

/// Minimum number of free bytes opened when the gap is exhausted.
const GAP_SEED: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("buffer growth failed: allocator refused {requested} additional bytes")]
    OutOfMemory { requested: usize },
}

/// Editable byte sequence with a movable gap.
#[derive(Clone)]
pub struct GapBuffer {
    data: Vec<u8>,
    gap_start: usize,
    gap_end: usize,
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GapBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GapBuffer")
            .field("len", &self.len())
            .field("gap", &(self.gap_start..self.gap_end))
            .finish()
    }
}

impl GapBuffer {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            gap_start: 0,
            gap_end: 0,
        }
    }

    /// Construct from existing text; the gap starts empty at the end.
    pub fn from_str(content: &str) -> Self {
        let data = content.as_bytes().to_vec();
        let len = data.len();
        Self {
            data,
            gap_start: len,
            gap_end: len,
        }
    }

    /// Logical document length in bytes.
    pub fn len(&self) -> usize {
        self.data.len() - self.gap_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn gap_len(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// Translate a logical index to a raw index in `data`.
    #[inline]
    fn raw(&self, i: usize) -> usize {
        if i < self.gap_start {
            i
        } else {
            i + self.gap_len()
        }
    }

    /// Byte at logical index `i`. Panics if `i >= len()`.
    #[inline]
    pub fn at(&self, i: usize) -> u8 {
        assert!(i < self.len(), "byte index {i} out of range");
        self.data[self.raw(i)]
    }

    /// Non-panicking byte probe; `None` past the end.
    #[inline]
    pub fn get(&self, i: usize) -> Option<u8> {
        if i < self.len() {
            Some(self.data[self.raw(i)])
        } else {
            None
        }
    }

    /// True when the bytes at `pos` equal `pat`.
    pub fn starts_with(&self, pos: usize, pat: &[u8]) -> bool {
        if pos + pat.len() > self.len() {
            return false;
        }
        pat.iter().enumerate().all(|(k, &b)| self.at(pos + k) == b)
    }

    /// Fresh copy of the bytes in `[a, b)`, clamped to the document.
    pub fn substr(&self, a: usize, b: usize) -> Vec<u8> {
        let b = b.min(self.len());
        let a = a.min(b);
        let mut out = Vec::with_capacity(b - a);
        if b <= self.gap_start {
            out.extend_from_slice(&self.data[a..b]);
        } else if a >= self.gap_start {
            out.extend_from_slice(&self.data[a + self.gap_len()..b + self.gap_len()]);
        } else {
            out.extend_from_slice(&self.data[a..self.gap_start]);
            out.extend_from_slice(&self.data[self.gap_end..b + self.gap_len()]);
        }
        out
    }

    /// Lossy UTF-8 view of `[a, b)`; replacement characters for malformed bytes.
    pub fn slice_string(&self, a: usize, b: usize) -> String {
        String::from_utf8_lossy(&self.substr(a, b)).into_owned()
    }

    /// Move the gap so that it begins at logical index `to`.
    fn move_gap(&mut self, to: usize) {
        debug_assert!(to <= self.len());
        if to < self.gap_start {
            let shift = self.gap_start - to;
            self.data.copy_within(to..self.gap_start, self.gap_end - shift);
            self.gap_start = to;
            self.gap_end -= shift;
        } else if to > self.gap_start {
            let shift = to - self.gap_start;
            self.data
                .copy_within(self.gap_end..self.gap_end + shift, self.gap_start);
            self.gap_start = to;
            self.gap_end += shift;
        }
    }

    /// Open the gap to at least `need` free bytes. Growth is proportional to
    /// the document so a long typing run amortizes to O(1) per byte.
    fn ensure_gap(&mut self, need: usize) -> Result<(), BufferError> {
        if self.gap_len() >= need {
            return Ok(());
        }
        let grow_by = (need - self.gap_len()).max(self.len() / 2).max(GAP_SEED);
        self.data
            .try_reserve(grow_by)
            .map_err(|_| BufferError::OutOfMemory { requested: grow_by })?;
        let old_len = self.data.len();
        // Capacity is reserved above; this resize cannot reallocate.
        self.data.resize(old_len + grow_by, 0);
        self.data.copy_within(self.gap_end..old_len, self.gap_end + grow_by);
        self.gap_end += grow_by;
        Ok(())
    }

    /// Insert `bytes` before logical index `at` (clamped to the document).
    pub fn insert(&mut self, at: usize, bytes: &[u8]) -> Result<(), BufferError> {
        let at = at.min(self.len());
        self.ensure_gap(bytes.len())?;
        self.move_gap(at);
        self.data[self.gap_start..self.gap_start + bytes.len()].copy_from_slice(bytes);
        self.gap_start += bytes.len();
        Ok(())
    }

    pub fn insert_str(&mut self, at: usize, s: &str) -> Result<(), BufferError> {
        self.insert(at, s.as_bytes())
    }

    /// Delete the bytes in `[a, b)`, clamped to the document.
    pub fn delete(&mut self, a: usize, b: usize) {
        let b = b.min(self.len());
        let a = a.min(b);
        if a == b {
            return;
        }
        self.move_gap(a);
        self.gap_end += b - a;
    }

    /// Decode the codepoint starting at logical index `i`.
    ///
    /// Returns `(char, byte_len)`. Malformed sequences yield `(U+FFFD, 1)`
    /// so a scanner always makes progress; `i >= len()` yields length 0.
    pub fn codepoint_at(&self, i: usize) -> (char, usize) {
        const REPLACEMENT: char = '\u{FFFD}';
        let Some(b0) = self.get(i) else {
            return (REPLACEMENT, 0);
        };
        let seq_len = match b0 {
            0x00..=0x7f => return (b0 as char, 1),
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => return (REPLACEMENT, 1),
        };
        let mut tmp = [0u8; 4];
        for (k, slot) in tmp.iter_mut().enumerate().take(seq_len) {
            match self.get(i + k) {
                Some(b) => *slot = b,
                None => return (REPLACEMENT, 1),
            }
        }
        // from_utf8 rejects overlong forms, surrogates, and bad continuations.
        match std::str::from_utf8(&tmp[..seq_len]) {
            Ok(s) => (s.chars().next().unwrap_or(REPLACEMENT), seq_len),
            Err(_) => (REPLACEMENT, 1),
        }
    }

    /// First byte of the logical line containing `p` (clamped).
    pub fn line_start(&self, p: usize) -> usize {
        let mut i = p.min(self.len());
        while i > 0 && self.at(i - 1) != b'\n' {
            i -= 1;
        }
        i
    }

    /// Offset of the `'\n'` ending the line containing `p`, or `len()`.
    pub fn line_end(&self, p: usize) -> usize {
        let mut i = p.min(self.len());
        while i < self.len() && self.at(i) != b'\n' {
            i += 1;
        }
        i
    }

    /// Entire document as a `String` (lossy).
    pub fn to_string_lossy(&self) -> String {
        self.slice_string(0, self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn insert_and_read_across_gap() {
        let mut b = GapBuffer::from_str("hello world");
        b.insert_str(5, ",").unwrap();
        assert_eq!(b.to_string_lossy(), "hello, world");
        assert_eq!(b.at(5), b',');
        assert_eq!(b.len(), 12);
    }

    #[test]
    fn delete_spanning_previous_edit_site() {
        let mut b = GapBuffer::from_str("abcdef");
        b.insert_str(3, "XYZ").unwrap();
        b.delete(2, 7);
        assert_eq!(b.to_string_lossy(), "abf");
    }

    #[test]
    fn substr_crossing_gap() {
        let mut b = GapBuffer::from_str("abcdef");
        b.insert_str(3, "-").unwrap(); // gap now sits at 4
        assert_eq!(b.substr(1, 6), b"bc-de".to_vec());
        assert_eq!(b.substr(4, 100), b"def".to_vec());
        assert_eq!(b.substr(5, 3), Vec::<u8>::new());
    }

    #[test]
    fn round_trip_insert_delete_restores_bytes() {
        let mut b = GapBuffer::from_str("The quick brown fox");
        let before = b.to_string_lossy();
        b.insert_str(4, "very ").unwrap();
        b.delete(4, 9);
        assert_eq!(b.to_string_lossy(), before);
    }

    #[test]
    fn codepoint_decode_multibyte_and_malformed() {
        let b = GapBuffer::from_str("a\u{00e9}\u{6f22}\u{1f600}");
        assert_eq!(b.codepoint_at(0), ('a', 1));
        assert_eq!(b.codepoint_at(1), ('\u{00e9}', 2));
        assert_eq!(b.codepoint_at(3), ('\u{6f22}', 3));
        assert_eq!(b.codepoint_at(6), ('\u{1f600}', 4));

        // Lone continuation byte decodes to U+FFFD with single-byte advance.
        let mut m = GapBuffer::new();
        m.insert(0, &[b'a', 0x80, b'b']).unwrap();
        assert_eq!(m.codepoint_at(1), ('\u{FFFD}', 1));
        // Truncated sequence at end of document.
        let mut t = GapBuffer::new();
        t.insert(0, &[0xe6]).unwrap();
        assert_eq!(t.codepoint_at(0), ('\u{FFFD}', 1));
    }

    #[test]
    fn line_boundaries() {
        let b = GapBuffer::from_str("one\ntwo\n\nfour");
        assert_eq!(b.line_start(5), 4);
        assert_eq!(b.line_end(5), 7);
        assert_eq!(b.line_start(8), 8); // blank line
        assert_eq!(b.line_end(8), 8);
        assert_eq!(b.line_end(10), 13); // last line has no newline
        // line_start(i) <= i <= line_end(i)
        for i in 0..=b.len() {
            assert!(b.line_start(i) <= i && i <= b.line_end(i));
            for j in b.line_start(i)..b.line_end(i) {
                assert_ne!(b.at(j), b'\n');
            }
        }
    }

    #[test]
    fn empty_item_edges() {
        let b = GapBuffer::new();
        assert_eq!(b.len(), 0);
        assert_eq!(b.get(0), None);
        assert_eq!(b.line_start(0), 0);
        assert_eq!(b.line_end(0), 0);
        assert_eq!(b.codepoint_at(0), ('\u{FFFD}', 0));
    }

    proptest! {
        #[test]
        fn prop_insert_then_delete_is_identity(
            base in "\\PC{0,60}",
            ins in "\\PC{1,20}",
            at_frac in 0.0f64..1.0,
        ) {
            let mut b = GapBuffer::from_str(&base);
            let before = b.to_string_lossy();
            let at = ((base.len() as f64) * at_frac) as usize;
            // Snap to a char boundary so the comparison is well-defined.
            let at = (0..=at).rev().find(|&i| base.is_char_boundary(i)).unwrap_or(0);
            b.insert_str(at, &ins).unwrap();
            b.delete(at, at + ins.len());
            prop_assert_eq!(b.to_string_lossy(), before);
        }

        #[test]
        fn prop_substr_matches_reference(base in "\\PC{0,60}", a in 0usize..80, b2 in 0usize..80) {
            let buf = GapBuffer::from_str(&base);
            let hi = b2.min(base.len());
            let lo = a.min(hi);
            let lo = (0..=lo).rev().find(|&i| base.is_char_boundary(i)).unwrap_or(0);
            let hi = (hi..=base.len()).find(|&i| base.is_char_boundary(i)).unwrap_or(base.len());
            prop_assert_eq!(buf.substr(lo, hi), base.as_bytes()[lo..hi].to_vec());
        }
    }
}
