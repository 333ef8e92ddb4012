//! Anchor + cursor selection model.
//!
//! The anchor latches when selecting transitions from off to on; cursor
//! motion while selecting moves only the cursor. All positions are byte
//! offsets into the document.

/// Selection state; the cursor itself lives in `EditorState` and is passed
/// in where a range is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    anchor: usize,
    selecting: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Turn selecting on or off. The anchor is captured only on the
    /// off-to-on transition; turning it on again is a no-op.
    pub fn set_selecting(&mut self, on: bool, cursor: usize) {
        if on && !self.selecting {
            self.anchor = cursor;
        }
        self.selecting = on;
    }

    /// Normalized `[lo, hi)` range. Collapsed to the cursor when not
    /// selecting.
    pub fn range(&self, cursor: usize) -> (usize, usize) {
        if !self.selecting {
            return (cursor, cursor);
        }
        (self.anchor.min(cursor), self.anchor.max(cursor))
    }

    pub fn has_selection(&self, cursor: usize) -> bool {
        let (lo, hi) = self.range(cursor);
        lo < hi
    }

    /// Re-clamp the anchor after a mutation invalidated offsets.
    pub fn clamp_to(&mut self, len: usize) {
        if self.anchor > len {
            self.anchor = len;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_latches_on_transition_only() {
        let mut s = Selection::new();
        s.set_selecting(true, 5);
        assert_eq!(s.anchor(), 5);
        s.set_selecting(true, 9); // already selecting: anchor unchanged
        assert_eq!(s.anchor(), 5);
        s.set_selecting(false, 9);
        s.set_selecting(true, 2);
        assert_eq!(s.anchor(), 2);
    }

    #[test]
    fn range_normalizes_and_collapses() {
        let mut s = Selection::new();
        assert_eq!(s.range(7), (7, 7));
        assert!(!s.has_selection(7));
        s.set_selecting(true, 10);
        assert_eq!(s.range(4), (4, 10));
        assert_eq!(s.range(15), (10, 15));
        assert!(s.has_selection(15));
        assert!(!s.has_selection(10)); // cursor at anchor: empty
    }
}
