//! Editor state: document buffer, block cache, cursor, selection, sticky
//! visual column, undo engine, and word-count cache.
//!
//! Ownership:
//! - The state owns the gap buffer and the block cache; recognizers and
//!   navigation borrow them immutably.
//! - Every mutation flows through `apply_insert` / `apply_delete` /
//!   `replace_from_snapshot`, which keep the cache patched, clamp the
//!   cursor and selection anchor, and invalidate the word-count cache.
//!   Offsets held outside the state are invalid after any of them.
//!
//! The word count is keyed on nothing: it is dropped on every mutation and
//! recomputed lazily, so same-length edits can never serve a stale value.

use core_markdown::BlockCache;
use core_text::{BufferError, GapBuffer};
use tracing::trace;

pub mod selection;
pub mod undo;

pub use selection::Selection;
pub use undo::{EditSnapshot, InsertRun, UNDO_HISTORY_MAX, UndoEngine};

pub struct EditorState {
    buffer: GapBuffer,
    cache: BlockCache,
    pub cursor: usize,
    sticky_col: Option<usize>,
    selection: Selection,
    undo: UndoEngine,
    word_count: Option<usize>,
    pub dirty: bool,
}

impl EditorState {
    pub fn new(content: &str) -> Self {
        let buffer = GapBuffer::from_str(content);
        let cache = BlockCache::from_buffer(&buffer);
        Self {
            buffer,
            cache,
            cursor: 0,
            sticky_col: None,
            selection: Selection::new(),
            undo: UndoEngine::new(),
            word_count: None,
            dirty: false,
        }
    }

    pub fn buffer(&self) -> &GapBuffer {
        &self.buffer
    }

    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    // --- sticky visual column (vertical motion) ---

    pub fn sticky_col(&self) -> Option<usize> {
        self.sticky_col
    }

    pub fn set_sticky_col(&mut self, col: Option<usize>) {
        self.sticky_col = col;
    }

    /// Horizontal motion and edits reset the remembered column.
    pub fn drop_sticky_col(&mut self) {
        self.sticky_col = None;
    }

    // --- selection ---

    pub fn is_selecting(&self) -> bool {
        self.selection.is_selecting()
    }

    pub fn set_selecting(&mut self, on: bool) {
        self.selection.set_selecting(on, self.cursor);
    }

    /// Normalized `[lo, hi)`; collapsed to the cursor when not selecting.
    pub fn selection_range(&self) -> (usize, usize) {
        self.selection.range(self.cursor)
    }

    pub fn has_selection(&self) -> bool {
        self.selection.has_selection(self.cursor)
    }

    // --- undo ---

    pub fn begin_insert_run(&mut self) {
        self.undo.begin_insert_coalescing(self.cursor, &self.buffer);
    }

    pub fn end_insert_run(&mut self) {
        self.undo.end_insert_coalescing();
    }

    pub fn note_insert_edit(&mut self) {
        self.undo.note_insert_edit();
    }

    pub fn snapshot_discrete(&mut self) {
        self.undo.push_discrete_edit_snapshot(self.cursor, &self.buffer);
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    /// Restore the previous snapshot. Returns false with state untouched
    /// when history is empty.
    pub fn undo(&mut self) -> bool {
        let Some(snap) = self.undo.undo(self.cursor, &self.buffer) else {
            return false;
        };
        self.replace_from_snapshot(snap);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snap) = self.undo.redo(self.cursor, &self.buffer) else {
            return false;
        };
        self.replace_from_snapshot(snap);
        true
    }

    fn replace_from_snapshot(&mut self, snap: EditSnapshot) {
        self.buffer = snap.buffer;
        self.cursor = snap.cursor.min(self.buffer.len());
        self.cache.rebuild(&self.buffer);
        self.after_mutation();
    }

    // --- mutation ---

    /// Insert `text` before `at`. On allocation failure the document, the
    /// cache, and the cursor are all unchanged.
    pub fn apply_insert(&mut self, at: usize, text: &str) -> Result<(), BufferError> {
        let at = at.min(self.buffer.len());
        self.buffer.insert_str(at, text)?;
        self.cache.apply_edit(&self.buffer, at, 0, text.len());
        if self.cursor >= at {
            self.cursor += text.len();
        }
        self.after_mutation();
        trace!(target: "state.edit", at, bytes = text.len(), "insert_applied");
        Ok(())
    }

    /// Delete `[a, b)` (clamped). Returns the number of bytes removed.
    pub fn apply_delete(&mut self, a: usize, b: usize) -> usize {
        let b = b.min(self.buffer.len());
        let a = a.min(b);
        if a == b {
            return 0;
        }
        self.buffer.delete(a, b);
        self.cache.apply_edit(&self.buffer, a, b - a, 0);
        if self.cursor >= b {
            self.cursor -= b - a;
        } else if self.cursor > a {
            self.cursor = a;
        }
        self.after_mutation();
        trace!(target: "state.edit", a, b, "delete_applied");
        b - a
    }

    fn after_mutation(&mut self) {
        self.word_count = None;
        self.sticky_col = None;
        self.selection.clamp_to(self.buffer.len());
        self.dirty = true;
    }

    // --- word count ---

    /// ASCII-whitespace-separated word count, recomputed lazily after any
    /// mutation.
    pub fn word_count(&mut self) -> usize {
        if let Some(n) = self.word_count {
            return n;
        }
        let mut count = 0usize;
        let mut in_word = false;
        for i in 0..self.buffer.len() {
            let blank = self.buffer.at(i).is_ascii_whitespace();
            if !blank && !in_word {
                count += 1;
            }
            in_word = !blank;
        }
        self.word_count = Some(count);
        count
    }
}
