//! Edit operations over `EditorState`.
//!
//! All text entering the document is normalized to NFC first, so a
//! decomposed paste and its precomposed twin produce identical bytes.
//! Each operation wires the undo engine (typing coalesces, discrete edits
//! snapshot immediately), honors the selection, and leaves the block
//! cache patched through the state's mutation entry points.

use crate::nav::{next_grapheme, prev_grapheme};
use core_state::EditorState;
use core_text::BufferError;
use tracing::trace;
use unicode_normalization::UnicodeNormalization;

/// Replace the selection (if any) with `text` at the cursor. Typing runs
/// coalesce into one undo snapshot; an inserted newline closes the run.
pub fn insert_text(state: &mut EditorState, text: &str) -> Result<(), BufferError> {
    if text.is_empty() {
        return Ok(());
    }
    let normalized: String = text.nfc().collect();
    state.begin_insert_run();
    state.note_insert_edit();
    if state.has_selection() {
        let (lo, hi) = state.selection_range();
        state.apply_delete(lo, hi);
        state.set_selecting(false);
        state.cursor = lo;
    }
    let at = state.cursor;
    state.apply_insert(at, &normalized)?;
    trace!(target: "actions.edit", op = "insert", at, bytes = normalized.len(), "edit");
    if normalized.contains('\n') {
        state.end_insert_run();
    }
    Ok(())
}

pub fn insert_newline(state: &mut EditorState) -> Result<(), BufferError> {
    insert_text(state, "\n")
}

/// Delete the selection, or the grapheme cluster before the cursor.
pub fn backspace(state: &mut EditorState) {
    if delete_selection(state) {
        return;
    }
    let at = state.cursor;
    let prev = prev_grapheme(state.buffer(), at);
    if prev == at {
        return;
    }
    state.begin_insert_run();
    state.note_insert_edit();
    let crossed_line = state.buffer().at(prev) == b'\n';
    state.apply_delete(prev, at);
    state.cursor = prev;
    trace!(target: "actions.edit", op = "backspace", at, to = prev, crossed_line, "edit");
}

/// Delete the selection, or the grapheme cluster under the cursor.
pub fn delete_forward(state: &mut EditorState) {
    if delete_selection(state) {
        return;
    }
    let at = state.cursor;
    let next = next_grapheme(state.buffer(), at);
    if next == at {
        return;
    }
    state.snapshot_discrete();
    state.apply_delete(at, next);
    trace!(target: "actions.edit", op = "delete_forward", at, to = next, "edit");
}

/// Remove the selected range; false when the selection is empty.
pub fn delete_selection(state: &mut EditorState) -> bool {
    if !state.has_selection() {
        return false;
    }
    let (lo, hi) = state.selection_range();
    state.snapshot_discrete();
    state.apply_delete(lo, hi);
    state.set_selecting(false);
    state.cursor = lo;
    trace!(target: "actions.edit", op = "delete_selection", lo, hi, "edit");
    true
}
