//! Snapshot undo engine.
//!
//! Coalescing policy:
//! - A contiguous typing run (inserts and backspaces) is captured by one
//!   snapshot taken lazily at the first mutation of the run.
//! - A newline or an explicit boundary (leaving edit flow) ends the run;
//!   the next edit starts a fresh one.
//! - Discrete edits (delete-selection, block operations) snapshot
//!   immediately so each undoes on its own.
//! - Successive snapshots of identical content are skipped via a content
//!   hash; any new snapshot clears the redo stack.

use core_text::GapBuffer;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use tracing::trace;

/// Maximum number of snapshots retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 200;

/// A full-state snapshot for undo/redo (coarse clone for simplicity).
#[derive(Clone)]
pub struct EditSnapshot {
    pub buffer: GapBuffer,
    pub cursor: usize,
    /// Content hash of the buffer at capture time.
    pub hash: u64,
}

/// Typing-run tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertRun {
    Inactive,
    Active { edits: u32 },
}

pub struct UndoEngine {
    undo_stack: Vec<EditSnapshot>,
    redo_stack: Vec<EditSnapshot>,
    insert_run: InsertRun,
}

fn buffer_hash(buf: &GapBuffer) -> u64 {
    let mut h = DefaultHasher::new();
    h.write(&buf.substr(0, buf.len()));
    h.finish()
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoEngine {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            insert_run: InsertRun::Inactive,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn insert_run(&self) -> InsertRun {
        self.insert_run
    }

    pub fn push_snapshot(&mut self, cursor: usize, buffer: &GapBuffer) {
        let hash = buffer_hash(buffer);
        if let Some(last) = self.undo_stack.last()
            && last.hash == hash
        {
            trace!(target: "state.undo", undo_depth = self.undo_stack.len(), hash, "snapshot_dedupe_skip");
            return;
        }
        self.undo_stack.push(EditSnapshot {
            buffer: buffer.clone(),
            cursor,
            hash,
        });
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), hash, "push_snapshot");
        if self.undo_stack.len() > UNDO_HISTORY_MAX {
            self.undo_stack.remove(0);
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
        self.redo_stack.clear();
    }

    /// Open a typing run, snapshotting the pre-run state once.
    pub fn begin_insert_coalescing(&mut self, cursor: usize, buffer: &GapBuffer) {
        if matches!(self.insert_run, InsertRun::Inactive) {
            self.push_snapshot(cursor, buffer);
            self.insert_run = InsertRun::Active { edits: 0 };
        }
    }

    pub fn end_insert_coalescing(&mut self) {
        self.insert_run = InsertRun::Inactive;
    }

    pub fn note_insert_edit(&mut self) {
        if let InsertRun::Active { edits } = &mut self.insert_run {
            *edits += 1;
        }
    }

    /// Snapshot immediately for a discrete (non-coalesced) edit.
    pub fn push_discrete_edit_snapshot(&mut self, cursor: usize, buffer: &GapBuffer) {
        self.end_insert_coalescing();
        self.push_snapshot(cursor, buffer);
    }

    /// Pop an undo snapshot, stashing the current state for redo.
    pub fn undo(&mut self, cursor: usize, buffer: &GapBuffer) -> Option<EditSnapshot> {
        let snap = self.undo_stack.pop()?;
        self.redo_stack.push(EditSnapshot {
            buffer: buffer.clone(),
            cursor,
            hash: buffer_hash(buffer),
        });
        self.insert_run = InsertRun::Inactive;
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        Some(snap)
    }

    /// Pop a redo snapshot, stashing the current state for undo.
    pub fn redo(&mut self, cursor: usize, buffer: &GapBuffer) -> Option<EditSnapshot> {
        let snap = self.redo_stack.pop()?;
        self.undo_stack.push(EditSnapshot {
            buffer: buffer.clone(),
            cursor,
            hash: buffer_hash(buffer),
        });
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "redo_pop");
        Some(snap)
    }
}
