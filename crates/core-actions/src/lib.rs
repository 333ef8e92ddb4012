//! Navigation and edit dispatch.
//!
//! `nav` holds the pure motion functions; `edit` the mutating operations.
//! `apply_motion` is the seam the binary drives: it threads the sticky
//! visual column through vertical motions, drops it on horizontal ones,
//! and leaves selection semantics to the state (a motion while selecting
//! moves only the cursor).
//!
//! Ordering guarantee: block-aware motions consult the block cache, so
//! callers reparse before navigating; the state's mutation entry points
//! already do.

pub mod edit;
pub mod nav;

pub use edit::{backspace, delete_forward, delete_selection, insert_newline, insert_text};
pub use nav::{
    move_line, move_visual_line, move_visual_line_block_aware, next_grapheme, prev_grapheme,
    skip_block_backward, skip_block_forward, word_left, word_right,
};

use core_state::EditorState;
use tracing::trace;

/// One cursor motion. Visual motions carry the wrap width in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    WordLeft,
    WordRight,
    LineUp,
    LineDown,
    VisualUp { width: usize },
    VisualDown { width: usize },
    LineStart,
    LineEnd,
    DocStart,
    DocEnd,
    BlockForward,
    BlockBackward,
}

/// Apply `motion` to the state's cursor. Always lands on a valid byte
/// offset; vertical motions preserve the sticky visual column across
/// repeats and every other motion resets it.
pub fn apply_motion(state: &mut EditorState, motion: Motion) {
    let before = state.cursor;
    match motion {
        Motion::Left => {
            state.cursor = nav::prev_grapheme(state.buffer(), state.cursor);
            state.drop_sticky_col();
        }
        Motion::Right => {
            state.cursor = nav::next_grapheme(state.buffer(), state.cursor);
            state.drop_sticky_col();
        }
        Motion::WordLeft => {
            state.cursor = nav::word_left(state.buffer(), state.cursor);
            state.drop_sticky_col();
        }
        Motion::WordRight => {
            state.cursor = nav::word_right(state.buffer(), state.cursor);
            state.drop_sticky_col();
        }
        Motion::LineUp => {
            let (p, sticky) = nav::move_line(state.buffer(), state.cursor, -1, state.sticky_col());
            state.cursor = p;
            state.set_sticky_col(sticky);
        }
        Motion::LineDown => {
            let (p, sticky) = nav::move_line(state.buffer(), state.cursor, 1, state.sticky_col());
            state.cursor = p;
            state.set_sticky_col(sticky);
        }
        Motion::VisualUp { width } => {
            let (p, sticky) = nav::move_visual_line_block_aware(
                state.buffer(),
                state.cache(),
                state.cursor,
                -1,
                width,
                true,
                state.sticky_col(),
            );
            state.cursor = p;
            state.set_sticky_col(sticky);
        }
        Motion::VisualDown { width } => {
            let (p, sticky) = nav::move_visual_line_block_aware(
                state.buffer(),
                state.cache(),
                state.cursor,
                1,
                width,
                true,
                state.sticky_col(),
            );
            state.cursor = p;
            state.set_sticky_col(sticky);
        }
        Motion::LineStart => {
            state.cursor = state.buffer().line_start(state.cursor);
            state.drop_sticky_col();
        }
        Motion::LineEnd => {
            state.cursor = state.buffer().line_end(state.cursor);
            state.drop_sticky_col();
        }
        Motion::DocStart => {
            state.cursor = 0;
            state.drop_sticky_col();
        }
        Motion::DocEnd => {
            state.cursor = state.buffer().len();
            state.drop_sticky_col();
        }
        Motion::BlockForward => {
            state.cursor = nav::skip_block_forward(state.buffer(), state.cache(), state.cursor);
            state.drop_sticky_col();
        }
        Motion::BlockBackward => {
            state.cursor = nav::skip_block_backward(state.cache(), state.cursor);
            state.drop_sticky_col();
        }
    }
    trace!(target: "actions.nav", ?motion, from = before, to = state.cursor, "motion");
}
