//! End-to-end editing flows: typing Markdown into an empty document,
//! selection edits, undo, and block-aware navigation working against the
//! live block cache.

use core_actions::{Motion, apply_motion, backspace, insert_newline, insert_text};
use core_markdown::BlockKind;
use core_state::EditorState;

#[test]
fn typing_a_document_keeps_cache_live() {
    let mut st = EditorState::new("");
    insert_text(&mut st, "# Notes").unwrap();
    insert_newline(&mut st).unwrap();
    insert_newline(&mut st).unwrap();
    insert_text(&mut st, "- first").unwrap();
    assert!(matches!(
        st.cache().blocks()[0].kind,
        BlockKind::Header { level: 1, .. }
    ));
    assert!(matches!(
        st.cache().blocks()[1].kind,
        BlockKind::ListItem { .. }
    ));

    // Demote the header marker; the cache follows.
    apply_motion(&mut st, Motion::DocStart);
    let cursor = st.cursor;
    assert_eq!(cursor, 0);
    st.cursor = 1;
    backspace(&mut st);
    assert!(matches!(
        st.cache().blocks()[0].kind,
        BlockKind::Paragraph
    ));
}

#[test]
fn selection_replace_then_undo_restores_both_stages() {
    let mut st = EditorState::new("alpha beta gamma\n");
    st.cursor = 6;
    st.set_selecting(true);
    apply_motion(&mut st, Motion::WordRight);
    assert_eq!(st.selection_range(), (6, 11));
    insert_text(&mut st, "B ").unwrap();
    assert_eq!(st.buffer().to_string_lossy(), "alpha B gamma\n");
    assert!(st.undo());
    assert_eq!(st.buffer().to_string_lossy(), "alpha beta gamma\n");
}

#[test]
fn visual_navigation_skips_atomic_blocks() {
    let doc = "intro line\n\n```\nlet x = 1;\nlet y = 2;\n```\n\noutro line\n";
    let mut st = EditorState::new(doc);
    // Down from the intro: blank line, then the fence line, then one step
    // consumes the whole block.
    st.cursor = 3;
    apply_motion(&mut st, Motion::VisualDown { width: 40 });
    assert_eq!(st.cursor, 11);
    apply_motion(&mut st, Motion::VisualDown { width: 40 });
    assert_eq!(st.cursor, 12);
    apply_motion(&mut st, Motion::VisualDown { width: 40 });
    let code_end = doc.find("```\n\n").unwrap() + 4;
    assert_eq!(st.cursor, code_end);

    // Upward from below the block jumps back over it once a step lands
    // inside.
    st.cursor = doc.find("outro").unwrap();
    apply_motion(&mut st, Motion::VisualUp { width: 40 });
    apply_motion(&mut st, Motion::VisualUp { width: 40 });
    assert_eq!(st.cursor, doc.rfind("```").unwrap()); // closing fence line
    apply_motion(&mut st, Motion::VisualUp { width: 40 });
    let before_code = doc.find("\n```").unwrap();
    assert_eq!(st.cursor, before_code);
}

#[test]
fn block_skip_motions() {
    let doc = "| a |\n| - |\n| 1 |\ntail\n";
    let mut st = EditorState::new(doc);
    st.cursor = 7; // inside the delimiter row
    apply_motion(&mut st, Motion::BlockForward);
    assert_eq!(st.cursor, doc.find("tail").unwrap());
    st.cursor = 7;
    apply_motion(&mut st, Motion::BlockBackward);
    assert_eq!(st.cursor, 0);
}

#[test]
fn word_count_follows_edits() {
    let mut st = EditorState::new("one two\n");
    assert_eq!(st.word_count(), 2);
    insert_text(&mut st, "three ").unwrap();
    assert_eq!(st.word_count(), 3);
}
