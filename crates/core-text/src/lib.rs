//! Text storage and measurement primitives.
//!
//! This crate owns the byte-level substrate everything else builds on:
//! the gap buffer, UTF-8 decoding, grapheme cluster extents with terminal
//! cell widths, and the wrap-point search used by visual line layout.
//!
//! Invariants:
//! - All document positions are byte offsets into the gap buffer; any
//!   mutation invalidates offsets held outside the buffer.
//! - All width decisions flow through `grapheme_width`; no caller measures
//!   codepoints directly.
//! - Measurement never mutates and never panics on out-of-range input
//!   (ranges clamp to the document).

pub mod buffer;
pub mod width;
pub mod wrap;

pub use buffer::{BufferError, GapBuffer};
pub use width::grapheme_width;
pub use wrap::{display_width, find_wrap_point};
