//! Rendering: theme palettes, style resolution, the grapheme output
//! driver, and styled source rendering.
//!
//! Exposed components:
//! - `theme`: dark/light palettes.
//! - `style`: `apply_style` (Markdown style bits to concrete attributes
//!   plus the glyph scale regime) and `get_scale` for layout math.
//! - `output`: `OutputCtx` (ambient scale, capability downgrades applied
//!   once), the `RenderSurface` seam, and `output_grapheme`.
//! - `render`: whole-document styled source rendering with wrapping,
//!   scroll clipping, and cursor geometry.
//!
//! The renderer borrows the buffer and the block cache; it owns neither
//! and never mutates. Backends live behind `RenderSurface`, and nothing
//! here keeps a backend pointer across calls.

pub mod output;
pub mod render;
pub mod style;
pub mod theme;

pub use output::{OutputCtx, RecordingSurface, RenderSurface, TermSurface, output_grapheme};
pub use render::{RenderOpts, RenderedDoc, render_document};
pub use style::{FracScale, StyleRun, apply_style, get_scale, header_scale};
pub use theme::Theme;
