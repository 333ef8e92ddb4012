//! Terminal capability probing.
//!
//! Records the glyph-scaling features the renderer can consult when
//! deciding between scaled text, integer-only scaling, and color
//! fallbacks for headers.
//!
//! Design considerations:
//! * Must be cheap: detection runs once at startup.
//! * Conservative: a terminal that does not advertise the text-sizing
//!   protocol gets colored-header fallback rather than garbled output.
//! * Extensible: the struct is non-exhaustive so additional capabilities
//!   can be added without breaking downstream code.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TerminalCapabilities {
    /// Integer glyph scaling (the text-sizing protocol).
    pub supports_text_scaling: bool,
    /// Fractional numerator/denominator scaling on top of integer scale.
    pub supports_fractional_scaling: bool,
}

impl TerminalCapabilities {
    pub const fn new(supports_text_scaling: bool, supports_fractional_scaling: bool) -> Self {
        Self {
            supports_text_scaling,
            supports_fractional_scaling,
        }
    }

    /// Probe once at startup. Kitty advertises the text-sizing protocol
    /// (and its fractional extension) through its environment; everything
    /// else gets the conservative no-scaling answer.
    pub fn detect() -> Self {
        let term = std::env::var("TERM").unwrap_or_default();
        let kitty = term.contains("kitty") || std::env::var_os("KITTY_WINDOW_ID").is_some();
        Self {
            supports_text_scaling: kitty,
            supports_fractional_scaling: kitty,
        }
    }

    /// Capabilities for surfaces with no sizing support at all.
    pub fn none() -> Self {
        Self {
            supports_text_scaling: false,
            supports_fractional_scaling: false,
        }
    }

    /// Full support; used by tests and recording backends.
    pub fn full() -> Self {
        Self {
            supports_text_scaling: true,
            supports_fractional_scaling: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_cover_the_matrix() {
        assert!(!TerminalCapabilities::none().supports_text_scaling);
        assert!(TerminalCapabilities::full().supports_fractional_scaling);
    }
}
