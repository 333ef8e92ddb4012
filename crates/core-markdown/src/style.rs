//! Inline style bit-set.
//!
//! Invariants:
//! - Header bits are mutually exclusive; `set_header` clears the group.
//! - `CODE` suppresses typographic replacement and inline parsing inside
//!   its span; enforcement lives in the consumers, the flag only records it.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MdStyle: u16 {
        const H1 = 1 << 0;
        const H2 = 1 << 1;
        const H3 = 1 << 2;
        const H4 = 1 << 3;
        const H5 = 1 << 4;
        const H6 = 1 << 5;
        const BOLD = 1 << 6;
        const ITALIC = 1 << 7;
        const UNDERLINE = 1 << 8;
        const STRIKE = 1 << 9;
        const MARK = 1 << 10;
        const SUB = 1 << 11;
        const SUP = 1 << 12;
        const CODE = 1 << 13;
    }
}

impl MdStyle {
    pub const HEADERS: MdStyle = MdStyle::H1
        .union(MdStyle::H2)
        .union(MdStyle::H3)
        .union(MdStyle::H4)
        .union(MdStyle::H5)
        .union(MdStyle::H6);

    /// Style with only the given header level (1..=6) set.
    pub fn header(level: u8) -> MdStyle {
        match level {
            1 => MdStyle::H1,
            2 => MdStyle::H2,
            3 => MdStyle::H3,
            4 => MdStyle::H4,
            5 => MdStyle::H5,
            _ => MdStyle::H6,
        }
    }

    /// Replace any current header bit with `level` (1..=6).
    pub fn set_header(&mut self, level: u8) {
        self.remove(MdStyle::HEADERS);
        self.insert(MdStyle::header(level));
    }

    /// Header level carried by this style, if any.
    pub fn header_level(&self) -> Option<u8> {
        [
            MdStyle::H1,
            MdStyle::H2,
            MdStyle::H3,
            MdStyle::H4,
            MdStyle::H5,
            MdStyle::H6,
        ]
        .iter()
        .position(|h| self.contains(*h))
        .map(|i| (i + 1) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_bits_exclusive() {
        let mut s = MdStyle::BOLD;
        s.set_header(2);
        s.set_header(5);
        assert_eq!(s.header_level(), Some(5));
        assert!(s.contains(MdStyle::BOLD));
        assert_eq!((s & MdStyle::HEADERS).bits().count_ones(), 1);
    }

    #[test]
    fn combinable_non_header_bits() {
        let s = MdStyle::BOLD | MdStyle::ITALIC | MdStyle::STRIKE;
        assert!(s.contains(MdStyle::BOLD | MdStyle::ITALIC));
        assert_eq!(s.header_level(), None);
    }
}
