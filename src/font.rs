//! Seven-segment glyph lookup
//!
//! A font is a plain table of `(ascii code, segment mask)` pairs. Only the
//! characters a 7-segment digit can render need an entry; the table is
//! searched linearly and the first match wins, so it does not have to be
//! sorted. Segments A to G map to mask bits 0 to 6:
//!
//! ```text
//!      A
//!     ---
//!  F |   | B
//!     -G-
//!  E |   | C
//!     ---
//!      D
//! ```
//!
//! Bit 7 (radix) is never taken from a font; it is controlled separately.
//!
//! ## Example
//!
//! ```
//! use tm1638::font::{Font, FONT_HEX};
//!
//! let font = Font::new(FONT_HEX);
//! assert_eq!(font.resolve(b'F'), Some(0b0111_0001));
//! assert_eq!(font.resolve(b'x'), None);
//! ```

/// One glyph: ASCII code and segment mask
pub type Glyph = (u8, u8);

/// Segment mask bits that belong to the glyph (A-G)
pub const GLYPH_MASK: u8 = 0x7F;

/// Radix (decimal point / colon) bit of a digit byte
pub const RADIX_BIT: u8 = 0x80;

/// Characters that light the radix of the previous digit instead of taking a
/// position of their own
pub const RADIX_CHARS: [u8; 3] = [b'.', b',', b':'];

/// Whether a character is one of [`RADIX_CHARS`]
pub const fn is_radix(code: u8) -> bool {
    matches!(code, b'.' | b',' | b':')
}

/// Look up a glyph in a table
///
/// Returns the segment mask with the radix bit cleared, or `None` when the
/// table has no entry for `code`.
pub fn resolve(table: &[Glyph], code: u8) -> Option<u8> {
    table
        .iter()
        .find(|(ascii, _)| *ascii == code)
        .map(|(_, mask)| mask & GLYPH_MASK)
}

/// Borrowed view of a font table
///
/// The table is never copied; it only has to outlive the driver using it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Font<'a> {
    table: &'a [Glyph],
}

impl<'a> Font<'a> {
    /// Use the whole table
    pub const fn new(table: &'a [Glyph]) -> Self {
        Self { table }
    }

    /// Use only the first `glyphs` entries of the table
    ///
    /// A count larger than the table is limited to its length.
    pub fn with_count(table: &'a [Glyph], glyphs: usize) -> Self {
        Self {
            table: &table[..glyphs.min(table.len())],
        }
    }

    /// Segment mask for `code`, radix bit always clear
    pub fn resolve(&self, code: u8) -> Option<u8> {
        resolve(self.table, code)
    }

    /// Number of glyphs searched
    pub fn glyphs(&self) -> usize {
        self.table.len()
    }

    /// The underlying table
    pub fn table(&self) -> &'a [Glyph] {
        self.table
    }
}

impl Default for Font<'_> {
    fn default() -> Self {
        Self::new(FONT_BASIC)
    }
}

/// Decimal digits, space and minus
pub const FONT_DECIMAL: &[Glyph] = &[
    (b' ', 0b0000_0000),
    (b'-', 0b0100_0000),
    (b'0', 0b0011_1111),
    (b'1', 0b0000_0110),
    (b'2', 0b0101_1011),
    (b'3', 0b0100_1111),
    (b'4', 0b0110_0110),
    (b'5', 0b0110_1101),
    (b'6', 0b0111_1101),
    (b'7', 0b0000_0111),
    (b'8', 0b0111_1111),
    (b'9', 0b0110_1111),
];

/// Hexadecimal digits in both letter cases, space and minus
pub const FONT_HEX: &[Glyph] = &[
    (b' ', 0b0000_0000),
    (b'-', 0b0100_0000),
    (b'0', 0b0011_1111),
    (b'1', 0b0000_0110),
    (b'2', 0b0101_1011),
    (b'3', 0b0100_1111),
    (b'4', 0b0110_0110),
    (b'5', 0b0110_1101),
    (b'6', 0b0111_1101),
    (b'7', 0b0000_0111),
    (b'8', 0b0111_1111),
    (b'9', 0b0110_1111),
    (b'A', 0b0111_0111),
    (b'B', 0b0111_1100), // b
    (b'C', 0b0011_1001),
    (b'D', 0b0101_1110), // d
    (b'E', 0b0111_1001),
    (b'F', 0b0111_0001),
    (b'a', 0b0111_0111), // A
    (b'b', 0b0111_1100),
    (b'c', 0b0101_1000),
    (b'd', 0b0101_1110),
    (b'e', 0b0111_1001), // E
    (b'f', 0b0111_0001), // F
];

/// Digits, brackets and every letter a 7-segment digit can show legibly
pub const FONT_BASIC: &[Glyph] = &[
    (b' ', 0b0000_0000),
    (b'\'', 0b0010_0000),
    (b'(', 0b0011_1001),
    (b')', 0b0000_1111),
    (b'-', 0b0100_0000),
    (b'0', 0b0011_1111),
    (b'1', 0b0000_0110),
    (b'2', 0b0101_1011),
    (b'3', 0b0100_1111),
    (b'4', 0b0110_0110),
    (b'5', 0b0110_1101),
    (b'6', 0b0111_1101),
    (b'7', 0b0000_0111),
    (b'8', 0b0111_1111),
    (b'9', 0b0110_1111),
    (b'A', 0b0111_0111),
    (b'B', 0b0111_1100), // b
    (b'C', 0b0011_1001),
    (b'D', 0b0101_1110), // d
    (b'E', 0b0111_1001),
    (b'F', 0b0111_0001),
    (b'H', 0b0111_0110),
    (b'I', 0b0011_0000),
    (b'J', 0b0000_1110),
    (b'L', 0b0011_1000),
    (b'N', 0b0101_0100), // n
    (b'O', 0b0101_1100), // o
    (b'P', 0b0111_0011),
    (b'R', 0b0101_0000), // r
    (b'S', 0b0110_1101), // 5
    (b'T', 0b0111_1000), // t
    (b'U', 0b0011_1110),
    (b'[', 0b0011_1001),
    (b']', 0b0000_1111),
    (b'_', 0b0000_1000),
    (b'a', 0b0111_0111), // A
    (b'b', 0b0111_1100),
    (b'c', 0b0101_1000),
    (b'd', 0b0101_1110),
    (b'e', 0b0111_1001), // E
    (b'f', 0b0111_0001), // F
    (b'h', 0b0111_0100),
    (b'i', 0b0001_0000),
    (b'j', 0b0000_1110), // J
    (b'l', 0b0011_1000), // L
    (b'n', 0b0101_0100),
    (b'o', 0b0101_1100),
    (b'p', 0b0111_0011), // P
    (b'r', 0b0101_0000),
    (b's', 0b0110_1101), // S
    (b't', 0b0111_1000),
    (b'u', 0b0001_1100),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_glyph() {
        assert_eq!(resolve(FONT_DECIMAL, b'7'), Some(0b0000_0111));
        assert_eq!(resolve(FONT_BASIC, b'H'), Some(0b0111_0110));
    }

    #[test]
    fn test_resolve_unknown_glyph() {
        assert_eq!(resolve(FONT_DECIMAL, b'A'), None);
        assert_eq!(resolve(FONT_BASIC, b'.'), None);
        assert_eq!(resolve(&[], b'0'), None);
    }

    #[test]
    fn test_resolve_clears_radix_bit() {
        let table = [(b'x', 0xFF), (b'y', 0x80)];
        assert_eq!(resolve(&table, b'x'), Some(0x7F));
        assert_eq!(resolve(&table, b'y'), Some(0x00));
    }

    #[test]
    fn test_first_match_wins() {
        let table = [(b'a', 0x01), (b'b', 0x02), (b'a', 0x04)];
        assert_eq!(resolve(&table, b'a'), Some(0x01));
        assert_eq!(resolve(&table, b'a'), resolve(&table, b'a'));
    }

    #[test]
    fn test_every_bundled_glyph_has_clear_radix() {
        for table in [FONT_BASIC, FONT_DECIMAL, FONT_HEX] {
            for (ascii, _) in table {
                let mask = resolve(table, *ascii).unwrap();
                assert_eq!(mask & RADIX_BIT, 0);
            }
        }
    }

    #[test]
    fn test_with_count_limits_search() {
        let font = Font::with_count(FONT_DECIMAL, 3);
        assert_eq!(font.glyphs(), 3);
        assert_eq!(font.resolve(b'0'), Some(0b0011_1111));
        assert_eq!(font.resolve(b'1'), None);

        let font = Font::with_count(FONT_DECIMAL, 1000);
        assert_eq!(font.glyphs(), FONT_DECIMAL.len());
    }

    #[test]
    fn test_radix_chars() {
        for code in RADIX_CHARS {
            assert!(is_radix(code));
        }
        assert!(!is_radix(b';'));
        assert!(!is_radix(b'0'));
    }

    #[test]
    fn test_default_font_is_basic() {
        assert_eq!(Font::default().table(), FONT_BASIC);
    }
}
