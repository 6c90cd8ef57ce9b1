//! TCVN3 (ABC) decoder.
//!
//! Every accented letter occupies one code point, so decoding is a plain
//! per-character substitution with no lookback.

use super::Decoder;
use super::tables;
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct Tcvn3Decoder;

impl Decoder for Tcvn3Decoder {
    fn to_unicode(&self, text: &str) -> String {
        decode(text)
    }
}

pub fn decode(text: &str) -> String {
    text.chars()
        .map(|c| tables::tcvn3_glyph(c).unwrap_or(c))
        .collect()
}

static REVERSE: Lazy<HashMap<char, char>> = Lazy::new(|| {
    let mut reverse = HashMap::new();
    for (glyph, letter) in tables::tcvn3_entries() {
        // first slot wins so ô keeps its canonical 0xAB
        reverse.entry(letter).or_insert(glyph);
    }
    reverse
});

/// Maps Unicode letters back to their TCVN3 glyphs. Letters TCVN3 has no
/// slot for are copied unchanged.
pub fn encode(text: &str) -> String {
    text.chars()
        .map(|c| REVERSE.get(&c).copied().unwrap_or(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diaeresis_o_reads_as_circumflex() {
        assert_eq!(decode("C\u{F6}ng ty"), "Công ty");
        assert_eq!(decode("C\u{AB}ng ty"), "Công ty");
    }

    #[test]
    fn common_words() {
        assert_eq!(decode("Vi\u{D6}t Nam"), "Việt Nam");
        assert_eq!(decode("\u{A7}\u{AD}\u{EA}ng"), "Đường");
    }

    #[test]
    fn ascii_is_identity() {
        assert_eq!(decode("Invoice #42 (paid)"), "Invoice #42 (paid)");
    }

    #[test]
    fn encode_prefers_canonical_slot() {
        assert_eq!(encode("ô"), "\u{AB}");
    }
}
