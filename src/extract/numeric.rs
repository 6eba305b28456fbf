//! Scalar parsing for obfuscated numeral glyphs.
//!
//! The source pages render digits with private-use-area glyphs from an
//! embedded font. The table below maps each known glyph to its digit;
//! the unit glyphs (万, 公, 里) are dropped outright.

use crate::error::{Error, Result};

/// Known glyph-to-digit substitutions.
const NUMERAL_GLYPHS: &[(char, &str)] = &[
    ('\u{e53d}', "1"),
    ('\u{e3f0}', "2"),
    ('\u{e422}', "3"),
    ('\u{e42c}', "4"),
    ('\u{e49c}', "5"),
    ('\u{e42b}', "6"),
    ('\u{e4fe}', "7"),
    ('\u{e548}', "8"),
    ('\u{e4c8}', "9"),
    ('\u{e453}', "0"),
    ('\u{e45f}', ""), // 万
    ('\u{e531}', ""), // 公
    ('\u{e4fc}', ""), // 里
];

/// Parse a scalar field rendered with the numeral-glyph font.
///
/// Every glyph in the table is substituted; any remaining character that
/// the decimal parse rejects makes the whole field malformed, which aborts
/// aggregation for the record.
pub fn parse_scalar(text: &str) -> Result<f64> {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        match NUMERAL_GLYPHS.iter().find(|(glyph, _)| *glyph == c) {
            Some((_, digit)) => cleaned.push_str(digit),
            None => cleaned.push(c),
        }
    }

    cleaned
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::MalformedNumeric(text.to_string()))
}
