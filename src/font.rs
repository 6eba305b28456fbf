//! TrueType font handling.
//!
//! A [`FontFace`] owns the raw font file; [`FontMetrics`] borrows a parsed
//! view of it for text measurement and for the descriptor values the PDF
//! backend embeds. The source pages mix Cyrillic and CJK text, so a real
//! Unicode font (Noto Sans or similar) is expected here; the built-in
//! Helvetica fallback lives in the render module instead.

use std::fs;
use std::path::Path;

use ttf_parser::{Face, GlyphId};

use crate::error::{Error, Result};
use crate::layout::TextMeasure;

/// An owned, validated TrueType/OpenType font file.
#[derive(Debug, Clone)]
pub struct FontFace {
    data: Vec<u8>,
}

impl FontFace {
    /// Load and validate a font file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)
            .map_err(|e| Error::FontUnavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }

    /// Validate font bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Face::parse(&data, 0).map_err(|e| Error::FontUnavailable(e.to_string()))?;
        Ok(Self { data })
    }

    /// The raw font file, for embedding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Borrow a parsed view for measurement and descriptor fields.
    pub fn metrics(&self) -> Result<FontMetrics<'_>> {
        let face =
            Face::parse(&self.data, 0).map_err(|e| Error::FontUnavailable(e.to_string()))?;
        Ok(FontMetrics { face })
    }
}

/// Parsed font view: glyph lookup, advances, and descriptor values.
pub struct FontMetrics<'a> {
    face: Face<'a>,
}

impl FontMetrics<'_> {
    /// Font units per em.
    pub fn units_per_em(&self) -> f32 {
        self.face.units_per_em() as f32
    }

    /// Glyph id for a character; 0 (`.notdef`) when unmapped.
    pub fn glyph_id(&self, c: char) -> u16 {
        self.face.glyph_index(c).map(|g| g.0).unwrap_or(0)
    }

    /// Horizontal advance of a glyph in font units.
    pub fn glyph_advance(&self, glyph_id: u16) -> f32 {
        self.face
            .glyph_hor_advance(GlyphId(glyph_id))
            .map(f32::from)
            // Unmapped or malformed glyphs advance by half an em, which
            // keeps wrapping sane for tofu output.
            .unwrap_or_else(|| self.units_per_em() / 2.0)
    }

    /// Number of glyphs in the face.
    pub fn glyph_count(&self) -> u16 {
        self.face.number_of_glyphs()
    }

    /// Ascender scaled to a 1000-unit em.
    pub fn ascent(&self) -> f32 {
        self.to_milli_em(self.face.ascender() as f32)
    }

    /// Descender scaled to a 1000-unit em (negative).
    pub fn descent(&self) -> f32 {
        self.to_milli_em(self.face.descender() as f32)
    }

    /// Capital height scaled to a 1000-unit em.
    pub fn cap_height(&self) -> f32 {
        let raw = self
            .face
            .capital_height()
            .map(f32::from)
            .unwrap_or_else(|| self.face.ascender() as f32 * 0.7);
        self.to_milli_em(raw)
    }

    /// Global bounding box scaled to a 1000-unit em:
    /// `(x_min, y_min, x_max, y_max)`.
    pub fn bounding_box(&self) -> (f32, f32, f32, f32) {
        let bbox = self.face.global_bounding_box();
        (
            self.to_milli_em(bbox.x_min as f32),
            self.to_milli_em(bbox.y_min as f32),
            self.to_milli_em(bbox.x_max as f32),
            self.to_milli_em(bbox.y_max as f32),
        )
    }

    /// Advance of a glyph scaled to a 1000-unit em, as PDF width arrays
    /// expect.
    pub fn glyph_width_milli_em(&self, glyph_id: u16) -> f32 {
        self.to_milli_em(self.glyph_advance(glyph_id))
    }

    fn to_milli_em(&self, units: f32) -> f32 {
        units * 1000.0 / self.units_per_em()
    }
}

impl TextMeasure for FontMetrics<'_> {
    fn line_width(&self, text: &str, font_size: f32) -> f32 {
        let units: f32 = text
            .chars()
            .map(|c| self.glyph_advance(self.glyph_id(c)))
            .sum();
        units * font_size / self.units_per_em()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bytes_rejected() {
        let err = FontFace::from_bytes(vec![0u8; 16]).unwrap_err();
        assert!(matches!(err, Error::FontUnavailable(_)));
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = FontFace::from_file("no/such/font.ttf").unwrap_err();
        assert!(matches!(err, Error::FontUnavailable(_)));
    }
}
