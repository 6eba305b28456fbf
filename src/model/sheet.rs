//! Composed sheet: the paginated output of the layout engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A laid-out document: fixed-size pages of placed blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// Page width in points (1 point = 1/72 inch).
    pub width: f32,

    /// Page height in points.
    pub height: f32,

    /// Committed pages, in order. Never empty once finalized.
    pub pages: Vec<SheetPage>,
}

impl Sheet {
    /// Number of committed pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, number: u32) -> Option<&SheetPage> {
        if number == 0 {
            return None;
        }
        self.pages.get((number - 1) as usize)
    }

    /// Plain text of every text block, in draw order.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Total number of placed image blocks.
    pub fn image_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .filter(|b| b.is_image())
            .count()
    }
}

/// A single committed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetPage {
    /// Page number (1-indexed).
    pub number: u32,

    /// Placed blocks in draw order.
    pub blocks: Vec<PlacedBlock>,
}

impl SheetPage {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            blocks: Vec::new(),
        }
    }

    /// Whether the page carries no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Plain text of the page's text blocks, one line per block.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                PlacedBlock::Text { text, .. } => Some(text.as_str()),
                PlacedBlock::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A block placed at an absolute position on a page.
///
/// Coordinates follow the PDF convention: origin at the bottom-left
/// corner, y growing upwards. Text `y` is the baseline; image `y` is the
/// bottom edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlacedBlock {
    /// One line of text.
    Text {
        /// Left edge of the line.
        x: f32,
        /// Baseline position.
        y: f32,
        /// Line content (already wrapped; contains no newlines).
        text: String,
        /// Font size in points.
        font_size: f32,
    },

    /// A scaled image.
    Image {
        /// Path of the already-retrieved image file.
        source: PathBuf,
        /// Left edge.
        x: f32,
        /// Bottom edge.
        y: f32,
        /// Draw width in points.
        width: f32,
        /// Draw height in points.
        height: f32,
    },
}

impl PlacedBlock {
    /// Check if this block is a text line.
    pub fn is_text(&self) -> bool {
        matches!(self, PlacedBlock::Text { .. })
    }

    /// Check if this block is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, PlacedBlock::Image { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(y: f32, s: &str) -> PlacedBlock {
        PlacedBlock::Text {
            x: 50.0,
            y,
            text: s.to_string(),
            font_size: 12.0,
        }
    }

    #[test]
    fn test_plain_text_skips_images() {
        let sheet = Sheet {
            width: 595.0,
            height: 842.0,
            pages: vec![
                SheetPage {
                    number: 1,
                    blocks: vec![text(792.0, "Title"), text(777.0, "Mileage: 12300 km")],
                },
                SheetPage {
                    number: 2,
                    blocks: vec![PlacedBlock::Image {
                        source: PathBuf::from("image_1.jpg"),
                        x: 0.0,
                        y: 300.0,
                        width: 595.0,
                        height: 400.0,
                    }],
                },
            ],
        };

        assert_eq!(sheet.page_count(), 2);
        assert_eq!(sheet.image_count(), 1);
        assert_eq!(sheet.plain_text(), "Title\nMileage: 12300 km");
    }

    #[test]
    fn test_get_page_is_one_indexed() {
        let sheet = Sheet {
            width: 595.0,
            height: 842.0,
            pages: vec![SheetPage::new(1)],
        };
        assert!(sheet.get_page(0).is_none());
        assert_eq!(sheet.get_page(1).map(|p| p.number), Some(1));
        assert!(sheet.get_page(2).is_none());
    }
}
