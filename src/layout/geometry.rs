//! Page geometry and composition options.

use serde::{Deserialize, Serialize};

/// Fixed page dimensions shared by text and image placement. Constant for
/// the lifetime of a composer instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width in points.
    pub width: f32,

    /// Page height in points.
    pub height: f32,

    /// Uniform margin in points.
    pub margin: f32,
}

impl PageGeometry {
    /// Create a geometry with the given dimensions.
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    /// A4 portrait (210 x 297 mm) with the standard 50pt margin.
    pub fn a4() -> Self {
        Self::new(595.0, 842.0, 50.0)
    }

    /// Letter portrait (8.5 x 11 inches) with the standard 50pt margin.
    pub fn letter() -> Self {
        Self::new(612.0, 792.0, 50.0)
    }

    /// Replace the margin.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Horizontal space available to text.
    pub fn text_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Cursor position at the top of a fresh page.
    pub fn top(&self) -> f32 {
        self.height - self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Typographic defaults used when composing a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeOptions {
    /// Body font size in points.
    pub font_size: f32,

    /// Body line spacing in points.
    pub line_spacing: f32,

    /// Title font size in points (the title is drawn emphasized).
    pub title_font_size: f32,

    /// Title line spacing in points.
    pub title_line_spacing: f32,

    /// Vertical gap after each image in points.
    pub image_spacing: f32,

    /// Headroom factor for the image page-break check: an image breaks to
    /// a new page when it would intrude below `margin * factor`. Clamped
    /// to at least 1.
    pub image_headroom: f32,
}

impl ComposeOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the body font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set the body line spacing.
    pub fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.line_spacing = spacing;
        self
    }

    /// Set the title font size.
    pub fn with_title_font_size(mut self, size: f32) -> Self {
        self.title_font_size = size;
        self
    }

    /// Set the gap drawn after each image.
    pub fn with_image_spacing(mut self, spacing: f32) -> Self {
        self.image_spacing = spacing;
        self
    }

    /// Set the image headroom factor (values below 1 are clamped to 1).
    pub fn with_image_headroom(mut self, factor: f32) -> Self {
        self.image_headroom = factor.max(1.0);
        self
    }
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            line_spacing: 15.0,
            title_font_size: 16.0,
            title_line_spacing: 20.0,
            image_spacing: 10.0,
            image_headroom: 1.0,
        }
    }
}
