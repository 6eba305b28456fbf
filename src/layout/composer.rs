//! The cursor-based page composer.

use std::mem;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{PlacedBlock, Sheet, SheetPage};

use super::geometry::{ComposeOptions, PageGeometry};
use super::measure::{wrap_text, TextMeasure};

/// Composer lifecycle. The first draw opens page 1; `finish` commits
/// whatever is open and seals the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NoPageStarted,
    PageOpen,
    Finalized,
}

/// Current write position. Owned exclusively by the composer; draw calls
/// mutate it strictly sequentially.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    page: u32,
    y: f32,
}

/// Lays out text blocks and images onto fixed-size pages, tracking a
/// vertical cursor and breaking pages automatically.
///
/// # Example
///
/// ```
/// use carsheet::layout::{BuiltinMetrics, ComposeOptions, PageComposer, PageGeometry};
///
/// fn main() -> carsheet::Result<()> {
///     let metrics = BuiltinMetrics::new();
///     let mut composer = PageComposer::new(
///         PageGeometry::a4(),
///         &ComposeOptions::default(),
///         &metrics,
///     );
///     composer.draw_text_block("Hello", 12.0, 15.0)?;
///     let sheet = composer.finish()?;
///     assert_eq!(sheet.page_count(), 1);
///     Ok(())
/// }
/// ```
pub struct PageComposer<'a> {
    geometry: PageGeometry,
    image_spacing: f32,
    image_headroom: f32,
    measure: &'a dyn TextMeasure,
    state: State,
    cursor: Cursor,
    pages: Vec<SheetPage>,
    current: Vec<PlacedBlock>,
}

impl<'a> PageComposer<'a> {
    /// Create a composer for the given geometry. The geometry and spacing
    /// options are constant for the composer's lifetime.
    pub fn new(
        geometry: PageGeometry,
        options: &ComposeOptions,
        measure: &'a dyn TextMeasure,
    ) -> Self {
        Self {
            geometry,
            image_spacing: options.image_spacing,
            image_headroom: options.image_headroom.max(1.0),
            measure,
            state: State::NoPageStarted,
            cursor: Cursor { page: 0, y: 0.0 },
            pages: Vec::new(),
            current: Vec::new(),
        }
    }

    /// The composer's page geometry.
    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    /// Draw a wrapped text block at the cursor, breaking pages as needed.
    ///
    /// Wrapping breaks only at whitespace; a single word wider than the
    /// text area is placed unsplit. Empty or whitespace-only text draws
    /// nothing and leaves the cursor untouched.
    pub fn draw_text_block(&mut self, text: &str, font_size: f32, line_spacing: f32) -> Result<()> {
        if self.state == State::Finalized {
            return Err(Error::LayoutMisuse("draw_text_block after finish"));
        }

        let lines = wrap_text(text, self.measure, font_size, self.geometry.text_width());
        if lines.is_empty() {
            return Ok(());
        }

        self.open_first_page();
        for line in lines {
            if self.cursor.y - line_spacing < self.geometry.margin {
                self.advance_page();
            }
            self.current.push(PlacedBlock::Text {
                x: self.geometry.margin,
                y: self.cursor.y,
                text: line,
                font_size,
            });
            self.cursor.y -= line_spacing;
        }
        Ok(())
    }

    /// Draw an image scaled to the full page width, aspect ratio
    /// preserved, its bottom edge anchored at the cursor minus the draw
    /// height.
    ///
    /// Zero intrinsic dimensions are reported as [`Error::AssetUnavailable`];
    /// the caller skips that image and continues.
    pub fn draw_image(
        &mut self,
        source: &Path,
        intrinsic_width: u32,
        intrinsic_height: u32,
    ) -> Result<()> {
        if self.state == State::Finalized {
            return Err(Error::LayoutMisuse("draw_image after finish"));
        }
        if intrinsic_width == 0 || intrinsic_height == 0 {
            return Err(Error::AssetUnavailable(format!(
                "{}: zero pixel dimensions",
                source.display()
            )));
        }

        self.open_first_page();
        let aspect = intrinsic_width as f32 / intrinsic_height as f32;
        let draw_height = self.geometry.width / aspect;

        if self.cursor.y - draw_height < self.geometry.margin * self.image_headroom {
            self.advance_page();
        }

        self.current.push(PlacedBlock::Image {
            source: source.to_path_buf(),
            x: 0.0,
            y: self.cursor.y - draw_height,
            width: self.geometry.width,
            height: draw_height,
        });
        self.cursor.y -= draw_height + self.image_spacing;
        Ok(())
    }

    /// Commit the current page and continue on a fresh one.
    pub fn break_page(&mut self) -> Result<()> {
        if self.state == State::Finalized {
            return Err(Error::LayoutMisuse("break_page after finish"));
        }
        self.open_first_page();
        self.advance_page();
        Ok(())
    }

    /// Commit the open page and seal the composer.
    ///
    /// A composer that never drew anything still commits one blank page,
    /// so the output is never a zero-page document. Calling `finish`
    /// twice is a contract violation.
    pub fn finish(&mut self) -> Result<Sheet> {
        match self.state {
            State::Finalized => Err(Error::LayoutMisuse("finish called twice")),
            State::NoPageStarted => {
                self.state = State::Finalized;
                Ok(Sheet {
                    width: self.geometry.width,
                    height: self.geometry.height,
                    pages: vec![SheetPage::new(1)],
                })
            }
            State::PageOpen => {
                self.commit_current();
                self.state = State::Finalized;
                Ok(Sheet {
                    width: self.geometry.width,
                    height: self.geometry.height,
                    pages: mem::take(&mut self.pages),
                })
            }
        }
    }

    fn open_first_page(&mut self) {
        if self.state == State::NoPageStarted {
            self.state = State::PageOpen;
            self.cursor = Cursor {
                page: 1,
                y: self.geometry.top(),
            };
        }
    }

    fn advance_page(&mut self) {
        self.commit_current();
        self.cursor = Cursor {
            page: self.cursor.page + 1,
            y: self.geometry.top(),
        };
    }

    fn commit_current(&mut self) {
        self.pages.push(SheetPage {
            number: self.cursor.page,
            blocks: mem::take(&mut self.current),
        });
    }
}
