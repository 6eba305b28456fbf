//! # carsheet
//!
//! Vehicle-listing normalization and paginated PDF rendering.
//!
//! This library turns raw labeled fields scraped from a listing page into
//! a clean, translated [`ListingRecord`], then lays the record out onto
//! fixed-size pages (text blocks with automatic wrapping and page breaks,
//! followed by a full-width image gallery) and writes the result as a PDF.
//!
//! ## Quick Start
//!
//! ```no_run
//! use carsheet::{LookupStore, RawListing};
//!
//! fn main() -> carsheet::Result<()> {
//!     let store = LookupStore::load("fields.json", "values.json", "settings.json")?;
//!     let raw: RawListing = serde_json::from_str(&std::fs::read_to_string("raw.json")?)?;
//!
//!     let record = carsheet::normalize_and_aggregate(&raw, &store)?;
//!     record.save("car_data/info.json")?;
//!
//!     let images = carsheet::assets::resolve_dir("car_data")?;
//!     let mut out = std::fs::File::create("Auto.pdf")?;
//!     let pages = carsheet::render_pdf(&record, &images, "NotoSans.ttf", &mut out)?;
//!     println!("{} pages", pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Design
//!
//! - Per-field failures (unknown label, disabled field, empty value) drop
//!   the field, never the pass; per-image failures drop the image, never
//!   the document.
//! - Lookup dictionaries are loaded once per pass and never mutated while
//!   it runs.
//! - The layout cursor is owned by the composer; rendering is strictly
//!   sequential.

pub mod assets;
pub mod error;
pub mod extract;
pub mod font;
pub mod layout;
pub mod lookup;
pub mod model;
pub mod progress;
pub mod render;

// Re-export commonly used types
pub use assets::ImageAsset;
pub use error::{Error, Result};
pub use extract::{aggregate, aggregate_raw, normalize, parse_scalar, RawField, RawListing};
pub use font::FontFace;
pub use layout::{
    compose_listing, BuiltinMetrics, ComposeOptions, PageComposer, PageGeometry, TextMeasure,
};
pub use lookup::{FieldEntry, LookupStore};
pub use model::{Attribute, ListingRecord, PlacedBlock, Sheet, SheetPage};
pub use progress::{ProgressEvent, ProgressSink};
pub use render::{PdfFont, PdfRenderer};

use std::io::Write;
use std::path::Path;

/// Normalize and aggregate a captured listing against a lookup snapshot.
///
/// Per-field failures drop the field silently; a malformed scalar aborts
/// the record with [`Error::MalformedNumeric`].
pub fn normalize_and_aggregate(raw: &RawListing, store: &LookupStore) -> Result<ListingRecord> {
    aggregate_raw(raw, store)
}

/// Compose a listing record into a paginated sheet using the built-in
/// Helvetica metrics and default A4 geometry.
pub fn compose_sheet(record: &ListingRecord, images: &[ImageAsset]) -> Result<Sheet> {
    compose_listing(
        record,
        images,
        PageGeometry::a4(),
        &ComposeOptions::default(),
        &BuiltinMetrics::new(),
    )
}

/// Render a listing record to PDF with an embedded TrueType font.
///
/// Composes with the font's real metrics, writes the document into
/// `writer`, and returns the committed page count.
pub fn render_pdf<P: AsRef<Path>, W: Write>(
    record: &ListingRecord,
    images: &[ImageAsset],
    font_path: P,
    writer: &mut W,
) -> Result<u32> {
    let face = FontFace::from_file(font_path)?;
    let sheet = {
        let metrics = face.metrics()?;
        compose_listing(
            record,
            images,
            PageGeometry::a4(),
            &ComposeOptions::default(),
            &metrics,
        )?
    };
    PdfRenderer::new(PdfFont::Embedded(face))
        .with_title(record.title.clone())
        .write_to(&sheet, writer)
}

/// Render a listing record to PDF with the built-in Helvetica face.
///
/// Text outside WinAnsi coverage degrades to `?`; prefer [`render_pdf`]
/// with a Unicode font for real listings.
pub fn render_pdf_builtin<W: Write>(
    record: &ListingRecord,
    images: &[ImageAsset],
    writer: &mut W,
) -> Result<u32> {
    let sheet = compose_sheet(record, images)?;
    PdfRenderer::builtin()
        .with_title(record.title.clone())
        .write_to(&sheet, writer)
}

/// Read a listing record from a JSON file.
pub fn load_listing<P: AsRef<Path>>(path: P) -> Result<ListingRecord> {
    ListingRecord::load(path)
}

/// Write a listing record to a JSON file.
pub fn save_listing<P: AsRef<Path>>(record: &ListingRecord, path: P) -> Result<()> {
    record.save(path)
}
