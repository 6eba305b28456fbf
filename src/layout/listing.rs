//! Listing composition: fixed drawing order for a listing record.

use crate::assets::ImageAsset;
use crate::error::{Error, Result};
use crate::model::{ListingRecord, Sheet};

use super::composer::PageComposer;
use super::geometry::{ComposeOptions, PageGeometry};
use super::measure::TextMeasure;

/// Mileage arrives in ten-thousands of km and is displayed in km.
const MILEAGE_UNIT_FACTOR: f64 = 10_000.0;

/// Compose a listing into a paginated sheet.
///
/// Drawing order is fixed: the title as an emphasized block, the mileage
/// line, one block per attribute, an explicit page break to separate the
/// body from the gallery, then every image in the given order. Images that
/// cannot be placed are logged and skipped; the rest of the document still
/// renders.
pub fn compose_listing(
    record: &ListingRecord,
    images: &[ImageAsset],
    geometry: PageGeometry,
    options: &ComposeOptions,
    measure: &dyn TextMeasure,
) -> Result<Sheet> {
    let mut composer = PageComposer::new(geometry, options, measure);

    composer.draw_text_block(
        &record.title,
        options.title_font_size,
        options.title_line_spacing,
    )?;

    if let Some(mileage) = record.mileage {
        let km = (mileage * MILEAGE_UNIT_FACTOR) as i64;
        composer.draw_text_block(
            &format!("Mileage: {} km", km),
            options.font_size,
            options.line_spacing,
        )?;
    }

    for attribute in &record.attributes {
        composer.draw_text_block(
            &format!("{}: {}", attribute.name, attribute.value),
            options.font_size,
            options.line_spacing,
        )?;
    }

    composer.break_page()?;

    for image in images {
        match composer.draw_image(&image.path, image.width, image.height) {
            Ok(()) => {}
            Err(Error::AssetUnavailable(reason)) => {
                log::warn!("skipping image: {}", reason);
            }
            Err(e) => return Err(e),
        }
    }

    composer.finish()
}
