//! Record aggregation: raw fields in, one listing record out.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lookup::LookupStore;
use crate::model::ListingRecord;

use super::normalize::normalize;
use super::numeric::parse_scalar;

/// One raw labeled field as yielded by a source document provider: the
/// label as literally rendered, plus its value cells in visual order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    /// Untranslated field label.
    pub label: String,

    /// Value cells in document order. A multi-select field yields one
    /// cell per option.
    pub cells: Vec<String>,
}

impl RawField {
    /// Create a raw field.
    pub fn new(label: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            label: label.into(),
            cells,
        }
    }

    /// Create a raw field with a single value cell.
    pub fn single(label: impl Into<String>, cell: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            cells: vec![cell.into()],
        }
    }
}

/// A captured listing before normalization: scalars still in their
/// glyph-obfuscated text form, fields untranslated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    /// Listing title.
    pub title: String,

    /// Price text as rendered (numeral glyphs).
    #[serde(default)]
    pub price: Option<String>,

    /// Mileage text as rendered (numeral glyphs).
    #[serde(default)]
    pub mileage: Option<String>,

    /// Source page URL.
    pub url: String,

    /// Labeled fields in document order.
    #[serde(default)]
    pub fields: Vec<RawField>,

    /// Image URLs in gallery order, possibly with duplicates.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Aggregate already-parsed scalars and raw fields into a listing record.
///
/// Fields are normalized in source order; dropped fields leave no trace.
/// Image URLs are deduplicated, keeping first-occurrence positions.
#[allow(clippy::too_many_arguments)]
pub fn aggregate(
    title: impl Into<String>,
    price: Option<f64>,
    mileage: Option<f64>,
    url: impl Into<String>,
    fields: &[RawField],
    image_urls: &[String],
    store: &LookupStore,
) -> ListingRecord {
    let mut record = ListingRecord::new(title, url);
    record.price = price;
    record.mileage = mileage;

    for field in fields {
        if let Some(attribute) = normalize(&field.label, &field.cells, store) {
            record.push_attribute(attribute);
        }
    }

    for image_url in image_urls {
        record.push_image(image_url.clone());
    }

    record
}

/// Aggregate a captured listing, parsing its scalar fields through the
/// numeral-glyph table.
///
/// A scalar containing characters outside the table aborts aggregation for
/// the whole record; per-field normalization failures never do.
pub fn aggregate_raw(raw: &RawListing, store: &LookupStore) -> Result<ListingRecord> {
    let price = raw.price.as_deref().map(parse_scalar).transpose()?;
    let mileage = raw.mileage.as_deref().map(parse_scalar).transpose()?;

    Ok(aggregate(
        raw.title.clone(),
        price,
        mileage,
        raw.url.clone(),
        &raw.fields,
        &raw.images,
        store,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::lookup::FieldEntry;

    fn store() -> LookupStore {
        let mut store = LookupStore::new();
        store.insert_field("发动机", FieldEntry::new("Двигатель"));
        store.insert_field("座椅材质", FieldEntry::new("Материал сидений"));
        store.insert_field("颜色", FieldEntry::disabled("Цвет"));
        store.insert_value("真皮", "Кожа");
        store
    }

    #[test]
    fn test_aggregate_preserves_source_order_and_drops_silently() {
        let fields = vec![
            RawField::single("座椅材质", "真皮"),
            RawField::single("颜色", "红"),
            RawField::single("发动机", "CVT"),
            RawField::single("未知", "x"),
        ];
        let record = aggregate("Car", Some(25.98), Some(1.23), "u", &fields, &[], &store());

        let names: Vec<&str> = record.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Материал сидений", "Двигатель"]);
        assert_eq!(record.attributes[1].value, "Вариатор");
    }

    #[test]
    fn test_aggregate_dedups_images_first_occurrence() {
        let images = vec![
            "https://img/a".to_string(),
            "https://img/b".to_string(),
            "https://img/a".to_string(),
        ];
        let record = aggregate("Car", None, None, "u", &[], &images, &store());
        assert_eq!(record.images, vec!["https://img/a", "https://img/b"]);
    }

    #[test]
    fn test_aggregate_raw_parses_glyph_scalars() {
        let raw = RawListing {
            title: "比亚迪 汉".to_string(),
            price: Some("\u{e3f0}\u{e49c}.\u{e4c8}\u{e548}\u{e45f}".to_string()),
            mileage: Some("\u{e53d}.\u{e3f0}\u{e422}\u{e45f}\u{e531}\u{e4fc}".to_string()),
            url: "https://example.com/car".to_string(),
            fields: vec![RawField::single("发动机", "CVT")],
            images: vec![],
        };

        let record = aggregate_raw(&raw, &store()).unwrap();
        assert_eq!(record.price, Some(25.98));
        assert_eq!(record.mileage, Some(1.23));
        assert_eq!(record.attributes[0].value, "Вариатор");
    }

    #[test]
    fn test_aggregate_raw_malformed_scalar_aborts_record() {
        let raw = RawListing {
            title: "Car".to_string(),
            price: Some("25,98万".to_string()),
            mileage: None,
            url: "u".to_string(),
            fields: vec![],
            images: vec![],
        };

        assert!(matches!(
            aggregate_raw(&raw, &store()),
            Err(Error::MalformedNumeric(_))
        ));
    }

    #[test]
    fn test_raw_listing_deserializes_with_defaults() {
        let raw: RawListing =
            serde_json::from_str(r#"{"title": "Car", "url": "https://x"}"#).unwrap();
        assert!(raw.fields.is_empty());
        assert!(raw.images.is_empty());
        assert!(raw.price.is_none());
    }
}
