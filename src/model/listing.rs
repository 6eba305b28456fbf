//! Listing record types.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One normalized attribute: a translated field name and its display value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Human-readable field name.
    pub name: String,

    /// Human-readable value, possibly a comma-joined multi-value string.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A fully extracted and normalized listing.
///
/// Constructed once per extraction pass and immutable afterwards; the JSON
/// form of this struct is the contract between the extraction side and the
/// rendering side and round-trips losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Listing title as shown on the source page.
    pub title: String,

    /// Asking price, already parsed to a plain decimal.
    #[serde(default)]
    pub price: Option<f64>,

    /// Odometer reading in the source unit (ten-thousands of km).
    #[serde(default)]
    pub mileage: Option<f64>,

    /// Source page URL.
    pub url: String,

    /// Normalized attributes in source encounter order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,

    /// Image URLs, deduplicated, first-occurrence order.
    #[serde(default)]
    pub images: Vec<String>,

    /// When the listing was captured, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved: Option<DateTime<Utc>>,
}

impl ListingRecord {
    /// Create an empty record for the given title and source URL.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: None,
            mileage: None,
            url: url.into(),
            attributes: Vec::new(),
            images: Vec::new(),
            retrieved: None,
        }
    }

    /// Set the price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the mileage (source unit: ten-thousands of km).
    pub fn with_mileage(mut self, mileage: f64) -> Self {
        self.mileage = Some(mileage);
        self
    }

    /// Set the capture timestamp.
    pub fn with_retrieved(mut self, at: DateTime<Utc>) -> Self {
        self.retrieved = Some(at);
        self
    }

    /// Append a normalized attribute.
    pub fn push_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Append an image URL, ignoring duplicates. The first occurrence
    /// keeps its position.
    pub fn push_image(&mut self, url: impl Into<String>) {
        let url = url.into();
        if !self.images.iter().any(|u| *u == url) {
            self.images.push(url);
        }
    }

    /// Number of normalized attributes.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Flat `name: value` text of the attributes, one per line.
    pub fn attributes_text(&self) -> String {
        self.attributes
            .iter()
            .map(|a| format!("{}: {}", a.name, a.value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a record from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Write the record to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_image_dedup() {
        let mut record = ListingRecord::new("Car", "https://example.com/1");
        record.push_image("https://img/a.webp");
        record.push_image("https://img/b.webp");
        record.push_image("https://img/a.webp");

        assert_eq!(
            record.images,
            vec!["https://img/a.webp", "https://img/b.webp"]
        );
    }

    #[test]
    fn test_attributes_text() {
        let mut record = ListingRecord::new("Car", "u");
        record.push_attribute(Attribute::new("Двигатель", "Вариатор"));
        record.push_attribute(Attribute::new("Мощность", "150 л.с."));

        assert_eq!(
            record.attributes_text(),
            "Двигатель: Вариатор\nМощность: 150 л.с."
        );
    }

    #[test]
    fn test_json_round_trip() {
        let mut record = ListingRecord::new("比亚迪 汉", "https://example.com/car")
            .with_price(25.98)
            .with_mileage(1.23);
        record.push_attribute(Attribute::new("Двигатель", "Вариатор"));
        record.push_image("https://img/a.webp");

        let json = record.to_json().unwrap();
        let back = ListingRecord::from_json(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_deserialize_minimal_shape() {
        // Historical files carry only the scalar fields.
        let record =
            ListingRecord::from_json(r#"{"title": "Car", "url": "https://x"}"#).unwrap();
        assert!(record.attributes.is_empty());
        assert!(record.images.is_empty());
        assert!(record.price.is_none());
        assert!(record.retrieved.is_none());
    }
}
