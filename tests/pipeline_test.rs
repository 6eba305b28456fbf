//! End-to-end pipeline tests: normalize, aggregate, persist, compose,
//! render.

use std::fs;

use image::{ImageBuffer, Rgb};

use carsheet::{
    assets, compose_sheet, normalize_and_aggregate, FieldEntry, ListingRecord, LookupStore,
    PdfRenderer, RawField, RawListing,
};

fn store() -> LookupStore {
    let mut store = LookupStore::new();
    store.insert_field("发动机", FieldEntry::new("Двигатель"));
    store.insert_field("座椅材质", FieldEntry::new("Материал сидений"));
    store.insert_field("颜色", FieldEntry::disabled("Цвет"));
    store.insert_value("真皮", "Кожа");
    store
}

fn raw_listing() -> RawListing {
    RawListing {
        title: "比亚迪 汉 DM-i 2022".to_string(),
        // 25.98 with the 万 glyph appended, as rendered on the page.
        price: Some("\u{e3f0}\u{e49c}.\u{e4c8}\u{e548}\u{e45f}".to_string()),
        // 1.23万公里 in glyph form.
        mileage: Some("\u{e53d}.\u{e3f0}\u{e422}\u{e45f}\u{e531}\u{e4fc}".to_string()),
        url: "https://example.com/usedcar/12345".to_string(),
        fields: vec![
            RawField::single("发动机", "CVT"),
            RawField::new(
                "座椅材质",
                vec!["○".to_string(), "真皮".to_string()],
            ),
            RawField::single("颜色", "红"),
        ],
        images: vec![
            "https://img/a.webp".to_string(),
            "https://img/b.webp".to_string(),
            "https://img/a.webp".to_string(),
        ],
    }
}

#[test]
fn test_normalize_and_aggregate_full_record() {
    let record = normalize_and_aggregate(&raw_listing(), &store()).unwrap();

    assert_eq!(record.price, Some(25.98));
    assert_eq!(record.mileage, Some(1.23));
    // The disabled field is gone; the rest keep source order.
    assert_eq!(record.attribute_count(), 2);
    assert_eq!(record.attributes[0].name, "Двигатель");
    assert_eq!(record.attributes[0].value, "Вариатор");
    assert_eq!(record.attributes[1].value, "Кожа");
    // Duplicate URL collapsed to its first occurrence.
    assert_eq!(record.images, vec!["https://img/a.webp", "https://img/b.webp"]);
}

#[test]
fn test_serialize_deserialize_render_round_trip() {
    let record = normalize_and_aggregate(&raw_listing(), &store()).unwrap();

    let direct = compose_sheet(&record, &[]).unwrap();

    let json = record.to_json().unwrap();
    let reloaded = ListingRecord::from_json(&json).unwrap();
    let round_tripped = compose_sheet(&reloaded, &[]).unwrap();

    assert_eq!(round_tripped.page_count(), direct.page_count());
    assert_eq!(round_tripped.plain_text(), direct.plain_text());
    assert!(direct.plain_text().contains("Mileage: 12300 km"));
}

#[test]
fn test_persisted_record_round_trips_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("info.json");

    let record = normalize_and_aggregate(&raw_listing(), &store()).unwrap();
    record.save(&path).unwrap();
    let reloaded = ListingRecord::load(&path).unwrap();

    assert_eq!(reloaded, record);
}

#[test]
fn test_render_with_gallery_images() {
    let dir = tempfile::tempdir().unwrap();
    for (i, (w, h)) in [(40u32, 30u32), (30, 40)].iter().enumerate() {
        let img = ImageBuffer::from_pixel(*w, *h, Rgb::<u8>([120, 40, 40]));
        img.save(dir.path().join(format!("image_{}.png", i + 1)))
            .unwrap();
    }
    fs::write(dir.path().join("info.json"), "{}").unwrap();

    let images = assets::resolve_dir(dir.path()).unwrap();
    assert_eq!(images.len(), 2);

    let record = normalize_and_aggregate(&raw_listing(), &store()).unwrap();
    let sheet = compose_sheet(&record, &images).unwrap();
    // Body page, then the gallery pages hold both images.
    assert!(sheet.page_count() >= 2);
    assert_eq!(sheet.image_count(), 2);

    let mut out = Vec::new();
    let pages = PdfRenderer::builtin()
        .with_title(record.title.clone())
        .write_to(&sheet, &mut out)
        .unwrap();
    assert_eq!(pages, sheet.page_count());
    assert!(out.starts_with(b"%PDF-"));
}

#[test]
fn test_lookup_files_drive_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let fields = dir.path().join("names_translation.json");
    let values = dir.path().join("values_translation.json");
    let settings = dir.path().join("config.json");

    fs::write(
        &fields,
        r#"{"发动机": ["Двигатель", 1], "内饰": ["Салон", 1]}"#,
    )
    .unwrap();
    fs::write(&values, "{}").unwrap();
    fs::write(&settings, r#"{"with_empty_parameters": 1}"#).unwrap();

    let store = LookupStore::load(&fields, &values, &settings).unwrap();

    let raw = RawListing {
        title: "Car".to_string(),
        price: None,
        mileage: None,
        url: "https://x".to_string(),
        fields: vec![
            RawField::single("发动机", "CVT"),
            // Cleans to empty; include-empty keeps it as "-".
            RawField::single("内饰", "图示"),
        ],
        images: vec![],
    };

    let record = normalize_and_aggregate(&raw, &store).unwrap();
    assert_eq!(record.attribute_count(), 2);
    assert_eq!(record.attributes[1].name, "Салон");
    assert_eq!(record.attributes[1].value, "-");
}
