//! Lookup store: the translation dictionaries a pass runs against.
//!
//! A [`LookupStore`] is loaded once at the start of an extraction pass and
//! treated as a read-only snapshot for its duration. The backing files may
//! be edited between passes (the toggle helpers below support that); a
//! running pass never observes such edits.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One entry of the field dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Human-readable, translated field name.
    pub display_name: String,

    /// Whether the field is included in output.
    pub enabled: bool,
}

impl FieldEntry {
    /// Create an enabled entry.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            enabled: true,
        }
    }

    /// Create a disabled entry.
    pub fn disabled(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            enabled: false,
        }
    }
}

/// On-disk shape of a field entry: `["display name", 0 | 1]`.
type FieldEntryFile = (String, u8);

/// On-disk shape of the settings file.
#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    with_empty_parameters: u8,
}

/// Immutable-per-pass snapshot of the two translation dictionaries plus the
/// include-empty policy.
#[derive(Debug, Clone, Default)]
pub struct LookupStore {
    fields: HashMap<String, FieldEntry>,
    values: HashMap<String, String>,
    include_empty: bool,
}

impl LookupStore {
    /// Create an empty store (no field resolves, no value translates).
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot from the three configuration files.
    ///
    /// `fields_path` maps raw labels to `[display_name, enabled]` pairs,
    /// `values_path` maps raw value tokens to display strings, and
    /// `settings_path` carries the include-empty flag. Any unreadable or
    /// malformed file is fatal to the pass.
    pub fn load<P: AsRef<Path>>(fields_path: P, values_path: P, settings_path: P) -> Result<Self> {
        let fields: HashMap<String, FieldEntryFile> = read_json(fields_path.as_ref())?;
        let values: HashMap<String, String> = read_json(values_path.as_ref())?;
        let settings: SettingsFile = read_json(settings_path.as_ref())?;

        Ok(Self {
            fields: fields_from_file(fields),
            values,
            include_empty: settings.with_empty_parameters != 0,
        })
    }

    /// Load only the field dictionary, leaving the value dictionary empty
    /// and the include-empty policy off. Useful for editing the field file
    /// between passes.
    pub fn load_fields<P: AsRef<Path>>(fields_path: P) -> Result<Self> {
        let fields: HashMap<String, FieldEntryFile> = read_json(fields_path.as_ref())?;
        Ok(Self {
            fields: fields_from_file(fields),
            values: HashMap::new(),
            include_empty: false,
        })
    }

    /// Whether empty attribute values are kept as a placeholder.
    pub fn include_empty(&self) -> bool {
        self.include_empty
    }

    /// Set the include-empty policy.
    pub fn set_include_empty(&mut self, include: bool) {
        self.include_empty = include;
    }

    /// Resolve a raw label. Absent labels are simply unresolved; this is
    /// the configured-disable mechanism, not an error.
    pub fn resolve_field(&self, raw_label: &str) -> Option<&FieldEntry> {
        self.fields.get(raw_label)
    }

    /// Translate a cleaned value token. Exact match only.
    pub fn translate_value(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// Insert or replace a field entry.
    pub fn insert_field(&mut self, raw_label: impl Into<String>, entry: FieldEntry) {
        self.fields.insert(raw_label.into(), entry);
    }

    /// Insert or replace a value translation.
    pub fn insert_value(&mut self, token: impl Into<String>, display: impl Into<String>) {
        self.values.insert(token.into(), display.into());
    }

    /// Enable or disable a single field. Returns `false` if the label is
    /// not present in the dictionary.
    pub fn set_enabled(&mut self, raw_label: &str, enabled: bool) -> bool {
        match self.fields.get_mut(raw_label) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Enable or disable every field at once.
    pub fn set_all_enabled(&mut self, enabled: bool) {
        for entry in self.fields.values_mut() {
            entry.enabled = enabled;
        }
    }

    /// Number of entries in the field dictionary.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over the field dictionary in unspecified order.
    pub fn iter_fields(&self) -> impl Iterator<Item = (&str, &FieldEntry)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Write the field dictionary back in its on-disk shape.
    pub fn save_fields<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file: HashMap<&str, FieldEntryFile> = self
            .fields
            .iter()
            .map(|(label, entry)| {
                (
                    label.as_str(),
                    (entry.display_name.clone(), u8::from(entry.enabled)),
                )
            })
            .collect();
        write_json(path.as_ref(), &file)
    }

    /// Write the settings file back in its on-disk shape.
    pub fn save_settings<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = SettingsFile {
            with_empty_parameters: u8::from(self.include_empty),
        };
        write_json(path.as_ref(), &file)
    }
}

fn fields_from_file(fields: HashMap<String, FieldEntryFile>) -> HashMap<String, FieldEntry> {
    fields
        .into_iter()
        .map(|(label, (display_name, enabled))| {
            (
                label,
                FieldEntry {
                    display_name,
                    enabled: enabled != 0,
                },
            )
        })
        .collect()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;
    writer
        .flush()
        .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_store() -> LookupStore {
        let mut store = LookupStore::new();
        store.insert_field("发动机", FieldEntry::new("Двигатель"));
        store.insert_field("颜色", FieldEntry::disabled("Цвет"));
        store.insert_value("有", "Есть");
        store
    }

    #[test]
    fn test_resolve_field() {
        let store = sample_store();
        let entry = store.resolve_field("发动机").unwrap();
        assert_eq!(entry.display_name, "Двигатель");
        assert!(entry.enabled);

        assert!(!store.resolve_field("颜色").unwrap().enabled);
        assert!(store.resolve_field("missing").is_none());
    }

    #[test]
    fn test_translate_value_exact_match_only() {
        let store = sample_store();
        assert_eq!(store.translate_value("有"), Some("Есть"));
        assert_eq!(store.translate_value("有 "), None);
    }

    #[test]
    fn test_toggle_fields() {
        let mut store = sample_store();
        assert!(store.set_enabled("颜色", true));
        assert!(store.resolve_field("颜色").unwrap().enabled);
        assert!(!store.set_enabled("missing", true));

        store.set_all_enabled(false);
        assert!(store.iter_fields().all(|(_, e)| !e.enabled));
    }

    #[test]
    fn test_load_from_historical_file_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let fields = dir.path().join("fields.json");
        let values = dir.path().join("values.json");
        let settings = dir.path().join("settings.json");

        fs::write(&fields, r#"{"发动机": ["Двигатель", 1], "颜色": ["Цвет", 0]}"#).unwrap();
        fs::write(&values, r#"{"有": "Есть"}"#).unwrap();
        fs::write(&settings, r#"{"with_empty_parameters": 1}"#).unwrap();

        let store = LookupStore::load(&fields, &values, &settings).unwrap();
        assert!(store.include_empty());
        assert_eq!(store.field_count(), 2);
        assert!(store.resolve_field("发动机").unwrap().enabled);
        assert!(!store.resolve_field("颜色").unwrap().enabled);
        assert_eq!(store.translate_value("有"), Some("Есть"));
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let result = LookupStore::load(&missing, &missing, &missing);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let fields = dir.path().join("fields.json");
        let values = dir.path().join("values.json");
        let settings = dir.path().join("settings.json");

        let mut store = sample_store();
        store.set_include_empty(true);
        store.save_fields(&fields).unwrap();
        store.save_settings(&settings).unwrap();
        fs::write(&values, r#"{"有": "Есть"}"#).unwrap();

        let reloaded = LookupStore::load(&fields, &values, &settings).unwrap();
        assert!(reloaded.include_empty());
        assert_eq!(
            reloaded.resolve_field("发动机"),
            store.resolve_field("发动机")
        );
        assert_eq!(reloaded.resolve_field("颜色"), store.resolve_field("颜色"));
    }
}
