//! Attribute normalization and translation.
//!
//! [`normalize`] turns one raw labeled field into a display-ready
//! attribute, or into nothing at all: a disabled or unknown label, or a
//! field whose every value cell is skipped or empty, is silently dropped.
//! Partial or unparseable attributes never abort an extraction pass.

use unicode_normalization::UnicodeNormalization;

use crate::lookup::LookupStore;
use crate::model::Attribute;

/// Sentinel glyph marking an unselected multi-choice option. Cells that
/// consist of exactly this marker contribute nothing.
pub const OPTION_MARKER: &str = "○";

/// Placeholder emitted for empty values under the include-empty policy.
pub const EMPTY_PLACEHOLDER: &str = "-";

/// Ordered literal substitutions applied to every value cell: decorative
/// glyphs are stripped and embedded unit labels translated.
const SUBSTITUTIONS: &[(&str, &str)] = &[("图示", ""), ("马力", " л.с."), ("版本", "Версия")];

/// Conditional override: the engine-type marker, when still present after
/// the generic substitutions, is replaced with its localized label and the
/// cell becomes final (the value dictionary is not consulted for it).
const ENGINE_MARKER: &str = "CVT";
const ENGINE_LABEL: &str = "Вариатор";

/// Separator used to join multiple surviving cell values.
const VALUE_SEPARATOR: &str = ", ";

/// Normalize one raw field against the lookup snapshot.
///
/// Returns the display name and joined display value, or `None` when the
/// field resolves to nothing: unknown label, disabled label, or no value
/// cell surviving the option-marker and empty-value policies.
pub fn normalize(raw_label: &str, raw_cells: &[String], store: &LookupStore) -> Option<Attribute> {
    let label: String = raw_label.nfc().collect();
    let entry = store.resolve_field(&label)?;
    if !entry.enabled {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for cell in raw_cells {
        if cell == OPTION_MARKER {
            continue;
        }

        let (cleaned, overridden) = clean_cell(cell);
        if cleaned.is_empty() {
            if store.include_empty() {
                parts.push(translate(EMPTY_PLACEHOLDER, store));
            }
            continue;
        }

        if overridden {
            parts.push(cleaned);
        } else {
            parts.push(translate(&cleaned, store));
        }
    }

    if parts.is_empty() {
        return None;
    }

    Some(Attribute::new(
        entry.display_name.clone(),
        parts.join(VALUE_SEPARATOR),
    ))
}

/// Apply the substitution chain to one raw cell. Returns the cleaned text
/// and whether the engine override fired.
fn clean_cell(raw: &str) -> (String, bool) {
    let mut text: String = raw.nfc().collect();
    for (find, replace) in SUBSTITUTIONS {
        text = text.replace(find, replace);
    }
    if text.contains(ENGINE_MARKER) {
        (text.replace(ENGINE_MARKER, ENGINE_LABEL), true)
    } else {
        (text, false)
    }
}

/// Exact-match value translation; misses keep the cleaned text.
fn translate(token: &str, store: &LookupStore) -> String {
    store
        .translate_value(token)
        .map(str::to_string)
        .unwrap_or_else(|| token.to_string())
}
