//! Lookup table from raw session labels to canonical names and categories.
//!
//! Backed by two human-editable CSV files:
//! - `session_name_mappings.csv`: `raw_session_name,parsed_session_name`
//! - `session_types.csv`: `session_name,category`
//!
//! The catalog is loaded once per run and passed explicitly to whoever needs
//! it. Additions made during a run never replace an existing entry.

use crate::errors::AppResult;
use crate::models::SessionDefinition;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Mapping value marking a label deliberately left unchanged.
pub const SKIP_SENTINEL: &str = "__SKIP__";

#[derive(Debug, Serialize, Deserialize)]
struct MappingRow {
    raw_session_name: String,
    parsed_session_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TypeRow {
    session_name: String,
    category: String,
}

/// How a raw label was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Explicit mapping (exact or normalized key).
    Mapped(String),
    /// Mapping marked with the skip sentinel: the label stays as it is.
    Skipped,
    /// The label already is a canonical name.
    Canonical(String),
    /// Nothing matched: the label passes through unchanged.
    Unmapped,
}

#[derive(Debug, Clone, Default)]
pub struct SessionCatalog {
    mappings: BTreeMap<String, String>,
    categories: BTreeMap<String, String>,
    normalized_mappings: BTreeMap<String, String>,
    normalized_canonical: BTreeMap<String, String>,
}

/// Normalized comparison key: lowercase alphanumerics separated by single spaces.
///
/// `"STV Swim!"`, `"stv  swim"` and `"STV_Swim"` all normalize to `"stv swim"`.
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl SessionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from in-memory tables (used by tests and callers embedding the core).
    pub fn from_tables(
        mappings: impl IntoIterator<Item = (String, String)>,
        categories: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let mut catalog = Self::new();
        for (raw, parsed) in mappings {
            catalog.add_mapping(&raw, &parsed);
        }
        for (name, category) in categories {
            catalog.add_category(&name, &category);
        }
        catalog
    }

    /// Load both tables. Missing files yield empty tables.
    pub fn load(mappings_path: &Path, types_path: &Path) -> AppResult<Self> {
        let mut catalog = Self::new();

        if mappings_path.exists() {
            let mut rdr = csv::Reader::from_path(mappings_path)?;
            for row in rdr.deserialize::<MappingRow>() {
                let row = row?;
                catalog.add_mapping(row.raw_session_name.trim(), row.parsed_session_name.trim());
            }
        }

        if types_path.exists() {
            let mut rdr = csv::Reader::from_path(types_path)?;
            for row in rdr.deserialize::<TypeRow>() {
                let row = row?;
                catalog.add_category(row.session_name.trim(), row.category.trim());
            }
        }

        Ok(catalog)
    }

    pub fn save_mappings(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(path)?;
        for (raw, parsed) in &self.mappings {
            wtr.serialize(MappingRow {
                raw_session_name: raw.clone(),
                parsed_session_name: parsed.clone(),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn save_types(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(path)?;
        for (name, category) in &self.categories {
            wtr.serialize(TypeRow {
                session_name: name.clone(),
                category: category.clone(),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Add `raw → parsed` unless `raw` is already mapped. Returns whether it was added.
    pub fn add_mapping(&mut self, raw: &str, parsed: &str) -> bool {
        if raw.is_empty() || parsed.is_empty() || self.mappings.contains_key(raw) {
            return false;
        }
        self.mappings.insert(raw.to_string(), parsed.to_string());
        self.normalized_mappings
            .entry(normalize_label(raw))
            .or_insert_with(|| parsed.to_string());
        true
    }

    /// Mark `raw` as deliberately unmapped, unless it is already mapped.
    pub fn skip(&mut self, raw: &str) -> bool {
        self.add_mapping(raw, SKIP_SENTINEL)
    }

    /// Add `name → category` unless `name` already has one.
    pub fn add_category(&mut self, name: &str, category: &str) -> bool {
        if name.is_empty() || category.is_empty() || self.categories.contains_key(name) {
            return false;
        }
        self.categories
            .insert(name.to_string(), category.to_string());
        self.normalized_canonical
            .entry(normalize_label(name))
            .or_insert_with(|| name.to_string());
        true
    }

    pub fn resolve(&self, raw: &str) -> Resolution {
        if let Some(parsed) = self.mappings.get(raw) {
            return mapped(parsed);
        }

        let key = normalize_label(raw);

        if let Some(parsed) = self.normalized_mappings.get(&key) {
            return mapped(parsed);
        }

        if self.categories.contains_key(raw) {
            return Resolution::Canonical(raw.to_string());
        }

        match self.normalized_canonical.get(&key) {
            Some(name) => Resolution::Canonical(name.clone()),
            None => Resolution::Unmapped,
        }
    }

    /// Canonical name for a raw label; unmapped and skipped labels pass through.
    pub fn canonical_name(&self, raw: &str) -> String {
        match self.resolve(raw) {
            Resolution::Mapped(name) | Resolution::Canonical(name) => name,
            Resolution::Skipped | Resolution::Unmapped => raw.to_string(),
        }
    }

    pub fn category(&self, canonical: &str) -> Option<&str> {
        self.categories.get(canonical).map(String::as_str)
    }

    /// Fill in the canonical name and category of a parsed definition.
    pub fn canonicalize(&self, mut def: SessionDefinition) -> SessionDefinition {
        def.canonical_name = self.canonical_name(&def.raw_label);
        def.category = self.category(&def.canonical_name).map(str::to_string);
        def
    }

    pub fn is_skipped(&self, raw: &str) -> bool {
        self.resolve(raw) == Resolution::Skipped
    }

    pub fn canonical_names(&self) -> BTreeSet<String> {
        self.categories.keys().cloned().collect()
    }

    pub fn categories(&self) -> &BTreeMap<String, String> {
        &self.categories
    }

    pub fn mappings(&self) -> &BTreeMap<String, String> {
        &self.mappings
    }

    /// Labels with neither a mapping nor a canonical match.
    pub fn find_unmapped<'a>(&self, labels: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
        labels
            .into_iter()
            .filter(|l| self.resolve(l) == Resolution::Unmapped)
            .map(str::to_string)
            .collect()
    }

    /// Session names (after mapping) without a category. Skipped labels are
    /// excluded: they were acknowledged on purpose.
    pub fn find_uncategorized<'a>(
        &self,
        raw_labels: impl IntoIterator<Item = &'a str>,
    ) -> BTreeSet<String> {
        raw_labels
            .into_iter()
            .filter(|l| !self.is_skipped(l))
            .map(|l| self.canonical_name(l))
            .filter(|name| !self.categories.contains_key(name))
            .collect()
    }
}

fn mapped(parsed: &str) -> Resolution {
    if parsed == SKIP_SENTINEL {
        Resolution::Skipped
    } else {
        Resolution::Mapped(parsed.to_string())
    }
}
