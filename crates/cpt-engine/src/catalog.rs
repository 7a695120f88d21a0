//! In-memory CPT code catalog.
//!
//! Provides lookup, category listing, validation and substring search over a
//! loaded code table. A catalog never changes after construction; reloading
//! means building a new one (see [`CatalogHandle`](crate::CatalogHandle)).
//!
//! ```ignore
//! let catalog = CodeCatalog::from_path("ent_codes.csv", &CatalogConfig::default())?;
//!
//! let entry = catalog.get_details("31231")?;
//! let sinus = catalog.get_by_category("Sinus");
//! let hits = catalog.search_substring("endoscopy");
//! ```

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use cpt_types::{CodeEntry, CodeNotFound, ValidationResult};

use crate::parser::CatalogParser;
use crate::types::{CatalogConfig, CatalogError, CatalogResult, LoadStats};

/// Read-only index over a CPT code table.
#[derive(Default)]
pub struct CodeCatalog {
    /// Entries in source order.
    entries: Vec<CodeEntry>,
    /// Code to position in `entries`.
    by_code: HashMap<String, usize>,
    /// Category label to positions, in source order.
    by_category: HashMap<String, Vec<usize>>,
    /// Subspecialty label to positions, in source order.
    by_subspecialty: HashMap<String, Vec<usize>>,
    /// Category labels in first-seen order.
    category_order: Vec<String>,
}

impl std::fmt::Debug for CodeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeCatalog")
            .field("entries", &self.entries.len())
            .field("by_category", &self.by_category.len())
            .field("by_subspecialty", &self.by_subspecialty.len())
            .finish()
    }
}

impl CodeCatalog {
    /// Builds a catalog from entries.
    ///
    /// # Errors
    /// Returns `DuplicateCode` if two entries share a code. The reported line
    /// is the 1-based position of the second entry.
    pub fn from_entries(entries: impl IntoIterator<Item = CodeEntry>) -> CatalogResult<Self> {
        let mut catalog = Self::default();
        for (i, entry) in entries.into_iter().enumerate() {
            catalog.push(entry, i as u64 + 1)?;
        }
        Ok(catalog)
    }

    /// Loads a catalog from a delimited reader.
    pub fn from_reader<R: Read>(reader: R, config: &CatalogConfig) -> CatalogResult<Self> {
        let parser = CatalogParser::from_reader(reader, config)?;
        Self::from_parser(parser).map(|(catalog, _)| catalog)
    }

    /// Loads a catalog from a delimited file.
    pub fn from_path<P: AsRef<Path>>(path: P, config: &CatalogConfig) -> CatalogResult<Self> {
        Self::load_with_stats(path, config).map(|(catalog, _)| catalog)
    }

    /// Loads a catalog from a delimited file and reports load statistics.
    pub fn load_with_stats<P: AsRef<Path>>(
        path: P,
        config: &CatalogConfig,
    ) -> CatalogResult<(Self, LoadStats)> {
        let parser = CatalogParser::from_path(path, config)?;
        Self::from_parser(parser)
    }

    fn from_parser<R: Read>(mut parser: CatalogParser<R>) -> CatalogResult<(Self, LoadStats)> {
        let start = Instant::now();
        let mut catalog = Self::default();

        while let Some(entry) = parser.next() {
            let entry = entry?;
            let line = parser.current_line();
            catalog.push(entry, line)?;
        }

        let stats = LoadStats {
            rows_read: parser.rows_read(),
            codes_loaded: catalog.len(),
            rows_skipped: parser.rows_skipped(),
            key_indicators: catalog.key_indicator_count(),
            charged_codes: catalog.charged_count(),
            load_time_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Loaded {} CPT codes, {} key indicators, {} with standard charges",
            stats.codes_loaded,
            stats.key_indicators,
            stats.charged_codes
        );

        Ok((catalog, stats))
    }

    fn push(&mut self, entry: CodeEntry, line: u64) -> CatalogResult<()> {
        if self.by_code.contains_key(&entry.code) {
            return Err(CatalogError::DuplicateCode {
                code: entry.code,
                line,
            });
        }

        let index = self.entries.len();
        self.by_code.insert(entry.code.clone(), index);

        if let Some(ref category) = entry.category {
            if !self.by_category.contains_key(category) {
                self.category_order.push(category.clone());
            }
            self.by_category
                .entry(category.clone())
                .or_default()
                .push(index);
        }

        if let Some(ref subspecialty) = entry.subspecialty {
            self.by_subspecialty
                .entry(subspecialty.clone())
                .or_default()
                .push(index);
        }

        self.entries.push(entry);
        Ok(())
    }

    // Query methods

    /// Gets a code's catalog entry.
    pub fn get_details(&self, code: &str) -> Result<&CodeEntry, CodeNotFound> {
        self.by_code
            .get(code)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| CodeNotFound::new(code))
    }

    /// Returns true if the code exists in the catalog.
    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// Gets all entries in a category, in catalog order.
    ///
    /// Unknown categories yield an empty list.
    pub fn get_by_category(&self, category: &str) -> Vec<&CodeEntry> {
        self.indexed(self.by_category.get(category))
    }

    /// Gets all entries in a subspecialty, in catalog order.
    pub fn get_by_subspecialty(&self, subspecialty: &str) -> Vec<&CodeEntry> {
        self.indexed(self.by_subspecialty.get(subspecialty))
    }

    fn indexed(&self, positions: Option<&Vec<usize>>) -> Vec<&CodeEntry> {
        positions
            .map(|ids| ids.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Returns category labels in the order they first appear.
    pub fn categories(&self) -> &[String] {
        &self.category_order
    }

    /// Validates that a code exists.
    pub fn validate(&self, code: &str) -> ValidationResult {
        match self.get_details(code) {
            Ok(entry) => ValidationResult::valid(code, entry.description.clone()),
            Err(_) => ValidationResult::invalid(code),
        }
    }

    /// Case-insensitive substring search over descriptions and codes.
    ///
    /// Results follow catalog order. A blank query matches nothing.
    pub fn search_substring(&self, query: &str) -> Vec<&CodeEntry> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|e| {
                e.description.to_lowercase().contains(&query)
                    || e.code.to_lowercase().contains(&query)
            })
            .collect()
    }

    // Statistics

    /// Returns the number of codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no codes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of key indicator codes.
    pub fn key_indicator_count(&self) -> usize {
        self.entries.iter().filter(|e| e.key_indicator).count()
    }

    /// Returns the number of codes with a known standard charge.
    pub fn charged_count(&self) -> usize {
        self.entries.iter().filter(|e| e.has_charge()).count()
    }

    /// Iterates over entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &CodeEntry> {
        self.entries.iter()
    }

    /// Returns the entry at a catalog position. Positions come from `iter()`.
    pub(crate) fn entry_at(&self, position: usize) -> &CodeEntry {
        &self.entries[position]
    }
}
