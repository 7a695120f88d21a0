//! Catalog table parser.
//!
//! Provides a streaming parser for delimited CPT code tables. Header names are
//! resolved once, through a fixed alias table, when the parser is created.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use cpt_types::CodeEntry;
use csv::{Reader, ReaderBuilder, StringRecord};

use crate::types::{CatalogConfig, CatalogError, CatalogResult};

/// Accepted header names per field, compared after lower-casing and trimming.
const CODE_HEADERS: &[&str] = &["code", "cpt_code", "cpt code", "cpt"];
const DESCRIPTION_HEADERS: &[&str] = &["description", "desc", "long_description"];
const CATEGORY_HEADERS: &[&str] = &["category"];
const SUBSPECIALTY_HEADERS: &[&str] = &["subspecialty", "sub_specialty"];
const RELATED_HEADERS: &[&str] = &["related_codes", "related"];
const KEY_INDICATOR_HEADERS: &[&str] = &["key_indicator", "keyindicator", "key indicator"];
const CHARGE_HEADERS: &[&str] = &["standard_charge", "standard_charge|gross", "charge"];

/// Column positions resolved from a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    code: usize,
    description: usize,
    category: Option<usize>,
    subspecialty: Option<usize>,
    related_codes: Option<usize>,
    key_indicator: Option<usize>,
    standard_charge: Option<usize>,
}

impl ColumnMap {
    /// Resolves column positions from a header row.
    ///
    /// # Errors
    /// Returns `MissingColumn` if the code or description column is absent.
    pub fn resolve(headers: &StringRecord) -> CatalogResult<Self> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();

        let find = |aliases: &[&str]| {
            normalized
                .iter()
                .position(|h| aliases.contains(&h.as_str()))
        };

        let code = find(CODE_HEADERS).ok_or_else(|| CatalogError::MissingColumn {
            column: "code".to_string(),
        })?;
        let description = find(DESCRIPTION_HEADERS).ok_or_else(|| CatalogError::MissingColumn {
            column: "description".to_string(),
        })?;

        Ok(Self {
            code,
            description,
            category: find(CATEGORY_HEADERS),
            subspecialty: find(SUBSPECIALTY_HEADERS),
            related_codes: find(RELATED_HEADERS),
            key_indicator: find(KEY_INDICATOR_HEADERS),
            standard_charge: find(CHARGE_HEADERS),
        })
    }

    /// Builds an entry from a data row.
    ///
    /// Returns `Ok(None)` when the row has no code.
    pub fn entry_from_record(&self, record: &StringRecord) -> CatalogResult<Option<CodeEntry>> {
        let code = parse::code(field(record, Some(self.code)));
        if code.is_empty() {
            return Ok(None);
        }

        let key_indicator = parse::key_indicator(field(record, self.key_indicator)).ok_or_else(
            || CatalogError::InvalidBoolean {
                code: code.clone(),
                value: field(record, self.key_indicator).to_string(),
            },
        )?;

        let standard_charge = parse::standard_charge(field(record, self.standard_charge))
            .ok_or_else(|| CatalogError::InvalidCharge {
                code: code.clone(),
                value: field(record, self.standard_charge).to_string(),
            })?;

        let related_codes = parse::related_codes(field(record, self.related_codes), &code);

        Ok(Some(CodeEntry {
            description: field(record, Some(self.description)).trim().to_string(),
            category: parse::label(field(record, self.category)),
            subspecialty: parse::label(field(record, self.subspecialty)),
            related_codes,
            key_indicator,
            standard_charge,
            code,
        }))
    }
}

fn field(record: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| record.get(i)).unwrap_or("")
}

/// A streaming parser for catalog tables.
pub struct CatalogParser<R: Read> {
    reader: Reader<R>,
    columns: ColumnMap,
    rows_read: usize,
    rows_skipped: usize,
    last_line: u64,
}

impl CatalogParser<BufReader<File>> {
    /// Creates a new parser from a file path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or the header lacks a
    /// required column.
    pub fn from_path<P: AsRef<Path>>(path: P, config: &CatalogConfig) -> CatalogResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CatalogError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), config)
    }
}

impl<R: Read> CatalogParser<R> {
    /// Creates a new parser from a reader.
    pub fn from_reader(reader: R, config: &CatalogConfig) -> CatalogResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(config.delimiter)
            .has_headers(true)
            .flexible(config.flexible)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let columns = ColumnMap::resolve(csv_reader.headers()?)?;

        Ok(Self {
            reader: csv_reader,
            columns,
            rows_read: 0,
            rows_skipped: 0,
            last_line: 0,
        })
    }

    /// Returns the resolved column positions.
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Returns the number of data rows read so far.
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Returns the number of rows skipped because they had no code.
    pub fn rows_skipped(&self) -> usize {
        self.rows_skipped
    }

    /// Returns the source line of the record most recently read.
    pub fn current_line(&self) -> u64 {
        self.last_line
    }
}

impl<R: Read> Iterator for CatalogParser<R> {
    type Item = CatalogResult<CodeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    // Fully blank rows are not data
                    if record.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }
                    self.rows_read += 1;
                    self.last_line = record.position().map(|p| p.line()).unwrap_or(0);

                    match self.columns.entry_from_record(&record) {
                        Ok(Some(entry)) => return Some(Ok(entry)),
                        Ok(None) => {
                            self.rows_skipped += 1;
                            continue;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Helper functions for parsing catalog field values.
pub mod parse {
    /// Normalizes a code cell.
    ///
    /// Spreadsheet exports sometimes write numeric codes as floats
    /// (`31231.0`); the fractional zero is dropped.
    pub fn code(value: &str) -> String {
        let value = value.trim();
        match value.strip_suffix(".0") {
            Some(int) if !int.is_empty() && int.chars().all(|c| c.is_ascii_digit()) => {
                int.to_string()
            }
            _ => value.to_string(),
        }
    }

    /// Parses a key indicator flag. Blank means false.
    pub fn key_indicator(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" | "t" | "1" | "1.0" => Some(true),
            "no" | "n" | "false" | "f" | "0" | "0.0" | "" => Some(false),
            _ => None,
        }
    }

    /// Parses a standard charge, ignoring currency symbols and thousands
    /// separators. Blank means zero.
    pub fn standard_charge(value: &str) -> Option<f64> {
        let cleaned: String = value
            .trim()
            .chars()
            .filter(|c| *c != '$' && *c != ',')
            .collect();

        if cleaned.is_empty() {
            return Some(0.0);
        }

        cleaned
            .parse::<f64>()
            .ok()
            .filter(|charge| charge.is_finite() && *charge >= 0.0)
    }

    /// Splits a comma-separated related-code cell.
    ///
    /// Blanks, duplicates and references to `own_code` are dropped.
    pub fn related_codes(value: &str, own_code: &str) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        for part in value.split(',') {
            let related = code(part);
            if related.is_empty() || related == own_code || codes.contains(&related) {
                continue;
            }
            codes.push(related);
        }
        codes
    }

    /// Parses an optional label cell.
    pub fn label(value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}
