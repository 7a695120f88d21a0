//! Engine-level error, configuration and statistics types.

use thiserror::Error;

/// Errors that can occur while loading a code catalog or synonym table.
///
/// Any of these aborts catalog construction.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// I/O error reading the source table.
    #[error("IO error reading catalog: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Source file not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Required column missing from the header row.
    #[error("Missing required column: {column}")]
    MissingColumn {
        /// The logical name of the missing column.
        column: String,
    },

    /// The same code appears on more than one row.
    #[error("Duplicate CPT code {code} on line {line}")]
    DuplicateCode {
        /// The repeated code.
        code: String,
        /// The line of the second occurrence.
        line: u64,
    },

    /// Unrecognized key indicator value.
    #[error("Invalid key indicator for code {code}: {value} (expected yes/no)")]
    InvalidBoolean {
        /// The row's code.
        code: String,
        /// The offending value.
        value: String,
    },

    /// Unparsable or negative standard charge.
    #[error("Invalid standard charge for code {code}: {value}")]
    InvalidCharge {
        /// The row's code.
        code: String,
        /// The offending value.
        value: String,
    },

    /// Malformed synonym table.
    #[error("Invalid synonym table: {0}")]
    Synonyms(#[from] serde_json::Error),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Configuration for reading a catalog table.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Field delimiter.
    pub delimiter: u8,
    /// Whether rows may have fewer or more fields than the header.
    pub flexible: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            flexible: true,
        }
    }
}

impl CatalogConfig {
    /// Creates a config for tab-delimited exports.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }
}

/// Configuration for the keyword matcher.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Description words must be longer than this to be indexed.
    pub min_word_len: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self { min_word_len: 3 }
    }
}

/// Statistics from loading a catalog table.
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    /// Data rows read from the source.
    pub rows_read: usize,
    /// Codes loaded into the catalog.
    pub codes_loaded: usize,
    /// Rows skipped because they had no code.
    pub rows_skipped: usize,
    /// Codes flagged as key indicators.
    pub key_indicators: usize,
    /// Codes with a known standard charge.
    pub charged_codes: usize,
    /// Time taken to load in milliseconds.
    pub load_time_ms: u64,
}

impl LoadStats {
    /// Returns the percentage of rows that became catalog entries.
    pub fn load_rate(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            (self.codes_loaded as f64 / self.rows_read as f64) * 100.0
        }
    }
}
