//! CPT catalog row type.
//!
//! This module provides the `CodeEntry` struct representing one row of the
//! procedure code table, and the `CodeNotFound` lookup miss.

use std::fmt;

/// A CPT code from the procedure catalog.
///
/// # Examples
///
/// ```
/// use cpt_types::CodeEntry;
///
/// let entry = CodeEntry::new("31231", "Nasal endoscopy, diagnostic")
///     .with_related_codes(["31233"]);
///
/// assert!(entry.is_related_to("31233"));
/// assert!(!entry.has_charge());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeEntry {
    /// The CPT code, unique within a catalog.
    pub code: String,
    /// Free-text procedure description.
    pub description: String,
    /// Classification label (e.g. "Sinus", "Ear").
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: Option<String>,
    /// Subspecialty label (e.g. "Rhinology", "Otology").
    #[cfg_attr(feature = "serde", serde(default))]
    pub subspecialty: Option<String>,
    /// Related codes, in authored order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub related_codes: Vec<String>,
    /// Whether this code must be prioritized when it applies.
    #[cfg_attr(feature = "serde", serde(default))]
    pub key_indicator: bool,
    /// Standard charge amount. Zero means unknown or not applicable.
    #[cfg_attr(feature = "serde", serde(default))]
    pub standard_charge: f64,
}

impl CodeEntry {
    /// Creates an entry with only a code and description.
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            category: None,
            subspecialty: None,
            related_codes: Vec::new(),
            key_indicator: false,
            standard_charge: 0.0,
        }
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the subspecialty.
    pub fn with_subspecialty(mut self, subspecialty: impl Into<String>) -> Self {
        self.subspecialty = Some(subspecialty.into());
        self
    }

    /// Sets the related codes.
    pub fn with_related_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the key indicator flag.
    pub fn with_key_indicator(mut self, key_indicator: bool) -> Self {
        self.key_indicator = key_indicator;
        self
    }

    /// Sets the standard charge.
    pub fn with_standard_charge(mut self, charge: f64) -> Self {
        self.standard_charge = charge;
        self
    }

    /// Returns true if a standard charge is known.
    pub fn has_charge(&self) -> bool {
        self.standard_charge > 0.0
    }

    /// Returns true if `code` is listed among this entry's related codes.
    pub fn is_related_to(&self, code: &str) -> bool {
        self.related_codes.iter().any(|c| c == code)
    }
}

/// A catalog lookup miss.
///
/// Returned as a value from catalog lookups; never a panic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeNotFound {
    /// The code that was requested.
    pub code: String,
}

impl CodeNotFound {
    /// Creates a miss for the given code.
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl fmt::Display for CodeNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CPT code {} not found", self.code)
    }
}

impl std::error::Error for CodeNotFound {}
