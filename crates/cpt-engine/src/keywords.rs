//! Keyword expansion table.
//!
//! Maps a query term to related procedure terms so that keyword search finds
//! codes whose descriptions use clinical vocabulary the query does not
//! ("parotid" finds "parotidectomy"). Expansion only widens recall.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::types::{CatalogError, CatalogResult};

/// Built-in ENT expansion table: `(term, related terms)`.
const DEFAULT_EXPANSIONS: &[(&str, &[&str])] = &[
    ("parotid", &["parotidectomy", "salivary"]),
    ("salivary", &["parotid", "submandibular", "sialendoscopy"]),
    ("tonsil", &["tonsillectomy"]),
    ("tonsils", &["tonsillectomy"]),
    ("adenoid", &["adenoidectomy"]),
    ("adenoids", &["adenoidectomy"]),
    ("sinus", &["sinusotomy", "ethmoidectomy", "antrostomy", "sinusoscopy"]),
    ("sinuses", &["sinusotomy", "ethmoidectomy", "antrostomy", "sinusoscopy"]),
    ("ear", &["tympanostomy", "myringotomy", "tympanoplasty"]),
    ("ears", &["tympanostomy", "myringotomy", "tympanoplasty"]),
    ("tube", &["tympanostomy"]),
    ("tubes", &["tympanostomy"]),
    ("eardrum", &["tympanoplasty", "myringotomy", "myringoplasty"]),
    ("nose", &["nasal", "rhinoplasty", "septoplasty"]),
    ("nasal", &["septoplasty", "turbinate", "rhinoplasty"]),
    ("septum", &["septoplasty"]),
    ("deviated", &["septoplasty"]),
    ("turbinates", &["turbinate"]),
    ("thyroid", &["thyroidectomy", "thyroid lobectomy"]),
    ("larynx", &["laryngoscopy", "laryngeal"]),
    ("voice", &["laryngoscopy", "vocal"]),
    ("throat", &["pharyngeal", "laryngoscopy", "tonsillectomy"]),
    ("hearing", &["audiometry", "audiologic"]),
    ("scope", &["endoscopy", "laryngoscopy"]),
    ("endoscopic", &["endoscopy"]),
    ("airway", &["tracheostomy", "tracheotomy", "bronchoscopy"]),
    ("neck", &["neck dissection", "lymphadenectomy"]),
    ("mastoid", &["mastoidectomy"]),
    ("nosebleed", &["epistaxis"]),
    ("bleeding", &["epistaxis", "hemorrhage"]),
];

/// Deterministic term expansion table.
///
/// Terms are stored lower-cased; related terms keep their authored order.
///
/// # Example
///
/// ```
/// use cpt_engine::KeywordExpander;
///
/// let expander = KeywordExpander::new();
/// assert_eq!(expander.expand("Parotid"), vec!["parotid", "parotidectomy", "salivary"]);
/// assert_eq!(expander.expand("stapes"), vec!["stapes"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeywordExpander {
    /// Term to related terms.
    table: HashMap<String, Vec<String>>,
    /// Terms in insertion order, for deterministic iteration.
    order: Vec<String>,
}

impl KeywordExpander {
    /// Creates an expander with the built-in ENT table.
    pub fn new() -> Self {
        DEFAULT_EXPANSIONS
            .iter()
            .fold(Self::empty(), |expander, (term, related)| {
                expander.with_entry(term, related.iter().copied())
            })
    }

    /// Creates an expander with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds related terms for `term`, merging with any existing entry.
    pub fn with_entry<I, S>(mut self, term: &str, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = normalize(term);
        if key.is_empty() {
            return self;
        }

        if !self.table.contains_key(&key) {
            self.order.push(key.clone());
        }
        let terms = self.table.entry(key.clone()).or_default();
        for r in related {
            let r = normalize(r.as_ref());
            if !r.is_empty() && r != key && !terms.contains(&r) {
                terms.push(r);
            }
        }
        self
    }

    /// Reads a JSON table of the form `{"term": ["related", ...]}`.
    ///
    /// Entries are added in key order on top of `self`.
    pub fn merge_json_reader<R: Read>(self, reader: R) -> CatalogResult<Self> {
        let table: BTreeMap<String, Vec<String>> = serde_json::from_reader(reader)?;
        Ok(table
            .iter()
            .fold(self, |expander, (term, related)| expander.with_entry(term, related)))
    }

    /// Reads a JSON table from a file. See [`merge_json_reader`](Self::merge_json_reader).
    pub fn merge_json_path<P: AsRef<Path>>(self, path: P) -> CatalogResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let file = File::open(path)?;
        self.merge_json_reader(BufReader::new(file))
    }

    /// Expands a term into itself plus its related terms.
    ///
    /// The result is lower-cased and free of duplicates, with the term first.
    /// Unknown terms expand to just themselves; a blank term expands to nothing.
    pub fn expand(&self, term: &str) -> Vec<String> {
        let key = normalize(term);
        if key.is_empty() {
            return Vec::new();
        }

        let mut terms = vec![key.clone()];
        if let Some(related) = self.table.get(&key) {
            terms.extend(related.iter().cloned());
        }
        terms
    }

    /// Returns every configured related term, without duplicates, in table order.
    pub fn synonym_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = Vec::new();
        for key in &self.order {
            for related in &self.table[key] {
                if !terms.contains(&related.as_str()) {
                    terms.push(related);
                }
            }
        }
        terms
    }

    /// Returns the number of terms with an expansion.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no expansions are configured.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}
