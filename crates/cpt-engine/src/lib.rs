//! # cpt-engine
//!
//! CPT code catalog, keyword matcher and coding rule engine for ENT
//! procedures.
//!
//! ## Components
//!
//! - [`CodeCatalog`]: read-only index over a delimited code table
//! - [`KeywordExpander`]: query term expansion table
//! - [`Matcher`]: exact and keyword search, ranked
//! - [`RuleEngine`]: ordered coding rules producing an [`AnalysisResult`](cpt_types::AnalysisResult)
//! - [`CatalogHandle`]: reloadable shared snapshot of catalog and matcher
//!
//! ## Features
//!
//! - `parallel` (default): builds the keyword index with rayon.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use cpt_engine::{CatalogConfig, CodeCatalog, KeywordExpander, Matcher, RuleEngine};
//!
//! let catalog = Arc::new(CodeCatalog::from_path("ent_codes.csv", &CatalogConfig::default())?);
//! let matcher = Matcher::new(Arc::clone(&catalog), KeywordExpander::new());
//!
//! let candidates: Vec<String> = matcher
//!     .search("bilateral myringotomy with tubes", 10)
//!     .into_iter()
//!     .map(|c| c.code)
//!     .collect();
//!
//! let result = RuleEngine::new().analyze_procedure(
//!     "bilateral myringotomy with tubes",
//!     &candidates,
//!     &catalog,
//! );
//! println!("{:?}", result.recommended_codes);
//! ```

#![warn(missing_docs)]

mod catalog;
mod handle;
mod keywords;
mod matcher;
pub mod parser;
pub mod rules;
pub mod types;

pub use catalog::CodeCatalog;
pub use handle::{CatalogHandle, CatalogSnapshot};
pub use keywords::KeywordExpander;
pub use matcher::{rank_candidates, Matcher};
pub use parser::CatalogParser;
pub use rules::{Rule, RuleEngine, RuleError, RuleOutcome, RuleResult};
pub use types::{CatalogConfig, CatalogError, CatalogResult, LoadStats, MatcherConfig};

// Re-export cpt-types for convenience
pub use cpt_types;
