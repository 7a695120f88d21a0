//! # cpt-types
//!
//! Type definitions for CPT procedure code recommendation.
//!
//! This crate provides the data model shared by the catalog, the matcher and
//! the rule engine: catalog rows, rule definitions, scored search candidates
//! and analysis results.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use cpt_types::{modifier, CodeEntry, MatchQuality, ScoredCandidate};
//!
//! let entry = CodeEntry::new("69436", "Tympanostomy with tubes, general anesthesia")
//!     .with_category("Ear")
//!     .with_key_indicator(true)
//!     .with_standard_charge(1250.0);
//!
//! assert!(entry.has_charge());
//!
//! let candidate = ScoredCandidate::exact("69436");
//! assert_eq!(candidate.match_quality, MatchQuality::Exact);
//!
//! assert_eq!(modifier::base_code("69436-50"), "69436");
//! ```

#![warn(missing_docs)]

mod analysis;
mod code;
pub mod modifier;
mod rule;
mod search;
mod validation;

// Re-export all public types at crate root
pub use analysis::{AnalysisResult, AnalysisStatus, Explanation};
pub use code::{CodeEntry, CodeNotFound};
pub use rule::CodeRule;
pub use search::{MatchQuality, ScoredCandidate, EXACT_SCORE};
pub use validation::ValidationResult;
