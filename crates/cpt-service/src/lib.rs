//! # cpt-service
//!
//! Coding agent over the CPT engine.
//!
//! [`CodingAgent`] owns a reloadable catalog handle and a rule engine, and
//! exposes the search, analysis and lookup operations used by the
//! `cpt-agent` binary. Free-text narrative is delegated to an optional
//! [`TextGenerator`].

#![warn(missing_docs)]

mod agent;

pub use agent::{
    extract_cpt_codes, AgentConfig, AgentError, AgentResult, CodingAgent, GeneratorError,
    HealthReport, Recommendation, TextGenerator, DEFAULT_CATALOG_PATH,
};

// Re-export engine types for convenience
pub use cpt_engine::{CatalogConfig, CatalogHandle, KeywordExpander, RuleEngine};
