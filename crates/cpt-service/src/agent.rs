//! CPT coding agent.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use cpt_engine::{CatalogConfig, CatalogError, CatalogHandle, CodeCatalog, KeywordExpander, RuleEngine};
use cpt_types::{AnalysisResult, CodeEntry, CodeNotFound, ScoredCandidate, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Catalog location used when none is configured.
pub const DEFAULT_CATALOG_PATH: &str = "data/ent_cpt_codes.csv";

/// Errors returned by the coding agent.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Catalog or synonym table could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A requested code is not in the catalog.
    #[error(transparent)]
    CodeNotFound(#[from] CodeNotFound),
}

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Failure reported by a [`TextGenerator`].
#[derive(Error, Debug)]
#[error("Text generation failed: {message}")]
pub struct GeneratorError {
    /// What went wrong.
    pub message: String,
}

impl GeneratorError {
    /// Creates a generator error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Produces narrative text for a procedure from ranked candidates.
///
/// The output is opaque to the agent.
pub trait TextGenerator: Send + Sync {
    /// Generates narrative text.
    fn generate(
        &self,
        procedure_text: &str,
        candidates: &[ScoredCandidate],
    ) -> Result<String, GeneratorError>;
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Catalog table path.
    pub catalog_path: PathBuf,
    /// Optional JSON synonym table merged over the built-in expansions.
    pub synonyms_path: Option<PathBuf>,
    /// Catalog reader settings.
    pub catalog: CatalogConfig,
    /// Result limit used when a caller passes 0.
    pub default_limit: usize,
    /// Number of candidates gathered for a recommendation.
    pub recommend_limit: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            synonyms_path: None,
            catalog: CatalogConfig::default(),
            default_limit: 10,
            recommend_limit: 15,
        }
    }
}

/// Result of [`CodingAgent::recommend`].
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    /// Ranked search candidates.
    pub candidates: Vec<ScoredCandidate>,
    /// Rule analysis over the candidate codes.
    pub analysis: AnalysisResult,
    /// Generated narrative, if a generator is configured and succeeded.
    pub narrative: Option<String>,
    /// CPT codes mentioned in the narrative.
    pub narrative_codes: Vec<String>,
}

/// Catalog and rule summary.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `healthy`, or `empty` when no codes are loaded.
    pub status: String,
    /// Number of codes in the catalog.
    pub codes_loaded: usize,
    /// Number of key indicator codes.
    pub key_indicators_loaded: usize,
    /// Number of codes with a standard charge.
    pub standard_charges_loaded: usize,
    /// Category labels in catalog order.
    pub categories: Vec<String>,
    /// Registered rule ids in execution order.
    pub rules: Vec<String>,
}

/// Front end over the catalog, matcher and rule engine.
///
/// # Example
///
/// ```ignore
/// let agent = CodingAgent::from_config(&AgentConfig::default())?;
///
/// let result = agent.analyze_procedure("bilateral myringotomy with tubes", None);
/// println!("{:?}", result.recommended_codes);
/// ```
pub struct CodingAgent {
    handle: Arc<CatalogHandle>,
    engine: RuleEngine,
    generator: Option<Box<dyn TextGenerator>>,
    config: AgentConfig,
}

impl std::fmt::Debug for CodingAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodingAgent")
            .field("engine", &self.engine)
            .field("generator", &self.generator.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl CodingAgent {
    /// Creates an agent over an existing handle and engine.
    pub fn new(handle: Arc<CatalogHandle>, engine: RuleEngine) -> Self {
        Self {
            handle,
            engine,
            generator: None,
            config: AgentConfig::default(),
        }
    }

    /// Loads the catalog and synonym table named in `config` and builds an agent
    /// with the built-in rules.
    pub fn from_config(config: &AgentConfig) -> AgentResult<Self> {
        tracing::info!("Loading CPT catalog from: {}", config.catalog_path.display());
        let (catalog, stats) = CodeCatalog::load_with_stats(&config.catalog_path, &config.catalog)?;
        tracing::info!(
            "Catalog loaded: {} of {} rows in {}ms",
            stats.codes_loaded,
            stats.rows_read,
            stats.load_time_ms
        );

        let mut expander = KeywordExpander::new();
        if let Some(ref path) = config.synonyms_path {
            tracing::info!("Loading synonym table from: {}", path.display());
            expander = expander.merge_json_path(path)?;
        }

        let handle = Arc::new(CatalogHandle::new(catalog, expander));
        Ok(Self::new(handle, RuleEngine::new()).with_config(config.clone()))
    }

    /// Sets the agent configuration.
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the narrative generator.
    pub fn with_generator(mut self, generator: Box<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Returns the catalog handle.
    pub fn handle(&self) -> &Arc<CatalogHandle> {
        &self.handle
    }

    /// Returns the rule engine.
    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Searches for candidate codes. A `limit` of 0 uses the configured default.
    pub fn search(&self, query: &str, limit: usize) -> Vec<ScoredCandidate> {
        let limit = if limit == 0 {
            self.config.default_limit
        } else {
            limit
        };
        self.handle.current().matcher().search(query, limit)
    }

    /// Runs the rule engine over candidate codes.
    ///
    /// With `None`, candidates come from [`search`](Self::search) with the
    /// default limit.
    pub fn analyze_procedure(
        &self,
        procedure_text: &str,
        candidate_codes: Option<Vec<String>>,
    ) -> AnalysisResult {
        let snapshot = self.handle.current();
        let codes = candidate_codes.unwrap_or_else(|| {
            snapshot
                .matcher()
                .search(procedure_text, self.config.default_limit)
                .into_iter()
                .map(|c| c.code)
                .collect()
        });
        self.engine
            .analyze_procedure(procedure_text, &codes, snapshot.catalog())
    }

    /// Validates a code.
    pub fn validate(&self, code: &str) -> ValidationResult {
        self.handle.current().catalog().validate(code)
    }

    /// Looks up a code.
    pub fn get_details(&self, code: &str) -> Result<CodeEntry, CodeNotFound> {
        self.handle.current().catalog().get_details(code).cloned()
    }

    /// Lists the codes in a category, in catalog order.
    pub fn category_codes(&self, category: &str) -> Vec<CodeEntry> {
        self.handle
            .current()
            .catalog()
            .get_by_category(category)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Lists category labels in catalog order.
    pub fn categories(&self) -> Vec<String> {
        self.handle.current().catalog().categories().to_vec()
    }

    /// Returns coding tips for a code.
    pub fn coding_tips(&self, code: &str, procedure_text: &str) -> Vec<String> {
        let snapshot = self.handle.current();
        self.engine
            .coding_tips(code, procedure_text, snapshot.catalog())
    }

    /// Returns rule descriptions keyed by id.
    pub fn rule_descriptions(&self) -> BTreeMap<String, String> {
        self.engine
            .rule_descriptions()
            .into_iter()
            .map(|(id, description)| (id.to_string(), description.to_string()))
            .collect()
    }

    /// Searches, analyzes, and asks the generator for a narrative.
    ///
    /// A generator failure is logged and leaves `narrative` empty; the rest
    /// of the recommendation is still returned.
    pub fn recommend(&self, procedure_text: &str) -> Recommendation {
        let snapshot = self.handle.current();
        let candidates = snapshot
            .matcher()
            .search(procedure_text, self.config.recommend_limit);
        let codes: Vec<String> = candidates.iter().map(|c| c.code.clone()).collect();
        let analysis = self
            .engine
            .analyze_procedure(procedure_text, &codes, snapshot.catalog());

        let narrative = self.generator.as_ref().and_then(|generator| {
            match generator.generate(procedure_text, &candidates) {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!("Narrative generation failed: {}", e);
                    None
                }
            }
        });
        let narrative_codes = narrative
            .as_deref()
            .map(extract_cpt_codes)
            .unwrap_or_default();

        Recommendation {
            candidates,
            analysis,
            narrative,
            narrative_codes,
        }
    }

    /// Reloads the catalog from the configured path.
    ///
    /// On failure the current catalog stays active.
    pub fn reload(&self) -> AgentResult<()> {
        self.handle
            .reload_from_path(&self.config.catalog_path, &self.config.catalog)?;
        Ok(())
    }

    /// Summarizes the loaded catalog and rules.
    pub fn health(&self) -> HealthReport {
        let snapshot = self.handle.current();
        let catalog = snapshot.catalog();

        HealthReport {
            status: if catalog.is_empty() { "empty" } else { "healthy" }.to_string(),
            codes_loaded: catalog.len(),
            key_indicators_loaded: catalog.key_indicator_count(),
            standard_charges_loaded: catalog.charged_count(),
            categories: catalog.categories().to_vec(),
            rules: self.engine.rules().map(|r| r.id.clone()).collect(),
        }
    }
}

static CPT_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{5}(?:-\d{1,2})?\b").expect("CPT code pattern is valid")
});

/// Finds CPT codes (five digits, optional `-N`/`-NN` modifier) in free text.
pub fn extract_cpt_codes(text: &str) -> Vec<String> {
    CPT_CODE_RE.find_iter(text).map(|m| m.as_str().to_string()).collect()
}
