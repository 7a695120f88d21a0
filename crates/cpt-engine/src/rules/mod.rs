//! Coding rule pipeline.
//!
//! A [`RuleEngine`] holds a registry of [`Rule`] implementations sorted by
//! priority (highest first). Each analysis threads a running
//! `(recommended, excluded, explanations)` state through every rule in order.
//!
//! # Built-in rules
//!
//! | id   | priority | effect |
//! |------|----------|--------|
//! | R000 | 100 | sort by key indicator, then standard charge |
//! | R001 | 10  | exclude codes bundled with another candidate |
//! | R003 | 9   | post-operative visit advisory |
//! | R002 | 8   | append modifier 50 for bilateral procedures |
//! | R004 | 7   | multiple procedure (modifier 51) advisory |
//! | R005 | 6   | medical necessity reminder |
//!
//! # Usage
//!
//! ```ignore
//! let engine = RuleEngine::new();
//! let result = engine.analyze_procedure("bilateral nasal endoscopy", &candidates, &catalog);
//!
//! for explanation in &result.explanations {
//!     println!("[{}] {}", explanation.rule_id, explanation.message);
//! }
//! ```

mod advisory;
mod bilateral;
mod bundling;
mod priority;
mod tips;

use std::cmp::Reverse;
use std::collections::BTreeMap;

use cpt_types::{AnalysisResult, AnalysisStatus, CodeNotFound, CodeRule, Explanation};
use thiserror::Error;

use crate::catalog::CodeCatalog;

pub use advisory::{MedicalNecessityRule, MultipleProcedureRule, PostOperativeRule};
pub use bilateral::BilateralModifierRule;
pub use bundling::BundlingRule;
pub use priority::KeyIndicatorPriorityRule;
pub use tips::coding_tips;

/// Message returned when an analysis is requested without candidates.
pub const EMPTY_CANDIDATES_MESSAGE: &str = "No candidate codes provided for analysis";

/// Errors raised by a rule while it runs.
///
/// The engine logs these and skips the failing rule's contribution.
#[derive(Error, Debug)]
pub enum RuleError {
    /// A catalog lookup the rule depends on failed.
    #[error(transparent)]
    CodeNotFound(#[from] CodeNotFound),

    /// The rule could not complete.
    #[error("Rule {rule_id} failed: {message}")]
    Failed {
        /// The failing rule.
        rule_id: String,
        /// What went wrong.
        message: String,
    },
}

/// Result type for rule application.
pub type RuleResult<T> = Result<T, RuleError>;

/// The effect of applying one rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Replacement recommended list, or `None` to leave it unchanged.
    pub recommended: Option<Vec<String>>,
    /// Codes to add to the excluded set.
    pub excluded: Vec<String>,
    /// Messages to append.
    pub explanations: Vec<Explanation>,
}

impl RuleOutcome {
    /// An outcome that changes nothing.
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// An outcome that only adds explanations.
    pub fn explain(explanations: Vec<Explanation>) -> Self {
        Self {
            explanations,
            ..Self::default()
        }
    }
}

/// A coding rule that can be registered with a [`RuleEngine`].
///
/// Implementations must be pure functions of their inputs.
pub trait Rule: Send + Sync {
    /// The rule's id, description and priority.
    fn definition(&self) -> &CodeRule;

    /// Applies the rule to the current recommended list.
    fn apply(
        &self,
        procedure_text: &str,
        recommended: &[String],
        catalog: &CodeCatalog,
    ) -> RuleResult<RuleOutcome>;
}

/// Ordered pipeline of coding rules.
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| &r.definition().id))
            .finish()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    /// Creates an engine with the built-in coding rules.
    pub fn new() -> Self {
        let mut engine = Self::empty();
        engine.add_rule(Box::new(KeyIndicatorPriorityRule::new()));
        engine.add_rule(Box::new(BundlingRule::new()));
        engine.add_rule(Box::new(PostOperativeRule::new()));
        engine.add_rule(Box::new(BilateralModifierRule::new()));
        engine.add_rule(Box::new(MultipleProcedureRule::new()));
        engine.add_rule(Box::new(MedicalNecessityRule::new()));
        tracing::info!("Initialized {} CPT coding rules", engine.rules.len());
        engine
    }

    /// Creates an engine with no rules.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Registers a rule and re-sorts by priority, highest first.
    ///
    /// Rules with equal priority keep their registration order.
    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        tracing::debug!("Added rule: {}", rule.definition());
        self.rules.push(rule);
        self.rules.sort_by_key(|r| Reverse(r.definition().priority));
    }

    /// Returns rule definitions in execution order.
    pub fn rules(&self) -> impl Iterator<Item = &CodeRule> {
        self.rules.iter().map(|r| r.definition())
    }

    /// Returns rule descriptions keyed by rule id.
    pub fn rule_descriptions(&self) -> BTreeMap<&str, &str> {
        self.rules()
            .map(|r| (r.id.as_str(), r.description.as_str()))
            .collect()
    }

    /// Runs every rule over the candidate codes.
    ///
    /// Returns an error result only when `candidate_codes` is empty. A rule
    /// that fails is logged and skipped; the remaining rules still run.
    pub fn analyze_procedure(
        &self,
        procedure_text: &str,
        candidate_codes: &[String],
        catalog: &CodeCatalog,
    ) -> AnalysisResult {
        tracing::info!("Analyzing procedure: {}", procedure_text);
        tracing::debug!("Candidate codes: {:?}", candidate_codes);

        if candidate_codes.is_empty() {
            return AnalysisResult::error(procedure_text, EMPTY_CANDIDATES_MESSAGE);
        }

        let mut recommended = candidate_codes.to_vec();
        let mut excluded: Vec<String> = Vec::new();
        let mut explanations: Vec<Explanation> = Vec::new();

        for rule in &self.rules {
            let definition = rule.definition();
            tracing::debug!("Applying rule: {}", definition);

            match rule.apply(procedure_text, &recommended, catalog) {
                Ok(outcome) => {
                    if let Some(codes) = outcome.recommended {
                        recommended = codes;
                    }
                    for code in outcome.excluded {
                        if !excluded.contains(&code) {
                            excluded.push(code);
                        }
                    }
                    explanations.extend(outcome.explanations);
                }
                Err(e) => {
                    tracing::warn!("Error applying rule {}: {}", definition.id, e);
                }
            }
        }

        tracing::info!("Analysis complete. Recommended codes: {:?}", recommended);

        AnalysisResult {
            status: AnalysisStatus::Success,
            message: None,
            procedure_text: procedure_text.to_string(),
            recommended_codes: recommended,
            excluded_codes: excluded,
            explanations,
        }
    }

    /// Returns coding tips for a code in the context of a procedure.
    pub fn coding_tips(
        &self,
        code: &str,
        procedure_text: &str,
        catalog: &CodeCatalog,
    ) -> Vec<String> {
        coding_tips(code, procedure_text, catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpt_types::CodeEntry;

    struct FailingRule {
        definition: CodeRule,
    }

    impl Rule for FailingRule {
        fn definition(&self) -> &CodeRule {
            &self.definition
        }

        fn apply(&self, _: &str, _: &[String], _: &CodeCatalog) -> RuleResult<RuleOutcome> {
            Err(RuleError::Failed {
                rule_id: self.definition.id.clone(),
                message: "lookup table unavailable".to_string(),
            })
        }
    }

    struct TagRule {
        definition: CodeRule,
    }

    impl Rule for TagRule {
        fn definition(&self) -> &CodeRule {
            &self.definition
        }

        fn apply(&self, _: &str, recommended: &[String], _: &CodeCatalog) -> RuleResult<RuleOutcome> {
            Ok(RuleOutcome::explain(vec![Explanation::general(
                self.definition.id.clone(),
                format!("saw {}", recommended.join(",")),
            )]))
        }
    }

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn catalog() -> CodeCatalog {
        CodeCatalog::from_entries([
            CodeEntry::new("30520", "Septoplasty"),
            CodeEntry::new("30140", "Submucous resection inferior turbinate"),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_rules_sorted() {
        let engine = RuleEngine::new();
        let priorities: Vec<i32> = engine.rules().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted);

        let ids: Vec<&str> = engine.rules().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["R000", "R001", "R003", "R002", "R004", "R005"]);
    }

    #[test]
    fn test_add_rule_keeps_insertion_order_on_ties() {
        let mut engine = RuleEngine::new();
        engine.add_rule(Box::new(TagRule {
            definition: CodeRule::new("TEST001", "Test rule", 100),
        }));
        engine.add_rule(Box::new(TagRule {
            definition: CodeRule::new("TEST002", "Runs first", 200),
        }));

        let ids: Vec<&str> = engine.rules().map(|r| r.id.as_str()).take(3).collect();
        assert_eq!(ids, vec!["TEST002", "R000", "TEST001"]);
        assert_eq!(engine.rule_descriptions()["TEST001"], "Test rule");
    }

    #[test]
    fn test_empty_candidates_is_error() {
        let engine = RuleEngine::new();
        let result = engine.analyze_procedure("bilateral septoplasty", &[], &catalog());

        assert_eq!(result.status, AnalysisStatus::Error);
        assert_eq!(result.message.as_deref(), Some(EMPTY_CANDIDATES_MESSAGE));
        assert!(result.recommended_codes.is_empty());
        assert!(result.explanations.is_empty());
    }

    #[test]
    fn test_failing_rule_is_skipped() {
        let mut engine = RuleEngine::empty();
        engine.add_rule(Box::new(FailingRule {
            definition: CodeRule::new("BROKEN", "Always fails", 50),
        }));
        engine.add_rule(Box::new(TagRule {
            definition: CodeRule::new("TAG", "Records input", 40),
        }));

        let result = engine.analyze_procedure("septoplasty", &codes(&["30520"]), &catalog());

        assert!(result.is_success());
        assert_eq!(result.recommended_codes, vec!["30520"]);
        assert_eq!(result.explanations.len(), 1);
        assert_eq!(result.explanations[0].rule_id, "TAG");
        assert_eq!(result.explanations[0].message, "saw 30520");
    }

    #[test]
    fn test_unknown_codes_pass_through() {
        let engine = RuleEngine::new();
        let result = engine.analyze_procedure("septoplasty", &codes(&["99999", "30520"]), &catalog());

        assert!(result.is_success());
        assert_eq!(result.recommended_codes, vec!["99999", "30520"]);
        assert!(result.excluded_codes.is_empty());
    }

    #[test]
    fn test_medical_necessity_always_reminds() {
        let engine = RuleEngine::new();
        let result = engine.analyze_procedure("septoplasty", &codes(&["30520"]), &catalog());
        assert_eq!(result.explanations_for_rule("R005").count(), 1);
    }
}
