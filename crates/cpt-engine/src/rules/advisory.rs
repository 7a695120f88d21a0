//! Advisory rules. These only add explanation text.

use regex::Regex;

use cpt_types::modifier::MULTIPLE_PROCEDURES;
use cpt_types::{CodeRule, Explanation};

use super::{Rule, RuleOutcome, RuleResult};
use crate::catalog::CodeCatalog;

/// Phrases that indicate a post-operative visit.
const POST_OP_KEYWORDS: &[&str] = &["follow-up", "post-op", "postoperative"];

/// Text patterns that indicate more than one procedure was done.
const MULTIPLE_PROCEDURE_PATTERNS: &[&str] = &[r"\bmultiple\s+procedures\b", r"\bseveral\s+procedures\b"];

/// Post-operative visit reminder (R003).
#[derive(Debug, Clone)]
pub struct PostOperativeRule {
    definition: CodeRule,
}

impl PostOperativeRule {
    /// Creates the rule with its default definition.
    pub fn new() -> Self {
        Self {
            definition: CodeRule::new(
                "R003",
                "Check for post-operative visits (usually included in surgical package)",
                9,
            ),
        }
    }
}

impl Default for PostOperativeRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PostOperativeRule {
    fn definition(&self) -> &CodeRule {
        &self.definition
    }

    fn apply(&self, procedure_text: &str, _: &[String], _: &CodeCatalog) -> RuleResult<RuleOutcome> {
        let text = procedure_text.to_lowercase();
        if !POST_OP_KEYWORDS.iter().any(|k| text.contains(k)) {
            return Ok(RuleOutcome::unchanged());
        }

        Ok(RuleOutcome::explain(vec![Explanation::general(
            self.definition.id.clone(),
            "Post-operative visits are usually included in the surgical package and are not coded separately.",
        )]))
    }
}

/// Multiple procedure reminder (R004).
///
/// Fires when the text mentions several procedures or more than one code is
/// still recommended.
#[derive(Debug, Clone)]
pub struct MultipleProcedureRule {
    definition: CodeRule,
    patterns: Vec<Regex>,
}

impl MultipleProcedureRule {
    /// Creates the rule with the built-in text patterns.
    pub fn new() -> Self {
        Self::with_patterns(MULTIPLE_PROCEDURE_PATTERNS)
    }

    /// Creates the rule with custom text patterns.
    ///
    /// Patterns are matched case-insensitively. Invalid patterns are logged
    /// and ignored.
    pub fn with_patterns(patterns: &[&str]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match Regex::new(&format!("(?i){p}")) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("Ignoring invalid multiple procedure pattern {}: {}", p, e);
                    None
                }
            })
            .collect();

        Self {
            definition: CodeRule::new(
                "R004",
                "Check for multiple procedures (additional procedures may require modifier 51)",
                7,
            ),
            patterns,
        }
    }

    /// Returns true if the text matches any pattern.
    pub fn mentions_multiple(&self, procedure_text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(procedure_text))
    }
}

impl Default for MultipleProcedureRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MultipleProcedureRule {
    fn definition(&self) -> &CodeRule {
        &self.definition
    }

    fn apply(
        &self,
        procedure_text: &str,
        recommended: &[String],
        _: &CodeCatalog,
    ) -> RuleResult<RuleOutcome> {
        if recommended.len() <= 1 && !self.mentions_multiple(procedure_text) {
            return Ok(RuleOutcome::unchanged());
        }

        Ok(RuleOutcome::explain(vec![Explanation::general(
            self.definition.id.clone(),
            format!(
                "Multiple procedures documented; additional procedures may require modifier {MULTIPLE_PROCEDURES}."
            ),
        )]))
    }
}

/// Medical necessity reminder (R005). Always fires.
#[derive(Debug, Clone)]
pub struct MedicalNecessityRule {
    definition: CodeRule,
}

impl MedicalNecessityRule {
    /// Creates the rule with its default definition.
    pub fn new() -> Self {
        Self {
            definition: CodeRule::new("R005", "Verify medical necessity documentation", 6),
        }
    }
}

impl Default for MedicalNecessityRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MedicalNecessityRule {
    fn definition(&self) -> &CodeRule {
        &self.definition
    }

    fn apply(&self, _: &str, _: &[String], _: &CodeCatalog) -> RuleResult<RuleOutcome> {
        Ok(RuleOutcome::explain(vec![Explanation::general(
            self.definition.id.clone(),
            "Verify that the documentation supports the medical necessity of each procedure.",
        )]))
    }
}
