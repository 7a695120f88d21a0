//! Key indicator and standard charge ordering (R000).

use cpt_types::modifier::base_code;
use cpt_types::{CodeRule, Explanation};

use super::{Rule, RuleOutcome, RuleResult};
use crate::catalog::CodeCatalog;

/// Number of leading codes that get an explanation.
const EXPLAINED_CODES: usize = 3;

/// Moves key indicator codes to the front, then orders by standard charge.
///
/// The sort is stable. Codes missing from the catalog rank as a non-key
/// indicator with no charge.
#[derive(Debug, Clone)]
pub struct KeyIndicatorPriorityRule {
    definition: CodeRule,
}

impl KeyIndicatorPriorityRule {
    /// Creates the rule with its default definition.
    pub fn new() -> Self {
        Self {
            definition: CodeRule::new(
                "R000",
                "Prioritize key indicator codes and higher standard charges",
                100,
            ),
        }
    }
}

impl Default for KeyIndicatorPriorityRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for KeyIndicatorPriorityRule {
    fn definition(&self) -> &CodeRule {
        &self.definition
    }

    fn apply(
        &self,
        _procedure_text: &str,
        recommended: &[String],
        catalog: &CodeCatalog,
    ) -> RuleResult<RuleOutcome> {
        let mut ranked: Vec<(&String, bool, f64)> = recommended
            .iter()
            .map(|code| match catalog.get_details(base_code(code)) {
                Ok(entry) => (code, entry.key_indicator, entry.standard_charge),
                Err(_) => (code, false, 0.0),
            })
            .collect();

        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.2.total_cmp(&a.2)));

        let explanations = ranked
            .iter()
            .take(EXPLAINED_CODES)
            .map(|&(code, key_indicator, charge)| {
                Explanation::for_code(
                    self.definition.id.clone(),
                    code.clone(),
                    describe(code, key_indicator, charge),
                )
            })
            .collect();

        Ok(RuleOutcome {
            recommended: Some(ranked.into_iter().map(|(code, _, _)| code.clone()).collect()),
            excluded: Vec::new(),
            explanations,
        })
    }
}

fn describe(code: &str, key_indicator: bool, charge: f64) -> String {
    match (key_indicator, charge > 0.0) {
        (true, true) => format!("Code {code} is a key indicator with standard charge ${charge:.2}"),
        (true, false) => format!("Code {code} is a key indicator"),
        (false, true) => format!("Code {code} has standard charge ${charge:.2}"),
        (false, false) => format!("Code {code} evaluated based on priority rules"),
    }
}
