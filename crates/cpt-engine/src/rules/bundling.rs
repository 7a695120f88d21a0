//! Bundled procedure detection (R001).

use std::collections::HashSet;

use cpt_types::modifier::base_code;
use cpt_types::{CodeRule, Explanation};

use super::{Rule, RuleOutcome, RuleResult};
use crate::catalog::CodeCatalog;

/// Flags candidates whose catalog entries list each other as related.
///
/// Each unordered pair gets one explanation, against the first code that
/// lists it. When that code is still recommended, its related codes are excluded.
/// Codes missing from the catalog contribute no pairs and stay recommended.
#[derive(Debug, Clone)]
pub struct BundlingRule {
    definition: CodeRule,
}

impl BundlingRule {
    /// Creates the rule with its default definition.
    pub fn new() -> Self {
        Self {
            definition: CodeRule::new("R001", "Check for bundled procedures", 10),
        }
    }
}

impl Default for BundlingRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for BundlingRule {
    fn definition(&self) -> &CodeRule {
        &self.definition
    }

    fn apply(
        &self,
        _procedure_text: &str,
        recommended: &[String],
        catalog: &CodeCatalog,
    ) -> RuleResult<RuleOutcome> {
        let mut processed: HashSet<(&str, &str)> = HashSet::new();
        let mut excluded: Vec<String> = Vec::new();
        let mut explanations = Vec::new();

        for code in recommended {
            let Ok(entry) = catalog.get_details(base_code(code)) else {
                continue;
            };

            let mut bundled_with: Vec<&str> = Vec::new();
            for related in &entry.related_codes {
                if related == code || !recommended.contains(related) {
                    continue;
                }
                let pair = if code.as_str() <= related.as_str() {
                    (code.as_str(), related.as_str())
                } else {
                    (related.as_str(), code.as_str())
                };
                if processed.insert(pair) {
                    explanations.push(Explanation::for_code(
                        self.definition.id.clone(),
                        code.clone(),
                        format!(
                            "Code {code} may be bundled with {related}. Check coding guidelines to determine which code to use."
                        ),
                    ));
                    bundled_with.push(related);
                }
            }

            if !excluded.contains(code) {
                for related in bundled_with {
                    if !excluded.iter().any(|e| e == related) {
                        excluded.push(related.to_string());
                    }
                }
            }
        }

        let kept = recommended
            .iter()
            .filter(|code| !excluded.contains(code))
            .cloned()
            .collect();

        Ok(RuleOutcome {
            recommended: Some(kept),
            excluded,
            explanations,
        })
    }
}
