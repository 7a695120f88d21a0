//! Bilateral modifier (R002).

use cpt_types::modifier::{has_modifier, with_modifier, BILATERAL};
use cpt_types::{CodeRule, Explanation};

use super::{Rule, RuleOutcome, RuleResult};
use crate::catalog::CodeCatalog;

/// Phrases that mark a procedure as bilateral, matched case-insensitively.
pub const BILATERAL_KEYWORDS: &[&str] = &["bilateral", "both sides", "both ears", "right and left"];

/// Appends modifier 50 to every recommended code when the text says the
/// procedure was done on both sides.
///
/// Codes that already carry the modifier are left as they are, so running
/// the rule twice changes nothing.
#[derive(Debug, Clone)]
pub struct BilateralModifierRule {
    definition: CodeRule,
}

impl BilateralModifierRule {
    /// Creates the rule with its default definition.
    pub fn new() -> Self {
        Self {
            definition: CodeRule::new(
                "R002",
                "Check for bilateral procedures (use modifier 50)",
                8,
            ),
        }
    }

    /// Returns true if the text describes a bilateral procedure.
    pub fn is_bilateral(procedure_text: &str) -> bool {
        let text = procedure_text.to_lowercase();
        BILATERAL_KEYWORDS.iter().any(|k| text.contains(k))
    }
}

impl Default for BilateralModifierRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for BilateralModifierRule {
    fn definition(&self) -> &CodeRule {
        &self.definition
    }

    fn apply(
        &self,
        procedure_text: &str,
        recommended: &[String],
        _catalog: &CodeCatalog,
    ) -> RuleResult<RuleOutcome> {
        if !Self::is_bilateral(procedure_text) {
            return Ok(RuleOutcome::unchanged());
        }

        let mut modified = Vec::with_capacity(recommended.len());
        let mut explanations = Vec::new();

        for code in recommended {
            if has_modifier(code, BILATERAL) {
                modified.push(code.clone());
                continue;
            }
            modified.push(with_modifier(code, BILATERAL));
            explanations.push(Explanation::for_code(
                self.definition.id.clone(),
                code.clone(),
                format!("Added modifier 50 to code {code} for bilateral procedure."),
            ));
        }

        Ok(RuleOutcome {
            recommended: Some(modified),
            excluded: Vec::new(),
            explanations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_bilateral() {
        assert!(BilateralModifierRule::is_bilateral("BILATERAL myringotomy"));
        assert!(BilateralModifierRule::is_bilateral("tubes placed in both ears"));
        assert!(BilateralModifierRule::is_bilateral("Right and left turbinates reduced"));
        assert!(!BilateralModifierRule::is_bilateral("left tympanoplasty"));
    }

    #[test]
    fn test_appends_modifier() {
        let rule = BilateralModifierRule::new();
        let outcome = rule
            .apply("bilateral tympanostomy", &codes(&["69436", "69421"]), &CodeCatalog::default())
            .unwrap();

        assert_eq!(outcome.recommended.unwrap(), vec!["69436-50", "69421-50"]);
        assert_eq!(outcome.explanations.len(), 2);
        assert_eq!(
            outcome.explanations[0].message,
            "Added modifier 50 to code 69436 for bilateral procedure."
        );
    }

    #[test]
    fn test_idempotent() {
        let rule = BilateralModifierRule::new();
        let outcome = rule
            .apply("bilateral", &codes(&["69436-50", "69421"]), &CodeCatalog::default())
            .unwrap();

        assert_eq!(outcome.recommended.unwrap(), vec!["69436-50", "69421-50"]);
        assert_eq!(outcome.explanations.len(), 1);
    }

    #[test]
    fn test_unilateral_unchanged() {
        let rule = BilateralModifierRule::new();
        let outcome = rule
            .apply("left myringotomy", &codes(&["69420"]), &CodeCatalog::default())
            .unwrap();
        assert_eq!(outcome, RuleOutcome::unchanged());
    }
}
