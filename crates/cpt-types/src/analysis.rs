//! Rule engine output types.

/// Outcome status of a procedure analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AnalysisStatus {
    /// Rules were applied.
    Success,
    /// The analysis precondition failed.
    Error,
}

/// A message emitted by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Explanation {
    /// The rule that produced this message.
    pub rule_id: String,
    /// The code this message is about, if any.
    pub code: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl Explanation {
    /// Creates an explanation about a specific code.
    pub fn for_code(
        rule_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Creates an explanation that is not tied to a single code.
    pub fn general(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            code: None,
            message: message.into(),
        }
    }
}

/// Result of running the rule pipeline over a candidate list.
///
/// # Examples
///
/// ```
/// use cpt_types::{AnalysisResult, AnalysisStatus};
///
/// let result = AnalysisResult::error("septoplasty", "No candidate codes provided for analysis");
/// assert_eq!(result.status, AnalysisStatus::Error);
/// assert!(result.recommended_codes.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisResult {
    /// Whether the analysis ran.
    pub status: AnalysisStatus,
    /// Error message when `status` is `Error`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub message: Option<String>,
    /// The procedure description that was analyzed.
    pub procedure_text: String,
    /// Final recommended codes, in ranked order.
    pub recommended_codes: Vec<String>,
    /// Codes removed by rules, without duplicates.
    pub excluded_codes: Vec<String>,
    /// Rule messages in the order they were emitted.
    pub explanations: Vec<Explanation>,
}

impl AnalysisResult {
    /// Creates an error result with empty code lists.
    pub fn error(procedure_text: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: AnalysisStatus::Error,
            message: Some(message.into()),
            procedure_text: procedure_text.into(),
            recommended_codes: Vec::new(),
            excluded_codes: Vec::new(),
            explanations: Vec::new(),
        }
    }

    /// Returns true if the analysis succeeded.
    pub fn is_success(&self) -> bool {
        self.status == AnalysisStatus::Success
    }

    /// Returns the explanations emitted by a given rule.
    pub fn explanations_for_rule<'a>(
        &'a self,
        rule_id: &'a str,
    ) -> impl Iterator<Item = &'a Explanation> + 'a {
        self.explanations.iter().filter(move |e| e.rule_id == rule_id)
    }
}
