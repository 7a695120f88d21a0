//! Coding rule definition.

use std::fmt;

/// A named, prioritized coding rule.
///
/// Rules with a higher `priority` run first.
///
/// # Examples
///
/// ```
/// use cpt_types::CodeRule;
///
/// let rule = CodeRule::new("R002", "Check for bilateral procedures (use modifier 50)", 8);
/// assert_eq!(rule.to_string(), "Rule R002: Check for bilateral procedures (use modifier 50) (Priority: 8)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeRule {
    /// Unique rule identifier.
    pub id: String,
    /// Human-readable purpose.
    pub description: String,
    /// Execution priority; higher runs first.
    pub priority: i32,
}

impl CodeRule {
    /// Creates a rule definition.
    pub fn new(id: impl Into<String>, description: impl Into<String>, priority: i32) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            priority,
        }
    }
}

impl fmt::Display for CodeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rule {}: {} (Priority: {})",
            self.id, self.description, self.priority
        )
    }
}
