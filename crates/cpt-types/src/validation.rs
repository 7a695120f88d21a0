//! Code validation result.

/// Result of validating a code against the catalog.
///
/// `valid == false` is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationResult {
    /// The code that was validated.
    pub code: String,
    /// Whether the code exists in the catalog.
    pub valid: bool,
    /// Catalog description when valid.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    /// Reason when invalid.
    #[cfg_attr(feature = "serde", serde(default))]
    pub error: Option<String>,
}

impl ValidationResult {
    /// Creates a positive result.
    pub fn valid(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            valid: true,
            description: Some(description.into()),
            error: None,
        }
    }

    /// Creates a negative result.
    pub fn invalid(code: impl Into<String>) -> Self {
        let code = code.into();
        let error = format!("Invalid CPT code: {}", code);
        Self {
            code,
            valid: false,
            description: None,
            error: Some(error),
        }
    }
}
