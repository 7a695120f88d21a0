//! Search candidate types.

/// Score assigned to every exact-phase match.
pub const EXACT_SCORE: u32 = 100;

/// How a candidate was matched.
///
/// `Exact` orders before `Keyword`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MatchQuality {
    /// The whole query matched the description or the code.
    Exact,
    /// One or more expanded query terms hit the keyword index.
    Keyword,
}

/// A code produced by a search, with its match metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredCandidate {
    /// The matched CPT code.
    pub code: String,
    /// How the code was matched.
    pub match_quality: MatchQuality,
    /// Match score; higher is better.
    pub score: u32,
}

impl ScoredCandidate {
    /// Creates an exact-phase candidate.
    pub fn exact(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            match_quality: MatchQuality::Exact,
            score: EXACT_SCORE,
        }
    }

    /// Creates a keyword-phase candidate.
    pub fn keyword(code: impl Into<String>, score: u32) -> Self {
        Self {
            code: code.into(),
            match_quality: MatchQuality::Keyword,
            score,
        }
    }
}
