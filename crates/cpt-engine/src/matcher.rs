//! Query-to-candidate matcher.
//!
//! Two phases, short-circuiting:
//!
//! 1. **Exact** - the whole query as a case-insensitive substring of a
//!    description or code. Any hit ends the search.
//! 2. **Keyword** - each query token is expanded through the
//!    [`KeywordExpander`] and looked up in an inverted index; a code scores one
//!    point per distinct expanded term that hits it.
//!
//! The inverted index is built once, in [`Matcher::new`], and never mutated
//! afterwards, so a `Matcher` can be shared across threads freely.

use std::collections::HashMap;
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use cpt_types::{CodeEntry, ScoredCandidate};

use crate::catalog::CodeCatalog;
use crate::keywords::KeywordExpander;
use crate::types::MatcherConfig;

/// Ranks candidates in place: exact before keyword, then score descending.
///
/// The sort is stable, so equal candidates keep their first-seen order.
pub fn rank_candidates(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| {
        a.match_quality
            .cmp(&b.match_quality)
            .then_with(|| b.score.cmp(&a.score))
    });
}

/// Scores and ranks catalog codes for free-text queries.
///
/// # Example
///
/// ```ignore
/// let matcher = Matcher::new(Arc::new(catalog), KeywordExpander::new());
///
/// for candidate in matcher.search("parotid tumor removal", 10) {
///     println!("{} {:?} {}", candidate.code, candidate.match_quality, candidate.score);
/// }
/// ```
pub struct Matcher {
    catalog: Arc<CodeCatalog>,
    expander: KeywordExpander,
    /// Indexed term to catalog positions, ascending and de-duplicated.
    index: HashMap<String, Vec<usize>>,
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("catalog", &self.catalog.len())
            .field("expansions", &self.expander.len())
            .field("index_terms", &self.index.len())
            .finish()
    }
}

impl Matcher {
    /// Creates a matcher and builds its keyword index.
    pub fn new(catalog: Arc<CodeCatalog>, expander: KeywordExpander) -> Self {
        Self::with_config(catalog, expander, MatcherConfig::default())
    }

    /// Creates a matcher with explicit configuration.
    pub fn with_config(
        catalog: Arc<CodeCatalog>,
        expander: KeywordExpander,
        config: MatcherConfig,
    ) -> Self {
        let index = build_index(&catalog, &expander, &config);
        tracing::debug!(
            "Built keyword index: {} terms over {} codes",
            index.len(),
            catalog.len()
        );

        Self {
            catalog,
            expander,
            index,
        }
    }

    /// Returns the catalog this matcher searches.
    pub fn catalog(&self) -> &Arc<CodeCatalog> {
        &self.catalog
    }

    /// Returns the expansion table.
    pub fn expander(&self) -> &KeywordExpander {
        &self.expander
    }

    /// Returns the number of indexed terms.
    pub fn index_term_count(&self) -> usize {
        self.index.len()
    }

    /// Searches for candidate codes, returning at most `limit` results.
    ///
    /// A blank query returns no results. Exact-phase results are never mixed
    /// with keyword-phase results.
    pub fn search(&self, query: &str, limit: usize) -> Vec<ScoredCandidate> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let exact = self.catalog.search_substring(query);
        let mut candidates: Vec<ScoredCandidate> = if exact.is_empty() {
            self.keyword_candidates(query)
        } else {
            exact.into_iter().map(|e| ScoredCandidate::exact(&e.code)).collect()
        };

        rank_candidates(&mut candidates);
        candidates.truncate(limit);
        candidates
    }

    /// Expands each whitespace token of `query`, returning the distinct terms
    /// in first-seen order.
    ///
    /// Only leading and trailing punctuation is trimmed. Inner punctuation is
    /// kept, so `nasal/sinus` or `post-op` stay single tokens and only hit
    /// index terms spelled the same way, never the separate description words.
    pub fn expanded_terms(&self, query: &str) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for token in query.split_whitespace() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric());
            for term in self.expander.expand(token) {
                if !terms.contains(&term) {
                    terms.push(term);
                }
            }
        }
        terms
    }

    fn keyword_candidates(&self, query: &str) -> Vec<ScoredCandidate> {
        // (catalog position, score) in first-hit order
        let mut scores: Vec<(usize, u32)> = Vec::new();
        let mut slots: HashMap<usize, usize> = HashMap::new();

        for term in self.expanded_terms(query) {
            let Some(postings) = self.index.get(&term) else {
                continue;
            };
            for &position in postings {
                match slots.get(&position) {
                    Some(&slot) => scores[slot].1 += 1,
                    None => {
                        slots.insert(position, scores.len());
                        scores.push((position, 1));
                    }
                }
            }
        }

        scores
            .into_iter()
            .map(|(position, score)| {
                ScoredCandidate::keyword(&self.catalog.entry_at(position).code, score)
            })
            .collect()
    }
}

/// Builds the inverted index from description words and configured synonyms.
fn build_index(
    catalog: &CodeCatalog,
    expander: &KeywordExpander,
    config: &MatcherConfig,
) -> HashMap<String, Vec<usize>> {
    let entries: Vec<&CodeEntry> = catalog.iter().collect();

    #[cfg(feature = "parallel")]
    let descriptions: Vec<String> = entries
        .par_iter()
        .map(|e| e.description.to_lowercase())
        .collect();
    #[cfg(not(feature = "parallel"))]
    let descriptions: Vec<String> = entries
        .iter()
        .map(|e| e.description.to_lowercase())
        .collect();

    let mut index: HashMap<String, Vec<usize>> = HashMap::new();

    for (position, description) in descriptions.iter().enumerate() {
        for word in description
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > config.min_word_len)
        {
            index.entry(word.to_string()).or_default().push(position);
        }
    }

    let synonyms = expander.synonym_terms();

    #[cfg(feature = "parallel")]
    let synonym_postings: Vec<(&str, Vec<usize>)> = synonyms
        .par_iter()
        .map(|term| (*term, postings_containing(&descriptions, term)))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let synonym_postings: Vec<(&str, Vec<usize>)> = synonyms
        .iter()
        .map(|term| (*term, postings_containing(&descriptions, term)))
        .collect();

    for (term, postings) in synonym_postings {
        if !postings.is_empty() {
            index.entry(term.to_string()).or_default().extend(postings);
        }
    }

    for postings in index.values_mut() {
        postings.sort_unstable();
        postings.dedup();
    }

    index
}

fn postings_containing(descriptions: &[String], term: &str) -> Vec<usize> {
    descriptions
        .iter()
        .enumerate()
        .filter(|(_, d)| d.contains(term))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpt_types::MatchQuality;

    fn sample_matcher() -> Matcher {
        let catalog = CodeCatalog::from_entries([
            CodeEntry::new("42410", "Excision of parotid tumor; lateral lobe"),
            CodeEntry::new("42420", "Parotidectomy, total, with nerve dissection"),
            CodeEntry::new("42440", "Excision of submandibular salivary gland"),
            CodeEntry::new("31231", "Nasal endoscopy, diagnostic"),
            CodeEntry::new("30520", "Septoplasty or submucous resection"),
        ])
        .unwrap();
        Matcher::new(Arc::new(catalog), KeywordExpander::new())
    }

    fn codes(candidates: &[ScoredCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.code.as_str()).collect()
    }

    #[test]
    fn test_exact_phase_short_circuits() {
        let matcher = sample_matcher();
        let results = matcher.search("Nasal Endoscopy", 10);

        assert_eq!(codes(&results), vec!["31231"]);
        assert!(results.iter().all(|c| c.match_quality == MatchQuality::Exact));
        assert!(results.iter().all(|c| c.score == 100));
    }

    #[test]
    fn test_exact_phase_matches_code_numbers() {
        let matcher = sample_matcher();
        assert_eq!(codes(&matcher.search("4244", 10)), vec!["42440"]);
    }

    #[test]
    fn test_keyword_phase_uses_expansion() {
        let matcher = sample_matcher();
        // "parotid" -> parotid, parotidectomy, salivary
        let results = matcher.search("parotid removal", 10);

        assert_eq!(codes(&results), vec!["42420", "42410", "42440"]);
        assert!(results.iter().all(|c| c.match_quality == MatchQuality::Keyword));
        let scores: Vec<u32> = results.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![2, 1, 1]);
    }

    #[test]
    fn test_keyword_scores_distinct_terms() {
        let matcher = sample_matcher();
        let results = matcher.search("submandibular gland excision", 10);

        assert_eq!(results[0].code, "42440");
        assert_eq!(results[0].score, 3);
        assert_eq!(results[1].code, "42410");
        assert_eq!(results[1].score, 1);
    }

    #[test]
    fn test_repeated_token_counts_once() {
        let matcher = sample_matcher();
        let results = matcher.search("septoplasty septoplasty", 10);
        assert_eq!(results.len(), 1);
        // Exact phase fails on the doubled phrase, so this is a keyword hit
        assert_eq!(results[0].match_quality, MatchQuality::Keyword);
        assert_eq!(results[0].score, 1);
    }

    #[test]
    fn test_tokens_keep_inner_punctuation() {
        let matcher = sample_matcher();
        assert_eq!(
            matcher.expanded_terms("(Nasal/Sinus) post-op,"),
            vec!["nasal/sinus", "post-op"]
        );
        // Neither token matches the indexed words "nasal" or "endoscopy"
        assert!(matcher.search("nasal/endoscopy", 10).is_empty());
    }

    #[test]
    fn test_blank_query() {
        let matcher = sample_matcher();
        assert!(matcher.search("", 10).is_empty());
        assert!(matcher.search(" \t\n", 10).is_empty());
    }

    #[test]
    fn test_limit_applies_after_sort() {
        let matcher = sample_matcher();
        let results = matcher.search("submandibular gland excision", 1);
        assert_eq!(codes(&results), vec!["42440"]);
        assert!(matcher.search("parotid", 0).is_empty());
    }

    #[test]
    fn test_short_words_not_indexed() {
        let matcher = sample_matcher();
        // "lobe" has four characters and is indexed; "or" is not
        assert_eq!(codes(&matcher.search("lobe biopsy", 10)), vec!["42410"]);
        assert!(matcher.search("or xyz", 10).is_empty());
    }

    #[test]
    fn test_rank_candidates_is_stable() {
        let mut candidates = vec![
            ScoredCandidate::keyword("a", 1),
            ScoredCandidate::keyword("b", 2),
            ScoredCandidate::keyword("c", 1),
            ScoredCandidate::exact("d"),
            ScoredCandidate::keyword("e", 2),
        ];
        rank_candidates(&mut candidates);
        assert_eq!(codes(&candidates), vec!["d", "b", "e", "a", "c"]);
    }
}
