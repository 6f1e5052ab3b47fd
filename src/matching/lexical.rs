//! Keyword overlap between a query and a lab, independent of embeddings.
//!
//! Both sides are normalized keyword lists (see [`crate::core::split_keywords`]).
//! A query term is matched when some lab term is equal to it, is within the
//! fuzzy threshold by normalized Levenshtein similarity, or has a word-token
//! set that is a subset of the other's (in either direction).

use std::collections::{BTreeSet, HashSet};

use strsim::normalized_levenshtein;

/// Terms shorter than this only match exactly
pub const MIN_PARTIAL_LEN: usize = 3;

/// Terms shorter than this never match by edit distance
pub const MIN_FUZZY_LEN: usize = 4;

/// Query terms matched against one lab
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexicalMatch {
    /// Matched query terms, sorted
    pub matched_terms: BTreeSet<String>,
}

impl LexicalMatch {
    /// Compare every query term against every lab term
    #[must_use]
    pub fn compute(query_terms: &[String], lab_terms: &[String], fuzzy_threshold: f64) -> Self {
        let matched_terms = query_terms
            .iter()
            .filter(|q| {
                lab_terms
                    .iter()
                    .any(|l| terms_match(q, l, fuzzy_threshold))
            })
            .cloned()
            .collect();
        Self { matched_terms }
    }

    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matched_terms.len()
    }

    /// Fraction of query terms matched, 0.0 for an empty query
    #[must_use]
    pub fn ratio(&self, query_len: usize) -> f64 {
        if query_len == 0 {
            return 0.0;
        }
        crate::utils::validation::count_to_f64(self.match_count())
            / crate::utils::validation::count_to_f64(query_len)
    }
}

/// True if two normalized terms match exactly, fuzzily, or by token subset
#[must_use]
pub fn terms_match(a: &str, b: &str, fuzzy_threshold: f64) -> bool {
    if a == b {
        return true;
    }
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if len_a < MIN_PARTIAL_LEN || len_b < MIN_PARTIAL_LEN {
        return false;
    }
    if len_a >= MIN_FUZZY_LEN
        && len_b >= MIN_FUZZY_LEN
        && normalized_levenshtein(a, b) >= fuzzy_threshold
    {
        return true;
    }
    token_subset(a, b)
}

fn token_subset(a: &str, b: &str) -> bool {
    let tokens_a: HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return false;
    }
    tokens_a.is_subset(&tokens_b) || tokens_b.is_subset(&tokens_a)
}

/// Affinity between a declared field value and a lab's field value.
///
/// 1.0 when either contains the other (case-insensitive), otherwise the
/// normalized Levenshtein similarity if it reaches `fuzzy_threshold`, else 0.0.
#[must_use]
pub fn field_affinity(wanted: &str, actual: &str, fuzzy_threshold: f64) -> f64 {
    let wanted = wanted.trim().to_lowercase();
    let actual = actual.trim().to_lowercase();
    if wanted.is_empty() || actual.is_empty() {
        return 0.0;
    }
    if actual.contains(&wanted) || wanted.contains(&actual) {
        return 1.0;
    }
    let similarity = normalized_levenshtein(&wanted, &actual);
    if similarity >= fuzzy_threshold {
        similarity
    } else {
        0.0
    }
}

/// Substring affinity only: 1.0 if either contains the other, else 0.0
#[must_use]
pub fn substring_affinity(wanted: &str, actual: &str) -> f64 {
    let wanted = wanted.trim().to_lowercase();
    let actual = actual.trim().to_lowercase();
    if wanted.is_empty() || actual.is_empty() {
        return 0.0;
    }
    if actual.contains(&wanted) || wanted.contains(&actual) {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::engine::DEFAULT_FUZZY_THRESHOLD;

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_exact_match() {
        assert!(terms_match("robotics", "robotics", 0.5));
        assert!(terms_match("ai", "ai", 0.5));
    }

    #[test]
    fn test_fuzzy_match() {
        assert!(terms_match("robotic", "robotics", DEFAULT_FUZZY_THRESHOLD));
        assert!(terms_match("modeling", "modelling", DEFAULT_FUZZY_THRESHOLD));
        assert!(!terms_match("robotics", "genomics", 0.9));
    }

    #[test]
    fn test_default_threshold_rejects_unrelated_words() {
        assert!(!terms_match("optics", "robotics", DEFAULT_FUZZY_THRESHOLD));
        assert!(!terms_match("genomics", "robotics", DEFAULT_FUZZY_THRESHOLD));
        assert!(!terms_match("biology", "geology", DEFAULT_FUZZY_THRESHOLD));

        let query = terms(&["optics", "genomics", "biology"]);
        let lab = terms(&["robotics", "geology"]);
        let m = LexicalMatch::compute(&query, &lab, DEFAULT_FUZZY_THRESHOLD);
        assert_eq!(m.match_count(), 0);
    }

    #[test]
    fn test_short_terms_only_match_exactly() {
        assert!(!terms_match("ai", "ai safety", 0.5));
        assert!(!terms_match("ml", "ai", 0.0));
    }

    #[test]
    fn test_token_subset_both_directions() {
        assert!(terms_match("learning", "machine learning", 0.9));
        assert!(terms_match("machine learning systems", "machine learning", 0.9));
        assert!(!terms_match("deep learning", "machine learning", 0.9));
    }

    #[test]
    fn test_compute_collects_query_terms() {
        let query = terms(&["robotics", "machine learning", "opera"]);
        let lab = terms(&["machine learning", "robotics", "control"]);
        let m = LexicalMatch::compute(&query, &lab, 0.5);

        assert_eq!(m.match_count(), 2);
        assert!(m.matched_terms.contains("robotics"));
        assert!(m.matched_terms.contains("machine learning"));
        assert!((m.ratio(query.len()) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_of_empty_query() {
        assert!(LexicalMatch::default().ratio(0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_field_affinity() {
        assert!((field_affinity("CS", "CS", 0.5) - 1.0).abs() < f64::EPSILON);
        assert!((field_affinity("mechanical", "Mechanical Engineering", 0.5) - 1.0).abs() < f64::EPSILON);
        assert!(field_affinity("Computer Science", "Computer Sciences", 0.5) > 0.9);
        assert!(field_affinity("Chemistry", "Mechanical Engineering", 0.5).abs() < f64::EPSILON);
        assert!(field_affinity("", "Physics", 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_substring_affinity() {
        assert!((substring_affinity("stanford", "Stanford University") - 1.0).abs() < f64::EPSILON);
        assert!(substring_affinity("Stanferd", "Stanford University").abs() < f64::EPSILON);
    }
}
