use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::lab::Lab;
use crate::core::query::Query;
use crate::core::types::{Confidence, GroupBy};
use crate::corpus::store::LabCorpus;
use crate::embedding::{query_composite, FieldEmphasis, TfIdfConfig};
use crate::matching::diversity::select_diverse;
use crate::matching::index::LabIndex;
use crate::matching::lexical::{field_affinity, substring_affinity, LexicalMatch};
use crate::matching::scoring::{MatchScore, Signals};

/// A lab ranked against a query
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The matched lab
    pub lab: Lab,

    /// Match score details
    pub score: MatchScore,

    /// Query keywords found in the lab's keyword list
    pub matched_terms: BTreeSet<String>,
}

impl MatchResult {
    #[must_use]
    pub fn similarity_score(&self) -> f64 {
        self.score.composite
    }

    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matched_terms.len()
    }

    #[must_use]
    pub fn confidence(&self) -> Confidence {
        self.score.confidence
    }
}

/// Serializable view of a [`MatchResult`]: the lab's fields plus its scores
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub lab: Lab,
    pub similarity_score: f64,
    pub matched_terms: Vec<String>,
    pub match_count: usize,
    pub component_scores: BTreeMap<&'static str, f64>,
    pub confidence: Confidence,
}

impl From<&MatchResult> for Recommendation {
    fn from(result: &MatchResult) -> Self {
        Self {
            lab: result.lab.clone(),
            similarity_score: result.similarity_score(),
            matched_terms: result.matched_terms.iter().cloned().collect(),
            match_count: result.match_count(),
            component_scores: result.score.component_scores(),
            confidence: result.confidence(),
        }
    }
}

/// Outcome of a ranking call
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    /// Selected results in rank order
    pub results: Vec<MatchResult>,

    /// Labs that passed the inclusion filter, before top-N selection
    pub candidates: usize,

    /// The vector signal was unavailable and scores are lexical only
    pub degraded: bool,
}

/// Default minimum score threshold for matches
pub const DEFAULT_MIN_SCORE: f64 = 0.01;

/// Default minimum matched-term count that admits a lab regardless of score
pub const DEFAULT_MIN_MATCH_COUNT: usize = 1;

/// Default normalized Levenshtein similarity for fuzzy matches.
///
/// High enough that unrelated words sharing a suffix (`optics`, `robotics`)
/// stay apart while inflections (`robotic`, `robotics`) still match.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Default per-group cap in diverse top-N selection
pub const DEFAULT_GROUP_CAP: usize = 4;

/// Default number of results
pub const DEFAULT_TOP_N: usize = 10;

/// Configuration for the matching engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Signal blending weights
    pub weights: ScoringWeights,
    /// A lab is kept if its score exceeds this...
    pub min_score: f64,
    /// ...or it matched at least this many query terms (0 disables)
    pub min_match_count: usize,
    /// Similarity threshold for fuzzy keyword and major matches
    pub fuzzy_threshold: f64,
    /// Field used to group results for diversity
    pub group_by: GroupBy,
    /// Maximum results per group before filling by score (0 disables)
    pub group_cap: usize,
    /// Result count when the caller does not specify one
    pub default_top_n: usize,
    /// Repetition counts for composite texts
    pub field_emphasis: FieldEmphasis,
    /// Parameters of the built-in TF-IDF backend
    pub tfidf: TfIdfConfig,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_score: DEFAULT_MIN_SCORE,
            min_match_count: DEFAULT_MIN_MATCH_COUNT,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            group_by: GroupBy::default(),
            group_cap: DEFAULT_GROUP_CAP,
            default_top_n: DEFAULT_TOP_N,
            field_emphasis: FieldEmphasis::default(),
            tfidf: TfIdfConfig::default(),
        }
    }
}

impl MatchingConfig {
    /// Inclusion filter applied before top-N selection
    #[must_use]
    pub fn admits(&self, score: &MatchScore, match_count: usize) -> bool {
        score.composite > self.min_score
            || (self.min_match_count > 0 && match_count >= self.min_match_count)
    }
}

/// Configurable weights for the blended score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Weight for vector cosine similarity
    pub vector: f64,
    /// Weight for the lexical match ratio
    pub lexical: f64,
    /// Weight for the major affinity bonus
    pub major: f64,
    /// Weight for the university bonus
    pub university: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            vector: 0.60,     // 60%
            lexical: 0.25,    // 25%
            major: 0.10,      // 10%
            university: 0.05, // 5%
        }
    }
}

impl ScoringWeights {
    /// Normalize weights to sum to 1.0
    #[must_use]
    pub fn normalized(&self) -> Self {
        let parts = [self.vector, self.lexical, self.major, self.university];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Self::default();
        }
        let total: f64 = parts.iter().sum();

        if total <= 0.0 {
            return Self::default();
        }

        Self {
            vector: self.vector / total,
            lexical: self.lexical / total,
            major: self.major / total,
            university: self.university / total,
        }
    }
}

/// The main matching engine.
///
/// Borrows one consistent corpus/index pair; `index` is `None` while the
/// ranker is uninitialized, in which case every query yields no results.
pub struct MatchingEngine<'a> {
    corpus: &'a LabCorpus,
    index: Option<&'a LabIndex>,
    config: &'a MatchingConfig,
}

impl<'a> MatchingEngine<'a> {
    pub fn new(
        corpus: &'a LabCorpus,
        index: Option<&'a LabIndex>,
        config: &'a MatchingConfig,
    ) -> Self {
        Self {
            corpus,
            index,
            config,
        }
    }

    /// Rank labs for `query` and select a diverse top `top_n`
    #[must_use]
    pub fn rank(&self, query: &Query, top_n: usize) -> Ranking {
        let ranking = self.rank_all(query);
        let candidates = ranking.results.len();
        let group_by = self.config.group_by;
        let results = select_diverse(ranking.results, top_n, self.config.group_cap, |r| {
            r.lab.group_key(group_by)
        });

        Ranking {
            results,
            candidates,
            degraded: ranking.degraded,
        }
    }

    /// Find the best matching labs for a query
    #[must_use]
    pub fn find_matches(&self, query: &Query, top_n: usize) -> Vec<MatchResult> {
        self.rank(query, top_n).results
    }

    /// Score, filter, and sort every lab without truncation
    #[must_use]
    pub fn rank_all(&self, query: &Query) -> Ranking {
        let Some(index) = self.index else {
            return Ranking::default();
        };
        if query.is_empty() || self.corpus.is_empty() {
            return Ranking::default();
        }
        if index.len() != self.corpus.len() {
            tracing::error!(
                "Index covers {} labs but corpus has {}; ignoring index",
                index.len(),
                self.corpus.len()
            );
            return Ranking::default();
        }

        let text = query_composite(query, &self.config.field_emphasis);
        let similarities = match index.embed_query(&text) {
            Ok(vector) => Some(index.similarities(&vector)),
            Err(e) => {
                tracing::warn!("Query embedding failed, using lexical scoring only: {e}");
                None
            }
        };
        let degraded = similarities.is_none();

        let threshold = self.config.fuzzy_threshold;
        let mut results: Vec<MatchResult> = Vec::new();
        for (position, lab) in self.corpus.labs().iter().enumerate() {
            let lexical = LexicalMatch::compute(&query.keywords, index.lab_terms(position), threshold);
            let signals = Signals {
                vector: similarities.as_ref().map(|s| s[position]),
                lexical: lexical.ratio(query.keywords.len()),
                major: query
                    .major
                    .as_deref()
                    .map(|m| field_affinity(m, &lab.major, threshold)),
                university: query
                    .university
                    .as_deref()
                    .map(|u| substring_affinity(u, &lab.university)),
            };
            let score = MatchScore::calculate_with_weights(&signals, &self.config.weights);

            if !self.config.admits(&score, lexical.match_count()) {
                continue;
            }
            results.push(MatchResult {
                lab: lab.clone(),
                score,
                matched_terms: lexical.matched_terms,
            });
        }

        // Score descending, then match count descending, then id ascending
        results.sort_by(|a, b| {
            b.score
                .composite
                .total_cmp(&a.score.composite)
                .then_with(|| b.match_count().cmp(&a.match_count()))
                .then_with(|| a.lab.id.cmp(&b.lab.id))
        });

        tracing::debug!(
            "Query {:?} admitted {} of {} labs{}",
            query.keywords,
            results.len(),
            self.corpus.len(),
            if degraded { " (degraded)" } else { "" }
        );

        Ranking {
            candidates: results.len(),
            results,
            degraded,
        }
    }

    /// Find the single best match
    #[cfg(test)]
    pub fn find_best_match(&self, query: &Query) -> Option<MatchResult> {
        self.find_matches(query, 1).into_iter().next()
    }
}
