use std::collections::BTreeMap;

use crate::core::types::Confidence;
use crate::matching::engine::ScoringWeights;

/// Raw per-lab signals before blending.
///
/// `None` marks a signal that does not apply to this query: the vector
/// score when the embedding step failed, the major and university bonuses
/// when the query does not declare them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Signals {
    pub vector: Option<f64>,
    pub lexical: f64,
    pub major: Option<f64>,
    pub university: Option<f64>,
}

/// Detailed similarity scores between a query and a lab
#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    /// Cosine similarity of query and lab vectors; `None` when degraded
    pub vector: Option<f64>,

    /// Fraction of query keywords matched lexically
    pub lexical: f64,

    /// Major affinity bonus, if the query declares a major
    pub major: Option<f64>,

    /// University substring bonus, if the query declares a university
    pub university: Option<f64>,

    /// Weighted composite score
    pub composite: f64,

    /// Confidence level derived from score
    pub confidence: Confidence,
}

impl MatchScore {
    /// Blend signals with the given weights.
    ///
    /// Weights of absent signals are redistributed proportionally over the
    /// present ones, so the applied weights always sum to 1.
    #[must_use]
    pub fn calculate_with_weights(signals: &Signals, weights: &ScoringWeights) -> Self {
        let weights = weights.normalized();

        let terms = [
            (weights.vector, signals.vector),
            (weights.lexical, Some(signals.lexical)),
            (weights.major, signals.major),
            (weights.university, signals.university),
        ];

        let (weighted, total_weight) = terms
            .iter()
            .filter_map(|(w, s)| s.map(|s| (w * s, *w)))
            .fold((0.0, 0.0), |(acc, total), (ws, w)| (acc + ws, total + w));

        let composite = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            // Only zero-weighted signals are present
            signals.lexical
        };

        Self {
            vector: signals.vector,
            lexical: signals.lexical,
            major: signals.major,
            university: signals.university,
            composite,
            confidence: Confidence::from_score(composite),
        }
    }

    /// True when the vector signal was unavailable
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.vector.is_none()
    }

    /// Named sub-scores for the signals that applied
    #[must_use]
    pub fn component_scores(&self) -> BTreeMap<&'static str, f64> {
        let mut components = BTreeMap::new();
        if let Some(v) = self.vector {
            components.insert("vector", v);
        }
        components.insert("lexical", self.lexical);
        if let Some(m) = self.major {
            components.insert("major", m);
        }
        if let Some(u) = self.university {
            components.insert("university", u);
        }
        components
    }
}
