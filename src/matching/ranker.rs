//! The long-lived ranking component.
//!
//! A [`Ranker`] owns the current [`Snapshot`] (corpus plus optional index)
//! behind a read-write lock. Queries clone the snapshot `Arc` and score
//! without holding the lock. [`Ranker::load`] builds the replacement index
//! completely before publishing it, so concurrent queries observe either the
//! old snapshot or the new one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::core::lab::Lab;
use crate::core::query::Query;
use crate::corpus::store::LabCorpus;
use crate::embedding::{EmbeddingBackend, TfIdfBackend};
use crate::matching::engine::{MatchingConfig, MatchingEngine, Ranking};
use crate::matching::index::LabIndex;

/// Lifecycle of a ranker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankerState {
    /// No usable index; queries return nothing
    Uninitialized,
    /// An index is published and queries are scored against it
    Indexed,
}

/// An immutable corpus/index pair
#[derive(Debug, Default)]
pub struct Snapshot {
    corpus: LabCorpus,
    index: Option<LabIndex>,
    loaded_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    #[must_use]
    pub fn corpus(&self) -> &LabCorpus {
        &self.corpus
    }

    #[must_use]
    pub fn index(&self) -> Option<&LabIndex> {
        self.index.as_ref()
    }

    #[must_use]
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    #[must_use]
    pub fn state(&self) -> RankerState {
        if self.index.is_some() {
            RankerState::Indexed
        } else {
            RankerState::Uninitialized
        }
    }
}

/// Readiness report
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub labs_loaded: usize,
    pub index_ready: bool,
    pub state: RankerState,
    pub embedding_backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

pub struct Ranker {
    backend: Arc<dyn EmbeddingBackend>,
    config: MatchingConfig,
    current: RwLock<Arc<Snapshot>>,
}

impl Ranker {
    /// Create an uninitialized ranker using the built-in TF-IDF backend
    #[must_use]
    pub fn new(config: MatchingConfig) -> Self {
        let backend = Arc::new(TfIdfBackend::new(config.tfidf.clone()));
        Self::with_backend(config, backend)
    }

    /// Create an uninitialized ranker using a custom embedding backend
    #[must_use]
    pub fn with_backend(config: MatchingConfig, backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self {
            backend,
            config,
            current: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// Index `corpus` and publish it, replacing the current snapshot.
    ///
    /// An empty corpus or a failed index build still publishes the corpus
    /// (for lookups) but leaves the ranker `Uninitialized`.
    pub fn load(&self, corpus: LabCorpus) -> RankerState {
        let index = if corpus.is_empty() {
            tracing::warn!("Corpus is empty; ranker stays uninitialized");
            None
        } else {
            match LabIndex::build(&corpus, self.backend.as_ref(), &self.config.field_emphasis) {
                Ok(index) => {
                    tracing::info!(
                        "Indexed {} labs with {} backend ({} dimensions)",
                        index.len(),
                        self.backend.name(),
                        index.dim()
                    );
                    Some(index)
                }
                Err(e) => {
                    tracing::error!("Failed to build index: {e}");
                    None
                }
            }
        };

        let snapshot = Arc::new(Snapshot {
            corpus,
            index,
            loaded_at: Some(Utc::now()),
        });
        let state = snapshot.state();
        *self.current.write() = snapshot;
        tracing::debug!("Published new snapshot ({state:?})");
        state
    }

    /// The currently published snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    #[must_use]
    pub fn state(&self) -> RankerState {
        self.snapshot().state()
    }

    #[must_use]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Rank the current corpus for `query`
    #[must_use]
    pub fn recommend(&self, query: &Query, top_n: usize) -> Ranking {
        self.recommend_in(&self.snapshot(), query, top_n)
    }

    /// Rank `snapshot` for `query`.
    ///
    /// Callers that also report corpus facts alongside the ranking take one
    /// snapshot and pass it here so both come from the same load.
    #[must_use]
    pub fn recommend_in(&self, snapshot: &Snapshot, query: &Query, top_n: usize) -> Ranking {
        MatchingEngine::new(&snapshot.corpus, snapshot.index(), &self.config).rank(query, top_n)
    }

    /// Look up a lab by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Lab> {
        self.snapshot().corpus.get_str(id).cloned()
    }

    #[must_use]
    pub fn health(&self) -> Health {
        let snapshot = self.snapshot();
        let index_ready = snapshot.index.is_some();
        Health {
            status: if index_ready { "healthy" } else { "not_ready" },
            labs_loaded: snapshot.corpus.len(),
            index_ready,
            state: snapshot.state(),
            embedding_backend: self.backend.name().to_string(),
            loaded_at: snapshot.loaded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ranker_is_uninitialized() {
        let ranker = Ranker::new(MatchingConfig::default());
        assert_eq!(ranker.state(), RankerState::Uninitialized);

        let health = ranker.health();
        assert_eq!(health.labs_loaded, 0);
        assert!(!health.index_ready);
        assert_eq!(health.embedding_backend, "tfidf");
        assert!(ranker.recommend(&Query::new(["robotics"]), 5).results.is_empty());
    }

    #[test]
    fn test_load_indexes_corpus() {
        let ranker = Ranker::new(MatchingConfig::default());
        let state = ranker.load(LabCorpus::load_embedded().unwrap());
        assert_eq!(state, RankerState::Indexed);
        assert_eq!(ranker.health().labs_loaded, 8);
        assert!(ranker.get("sample-2").is_some());
        assert!(ranker.get("missing").is_none());
    }

    #[test]
    fn test_load_empty_corpus() {
        let ranker = Ranker::new(MatchingConfig::default());
        ranker.load(LabCorpus::load_embedded().unwrap());
        let state = ranker.load(LabCorpus::new());
        assert_eq!(state, RankerState::Uninitialized);
        assert_eq!(ranker.health().labs_loaded, 0);
    }

    #[test]
    fn test_old_snapshot_survives_reload() {
        let ranker = Ranker::new(MatchingConfig::default());
        ranker.load(LabCorpus::load_embedded().unwrap());
        let before = ranker.snapshot();

        ranker.load(LabCorpus::new());
        assert_eq!(before.corpus().len(), 8);
        assert_eq!(before.state(), RankerState::Indexed);
        assert_eq!(ranker.snapshot().corpus().len(), 0);
    }

    #[test]
    fn test_recommend_in_held_snapshot_ignores_reload() {
        let ranker = Ranker::new(MatchingConfig::default());
        ranker.load(LabCorpus::load_embedded().unwrap());
        let held = ranker.snapshot();

        ranker.load(LabCorpus::new());
        let query = Query::new(["robotics"]);
        assert!(ranker.recommend(&query, 5).results.is_empty());

        let ranking = ranker.recommend_in(&held, &query, 5);
        assert!(!ranking.results.is_empty());
        assert!(ranking
            .results
            .iter()
            .all(|r| held.corpus().get_str(r.lab.id.as_str()).is_some()));
    }
}
