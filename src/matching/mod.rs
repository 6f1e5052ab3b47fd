//! Lab ranking engine and scoring.
//!
//! This module provides the core matching functionality:
//!
//! - [`Ranker`]: Owns the published corpus/index snapshot and answers queries
//! - [`MatchingEngine`]: Scores one snapshot against a query
//! - [`MatchScore`]: Per-signal scores and their weighted blend
//!
//! ## Ranking Algorithm
//!
//! 1. **Vector similarity**: cosine of the query composite and each lab
//!    composite in the fitted embedding space
//! 2. **Lexical match**: query keywords matched exactly, fuzzily, or by
//!    token subset against the lab's keywords
//! 3. **Field bonuses**: declared major (substring or fuzzy) and university
//!    (substring)
//! 4. **Blend**: weighted sum with weights normalized over the signals that
//!    apply; a failed query embedding drops the vector signal
//! 5. **Filter and sort**: score above `min_score` or enough matched terms;
//!    ties by match count, then id
//! 6. **Diverse top-N**: per-group cap, then fill by rank
//!
//! ## Example
//!
//! ```rust
//! use lab_matcher::{LabCorpus, MatchingConfig, Query, Ranker};
//!
//! let ranker = Ranker::new(MatchingConfig::default());
//! ranker.load(LabCorpus::load_embedded().unwrap());
//!
//! let query = Query::new(["robotics", "control systems"]);
//! for m in ranker.recommend(&query, 5).results {
//!     println!("{}: {:.3} {:?}", m.lab.name, m.similarity_score(), m.matched_terms);
//! }
//! ```

pub mod diversity;
pub mod engine;
pub mod index;
pub mod lexical;
pub mod ranker;
pub mod scoring;

pub use engine::{
    MatchResult, MatchingConfig, MatchingEngine, Ranking, Recommendation, ScoringWeights,
};
pub use ranker::{Health, Ranker, RankerState, Snapshot};
pub use scoring::MatchScore;
