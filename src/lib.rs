//! # lab-matcher
//!
//! A library for ranking university research labs against a student's
//! research keywords.
//!
//! Lab descriptions arrive in whatever shape the scraping and summarization
//! scripts left them: a JSON export, a `Lab[]` literal embedded in a
//! front-end data file, or per-department text files of `Professor:` blocks.
//! `lab-matcher` loads them into a deduplicated corpus, indexes it, and
//! answers "which labs fit these interests?" with explainable scores.
//!
//! ## Features
//!
//! - **Tolerant loading**: malformed records are skipped and counted, never fatal
//! - **TF-IDF similarity**: unigram and bigram vectors over weighted lab text
//! - **Lexical matching**: exact, fuzzy, and partial keyword matches with the
//!   matched terms reported per lab
//! - **Preference bonuses**: declared major and university
//! - **Diverse results**: a per-university cap before filling by score
//! - **Graceful degradation**: lexical-only scoring when embedding fails
//! - **Atomic reloads**: queries never observe a half-built index
//!
//! ## Example
//!
//! ```rust
//! use lab_matcher::{CorpusLoader, MatchingConfig, Query, Ranker};
//!
//! // Without a configured source the loader falls back to the built-in sample
//! let (corpus, report) = CorpusLoader::new().load();
//! assert!(report.labs_loaded > 0);
//!
//! let ranker = Ranker::new(MatchingConfig::default());
//! ranker.load(corpus);
//!
//! let query = Query::new(["robotics", "machine learning"]).with_major("Computer Science");
//! for m in ranker.recommend(&query, 5).results {
//!     println!("{}: {:.1}% {:?}", m.lab.name, m.similarity_score() * 100.0, m.matched_terms);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Lab, query, and identifier types
//! - [`parsing`]: Parsers for block files and embedded literals
//! - [`corpus`]: Corpus storage and the fallback loader
//! - [`embedding`]: Embedding backends and composite texts
//! - [`matching`]: Ranking engine, scoring, and diversity selection
//! - [`config`]: Layered configuration
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: HTTP API

pub mod cli;
pub mod config;
pub mod core;
pub mod corpus;
pub mod embedding;
pub mod matching;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use core::lab::Lab;
pub use core::query::Query;
pub use core::types::*;
pub use corpus::loader::{CorpusLoader, LoadReport};
pub use corpus::store::LabCorpus;
pub use embedding::{Embedder, EmbeddingBackend, TfIdfBackend};
pub use matching::engine::{MatchResult, MatchingConfig, MatchingEngine, ScoringWeights};
pub use matching::ranker::Ranker;
