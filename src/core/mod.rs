//! Core data types for lab matching.
//!
//! - [`Lab`]: A research lab record from the corpus
//! - [`LabId`]: Stable identifier used for lookups and deduplication
//! - [`Query`]: A set of research keywords with optional major/university preferences
//! - [`Confidence`], [`GroupBy`]: Result classification and grouping types
//!
//! ## Keyword Normalization
//!
//! Lab keywords are stored exactly as the upstream source wrote them: a comma
//! separated list with inconsistent casing and occasional duplicates. Every
//! comparison goes through [`normalize_keyword`], which lowercases, trims and
//! collapses internal whitespace.

pub mod lab;
pub mod query;
pub mod types;

pub use lab::{normalize_keyword, split_keywords, Lab};
pub use query::Query;
pub use types::{Confidence, GroupBy, LabId};
