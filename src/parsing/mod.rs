//! Parsers for extracting lab records from upstream text artifacts.
//!
//! This module provides parsers for:
//!
//! - **Analysis blocks**: Repeated `Professor:` blocks with `Analysis:` and
//!   `Introduction:` sections, as written by the lab summarization step
//! - **Embedded literals**: A `const labs: Lab[] = [...]` array literal inside
//!   a front-end source file, hand-edited by earlier merge runs
//! - **Department names**: Expansion of file-stem abbreviations to full majors
//!
//! Parsers never fail on a single bad record. Malformed records are dropped,
//! recorded in [`ParsedLabs::skipped`], and logged.
//!
//! ## Example
//!
//! ```rust
//! use lab_matcher::parsing::blocks::{parse_blocks, BlockSource};
//!
//! let text = "Professor: Ada Lovelace\nAnalysis:\nanalytical engines\nIntroduction:\nComputing pioneer.\n";
//! let parsed = parse_blocks(text, &BlockSource::new("cs", "Computer Science"));
//! assert_eq!(parsed.labs.len(), 1);
//! assert_eq!(parsed.labs[0].id.as_str(), "cs-1");
//! ```

use thiserror::Error;

use crate::core::lab::Lab;

pub mod blocks;
pub mod literal;
pub mod majors;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Start marker '{0}' not found")]
    LiteralNotFound(String),

    #[error("Array literal starting at byte {0} is not terminated")]
    UnbalancedLiteral(usize),

    #[error("Invalid array literal: {0}")]
    InvalidLiteral(#[from] serde_json::Error),

    #[error("Expected an array of lab records")]
    NotAnArray,

    #[error("Too many labs: {0} exceeds maximum allowed (100000)")]
    TooManyLabs(usize),
}

/// A record that was dropped during parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// 1-based position of the record within its source
    pub position: usize,
    /// Why the record was dropped
    pub reason: String,
}

/// Labs parsed from one source, plus the records that were dropped
#[derive(Debug, Clone, Default)]
pub struct ParsedLabs {
    pub labs: Vec<Lab>,
    pub skipped: Vec<SkippedRecord>,
}

impl ParsedLabs {
    /// Total records encountered, accepted or not
    #[must_use]
    pub fn records_seen(&self) -> usize {
        self.labs.len() + self.skipped.len()
    }

    pub(crate) fn skip(&mut self, source: &str, position: usize, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!("Skipping record {position} in {source}: {reason}");
        self.skipped.push(SkippedRecord { position, reason });
    }
}
