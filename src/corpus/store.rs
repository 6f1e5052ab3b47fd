use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::lab::Lab;
use crate::core::types::LabId;
use crate::parsing::literal::parse_records;
use crate::parsing::{ParseError, ParsedLabs};

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Corpus source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corpus source too large: {0}")]
    SourceTooLarge(PathBuf),

    #[error("Failed to parse corpus: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to serialize corpus: {0}")]
    Json(#[from] serde_json::Error),
}

/// Corpus file version for compatibility checking
pub const CORPUS_VERSION: &str = "1.0.0";

/// Serializable corpus format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusData {
    pub version: String,
    pub created_at: String,
    pub labs: Vec<Lab>,
}

/// Deduplicated lab collection with an ID index.
///
/// Insertion order is preserved. When two records share an ID the first one
/// seen is kept and later ones are rejected.
#[derive(Debug, Clone, Default)]
pub struct LabCorpus {
    labs: Vec<Lab>,

    /// Index: lab ID -> position in labs
    id_to_index: HashMap<LabId, usize>,
}

impl LabCorpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from labs in encounter order.
    ///
    /// Returns the corpus and the number of duplicate IDs that were dropped.
    pub fn from_labs(labs: impl IntoIterator<Item = Lab>) -> (Self, usize) {
        let mut corpus = Self::new();
        let mut duplicates = 0;
        for lab in labs {
            if !corpus.add_lab(lab) {
                duplicates += 1;
            }
        }
        (corpus, duplicates)
    }

    /// Load the embedded sample corpus
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded JSON is invalid (checked by build.rs).
    pub fn load_embedded() -> Result<Self, CorpusError> {
        // Embedded at compile time, validated by build.rs
        const EMBEDDED_SAMPLE: &str = include_str!("../../data/sample_labs.json");
        Self::from_json(EMBEDDED_SAMPLE)
    }

    /// Load a corpus from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::SourceUnavailable` if the file cannot be read, or a
    /// parse error if its contents are not a lab corpus.
    pub fn load_from_file(path: &Path) -> Result<Self, CorpusError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| CorpusError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&content)
    }

    /// Parse a corpus from JSON: either [`CorpusData`] or a bare array of labs.
    ///
    /// Malformed records are skipped and duplicate IDs dropped, both with a log line.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or holds no lab array.
    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let parsed = parse_json_records(json)?;
        let (corpus, duplicates) = Self::from_labs(parsed.labs);
        if duplicates > 0 {
            tracing::warn!("Dropped {duplicates} labs with duplicate IDs");
        }
        Ok(corpus)
    }

    /// Add a lab; returns false (and keeps the existing lab) if the ID is taken
    pub fn add_lab(&mut self, lab: Lab) -> bool {
        if self.id_to_index.contains_key(&lab.id) {
            tracing::debug!("Duplicate lab ID '{}' ignored", lab.id);
            return false;
        }
        self.id_to_index.insert(lab.id.clone(), self.labs.len());
        self.labs.push(lab);
        true
    }

    /// Merge another corpus into this one, first-seen wins.
    ///
    /// Returns the number of labs rejected as duplicates.
    pub fn merge(&mut self, other: LabCorpus) -> usize {
        let mut rejected = 0;
        for lab in other.labs {
            if !self.add_lab(lab) {
                rejected += 1;
            }
        }
        rejected
    }

    /// Get a lab by ID
    pub fn get(&self, id: &LabId) -> Option<&Lab> {
        self.id_to_index.get(id).map(|&idx| &self.labs[idx])
    }

    /// Get a lab by ID string
    pub fn get_str(&self, id: &str) -> Option<&Lab> {
        self.get(&LabId::new(id))
    }

    /// All labs in insertion order
    pub fn labs(&self) -> &[Lab] {
        &self.labs
    }

    /// Labs whose major and/or university contain the given text (case-insensitive)
    pub fn filter<'a>(
        &'a self,
        major: Option<&'a str>,
        university: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Lab> + 'a {
        let major = major.map(str::to_lowercase);
        let university = university.map(str::to_lowercase);
        self.labs.iter().filter(move |lab| {
            major
                .as_deref()
                .map_or(true, |m| lab.major.to_lowercase().contains(m))
                && university
                    .as_deref()
                    .map_or(true, |u| lab.university.to_lowercase().contains(u))
        })
    }

    /// Distinct non-empty majors, sorted
    pub fn majors(&self) -> BTreeSet<&str> {
        self.labs
            .iter()
            .map(|l| l.major.as_str())
            .filter(|m| !m.is_empty())
            .collect()
    }

    /// Distinct non-empty universities, sorted
    pub fn universities(&self) -> BTreeSet<&str> {
        self.labs
            .iter()
            .map(|l| l.university.as_str())
            .filter(|u| !u.is_empty())
            .collect()
    }

    /// Export corpus to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, CorpusError> {
        let data = CorpusData {
            version: CORPUS_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            labs: self.labs.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of labs in corpus
    pub fn len(&self) -> usize {
        self.labs.len()
    }

    /// Check if corpus is empty
    pub fn is_empty(&self) -> bool {
        self.labs.is_empty()
    }
}

/// Parse the lab records of a JSON corpus without deduplicating them.
///
/// Accepts [`CorpusData`] or a bare array. Malformed records are reported in
/// [`ParsedLabs::skipped`].
///
/// # Errors
///
/// Returns an error if the text is not JSON or holds no lab array.
pub fn parse_json_records(json: &str) -> Result<ParsedLabs, CorpusError> {
    let mut value: serde_json::Value = serde_json::from_str(json)?;

    let records = if value.is_array() {
        value
    } else {
        if let Some(version) = value.get("version").and_then(|v| v.as_str()) {
            // Version check (warn but don't fail)
            if version != CORPUS_VERSION {
                tracing::warn!(
                    "Corpus version mismatch (expected {CORPUS_VERSION}, found {version})"
                );
            }
        }
        value
            .get_mut("labs")
            .map(serde_json::Value::take)
            .ok_or(ParseError::NotAnArray)?
    };

    Ok(parse_records(records, "lab")?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lab(id: &str, name: &str) -> Lab {
        Lab::new(id, name).with_keywords("robotics")
    }

    #[test]
    fn test_load_embedded_sample() {
        let corpus = LabCorpus::load_embedded().unwrap();
        assert!(!corpus.is_empty());
        assert!(corpus.get_str("sample-1").is_some());
    }

    #[test]
    fn test_first_seen_wins() {
        let (corpus, duplicates) =
            LabCorpus::from_labs(vec![lab("a-1", "First"), lab("a-2", "Other"), lab("a-1", "Second")]);

        assert_eq!(corpus.len(), 2);
        assert_eq!(duplicates, 1);
        assert_eq!(corpus.get_str("a-1").unwrap().name, "First");
        assert_eq!(corpus.labs()[1].id.as_str(), "a-2");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let (mut corpus, _) = LabCorpus::from_labs(vec![lab("a-1", "A"), lab("a-2", "B")]);
        let copy = corpus.clone();

        let rejected = corpus.merge(copy);
        assert_eq!(rejected, 2);
        assert_eq!(corpus.len(), 2);

        let (extra, _) = LabCorpus::from_labs(vec![lab("b-1", "C")]);
        assert_eq!(corpus.merge(extra), 0);
        assert_eq!(corpus.len(), 3);
    }

    #[test]
    fn test_get_nonexistent() {
        let corpus = LabCorpus::load_embedded().unwrap();
        assert!(corpus.get_str("no-such-lab").is_none());
    }

    #[test]
    fn test_from_json_bare_array() {
        let json = r#"[{"id": "x-1", "name": "X"}, {"name": "Y"}]"#;
        let corpus = LabCorpus::from_json(json).unwrap();
        assert_eq!(corpus.len(), 2);
        assert!(corpus.get_str("lab-2").is_some());
    }

    #[test]
    fn test_to_json_round_trip() {
        let corpus = LabCorpus::load_embedded().unwrap();
        let json = corpus.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("sample-1"));

        let reloaded = LabCorpus::from_json(&json).unwrap();
        assert_eq!(reloaded.len(), corpus.len());
    }

    #[test]
    fn test_filter_by_major_and_university() {
        let (corpus, _) = LabCorpus::from_labs(vec![
            Lab::new("a", "A").with_major("Computer Science").with_university("MIT"),
            Lab::new("b", "B").with_major("Computer Science").with_university("Yale"),
            Lab::new("c", "C").with_major("Bioengineering").with_university("MIT"),
        ]);

        let cs: Vec<_> = corpus.filter(Some("computer"), None).collect();
        assert_eq!(cs.len(), 2);

        let cs_mit: Vec<_> = corpus.filter(Some("computer"), Some("mit")).collect();
        assert_eq!(cs_mit.len(), 1);
        assert_eq!(cs_mit[0].id.as_str(), "a");

        assert_eq!(corpus.majors().len(), 2);
        assert_eq!(corpus.universities().len(), 2);
    }
}
