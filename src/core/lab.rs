use serde::{Deserialize, Serialize};

use crate::core::types::{GroupBy, LabId};

/// A research lab in the corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    /// Unique identifier, stable across reloads
    pub id: LabId,

    /// Display name of the lab or principal investigator
    pub name: String,

    /// Department or field label (free text)
    #[serde(default)]
    pub major: String,

    /// Institution name, empty if unknown
    #[serde(default)]
    pub university: String,

    /// Comma-separated research terms as written by the source
    #[serde(default)]
    pub keywords: String,

    /// Narrative description of the lab
    #[serde(default)]
    pub introduction: String,
}

impl Lab {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: LabId::new(id),
            name: name.into(),
            major: String::new(),
            university: String::new(),
            keywords: String::new(),
            introduction: String::new(),
        }
    }

    #[must_use]
    pub fn with_major(mut self, major: impl Into<String>) -> Self {
        self.major = major.into();
        self
    }

    #[must_use]
    pub fn with_university(mut self, university: impl Into<String>) -> Self {
        self.university = university.into();
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    #[must_use]
    pub fn with_introduction(mut self, introduction: impl Into<String>) -> Self {
        self.introduction = introduction.into();
        self
    }

    /// Normalized, deduplicated keyword list in source order
    #[must_use]
    pub fn keyword_list(&self) -> Vec<String> {
        split_keywords(&self.keywords)
    }

    /// Value of the field used for diversity grouping
    #[must_use]
    pub fn group_key(&self, group_by: GroupBy) -> &str {
        match group_by {
            GroupBy::University => &self.university,
            GroupBy::Major => &self.major,
        }
    }
}

/// Lowercase, trim, and collapse internal whitespace.
#[must_use]
pub fn normalize_keyword(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split a comma-separated keyword string into normalized unique terms.
///
/// Order of first occurrence is preserved; empty entries are dropped.
#[must_use]
pub fn split_keywords(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    text.split(',')
        .map(normalize_keyword)
        .filter(|k| !k.is_empty() && seen.insert(k.clone()))
        .collect()
}
