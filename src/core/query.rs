use serde::{Deserialize, Serialize};

use crate::core::lab::split_keywords;
use crate::utils::validation::{MAX_KEYWORDS, MAX_KEYWORD_LENGTH};

/// A ranking request: research keywords plus optional preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Normalized keywords (lowercase, trimmed, unique)
    pub keywords: Vec<String>,

    /// Declared major, used both in the query text and for the major bonus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,

    /// Preferred university, used for the university bonus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
}

impl Query {
    /// Build a query from raw keyword inputs.
    ///
    /// Each input may itself be a comma-separated list. Inputs are normalized,
    /// deduplicated, and truncated to the configured keyword limits.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for raw in keywords {
            for term in split_keywords(raw.as_ref()) {
                if normalized.contains(&term) {
                    continue;
                }
                if normalized.len() >= MAX_KEYWORDS {
                    tracing::warn!("Query exceeds {MAX_KEYWORDS} keywords, extra terms ignored");
                    return Self {
                        keywords: normalized,
                        major: None,
                        university: None,
                    };
                }
                let term = if term.chars().count() > MAX_KEYWORD_LENGTH {
                    term.chars().take(MAX_KEYWORD_LENGTH).collect()
                } else {
                    term
                };
                normalized.push(term);
            }
        }

        Self {
            keywords: normalized,
            major: None,
            university: None,
        }
    }

    #[must_use]
    pub fn with_major(mut self, major: impl Into<String>) -> Self {
        self.major = non_blank(major.into());
        self
    }

    #[must_use]
    pub fn with_university(mut self, university: impl Into<String>) -> Self {
        self.university = non_blank(university.into());
        self
    }

    /// True when there is nothing to match against
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_normalizes_keywords() {
        let query = Query::new(["Robotics", "machine learning, ROBOTICS", "  "]);
        assert_eq!(query.keywords, vec!["robotics", "machine learning"]);
    }

    #[test]
    fn test_query_blank_major_is_none() {
        let query = Query::new(["ai"]).with_major("   ");
        assert!(query.major.is_none());

        let query = Query::new(["ai"]).with_major(" Computer Science ");
        assert_eq!(query.major.as_deref(), Some("Computer Science"));
    }

    #[test]
    fn test_query_keyword_limit() {
        let many: Vec<String> = (0..MAX_KEYWORDS + 20).map(|i| format!("term{i}")).collect();
        let query = Query::new(&many);
        assert_eq!(query.keywords.len(), MAX_KEYWORDS);
    }

    #[test]
    fn test_empty_query() {
        let query = Query::new(Vec::<String>::new());
        assert!(query.is_empty());
    }
}
