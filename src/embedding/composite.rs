//! Composite texts: the weighted concatenation of a lab's fields.
//!
//! Emphasis is realized by literal repetition. The same repetition counts are
//! applied to query text (major and keywords) so both sides share a scale.

use serde::{Deserialize, Serialize};

use crate::core::lab::Lab;
use crate::core::query::Query;

/// How many times each field's text is repeated in a composite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldEmphasis {
    pub keywords: usize,
    pub introduction: usize,
    pub major: usize,
    pub university: usize,
}

impl Default for FieldEmphasis {
    fn default() -> Self {
        Self {
            keywords: 3,
            introduction: 2,
            major: 1,
            university: 1,
        }
    }
}

/// Build the composite text for a lab
#[must_use]
pub fn lab_composite(lab: &Lab, emphasis: &FieldEmphasis) -> String {
    let keywords = lab.keyword_list().join(" ");
    let mut parts: Vec<&str> = Vec::new();
    push_repeated(&mut parts, &keywords, emphasis.keywords);
    push_repeated(&mut parts, &lab.introduction, emphasis.introduction);
    push_repeated(&mut parts, &lab.major, emphasis.major);
    push_repeated(&mut parts, &lab.university, emphasis.university);
    parts.join(" ")
}

/// Build the composite text for a query: declared major plus joined keywords
#[must_use]
pub fn query_composite(query: &Query, emphasis: &FieldEmphasis) -> String {
    let keywords = query.keywords.join(" ");
    let mut parts: Vec<&str> = Vec::new();
    if let Some(major) = &query.major {
        push_repeated(&mut parts, major, emphasis.major);
    }
    push_repeated(&mut parts, &keywords, emphasis.keywords);
    parts.join(" ")
}

fn push_repeated<'a>(parts: &mut Vec<&'a str>, text: &'a str, times: usize) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    for _ in 0..times {
        parts.push(text);
    }
}
