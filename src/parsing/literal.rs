//! Extraction of an embedded `Lab[]` array literal from a front-end source file.
//!
//! The literal was originally emitted as JSON, then hand-edited and merged by
//! later scripts, so it is parsed permissively: comments, trailing commas,
//! bare object keys and single-quoted strings are all accepted.

use std::path::Path;

use serde_json::{Map, Value};

use crate::core::lab::Lab;
use crate::parsing::{ParseError, ParsedLabs};
use crate::utils::validation::MAX_LABS;

/// Marker that precedes the lab array in the generated page source
pub const DEFAULT_START_MARKER: &str = "const labs: Lab[] = ";

/// Parse the lab literal from a file on disk.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or any error from
/// [`parse_literal`].
pub fn parse_literal_file(
    path: &Path,
    start_marker: &str,
    tag: &str,
) -> Result<ParsedLabs, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_literal(&content, start_marker, tag)
}

/// Locate, relax and parse the lab literal embedded in `text`.
///
/// # Errors
///
/// Returns `ParseError::LiteralNotFound` if the marker is absent,
/// `ParseError::UnbalancedLiteral` if the array never closes,
/// `ParseError::InvalidLiteral` if the relaxed text is still not valid JSON,
/// `ParseError::NotAnArray` if it is not an array, or
/// `ParseError::TooManyLabs` if the array is too large.
pub fn parse_literal(text: &str, start_marker: &str, tag: &str) -> Result<ParsedLabs, ParseError> {
    let literal = extract_literal(text, start_marker)?;
    let relaxed = relax_literal(literal);
    let value: Value = serde_json::from_str(&relaxed)?;
    parse_records(value, tag)
}

/// Convert a JSON array of record objects into labs.
///
/// Records without an `id` get `{tag}-{position}`. Records that are not objects,
/// lack a name, or carry wrongly typed fields are skipped.
///
/// # Errors
///
/// Returns `ParseError::NotAnArray` or `ParseError::TooManyLabs`.
pub fn parse_records(value: Value, tag: &str) -> Result<ParsedLabs, ParseError> {
    let Value::Array(items) = value else {
        return Err(ParseError::NotAnArray);
    };
    if items.len() > MAX_LABS {
        return Err(ParseError::TooManyLabs(items.len()));
    }

    let mut parsed = ParsedLabs::default();
    for (i, item) in items.into_iter().enumerate() {
        let position = i + 1;
        match record_from_value(item, position, tag) {
            Ok(lab) => parsed.labs.push(lab),
            Err(reason) => parsed.skip(tag, position, reason),
        }
    }
    Ok(parsed)
}

/// Return the `[...]` slice that follows `start_marker`.
///
/// # Errors
///
/// Returns `ParseError::LiteralNotFound` when the marker is missing or not
/// followed by `[`, and `ParseError::UnbalancedLiteral` when no matching `]`
/// exists.
pub fn extract_literal<'a>(text: &'a str, start_marker: &str) -> Result<&'a str, ParseError> {
    let marker = start_marker.trim_end();
    let not_found = || ParseError::LiteralNotFound(marker.to_string());

    let marker_at = text.find(marker).ok_or_else(not_found)?;
    let after = marker_at + marker.len();
    let rest = &text[after..];
    let start = after + (rest.len() - rest.trim_start().len());
    if !text[start..].starts_with('[') {
        return Err(not_found());
    }

    let end = find_closing_bracket(&text[start..]).ok_or(ParseError::UnbalancedLiteral(start))?;
    Ok(&text[start..=start + end])
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    Str(char),
    LineComment,
    BlockComment,
}

/// Byte offset of the bracket closing the one at offset 0
fn find_closing_bracket(s: &str) -> Option<usize> {
    let mut state = ScanState::Code;
    let mut depth = 0usize;
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        match state {
            ScanState::Code => match c {
                '"' | '\'' | '`' => state = ScanState::Str(c),
                '/' if next == Some('/') => {
                    chars.next();
                    state = ScanState::LineComment;
                }
                '/' if next == Some('*') => {
                    chars.next();
                    state = ScanState::BlockComment;
                }
                '[' | '{' => depth += 1,
                ']' | '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
            ScanState::Str(quote) => {
                if c == '\\' {
                    chars.next();
                } else if c == quote {
                    state = ScanState::Code;
                }
            }
            ScanState::LineComment => {
                if c == '\n' {
                    state = ScanState::Code;
                }
            }
            ScanState::BlockComment => {
                if c == '*' && next == Some('/') {
                    chars.next();
                    state = ScanState::Code;
                }
            }
        }
    }
    None
}

/// Rewrite a JavaScript-style literal into strict JSON.
///
/// Handles `//` and `/* */` comments, trailing commas, bare object keys, and
/// single-quoted or backtick strings.
#[must_use]
pub fn relax_literal(literal: &str) -> String {
    let chars: Vec<char> = literal.chars().collect();
    let mut out = String::with_capacity(literal.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '"' | '\'' | '`' => {
                i = copy_string(&chars, i, &mut out);
                continue;
            }
            '/' if next == Some('/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '/' if next == Some('*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
                continue;
            }
            ']' | '}' => {
                drop_trailing_comma(&mut out);
                out.push(c);
            }
            c if is_ident_start(c) && expects_key(&out) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                let mut j = i;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if chars.get(j) == Some(&':') {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
                continue;
            }
            _ => out.push(c),
        }
        i += 1;
    }
    out
}

/// Copy a quoted string as a JSON string; returns the index after its closing quote
fn copy_string(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    out.push('"');
    let mut i = start + 1;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            match chars.get(i + 1) {
                Some(&escaped @ ('\'' | '`')) => out.push(escaped),
                Some(&escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            }
            i += 2;
            continue;
        }
        if c == quote {
            out.push('"');
            return i + 1;
        }
        match c {
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => {}
            _ => out.push(c),
        }
        i += 1;
    }
    i
}

fn drop_trailing_comma(out: &mut String) {
    let trimmed_len = out.trim_end().len();
    if out[..trimmed_len].ends_with(',') {
        out.truncate(trimmed_len - 1);
    }
}

fn expects_key(out: &str) -> bool {
    matches!(out.trim_end().chars().last(), Some('{' | ','))
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn record_from_value(value: Value, position: usize, tag: &str) -> Result<Lab, String> {
    let Value::Object(map) = value else {
        return Err("record is not an object".to_string());
    };

    let name = text_field(&map, "name")?.unwrap_or_default();
    if name.is_empty() {
        return Err("missing 'name'".to_string());
    }

    let id = match map.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        None | Some(Value::Null | Value::String(_)) => format!("{tag}-{position}"),
        Some(_) => return Err("'id' must be a string".to_string()),
    };

    let keywords = match map.get("keywords") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => text_field(&map, "keywords")?.unwrap_or_default(),
    };

    Ok(Lab::new(id, name)
        .with_major(text_field(&map, "major")?.unwrap_or_default())
        .with_university(text_field(&map, "university")?.unwrap_or_default())
        .with_keywords(keywords)
        .with_introduction(text_field(&map, "introduction")?.unwrap_or_default()))
}

fn text_field(map: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(format!("field '{key}' must be a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"'use client';

import { useState } from "react";

const labs: Lab[] = [
  {
    "id": "cs-1",
    "name": "Ada Lab",
    "major": "Computer Science",
    "keywords": "machine learning, robotics",
    "introduction": "Uses [brackets] and ]; inside strings."
  },
  // merged by hand
  {
    id: 'me-1',
    name: 'Thermo Lab',
    major: "Mechanical Engineering",
    university: "MIT",
    keywords: "thermodynamics, fluid dynamics",
    introduction: 'It\'s hot.',
  },
];

export default function Database() { return labs.map(l => [l]); }
"#;

    #[test]
    fn test_parse_embedded_page() {
        let parsed = parse_literal(PAGE, DEFAULT_START_MARKER, "page").unwrap();
        assert_eq!(parsed.labs.len(), 2);
        assert!(parsed.skipped.is_empty());

        assert_eq!(parsed.labs[0].id.as_str(), "cs-1");
        assert_eq!(
            parsed.labs[0].introduction,
            "Uses [brackets] and ]; inside strings."
        );

        let thermo = &parsed.labs[1];
        assert_eq!(thermo.id.as_str(), "me-1");
        assert_eq!(thermo.university, "MIT");
        assert_eq!(thermo.introduction, "It's hot.");
    }

    #[test]
    fn test_marker_missing() {
        let result = parse_literal("const other = [];", DEFAULT_START_MARKER, "page");
        assert!(matches!(result, Err(ParseError::LiteralNotFound(_))));
    }

    #[test]
    fn test_unterminated_literal() {
        let text = "const labs: Lab[] = [ { \"name\": \"x\" }";
        let result = parse_literal(text, DEFAULT_START_MARKER, "page");
        assert!(matches!(result, Err(ParseError::UnbalancedLiteral(_))));
    }

    #[test]
    fn test_marker_with_newline_before_array() {
        let text = "export const labs: Lab[] =\n  [{\"name\": \"A\"}];";
        let parsed = parse_literal(text, DEFAULT_START_MARKER, "page").unwrap();
        assert_eq!(parsed.labs.len(), 1);
    }

    #[test]
    fn test_synthetic_ids_and_skipped_records() {
        let text = r#"const labs: Lab[] = [
            {"name": "No Id Lab", "keywords": ["optics", " lasers "]},
            {"id": "x-9"},
            42,
            {"name": "Bad Major", "major": {"nested": true}},
        ];"#;
        let parsed = parse_literal(text, DEFAULT_START_MARKER, "ucla").unwrap();

        assert_eq!(parsed.labs.len(), 1);
        assert_eq!(parsed.labs[0].id.as_str(), "ucla-1");
        assert_eq!(parsed.labs[0].keywords, "optics, lasers");

        let positions: Vec<usize> = parsed.skipped.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![2, 3, 4]);
    }

    #[test]
    fn test_relax_literal() {
        let relaxed = relax_literal("[{a: 1, /* c */ b: [true, false,], 'c': `x\ny`,},]");
        let value: Value = serde_json::from_str(&relaxed).unwrap();
        assert_eq!(value[0]["a"], 1);
        assert_eq!(value[0]["b"][1], false);
        assert_eq!(value[0]["c"], "x\ny");
    }
}
