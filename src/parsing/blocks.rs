use std::path::Path;

use crate::core::lab::Lab;
use crate::parsing::majors::expand_major;
use crate::parsing::{ParseError, ParsedLabs};
use crate::utils::validation::check_lab_limit;

/// Marker that starts every lab block
pub const RECORD_SEPARATOR: &str = "Professor:";

/// Header of the keyword/analysis section
pub const ANALYSIS_HEADER: &str = "Analysis:";

/// Header of the narrative section
pub const INTRODUCTION_HEADER: &str = "Introduction:";

/// Optional label some summaries put at the start of the analysis section
const KEYWORDS_LABEL: &str = "Keywords:";

/// Where a block file came from: drives IDs and shared fields
#[derive(Debug, Clone)]
pub struct BlockSource {
    /// Prefix for synthetic IDs (`{tag}-{sequence}`)
    pub tag: String,
    /// Major assigned to every lab in the source
    pub major: String,
    /// University assigned to every lab in the source (may be empty)
    pub university: String,
}

impl BlockSource {
    pub fn new(tag: impl Into<String>, major: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            major: major.into(),
            university: String::new(),
        }
    }

    #[must_use]
    pub fn with_university(mut self, university: impl Into<String>) -> Self {
        self.university = university.into();
        self
    }

    /// Derive the source from a department file name such as `cs.txt`.
    ///
    /// The tag is the slugged file stem, optionally prefixed (e.g. `caltech-cs`),
    /// so every generated ID is a valid lab ID.
    #[must_use]
    pub fn from_path(path: &Path, id_prefix: Option<&str>) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let tag = match id_prefix.map(slugify) {
            Some(prefix) if !prefix.is_empty() => slugify(&format!("{prefix}-{stem}")),
            _ => slugify(&stem),
        };
        Self::new(tag, expand_major(&stem))
    }
}

/// Lowercase `text`, turn whitespace runs into `-`, drop anything that is not
/// alphanumeric, `_` or `-`, and collapse repeated dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if !(c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            continue;
        }
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug
}

/// Parse a block file from disk.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::TooManyLabs` if the file holds more labs than allowed.
pub fn parse_blocks_file(path: &Path, source: &BlockSource) -> Result<ParsedLabs, ParseError> {
    let content = std::fs::read_to_string(path)?;
    let parsed = parse_blocks(&content, source);
    if check_lab_limit(parsed.labs.len()).is_some() {
        return Err(ParseError::TooManyLabs(parsed.labs.len()));
    }
    Ok(parsed)
}

/// Parse `Professor:` blocks from text.
///
/// Text before the first separator is ignored. Each block must contain the
/// analysis header followed by the introduction header; blocks missing either
/// are skipped. IDs use the block's position in the file, so a skipped block
/// leaves a gap and fixing it later does not renumber the labs after it.
#[must_use]
pub fn parse_blocks(text: &str, source: &BlockSource) -> ParsedLabs {
    let mut parsed = ParsedLabs::default();

    for (i, block) in text.split(RECORD_SEPARATOR).skip(1).enumerate() {
        let position = i + 1;
        match parse_block(block) {
            Ok((name, keywords, introduction)) => {
                let id = format!("{}-{}", source.tag, position);
                let lab = Lab::new(id, name)
                    .with_major(source.major.clone())
                    .with_university(source.university.clone())
                    .with_keywords(keywords)
                    .with_introduction(introduction);
                parsed.labs.push(lab);
            }
            Err(reason) => parsed.skip(&source.tag, position, reason),
        }
    }

    tracing::debug!(
        "Parsed {} labs from '{}' ({} skipped)",
        parsed.labs.len(),
        source.tag,
        parsed.skipped.len()
    );
    parsed
}

/// Split one block into (name, keywords, introduction)
fn parse_block(block: &str) -> Result<(String, String, String), String> {
    let analysis_at = block
        .find(ANALYSIS_HEADER)
        .ok_or_else(|| format!("missing '{ANALYSIS_HEADER}' section"))?;

    let name = block[..analysis_at]
        .lines()
        .map(clean_line)
        .find(|l| !l.is_empty())
        .ok_or_else(|| "missing professor name".to_string())?
        .to_string();

    let rest = &block[analysis_at + ANALYSIS_HEADER.len()..];
    let intro_at = rest
        .find(INTRODUCTION_HEADER)
        .ok_or_else(|| format!("missing '{INTRODUCTION_HEADER}' section"))?;

    let keywords = rest[..intro_at]
        .lines()
        .map(clean_line)
        .map(|l| l.strip_prefix(KEYWORDS_LABEL).unwrap_or(l).trim())
        .map(|l| l.trim_end_matches(',').trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let introduction = rest[intro_at + INTRODUCTION_HEADER.len()..]
        .lines()
        .map(clean_line)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok((name, keywords, introduction))
}

/// Trim whitespace, markdown emphasis and list bullets from a line
fn clean_line(line: &str) -> &str {
    let line = line.trim().trim_matches('*').trim();
    ["- ", "• ", "* "]
        .iter()
        .find_map(|bullet| line.strip_prefix(bullet))
        .unwrap_or(line)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LABS: &str = "\
Professor: Alice Smith
Analysis:
Keywords: robotics, control systems
legged locomotion
Introduction:
The Smith lab builds walking robots.
It also studies control.

Professor: Bob Jones
Analysis:
- fluid dynamics
- turbulence
Introduction:
Turbulence research.
";

    #[test]
    fn test_parse_two_blocks() {
        let source = BlockSource::new("me", "Mechanical Engineering");
        let parsed = parse_blocks(TWO_LABS, &source);

        assert_eq!(parsed.labs.len(), 2);
        assert!(parsed.skipped.is_empty());

        let alice = &parsed.labs[0];
        assert_eq!(alice.id.as_str(), "me-1");
        assert_eq!(alice.name, "Alice Smith");
        assert_eq!(alice.major, "Mechanical Engineering");
        assert_eq!(alice.keywords, "robotics, control systems, legged locomotion");
        assert_eq!(
            alice.introduction,
            "The Smith lab builds walking robots. It also studies control."
        );

        let bob = &parsed.labs[1];
        assert_eq!(bob.id.as_str(), "me-2");
        assert_eq!(bob.keywords, "fluid dynamics, turbulence");
    }

    #[test]
    fn test_block_missing_introduction_is_skipped() {
        let text = "\
Professor: Broken Entry
Analysis:
something
Professor: Good Entry
Analysis:
optics
Introduction:
Lasers.
";
        let parsed = parse_blocks(text, &BlockSource::new("ee", "Electrical Engineering"));
        assert_eq!(parsed.labs.len(), 1);
        assert_eq!(parsed.labs[0].name, "Good Entry");
        assert_eq!(parsed.labs[0].id.as_str(), "ee-2");
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].position, 1);
        assert_eq!(parsed.records_seen(), 2);
    }

    /// Repairing a malformed block must not change the IDs of later labs
    #[test]
    fn test_ids_follow_block_position() {
        let broken = "\
Professor: A
Analysis:
a
Introduction:
x
Professor: B
Introduction:
y
Professor: C
Analysis:
c
Introduction:
z
";
        let fixed = broken.replace("Professor: B\n", "Professor: B\nAnalysis:\nb\n");
        let source = BlockSource::new("me", "Mechanical Engineering");

        let parsed = parse_blocks(broken, &source);
        let ids: Vec<_> = parsed.labs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["me-1", "me-3"]);
        assert_eq!(parsed.skipped[0].position, 2);

        let parsed = parse_blocks(&fixed, &source);
        let ids: Vec<_> = parsed.labs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["me-1", "me-2", "me-3"]);
        assert_eq!(parsed.labs[2].name, "C");
    }

    #[test]
    fn test_headers_out_of_order_are_skipped() {
        let text = "Professor: X\nIntroduction:\nabc\nAnalysis:\ndef\n";
        let parsed = parse_blocks(text, &BlockSource::new("x", "X"));
        assert!(parsed.labs.is_empty());
        assert_eq!(parsed.skipped.len(), 1);
    }

    #[test]
    fn test_markdown_emphasis_is_tolerated() {
        let text = "Professor: **Grace Hopper**\n**Analysis:**\n* compilers\n**Introduction:**\nCOBOL.\n";
        let parsed = parse_blocks(text, &BlockSource::new("cs", "Computer Science"));
        assert_eq!(parsed.labs.len(), 1);
        assert_eq!(parsed.labs[0].name, "Grace Hopper");
        assert_eq!(parsed.labs[0].keywords, "compilers");
        assert_eq!(parsed.labs[0].introduction, "COBOL.");
    }

    #[test]
    fn test_preamble_is_ignored() {
        let text = "Generated summaries\n\nProfessor: Y\nAnalysis:\na\nIntroduction:\nb\n";
        let parsed = parse_blocks(text, &BlockSource::new("y", "Y"));
        assert_eq!(parsed.labs.len(), 1);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn test_source_from_path() {
        let source = BlockSource::from_path(Path::new("/data/cs.txt"), None);
        assert_eq!(source.tag, "cs");
        assert_eq!(source.major, "Computer Science");

        let source = BlockSource::from_path(Path::new("Quantum_optics.txt"), Some("caltech"));
        assert_eq!(source.tag, "caltech-quantum_optics");
        assert_eq!(source.major, "Quantum Optics");
    }

    /// File names with spaces still produce IDs usable in URLs
    #[test]
    fn test_source_from_path_with_spaces() {
        let source =
            BlockSource::from_path(Path::new("/data/aeronautics and astronautics.txt"), None);
        assert_eq!(source.tag, "aeronautics-and-astronautics");
        assert_eq!(source.major, "Aeronautics and Astronautics");

        let source = BlockSource::from_path(Path::new("Bio  (Eng).txt"), Some("MIT Labs"));
        assert_eq!(source.tag, "mit-labs-bio-eng");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Applied Physics "), "applied-physics");
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("c++ & c#"), "c-c");
        assert_eq!(slugify("quantum_optics"), "quantum_optics");
        assert_eq!(slugify("???"), "");
    }
}
