use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::corpus::store::{parse_json_records, CorpusError, LabCorpus};
use crate::parsing::blocks::{parse_blocks_file, BlockSource};
use crate::parsing::literal::{parse_literal, DEFAULT_START_MARKER};
use crate::parsing::ParsedLabs;
use crate::utils::validation::MAX_SOURCE_SIZE;

/// Kind of artifact a corpus source points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Corpus JSON (`.json`)
    Json,
    /// Front-end page with an embedded `Lab[]` literal (`.tsx`, `.ts`, `.js`, ...)
    Literal,
    /// A single `Professor:` block file (`.txt`)
    Blocks,
    /// A directory of block files
    TextDir,
}

impl SourceKind {
    /// Detect the kind from the path (directory or file extension)
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        if path.is_dir() {
            return Self::TextDir;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("json") => Self::Json,
            Some("txt") => Self::Blocks,
            _ => Self::Literal,
        }
    }
}

/// Where the loaded corpus ultimately came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOrigin {
    Source(SourceKind),
    TextDirFallback,
    BuiltinSample,
    Empty,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Literal => write!(f, "embedded literal"),
            Self::Blocks => write!(f, "block file"),
            Self::TextDir => write!(f, "text directory"),
        }
    }
}

impl std::fmt::Display for LoadOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(kind) => write!(f, "{kind} source"),
            Self::TextDirFallback => write!(f, "text directory fallback"),
            Self::BuiltinSample => write!(f, "built-in sample"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

/// Summary of a load: what was used and what was dropped
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub origin: LoadOrigin,
    /// Records encountered in the source that was used
    pub records_seen: usize,
    /// Malformed records that were skipped
    pub skipped: usize,
    /// Records rejected because their ID was already present
    pub duplicates: usize,
    /// Labs in the resulting corpus
    pub labs_loaded: usize,
    /// Sources that could not be read at all
    pub unavailable: Vec<PathBuf>,
}

impl LoadReport {
    fn new(origin: LoadOrigin) -> Self {
        Self {
            origin,
            records_seen: 0,
            skipped: 0,
            duplicates: 0,
            labs_loaded: 0,
            unavailable: Vec::new(),
        }
    }
}

/// Loads a deduplicated corpus, falling back through the configured sources.
///
/// Order: primary source, then the text directory, then the embedded sample.
/// The sample is only used when no source was configured or when a configured
/// source was readable but produced no labs; sources that are all missing
/// yield an empty corpus.
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    source: Option<PathBuf>,
    text_dir: Option<PathBuf>,
    literal_marker: String,
    university: Option<String>,
    id_prefix: Option<String>,
    sample_fallback: bool,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self {
            source: None,
            text_dir: None,
            literal_marker: DEFAULT_START_MARKER.to_string(),
            university: None,
            id_prefix: None,
            sample_fallback: true,
        }
    }
}

impl CorpusLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_text_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.text_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_literal_marker(mut self, marker: impl Into<String>) -> Self {
        self.literal_marker = marker.into();
        self
    }

    /// University assigned to labs parsed from block files
    #[must_use]
    pub fn with_university(mut self, university: impl Into<String>) -> Self {
        self.university = Some(university.into());
        self
    }

    /// Prefix for synthetic IDs of block-file labs (e.g. `caltech`)
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_sample_fallback(mut self, enabled: bool) -> Self {
        self.sample_fallback = enabled;
        self
    }

    /// Load the corpus. Never fails: problems are logged and reflected in the report.
    #[must_use]
    pub fn load(&self) -> (LabCorpus, LoadReport) {
        let mut unavailable = Vec::new();
        let mut any_readable = false;

        if let Some(path) = &self.source {
            let kind = SourceKind::detect(path);
            match self.parse_source(path, kind) {
                Ok(parsed) => {
                    any_readable = true;
                    if parsed.labs.is_empty() {
                        tracing::warn!("No labs found in {}, trying fallbacks", path.display());
                    } else {
                        return finish(parsed, LoadOrigin::Source(kind), unavailable);
                    }
                }
                Err(CorpusError::SourceUnavailable { path, source }) => {
                    tracing::warn!("Corpus source unavailable: {}: {source}", path.display());
                    unavailable.push(path);
                }
                Err(e) => {
                    any_readable = true;
                    tracing::warn!("Failed to parse {}: {e}, trying fallbacks", path.display());
                }
            }
        }

        if let Some(dir) = &self.text_dir {
            match self.parse_text_dir(dir) {
                Ok(parsed) => {
                    any_readable = true;
                    if parsed.labs.is_empty() {
                        tracing::warn!("No labs found in text directory {}", dir.display());
                    } else {
                        return finish(parsed, LoadOrigin::TextDirFallback, unavailable);
                    }
                }
                Err(e) => {
                    tracing::warn!("Text directory {} unusable: {e}", dir.display());
                    unavailable.push(dir.clone());
                }
            }
        }

        let configured = self.source.is_some() || self.text_dir.is_some();
        if self.sample_fallback && (!configured || any_readable) {
            match LabCorpus::load_embedded() {
                Ok(corpus) => {
                    tracing::info!("Using built-in sample corpus ({} labs)", corpus.len());
                    let mut report = LoadReport::new(LoadOrigin::BuiltinSample);
                    report.records_seen = corpus.len();
                    report.labs_loaded = corpus.len();
                    report.unavailable = unavailable;
                    return (corpus, report);
                }
                Err(e) => tracing::error!("Built-in sample corpus is invalid: {e}"),
            }
        }

        tracing::warn!("No corpus loaded; ranker will stay uninitialized");
        let mut report = LoadReport::new(LoadOrigin::Empty);
        report.unavailable = unavailable;
        (LabCorpus::new(), report)
    }

    fn parse_source(&self, path: &Path, kind: SourceKind) -> Result<ParsedLabs, CorpusError> {
        match kind {
            SourceKind::TextDir => self.parse_text_dir(path),
            SourceKind::Blocks => {
                check_readable(path)?;
                let source = self.block_source(path);
                Ok(parse_blocks_file(path, &source)?)
            }
            SourceKind::Literal => {
                let content = read_source(path)?;
                Ok(parse_literal(&content, &self.literal_marker, &source_tag(path))?)
            }
            SourceKind::Json => {
                let content = read_source(path)?;
                parse_json_records(&content)
            }
        }
    }

    /// Parse every `.txt` file in `dir`, in file-name order
    fn parse_text_dir(&self, dir: &Path) -> Result<ParsedLabs, CorpusError> {
        let entries = std::fs::read_dir(dir).map_err(|source| CorpusError::SourceUnavailable {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
            })
            .collect();
        files.sort();

        let mut combined = ParsedLabs::default();
        for file in files {
            let source = self.block_source(&file);
            match check_readable(&file)
                .and_then(|()| parse_blocks_file(&file, &source).map_err(CorpusError::from))
            {
                Ok(parsed) => {
                    tracing::info!(
                        "{}: {} labs parsed, major: {}",
                        file.display(),
                        parsed.labs.len(),
                        source.major
                    );
                    combined.labs.extend(parsed.labs);
                    combined.skipped.extend(parsed.skipped);
                }
                Err(e) => tracing::warn!("Skipping {}: {e}", file.display()),
            }
        }
        Ok(combined)
    }

    fn block_source(&self, path: &Path) -> BlockSource {
        let source = BlockSource::from_path(path, self.id_prefix.as_deref());
        match &self.university {
            Some(university) => source.with_university(university.clone()),
            None => source,
        }
    }
}

fn finish(
    parsed: ParsedLabs,
    origin: LoadOrigin,
    unavailable: Vec<PathBuf>,
) -> (LabCorpus, LoadReport) {
    let mut report = LoadReport::new(origin);
    report.records_seen = parsed.records_seen();
    report.skipped = parsed.skipped.len();
    report.unavailable = unavailable;

    let (corpus, duplicates) = LabCorpus::from_labs(parsed.labs);
    report.duplicates = duplicates;
    report.labs_loaded = corpus.len();

    if duplicates > 0 {
        tracing::warn!("Dropped {duplicates} labs with duplicate IDs");
    }
    tracing::info!(
        "Loaded {} labs ({} skipped, {} duplicates) from {}",
        report.labs_loaded,
        report.skipped,
        report.duplicates,
        report.origin
    );
    (corpus, report)
}

fn check_readable(path: &Path) -> Result<(), CorpusError> {
    let metadata = std::fs::metadata(path).map_err(|source| CorpusError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CorpusError::SourceTooLarge(path.to_path_buf()));
    }
    Ok(())
}

fn read_source(path: &Path) -> Result<String, CorpusError> {
    check_readable(path)?;
    std::fs::read_to_string(path).map_err(|source| CorpusError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

fn source_tag(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "lab".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_kind() {
        assert_eq!(SourceKind::detect(Path::new("labs.json")), SourceKind::Json);
        assert_eq!(SourceKind::detect(Path::new("cs.txt")), SourceKind::Blocks);
        assert_eq!(SourceKind::detect(Path::new("page.tsx")), SourceKind::Literal);
    }

    #[test]
    fn test_no_source_uses_sample() {
        let (corpus, report) = CorpusLoader::new().load();
        assert!(!corpus.is_empty());
        assert_eq!(report.origin, LoadOrigin::BuiltinSample);
    }

    #[test]
    fn test_missing_source_yields_empty_corpus() {
        let (corpus, report) = CorpusLoader::new()
            .with_source("/nonexistent/path/page.tsx")
            .load();
        assert!(corpus.is_empty());
        assert_eq!(report.origin, LoadOrigin::Empty);
        assert_eq!(report.unavailable.len(), 1);
    }

    #[test]
    fn test_sample_fallback_can_be_disabled() {
        let (corpus, report) = CorpusLoader::new().with_sample_fallback(false).load();
        assert!(corpus.is_empty());
        assert_eq!(report.origin, LoadOrigin::Empty);
    }

    #[test]
    fn test_source_tag() {
        assert_eq!(source_tag(Path::new("/x/Page.tsx")), "page");
    }
}
