//! Command-line interface for lab-matcher.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **recommend**: Rank labs for a set of research keywords
//! - **corpus**: List, show, export, or summarize the loaded corpus
//! - **serve**: Start the HTTP API
//!
//! ## Usage
//!
//! ```text
//! # Rank the built-in sample corpus
//! lab-matcher recommend -k robotics -k "machine learning"
//!
//! # Use a scraped front-end data file and declare a major
//! lab-matcher recommend -k "fluid dynamics" --major "Mechanical Engineering" --corpus labs.ts
//!
//! # Per-department block files, JSON output
//! lab-matcher recommend -k optics --text-dir caltech/ --id-prefix caltech --format json
//!
//! # Export the loaded corpus
//! lab-matcher corpus export labs.json --text-dir stanford/
//!
//! # Start the API server
//! lab-matcher serve --port 8000 --open
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

pub mod corpus;
pub mod recommend;

#[derive(Parser)]
#[command(name = "lab-matcher")]
#[command(author = "LabFinder Contributors")]
#[command(version)]
#[command(about = "Rank university research labs by similarity to your research keywords")]
#[command(
    long_about = "lab-matcher helps you find research labs that match your interests.\n\nIt loads lab descriptions (a JSON corpus, a front-end data file, or per-department text summaries) and ranks them against your keywords using:\n- TF-IDF vector similarity over keywords and introductions\n- Exact, fuzzy, and partial keyword matches\n- Optional major and university preferences\n- A per-university cap so results are not dominated by one school"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend labs for research keywords
    Recommend(recommend::RecommendArgs),

    /// Inspect the lab corpus
    Corpus(corpus::CorpusArgs),

    /// Start the web server
    Serve(ServeArgs),
}

/// Where to load labs and configuration from
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Corpus file: JSON export, front-end data file, or block text
    #[arg(long = "corpus", value_name = "PATH")]
    pub corpus: Option<PathBuf>,

    /// Directory of per-department block files (*.txt)
    #[arg(long, value_name = "DIR")]
    pub text_dir: Option<PathBuf>,

    /// University label for labs read from block files
    #[arg(long, value_name = "NAME")]
    pub source_university: Option<String>,

    /// Prefix for generated ids of labs read from block files
    #[arg(long, value_name = "PREFIX")]
    pub id_prefix: Option<String>,

    /// Never fall back to the built-in sample corpus
    #[arg(long)]
    pub no_sample: bool,

    /// Configuration file (defaults to ./lab-matcher.toml if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl SourceArgs {
    /// Load configuration and apply command-line overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is missing or invalid.
    pub fn resolve(&self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        let corpus = &mut config.corpus;
        if let Some(path) = &self.corpus {
            corpus.source = Some(path.clone());
        }
        if let Some(dir) = &self.text_dir {
            corpus.text_dir = Some(dir.clone());
        }
        if let Some(university) = &self.source_university {
            corpus.university = Some(university.clone());
        }
        if let Some(prefix) = &self.id_prefix {
            corpus.id_prefix = Some(prefix.clone());
        }
        if self.no_sample {
            corpus.sample_fallback = false;
        }
        Ok(config)
    }
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on [default: 8000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to [default: 127.0.0.1]
    #[arg(short, long)]
    pub address: Option<String>,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Shorten `s` to at most `max_chars` characters, marking the cut with "..."
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer sentence", 10), "a longe...");
        assert_eq!(truncate("ünïcödé text", 6), "ünï...");
    }

    #[test]
    fn test_cli_parses_recommend() {
        let cli = Cli::try_parse_from([
            "lab-matcher",
            "recommend",
            "-k",
            "robotics",
            "-k",
            "optics",
            "--major",
            "Physics",
            "--no-sample",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        match cli.command {
            Commands::Recommend(args) => {
                assert_eq!(args.keywords, vec!["robotics", "optics"]);
                assert_eq!(args.major.as_deref(), Some("Physics"));
                assert!(args.source.no_sample);
            }
            _ => panic!("expected recommend"),
        }
    }

    #[test]
    fn test_source_args_override_config() {
        let args = SourceArgs {
            corpus: Some(PathBuf::from("labs.ts")),
            no_sample: true,
            ..SourceArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.corpus.source, Some(PathBuf::from("labs.ts")));
        assert!(!config.corpus.sample_fallback);
    }
}
