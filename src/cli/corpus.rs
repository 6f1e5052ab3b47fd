use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::cli::{truncate, OutputFormat, SourceArgs};
use crate::corpus::loader::LoadReport;
use crate::corpus::store::LabCorpus;

#[derive(Args)]
pub struct CorpusArgs {
    #[command(subcommand)]
    pub command: CorpusCommands,
}

#[derive(Subcommand)]
pub enum CorpusCommands {
    /// List labs in the corpus
    List {
        /// Filter by major (substring, case-insensitive)
        #[arg(long)]
        major: Option<String>,

        /// Filter by university (substring, case-insensitive)
        #[arg(long)]
        university: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show details of a specific lab
    Show {
        /// Lab ID
        #[arg(required = true)]
        id: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Export the loaded corpus to a JSON file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Summarize the corpus and how it was loaded
    Stats {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Execute corpus subcommand
///
/// # Errors
///
/// Returns an error if configuration is invalid, a lab is not found, or
/// writing output fails.
pub fn run(args: CorpusArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CorpusCommands::List {
            major,
            university,
            source,
        } => run_list(
            &source,
            major.as_deref(),
            university.as_deref(),
            format,
            verbose,
        ),
        CorpusCommands::Show { id, source } => run_show(&id, &source, format),
        CorpusCommands::Export { output, source } => run_export(&output, &source),
        CorpusCommands::Stats { source } => run_stats(&source, format),
    }
}

fn load(source: &SourceArgs) -> anyhow::Result<(LabCorpus, LoadReport)> {
    let config = source.resolve()?;
    Ok(config.corpus.loader().load())
}

fn run_list(
    source: &SourceArgs,
    major_filter: Option<&str>,
    university_filter: Option<&str>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let (corpus, report) = load(source)?;

    if verbose {
        eprintln!("Loaded {} labs from {}", corpus.len(), report.origin);
    }

    let filtered: Vec<_> = corpus.filter(major_filter, university_filter).collect();

    match format {
        OutputFormat::Text => {
            println!(
                "{:<24} {:<36} {:<30} {:<30}",
                "ID", "Name", "Major", "University"
            );
            println!("{}", "-".repeat(123));
            for lab in &filtered {
                println!(
                    "{:<24} {:<36} {:<30} {:<30}",
                    truncate(lab.id.as_str(), 24),
                    truncate(&lab.name, 36),
                    truncate(&lab.major, 30),
                    truncate(&lab.university, 30)
                );
            }
            println!("\nTotal: {} labs", filtered.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&filtered)?);
        }
        OutputFormat::Tsv => {
            println!("id\tname\tmajor\tuniversity\tkeywords");
            for lab in &filtered {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    lab.id, lab.name, lab.major, lab.university, lab.keywords
                );
            }
        }
    }

    Ok(())
}

fn run_show(id: &str, source: &SourceArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (corpus, _) = load(source)?;
    let lab = corpus
        .get_str(id)
        .ok_or_else(|| anyhow::anyhow!("Lab '{id}' not found"))?;

    match format {
        OutputFormat::Text => {
            println!("Lab: {}\n", lab.name);
            println!("ID:         {}", lab.id);
            println!("Major:      {}", lab.major);
            println!("University: {}", lab.university);

            let keywords = lab.keyword_list();
            if !keywords.is_empty() {
                println!("\nKeywords:");
                for keyword in &keywords {
                    println!("  - {keyword}");
                }
            }

            if !lab.introduction.is_empty() {
                println!("\nIntroduction:\n{}", lab.introduction);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(lab)?);
        }
        OutputFormat::Tsv => {
            println!("field\tvalue");
            println!("id\t{}", lab.id);
            println!("name\t{}", lab.name);
            println!("major\t{}", lab.major);
            println!("university\t{}", lab.university);
            println!("keywords\t{}", lab.keywords);
            println!("introduction\t{}", lab.introduction);
        }
    }

    Ok(())
}

fn run_export(output: &Path, source: &SourceArgs) -> anyhow::Result<()> {
    let (corpus, _) = load(source)?;

    let json = corpus.to_json()?;
    std::fs::write(output, json)?;

    println!("Exported {} labs to {}", corpus.len(), output.display());

    Ok(())
}

fn run_stats(source: &SourceArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (corpus, report) = load(source)?;

    let mut by_major: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_university: BTreeMap<&str, usize> = BTreeMap::new();
    for lab in corpus.labs() {
        *by_major.entry(display_or_unknown(&lab.major)).or_insert(0) += 1;
        *by_university
            .entry(display_or_unknown(&lab.university))
            .or_insert(0) += 1;
    }

    match format {
        OutputFormat::Text => {
            println!("Origin:       {}", report.origin);
            println!("Labs:         {}", report.labs_loaded);
            println!("Records seen: {}", report.records_seen);
            println!("Skipped:      {}", report.skipped);
            println!("Duplicates:   {}", report.duplicates);
            for path in &report.unavailable {
                println!("Unavailable:  {}", path.display());
            }

            println!("\nBy major:");
            for (major, count) in &by_major {
                println!("  {count:>5}  {major}");
            }
            println!("\nBy university:");
            for (university, count) in &by_university {
                println!("  {count:>5}  {university}");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "report": report,
                "majors": by_major,
                "universities": by_university,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("group\tvalue\tcount");
            for (major, count) in &by_major {
                println!("major\t{major}\t{count}");
            }
            for (university, count) in &by_university {
                println!("university\t{university}\t{count}");
            }
        }
    }

    Ok(())
}

fn display_or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "(unknown)"
    } else {
        value
    }
}
