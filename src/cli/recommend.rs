use clap::Args;

use crate::cli::{truncate, OutputFormat, SourceArgs};
use crate::core::query::Query;
use crate::core::types::GroupBy;
use crate::matching::engine::{MatchResult, Ranking, Recommendation, ScoringWeights};
use crate::matching::ranker::{Ranker, RankerState};
use crate::utils::validation::clamp_top_n;

#[derive(Args)]
pub struct RecommendArgs {
    /// Research keyword; repeat or use commas for several
    #[arg(short = 'k', long = "keyword", required = true, num_args = 1..)]
    pub keywords: Vec<String>,

    /// Your major or field; boosts labs in a similar department
    #[arg(long)]
    pub major: Option<String>,

    /// Preferred university; boosts labs whose university contains this text
    #[arg(long)]
    pub university: Option<String>,

    /// Number of labs to show [default: 10, max: 50]
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// Group used for the diversity cap
    #[arg(long, value_enum)]
    pub group_by: Option<GroupBy>,

    /// Maximum labs per group before filling by score (0 disables)
    #[arg(long)]
    pub group_cap: Option<usize>,

    #[command(flatten)]
    pub source: SourceArgs,

    // === Scoring weight options ===
    /// Weight for vector similarity (0-100, default 60)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub weight_vector: Option<u32>,

    /// Weight for lexical keyword matches (0-100, default 25)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub weight_lexical: Option<u32>,

    /// Weight for the major bonus (0-100, default 10)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub weight_major: Option<u32>,

    /// Weight for the university bonus (0-100, default 5)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub weight_university: Option<u32>,
}

impl RecommendArgs {
    fn apply_weights(&self, weights: &mut ScoringWeights) {
        let percent = |w: u32| f64::from(w) / 100.0;
        if let Some(w) = self.weight_vector {
            weights.vector = percent(w);
        }
        if let Some(w) = self.weight_lexical {
            weights.lexical = percent(w);
        }
        if let Some(w) = self.weight_major {
            weights.major = percent(w);
        }
        if let Some(w) = self.weight_university {
            weights.university = percent(w);
        }
    }

    fn query(&self) -> Query {
        let mut query = Query::new(&self.keywords);
        if let Some(major) = &self.major {
            query = query.with_major(major.as_str());
        }
        if let Some(university) = &self.university {
            query = query.with_university(university.as_str());
        }
        query
    }
}

/// Execute recommend subcommand
///
/// # Errors
///
/// Returns an error if the configuration is invalid or output fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RecommendArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = args.source.resolve()?;
    args.apply_weights(&mut config.matching.weights);
    if let Some(group_by) = args.group_by {
        config.matching.group_by = group_by;
    }
    if let Some(cap) = args.group_cap {
        config.matching.group_cap = cap;
    }

    let (corpus, report) = config.corpus.loader().load();
    if verbose {
        eprintln!(
            "Loaded {} labs ({}; {} skipped, {} duplicates)",
            report.labs_loaded,
            report.origin,
            report.skipped,
            report.duplicates
        );
        let norm = config.matching.weights.normalized();
        eprintln!(
            "Scoring weights: {:.0}% vector, {:.0}% lexical, {:.0}% major, {:.0}% university",
            norm.vector * 100.0,
            norm.lexical * 100.0,
            norm.major * 100.0,
            norm.university * 100.0,
        );
    }

    let ranker = Ranker::new(config.matching.clone());
    if ranker.load(corpus) == RankerState::Uninitialized {
        eprintln!("Warning: No labs could be indexed, nothing to rank against.");
        return Ok(());
    }

    let query = args.query();
    if query.is_empty() {
        eprintln!("No usable keywords given.");
        return Ok(());
    }

    let top_n = clamp_top_n(args.top_n.unwrap_or(config.matching.default_top_n));
    let ranking = ranker.recommend(&query, top_n);

    if ranking.degraded {
        eprintln!("Warning: Vector scoring unavailable, results use keyword matches only.");
    }
    if ranking.results.is_empty() {
        eprintln!("No matching labs found.");
        return Ok(());
    }

    match format {
        OutputFormat::Text => print_text_results(&ranking, &query, &config.matching.weights),
        OutputFormat::Json => print_json_results(&ranking)?,
        OutputFormat::Tsv => print_tsv_results(&ranking.results),
    }

    Ok(())
}

fn print_text_results(ranking: &Ranking, query: &Query, weights: &ScoringWeights) {
    let norm = weights.normalized();
    for (i, result) in ranking.results.iter().enumerate() {
        if i > 0 {
            println!("\n{}", "─".repeat(60));
        }

        println!(
            "\n#{} {} ({})",
            i + 1,
            result.lab.name,
            result.confidence()
        );
        println!("   ID: {}", result.lab.id);
        if !result.lab.major.is_empty() {
            println!("   Major: {}", result.lab.major);
        }
        if !result.lab.university.is_empty() {
            println!("   University: {}", result.lab.university);
        }

        println!("\n   Score: {:.1}%", result.similarity_score() * 100.0);
        print_components(result, &norm);

        println!(
            "\n   Matched: {} of {} keywords",
            result.match_count(),
            query.keywords.len()
        );
        if !result.matched_terms.is_empty() {
            let terms: Vec<&str> = result.matched_terms.iter().map(String::as_str).collect();
            println!("   - {}", terms.join(", "));
        }

        if !result.lab.keywords.is_empty() {
            println!("\n   Keywords: {}", truncate(&result.lab.keywords, 200));
        }
        if !result.lab.introduction.is_empty() {
            println!("   {}", truncate(&result.lab.introduction, 300));
        }
    }
    println!();
    println!(
        "{} of {} qualifying labs shown",
        ranking.results.len(),
        ranking.candidates
    );
}

fn print_components(result: &MatchResult, norm: &ScoringWeights) {
    let score = &result.score;
    match score.vector {
        Some(v) => println!(
            "   - vector:     {:>5.1}% (weight {:.0}%)",
            v * 100.0,
            norm.vector * 100.0
        ),
        None => println!("   - vector:     unavailable"),
    }
    println!(
        "   - lexical:    {:>5.1}% (weight {:.0}%)",
        score.lexical * 100.0,
        norm.lexical * 100.0
    );
    if let Some(m) = score.major {
        println!(
            "   - major:      {:>5.1}% (weight {:.0}%)",
            m * 100.0,
            norm.major * 100.0
        );
    }
    if let Some(u) = score.university {
        println!(
            "   - university: {:>5.1}% (weight {:.0}%)",
            u * 100.0,
            norm.university * 100.0
        );
    }
}

fn print_json_results(ranking: &Ranking) -> anyhow::Result<()> {
    let recommendations: Vec<Recommendation> =
        ranking.results.iter().map(Recommendation::from).collect();
    let output = serde_json::json!({
        "degraded": ranking.degraded,
        "candidates": ranking.candidates,
        "recommendations": recommendations,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(results: &[MatchResult]) {
    println!(
        "rank\tid\tname\tmajor\tuniversity\tscore\tvector\tlexical\tmajor_bonus\tuniversity_bonus\tconfidence\tmatch_count\tmatched_terms"
    );
    let fmt_opt = |v: Option<f64>| v.map_or_else(String::new, |v| format!("{v:.4}"));
    for (i, m) in results.iter().enumerate() {
        let terms: Vec<&str> = m.matched_terms.iter().map(String::as_str).collect();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{:.4}\t{}\t{:.4}\t{}\t{}\t{}\t{}\t{}",
            i + 1,
            m.lab.id,
            m.lab.name,
            m.lab.major,
            m.lab.university,
            m.similarity_score(),
            fmt_opt(m.score.vector),
            m.score.lexical,
            fmt_opt(m.score.major),
            fmt_opt(m.score.university),
            m.confidence(),
            m.match_count(),
            terms.join(","),
        );
    }
}
