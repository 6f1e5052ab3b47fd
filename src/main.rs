use clap::Parser;
use tracing_subscriber::EnvFilter;

use lab_matcher::{cli, web};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("lab_matcher=debug,info")
    } else {
        EnvFilter::new("lab_matcher=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Recommend(args) => {
            cli::recommend::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Corpus(args) => {
            cli::corpus::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args)?;
        }
    }

    Ok(())
}
