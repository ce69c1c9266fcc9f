mod search;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dealfinder-cli")]
#[command(about = "Search deal sources from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every registered source and print the deals, cheapest first
    Search {
        /// Free-text product to search for
        product: String,

        /// Only query the named source (repeatable, case-insensitive)
        #[arg(long = "source", value_name = "NAME")]
        sources: Vec<String>,

        /// Print a per-source summary to stderr
        #[arg(long)]
        report: bool,
    },
    /// List the registered sources
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = dealfinder_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Search {
            product,
            sources,
            report,
        }) => search::run_search(&config, &product, &sources, report).await?,
        Some(Commands::Sources) => search::run_sources(&config)?,
        None => Cli::command().print_help()?,
    }

    Ok(())
}
