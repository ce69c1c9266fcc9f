//! Search and source-listing command handlers for the CLI.

use std::fmt::Write as _;

use dealfinder_core::{AppConfig, SourceConfig};
use dealfinder_scraper::SourceReport;

/// Narrows the catalog to the sources named on the command line.
///
/// An empty filter keeps every source. Order follows the catalog, not the
/// filter, so merge order stays the same as the server's.
///
/// # Errors
///
/// Returns an error naming the first filter that matches no source.
pub(crate) fn select_sources(
    catalog: Vec<SourceConfig>,
    filters: &[String],
) -> anyhow::Result<Vec<SourceConfig>> {
    if filters.is_empty() {
        return Ok(catalog);
    }

    if let Some(unknown) = filters
        .iter()
        .find(|f| !catalog.iter().any(|s| s.matches_name(f)))
    {
        let known: Vec<&str> = catalog.iter().map(|s| s.name.as_str()).collect();
        anyhow::bail!(
            "unknown source '{unknown}'; registered sources: {}",
            known.join(", ")
        );
    }

    Ok(catalog
        .into_iter()
        .filter(|s| filters.iter().any(|f| s.matches_name(f)))
        .collect())
}

/// Runs one query and prints the deals as a JSON array on stdout.
///
/// # Errors
///
/// Returns an error for a blank product, an unknown `--source`, or a source
/// configuration that cannot be turned into an adapter.
pub(crate) async fn run_search(
    config: &AppConfig,
    product: &str,
    source_filters: &[String],
    report: bool,
) -> anyhow::Result<()> {
    if product.trim().is_empty() {
        anyhow::bail!("product must not be empty");
    }

    let catalog = dealfinder_scraper::source_catalog(config.sources_path.as_deref())?;
    let sources = select_sources(catalog, source_filters)?;
    let aggregator = dealfinder_scraper::build_aggregator(config, sources)?;

    tracing::info!(product, sources = aggregator.len(), "searching deals");
    let result = aggregator.aggregate_with_report(product).await;

    println!("{}", serde_json::to_string_pretty(&result.deals)?);
    if report {
        eprint!("{}", format_report(&result.sources));
    }
    Ok(())
}

/// Prints one line per registered source.
///
/// # Errors
///
/// Returns an error if the sources file cannot be loaded.
pub(crate) fn run_sources(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = dealfinder_scraper::source_catalog(config.sources_path.as_deref())?;
    for source in &catalog {
        let status = if source.enabled { "enabled" } else { "pending" };
        println!("{}\t{status}\t{}", source.name, source.search_url);
    }
    Ok(())
}

/// Human-readable per-source summary, one line per source.
pub(crate) fn format_report(sources: &[SourceReport]) -> String {
    let mut out = String::new();
    for source in sources {
        let outcome = match (&source.failure, &source.error) {
            (Some(kind), Some(error)) => format!("failed ({kind}): {error}"),
            (Some(kind), None) => format!("failed ({kind})"),
            (None, _) => format!("{} deals", source.deal_count),
        };
        let _ = writeln!(
            out,
            "{:<20} {:>6} ms  {outcome}",
            source.source,
            source.elapsed.as_millis()
        );
    }
    out
}
