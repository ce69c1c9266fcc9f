//! Deal scraping: field extraction, source adapters, and aggregation.
//!
//! Each source adapter fetches one site's search results and turns listing
//! fragments into [`dealfinder_core::Deal`]s. The [`Aggregator`] runs every
//! adapter concurrently for a query and returns one price-sorted list.

pub mod adapter;
pub mod aggregate;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod listing;
pub mod origin;
pub mod sources;

mod retry;

use std::sync::Arc;
use std::time::Duration;

use dealfinder_core::{AppConfig, SourceConfig};

pub use adapter::SourceAdapter;
pub use aggregate::{sort_by_price, AggregateReport, Aggregator, SourceReport};
pub use error::{FailureKind, ScraperError};
pub use extract::extract_price;
pub use fetch::PageFetcher;
pub use sources::{build_adapters, source_catalog, HtmlListingSource, PendingSource};

/// Wires a shared [`PageFetcher`] and one adapter per source into an
/// [`Aggregator`] using the application's scraper settings.
///
/// # Errors
///
/// Returns [`ScraperError`] if the HTTP client cannot be built or a source
/// is misconfigured.
pub fn build_aggregator(
    config: &AppConfig,
    sources: Vec<SourceConfig>,
) -> Result<Aggregator, ScraperError> {
    let fetcher = Arc::new(PageFetcher::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_backoff_base_secs,
    )?);
    let adapters = build_adapters(sources, &fetcher)?;
    Ok(Aggregator::new(adapters)
        .with_adapter_timeout(Duration::from_secs(config.adapter_timeout_secs)))
}
