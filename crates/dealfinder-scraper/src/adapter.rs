//! The source adapter seam.

use async_trait::async_trait;
use dealfinder_core::Deal;

use crate::error::ScraperError;

/// One external source of deals.
///
/// Implementors only provide [`SourceAdapter::search`], which reports why a
/// source failed. [`SourceAdapter::fetch_deals`] is what
/// [`crate::Aggregator::aggregate`] calls for every query: it never fails,
/// logging the reason and yielding no deals instead.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable, human-readable source name used in logs and reports.
    fn name(&self) -> &str;

    /// Runs one search against the source.
    ///
    /// # Errors
    ///
    /// Any fetch or parse failure for the whole source. Incomplete individual
    /// listings are skipped, not reported.
    async fn search(&self, query: &str) -> Result<Vec<Deal>, ScraperError>;

    /// Runs one search, absorbing any failure into an empty result.
    async fn fetch_deals(&self, query: &str) -> Vec<Deal> {
        match self.search(query).await {
            Ok(deals) => deals,
            Err(e) => {
                log_source_failure(self.name(), &e);
                Vec::new()
            }
        }
    }
}

/// The single warning emitted whenever a source's failure is absorbed.
pub(crate) fn log_source_failure(source: &str, err: &ScraperError) {
    tracing::warn!(
        source,
        kind = %err.kind(),
        error = %err,
        "source failed; contributing no deals"
    );
}
