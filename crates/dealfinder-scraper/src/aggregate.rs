//! Fan-out/fan-in over all registered sources.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dealfinder_core::Deal;
use futures::future::join_all;
use futures::FutureExt;

use crate::adapter::{log_source_failure, SourceAdapter};
use crate::error::{FailureKind, ScraperError};

/// Runs one query against every registered source and merges the results.
///
/// Sources run concurrently and share nothing but the query string. The
/// aggregator waits for all of them; a source that fails, times out, or
/// panics contributes no deals and never fails the whole query.
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    adapter_timeout: Option<Duration>,
}

/// Outcome of one source for one query.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: String,
    pub deal_count: usize,
    pub failure: Option<FailureKind>,
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl SourceReport {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Merged deals plus one [`SourceReport`] per source, in registration order.
#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub deals: Vec<Deal>,
    pub sources: Vec<SourceReport>,
}

impl Aggregator {
    /// Creates an aggregator over `adapters`; their order is the merge order.
    #[must_use]
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            adapters,
            adapter_timeout: None,
        }
    }

    /// Bounds each source's whole search. A zero duration removes the bound.
    #[must_use]
    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    #[must_use]
    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Deals from every source, sorted by ascending price.
    ///
    /// Each source is asked through [`SourceAdapter::fetch_deals`], so a
    /// failing source has already been logged and contributes nothing.
    /// Deals with equal prices keep source registration order.
    pub async fn aggregate(&self, query: &str) -> Vec<Deal> {
        let started = Instant::now();
        let per_source = join_all(self.adapters.iter().map(|adapter| async move {
            let name = adapter.name();
            self.isolate(name, adapter.fetch_deals(query))
                .await
                .unwrap_or_else(|e| {
                    log_source_failure(name, &e);
                    Vec::new()
                })
        }))
        .await;

        let mut deals: Vec<Deal> = per_source.into_iter().flatten().collect();
        sort_by_price(&mut deals);

        tracing::info!(
            sources = self.adapters.len(),
            deals = deals.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "aggregated deals"
        );
        deals
    }

    /// Like [`Aggregator::aggregate`], also reporting what each source did.
    ///
    /// Sources are asked through [`SourceAdapter::search`] here so the
    /// failure reason can be kept in the report.
    pub async fn aggregate_with_report(&self, query: &str) -> AggregateReport {
        let started = Instant::now();
        let outcomes = join_all(
            self.adapters
                .iter()
                .map(|adapter| self.run_source(adapter.as_ref(), query)),
        )
        .await;

        let mut deals = Vec::new();
        let mut sources = Vec::with_capacity(outcomes.len());

        for (source, result, elapsed) in outcomes {
            match result {
                Ok(found) => {
                    tracing::debug!(
                        source = %source,
                        deals = found.len(),
                        elapsed_ms = elapsed.as_millis(),
                        "source finished"
                    );
                    sources.push(SourceReport {
                        source,
                        deal_count: found.len(),
                        failure: None,
                        error: None,
                        elapsed,
                    });
                    deals.extend(found);
                }
                Err(e) => {
                    log_source_failure(&source, &e);
                    sources.push(SourceReport {
                        source,
                        deal_count: 0,
                        failure: Some(e.kind()),
                        error: Some(e.to_string()),
                        elapsed,
                    });
                }
            }
        }

        sort_by_price(&mut deals);

        tracing::info!(
            sources = sources.len(),
            failed = sources.iter().filter(|s| !s.succeeded()).count(),
            deals = deals.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "aggregated deals"
        );

        AggregateReport { deals, sources }
    }

    async fn run_source(
        &self,
        adapter: &dyn SourceAdapter,
        query: &str,
    ) -> (String, Result<Vec<Deal>, ScraperError>, Duration) {
        let name = adapter.name().to_owned();
        let started = Instant::now();

        let result = match self.isolate(&name, adapter.search(query)).await {
            Ok(searched) => searched,
            Err(e) => Err(e),
        };

        (name, result, started.elapsed())
    }

    /// Runs one source's work under the adapter timeout, turning an elapsed
    /// timeout or a panic into that source's error.
    async fn isolate<T>(
        &self,
        source_name: &str,
        work: impl Future<Output = T>,
    ) -> Result<T, ScraperError> {
        let caught = AssertUnwindSafe(work).catch_unwind();
        let outcome = match self.adapter_timeout {
            Some(limit) => tokio::time::timeout(limit, caught).await.map_err(|_| {
                ScraperError::Timeout {
                    source_name: source_name.to_owned(),
                    timeout_secs: limit.as_secs(),
                }
            })?,
            None => caught.await,
        };

        outcome.map_err(|payload| ScraperError::Panicked {
            source_name: source_name.to_owned(),
            message: panic_message(payload.as_ref()),
        })
    }
}

/// Stable sort by ascending price.
pub fn sort_by_price(deals: &mut [Deal]) {
    deals.sort_by(|a, b| a.price().total_cmp(&b.price()));
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}
