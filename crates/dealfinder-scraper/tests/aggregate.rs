//! Aggregator behaviour with in-process stub sources.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dealfinder_core::Deal;
use dealfinder_scraper::{
    extract_price, Aggregator, FailureKind, ScraperError, SourceAdapter,
};
use tokio::sync::Barrier;

/// Raw listing as a stub source would have scraped it.
struct Listing {
    title: &'static str,
    url: &'static str,
}

/// Builds deals the way a real adapter does: price from the title, fragments
/// without a price skipped.
struct StubSource {
    name: &'static str,
    listings: Vec<Listing>,
    calls: Arc<AtomicUsize>,
}

impl StubSource {
    fn new(name: &'static str, listings: Vec<Listing>) -> Self {
        Self {
            name,
            listings,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SourceAdapter for StubSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn search(&self, _query: &str) -> Result<Vec<Deal>, ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .listings
            .iter()
            .filter_map(|l| {
                let price = extract_price(l.title)?;
                Deal::new(self.name, price, l.title, l.url, "").ok()
            })
            .collect())
    }
}

struct FailingSource;

#[async_trait]
impl SourceAdapter for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(&self, _query: &str) -> Result<Vec<Deal>, ScraperError> {
        Err(ScraperError::UnexpectedStatus {
            status: 502,
            url: "https://down.example.com/search".to_string(),
        })
    }
}

struct SlowSource;

#[async_trait]
impl SourceAdapter for SlowSource {
    fn name(&self) -> &str {
        "slow"
    }

    async fn search(&self, _query: &str) -> Result<Vec<Deal>, ScraperError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}

struct PanickingSource;

#[async_trait]
impl SourceAdapter for PanickingSource {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn search(&self, query: &str) -> Result<Vec<Deal>, ScraperError> {
        panic!("selector bug while searching {query}");
    }
}

/// Completes only if every source sharing the barrier runs at the same time.
struct RendezvousSource {
    name: &'static str,
    barrier: Arc<Barrier>,
}

#[async_trait]
impl SourceAdapter for RendezvousSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn search(&self, _query: &str) -> Result<Vec<Deal>, ScraperError> {
        self.barrier.wait().await;
        Ok(Vec::new())
    }
}

fn arc<S: SourceAdapter + 'static>(source: S) -> Arc<dyn SourceAdapter> {
    Arc::new(source)
}

fn laptop_sources() -> Vec<Arc<dyn SourceAdapter>> {
    vec![
        arc(StubSource::new(
            "first",
            vec![Listing {
                title: "Great laptop $500.00",
                url: "https://first.example.com/great-laptop",
            }],
        )),
        arc(StubSource::new(
            "second",
            vec![Listing {
                title: "Laptop deal $450.50",
                url: "https://second.example.com/laptop-deal",
            }],
        )),
    ]
}

fn prices(deals: &[Deal]) -> Vec<f64> {
    deals.iter().map(Deal::price).collect()
}

#[tokio::test]
async fn laptop_scenario_merges_and_sorts_by_price() {
    let aggregator = Aggregator::new(laptop_sources());
    let deals = aggregator.aggregate("laptop").await;

    assert_eq!(prices(&deals), vec![450.50, 500.00]);
    assert_eq!(deals[0].title(), "Laptop deal $450.50");
    assert_eq!(deals[0].retailer(), "second");
    assert_eq!(deals[1].title(), "Great laptop $500.00");
}

#[tokio::test]
async fn failing_source_does_not_abort_query() {
    let mut sources = laptop_sources();
    sources.insert(1, arc(FailingSource));
    let aggregator = Aggregator::new(sources);

    let report = aggregator.aggregate_with_report("laptop").await;

    assert_eq!(prices(&report.deals), vec![450.50, 500.00]);
    assert_eq!(report.sources.len(), 3);
    assert!(report.sources[0].succeeded());
    assert_eq!(report.sources[1].source, "failing");
    assert_eq!(
        report.sources[1].failure,
        Some(FailureKind::SourceUnavailable)
    );
    assert!(report.sources[1]
        .error
        .as_deref()
        .is_some_and(|e| e.contains("502")));
    assert_eq!(report.sources[2].deal_count, 1);
}

#[tokio::test]
async fn only_failing_sources_yield_empty_success() {
    let aggregator = Aggregator::new(vec![arc(FailingSource), arc(FailingSource)]);
    assert!(aggregator.aggregate("laptop").await.is_empty());
}

#[tokio::test]
async fn slow_source_is_cut_off_by_adapter_timeout() {
    let mut sources = laptop_sources();
    sources.push(arc(SlowSource));
    let aggregator = Aggregator::new(sources).with_adapter_timeout(Duration::from_millis(200));

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        aggregator.aggregate_with_report("laptop"),
    )
    .await
    .expect("aggregation must not wait for the slow source");

    assert_eq!(report.deals.len(), 2);
    let slow = &report.sources[2];
    assert_eq!(slow.source, "slow");
    assert_eq!(slow.failure, Some(FailureKind::SourceUnavailable));
}

#[tokio::test]
async fn panicking_source_is_isolated() {
    let mut sources = laptop_sources();
    sources.push(arc(PanickingSource));
    let aggregator = Aggregator::new(sources);

    let report = aggregator.aggregate_with_report("laptop").await;

    assert_eq!(report.deals.len(), 2);
    assert_eq!(report.sources[2].failure, Some(FailureKind::Internal));
    assert!(report.sources[2]
        .error
        .as_deref()
        .is_some_and(|e| e.contains("selector bug while searching laptop")));
}

#[tokio::test]
async fn plain_aggregate_isolates_slow_and_panicking_sources() {
    let mut sources = laptop_sources();
    sources.push(arc(SlowSource));
    sources.push(arc(PanickingSource));
    let aggregator = Aggregator::new(sources).with_adapter_timeout(Duration::from_millis(200));

    let deals = tokio::time::timeout(Duration::from_secs(5), aggregator.aggregate("laptop"))
        .await
        .expect("aggregation must not wait for the slow source");

    assert_eq!(prices(&deals), vec![450.50, 500.00]);
}

#[tokio::test]
async fn sources_run_concurrently() {
    let barrier = Arc::new(Barrier::new(3));
    let sources: Vec<Arc<dyn SourceAdapter>> = ["a", "b", "c"]
        .into_iter()
        .map(|name| {
            arc(RendezvousSource {
                name,
                barrier: Arc::clone(&barrier),
            })
        })
        .collect();
    let aggregator = Aggregator::new(sources);

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        aggregator.aggregate_with_report("anything"),
    )
    .await
    .expect("sources awaiting each other must all be in flight together");

    assert!(report.sources.iter().all(|s| s.succeeded()));
}

#[tokio::test]
async fn every_source_is_called_exactly_once_per_query() {
    let first = Arc::new(StubSource::new("first", Vec::new()));
    let second = Arc::new(StubSource::new("second", Vec::new()));
    let first_calls = Arc::clone(&first.calls);
    let second_calls = Arc::clone(&second.calls);

    let aggregator = Aggregator::new(vec![
        first as Arc<dyn SourceAdapter>,
        second as Arc<dyn SourceAdapter>,
    ]);
    aggregator.aggregate("tv").await;

    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn prices_are_non_decreasing() {
    let aggregator = Aggregator::new(vec![
        arc(StubSource::new(
            "mixed",
            vec![
                Listing {
                    title: "Monitor $199.99",
                    url: "https://a.example.com/1",
                },
                Listing {
                    title: "Monitor arm $39.00",
                    url: "https://a.example.com/2",
                },
                Listing {
                    title: "Monitor 4K $1,299.00",
                    url: "https://a.example.com/3",
                },
            ],
        )),
        arc(StubSource::new(
            "other",
            vec![Listing {
                title: "Monitor cable $9.99",
                url: "https://b.example.com/1",
            }],
        )),
    ]);

    let deals = aggregator.aggregate("monitor").await;
    assert_eq!(deals.len(), 4);
    assert!(deals.windows(2).all(|w| w[0].price() <= w[1].price()));
}

#[tokio::test]
async fn repeated_queries_give_identical_order_for_equal_prices() {
    let aggregator = Aggregator::new(vec![
        arc(StubSource::new(
            "first",
            vec![Listing {
                title: "Headphones $99.99",
                url: "https://first.example.com/h",
            }],
        )),
        arc(StubSource::new(
            "second",
            vec![Listing {
                title: "Headphones too $99.99",
                url: "https://second.example.com/h",
            }],
        )),
    ]);

    let once = aggregator.aggregate("headphones").await;
    let twice = aggregator.aggregate("headphones").await;

    assert_eq!(once, twice);
    assert_eq!(once[0].retailer(), "first", "ties keep registration order");
}

#[tokio::test]
async fn listing_without_price_is_excluded() {
    let aggregator = Aggregator::new(vec![arc(StubSource::new(
        "widgets",
        vec![
            Listing {
                title: "Widget Pro - $49.99 today",
                url: "https://w.example.com/pro",
            },
            Listing {
                title: "Widget Lite - call for price",
                url: "https://w.example.com/lite",
            },
        ],
    ))]);

    let deals = aggregator.aggregate("widget").await;
    assert_eq!(deals.len(), 1);
    assert!((deals[0].price() - 49.99).abs() < 1e-9);
}
