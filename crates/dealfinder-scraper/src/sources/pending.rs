use async_trait::async_trait;
use dealfinder_core::Deal;

use crate::adapter::SourceAdapter;
use crate::error::ScraperError;

/// A registered source that has not been built yet.
///
/// Always returns no deals without touching the network, so a source can be
/// listed in configuration (`enabled: false`) before its selectors are ready.
pub struct PendingSource {
    name: String,
}

impl PendingSource {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl SourceAdapter for PendingSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, _query: &str) -> Result<Vec<Deal>, ScraperError> {
        tracing::debug!(source = %self.name, "source not enabled yet; skipping");
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pending_source_returns_nothing() {
        let source = PendingSource::new("Best Buy");
        assert_eq!(source.name(), "Best Buy");
        assert!(source.search("laptop").await.unwrap().is_empty());
    }
}
