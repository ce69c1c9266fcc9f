use std::sync::Arc;

use async_trait::async_trait;
use dealfinder_core::{Deal, SourceConfig, QUERY_PLACEHOLDER};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::adapter::SourceAdapter;
use crate::error::ScraperError;
use crate::fetch::PageFetcher;
use crate::listing::{parse_listings, ListingContext, ListingSelectors};

/// Characters left unescaped in a query component, matching the conventional
/// `encodeURIComponent` set.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Selector-driven adapter for a source whose search results are plain HTML.
pub struct HtmlListingSource {
    config: SourceConfig,
    selectors: ListingSelectors,
    fetcher: Arc<PageFetcher>,
}

impl HtmlListingSource {
    /// Compiles the source's selectors and checks its search URL template.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidSelector`] if a selector does not parse.
    /// - [`ScraperError::InvalidUrl`] if the template does not yield a valid URL.
    pub fn new(config: SourceConfig, fetcher: Arc<PageFetcher>) -> Result<Self, ScraperError> {
        let selectors = ListingSelectors::compile(&config.selectors)?;

        let probe = render_search_url(&config.search_url, "probe");
        if let Err(e) = reqwest::Url::parse(&probe) {
            return Err(ScraperError::InvalidUrl {
                url: config.search_url.clone(),
                reason: e.to_string(),
            });
        }

        Ok(Self {
            config,
            selectors,
            fetcher,
        })
    }

    /// The fetchable search URL for a raw, un-normalized query.
    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        render_search_url(&self.config.search_url, query)
    }
}

fn render_search_url(template: &str, query: &str) -> String {
    let encoded = utf8_percent_encode(query, QUERY_ENCODE_SET).to_string();
    template.replace(QUERY_PLACEHOLDER, &encoded)
}

#[async_trait]
impl SourceAdapter for HtmlListingSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn search(&self, query: &str) -> Result<Vec<Deal>, ScraperError> {
        let url = self.search_url(query);
        tracing::debug!(source = %self.config.name, %url, "fetching search results");
        let body = self.fetcher.fetch_html(&url).await?;

        let ctx = ListingContext {
            source_name: &self.config.name,
            default_retailer: &self.config.retailer,
            base_url: &self.config.base_url,
        };
        parse_listings(&body, &self.selectors, &ctx)
    }
}
