//! HTTP fetch primitive shared by all source adapters.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::origin::{extract_domain, extract_origin};
use crate::retry::retry_with_backoff;

/// Fetches HTML result pages with a bounded timeout.
///
/// Non-2xx responses are typed errors (429 becomes [`ScraperError::RateLimited`]);
/// network failures surface as [`ScraperError::Http`]. Transient errors are
/// retried with exponential backoff up to `max_retries` additional attempts.
///
/// Holds one pooled `reqwest::Client`; share it between adapters via `Arc`.
pub struct PageFetcher {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with the given request timeout, `User-Agent`,
    /// and retry policy. Set `max_retries` to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(5)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network, TLS, or timeout failure.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let referer = extract_origin(url);

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let referer = referer.clone();
            async move {
                let response = self
                    .client
                    .get(url)
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-CA,en;q=0.9")
                    .header(reqwest::header::REFERER, &referer)
                    .header(reqwest::header::CACHE_CONTROL, "no-cache")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(60);

                    return Err(ScraperError::RateLimited {
                        domain: extract_domain(url),
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_owned(),
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await
    }
}
