//! Concrete source adapters and the source registry.

mod html_listing;
mod pending;
pub mod redflagdeals;

pub use html_listing::HtmlListingSource;
pub use pending::PendingSource;

use std::path::Path;
use std::sync::Arc;

use dealfinder_core::{ConfigError, SourceConfig};

use crate::adapter::SourceAdapter;
use crate::error::ScraperError;
use crate::fetch::PageFetcher;

/// Sources that are registered without any configuration file.
#[must_use]
pub fn builtin_sources() -> Vec<SourceConfig> {
    vec![redflagdeals::source_config()]
}

/// Built-in sources followed by those from `sources_path`, in that order.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be loaded or the combined list
/// fails validation (e.g. a file source reuses a built-in name).
pub fn source_catalog(sources_path: Option<&Path>) -> Result<Vec<SourceConfig>, ConfigError> {
    let mut sources = builtin_sources();
    if let Some(path) = sources_path {
        let file = dealfinder_core::load_sources(path)?;
        tracing::info!(
            path = %path.display(),
            count = file.sources.len(),
            "loaded additional sources"
        );
        sources.extend(file.sources);
    }
    dealfinder_core::validate_sources(&sources)?;
    Ok(sources)
}

/// Builds the adapter for one configured source.
///
/// Disabled sources become a [`PendingSource`] no-op.
///
/// # Errors
///
/// Returns [`ScraperError`] if an enabled source's selectors or URL template
/// are invalid.
pub fn build_adapter(
    config: SourceConfig,
    fetcher: &Arc<PageFetcher>,
) -> Result<Arc<dyn SourceAdapter>, ScraperError> {
    if !config.enabled {
        return Ok(Arc::new(PendingSource::new(config.name)));
    }
    Ok(Arc::new(HtmlListingSource::new(config, Arc::clone(fetcher))?))
}

/// Builds adapters for every source, preserving order.
///
/// # Errors
///
/// Returns the first [`ScraperError`] from [`build_adapter`].
pub fn build_adapters(
    configs: Vec<SourceConfig>,
    fetcher: &Arc<PageFetcher>,
) -> Result<Vec<Arc<dyn SourceAdapter>>, ScraperError> {
    configs
        .into_iter()
        .map(|config| build_adapter(config, fetcher))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> Arc<PageFetcher> {
        Arc::new(PageFetcher::new(5, "dealfinder-test/0.1", 0, 0).expect("fetcher"))
    }

    #[test]
    fn catalog_without_file_is_builtins() {
        let sources = source_catalog(None).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, redflagdeals::NAME);
    }

    #[test]
    fn catalog_reports_missing_file() {
        let err = source_catalog(Some(Path::new("/nonexistent/sources.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::SourcesFileIo { .. }));
    }

    #[test]
    fn adapters_keep_registration_order() {
        let mut pending = redflagdeals::source_config();
        pending.name = "Later".to_string();
        pending.enabled = false;

        let adapters =
            build_adapters(vec![redflagdeals::source_config(), pending], &fetcher()).unwrap();
        let names: Vec<&str> = adapters.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec![redflagdeals::NAME, "Later"]);
    }

    #[tokio::test]
    async fn disabled_source_builds_pending_no_op() {
        let mut config = redflagdeals::source_config();
        config.enabled = false;
        // An invalid selector is never compiled for a disabled source.
        config.selectors.listing = "li[[".to_string();

        let adapter = build_adapter(config, &fetcher()).unwrap();
        assert!(adapter.search("laptop").await.unwrap().is_empty());
    }

    #[test]
    fn enabled_source_with_bad_selector_fails() {
        let mut config = redflagdeals::source_config();
        config.selectors.title = "h3[[".to_string();
        assert!(matches!(
            build_adapter(config, &fetcher()),
            Err(ScraperError::InvalidSelector { .. })
        ));
    }
}
