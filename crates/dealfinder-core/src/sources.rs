use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Placeholder in [`SourceConfig::search_url`] replaced by the encoded query.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// CSS selectors describing where listings live on a source's result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSelectors {
    /// One match per search result (the listing fragment).
    pub listing: String,
    /// Title element, relative to the listing fragment.
    pub title: String,
    /// Link element; when absent the title element's own `href` is used.
    pub link: Option<String>,
    /// Dedicated price region; when absent the price is read from the title.
    pub price: Option<String>,
    pub retailer: Option<String>,
    pub stock: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    /// Retailer label used when neither a selector nor the title names one.
    pub retailer: String,
    /// Origin that relative listing links are resolved against.
    pub base_url: String,
    /// Search URL template containing `{query}`.
    pub search_url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub selectors: SourceSelectors,
}

fn default_enabled() -> bool {
    true
}

impl SourceConfig {
    /// Case-insensitive name match used for `--source` style filters.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

/// Load and validate extra source definitions from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sources(&content)
}

/// Parse and validate a sources document held in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_sources(content: &str) -> Result<SourcesFile, ConfigError> {
    let sources_file: SourcesFile = serde_yaml::from_str(content)?;
    validate_sources(&sources_file.sources)?;
    Ok(sources_file)
}

/// Check a list of sources for the invariants adapters rely on.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] describing the first offending source.
pub fn validate_sources(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for source in sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(source.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }

        match url::Url::parse(&source.base_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") && u.has_host() => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has base_url '{}'; must be an absolute http(s) URL",
                    source.name, source.base_url
                )));
            }
        }

        if !source.search_url.contains(QUERY_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "source '{}' search_url must contain {QUERY_PLACEHOLDER}",
                source.name
            )));
        }

        if source.selectors.listing.trim().is_empty() || source.selectors.title.trim().is_empty()
        {
            return Err(ConfigError::Validation(format!(
                "source '{}' needs non-empty listing and title selectors",
                source.name
            )));
        }
    }

    Ok(())
}
