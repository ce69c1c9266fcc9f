//! Shared domain types and configuration for the deal finder.

pub mod app_config;
pub mod config;
pub mod deal;
pub mod sources;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use deal::{Deal, DealError, STOCK_UNKNOWN};
pub use sources::{
    load_sources, parse_sources, validate_sources, SourceConfig, SourceSelectors, SourcesFile,
    QUERY_PLACEHOLDER,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("invalid source configuration: {0}")]
    Validation(String),
}
