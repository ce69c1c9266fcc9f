use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`
/// lookup instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::{IpAddr, SocketAddr};
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u16 = |var: &str, default: &str| -> Result<u16, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u16>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("DEALFINDER_ENV", "development"))?;

    let host = or_default("DEALFINDER_HOST", "0.0.0.0")
        .parse::<IpAddr>()
        .map_err(|e| invalid("DEALFINDER_HOST", e.to_string()))?;
    let port = parse_u16("PORT", "3001")?;
    let bind_addr = SocketAddr::new(host, port);

    let log_level = or_default("DEALFINDER_LOG_LEVEL", "info");
    let sources_path = lookup("DEALFINDER_SOURCES_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    let scraper_request_timeout_secs = parse_u64("DEALFINDER_SCRAPER_REQUEST_TIMEOUT_SECS", "8")?;
    if scraper_request_timeout_secs == 0 {
        return Err(invalid(
            "DEALFINDER_SCRAPER_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let scraper_user_agent = or_default(
        "DEALFINDER_SCRAPER_USER_AGENT",
        "dealfinder/0.1 (price-aggregator)",
    );
    let scraper_max_retries = parse_u32("DEALFINDER_SCRAPER_MAX_RETRIES", "0")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("DEALFINDER_SCRAPER_RETRY_BACKOFF_BASE_SECS", "1")?;
    let adapter_timeout_secs = parse_u64("DEALFINDER_ADAPTER_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        sources_path,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        adapter_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DEALFINDER_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
