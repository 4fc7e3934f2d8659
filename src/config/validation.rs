use crate::config::types::{Config, FetcherConfig, PacingConfig, RetryConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_retry_config(&config.retry)?;
    validate_pacing_config(&config.pacing)?;

    if config.storage.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the site origin
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    Ok(())
}

/// Validates HTTP transport settings
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.response_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "response_timeout_ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates retry ceilings
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.listing_max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "listing_max_attempts must be >= 1, got {}",
            config.listing_max_attempts
        )));
    }

    if config.item_max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "item_max_attempts must be >= 1, got {}",
            config.item_max_attempts
        )));
    }

    Ok(())
}

/// Validates that both delay ranges are well-formed
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms ({}) must not exceed max_delay_ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    if config.recovered_min_delay_ms > config.recovered_max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "recovered_min_delay_ms ({}) must not exceed recovered_max_delay_ms ({})",
            config.recovered_min_delay_ms, config.recovered_max_delay_ms
        )));
    }

    Ok(())
}
