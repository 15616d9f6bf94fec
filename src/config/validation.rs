use crate::config::types::{ApiConfig, Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates API access configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    if config.api_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "api_key cannot be empty (set api-key or pass --api-key)".to_string(),
        ));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_entity_id(&config.root_account_id)?;

    if config.max_requests_per_minute < 1 {
        return Err(ConfigError::Validation(format!(
            "max_requests_per_minute must be >= 1, got {}",
            config.max_requests_per_minute
        )));
    }

    if config.max_matches_to_crawl < 1 {
        return Err(ConfigError::Validation(format!(
            "max_matches_to_crawl must be >= 1, got {}",
            config.max_matches_to_crawl
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_directory.is_empty() {
        return Err(ConfigError::Validation(
            "data_directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// IDs end up in URL paths and file names, so separators are rejected
fn validate_entity_id(id: &str) -> Result<(), ConfigError> {
    if id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "root_account_id cannot be empty".to_string(),
        ));
    }

    if id.contains(['/', '\\', '?', '#']) || id.contains("..") {
        return Err(ConfigError::Validation(format!(
            "root_account_id '{}' contains invalid characters",
            id
        )));
    }

    Ok(())
}
