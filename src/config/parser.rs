use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses configuration text without validating it
///
/// Callers that patch fields after parsing (for example the API key supplied on
/// the command line) must run [`validate`] themselves.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use match_crawler::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Request cap: {}", config.crawler.max_requests_per_minute);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be matched to the configuration they used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration, applies an optional API key override, and returns
/// both the validated config and the hash of the file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
/// * `api_key` - Key that replaces `api.api-key` from the file when present
pub fn load_config_with_hash(
    path: &Path,
    api_key: Option<String>,
) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    if let Some(key) = api_key {
        config.api.api_key = key;
    }
    validate(&config)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
