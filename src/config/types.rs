use serde::Deserialize;

/// Default upstream API host
pub const DEFAULT_BASE_URL: &str = "https://na1.api.riotgames.com";

/// Default request cap per 60-second window
pub const DEFAULT_MAX_REQUESTS_PER_MINUTE: u32 = 40;

/// Default number of fully crawled matches after which the crawl completes
pub const DEFAULT_MAX_MATCHES_TO_CRAWL: u64 = 100_000;

/// Main configuration structure for Match-Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Remote API access configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Credential sent as the `api_key` query parameter
    ///
    /// May be left empty in the file and supplied on the command line instead.
    #[serde(rename = "api-key", default)]
    pub api_key: String,

    /// Scheme and host of the upstream API
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Account the breadth-first traversal starts from
    #[serde(rename = "root-account-id")]
    pub root_account_id: String,

    /// Maximum number of requests issued per 60-second window
    #[serde(
        rename = "max-requests-per-minute",
        default = "default_max_requests_per_minute"
    )]
    pub max_requests_per_minute: u32,

    /// Number of fully crawled matches after which the crawl completes
    #[serde(
        rename = "max-matches-to-crawl",
        default = "default_max_matches_to_crawl"
    )]
    pub max_matches_to_crawl: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding one file per match body and per timeline
    #[serde(rename = "data-directory")]
    pub data_directory: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_requests_per_minute() -> u32 {
    DEFAULT_MAX_REQUESTS_PER_MINUTE
}

fn default_max_matches_to_crawl() -> u64 {
    DEFAULT_MAX_MATCHES_TO_CRAWL
}
