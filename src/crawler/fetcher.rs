//! HTTP fetcher implementation
//!
//! This module handles every request the crawler makes:
//! - Building the HTTP client
//! - Building the three authenticated API endpoints
//! - Issuing a single GET and classifying the outcome
//!
//! Failures are values, not errors. The controller turns any non-success into
//! "skip this item" without stopping the crawl.

use crate::config::ApiConfig;
use crate::state::{AccountId, EntityId, MatchId};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// HTTP status code
        status_code: u16,
        /// Raw response body
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, reset, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns the body of a successful fetch
    ///
    /// An empty body is treated the same as a failed fetch.
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Success { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }
}

/// One of the three upstream resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Recent matches played by an account
    RecentMatches(AccountId),
    /// Full match body
    Match(MatchId),
    /// Frame-by-frame timeline of a match
    Timeline(MatchId),
}

impl Endpoint {
    fn path(&self) -> String {
        match self {
            Self::RecentMatches(account) => format!(
                "lol/match/v3/matchlists/by-account/{}/recent",
                account.as_str()
            ),
            Self::Match(id) => format!("lol/match/v3/matches/{}", id.as_str()),
            Self::Timeline(id) => format!("lol/match/v3/timelines/by-match/{}", id.as_str()),
        }
    }
}

/// Log-safe description; never includes the credential
impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecentMatches(account) => write!(f, "recent matches of account {}", account),
            Self::Match(id) => write!(f, "match {}", id),
            Self::Timeline(id) => write!(f, "timeline of match {}", id),
        }
    }
}

/// Client plus credential for the upstream match API
///
/// Not `Debug`: it holds the API key.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl ApiClient {
    /// Builds a client from the API configuration
    ///
    /// # Returns
    ///
    /// * `Ok(ApiClient)` - Ready to issue requests
    /// * `Err(CrawlError)` - The base URL is invalid or the HTTP client failed to build
    pub fn new(config: &ApiConfig) -> Result<Self, crate::CrawlError> {
        let mut base_url = Url::parse(&config.base_url)?;

        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: build_http_client()?,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Full request URL for `endpoint`, credential included
    pub fn url_for(&self, endpoint: &Endpoint) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join(&endpoint.path())?;
        url.query_pairs_mut().append_pair("api_key", &self.api_key);
        Ok(url)
    }

    /// Issues one GET for `endpoint`
    ///
    /// Callers must pass through the rate governor first.
    pub async fn fetch(&self, endpoint: &Endpoint) -> FetchResult {
        match self.url_for(endpoint) {
            Ok(url) => fetch_url(&self.client, url.as_str()).await,
            Err(e) => FetchResult::NetworkError {
                error: format!("invalid request URL for {}: {}", endpoint, e),
            },
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// No overall request timeout is set; only connection establishment is bounded.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("match-crawler/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body or the reason it has none
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx | Success |
/// | HTTP 4xx / 5xx (including 429) | HttpError |
/// | Timeout, connection refused, body read failure | NetworkError |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();

            if !status.is_success() {
                if status == StatusCode::TOO_MANY_REQUESTS {
                    tracing::warn!("Upstream rejected request with HTTP 429");
                }
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: e.without_url().to_string(),
                },
            }
        }
        Err(e) => {
            // Strip the URL so the API key never reaches the logs
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.without_url().to_string()
            };
            FetchResult::NetworkError { error }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client(base_url: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            api_key: "RGAPI-secret".to_string(),
            base_url: base_url.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client().is_ok());
    }

    #[test]
    fn test_endpoint_urls() {
        let client = create_test_client("https://na1.api.riotgames.com");

        let url = client
            .url_for(&Endpoint::RecentMatches(AccountId::new("1000")))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://na1.api.riotgames.com/lol/match/v3/matchlists/by-account/1000/recent?api_key=RGAPI-secret"
        );

        let url = client.url_for(&Endpoint::Match(MatchId::new("555"))).unwrap();
        assert_eq!(
            url.as_str(),
            "https://na1.api.riotgames.com/lol/match/v3/matches/555?api_key=RGAPI-secret"
        );

        let url = client
            .url_for(&Endpoint::Timeline(MatchId::new("555")))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://na1.api.riotgames.com/lol/match/v3/timelines/by-match/555?api_key=RGAPI-secret"
        );
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let client = create_test_client("http://127.0.0.1:8080/proxy");
        let url = client.url_for(&Endpoint::Match(MatchId::new("1"))).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/proxy/lol/match/v3/matches/1?api_key=RGAPI-secret"
        );
    }

    #[test]
    fn test_endpoint_display_hides_key() {
        let endpoint = Endpoint::Timeline(MatchId::new("9"));
        let shown = endpoint.to_string();
        assert_eq!(shown, "timeline of match 9");
        assert!(!shown.contains("api_key"));
    }

    #[test]
    fn test_into_body() {
        let ok = FetchResult::Success {
            status_code: 200,
            body: "{}".to_string(),
        };
        assert_eq!(ok.into_body(), Some("{}".to_string()));

        let empty = FetchResult::Success {
            status_code: 200,
            body: String::new(),
        };
        assert_eq!(empty.into_body(), None);

        assert_eq!(FetchResult::HttpError { status_code: 404 }.into_body(), None);
        assert_eq!(
            FetchResult::NetworkError {
                error: "Connection refused".to_string()
            }
            .into_body(),
            None
        );
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_network_error() {
        // Port 1 on localhost is reserved and closed
        let client = create_test_client("http://127.0.0.1:1");
        let result = client.fetch(&Endpoint::Match(MatchId::new("1"))).await;
        assert!(matches!(result, FetchResult::NetworkError { .. }));
    }
}
