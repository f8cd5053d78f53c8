//! HTTP client for the indicator service.

use async_trait::async_trait;
use ledgerbar_types::{Amount, LedgerbarError, Ohlc};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::{SourceError, TickSource};

/// Environment variable holding the indicator service endpoint.
pub const ENV_SOURCE_URL: &str = "LEDGERBAR_SOURCE_URL";
/// Environment variable holding the pause between requests, in milliseconds.
pub const ENV_REQUEST_INTERVAL_MS: &str = "LEDGERBAR_REQUEST_INTERVAL_MS";
/// Environment variable holding the retry budget per request.
pub const ENV_MAX_RETRIES: &str = "LEDGERBAR_MAX_RETRIES";

/// Connection parameters for the indicator service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Base URL of the service. Empty means unset.
    pub endpoint: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for failed requests.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// Minimum pause between the start of two consecutive requests.
    pub request_interval: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout: Duration::from_secs(30),
            max_retries: 5,
            base_delay_ms: 250,
            max_delay_ms: 10_000,
            request_interval: Duration::ZERO,
            user_agent: format!("ledgerbar/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Errors in the source configuration. Raised before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No endpoint was given.
    #[error("no source endpoint configured (set {ENV_SOURCE_URL} or pass --endpoint)")]
    MissingEndpoint,

    /// The endpoint is not a URL.
    #[error("invalid source endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// Endpoint as given.
        endpoint: String,
        /// Parser message.
        reason: String,
    },

    /// The endpoint uses a scheme other than http or https.
    #[error("unsupported scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    /// A numeric environment setting did not parse.
    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidSetting {
        /// Variable name.
        name: &'static str,
        /// Value as found.
        value: String,
    },
}

/// Values that take precedence over the environment, typically from flags.
///
/// An overridden variable is never read, so a malformed value in the
/// environment cannot fail a run that replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOverrides {
    /// Replaces [`ENV_SOURCE_URL`].
    pub endpoint: Option<String>,
    /// Replaces [`ENV_REQUEST_INTERVAL_MS`].
    pub request_interval: Option<Duration>,
    /// Replaces [`ENV_MAX_RETRIES`].
    pub max_retries: Option<u32>,
}

impl From<ConfigError> for LedgerbarError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl SourceConfig {
    /// Creates a configuration for `endpoint` with default tuning.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// Unset variables keep their defaults; the endpoint may stay empty and is
    /// only rejected by [`validate`](Self::validate).
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(SourceOverrides::default())
    }

    /// Reads the configuration from the process environment, letting
    /// `overrides` replace individual variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable that is not overridden is set
    /// but does not parse.
    pub fn from_env_with(overrides: SourceOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), overrides)
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        overrides: SourceOverrides,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        match overrides.endpoint {
            Some(endpoint) => config.endpoint = endpoint,
            None => {
                if let Some(endpoint) = lookup(ENV_SOURCE_URL) {
                    config.endpoint = endpoint.trim().to_string();
                }
            }
        }
        match overrides.request_interval {
            Some(interval) => config.request_interval = interval,
            None => {
                if let Some(value) = lookup(ENV_REQUEST_INTERVAL_MS) {
                    let millis = parse_setting(ENV_REQUEST_INTERVAL_MS, &value)?;
                    config.request_interval = Duration::from_millis(millis);
                }
            }
        }
        match overrides.max_retries {
            Some(retries) => config.max_retries = retries,
            None => {
                if let Some(value) = lookup(ENV_MAX_RETRIES) {
                    config.max_retries = parse_setting(ENV_MAX_RETRIES, &value)?;
                }
            }
        }
        Ok(config)
    }

    /// Checks the endpoint and returns it parsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is missing, unparsable, or not http(s).
    pub fn validate(&self) -> Result<Url, ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        let url = Url::parse(endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }
}

fn parse_setting<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidSetting {
            name,
            value: value.to_string(),
        })
}

/// Errors from talking to the indicator service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server kept failing after all retries.
    #[error("Server error {status} from {url}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Server answered with a non-retryable error status.
    #[error("Request to {url} failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Response body did not match the expected shape.
    #[error("Invalid response from {url}: {source}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder error.
        source: serde_json::Error,
    },
}

impl From<ClientError> for LedgerbarError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Config(e) => e.into(),
            other => Self::SourceFetch(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct TimestampResponse {
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct OhlcResponse {
    open: Amount,
    high: Amount,
    low: Amount,
    close: Amount,
}

#[derive(Debug, Deserialize)]
struct VolumeResponse {
    volume: Amount,
}

/// [`TickSource`] backed by the indicator service's JSON REST API.
///
/// Requests are sent one at a time and spaced by
/// [`SourceConfig::request_interval`].
#[derive(Debug)]
pub struct IndicatorClient {
    client: Client,
    base: String,
    config: SourceConfig,
    next_request: Mutex<Option<Instant>>,
}

impl IndicatorClient {
    /// Creates a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: SourceConfig) -> Result<Self, ClientError> {
        let url = config.validate()?;
        let client = Client::builder()
            .pool_max_idle_per_host(1)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            base: url.as_str().trim_end_matches('/').to_string(),
            config,
            next_request: Mutex::new(None),
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Returns the full URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        let mut attempts = 0;

        loop {
            self.pace().await;
            debug!(%url, attempt = attempts, "requesting");
            match self.client.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        if attempts < self.config.max_retries {
                            attempts += 1;
                            let delay = self.calculate_backoff_delay(attempts);
                            warn!(
                                %url,
                                status = status.as_u16(),
                                attempt = attempts,
                                ?delay,
                                "retrying request"
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        return Err(ClientError::ServerError {
                            status: status.as_u16(),
                            url,
                        });
                    }
                    if !status.is_success() {
                        return Err(ClientError::Status {
                            status: status.as_u16(),
                            url,
                        });
                    }

                    let body = response.bytes().await?;
                    return serde_json::from_slice(&body)
                        .map_err(|source| ClientError::Decode { url, source });
                }
                Err(e) if Self::is_retryable_error(&e) && attempts < self.config.max_retries => {
                    attempts += 1;
                    let delay = self.calculate_backoff_delay(attempts);
                    warn!(%url, error = %e, attempt = attempts, ?delay, "retrying request");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Waits until the request interval since the previous request has passed.
    async fn pace(&self) {
        if self.config.request_interval.is_zero() {
            return;
        }
        let mut next = self.next_request.lock().await;
        if let Some(at) = *next {
            tokio::time::sleep_until(at).await;
        }
        *next = Some(Instant::now() + self.config.request_interval);
    }

    /// Calculates the backoff delay with exponential backoff and jitter.
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        let exp_delay = self
            .config
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(10));
        let capped_delay = exp_delay.min(self.config.max_delay_ms);

        // Deterministic jitter within ±25%.
        let jitter_range = capped_delay / 4;
        let final_delay = if jitter_range > 0 {
            let offset = (u64::from(attempt) * 17) % (jitter_range * 2);
            (capped_delay + offset).saturating_sub(jitter_range)
        } else {
            capped_delay
        };
        Duration::from_millis(final_delay.max(100))
    }

    /// Determines if an error is retryable.
    fn is_retryable_error(error: &reqwest::Error) -> bool {
        if error.is_builder() {
            return false;
        }
        error.is_timeout() || error.is_connect() || error.is_request()
    }
}

#[async_trait]
impl TickSource for IndicatorClient {
    async fn tick_count(&self) -> Result<u64, SourceError> {
        let response: CountResponse = self.get_json("ticks/count").await?;
        Ok(response.count)
    }

    async fn timestamp(&self, index: u64) -> Result<i64, SourceError> {
        let response: TimestampResponse = self.get_json(&format!("ticks/{index}")).await?;
        Ok(response.timestamp)
    }

    async fn ohlc(&self, timestamp: i64) -> Result<Ohlc, SourceError> {
        let r: OhlcResponse = self.get_json(&format!("ohlc/{timestamp}")).await?;
        Ok(Ohlc::new(r.open, r.high, r.low, r.close))
    }

    async fn volume(&self, timestamp: i64) -> Result<Amount, SourceError> {
        let response: VolumeResponse = self.get_json(&format!("volume/{timestamp}")).await?;
        Ok(response.volume)
    }
}
