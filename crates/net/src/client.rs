//! HTTP client with connection pooling

use distro_config::NetworkConfig;
use distro_errors::{Error, NetworkError};
use reqwest::{Client, Response};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub connect_timeout: Duration,
    /// Longest gap between two body chunks
    pub read_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            read_timeout: config.read_timeout(),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// HTTP client wrapper
///
/// Requests are never retried: a failed transfer is reported as a failed
/// item and the user decides whether to submit again.
#[derive(Clone, Debug)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ClientInit(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Execute a GET request
    ///
    /// Any status is returned as a response; only transport failures are errors.
    ///
    /// # Errors
    ///
    /// Returns a classified `NetworkError` for timeouts, refused connections
    /// and other transport failures.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }
}

/// Classify a reqwest error
pub(crate) fn transport_error(url: &str, error: &reqwest::Error) -> Error {
    NetworkError::from_transport(url, error.is_timeout(), error.is_connect(), error.to_string())
        .into()
}
