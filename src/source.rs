use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::config::MonitorConfig;
use crate::error::{ConfigError, CycleError};

/// Where raw statistics payloads come from.
///
/// One call is one fetch: the body on a 200, a `CycleError` otherwise.
pub trait StatsSource {
    fn fetch(&mut self) -> impl Future<Output = Result<String, CycleError>> + Send;
}

// ─── HTTP implementation ─────────────────────────────────────────

/// Polls a statistics URL with a single reusable `reqwest::Client`.
pub struct HttpStatsSource {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpStatsSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("statwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &MonitorConfig) -> Result<Self, ConfigError> {
        Self::new(config.url.clone(), config.request_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, err: reqwest::Error) -> CycleError {
        if err.is_timeout() {
            CycleError::Timeout(self.timeout)
        } else {
            CycleError::Transport(err)
        }
    }

    async fn get_body(&self) -> Result<String, CycleError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        // Non-200 bodies are dropped unread
        let status = response.status();
        if status != StatusCode::OK {
            return Err(CycleError::Status(status));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                CycleError::Timeout(self.timeout)
            } else {
                CycleError::Body(e)
            }
        })
    }
}

impl StatsSource for HttpStatsSource {
    fn fetch(&mut self) -> impl Future<Output = Result<String, CycleError>> + Send {
        self.get_body()
    }
}
