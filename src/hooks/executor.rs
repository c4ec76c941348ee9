use async_trait::async_trait;
use axum::body::Bytes;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::metrics;

/// When a hook runs relative to the persistence call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::After => "after",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum HookError {
    #[error("request to custom logic endpoint {url} failed: {message}")]
    Unavailable { url: String, message: String },

    #[error("custom logic endpoint {url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Calls the remote custom logic runtime.
///
/// The payload goes out as-is and the response body comes back as raw
/// bytes; callers decode it against whatever shape they expect.
#[async_trait]
pub trait CustomLogicExecutor: Send + Sync {
    async fn execute(&self, payload: Bytes, phase: Phase, operation: &str) -> Result<Bytes, HookError>;
}

/// POSTs JSON to `{base_url}{phase}{operation}`, e.g. `.../beforecreate`.
pub struct HttpCustomLogicExecutor {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCustomLogicExecutor {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self, phase: Phase, operation: &str) -> String {
        format!("{}{}{}", self.base_url, phase.as_str(), operation)
    }

    async fn call(&self, url: &str, payload: Bytes) -> Result<Bytes, HookError> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| HookError::Unavailable {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(HookError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.bytes().await.map_err(|e| HookError::Unavailable {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl CustomLogicExecutor for HttpCustomLogicExecutor {
    async fn execute(&self, payload: Bytes, phase: Phase, operation: &str) -> Result<Bytes, HookError> {
        let url = self.endpoint(phase, operation);
        let start = Instant::now();

        match self.call(&url, payload).await {
            Ok(body) => {
                metrics::observe_custom_logic(operation, phase.as_str(), start.elapsed());
                tracing::debug!("Custom logic {} returned {} bytes", url, body.len());
                Ok(body)
            }
            Err(e) => {
                metrics::record_custom_logic_error(operation, phase.as_str());
                Err(e)
            }
        }
    }
}
