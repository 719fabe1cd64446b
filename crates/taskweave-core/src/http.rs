//! Blocking bridge over async reqwest for the HTTP adapters.
//!
//! The ports are synchronous, so each adapter holds a shared
//! [`HttpRuntime`] and blocks on one request at a time. Never call into it
//! from inside another tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};

use crate::error::{CoreError, StoreError};

/// Current-thread tokio runtime plus a reqwest client.
pub struct HttpRuntime {
    runtime: tokio::runtime::Runtime,
    client: Client,
}

impl HttpRuntime {
    /// Build a runtime whose client times requests out after `timeout`.
    ///
    /// # Errors
    /// Returns an error if the runtime or the TLS client cannot be built.
    pub fn new(timeout: Duration) -> Result<Arc<Self>, CoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreError::from)?;
        Ok(Arc::new(Self { runtime, client }))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send `request` and read the whole body as text.
    pub fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, String), reqwest::Error> {
        self.runtime.block_on(async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok((status, body))
        })
    }
}

/// Best-effort error message out of a Google-style error body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}
