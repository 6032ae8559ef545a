// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a LiteLLM proxy.
//!
//! Provides [`LiteLlmClient`] which handles request construction,
//! bearer authentication and error body decoding. There are no retries:
//! moving on to another candidate is the router's job.

use std::time::Duration;

use freeloader_config::model::BackendConfig;
use freeloader_core::FreeloaderError;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, error};

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse, ModelEntry, ModelList};

/// Outcome of `GET /health`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyHealth {
    pub ok: bool,
    pub status: Option<u16>,
    pub detail: Option<String>,
}

/// HTTP client for LiteLLM communication.
#[derive(Debug, Clone)]
pub struct LiteLlmClient {
    client: reqwest::Client,
    base_url: String,
}

impl LiteLlmClient {
    /// Build a client from backend settings. The API key, when set, is sent
    /// as a bearer token on every request.
    pub fn new(config: &BackendConfig) -> Result<Self, FreeloaderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                FreeloaderError::Config(format!("invalid API key header value: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FreeloaderError::Backend {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one chat completion request.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, FreeloaderError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| FreeloaderError::Backend {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "completion response received");

        let body = response.text().await.map_err(|e| FreeloaderError::Backend {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(FreeloaderError::backend(error_message(status, &body)));
        }

        serde_json::from_str(&body).map_err(|e| FreeloaderError::Backend {
            message: format!("failed to parse completion response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Probe `GET /health`. Transport failures are reported in the result
    /// rather than as an error.
    pub async fn health(&self) -> ProxyHealth {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                let detail = response.text().await.ok().filter(|b| !b.is_empty());
                ProxyHealth {
                    ok: status == StatusCode::OK,
                    status: Some(status.as_u16()),
                    detail,
                }
            }
            Err(e) => ProxyHealth {
                ok: false,
                status: None,
                detail: Some(e.to_string()),
            },
        }
    }

    /// Models the proxy currently exposes. Failures are logged and yield an
    /// empty list.
    pub async fn models(&self) -> Vec<ModelEntry> {
        match self.fetch_models().await {
            Ok(models) => models,
            Err(e) => {
                error!(error = %e, "failed to list models");
                Vec::new()
            }
        }
    }

    async fn fetch_models(&self) -> Result<Vec<ModelEntry>, FreeloaderError> {
        let url = format!("{}/v1/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FreeloaderError::Backend {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FreeloaderError::backend(format!(
                "failed to list models: {status}"
            )));
        }
        let list: ModelList = response.json().await.map_err(|e| FreeloaderError::Backend {
            message: format!("failed to parse model list: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(list.data)
    }
}

/// Prefer the proxy's own `error.message`; fall back to status and body.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => match api_err.error.error_type {
            Some(kind) => format!("LiteLLM error ({kind}): {}", api_err.error.message),
            None => format!("LiteLLM error: {}", api_err.error.message),
        },
        Err(_) => format!("LiteLLM returned {status}: {body}"),
    }
}
