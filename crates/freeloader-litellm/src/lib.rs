// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LiteLLM completion backend for the Freeloader router.
//!
//! This crate implements [`CompletionBackend`] on top of a LiteLLM proxy's
//! OpenAI-compatible API. Each attempt is a single non-streaming request
//! addressed to the candidate's `provider/name` model id.

pub mod client;
pub mod types;

use std::time::Instant;

use async_trait::async_trait;
use freeloader_config::model::BackendConfig;
use freeloader_core::{
    AdapterType, Candidate, CompletionBackend, CompletionOutput, FreeloaderError, HealthStatus,
    PluginAdapter, RouteRequest, TokenUsage,
};
use tracing::{debug, info};

use crate::client::LiteLlmClient;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

pub use crate::client::ProxyHealth;
pub use crate::types::ModelEntry;

/// Completion backend that forwards every attempt to a LiteLLM proxy.
pub struct LiteLlmBackend {
    client: LiteLlmClient,
}

impl LiteLlmBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, FreeloaderError> {
        let client = LiteLlmClient::new(config)?;
        info!(base_url = %client.base_url(), "LiteLLM backend initialized");
        Ok(Self { client })
    }

    pub fn client(&self) -> &LiteLlmClient {
        &self.client
    }

    /// Models the proxy exposes, for catalog reconciliation.
    pub async fn available_models(&self) -> Vec<ModelEntry> {
        self.client.models().await
    }

    fn to_chat_request(candidate: &Candidate, request: &RouteRequest) -> ChatRequest {
        ChatRequest {
            model: candidate.model.id(),
            messages: vec![ChatMessage::user(request.prompt.clone())],
            max_tokens: request.max_tokens(),
        }
    }
}

/// A 200 without content is a failed attempt so fallback moves on.
fn to_output(response: &ChatResponse, latency_ms: u64) -> Result<CompletionOutput, FreeloaderError> {
    let text = response
        .content()
        .ok_or_else(|| FreeloaderError::backend("completion response had no content"))?;
    let usage = response.usage.unwrap_or_default();
    Ok(CompletionOutput {
        text: text.to_string(),
        usage: TokenUsage {
            tokens_in: usage.prompt_tokens,
            tokens_out: usage.completion_tokens,
        },
        latency_ms,
    })
}

#[async_trait]
impl CompletionBackend for LiteLlmBackend {
    async fn execute(
        &self,
        candidate: &Candidate,
        request: &RouteRequest,
    ) -> Result<CompletionOutput, FreeloaderError> {
        let chat = Self::to_chat_request(candidate, request);
        let started = Instant::now();
        let response = self.client.complete(&chat).await?;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(model = %chat.model, latency_ms, "completion attempt finished");
        to_output(&response, latency_ms)
    }
}

#[async_trait]
impl PluginAdapter for LiteLlmBackend {
    fn name(&self) -> &str {
        "litellm"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, FreeloaderError> {
        let health = self.client.health().await;
        Ok(match (health.ok, health.status) {
            (true, _) => HealthStatus::Healthy,
            (false, Some(status)) => {
                HealthStatus::Degraded(format!("proxy health endpoint returned {status}"))
            }
            (false, None) => HealthStatus::Unhealthy(
                health
                    .detail
                    .unwrap_or_else(|| "proxy unreachable".to_string()),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freeloader_core::{Model, ScoreBreakdown};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(base_url: &str) -> LiteLlmBackend {
        LiteLlmBackend::new(&BackendConfig {
            base_url: base_url.to_string(),
            api_key: None,
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn candidate(provider: &str, name: &str) -> Candidate {
        Candidate {
            model: Model {
                provider: provider.into(),
                name: name.into(),
                intelligence: 8,
                speed: 9,
                context_window: 128_000,
                pricing_input: 0.59,
                pricing_output: 0.79,
                free_tier_tokens: None,
                free_tier_period: None,
            },
            score: 0.8,
            scoring_breakdown: ScoreBreakdown::default(),
            routing_reason: "Balanced strategy (rank 1/1)".into(),
            rank: 1,
        }
    }

    #[tokio::test]
    async fn execute_addresses_provider_slash_model_and_maps_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "groq/llama-3.3-70b",
                "max_tokens": 1024
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "pong"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = backend(&server.uri())
            .execute(&candidate("groq", "llama-3.3-70b"), &RouteRequest::new("ping"))
            .await
            .unwrap();
        assert_eq!(output.text, "pong");
        assert_eq!(output.usage.tokens_in, 12);
        assert_eq!(output.usage.tokens_out, 4);
    }

    #[tokio::test]
    async fn missing_usage_counts_as_zero_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .mount(&server)
            .await;

        let output = backend(&server.uri())
            .execute(&candidate("local", "llama-3.1-8b"), &RouteRequest::new("ping"))
            .await
            .unwrap();
        assert_eq!(output.usage, TokenUsage::default());
    }

    #[tokio::test]
    async fn empty_completion_is_a_failed_attempt() {
        for body in [
            serde_json::json!({"choices": []}),
            serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": null}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 0}
            }),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1/chat/completions"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;

            let err = backend(&server.uri())
                .execute(&candidate("groq", "llama-3.3-70b"), &RouteRequest::new("ping"))
                .await
                .unwrap_err();
            assert!(matches!(err, FreeloaderError::Backend { .. }));
            assert!(err.to_string().contains("no content"), "got: {err}");
        }
    }

    #[tokio::test]
    async fn execute_propagates_backend_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"message": "upstream exploded"}
            })))
            .mount(&server)
            .await;

        let err = backend(&server.uri())
            .execute(&candidate("openai", "gpt-4o"), &RouteRequest::new("ping"))
            .await
            .unwrap_err();
        assert!(matches!(err, FreeloaderError::Backend { .. }));
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn health_check_maps_proxy_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let b = backend(&server.uri());
        assert_eq!(b.name(), "litellm");
        assert_eq!(b.adapter_type(), AdapterType::Backend);
        assert!(matches!(
            b.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }
}
