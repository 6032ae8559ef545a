// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted completion backend for deterministic testing.
//!
//! `MockBackend` answers each attempt according to a per-model script.
//! Models without a script get a default reply of "mock response" with
//! 10 input and 20 output tokens.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use freeloader_core::{
    AdapterType, Candidate, CompletionBackend, CompletionOutput, FreeloaderError, HealthStatus,
    PluginAdapter, RouteRequest, TokenUsage,
};

/// How the mock answers attempts against one model.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    Text {
        text: String,
        tokens_in: u32,
        tokens_out: u32,
    },
    Fail(String),
}

impl MockReply {
    pub fn text(text: impl Into<String>, tokens_in: u32, tokens_out: u32) -> Self {
        Self::Text {
            text: text.into(),
            tokens_in,
            tokens_out,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

impl Default for MockReply {
    fn default() -> Self {
        Self::text("mock response", 10, 20)
    }
}

/// A completion backend keyed by `provider/name` model id.
#[derive(Default)]
pub struct MockBackend {
    script: Mutex<HashMap<String, MockReply>>,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reply for one model id, replacing any earlier script.
    pub async fn script(&self, model_id: &str, reply: MockReply) {
        self.script.lock().await.insert(model_id.to_string(), reply);
    }

    /// Make every attempt against `model_id` fail.
    pub async fn fail(&self, model_id: &str) {
        self.script(model_id, MockReply::fail(format!("{model_id} unavailable")))
            .await;
    }

    /// Model ids attempted so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn execute(
        &self,
        candidate: &Candidate,
        _request: &RouteRequest,
    ) -> Result<CompletionOutput, FreeloaderError> {
        let id = candidate.model.id();
        self.calls.lock().await.push(id.clone());
        let reply = self
            .script
            .lock()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default();
        match reply {
            MockReply::Text {
                text,
                tokens_in,
                tokens_out,
            } => Ok(CompletionOutput {
                text,
                usage: TokenUsage {
                    tokens_in,
                    tokens_out,
                },
                latency_ms: 5,
            }),
            MockReply::Fail(message) => Err(FreeloaderError::backend(message)),
        }
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, FreeloaderError> {
        Ok(HealthStatus::Healthy)
    }
}
