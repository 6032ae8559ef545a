// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory catalog and audit sink, plus a model constructor.

use async_trait::async_trait;
use tokio::sync::Mutex;

use freeloader_core::{FreeloaderError, Model, ModelCatalog, ModelFilter, UsageLog, UsageRecord};

/// Build a model with the given ratings; output price equals input price.
pub fn test_model(provider: &str, name: &str, intelligence: u8, speed: u8, price: f64) -> Model {
    Model {
        provider: provider.to_string(),
        name: name.to_string(),
        intelligence,
        speed,
        context_window: 128_000,
        pricing_input: price,
        pricing_output: price,
        free_tier_tokens: None,
        free_tier_period: None,
    }
}

/// A fixed model list. Filters are applied in memory.
pub struct StaticCatalog {
    models: Vec<Model>,
}

impl StaticCatalog {
    pub fn new(models: Vec<Model>) -> Self {
        Self { models }
    }
}

#[async_trait]
impl ModelCatalog for StaticCatalog {
    async fn get_all(&self, filter: &ModelFilter) -> Result<Vec<Model>, FreeloaderError> {
        Ok(self
            .models
            .iter()
            .filter(|m| filter.provider.as_ref().is_none_or(|p| *p == m.provider))
            .filter(|m| filter.min_intelligence.is_none_or(|min| m.intelligence >= min))
            .filter(|m| filter.min_speed.is_none_or(|min| m.speed >= min))
            .cloned()
            .collect())
    }

    async fn get(&self, provider: &str, name: &str) -> Result<Option<Model>, FreeloaderError> {
        Ok(self
            .models
            .iter()
            .find(|m| m.provider == provider && m.name == name)
            .cloned())
    }
}

/// Keeps every usage record in memory.
#[derive(Default)]
pub struct RecordingUsageLog {
    records: Mutex<Vec<UsageRecord>>,
}

impl RecordingUsageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<UsageRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl UsageLog for RecordingUsageLog {
    async fn log(&self, record: &UsageRecord) -> Result<(), FreeloaderError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}
