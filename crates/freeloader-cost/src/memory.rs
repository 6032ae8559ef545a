// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process budget ledger.

use async_trait::async_trait;
use dashmap::DashMap;
use freeloader_core::{BudgetStore, FreeloaderError};

/// `BudgetStore` kept in a sharded concurrent map.
///
/// Increments run under the shard's write lock for the key, so concurrent
/// increments of one `(period, project)` pair never lose an update. Contents
/// are lost on restart; use the SQLite store for anything durable.
#[derive(Debug, Default)]
pub struct MemoryBudgetStore {
    spent: DashMap<(String, String), f64>,
}

impl MemoryBudgetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BudgetStore for MemoryBudgetStore {
    async fn spent(&self, period_key: &str, project: &str) -> Result<f64, FreeloaderError> {
        Ok(self
            .spent
            .get(&(period_key.to_string(), project.to_string()))
            .map(|entry| *entry)
            .unwrap_or(0.0))
    }

    async fn increment(
        &self,
        period_key: &str,
        project: &str,
        cost_usd: f64,
    ) -> Result<f64, FreeloaderError> {
        let mut entry = self
            .spent
            .entry((period_key.to_string(), project.to_string()))
            .or_insert(0.0);
        *entry += cost_usd;
        Ok(*entry)
    }
}
