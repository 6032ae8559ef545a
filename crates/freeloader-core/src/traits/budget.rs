// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Narrow store interface behind the budget ledger.

use async_trait::async_trait;

use crate::error::FreeloaderError;

/// Per-`(period_key, project)` running spend totals.
///
/// `increment` must be an atomic add-or-insert: concurrent increments for
/// the same key may not lose updates.
#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Amount spent in the window, `0.0` if nothing was recorded yet.
    async fn spent(&self, period_key: &str, project: &str) -> Result<f64, FreeloaderError>;

    /// Add `cost_usd` to the window and return the new total.
    async fn increment(
        &self,
        period_key: &str,
        project: &str,
        cost_usd: f64,
    ) -> Result<f64, FreeloaderError>;
}
