// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-project budget enforcement over daily and monthly windows.
//!
//! The enforcer holds no running totals of its own. Every check reads the
//! current spend from a [`BudgetStore`] and derives the status from the
//! configured limits. Hard limits block a request before it runs; soft limits
//! only emit a `tracing::warn`.
//!
//! Check and record are separate operations, so concurrent requests for one
//! project can each pass admission before either records. Overspend is
//! bounded by the estimate times the number of in-flight requests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use freeloader_config::model::BudgetConfig;
use freeloader_core::{BudgetPeriod, BudgetStore, FreeloaderError};
use serde::Serialize;
use tracing::{debug, warn};

use crate::period::PeriodKeys;

/// Derived state of one budget window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStatus {
    pub period: BudgetPeriod,
    pub period_key: String,
    pub spent: f64,
    pub limit: f64,
    pub soft_limit: f64,
    /// `limit - spent`, floored at zero.
    pub remaining: f64,
    /// May exceed 100 after an overspend.
    pub percent: f64,
    pub soft_limit_exceeded: bool,
    pub hard_limit_exceeded: bool,
}

impl WindowStatus {
    pub fn derive(
        period: BudgetPeriod,
        period_key: impl Into<String>,
        spent: f64,
        limit: f64,
        soft_limit: f64,
    ) -> Self {
        Self {
            period,
            period_key: period_key.into(),
            spent,
            limit,
            soft_limit,
            remaining: (limit - spent).max(0.0),
            percent: if limit > 0.0 {
                spent / limit * 100.0
            } else {
                0.0
            },
            soft_limit_exceeded: spent > soft_limit,
            hard_limit_exceeded: spent >= limit,
        }
    }

    /// Whether spending `estimate` more would reach the hard limit.
    pub fn would_exceed(&self, estimate: f64) -> bool {
        self.spent + estimate >= self.limit
    }
}

/// Both windows for one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub project: String,
    pub daily: WindowStatus,
    pub monthly: WindowStatus,
}

/// Admission control and usage recording against a shared ledger.
pub struct BudgetEnforcer {
    store: Arc<dyn BudgetStore>,
    config: BudgetConfig,
}

impl BudgetEnforcer {
    pub fn new(store: Arc<dyn BudgetStore>, config: BudgetConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    /// Current status of both windows for `project`.
    pub async fn status(&self, project: &str) -> Result<BudgetStatus, FreeloaderError> {
        self.status_at(project, Utc::now()).await
    }

    /// Status of the windows containing `at`.
    pub async fn status_at(
        &self,
        project: &str,
        at: DateTime<Utc>,
    ) -> Result<BudgetStatus, FreeloaderError> {
        let keys = PeriodKeys::at(at);
        let daily = self.store.spent(&keys.daily, project).await?;
        let monthly = self.store.spent(&keys.monthly, project).await?;
        Ok(self.derive(project, &keys, daily, monthly))
    }

    /// Reject the request if `estimated_cost` would reach a hard limit.
    pub async fn check_budget(
        &self,
        project: &str,
        estimated_cost: f64,
    ) -> Result<BudgetStatus, FreeloaderError> {
        self.check_budget_at(project, estimated_cost, Utc::now()).await
    }

    /// Daily is checked before monthly, so a request over both limits
    /// reports the daily window. Soft limits warn but never block.
    pub async fn check_budget_at(
        &self,
        project: &str,
        estimated_cost: f64,
        at: DateTime<Utc>,
    ) -> Result<BudgetStatus, FreeloaderError> {
        validate_cost("estimated cost", estimated_cost)?;
        let status = self.status_at(project, at).await?;

        for window in [&status.daily, &status.monthly] {
            if window.would_exceed(estimated_cost) {
                warn!(
                    project,
                    period = %window.period,
                    spent = window.spent,
                    limit = window.limit,
                    estimated_cost,
                    "hard budget limit reached, rejecting request"
                );
                return Err(FreeloaderError::BudgetExceeded {
                    project: project.to_string(),
                    period: window.period,
                    spent: window.spent,
                    limit: window.limit,
                });
            }
        }

        for window in [&status.daily, &status.monthly] {
            if window.soft_limit_exceeded {
                warn!(
                    project,
                    period = %window.period,
                    spent = window.spent,
                    soft_limit = window.soft_limit,
                    limit = window.limit,
                    "soft budget limit exceeded"
                );
            }
        }

        Ok(status)
    }

    /// Add `cost_usd` to both windows for the current instant.
    pub async fn record_usage(
        &self,
        project: &str,
        cost_usd: f64,
    ) -> Result<BudgetStatus, FreeloaderError> {
        self.record_usage_at(project, cost_usd, Utc::now()).await
    }

    /// Add `cost_usd` to the daily and monthly ledger entries of `at`.
    /// Either increment failing fails the call.
    pub async fn record_usage_at(
        &self,
        project: &str,
        cost_usd: f64,
        at: DateTime<Utc>,
    ) -> Result<BudgetStatus, FreeloaderError> {
        validate_cost("cost", cost_usd)?;
        let keys = PeriodKeys::at(at);
        let daily = self.store.increment(&keys.daily, project, cost_usd).await?;
        let monthly = self
            .store
            .increment(&keys.monthly, project, cost_usd)
            .await?;
        debug!(project, cost_usd, daily, monthly, "usage recorded");
        Ok(self.derive(project, &keys, daily, monthly))
    }

    fn derive(&self, project: &str, keys: &PeriodKeys, daily: f64, monthly: f64) -> BudgetStatus {
        let (hard, soft) = (&self.config.hard, &self.config.soft);
        BudgetStatus {
            project: project.to_string(),
            daily: WindowStatus::derive(
                BudgetPeriod::Daily,
                keys.key(BudgetPeriod::Daily),
                daily,
                hard.daily,
                soft.daily,
            ),
            monthly: WindowStatus::derive(
                BudgetPeriod::Monthly,
                keys.key(BudgetPeriod::Monthly),
                monthly,
                hard.monthly,
                soft.monthly,
            ),
        }
    }
}

fn validate_cost(what: &str, value: f64) -> Result<(), FreeloaderError> {
    if !value.is_finite() || value < 0.0 {
        return Err(FreeloaderError::Validation(format!(
            "{what} must be a non-negative amount, got {value}"
        )));
    }
    Ok(())
}
