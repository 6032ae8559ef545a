// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request routing orchestration.
//!
//! A request goes through catalog lookup, quality gates, budget admission,
//! ranking, ordered fallback execution, cost accounting and an audit
//! record. The request either completes with exactly one response or
//! fails with exactly one error.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use freeloader_config::model::RoutingConfig;
use freeloader_core::{
    Candidate, CompletionBackend, FreeloaderError, ModelCatalog, ModelFilter, RouteRequest,
    RouteResponse, UsageLog, UsageRecord,
};
use freeloader_cost::{BudgetEnforcer, calculate_cost};
use tracing::{debug, info, warn};

use crate::fallback::execute_with_fallback;
use crate::metrics;
use crate::quality_gates::apply_quality_gates;
use crate::strategy::RankingPolicy;

/// Routes completion requests across the model catalog.
pub struct Router {
    catalog: Arc<dyn ModelCatalog>,
    backend: Arc<dyn CompletionBackend>,
    budget: Arc<BudgetEnforcer>,
    usage_log: Arc<dyn UsageLog>,
    config: RoutingConfig,
}

impl Router {
    pub fn new(
        catalog: Arc<dyn ModelCatalog>,
        backend: Arc<dyn CompletionBackend>,
        budget: Arc<BudgetEnforcer>,
        usage_log: Arc<dyn UsageLog>,
        config: RoutingConfig,
    ) -> Self {
        Self {
            catalog,
            backend,
            budget,
            usage_log,
            config,
        }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn budget(&self) -> &BudgetEnforcer {
        &self.budget
    }

    /// The ranking policy for `request`. The strategy is the request's own
    /// or the configured default; configured weights replace the balanced
    /// preset however balanced was chosen.
    pub fn policy_for(&self, request: &RouteRequest) -> Result<RankingPolicy, FreeloaderError> {
        let strategy = self.config.resolve_strategy(request.strategy);
        match self.config.custom_weights(strategy) {
            Some(weights) => RankingPolicy::custom(weights),
            None => Ok(RankingPolicy::for_strategy(strategy)),
        }
    }

    /// Ranked candidates for `request` without executing anything or
    /// touching the budget.
    pub async fn select_candidates(
        &self,
        request: &RouteRequest,
    ) -> Result<Vec<Candidate>, FreeloaderError> {
        request.validate()?;
        let models = self.catalog.get_all(&ModelFilter::default()).await?;
        if models.is_empty() {
            return Err(FreeloaderError::no_providers("No models configured"));
        }

        let gates = match &request.quality_gates {
            Some(overrides) => self.config.quality_gates.merge(overrides),
            None => self.config.quality_gates.clone(),
        };
        let total = models.len();
        let eligible = apply_quality_gates(models, &gates);
        if eligible.is_empty() {
            return Err(FreeloaderError::no_providers(format!(
                "all {total} models were filtered out by quality gates"
            )));
        }
        debug!(total, eligible = eligible.len(), "quality gates applied");

        let policy = self.policy_for(request)?;
        Ok(policy.rank(eligible))
    }

    /// Route `request` at the current instant.
    pub async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, FreeloaderError> {
        self.route_at(request, Utc::now()).await
    }

    /// Route `request` with budget windows and the audit timestamp pinned
    /// to `now`.
    pub async fn route_at(
        &self,
        request: &RouteRequest,
        now: DateTime<Utc>,
    ) -> Result<RouteResponse, FreeloaderError> {
        let started = Instant::now();
        let result = self.route_inner(request, now, started).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(FreeloaderError::NoProvidersAvailable { failures, .. }) if !failures.is_empty() => {
                "exhausted"
            }
            Err(_) => "rejected",
        };
        metrics::record_route(outcome);
        metrics::record_route_latency(started.elapsed().as_secs_f64());
        result
    }

    async fn route_inner(
        &self,
        request: &RouteRequest,
        now: DateTime<Utc>,
        started: Instant,
    ) -> Result<RouteResponse, FreeloaderError> {
        let candidates = self.select_candidates(request).await?;
        let project = request.project();

        self.budget
            .check_budget_at(project, self.config.estimated_request_cost_usd, now)
            .await?;

        info!(
            project,
            candidates = candidates.len(),
            top = %candidates[0].model.id(),
            "routing request"
        );

        let backend = &self.backend;
        let outcome = execute_with_fallback(&candidates, |candidate| async move {
            backend.execute(&candidate, request).await
        })
        .await;

        let success = match outcome {
            Ok(success) => success,
            Err(err) => {
                self.audit_failure(&candidates[0], project, &err, now, started)
                    .await;
                return Err(err);
            }
        };

        let winner = &candidates[success.routing.rank - 1];
        let output = success.output;
        let cost = calculate_cost(&winner.model, &output.usage);

        self.budget.record_usage_at(project, cost, now).await?;
        // Failed attempts count toward latency, not just the winning one.
        let total_latency_ms = elapsed_ms(started);
        self.usage_log
            .log(&UsageRecord {
                timestamp: now.timestamp(),
                provider: winner.model.provider.clone(),
                model: winner.model.name.clone(),
                project: project.to_string(),
                tokens_in: output.usage.tokens_in,
                tokens_out: output.usage.tokens_out,
                cost_usd: cost,
                latency_ms: total_latency_ms,
                success: true,
                routing_reason: Some(winner.routing_reason.clone()),
                error_message: None,
            })
            .await?;

        metrics::record_completion(
            &winner.model.provider,
            output.usage.tokens_in,
            output.usage.tokens_out,
            cost,
        );

        info!(
            project,
            model = %winner.model.id(),
            attempts = success.routing.attempts,
            tokens = output.usage.total(),
            cost,
            total_latency_ms,
            "request routed"
        );

        Ok(RouteResponse {
            text: output.text,
            usage: output.usage,
            routing: success.routing,
            cost,
            total_latency_ms,
        })
    }

    /// Write a failed audit row for an exhausted fallback chain. A failure
    /// to write is logged; the routing error is what the caller sees.
    async fn audit_failure(
        &self,
        top: &Candidate,
        project: &str,
        err: &FreeloaderError,
        now: DateTime<Utc>,
        started: Instant,
    ) {
        let record = UsageRecord {
            timestamp: now.timestamp(),
            provider: top.model.provider.clone(),
            model: top.model.name.clone(),
            project: project.to_string(),
            tokens_in: 0,
            tokens_out: 0,
            cost_usd: 0.0,
            latency_ms: elapsed_ms(started),
            success: false,
            routing_reason: Some(top.routing_reason.clone()),
            error_message: Some(err.to_string()),
        };
        if let Err(log_err) = self.usage_log.log(&record).await {
            warn!(project, error = %log_err, "failed to write failure audit record");
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
