// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing metrics via the `metrics` facade.
//!
//! Without an installed recorder every call here is a no-op.

use ::metrics::{describe_counter, describe_gauge, describe_histogram};

/// Register descriptions for all routing metrics.
///
/// Call once at startup, after a recorder has been installed.
pub fn register_metrics() {
    describe_counter!(
        "freeloader_routes_total",
        "Total routed requests by outcome"
    );
    describe_counter!(
        "freeloader_attempt_failures_total",
        "Failed completion attempts by provider"
    );
    describe_counter!(
        "freeloader_tokens_total",
        "Tokens processed by provider and direction"
    );
    describe_gauge!(
        "freeloader_cost_usd_total",
        "Accumulated request cost in USD by provider"
    );
    describe_histogram!(
        "freeloader_route_latency_seconds",
        "End-to-end routing latency including fallback attempts"
    );
}

/// Record a finished routing decision. `outcome` is `success`, `rejected`
/// or `exhausted`.
pub fn record_route(outcome: &str) {
    ::metrics::counter!("freeloader_routes_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_attempt_failure(provider: &str) {
    ::metrics::counter!("freeloader_attempt_failures_total", "provider" => provider.to_string())
        .increment(1);
}

/// Record tokens and cost for a completed request.
pub fn record_completion(provider: &str, tokens_in: u32, tokens_out: u32, cost_usd: f64) {
    ::metrics::counter!("freeloader_tokens_total", "provider" => provider.to_string(), "direction" => "in")
        .increment(u64::from(tokens_in));
    ::metrics::counter!("freeloader_tokens_total", "provider" => provider.to_string(), "direction" => "out")
        .increment(u64::from(tokens_out));
    ::metrics::gauge!("freeloader_cost_usd_total", "provider" => provider.to_string()).increment(cost_usd);
}

pub fn record_route_latency(secs: f64) {
    ::metrics::histogram!("freeloader_route_latency_seconds").record(secs);
}
