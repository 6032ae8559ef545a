// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the catalog, router, ledger and backend client.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::error::FreeloaderError;

/// Project name used when a request does not name one.
pub const DEFAULT_PROJECT: &str = "default";

/// Completion length used when a request does not set `max_tokens`.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Upper bound accepted for a request's `max_tokens`.
pub const MAX_TOKENS_LIMIT: u32 = 100_000;

/// Allowed drift of a weight vector's sum away from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Provider name reserved for locally hosted models.
pub const LOCAL_PROVIDER: &str = "local";

/// A backend model and its static routing attributes.
///
/// Pricing is expressed in USD per million tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub provider: String,
    pub name: String,
    /// Intelligence rating, 1 (weakest) to 10 (strongest).
    pub intelligence: u8,
    /// Speed rating, 1 (slowest) to 10 (fastest).
    pub speed: u8,
    pub context_window: u32,
    pub pricing_input: f64,
    pub pricing_output: f64,
    #[serde(default)]
    pub free_tier_tokens: Option<u64>,
    #[serde(default)]
    pub free_tier_period: Option<String>,
}

impl Model {
    /// `provider/name`, the identifier the completion backend expects.
    pub fn id(&self) -> String {
        format!("{}/{}", self.provider, self.name)
    }

    /// Whether the model runs on the local provider.
    pub fn is_local(&self) -> bool {
        self.provider == LOCAL_PROVIDER
    }

    /// Rough latency estimate derived from the speed rating:
    /// speed 10 is about one second, speed 1 about ten.
    pub fn estimated_latency_ms(&self) -> u64 {
        u64::from(11u8.saturating_sub(self.speed)) * 1000
    }
}

/// Sub-scores that make up a candidate's final score, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub cost: f64,
    pub speed: f64,
    pub quality: f64,
}

/// A model annotated with its score and rank for one routing decision.
///
/// Built fresh for every request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub model: Model,
    pub score: f64,
    pub scoring_breakdown: ScoreBreakdown,
    pub routing_reason: String,
    /// 1-based position in the ranked list.
    pub rank: usize,
}

/// Relative importance of cost, speed and quality when scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightVector {
    pub cost: f64,
    pub speed: f64,
    pub quality: f64,
}

impl WeightVector {
    /// Build a weight vector, rejecting out-of-range components or a sum
    /// further than [`WEIGHT_SUM_TOLERANCE`] from 1.0.
    pub fn new(cost: f64, speed: f64, quality: f64) -> Result<Self, FreeloaderError> {
        let weights = Self {
            cost,
            speed,
            quality,
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Check component ranges and the sum constraint.
    pub fn validate(&self) -> Result<(), FreeloaderError> {
        for (name, value) in [
            ("cost", self.cost),
            ("speed", self.speed),
            ("quality", self.quality),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(FreeloaderError::Validation(format!(
                    "weight `{name}` must be within [0, 1], got {value}"
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(FreeloaderError::Validation(format!(
                "weights must sum to 1.0 (±{WEIGHT_SUM_TOLERANCE}), got {sum:.3}"
            )));
        }
        Ok(())
    }

    pub fn sum(&self) -> f64 {
        self.cost + self.speed + self.quality
    }
}

/// Named optimization policy. Closed set: adding one means adding a variant
/// and its weights in [`Strategy::weights`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    VariantNames,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    Balanced,
    CostFirst,
    SpeedFirst,
    QualityFirst,
}

impl Strategy {
    /// The fixed preset weights for this strategy.
    pub fn weights(self) -> WeightVector {
        let (cost, speed, quality) = match self {
            Strategy::Balanced => (0.4, 0.4, 0.2),
            Strategy::CostFirst => (0.7, 0.2, 0.1),
            Strategy::SpeedFirst => (0.1, 0.7, 0.2),
            Strategy::QualityFirst => (0.1, 0.2, 0.7),
        };
        WeightVector {
            cost,
            speed,
            quality,
        }
    }

    /// Parse a strategy name. Unknown names are a validation error, never a
    /// silent fallback to the default.
    pub fn parse(name: &str) -> Result<Self, FreeloaderError> {
        name.parse().map_err(|_| {
            FreeloaderError::Validation(format!(
                "unknown strategy `{name}`; expected one of: {}",
                <Strategy as VariantNames>::VARIANTS.join(", ")
            ))
        })
    }
}

/// Hard policy constraints that remove candidates outright.
///
/// Every field is optional; an absent field imposes no constraint. Used both
/// for configured defaults and for per-request overrides (see [`merge`]).
///
/// [`merge`]: QualityGates::merge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QualityGates {
    #[serde(default, alias = "minIntelligence")]
    pub min_intelligence: Option<u8>,
    #[serde(default, alias = "minSpeed")]
    pub min_speed: Option<u8>,
    /// Maximum estimated latency in milliseconds.
    #[serde(default, alias = "maxLatency", alias = "max_latency")]
    pub max_latency_ms: Option<u64>,
    #[serde(default, alias = "blockLocal")]
    pub block_local: Option<bool>,
    #[serde(default, alias = "blockedProviders")]
    pub blocked_providers: Option<Vec<String>>,
}

impl QualityGates {
    /// Overlay `overrides` onto `self`, field by field. A field set in
    /// `overrides` wins; an unset field keeps the value from `self`.
    pub fn merge(&self, overrides: &QualityGates) -> QualityGates {
        QualityGates {
            min_intelligence: overrides.min_intelligence.or(self.min_intelligence),
            min_speed: overrides.min_speed.or(self.min_speed),
            max_latency_ms: overrides.max_latency_ms.or(self.max_latency_ms),
            block_local: overrides.block_local.or(self.block_local),
            blocked_providers: overrides
                .blocked_providers
                .clone()
                .or_else(|| self.blocked_providers.clone()),
        }
    }

    /// Range-check the rating gates.
    pub fn validate(&self) -> Result<(), FreeloaderError> {
        for (name, value) in [
            ("min_intelligence", self.min_intelligence),
            ("min_speed", self.min_speed),
        ] {
            if let Some(v) = value
                && !(1..=10).contains(&v)
            {
                return Err(FreeloaderError::Validation(format!(
                    "quality gate `{name}` must be between 1 and 10, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// An inbound completion request, the single input of `Router::route`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteRequest {
    pub prompt: String,
    #[serde(default)]
    pub strategy: Option<Strategy>,
    #[serde(default, alias = "qualityGates")]
    pub quality_gates: Option<QualityGates>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl RouteRequest {
    /// A request with only a prompt; everything else defaulted.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Decode a JSON request body. Unknown fields and unknown strategy names
    /// are validation errors.
    pub fn from_json(body: &str) -> Result<Self, FreeloaderError> {
        let request: Self = serde_json::from_str(body)
            .map_err(|e| FreeloaderError::Validation(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    /// Check the request before any candidate is touched.
    pub fn validate(&self) -> Result<(), FreeloaderError> {
        if self.prompt.trim().is_empty() {
            return Err(FreeloaderError::Validation(
                "prompt must not be empty".to_string(),
            ));
        }
        if let Some(max_tokens) = self.max_tokens
            && !(1..=MAX_TOKENS_LIMIT).contains(&max_tokens)
        {
            return Err(FreeloaderError::Validation(format!(
                "max_tokens must be between 1 and {MAX_TOKENS_LIMIT}, got {max_tokens}"
            )));
        }
        if let Some(project) = &self.project
            && project.trim().is_empty()
        {
            return Err(FreeloaderError::Validation(
                "project must not be empty when set".to_string(),
            ));
        }
        if let Some(gates) = &self.quality_gates {
            gates.validate()?;
        }
        Ok(())
    }

    pub fn project(&self) -> &str {
        self.project.as_deref().unwrap_or(DEFAULT_PROJECT)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

/// Token counts measured by the completion backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub tokens_in: u32,
    pub tokens_out: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        u64::from(self.tokens_in) + u64::from(self.tokens_out)
    }
}

/// The outcome of one successful attempt against the completion backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOutput {
    pub text: String,
    pub usage: TokenUsage,
    pub latency_ms: u64,
}

/// Which candidate served a request, and how it got there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingInfo {
    pub provider: String,
    pub model: String,
    pub rank: usize,
    pub total_candidates: usize,
    pub attempts: usize,
    pub reason: String,
}

/// A fully completed routed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub text: String,
    pub usage: TokenUsage,
    pub routing: RoutingInfo,
    /// Actual cost in USD, computed from the serving model's pricing.
    pub cost: f64,
    /// Wall-clock time spent across all attempts, in milliseconds.
    pub total_latency_ms: u64,
}

/// One failed attempt captured by the fallback executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptFailure {
    pub provider: String,
    pub model: String,
    pub error: String,
    pub rank: usize,
}

/// Budget window.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Daily,
    Monthly,
}

/// One audit row describing a routed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    pub provider: String,
    pub model: String,
    pub project: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
    pub cost_usd: f64,
    pub latency_ms: u64,
    pub success: bool,
    pub routing_reason: Option<String>,
    pub error_message: Option<String>,
}

/// Optional constraints when listing catalog models.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelFilter {
    pub provider: Option<String>,
    pub min_intelligence: Option<u8>,
    pub min_speed: Option<u8>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`PluginAdapter`](crate::PluginAdapter).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Backend,
}
