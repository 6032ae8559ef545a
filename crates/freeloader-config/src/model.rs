// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Freeloader router.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use freeloader_core::{QualityGates, Strategy, WeightVector};
use serde::{Deserialize, Serialize};

/// Top-level Freeloader configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FreeloaderConfig {
    /// Strategy, weights and quality gate defaults.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Per-project spend limits.
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Completion backend (LiteLLM proxy) settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Routing defaults applied when a request does not say otherwise.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Strategy used when a request names none.
    #[serde(default)]
    pub strategy: Strategy,

    /// Custom weights replacing the balanced preset.
    #[serde(default)]
    pub weights: Option<WeightVector>,

    /// Gates every request starts from; request-level gates override per field.
    #[serde(default = "default_quality_gates")]
    pub quality_gates: QualityGates,

    /// Coarse per-request estimate used for the pre-flight budget check.
    #[serde(default = "default_estimated_request_cost")]
    pub estimated_request_cost_usd: f64,
}

impl RoutingConfig {
    /// Strategy a request runs under: its own if named, else the default.
    pub fn resolve_strategy(&self, requested: Option<Strategy>) -> Strategy {
        requested.unwrap_or(self.strategy)
    }

    /// Configured weights that replace the preset of `strategy`. Only the
    /// balanced preset is overridable; other strategies keep their presets.
    pub fn custom_weights(&self, strategy: Strategy) -> Option<WeightVector> {
        match strategy {
            Strategy::Balanced => self.weights,
            _ => None,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            weights: None,
            quality_gates: default_quality_gates(),
            estimated_request_cost_usd: default_estimated_request_cost(),
        }
    }
}

fn default_quality_gates() -> QualityGates {
    QualityGates {
        min_intelligence: Some(6),
        max_latency_ms: Some(10_000),
        block_local: Some(false),
        ..QualityGates::default()
    }
}

fn default_estimated_request_cost() -> f64 {
    0.10
}

/// Daily and monthly amounts in USD.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetLimits {
    pub daily: f64,
    pub monthly: f64,
}

/// Hard (blocking) and soft (warning) limits, applied per project.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetConfig {
    #[serde(default = "default_hard_limits")]
    pub hard: BudgetLimits,

    #[serde(default = "default_soft_limits")]
    pub soft: BudgetLimits,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            hard: default_hard_limits(),
            soft: default_soft_limits(),
        }
    }
}

fn default_hard_limits() -> BudgetLimits {
    BudgetLimits {
        daily: 10.0,
        monthly: 200.0,
    }
}

fn default_soft_limits() -> BudgetLimits {
    BudgetLimits {
        daily: 5.0,
        monthly: 100.0,
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("freeloader").join("freeloader.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("freeloader.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// OpenAI-compatible completion backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the proxy, without the `/v1` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer key sent with every request.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-attempt timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:4000".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
