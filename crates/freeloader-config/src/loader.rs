// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./freeloader.toml` > `~/.config/freeloader/freeloader.toml`
//! > `/etc/freeloader/freeloader.toml` with environment variable overrides via
//! `FREELOADER_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FreeloaderConfig;

pub(crate) const LOCAL_CONFIG: &str = "freeloader.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/freeloader/freeloader.toml";

/// Env key prefixes (prefix stripped, lowercased) and the dotted path they map to.
/// Longer prefixes come first so nested sections win over their parents.
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("routing_quality_gates_", "routing.quality_gates."),
    ("routing_weights_", "routing.weights."),
    ("routing_", "routing."),
    ("budget_hard_", "budget.hard."),
    ("budget_soft_", "budget.soft."),
    ("storage_", "storage."),
    ("backend_", "backend."),
    ("logging_", "logging."),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/freeloader/freeloader.toml` (system-wide)
/// 3. `~/.config/freeloader/freeloader.toml` (user XDG config)
/// 4. `./freeloader.toml` (local directory)
/// 5. `FREELOADER_*` environment variables
pub fn load_config() -> Result<FreeloaderConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FreeloaderConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FreeloaderConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FreeloaderConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FreeloaderConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FreeloaderConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("freeloader").join(LOCAL_CONFIG))
}

/// Map a prefix-stripped, lowercased env key to its dotted config path.
///
/// Uses explicit section prefixes instead of splitting on `_`, so
/// `FREELOADER_BUDGET_HARD_DAILY` maps to `budget.hard.daily` and
/// `FREELOADER_ROUTING_ESTIMATED_REQUEST_COST_USD` keeps its underscores.
pub fn map_env_key(key: &str) -> String {
    ENV_SECTIONS
        .iter()
        .find_map(|(prefix, section)| {
            key.strip_prefix(prefix)
                .map(|rest| format!("{section}{rest}"))
        })
        .unwrap_or_else(|| key.to_string())
}

fn env_provider() -> Env {
    Env::prefixed("FREELOADER_").map(|key| map_env_key(key.as_str()).into())
}
