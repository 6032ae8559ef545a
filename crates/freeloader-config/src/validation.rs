// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as limit ordering, weight sums and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::{BudgetLimits, FreeloaderConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &FreeloaderConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    let budget = &config.budget;
    check_positive("budget.hard", &budget.hard, &mut invalid);
    check_positive("budget.soft", &budget.soft, &mut invalid);

    if budget.soft.daily > budget.hard.daily {
        invalid(format!(
            "budget.soft.daily ({}) must not exceed budget.hard.daily ({})",
            budget.soft.daily, budget.hard.daily
        ));
    }
    if budget.soft.monthly > budget.hard.monthly {
        invalid(format!(
            "budget.soft.monthly ({}) must not exceed budget.hard.monthly ({})",
            budget.soft.monthly, budget.hard.monthly
        ));
    }
    if budget.hard.monthly < budget.hard.daily {
        invalid(format!(
            "budget.hard.monthly ({}) must be at least budget.hard.daily ({})",
            budget.hard.monthly, budget.hard.daily
        ));
    }

    let routing = &config.routing;
    if let Some(weights) = &routing.weights
        && let Err(e) = weights.validate()
    {
        invalid(format!("routing.weights: {}", strip_prefix(&e.to_string())));
    }
    if let Err(e) = routing.quality_gates.validate() {
        invalid(format!(
            "routing.quality_gates: {}",
            strip_prefix(&e.to_string())
        ));
    }
    let estimate = routing.estimated_request_cost_usd;
    if !estimate.is_finite() || estimate < 0.0 {
        invalid(format!(
            "routing.estimated_request_cost_usd must be non-negative, got {estimate}"
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        invalid("storage.database_path must not be empty".to_string());
    }

    let base_url = config.backend.base_url.trim();
    if base_url.is_empty() {
        invalid("backend.base_url must not be empty".to_string());
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        invalid(format!(
            "backend.base_url `{base_url}` must start with http:// or https://"
        ));
    }
    if config.backend.timeout_secs == 0 {
        invalid("backend.timeout_secs must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_positive(section: &str, limits: &BudgetLimits, invalid: &mut impl FnMut(String)) {
    for (window, value) in [("daily", limits.daily), ("monthly", limits.monthly)] {
        if !value.is_finite() || value <= 0.0 {
            invalid(format!("{section}.{window} must be positive, got {value}"));
        }
    }
}

// Core validation errors render as "invalid request: ..."; keep only the detail.
fn strip_prefix(message: &str) -> &str {
    message.strip_prefix("invalid request: ").unwrap_or(message)
}

#[cfg(test)]
mod tests {
    use freeloader_core::WeightVector;

    use super::*;

    fn messages(config: &FreeloaderConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        let config = FreeloaderConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = FreeloaderConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn non_positive_limits_fail_validation() {
        let mut config = FreeloaderConfig::default();
        config.budget.hard.daily = 0.0;
        config.budget.soft.monthly = -1.0;
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("budget.hard.daily must be positive")));
        assert!(msgs.iter().any(|m| m.contains("budget.soft.monthly must be positive")));
    }

    #[test]
    fn soft_above_hard_fails_validation() {
        let mut config = FreeloaderConfig::default();
        config.budget.soft.daily = 12.0;
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("budget.soft.daily")), "{msgs:?}");
    }

    #[test]
    fn monthly_below_daily_fails_validation() {
        let mut config = FreeloaderConfig::default();
        config.budget.hard.monthly = 8.0;
        config.budget.soft.monthly = 4.0;
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 1, "{msgs:?}");
        assert!(msgs[0].contains("budget.hard.monthly"));
    }

    #[test]
    fn bad_weights_fail_validation() {
        let mut config = FreeloaderConfig::default();
        config.routing.weights = Some(WeightVector {
            cost: 0.6,
            speed: 0.6,
            quality: 0.2,
        });
        let msgs = messages(&config);
        assert!(msgs[0].starts_with("validation error: routing.weights: weights must sum"), "{msgs:?}");
    }

    #[test]
    fn out_of_range_gate_fails_validation() {
        let mut config = FreeloaderConfig::default();
        config.routing.quality_gates.min_intelligence = Some(11);
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("routing.quality_gates")));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = FreeloaderConfig::default();
        config.storage.database_path = " ".to_string();
        config.backend.base_url = "localhost:4000".to_string();
        config.backend.timeout_secs = 0;
        config.routing.estimated_request_cost_usd = -0.5;
        assert_eq!(validate_config(&config).unwrap_err().len(), 4);
    }
}
