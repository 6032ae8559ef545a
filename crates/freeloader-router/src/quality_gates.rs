// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hard policy filters applied before any scoring.
//!
//! Every configured gate must pass for a model to stay in the candidate
//! set. Unset gates impose nothing. Filtering is pure: applying the same
//! gates twice yields the same set.

use freeloader_core::{Model, QualityGates};

/// Why `model` fails `gates`, or `None` when it passes all of them.
///
/// Gates are checked in a fixed order (intelligence, speed, local,
/// blocked providers, latency) and the first failure is reported.
pub fn rejection_reason(model: &Model, gates: &QualityGates) -> Option<String> {
    if let Some(min) = gates.min_intelligence
        && model.intelligence < min
    {
        return Some(format!(
            "Intelligence {} < minimum {min}",
            model.intelligence
        ));
    }

    if let Some(min) = gates.min_speed
        && model.speed < min
    {
        return Some(format!("Speed {} < minimum {min}", model.speed));
    }

    if gates.block_local == Some(true) && model.is_local() {
        return Some("Local models blocked".to_string());
    }

    if let Some(blocked) = &gates.blocked_providers
        && blocked.iter().any(|p| *p == model.provider)
    {
        return Some(format!("Provider {} is blocked", model.provider));
    }

    if let Some(max) = gates.max_latency_ms {
        let estimated = model.estimated_latency_ms();
        if estimated > max {
            return Some(format!(
                "Estimated latency {estimated}ms > maximum {max}ms"
            ));
        }
    }

    None
}

/// Whether `model` satisfies every configured gate.
pub fn passes_quality_gates(model: &Model, gates: &QualityGates) -> bool {
    rejection_reason(model, gates).is_none()
}

/// Keep only the models that pass `gates`, preserving input order.
pub fn apply_quality_gates(models: Vec<Model>, gates: &QualityGates) -> Vec<Model> {
    models
        .into_iter()
        .filter(|model| match rejection_reason(model, gates) {
            Some(reason) => {
                tracing::debug!(model = %model.id(), %reason, "model rejected by quality gates");
                false
            }
            None => true,
        })
        .collect()
}
