// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalized multi-criteria scoring.
//!
//! Each model gets three sub-scores in `[0, 1]`:
//! - cost: `1` for free models, otherwise `1 - input_price / max_input_price`
//!   where the maximum is taken over the models being scored
//! - speed: `speed / 10`
//! - quality: `intelligence / 10`
//!
//! The final score is the weighted sum, clamped to `[0, 1]`.

use freeloader_core::{Model, ScoreBreakdown, WeightVector};
use tracing::debug;

/// Fallback maximum input price when no model in the set has a positive price.
pub const DEFAULT_MAX_COST: f64 = 100.0;

/// Rating scale ceiling for speed and intelligence.
const RATING_SCALE: f64 = 10.0;

/// Per-set maxima used for normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Benchmarks {
    pub max_cost: f64,
    pub max_speed: u8,
    pub max_intelligence: u8,
}

impl Default for Benchmarks {
    fn default() -> Self {
        Self {
            max_cost: DEFAULT_MAX_COST,
            max_speed: 10,
            max_intelligence: 10,
        }
    }
}

/// A model with its final score and sub-scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredModel {
    pub model: Model,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Compute normalization maxima over `models`.
///
/// Speed and intelligence maxima are informational: ratings are normalized
/// against the fixed 1-10 scale so that scores are comparable across
/// requests with different candidate sets.
pub fn calculate_benchmarks(models: &[Model]) -> Benchmarks {
    if models.is_empty() {
        return Benchmarks::default();
    }
    let max_cost = models
        .iter()
        .map(|m| m.pricing_input)
        .filter(|p| *p > 0.0)
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))))
        .unwrap_or(DEFAULT_MAX_COST);
    Benchmarks {
        max_cost,
        max_speed: models.iter().map(|m| m.speed).max().unwrap_or(10),
        max_intelligence: models.iter().map(|m| m.intelligence).max().unwrap_or(10),
    }
}

/// Sub-scores for one model against `benchmarks`.
pub fn score_breakdown(model: &Model, benchmarks: &Benchmarks) -> ScoreBreakdown {
    let cost = if model.pricing_input == 0.0 {
        1.0
    } else {
        1.0 - model.pricing_input / benchmarks.max_cost
    };
    ScoreBreakdown {
        cost,
        speed: f64::from(model.speed) / RATING_SCALE,
        quality: f64::from(model.intelligence) / RATING_SCALE,
    }
}

/// Weighted score in `[0, 1]`.
fn weighted(breakdown: &ScoreBreakdown, weights: &WeightVector) -> f64 {
    let raw = breakdown.cost * weights.cost
        + breakdown.speed * weights.speed
        + breakdown.quality * weights.quality;
    // f64::max discards NaN, so a degenerate input still lands in range.
    raw.max(0.0).min(1.0)
}

/// Score every model and sort by descending score. The sort is stable:
/// equal scores keep their input order.
pub fn score_models(models: Vec<Model>, weights: &WeightVector) -> Vec<ScoredModel> {
    let benchmarks = calculate_benchmarks(&models);
    debug!(
        max_cost = benchmarks.max_cost,
        max_speed = benchmarks.max_speed,
        max_intelligence = benchmarks.max_intelligence,
        count = models.len(),
        "scoring candidates"
    );
    let mut scored: Vec<ScoredModel> = models
        .into_iter()
        .map(|model| {
            let breakdown = score_breakdown(&model, &benchmarks);
            ScoredModel {
                score: weighted(&breakdown, weights),
                breakdown,
                model,
            }
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
