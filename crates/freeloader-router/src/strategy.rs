// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ranking policies: a weight vector plus a human-readable label used in
//! routing reasons.

use freeloader_core::{Candidate, FreeloaderError, Model, Strategy, WeightVector};

use crate::scorer::score_models;

/// Turns a filtered model list into ranked, annotated candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingPolicy {
    label: String,
    weights: WeightVector,
}

impl RankingPolicy {
    /// The preset policy for a named strategy.
    pub fn for_strategy(strategy: Strategy) -> Self {
        Self {
            label: strategy_label(strategy).to_string(),
            weights: strategy.weights(),
        }
    }

    /// A policy with caller-supplied weights. Weights are validated.
    pub fn custom(weights: WeightVector) -> Result<Self, FreeloaderError> {
        weights.validate()?;
        Ok(Self {
            label: "Custom".to_string(),
            weights,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// Score, sort and annotate `models`. Ranks are 1-based and follow the
    /// sorted order.
    pub fn rank(&self, models: Vec<Model>) -> Vec<Candidate> {
        let scored = score_models(models, &self.weights);
        let total = scored.len();
        scored
            .into_iter()
            .enumerate()
            .map(|(i, scored)| {
                let rank = i + 1;
                let b = scored.breakdown;
                Candidate {
                    routing_reason: format!(
                        "{} strategy (rank {rank}/{total}): cost={:.2}, speed={:.2}, quality={:.2}, score={:.3}",
                        self.label, b.cost, b.speed, b.quality, scored.score
                    ),
                    model: scored.model,
                    score: scored.score,
                    scoring_breakdown: b,
                    rank,
                }
            })
            .collect()
    }
}

fn strategy_label(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::Balanced => "Balanced",
        Strategy::CostFirst => "Cost-first",
        Strategy::SpeedFirst => "Speed-first",
        Strategy::QualityFirst => "Quality-first",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str, intelligence: u8, speed: u8, price: f64) -> Model {
        Model {
            provider: "p".into(),
            name: name.into(),
            intelligence,
            speed,
            context_window: 8_000,
            pricing_input: price,
            pricing_output: price,
            free_tier_tokens: None,
            free_tier_period: None,
        }
    }

    fn catalog() -> Vec<Model> {
        vec![
            model("cheap-slow", 6, 3, 0.0),
            model("pricey-fast", 7, 10, 10.0),
            model("smart", 10, 5, 5.0),
        ]
    }

    #[test]
    fn balanced_reason_format() {
        let ranked = RankingPolicy::for_strategy(Strategy::Balanced).rank(vec![model("m", 7, 10, 0.0)]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(
            ranked[0].routing_reason,
            "Balanced strategy (rank 1/1): cost=1.00, speed=1.00, quality=0.70, score=0.940"
        );
    }

    #[test]
    fn each_strategy_picks_its_favourite() {
        let top = |s: Strategy| {
            RankingPolicy::for_strategy(s).rank(catalog())[0]
                .model
                .name
                .clone()
        };
        assert_eq!(top(Strategy::CostFirst), "cheap-slow");
        assert_eq!(top(Strategy::SpeedFirst), "pricey-fast");
        assert_eq!(top(Strategy::QualityFirst), "smart");
    }

    #[test]
    fn ranks_are_contiguous_and_labelled() {
        let ranked = RankingPolicy::for_strategy(Strategy::CostFirst).rank(catalog());
        let ranks: Vec<_> = ranked.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert!(ranked[2].routing_reason.starts_with("Cost-first strategy (rank 3/3)"));
    }

    #[test]
    fn custom_weights_are_validated() {
        let bad = WeightVector {
            cost: 0.5,
            speed: 0.5,
            quality: 0.5,
        };
        assert!(RankingPolicy::custom(bad).is_err());

        let policy = RankingPolicy::custom(WeightVector {
            cost: 0.0,
            speed: 0.0,
            quality: 1.0,
        })
        .unwrap();
        assert_eq!(policy.label(), "Custom");
        assert_eq!(policy.rank(catalog())[0].model.name, "smart");
    }

    #[test]
    fn empty_input_ranks_nothing() {
        assert!(RankingPolicy::for_strategy(Strategy::Balanced).rank(Vec::new()).is_empty());
    }
}
