// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request routing for the Freeloader proxy.
//!
//! This crate provides:
//! - [`apply_quality_gates`]: hard policy filters over the model catalog
//! - [`score_models`]: normalized cost/speed/quality scoring
//! - [`RankingPolicy`]: strategy weights plus annotated candidate ranking
//! - [`execute_with_fallback`]: ordered, sequential attempts across candidates
//! - [`Router`]: the per-request orchestration of all of the above, with
//!   budget admission, cost accounting and an audit record

pub mod fallback;
pub mod metrics;
pub mod quality_gates;
pub mod router;
pub mod scorer;
pub mod strategy;

pub use fallback::{FallbackSuccess, execute_with_fallback};
pub use quality_gates::{apply_quality_gates, passes_quality_gates, rejection_reason};
pub use router::Router;
pub use scorer::{Benchmarks, ScoredModel, calculate_benchmarks, score_models};
pub use strategy::RankingPolicy;
