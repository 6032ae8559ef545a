// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Freeloader request router.
//!
//! This crate provides the error taxonomy, the shared data types, and the
//! trait seams (`ModelCatalog`, `CompletionBackend`, `BudgetStore`,
//! `UsageLog`) that the router consumes. Concrete implementations live in
//! the storage, cost and backend crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::FreeloaderError;
pub use types::{
    AdapterType, AttemptFailure, BudgetPeriod, Candidate, CompletionOutput, HealthStatus, Model,
    ModelFilter, QualityGates, RouteRequest, RouteResponse, RoutingInfo, ScoreBreakdown, Strategy,
    TokenUsage, UsageRecord, WeightVector,
};

pub use traits::{
    BudgetStore, CompletionBackend, ModelCatalog, PluginAdapter, StorageAdapter, UsageLog,
};
