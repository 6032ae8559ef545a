// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the router and its collaborators.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility, so the
//! router can hold each collaborator as an `Arc<dyn Trait>`.

pub mod backend;
pub mod budget;
pub mod catalog;
pub mod lifecycle;
pub mod usage;

pub use backend::CompletionBackend;
pub use budget::BudgetStore;
pub use catalog::ModelCatalog;
pub use lifecycle::{PluginAdapter, StorageAdapter};
pub use usage::UsageLog;
