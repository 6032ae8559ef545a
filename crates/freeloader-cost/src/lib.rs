// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Budget enforcement and pricing for the Freeloader request router.
//!
//! This crate provides:
//! - **Period keys**: calendar-derived daily/monthly ledger keys from one timestamp
//! - **Budget enforcer**: hard-limit admission checks, soft-limit warnings and
//!   usage recording against any [`BudgetStore`](freeloader_core::BudgetStore)
//! - **Memory store**: a lock-free in-process `BudgetStore`
//! - **Pricing**: per-million-token cost calculation

pub mod budget;
pub mod memory;
pub mod period;
pub mod pricing;

pub use budget::{BudgetEnforcer, BudgetStatus, WindowStatus};
pub use memory::MemoryBudgetStore;
pub use period::PeriodKeys;
pub use pricing::calculate_cost;
