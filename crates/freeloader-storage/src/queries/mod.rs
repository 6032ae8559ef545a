// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the catalog, the budget ledger and the usage log.

pub mod budgets;
pub mod models;
pub mod usage;
