// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost calculation from catalog pricing.
//!
//! Catalog prices are USD per million tokens, split into input and output.

use freeloader_core::{Model, TokenUsage};

/// Actual cost in USD of `usage` on `model`.
///
/// Formula: `tokens_in / 1M * pricing_input + tokens_out / 1M * pricing_output`.
pub fn calculate_cost(model: &Model, usage: &TokenUsage) -> f64 {
    let input = (f64::from(usage.tokens_in) / 1_000_000.0) * model.pricing_input;
    let output = (f64::from(usage.tokens_out) / 1_000_000.0) * model.pricing_output;
    input + output
}
