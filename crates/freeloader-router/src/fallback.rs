// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered fallback across ranked candidates.
//!
//! Candidates are attempted strictly one at a time in rank order. The first
//! success wins and no further candidates are tried. A failure moves on to
//! the next candidate; when every candidate fails, the per-candidate errors
//! are returned together.

use std::future::Future;

use freeloader_core::{AttemptFailure, Candidate, FreeloaderError, RoutingInfo};
use tracing::{info, warn};

use crate::metrics;

/// Result of a successful fallback run.
#[derive(Debug, Clone)]
pub struct FallbackSuccess<T> {
    pub output: T,
    pub routing: RoutingInfo,
    /// Failures of the candidates tried before the winner.
    pub failures: Vec<AttemptFailure>,
}

/// Try `execute` on each candidate in order until one succeeds.
///
/// Each attempt receives its own copy of the candidate. Fails with
/// [`FreeloaderError::NoProvidersAvailable`] when `candidates` is empty or
/// when all attempts fail; in the latter case the error carries one
/// [`AttemptFailure`] per candidate.
pub async fn execute_with_fallback<T, F, Fut>(
    candidates: &[Candidate],
    mut execute: F,
) -> Result<FallbackSuccess<T>, FreeloaderError>
where
    F: FnMut(Candidate) -> Fut,
    Fut: Future<Output = Result<T, FreeloaderError>>,
{
    if candidates.is_empty() {
        return Err(FreeloaderError::no_providers("no candidates to try"));
    }

    let total = candidates.len();
    let mut failures = Vec::new();

    for (i, candidate) in candidates.iter().enumerate() {
        let attempt = i + 1;
        match execute(candidate.clone()).await {
            Ok(output) => {
                if attempt > 1 {
                    info!(
                        model = %candidate.model.id(),
                        attempt,
                        total,
                        "fallback candidate succeeded"
                    );
                }
                return Ok(FallbackSuccess {
                    output,
                    routing: RoutingInfo {
                        provider: candidate.model.provider.clone(),
                        model: candidate.model.name.clone(),
                        rank: attempt,
                        total_candidates: total,
                        attempts: attempt,
                        reason: candidate.routing_reason.clone(),
                    },
                    failures,
                });
            }
            Err(e) => {
                warn!(
                    model = %candidate.model.id(),
                    attempt,
                    total,
                    error = %e,
                    "candidate failed, trying next"
                );
                metrics::record_attempt_failure(&candidate.model.provider);
                failures.push(AttemptFailure {
                    provider: candidate.model.provider.clone(),
                    model: candidate.model.name.clone(),
                    error: e.to_string(),
                    rank: attempt,
                });
            }
        }
    }

    Err(FreeloaderError::NoProvidersAvailable {
        reason: format!("all {total} candidates failed"),
        failures,
    })
}
