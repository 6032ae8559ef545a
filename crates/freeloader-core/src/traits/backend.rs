// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The completion operation the fallback executor drives.

use async_trait::async_trait;

use crate::error::FreeloaderError;
use crate::types::{Candidate, CompletionOutput, RouteRequest};

/// Executes one completion attempt against one candidate model.
///
/// Any per-attempt timeout is the implementation's responsibility; the
/// router never cancels an attempt.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn execute(
        &self,
        candidate: &Candidate,
        request: &RouteRequest,
    ) -> Result<CompletionOutput, FreeloaderError>;
}
