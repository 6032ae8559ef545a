// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit sink for routed requests.

use async_trait::async_trait;

use crate::error::FreeloaderError;
use crate::types::UsageRecord;

#[async_trait]
pub trait UsageLog: Send + Sync {
    /// Persist one audit record.
    async fn log(&self, record: &UsageRecord) -> Result<(), FreeloaderError>;
}
