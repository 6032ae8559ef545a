// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only source of candidate models.

use async_trait::async_trait;

use crate::error::FreeloaderError;
use crate::types::{Model, ModelFilter};

#[async_trait]
pub trait ModelCatalog: Send + Sync {
    /// All models matching `filter`, ordered by intelligence then speed, both descending.
    async fn get_all(&self, filter: &ModelFilter) -> Result<Vec<Model>, FreeloaderError>;

    /// A single model by provider and name.
    async fn get(&self, provider: &str, name: &str) -> Result<Option<Model>, FreeloaderError>;
}
