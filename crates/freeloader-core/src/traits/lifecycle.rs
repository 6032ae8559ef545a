// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity and lifecycle of the concrete collaborators (the SQLite store,
//! the LiteLLM backend) that the router reaches through trait objects.

use async_trait::async_trait;

use crate::error::FreeloaderError;
use crate::types::{AdapterType, HealthStatus};

#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Short name shown in health reports, e.g. `sqlite` or `litellm`.
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    fn adapter_type(&self) -> AdapterType;

    /// Probe the dependency. An `Err` means the probe itself could not run;
    /// a reachable but struggling dependency reports `Degraded`.
    async fn health_check(&self) -> Result<HealthStatus, FreeloaderError>;

    /// Release held resources. Stateless adapters keep this default.
    async fn shutdown(&self) -> Result<(), FreeloaderError> {
        Ok(())
    }
}

/// A persistence backend. It must be initialized once before any query
/// and closed with pending writes flushed.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Open the database and apply pending migrations. Fails if called twice.
    async fn initialize(&self) -> Result<(), FreeloaderError>;

    async fn close(&self) -> Result<(), FreeloaderError>;
}
