// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Freeloader - a cost-aware LLM request router.
//!
//! Wires configuration, SQLite storage, budget enforcement and the
//! LiteLLM backend into one ready [`Router`].

use std::sync::Arc;

use freeloader_config::model::{FreeloaderConfig, LoggingConfig};
use freeloader_core::{
    BudgetStore, CompletionBackend, FreeloaderError, HealthStatus, ModelCatalog, PluginAdapter,
    RouteRequest, RouteResponse, StorageAdapter, UsageLog,
};
use freeloader_cost::{BudgetEnforcer, BudgetStatus};
use freeloader_litellm::LiteLlmBackend;
use freeloader_router::Router;
use freeloader_storage::SqliteStorage;
use serde::Serialize;
use tracing::{info, warn};

/// Health of each adapter, rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub storage: String,
    pub backend: String,
    pub healthy: bool,
}

/// A fully assembled router with its storage and backend.
pub struct Freeloader {
    router: Arc<Router>,
    storage: Arc<SqliteStorage>,
    backend: Arc<LiteLlmBackend>,
    config: FreeloaderConfig,
}

impl Freeloader {
    /// Open storage, build the backend client and assemble the router.
    pub async fn from_config(config: FreeloaderConfig) -> Result<Self, FreeloaderError> {
        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;

        let backend = Arc::new(LiteLlmBackend::new(&config.backend)?);

        let ledger: Arc<dyn BudgetStore> = Arc::clone(&storage) as Arc<dyn BudgetStore>;
        let enforcer = Arc::new(BudgetEnforcer::new(ledger, config.budget.clone()));
        let router = Arc::new(Router::new(
            Arc::clone(&storage) as Arc<dyn ModelCatalog>,
            Arc::clone(&backend) as Arc<dyn CompletionBackend>,
            enforcer,
            Arc::clone(&storage) as Arc<dyn UsageLog>,
            config.routing.clone(),
        ));
        freeloader_router::metrics::register_metrics();

        info!(
            strategy = %config.routing.strategy,
            database = %config.storage.database_path,
            backend = %config.backend.base_url,
            "freeloader ready"
        );

        Ok(Self {
            router,
            storage,
            backend,
            config,
        })
    }

    /// Shared handle to the router, for serving concurrent requests.
    pub fn router(&self) -> Arc<Router> {
        Arc::clone(&self.router)
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn backend(&self) -> &LiteLlmBackend {
        &self.backend
    }

    pub fn config(&self) -> &FreeloaderConfig {
        &self.config
    }

    pub async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, FreeloaderError> {
        self.router.route(request).await
    }

    pub async fn budget_status(&self, project: &str) -> Result<BudgetStatus, FreeloaderError> {
        self.router.budget().status(project).await
    }

    /// Check storage and backend health. Errors from a check are reported
    /// as unhealthy rather than returned.
    pub async fn health(&self) -> HealthReport {
        let storage = describe(self.storage.health_check().await);
        let backend = describe(self.backend.health_check().await);
        HealthReport {
            healthy: storage.0 && backend.0,
            storage: storage.1,
            backend: backend.1,
        }
    }

    /// Flush storage. Safe to call more than once.
    pub async fn shutdown(&self) -> Result<(), FreeloaderError> {
        self.backend.shutdown().await?;
        self.storage.shutdown().await?;
        info!("freeloader shut down");
        Ok(())
    }
}

fn describe(result: Result<HealthStatus, FreeloaderError>) -> (bool, String) {
    match result {
        Ok(HealthStatus::Healthy) => (true, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (false, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => (false, format!("unhealthy: {reason}")),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (false, format!("unhealthy: {e}"))
        }
    }
}

/// Initializes the tracing subscriber at the configured level.
///
/// `RUST_LOG` takes precedence when set. Calling this twice is a no-op.
pub fn init_tracing(logging: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("freeloader={},warn", logging.level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
