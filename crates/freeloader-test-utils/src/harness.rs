// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end routing tests.
//!
//! `TestHarness` assembles a complete router over a temp SQLite database
//! (catalog, budget ledger and usage log) with a [`MockBackend`] in place
//! of the proxy.

use std::sync::Arc;

use freeloader_config::model::{BudgetConfig, FreeloaderConfig, RoutingConfig, StorageConfig};
use freeloader_core::{
    BudgetStore, CompletionBackend, FreeloaderError, Model, ModelCatalog, ModelFilter,
    RouteRequest, RouteResponse, StorageAdapter, UsageLog,
};
use freeloader_cost::BudgetEnforcer;
use freeloader_router::Router;
use freeloader_storage::SqliteStorage;

use crate::mock_backend::MockBackend;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    models: Option<Vec<Model>>,
    budget: BudgetConfig,
    routing: RoutingConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            models: None,
            budget: BudgetConfig::default(),
            routing: RoutingConfig::default(),
        }
    }

    /// Replace the seeded catalog with `models`.
    pub fn with_models(mut self, models: Vec<Model>) -> Self {
        self.models = Some(models);
        self
    }

    pub fn with_budget(mut self, budget: BudgetConfig) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, FreeloaderError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| FreeloaderError::Storage {
            source: e.into(),
        })?;
        let db_path = temp_dir.path().join("test.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        let storage = Arc::new(SqliteStorage::new(storage_config.clone()));
        storage.initialize().await?;

        if let Some(models) = self.models {
            for seeded in storage.get_all(&ModelFilter::default()).await? {
                storage.delete_model(&seeded.provider, &seeded.name).await?;
            }
            for model in &models {
                storage.insert_model(model).await?;
            }
        }

        let backend = Arc::new(MockBackend::new());
        let ledger: Arc<dyn BudgetStore> = Arc::clone(&storage) as Arc<dyn BudgetStore>;
        let catalog: Arc<dyn ModelCatalog> = Arc::clone(&storage) as Arc<dyn ModelCatalog>;
        let usage_log: Arc<dyn UsageLog> = Arc::clone(&storage) as Arc<dyn UsageLog>;
        let enforcer = Arc::new(BudgetEnforcer::new(ledger, self.budget.clone()));
        let router = Router::new(
            catalog,
            Arc::clone(&backend) as Arc<dyn CompletionBackend>,
            enforcer,
            usage_log,
            self.routing.clone(),
        );

        let config = FreeloaderConfig {
            routing: self.routing,
            budget: self.budget,
            storage: storage_config,
            ..FreeloaderConfig::default()
        };

        Ok(TestHarness {
            router,
            storage,
            backend,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock backend and temp storage.
pub struct TestHarness {
    pub router: Router,
    /// SQLite storage (temp DB, removed on drop).
    pub storage: Arc<SqliteStorage>,
    pub backend: Arc<MockBackend>,
    pub config: FreeloaderConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Route a plain prompt for the default project.
    pub async fn route(&self, prompt: &str) -> Result<RouteResponse, FreeloaderError> {
        self.router.route(&RouteRequest::new(prompt)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_model;

    #[tokio::test]
    async fn default_harness_routes_over_seeded_catalog() {
        let harness = TestHarness::builder().build().await.unwrap();
        let response = harness.route("hello").await.unwrap();
        assert_eq!(response.text, "mock response");
        assert_eq!(response.routing.total_candidates, 2);
        assert_eq!(harness.backend.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn with_models_replaces_catalog() {
        let harness = TestHarness::builder()
            .with_models(vec![test_model("groq", "llama-3.3-70b", 8, 9, 0.59)])
            .build()
            .await
            .unwrap();
        let all = harness.storage.get_all(&ModelFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);

        let response = harness.route("hello").await.unwrap();
        assert_eq!(response.routing.provider, "groq");
        assert_eq!(response.routing.model, "llama-3.3-70b");
    }

    #[tokio::test]
    async fn harnesses_do_not_share_ledgers() {
        let h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();
        h1.router.budget().record_usage("default", 1.0).await.unwrap();

        let s1 = h1.router.budget().status("default").await.unwrap();
        let s2 = h2.router.budget().status("default").await.unwrap();
        assert_eq!(s1.daily.spent, 1.0);
        assert_eq!(s2.daily.spent, 0.0);
    }
}
