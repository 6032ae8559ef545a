// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage-facing adapter traits.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::debug;

use freeloader_config::model::StorageConfig;
use freeloader_core::{
    AdapterType, BudgetPeriod, BudgetStore, FreeloaderError, HealthStatus, Model, ModelCatalog,
    ModelFilter, PluginAdapter, StorageAdapter, UsageLog, UsageRecord,
};

use crate::database::Database;
use crate::queries;
use crate::queries::budgets::BudgetRecord;
use crate::queries::usage::{UsageFilter, UsageStats};

/// The catalog, budget ledger and usage log in one SQLite file.
///
/// Construction is cheap; nothing touches disk until
/// [`StorageAdapter::initialize`] opens the file and migrates it. Every
/// trait method before that returns a storage error.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already opened database. Used with in-memory databases.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    pub fn db(&self) -> Result<&Database, FreeloaderError> {
        self.db.get().ok_or_else(|| FreeloaderError::Storage {
            source: format!("{} is not open yet", self.config.database_path).into(),
        })
    }

    // --- Catalog maintenance ---

    pub async fn models_by_provider(&self, provider: &str) -> Result<Vec<Model>, FreeloaderError> {
        queries::models::get_by_provider(self.db()?, provider).await
    }

    pub async fn insert_model(&self, model: &Model) -> Result<(), FreeloaderError> {
        queries::models::insert(self.db()?, model).await
    }

    pub async fn update_model(&self, model: &Model) -> Result<bool, FreeloaderError> {
        queries::models::update(self.db()?, model).await
    }

    pub async fn delete_model(&self, provider: &str, name: &str) -> Result<bool, FreeloaderError> {
        queries::models::delete(self.db()?, provider, name).await
    }

    // --- Ledger inspection ---

    pub async fn budget_record(
        &self,
        period_key: &str,
        project: &str,
    ) -> Result<Option<BudgetRecord>, FreeloaderError> {
        queries::budgets::get(self.db()?, period_key, project).await
    }

    pub async fn budget_history(
        &self,
        project: &str,
        window: Option<BudgetPeriod>,
        limit: Option<u32>,
    ) -> Result<Vec<BudgetRecord>, FreeloaderError> {
        queries::budgets::by_project(self.db()?, project, window, limit).await
    }

    pub async fn reset_budget(&self, period_key: &str, project: &str) -> Result<bool, FreeloaderError> {
        queries::budgets::reset(self.db()?, period_key, project).await
    }

    // --- Audit queries ---

    pub async fn usage_by_period(
        &self,
        period_key: &str,
        filter: &UsageFilter,
    ) -> Result<Vec<UsageRecord>, FreeloaderError> {
        queries::usage::by_period(self.db()?, period_key, filter).await
    }

    pub async fn usage_stats(
        &self,
        period_key: &str,
        filter: &UsageFilter,
    ) -> Result<UsageStats, FreeloaderError> {
        queries::usage::stats(self.db()?, period_key, filter).await
    }

    /// Drop audit rows older than `days` days.
    pub async fn prune_usage(&self, days: u32) -> Result<usize, FreeloaderError> {
        let removed = queries::usage::delete_older_than(self.db()?, days, Utc::now()).await?;
        debug!(removed, days, "pruned usage log");
        Ok(removed)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    /// Healthy when the catalog table answers a query.
    async fn health_check(&self) -> Result<HealthStatus, FreeloaderError> {
        let models: i64 = self
            .db()?
            .connection()
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM models", [], |row| row.get(0)))
            .await
            .map_err(crate::database::map_tr_err)?;
        if models == 0 {
            return Ok(HealthStatus::Degraded("model catalog is empty".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    /// Checkpoints if open; shutting down an unopened store is a no-op.
    async fn shutdown(&self) -> Result<(), FreeloaderError> {
        match self.db.get() {
            Some(db) => {
                db.checkpoint().await?;
                debug!(path = %self.config.database_path, "storage checkpointed for shutdown");
            }
            None => debug!("storage was never opened"),
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), FreeloaderError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| FreeloaderError::Storage {
            source: format!("{} is already open", self.config.database_path).into(),
        })?;
        Ok(())
    }

    async fn close(&self) -> Result<(), FreeloaderError> {
        self.db()?.checkpoint().await
    }
}

#[async_trait]
impl ModelCatalog for SqliteStorage {
    async fn get_all(&self, filter: &ModelFilter) -> Result<Vec<Model>, FreeloaderError> {
        queries::models::get_all(self.db()?, filter).await
    }

    async fn get(&self, provider: &str, name: &str) -> Result<Option<Model>, FreeloaderError> {
        queries::models::get(self.db()?, provider, name).await
    }
}

#[async_trait]
impl BudgetStore for SqliteStorage {
    async fn spent(&self, period_key: &str, project: &str) -> Result<f64, FreeloaderError> {
        queries::budgets::spent(self.db()?, period_key, project).await
    }

    async fn increment(
        &self,
        period_key: &str,
        project: &str,
        cost_usd: f64,
    ) -> Result<f64, FreeloaderError> {
        let spent = queries::budgets::increment(self.db()?, period_key, project, cost_usd).await?;
        debug!(period = period_key, project, cost_usd, spent, "ledger incremented");
        Ok(spent)
    }
}

#[async_trait]
impl UsageLog for SqliteStorage {
    async fn log(&self, record: &UsageRecord) -> Result<(), FreeloaderError> {
        queries::usage::log(self.db()?, record).await?;
        Ok(())
    }
}
