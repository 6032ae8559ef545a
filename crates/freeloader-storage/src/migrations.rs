// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema and seed catalog, embedded from `migrations/` with refinery.
//!
//! V1 creates `models`, `budget_tracking` and `usage`; V2 seeds the starter
//! catalog. Both run on every open and are no-ops once recorded in
//! `refinery_schema_history`.

use freeloader_core::FreeloaderError;
use tracing::{debug, info};

mod embedded {
    refinery::embed_migrations!("migrations");
}

/// Bring `conn` up to the latest schema. Returns the schema version the
/// database is at afterwards, `None` for an empty migration set.
pub fn apply(conn: &mut rusqlite::Connection) -> Result<Option<i64>, FreeloaderError> {
    let runner = embedded::migrations::runner();
    let report = runner.run(conn).map_err(|e| FreeloaderError::Storage {
        source: Box::new(e),
    })?;

    let applied = report.applied_migrations();
    for migration in applied {
        debug!(version = migration.version(), name = migration.name(), "migration applied");
    }

    let current = runner
        .get_last_applied_migration(conn)
        .map_err(|e| FreeloaderError::Storage {
            source: Box::new(e),
        })?
        .map(|m| i64::from(m.version()));
    if !applied.is_empty() {
        info!(count = applied.len(), version = ?current, "database schema updated");
    }
    Ok(current)
}
