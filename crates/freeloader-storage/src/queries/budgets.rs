// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Budget ledger rows keyed by `(period, project)`.

use freeloader_core::{BudgetPeriod, FreeloaderError};
use rusqlite::{OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

use crate::database::Database;

/// One ledger row: accumulated spend for a project within one period key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    /// `YYYY-MM-DD` for daily windows, `YYYY-MM` for monthly ones.
    pub period: String,
    pub project: String,
    pub spent_usd: f64,
    pub requests: u64,
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<BudgetRecord> {
    Ok(BudgetRecord {
        period: row.get(0)?,
        project: row.get(1)?,
        spent_usd: row.get(2)?,
        requests: row.get(3)?,
    })
}

pub async fn get(
    db: &Database,
    period: &str,
    project: &str,
) -> Result<Option<BudgetRecord>, FreeloaderError> {
    let period = period.to_string();
    let project = project.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT period, project, spent_usd, requests FROM budget_tracking
                 WHERE period = ?1 AND project = ?2",
                params![period, project],
                row_to_record,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Spent amount for the period, zero when nothing has been recorded.
pub async fn spent(db: &Database, period: &str, project: &str) -> Result<f64, FreeloaderError> {
    Ok(get(db, period, project)
        .await?
        .map(|record| record.spent_usd)
        .unwrap_or(0.0))
}

/// Atomically add `cost_usd` to the period's spend and bump its request
/// count, creating the row on first use. Returns the new spent total.
pub async fn increment(
    db: &Database,
    period: &str,
    project: &str,
    cost_usd: f64,
) -> Result<f64, FreeloaderError> {
    let period = period.to_string();
    let project = project.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "INSERT INTO budget_tracking (period, project, spent_usd, requests)
                 VALUES (?1, ?2, ?3, 1)
                 ON CONFLICT(period, project) DO UPDATE SET
                     spent_usd = spent_usd + excluded.spent_usd,
                     requests = requests + excluded.requests,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 RETURNING spent_usd",
                params![period, project, cost_usd],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Ledger history for a project, newest period first. `window` restricts
/// the result to daily or monthly keys.
pub async fn by_project(
    db: &Database,
    project: &str,
    window: Option<BudgetPeriod>,
    limit: Option<u32>,
) -> Result<Vec<BudgetRecord>, FreeloaderError> {
    let project = project.to_string();
    // Daily keys are 10 characters long, monthly keys 7.
    let key_len: Option<i64> = window.map(|w| match w {
        BudgetPeriod::Daily => 10,
        BudgetPeriod::Monthly => 7,
    });
    let limit = limit.map(i64::from).unwrap_or(-1);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT period, project, spent_usd, requests FROM budget_tracking
                 WHERE project = ?1 AND (?2 IS NULL OR length(period) = ?2)
                 ORDER BY period DESC
                 LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![project, key_len, limit], row_to_record)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete the ledger row for one period. Returns whether a row existed.
pub async fn reset(db: &Database, period: &str, project: &str) -> Result<bool, FreeloaderError> {
    let period = period.to_string();
    let project = project.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM budget_tracking WHERE period = ?1 AND project = ?2",
                params![period, project],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn spent_is_zero_for_unknown_period() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(spent(&db, "2026-03-01", "default").await.unwrap(), 0.0);
        assert!(get(&db, "2026-03-01", "default").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn increment_upserts_and_accumulates() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(increment(&db, "2026-03", "alpha", 2.5).await.unwrap(), 2.5);
        assert_eq!(increment(&db, "2026-03", "alpha", 1.75).await.unwrap(), 4.25);

        let record = get(&db, "2026-03", "alpha").await.unwrap().unwrap();
        assert_eq!(record.spent_usd, 4.25);
        assert_eq!(record.requests, 2);
        // Other projects are untouched.
        assert_eq!(spent(&db, "2026-03", "beta").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let mut handles = Vec::new();
        for _ in 0..50 {
            let db = Arc::clone(&db);
            handles.push(tokio::spawn(async move {
                increment(&db, "2026-03-14", "default", 0.25).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let record = get(&db, "2026-03-14", "default").await.unwrap().unwrap();
        assert_eq!(record.spent_usd, 12.5);
        assert_eq!(record.requests, 50);
    }

    #[tokio::test]
    async fn by_project_filters_window_and_orders_newest_first() {
        let db = Database::open_in_memory().await.unwrap();
        for period in ["2026-02", "2026-03", "2026-03-01", "2026-03-02"] {
            increment(&db, period, "alpha", 1.0).await.unwrap();
        }
        increment(&db, "2026-03", "beta", 1.0).await.unwrap();

        let all = by_project(&db, "alpha", None, None).await.unwrap();
        assert_eq!(all.len(), 4);

        let daily = by_project(&db, "alpha", Some(BudgetPeriod::Daily), None)
            .await
            .unwrap();
        let periods: Vec<_> = daily.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(periods, vec!["2026-03-02", "2026-03-01"]);

        let monthly = by_project(&db, "alpha", Some(BudgetPeriod::Monthly), Some(1))
            .await
            .unwrap();
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].period, "2026-03");
    }

    #[tokio::test]
    async fn reset_removes_row() {
        let db = Database::open_in_memory().await.unwrap();
        increment(&db, "2026-03", "alpha", 3.0).await.unwrap();
        assert!(reset(&db, "2026-03", "alpha").await.unwrap());
        assert!(!reset(&db, "2026-03", "alpha").await.unwrap());
        assert_eq!(spent(&db, "2026-03", "alpha").await.unwrap(), 0.0);
    }
}
