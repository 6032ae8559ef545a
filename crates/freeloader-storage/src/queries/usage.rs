// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage audit log: inserts, period queries and aggregate statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Months, NaiveDate, Utc};
use freeloader_core::{FreeloaderError, UsageRecord};
use rusqlite::{Row, params};
use serde::Serialize;

use crate::database::Database;

/// Optional narrowing for period queries.
#[derive(Debug, Clone, Default)]
pub struct UsageFilter {
    pub project: Option<String>,
    pub provider: Option<String>,
    pub success: Option<bool>,
    pub limit: Option<u32>,
}

/// Per-provider totals within [`UsageStats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProviderUsage {
    pub requests: u64,
    pub cost: f64,
    pub tokens_in: u64,
    pub tokens_out: u64,
}

/// Aggregates over every audit row in a period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub total_tokens_in: u64,
    pub total_tokens_out: u64,
    pub total_cost: f64,
    pub avg_latency_ms: f64,
    pub by_provider: BTreeMap<String, ProviderUsage>,
}

/// Unix-second bounds `[start, end)` of a period key: `YYYY-MM-DD` covers
/// one UTC day, `YYYY-MM` one UTC calendar month.
pub fn period_bounds(period_key: &str) -> Result<(i64, i64), FreeloaderError> {
    let invalid = || {
        FreeloaderError::Validation(format!(
            "invalid period `{period_key}`; expected YYYY-MM-DD or YYYY-MM"
        ))
    };
    let (start, end) = match period_key.len() {
        10 => {
            let day = NaiveDate::parse_from_str(period_key, "%Y-%m-%d").map_err(|_| invalid())?;
            (day, day.succ_opt().ok_or_else(invalid)?)
        }
        7 => {
            let first = NaiveDate::parse_from_str(&format!("{period_key}-01"), "%Y-%m-%d")
                .map_err(|_| invalid())?;
            (first, first.checked_add_months(Months::new(1)).ok_or_else(invalid)?)
        }
        _ => return Err(invalid()),
    };
    let to_ts = |date: NaiveDate| -> Result<i64, FreeloaderError> {
        Ok(date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?.and_utc().timestamp())
    };
    Ok((to_ts(start)?, to_ts(end)?))
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<UsageRecord> {
    Ok(UsageRecord {
        timestamp: row.get(0)?,
        provider: row.get(1)?,
        model: row.get(2)?,
        project: row.get(3)?,
        tokens_in: row.get(4)?,
        tokens_out: row.get(5)?,
        cost_usd: row.get(6)?,
        latency_ms: row.get(7)?,
        success: row.get(8)?,
        routing_reason: row.get(9)?,
        error_message: row.get(10)?,
    })
}

/// Append one audit row. Returns its row id.
pub async fn log(db: &Database, record: &UsageRecord) -> Result<i64, FreeloaderError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO usage (
                    timestamp, provider, model, project,
                    tokens_in, tokens_out, cost_usd, latency_ms,
                    success, routing_reason, error_message
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    record.timestamp,
                    record.provider,
                    record.model,
                    record.project,
                    record.tokens_in,
                    record.tokens_out,
                    record.cost_usd,
                    record.latency_ms,
                    record.success,
                    record.routing_reason,
                    record.error_message,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Audit rows inside a period key, newest first.
pub async fn by_period(
    db: &Database,
    period_key: &str,
    filter: &UsageFilter,
) -> Result<Vec<UsageRecord>, FreeloaderError> {
    let (start, end) = period_bounds(period_key)?;
    let filter = filter.clone();
    let limit = filter.limit.map(i64::from).unwrap_or(-1);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT timestamp, provider, model, project, tokens_in, tokens_out,
                        cost_usd, latency_ms, success, routing_reason, error_message
                 FROM usage
                 WHERE timestamp >= ?1 AND timestamp < ?2
                   AND (?3 IS NULL OR project = ?3)
                   AND (?4 IS NULL OR provider = ?4)
                   AND (?5 IS NULL OR success = ?5)
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?6",
            )?;
            let rows = stmt.query_map(
                params![
                    start,
                    end,
                    filter.project,
                    filter.provider,
                    filter.success,
                    limit
                ],
                row_to_record,
            )?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Aggregate statistics for a period. `filter.limit` is ignored.
pub async fn stats(
    db: &Database,
    period_key: &str,
    filter: &UsageFilter,
) -> Result<UsageStats, FreeloaderError> {
    let filter = UsageFilter {
        limit: None,
        ..filter.clone()
    };
    let records = by_period(db, period_key, &filter).await?;
    Ok(summarize(&records))
}

fn summarize(records: &[UsageRecord]) -> UsageStats {
    let mut stats = UsageStats::default();
    let mut total_latency: u64 = 0;
    for record in records {
        stats.total_requests += 1;
        if record.success {
            stats.successful_requests += 1;
        } else {
            stats.failed_requests += 1;
        }
        stats.total_tokens_in += u64::from(record.tokens_in);
        stats.total_tokens_out += u64::from(record.tokens_out);
        stats.total_cost += record.cost_usd;
        total_latency += record.latency_ms;

        let provider = stats.by_provider.entry(record.provider.clone()).or_default();
        provider.requests += 1;
        provider.cost += record.cost_usd;
        provider.tokens_in += u64::from(record.tokens_in);
        provider.tokens_out += u64::from(record.tokens_out);
    }
    if stats.total_requests > 0 {
        stats.avg_latency_ms = total_latency as f64 / stats.total_requests as f64;
    }
    stats
}

/// Delete audit rows older than `older_than_days` relative to `now`.
/// Returns the number of rows removed.
pub async fn delete_older_than(
    db: &Database,
    older_than_days: u32,
    now: DateTime<Utc>,
) -> Result<usize, FreeloaderError> {
    let cutoff = now.timestamp() - i64::from(older_than_days) * 86_400;
    db.connection()
        .call(move |conn| conn.execute("DELETE FROM usage WHERE timestamp < ?1", params![cutoff]))
        .await
        .map_err(crate::database::map_tr_err)
}
