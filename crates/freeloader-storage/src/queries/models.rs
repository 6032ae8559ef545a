// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model catalog CRUD operations.

use freeloader_core::{FreeloaderError, Model, ModelFilter};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::Database;

const MODEL_COLUMNS: &str = "provider, name, intelligence, speed, context_window, \
     pricing_input, pricing_output, free_tier_tokens, free_tier_period";

fn row_to_model(row: &Row<'_>) -> rusqlite::Result<Model> {
    Ok(Model {
        provider: row.get(0)?,
        name: row.get(1)?,
        intelligence: row.get(2)?,
        speed: row.get(3)?,
        context_window: row.get(4)?,
        pricing_input: row.get(5)?,
        pricing_output: row.get(6)?,
        free_tier_tokens: row.get(7)?,
        free_tier_period: row.get(8)?,
    })
}

/// List models matching `filter`, strongest first (intelligence, then speed).
pub async fn get_all(db: &Database, filter: &ModelFilter) -> Result<Vec<Model>, FreeloaderError> {
    let filter = filter.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MODEL_COLUMNS} FROM models
                 WHERE (?1 IS NULL OR provider = ?1)
                   AND (?2 IS NULL OR intelligence >= ?2)
                   AND (?3 IS NULL OR speed >= ?3)
                 ORDER BY intelligence DESC, speed DESC, id ASC"
            ))?;
            let rows = stmt.query_map(
                params![filter.provider, filter.min_intelligence, filter.min_speed],
                row_to_model,
            )?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one model by provider and name.
pub async fn get(db: &Database, provider: &str, name: &str) -> Result<Option<Model>, FreeloaderError> {
    let provider = provider.to_string();
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {MODEL_COLUMNS} FROM models WHERE provider = ?1 AND name = ?2"),
                params![provider, name],
                row_to_model,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All models offered by one provider.
pub async fn get_by_provider(db: &Database, provider: &str) -> Result<Vec<Model>, FreeloaderError> {
    let filter = ModelFilter {
        provider: Some(provider.to_string()),
        ..ModelFilter::default()
    };
    get_all(db, &filter).await
}

/// Insert a new model. Fails if `(provider, name)` already exists.
pub async fn insert(db: &Database, model: &Model) -> Result<(), FreeloaderError> {
    let model = model.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO models ({MODEL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    model.provider,
                    model.name,
                    model.intelligence,
                    model.speed,
                    model.context_window,
                    model.pricing_input,
                    model.pricing_output,
                    model.free_tier_tokens,
                    model.free_tier_period,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Overwrite the attributes of an existing model. Returns `false` if no
/// model with that provider and name exists.
pub async fn update(db: &Database, model: &Model) -> Result<bool, FreeloaderError> {
    let model = model.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE models SET intelligence = ?3, speed = ?4, context_window = ?5,
                 pricing_input = ?6, pricing_output = ?7, free_tier_tokens = ?8,
                 free_tier_period = ?9,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE provider = ?1 AND name = ?2",
                params![
                    model.provider,
                    model.name,
                    model.intelligence,
                    model.speed,
                    model.context_window,
                    model.pricing_input,
                    model.pricing_output,
                    model.free_tier_tokens,
                    model.free_tier_period,
                ],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Remove a model. Returns `false` if it did not exist.
pub async fn delete(db: &Database, provider: &str, name: &str) -> Result<bool, FreeloaderError> {
    let provider = provider.to_string();
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM models WHERE provider = ?1 AND name = ?2",
                params![provider, name],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(provider: &str, name: &str, intelligence: u8, speed: u8) -> Model {
        Model {
            provider: provider.into(),
            name: name.into(),
            intelligence,
            speed,
            context_window: 32_000,
            pricing_input: 0.5,
            pricing_output: 1.5,
            free_tier_tokens: None,
            free_tier_period: None,
        }
    }

    async fn empty_db() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        db.connection()
            .call(|conn| conn.execute("DELETE FROM models", []))
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn seeded_catalog_is_present() {
        let db = Database::open_in_memory().await.unwrap();
        let haiku = get(&db, "anthropic", "claude-haiku-4-5-20251001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(haiku.intelligence, 7);
        assert_eq!(haiku.speed, 10);
        assert_eq!(haiku.free_tier_tokens, Some(50_000));

        let local = get(&db, "local", "llama-3.1-8b").await.unwrap().unwrap();
        assert!(local.is_local());
        assert_eq!(local.pricing_input, 0.0);
        assert_eq!(local.free_tier_tokens, None);
    }

    #[tokio::test]
    async fn get_all_orders_by_intelligence_then_speed() {
        let db = empty_db().await;
        insert(&db, &model("groq", "fast", 6, 9)).await.unwrap();
        insert(&db, &model("openai", "smart", 9, 5)).await.unwrap();
        insert(&db, &model("openai", "smart-fast", 9, 8)).await.unwrap();

        let all = get_all(&db, &ModelFilter::default()).await.unwrap();
        let names: Vec<_> = all.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["smart-fast", "smart", "fast"]);
    }

    #[tokio::test]
    async fn get_all_applies_filters() {
        let db = empty_db().await;
        insert(&db, &model("groq", "fast", 6, 9)).await.unwrap();
        insert(&db, &model("openai", "smart", 9, 5)).await.unwrap();

        let filter = ModelFilter {
            min_speed: Some(6),
            ..ModelFilter::default()
        };
        let fast = get_all(&db, &filter).await.unwrap();
        assert_eq!(fast.len(), 1);
        assert_eq!(fast[0].name, "fast");

        let filter = ModelFilter {
            provider: Some("openai".into()),
            min_intelligence: Some(9),
            ..ModelFilter::default()
        };
        assert_eq!(get_all(&db, &filter).await.unwrap().len(), 1);
        assert_eq!(get_by_provider(&db, "groq").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_insert_fails() {
        let db = empty_db().await;
        insert(&db, &model("groq", "fast", 6, 9)).await.unwrap();
        let err = insert(&db, &model("groq", "fast", 7, 7)).await.unwrap_err();
        assert!(matches!(err, FreeloaderError::Storage { .. }));
    }

    #[tokio::test]
    async fn update_and_delete_report_existence() {
        let db = empty_db().await;
        let mut m = model("groq", "fast", 6, 9);
        insert(&db, &m).await.unwrap();

        m.pricing_input = 0.1;
        assert!(update(&db, &m).await.unwrap());
        let stored = get(&db, "groq", "fast").await.unwrap().unwrap();
        assert_eq!(stored.pricing_input, 0.1);

        assert!(!update(&db, &model("groq", "missing", 5, 5)).await.unwrap());
        assert!(delete(&db, "groq", "fast").await.unwrap());
        assert!(!delete(&db, "groq", "fast").await.unwrap());
        assert!(get(&db, "groq", "fast").await.unwrap().is_none());
    }
}
