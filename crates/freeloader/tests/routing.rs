// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end routing tests over a temp SQLite database.
//!
//! Each test creates an isolated TestHarness with a mock backend. Tests are
//! independent and order-insensitive.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use freeloader_config::model::{BudgetConfig, BudgetLimits};
use freeloader_core::{BudgetPeriod, FreeloaderError, QualityGates, RouteRequest};
use freeloader_storage::UsageFilter;
use freeloader_test_utils::{MockReply, TestHarness, test_model};

fn pinned() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
}

fn tight_budget(daily: f64) -> BudgetConfig {
    BudgetConfig {
        hard: BudgetLimits {
            daily,
            monthly: 100.0,
        },
        soft: BudgetLimits {
            daily: daily / 2.0,
            monthly: 50.0,
        },
    }
}

// ---- Fallback ----

#[tokio::test]
async fn failed_top_candidate_falls_back_and_bills_the_winner() {
    let harness = TestHarness::builder()
        .with_models(vec![
            test_model("x", "fast", 8, 10, 0.0),
            test_model("y", "slow", 8, 6, 1.0),
        ])
        .build()
        .await
        .unwrap();
    harness.backend.fail("x/fast").await;
    harness
        .backend
        .script("y/slow", MockReply::text("from y", 1_000_000, 0))
        .await;

    let response = harness
        .router
        .route_at(&RouteRequest::new("hello"), pinned())
        .await
        .unwrap();

    assert_eq!(response.text, "from y");
    assert_eq!(response.routing.provider, "y");
    assert_eq!(response.routing.rank, 2);
    assert_eq!(response.routing.attempts, 2);
    assert_eq!(response.routing.total_candidates, 2);
    assert!((response.cost - 1.0).abs() < 1e-9);
    assert_eq!(
        harness.backend.calls().await,
        vec!["x/fast".to_string(), "y/slow".to_string()]
    );

    let spent = harness.router.budget().status_at("default", pinned()).await.unwrap();
    assert!((spent.daily.spent - 1.0).abs() < 1e-9);
    assert!((spent.monthly.spent - 1.0).abs() < 1e-9);

    let stats = harness
        .storage
        .usage_stats("2026-03-14", &UsageFilter::default())
        .await
        .unwrap();
    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.successful_requests, 1);
    assert_eq!(stats.by_provider["y"].tokens_in, 1_000_000);
}

#[tokio::test]
async fn exhausted_candidates_leave_a_failure_audit_and_no_spend() {
    let harness = TestHarness::builder()
        .with_models(vec![
            test_model("a", "one", 8, 9, 0.5),
            test_model("b", "two", 8, 8, 0.5),
            test_model("c", "three", 8, 7, 0.5),
        ])
        .build()
        .await
        .unwrap();
    for id in ["a/one", "b/two", "c/three"] {
        harness.backend.fail(id).await;
    }

    let err = harness
        .router
        .route_at(&RouteRequest::new("hello"), pinned())
        .await
        .unwrap_err();
    assert!(matches!(err, FreeloaderError::NoProvidersAvailable { .. }));
    assert_eq!(err.attempt_failures().len(), 3);
    assert_eq!(err.status_code(), 503);

    let failed = UsageFilter {
        success: Some(false),
        ..UsageFilter::default()
    };
    let rows = harness
        .storage
        .usage_by_period("2026-03-14", &failed)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].provider, "a");
    assert_eq!(rows[0].cost_usd, 0.0);
    assert!(rows[0].error_message.as_deref().unwrap().contains("all 3 candidates failed"));

    let status = harness.router.budget().status_at("default", pinned()).await.unwrap();
    assert_eq!(status.daily.spent, 0.0);
}

// ---- Budgets ----

#[tokio::test]
async fn exhausted_daily_budget_rejects_before_any_attempt() {
    let harness = TestHarness::builder()
        .with_budget(tight_budget(1.0))
        .build()
        .await
        .unwrap();
    harness
        .router
        .budget()
        .record_usage_at("default", 0.95, pinned())
        .await
        .unwrap();

    let err = harness
        .router
        .route_at(&RouteRequest::new("hello"), pinned())
        .await
        .unwrap_err();
    match err {
        FreeloaderError::BudgetExceeded { period, spent, limit, .. } => {
            assert_eq!(period, BudgetPeriod::Daily);
            assert!((spent - 0.95).abs() < 1e-9);
            assert_eq!(limit, 1.0);
        }
        other => panic!("expected BudgetExceeded, got {other:?}"),
    }
    assert!(harness.backend.calls().await.is_empty());

    let stats = harness
        .storage
        .usage_stats("2026-03-14", &UsageFilter::default())
        .await
        .unwrap();
    assert_eq!(stats.total_requests, 0);
}

#[tokio::test]
async fn budgets_are_tracked_per_project() {
    let harness = TestHarness::builder()
        .with_models(vec![test_model("p", "m", 8, 9, 2.0)])
        .with_budget(tight_budget(1.0))
        .build()
        .await
        .unwrap();
    harness
        .backend
        .script("p/m", MockReply::text("ok", 500_000, 0))
        .await;

    let mut alpha = RouteRequest::new("hi");
    alpha.project = Some("alpha".into());
    let mut beta = RouteRequest::new("hi");
    beta.project = Some("beta".into());

    // $1.00 per request against a $1.00 daily limit: alpha's second request
    // is rejected, beta still has its own budget.
    harness.router.route_at(&alpha, pinned()).await.unwrap();
    let err = harness.router.route_at(&alpha, pinned()).await.unwrap_err();
    assert!(matches!(err, FreeloaderError::BudgetExceeded { .. }));
    harness.router.route_at(&beta, pinned()).await.unwrap();

    let history = harness
        .storage
        .budget_history("alpha", Some(BudgetPeriod::Daily), None)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].requests, 1);
}

#[tokio::test]
async fn concurrent_requests_all_land_in_the_ledger() {
    let harness = Arc::new(
        TestHarness::builder()
            .with_models(vec![test_model("p", "m", 8, 9, 1.0)])
            .build()
            .await
            .unwrap(),
    );
    harness
        .backend
        .script("p/m", MockReply::text("ok", 10_000, 0))
        .await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let harness = Arc::clone(&harness);
        handles.push(tokio::spawn(async move {
            harness
                .router
                .route_at(&RouteRequest::new("hi"), pinned())
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let record = harness
        .storage
        .budget_record("2026-03-14", "default")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.requests, 20);
    // 20 requests x 10k tokens x $1/M
    assert!((record.spent_usd - 0.2).abs() < 1e-9);
}

// ---- Request shaping ----

#[tokio::test]
async fn request_gates_override_configured_defaults() {
    let harness = TestHarness::builder()
        .with_models(vec![
            test_model("local", "llama", 7, 10, 0.0),
            test_model("groq", "llama", 7, 9, 0.5),
        ])
        .build()
        .await
        .unwrap();

    let response = harness.route("hi").await.unwrap();
    assert_eq!(response.routing.provider, "local");

    let mut request = RouteRequest::new("hi");
    request.quality_gates = Some(QualityGates {
        block_local: Some(true),
        ..QualityGates::default()
    });
    let response = harness.router.route(&request).await.unwrap();
    assert_eq!(response.routing.provider, "groq");
    assert_eq!(response.routing.total_candidates, 1);
}

#[tokio::test]
async fn json_request_selects_named_strategy() {
    let harness = TestHarness::builder()
        .with_models(vec![
            test_model("cheap", "small", 6, 6, 0.0),
            test_model("smart", "large", 10, 6, 15.0),
        ])
        .build()
        .await
        .unwrap();

    let request =
        RouteRequest::from_json(r#"{"prompt": "explain", "strategy": "quality-first"}"#).unwrap();
    let response = harness.router.route(&request).await.unwrap();
    assert_eq!(response.routing.provider, "smart");
    assert!(response.routing.reason.starts_with("Quality-first strategy (rank 1/2)"));

    let err = RouteRequest::from_json(r#"{"prompt": "explain", "strategy": "cheapest"}"#)
        .unwrap_err();
    assert!(matches!(err, FreeloaderError::Validation(_)));
}

#[tokio::test]
async fn gates_that_remove_every_model_fail_fast() {
    let harness = TestHarness::builder().build().await.unwrap();
    let mut request = RouteRequest::new("hi");
    request.quality_gates = Some(QualityGates {
        min_intelligence: Some(10),
        ..QualityGates::default()
    });

    let err = harness.router.route(&request).await.unwrap_err();
    assert!(matches!(err, FreeloaderError::NoProvidersAvailable { .. }));
    assert!(err.attempt_failures().is_empty());
    assert!(harness.backend.calls().await.is_empty());
}
