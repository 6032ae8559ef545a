// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembly tests: configuration text to a routed request against a mock
//! LiteLLM proxy, with the real SQLite storage and HTTP backend.

use freeloader::Freeloader;
use freeloader_config::model::FreeloaderConfig;
use freeloader_core::RouteRequest;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, dir: &tempfile::TempDir) -> FreeloaderConfig {
    let db_path = dir.path().join("freeloader.db");
    let toml = format!(
        r#"
[routing]
strategy = "balanced"

[budget.hard]
daily = 5.0
monthly = 50.0

[budget.soft]
daily = 2.5
monthly = 25.0

[storage]
database_path = "{}"

[backend]
base_url = "{}"
api_key = "sk-test"
timeout_secs = 5
"#,
        db_path.display(),
        server.uri()
    );
    freeloader_config::load_and_validate_str(&toml).expect("test config should be valid")
}

fn completion(text: &str, prompt_tokens: u32, completion_tokens: u32) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    }))
}

#[tokio::test]
async fn routes_through_proxy_to_seeded_local_model() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"model": "local/llama-3.1-8b"})))
        .respond_with(completion("hi from llama", 12, 30))
        .expect(1)
        .mount(&server)
        .await;

    let app = Freeloader::from_config(config_for(&server, &dir)).await.unwrap();
    let response = app.route(&RouteRequest::new("hello")).await.unwrap();

    assert_eq!(response.text, "hi from llama");
    assert_eq!(response.routing.provider, "local");
    assert_eq!(response.usage.tokens_out, 30);
    assert_eq!(response.cost, 0.0);

    let status = app.budget_status("default").await.unwrap();
    assert_eq!(status.daily.limit, 5.0);
    assert_eq!(status.daily.spent, 0.0);
    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn proxy_failure_falls_back_to_paid_model_and_bills_it() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"model": "local/llama-3.1-8b"})))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": {"message": "ollama is not running"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(
            serde_json::json!({"model": "anthropic/claude-haiku-4-5-20251001"}),
        ))
        .respond_with(completion("hi from haiku", 1_000, 2_000))
        .mount(&server)
        .await;

    let app = Freeloader::from_config(config_for(&server, &dir)).await.unwrap();
    let response = app.route(&RouteRequest::new("hello")).await.unwrap();

    assert_eq!(response.routing.provider, "anthropic");
    assert_eq!(response.routing.attempts, 2);
    // 1k input at $0.25/M plus 2k output at $1.25/M
    assert!((response.cost - 0.002_75).abs() < 1e-12);

    let status = app.budget_status("default").await.unwrap();
    assert!((status.monthly.spent - 0.002_75).abs() < 1e-12);
}

#[tokio::test]
async fn health_reports_both_adapters() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let app = Freeloader::from_config(config_for(&server, &dir)).await.unwrap();
    let report = app.health().await;
    assert!(report.healthy, "report: {report:?}");
    assert_eq!(report.storage, "healthy");
    assert_eq!(report.backend, "healthy");
}
