//! HTTP API Tests
//!
//! Drives the router end to end with in-process requests. The remote
//! classifier stays unconfigured, so every analysis goes through the full
//! rule-based path.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::api::{self, AppState};
use crate::classifier::EmailClassifier;
use crate::config::Settings;
use crate::remote::RemoteClassifier;
use crate::storage::AnalysisStore;

fn test_app() -> Router {
    // Default settings carry no API key, so the adapter fails closed.
    let settings = Settings::default();
    let remote = RemoteClassifier::from_settings(&settings);
    let state = Arc::new(AppState {
        classifier: EmailClassifier::new(remote, settings.use_openai),
        store: AnalysisStore::new(),
        settings,
    });
    api::router(state)
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn multipart_request(uri: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let boundary = "mailtriage-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            boundary, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = test_app()
        .oneshot(get_request("/api/v1/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["app_name"].as_str().is_some());
}

#[tokio::test]
async fn test_root_endpoint() {
    let response = test_app().oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["api_base"], "/api/v1");
}

#[tokio::test]
async fn test_info_endpoint_reports_limits() {
    let response = test_app().oneshot(get_request("/info")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["max_content_length"], 10_000);
    assert_eq!(body["allowed_file_types"], json!(["txt", "pdf"]));
}

#[tokio::test]
async fn test_analyze_productive_email() {
    let response = test_app()
        .oneshot(json_request(
            "/api/v1/analyze",
            json!({ "content": "Preciso que você aprove o orçamento até amanhã, urgente!" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["classification"], "productive");
    assert!(body["confidence"].as_f64().unwrap() >= 0.75);
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert!(!body["suggested_response"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_rejects_short_content() {
    let response = test_app()
        .oneshot(json_request("/api/v1/analyze", json!({ "content": "oi" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_analyze_carries_file_name() {
    let response = test_app()
        .oneshot(json_request(
            "/api/v1/analyze",
            json!({
                "content": "Segue em anexo o relatório solicitado na reunião",
                "file_name": "relatorio.txt"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["file_name"], "relatorio.txt");
}

#[tokio::test]
async fn test_analysis_lookup_round_trip() {
    let app = test_app();

    let created = app
        .clone()
        .oneshot(json_request(
            "/api/v1/analyze",
            json!({ "content": "Pode confirmar o horário da reunião de amanhã?" }),
        ))
        .await
        .unwrap();
    let created_body = response_json(created).await;
    let id = created_body["id"].as_str().unwrap().to_string();

    let fetched = app
        .clone()
        .oneshot(get_request(&format!("/api/v1/analysis/{}", id)))
        .await
        .unwrap();

    assert_eq!(fetched.status(), StatusCode::OK);
    let fetched_body = response_json(fetched).await;
    assert_eq!(fetched_body["id"], id.as_str());
    assert_eq!(fetched_body["classification"], created_body["classification"]);
}

#[tokio::test]
async fn test_analysis_lookup_unknown_id_is_404() {
    let response = test_app()
        .oneshot(get_request("/api/v1/analysis/nao-existe"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_returns_recent_first_and_respects_limit() {
    let app = test_app();

    for content in [
        "Preciso da aprovação do orçamento com urgência hoje",
        "Muito obrigado pela ajuda com o sistema ontem",
        "Podemos agendar uma reunião para discutir o contrato?",
    ] {
        let response = app
            .clone()
            .oneshot(json_request("/api/v1/analyze", json!({ "content": content })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/history?limit=2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    // Most recent analysis first.
    assert!(entries[0]["content"]
        .as_str()
        .unwrap()
        .contains("agendar uma reunião"));
}

#[tokio::test]
async fn test_history_filters_by_classification() {
    let app = test_app();

    for content in [
        "Preciso da aprovação do orçamento com urgência hoje",
        "Muito obrigado pela ajuda com o sistema ontem",
    ] {
        app.clone()
            .oneshot(json_request("/api/v1/analyze", json!({ "content": content })))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/history?classification=productive"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let entries = body.as_array().unwrap();
    assert!(!entries.is_empty());
    for entry in entries {
        assert_eq!(entry["classification"], "productive");
    }
}

#[tokio::test]
async fn test_stats_track_analyses() {
    let app = test_app();

    app.clone()
        .oneshot(json_request(
            "/api/v1/analyze",
            json!({ "content": "Preciso da aprovação do orçamento com urgência hoje" }),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(json_request(
            "/api/v1/analyze",
            json!({ "content": "Muito obrigado pela ajuda com o sistema ontem" }),
        ))
        .await
        .unwrap();

    let response = app.clone().oneshot(get_request("/api/v1/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["total_processed"], 2);
    assert_eq!(body["productive_count"], 1);
    assert_eq!(body["unproductive_count"], 1);
    let average = body["average_confidence"].as_f64().unwrap();
    assert!((0.5..=1.0).contains(&average));
}

#[tokio::test]
async fn test_clear_history_resets_stats() {
    let app = test_app();

    app.clone()
        .oneshot(json_request(
            "/api/v1/analyze",
            json!({ "content": "Preciso da aprovação do orçamento com urgência hoje" }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stats = response_json(app.clone().oneshot(get_request("/api/v1/stats")).await.unwrap()).await;
    assert_eq!(stats["total_processed"], 0);

    let history = response_json(
        app.clone()
            .oneshot(get_request("/api/v1/history"))
            .await
            .unwrap(),
    )
    .await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_file_with_txt_upload() {
    let response = test_app()
        .oneshot(multipart_request(
            "/api/v1/analyze/file",
            "email.txt",
            "Solicito a revisão do contrato até sexta-feira. É urgente.".as_bytes(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["classification"], "productive");
    assert_eq!(body["file_name"], "email.txt");
}

#[tokio::test]
async fn test_analyze_file_rejects_unsupported_type() {
    let response = test_app()
        .oneshot(multipart_request(
            "/api/v1/analyze/file",
            "planilha.xlsx",
            b"conteudo",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_file_without_file_part_is_rejected() {
    let boundary = "mailtriage-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalor\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/analyze/file")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
