//! Request handlers for the REST endpoints.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::{ApiError, ApiResult, AppState};
use crate::error::AppError;
use crate::extract;
use crate::models::{AnalyzeRequest, Classification, EmailAnalysis, HealthResponse, HistoryEntry, StatsResponse};

const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Health check.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        app_name: state.settings.app_name.clone(),
        version: state.settings.app_version.clone(),
        timestamp: Utc::now(),
    })
}

/// Welcome payload at the root path.
pub async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": format!("Bem-vindo ao {}", state.settings.app_name),
        "version": state.settings.app_version,
        "health": "/api/v1/health",
        "api_base": "/api/v1",
    }))
}

/// Service limits and endpoint map.
pub async fn info(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "app_name": state.settings.app_name,
        "version": state.settings.app_version,
        "max_file_size_mb": state.settings.max_file_size as f64 / (1024.0 * 1024.0),
        "allowed_file_types": extract::ALLOWED_EXTENSIONS,
        "max_content_length": state.settings.max_content_length,
        "endpoints": {
            "analyze_text": "/api/v1/analyze",
            "analyze_file": "/api/v1/analyze/file",
            "get_analysis": "/api/v1/analysis/{id}",
            "history": "/api/v1/history",
            "stats": "/api/v1/stats",
            "health": "/api/v1/health",
        },
    }))
}

/// Classifies email content submitted as JSON.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<EmailAnalysis>> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(format!("invalid request: {}", e)))?;

    let content = request.content.trim().to_string();
    info!("Analyzing email from direct text ({} chars)", content.len());

    let analysis = state.classifier.classify(&content, request.file_name).await;
    state.store.store(&analysis, &content);

    info!(
        "Analysis complete: id={} classification={}",
        analysis.id, analysis.classification
    );
    Ok(Json(analysis))
}

/// Classifies email content extracted from an uploaded file.
pub async fn analyze_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<EmailAnalysis>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(|name| name.to_string())
            .unwrap_or_else(|| "upload.txt".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {}", e)))?;

        info!("Analyzing email from file: {} ({} bytes)", file_name, data.len());

        extract::validate_upload(&file_name, data.len(), state.settings.max_file_size)?;
        let text = extract::extract_text(&file_name, &data)?;
        let content =
            extract::truncate_at_word_boundary(&text, state.settings.max_content_length);

        let analysis = state
            .classifier
            .classify(&content, Some(file_name))
            .await;
        state.store.store(&analysis, &content);

        info!(
            "File analysis complete: id={} classification={}",
            analysis.id, analysis.classification
        );
        return Ok(Json(analysis));
    }

    Err(ApiError::bad_request("missing \"file\" part in multipart body"))
}

/// Fetches a stored analysis by id.
pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(analysis_id): Path<String>,
) -> ApiResult<Json<EmailAnalysis>> {
    let analysis = state
        .store
        .get(&analysis_id)
        .ok_or_else(|| AppError::NotFound("analysis not found".to_string()))?;
    Ok(Json(analysis))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub classification: Option<Classification>,
}

/// Recent analysis history, optionally filtered by classification.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<HistoryEntry>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let entries = state.store.history(limit, query.classification);
    info!("History retrieved: {} items", entries.len());
    Json(entries)
}

/// Aggregate classification statistics.
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(state.store.stats())
}

/// Clears the history and statistics.
pub async fn clear_history(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.store.clear();
    Json(json!({ "message": "histórico limpo com sucesso" }))
}
