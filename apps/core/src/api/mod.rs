//! HTTP surface of the service.
//!
//! Routes are nested under `/api/v1`; the root path serves a small welcome
//! payload. All handler failures are rendered as a structured JSON error
//! body with the matching status code.

pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::classifier::EmailClassifier;
use crate::config::Settings;
use crate::error::AppError;
use crate::remote::RemoteClassifier;
use crate::storage::AnalysisStore;

/// Extra room on top of the upload limit for multipart framing overhead.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state injected into every handler.
pub struct AppState {
    pub settings: Settings,
    pub classifier: EmailClassifier<RemoteClassifier>,
    pub store: AnalysisStore,
}

/// Standard API error response format.
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::BAD_REQUEST,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::NOT_FOUND,
        }
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": true,
            "message": self.message,
            "status": self.status_code.as_u16(),
        });
        (self.status_code, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(msg) => ApiError::bad_request(msg),
            AppError::PayloadTooLarge(msg) => ApiError::payload_too_large(msg),
            AppError::NotFound(msg) => ApiError::not_found(msg),
            AppError::Io(e) => ApiError::internal(e.to_string()),
            AppError::Config(msg) | AppError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Builds the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.settings);
    let body_limit = state.settings.max_file_size + MULTIPART_OVERHEAD;

    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/analyze", post(handlers::analyze))
        .route("/analyze/file", post(handlers::analyze_file))
        .route("/analysis/{analysis_id}", get(handlers::get_analysis))
        .route(
            "/history",
            get(handlers::history).delete(handlers::clear_history),
        )
        .route("/stats", get(handlers::stats));

    Router::new()
        .route("/", get(handlers::root))
        .route("/info", get(handlers::info))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
