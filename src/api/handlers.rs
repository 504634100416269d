//! REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::warn;

use super::types::{
    ErrorResponse, KeywordResult, ListKeywordsResponse, ListSessionsResponse, RunKeywordRequest,
    SessionSummary,
};
use crate::keywords::{find, WinRmLibrary};
use crate::winrm::WinRmConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<WinRmLibrary>,
}

impl AppState {
    pub fn new(library: WinRmLibrary) -> Self {
        Self {
            library: Arc::new(library),
        }
    }

    /// State backed by a WinRM connector with the given settings.
    pub fn from_config(config: WinRmConfig) -> crate::Result<Self> {
        Ok(Self::new(WinRmLibrary::with_config(config)?))
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "winrm-keywords",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// List available keywords.
pub async fn list_keywords(State(state): State<AppState>) -> Json<ListKeywordsResponse> {
    let keywords = state.library.keywords();
    Json(ListKeywordsResponse {
        count: keywords.len(),
        keywords,
    })
}

/// Run a keyword.
///
/// Keyword failures are reported in the body with status `FAIL`; only an
/// unknown keyword name is an HTTP error.
pub async fn run_keyword(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<RunKeywordRequest>,
) -> Result<Json<KeywordResult>, (StatusCode, Json<ErrorResponse>)> {
    if find(&name).is_none() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::keyword_not_found(&name)),
        ));
    }

    match state.library.run_keyword(&name, req.args, req.kwargs).await {
        Ok(value) => Ok(Json(KeywordResult::pass(value))),
        Err(e) => {
            warn!(keyword = %name, error = %e, "keyword failed");
            Ok(Json(KeywordResult::fail(&e)))
        }
    }
}

/// List registered sessions.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<ListSessionsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let registry = state.library.registry();
    let entries = registry.snapshot().map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal_error(e.to_string())),
        )
    })?;

    let sessions: Vec<SessionSummary> = entries.into_iter().map(SessionSummary::from).collect();

    Ok(Json(ListSessionsResponse {
        count: sessions.len(),
        current: registry.current_index(),
        sessions,
    }))
}
