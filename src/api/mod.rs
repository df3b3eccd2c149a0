//! HTTP extraction API
//!
//! A small service wrapper around the extractor: `GET /health` for
//! liveness checks and `POST /extract` for one-off extractions.
//! Extraction failures come back as a 200 with `success: false` so
//! callers only have to look in one place for the outcome.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::extract::{PostExtractor, PostRecord, DEFAULT_LABEL};

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    extractor: Arc<PostExtractor>,
}

impl AppState {
    pub fn new(config: &Config) -> crate::Result<Self> {
        Ok(Self {
            extractor: Arc::new(PostExtractor::new(config)?),
        })
    }
}

/// Builds the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/extract", post(extract))
        .with_state(state)
}

/// Binds the configured address and serves requests until shutdown
pub async fn serve(config: &Config) -> crate::Result<()> {
    let state = AppState::new(config)?;
    let listener = tokio::net::TcpListener::bind(&config.api.bind_address).await?;
    info!("API listening on {}", config.api.bind_address);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Deserialize)]
struct ExtractRequest {
    url: String,
    label: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExtractResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<PostRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Json<ExtractResponse> {
    let label = request
        .label
        .filter(|label| !label.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LABEL.to_string());

    match state.extractor.extract(&label, &request.url).await {
        Ok(record) => Json(ExtractResponse {
            success: true,
            data: Some(record),
            error: None,
        }),
        Err(error) => {
            info!("API extraction failed for {}: {}", request.url, error);
            Json(ExtractResponse {
                success: false,
                data: None,
                error: Some(error.to_string()),
            })
        }
    }
}
