//! HTTP routes: crawl entry point, services read API, health check.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use welfare_crawler::{
    persist_records, BrowserRenderer, CrawlReport, FrontierWalker, GeminiClient, PostgresSink,
    RelevancePipeline, RenderConfig, ServiceSink, ServiceWithCategories,
};

pub struct AppState {
    pub pool: PgPool,
    pub gemini_api_key: Option<String>,
}

pub fn build_app(pool: PgPool, gemini_api_key: Option<String>) -> Router {
    let state = Arc::new(AppState {
        pool,
        gemini_api_key,
    });

    Router::new()
        .route("/health", get(health))
        .route("/services", get(list_services))
        .route("/crawl", get(crawl))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Serialize)]
struct ServicesResponse {
    data: Vec<ServiceWithCategories>,
}

async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ServicesResponse>, AppError> {
    let sink = PostgresSink::new(state.pool.clone());
    let data = sink.list_services().await.map_err(anyhow::Error::from)?;
    Ok(Json(ServicesResponse { data }))
}

#[derive(Deserialize)]
pub struct CrawlParams {
    pub seed_url: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    2
}

/// Clamp the requested depth to the supported range.
pub fn clamp_depth(depth: usize) -> usize {
    depth.clamp(1, 4)
}

/// Crawl a site and return the collected records.
///
/// Best-effort: per-page failures are embedded as error entries, never a
/// wholesale failure. When a completion API key is configured, survivors
/// are classified and persisted before the response is returned.
async fn crawl(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CrawlParams>,
) -> Result<Json<CrawlReport>, AppError> {
    let max_depth = clamp_depth(params.max_depth);

    let renderer = BrowserRenderer::launch(RenderConfig::default())
        .await
        .map_err(anyhow::Error::from)?;

    let walker = FrontierWalker::new(renderer);
    let result = walker.crawl(&params.seed_url, max_depth).await;

    // Release the browser process on every path, including crawl errors.
    walker.into_renderer().close().await;

    let report = result.map_err(anyhow::Error::from)?;

    if let Some(api_key) = &state.gemini_api_key {
        let pipeline = RelevancePipeline::new(GeminiClient::new(api_key));
        let outcomes = pipeline.enrich(&report.data).await;
        let accepted: Vec<_> = outcomes
            .iter()
            .filter_map(|o| o.enriched())
            .cloned()
            .collect();

        let sink = PostgresSink::new(state.pool.clone());
        let stored = persist_records(&sink, &accepted).await;
        tracing::info!(
            seed = %params.seed_url,
            records = report.count,
            accepted = accepted.len(),
            stored = stored,
            "crawl request classified and persisted"
        );
    } else {
        tracing::info!(
            seed = %params.seed_url,
            records = report.count,
            "crawl request finished (no API key, classification skipped)"
        );
    }

    Ok(Json(report))
}

/// Error wrapper turning anyhow errors into 500 responses.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
