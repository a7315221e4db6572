pub mod catalog;
pub mod channels;
pub mod heuristics;
pub mod metrics;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::body::Body;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use catalog::{Catalog, CategorySummary, Conversion, ParseStats};
use channels::{Channel, Converter};
use metrics::MonitoringConfig;
use tracing::{error, info, warn};

struct AppState {
    catalog: Catalog,
    stats: ParseStats,
    converter: Converter,
    monitoring: MonitoringConfig,
}

pub fn create_app(loaded: Conversion, converter: Converter, monitoring: MonitoringConfig) -> Router {
    let metrics_enabled = monitoring.enabled;
    let state = Arc::new(AppState {
        catalog: loaded.catalog,
        stats: loaded.stats,
        converter,
        monitoring,
    });

    let mut router = Router::new()
        .route("/channels.json", get(catalog_handler))
        .route("/api/catalog", get(catalog_handler))
        .route("/api/channels", get(channels_api_handler))
        .route("/api/categories", get(categories_api_handler))
        .route("/api/stats", get(stats_api_handler))
        .route("/api/convert", post(convert_handler));

    if metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    router.fallback(fallback_handler).with_state(state)
}

/// Runs the converter and feeds the outcome into the Prometheus counters.
pub fn convert_and_record(converter: &Converter, content: &str) -> Conversion {
    let conversion = converter.convert(content);
    metrics::record_conversion(&conversion.stats);
    conversion
}

pub async fn read_playlist(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read playlist {}", path.display()))
}

/// Reads every playlist and joins them so ids stay sequential across files.
/// Unreadable files are logged and skipped.
pub async fn load_playlists(paths: &[PathBuf]) -> String {
    let mut combined = String::new();
    for path in paths {
        info!("Reading playlist {}...", path.display());
        match read_playlist(path).await {
            Ok(content) => {
                combined.push_str(&content);
                combined.push('\n');
            }
            Err(e) => {
                error!("{:#}", e);
            }
        }
    }
    combined
}

async fn fallback_handler(method: Method, uri: Uri, headers: HeaderMap) -> impl IntoResponse {
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("<none>");
    warn!(
        "HTTP 404: method={} uri={} UA=\"{}\"",
        method,
        uri,
        user_agent
    );
    (StatusCode::NOT_FOUND, "Not found")
}

async fn catalog_handler(State(state): State<Arc<AppState>>) -> Json<Catalog> {
    Json(state.catalog.clone())
}

async fn channels_api_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Channel>> {
    Json(state.catalog.channels.clone())
}

async fn categories_api_handler(State(state): State<Arc<AppState>>) -> Json<Vec<CategorySummary>> {
    Json(state.catalog.categories.clone())
}

async fn stats_api_handler(State(state): State<Arc<AppState>>) -> Json<ParseStats> {
    Json(state.stats)
}

async fn convert_handler(State(state): State<Arc<AppState>>, body: String) -> Json<Catalog> {
    let conversion = convert_and_record(&state.converter, &body);
    if state.monitoring.log_conversions {
        info!(
            "Converted uploaded playlist: {} channels kept, {} dropped, {} orphan URLs",
            conversion.stats.channels,
            conversion.stats.dropped_entries,
            conversion.stats.orphan_lines
        );
    }
    Json(conversion.catalog)
}

async fn metrics_handler() -> Response {
    match metrics::gather_metrics() {
        Ok(text) => Response::builder()
            .header("Content-Type", "text/plain; version=0.0.4")
            .body(Body::from(text))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            error!("Failed to encode metrics: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
