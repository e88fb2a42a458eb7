// std imports
use std::sync::Arc;

// 3rd party imports
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::info;

// internal imports
use crate::cache::dataframe_cache::CacheStats;
use crate::web::app_state::AppState;

#[derive(Deserialize)]
pub struct InvalidateQuery {
    #[serde(default)]
    file_id: Option<String>,
}

/// Returns size, capacity and load statistics of the dataframe cache.
///
/// # API
/// ## Request
/// * Path: `/api/cache/stats`
/// * Method: `GET`
///
/// ## Response
/// ```json
/// {"size": 2, "max_size": 50, "sessions": 1, "loading": 0, "loads": 2}
/// ```
///
pub async fn get_cache_stats(State(app_state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(app_state.get_dataframe_cache_as_ref().stats())
}

/// Drops the cached dataframes of a session, or of a single file if `file_id` is given.
/// Used when files are replaced or a session ends.
///
/// # API
/// ## Request
/// * Path: `/api/cache/:session_id?file_id=<file_id>`
/// * Method: `DELETE`
///
pub async fn delete_cache_entries(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<InvalidateQuery>,
) -> StatusCode {
    app_state
        .get_dataframe_cache_as_ref()
        .invalidate(&session_id, query.file_id.as_deref());
    info!("Invalidated cache of session {}", session_id);
    StatusCode::NO_CONTENT
}

pub async fn get_health() -> Json<JsonValue> {
    Json(json!({"status": "healthy"}))
}
