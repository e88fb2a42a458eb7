// std imports
use std::path::PathBuf;
use std::sync::Arc;

// 3rd party imports
use axum::extract::{Json, Path, Query, State};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// internal imports
use crate::dataframe::frame::{column_names, has_column, unique_values};
use crate::dataframe::value::any_value_to_json;
use crate::formats::identify::identify_file_format;
use crate::process::filter_options::{filter_options, FilterOptions};
use crate::process::filters::Filters;
use crate::web::app_state::AppState;
use crate::web::web_error::WebError;

#[derive(Deserialize)]
pub struct SessionQuery {
    session_id: String,
}

#[derive(Serialize)]
pub struct Shape {
    rows: usize,
    columns: usize,
}

#[derive(Serialize)]
pub struct DataframeInfo {
    file_id: String,
    shape: Shape,
    columns: Vec<String>,
}

#[derive(Serialize)]
pub struct DataframeColumns {
    columns: Vec<String>,
}

#[derive(Serialize)]
pub struct UniqueValues {
    column: String,
    unique_values: Vec<JsonValue>,
}

#[derive(Deserialize)]
pub struct FilterOptionsRequest {
    #[serde(default)]
    filter_columns: Option<Vec<String>>,
    #[serde(default)]
    filters: Filters,
}

/// Resolves the file and returns its path together with the (cached) dataframe
///
async fn load_dataframe(
    app_state: &AppState,
    session_id: &str,
    file_id: &str,
) -> Result<(PathBuf, Arc<DataFrame>), WebError> {
    let path = match app_state
        .get_file_store_as_ref()
        .resolve(session_id, file_id)?
    {
        Some(path) => path,
        None => return Err(WebError::not_found("File not found".to_string())),
    };
    let df = app_state
        .get_dataframe_cache_as_ref()
        .get(session_id, file_id, &path)
        .await?;
    Ok((path, df))
}

/// Returns shape and column names of an uploaded file.
///
/// # Arguments
/// * `app_state` - App state
/// * `file_id` - File ID
/// * `session_id` - Session ID as query parameter
///
/// # API
/// ## Request
/// * Path: `/api/dataframe/:file_id?session_id=<session_id>`
/// * Method: `GET`
///
/// ## Response
/// ```json
/// {"file_id": "abc", "shape": {"rows": 8, "columns": 16}, "columns": ["Protein", "Start", ...]}
/// ```
///
pub async fn get_dataframe(
    State(app_state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<DataframeInfo>, WebError> {
    let (_, df) = load_dataframe(&app_state, &query.session_id, &file_id).await?;
    let (rows, columns) = df.shape();
    Ok(Json(DataframeInfo {
        columns: column_names(&df),
        file_id,
        shape: Shape { rows, columns },
    }))
}

/// Returns the column names of an uploaded file.
///
/// # API
/// ## Request
/// * Path: `/api/dataframe/columns/:file_id?session_id=<session_id>`
/// * Method: `GET`
///
pub async fn get_columns(
    State(app_state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<DataframeColumns>, WebError> {
    let (_, df) = load_dataframe(&app_state, &query.session_id, &file_id).await?;
    Ok(Json(DataframeColumns {
        columns: column_names(&df),
    }))
}

/// Returns the distinct values of a column in order of first appearance.
///
/// # API
/// ## Request
/// * Path: `/api/dataframe/unique-values/:file_id/:column_name?session_id=<session_id>`
/// * Method: `GET`
///
/// ## Response
/// ```json
/// {"column": "State", "unique_values": ["SecB WT apo", "SecB his dimer apo"]}
/// ```
///
pub async fn get_unique_values(
    State(app_state): State<Arc<AppState>>,
    Path((file_id, column_name)): Path<(String, String)>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<UniqueValues>, WebError> {
    let (_, df) = load_dataframe(&app_state, &query.session_id, &file_id).await?;
    if !has_column(&df, &column_name) {
        return Err(WebError::not_found(format!(
            "Column '{}' not found",
            column_name
        )));
    }
    let unique_values = unique_values(&df, &column_name)?
        .iter()
        .map(|value| any_value_to_json(&value))
        .collect();
    Ok(Json(UniqueValues {
        column: column_name,
        unique_values,
    }))
}

/// Cascading filter options. Without `filter_columns` the filter columns
/// of the identified format are used.
///
/// # API
/// ## Request
/// * Path: `/api/dataframe/filter-options/:file_id?session_id=<session_id>`
/// * Method: `POST`
/// * Body:
///     ```json
///     {"filter_columns": ["State", "Exposure"], "filters": {"State": "SecB WT apo"}}
///     ```
///
/// ## Response
/// ```json
/// {"State": ["SecB WT apo", "SecB his dimer apo"], "Exposure": ["0.0", "0.5"]}
/// ```
///
pub async fn post_filter_options(
    State(app_state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
    Query(query): Query<SessionQuery>,
    Json(request): Json<FilterOptionsRequest>,
) -> Result<Json<FilterOptions>, WebError> {
    let (path, df) = load_dataframe(&app_state, &query.session_id, &file_id).await?;
    let filter_columns: Vec<&str> = match request.filter_columns.as_ref() {
        Some(columns) => columns.iter().map(String::as_str).collect(),
        None => identify_file_format(&path, &df)
            .get_filter_columns()
            .to_vec(),
    };
    let options = filter_options(&df, &filter_columns, &request.filters)?;
    Ok(Json(options))
}
