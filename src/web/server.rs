// std imports
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

// 3rd party imports
use anyhow::Result;
use axum::routing::{delete, get, post};
use axum::Router;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// internal imports
use crate::entities::configuration::Configuration;
use crate::web::app_state::AppState;
use crate::web::cache_controller::{delete_cache_entries, get_cache_stats, get_health};
use crate::web::dataframe_controller::{
    get_columns, get_dataframe, get_unique_values, post_filter_options,
};
use crate::web::error_controller::page_not_found;
use crate::web::file_store::DirectoryFileStore;
use crate::web::validation_controller::{
    post_validate_metadata, post_validate_protein, post_validate_state,
};

/// Default shutdown signal handler for ctrl-c and terminate signals
///
async fn default_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Builds the router with all routes, CORS and request tracing.
///
/// # Arguments
/// * `app_state` - App state shared by the handlers
///
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(vec![http::header::ACCEPT, http::header::CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        // dataframe routes
        .route("/api/dataframe/columns/:file_id", get(get_columns))
        .route(
            "/api/dataframe/unique-values/:file_id/:column_name",
            get(get_unique_values),
        )
        .route(
            "/api/dataframe/filter-options/:file_id",
            post(post_filter_options),
        )
        .route("/api/dataframe/:file_id", get(get_dataframe))
        // validation routes
        .route("/api/validate/state", post(post_validate_state))
        .route("/api/validate/metadata", post(post_validate_metadata))
        .route("/api/validate/protein", post(post_validate_protein))
        // cache
        .route("/api/cache/stats", get(get_cache_stats))
        .route("/api/cache/:session_id", delete(delete_cache_entries))
        .route("/health", get(get_health))
        .with_state(app_state)
        .fallback(page_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Starts the web server on the given interface and port.
/// Uploaded files are looked up in the configured upload root.
///
/// # Arguments
/// * `configuration` - Configuration
/// * `interface` - Interface to listen on
/// * `port` - Port to listen on
/// * `shutdown_signal` - Optional shutdown signal, defaults to ctrl-c and terminate
///
pub async fn start(
    configuration: Configuration,
    interface: String,
    port: u16,
    shutdown_signal: Option<Pin<Box<dyn Future<Output = ()> + Send + 'static>>>,
) -> Result<()> {
    tracing::info!("Start HDX-MS datasets web server");
    let shutdown_signal = match shutdown_signal {
        Some(signal) => signal,
        None => Box::pin(default_shutdown_signal()),
    };

    tracing::debug!(
        "Serving uploads from {}",
        configuration.get_upload_root().display()
    );
    let file_store = Arc::new(DirectoryFileStore::new(
        configuration.get_upload_root().to_path_buf(),
    ));
    let app_state = Arc::new(AppState::new(configuration, file_store));

    tracing::debug!("Create router...");
    let app = router(app_state);

    tracing::debug!("Bind listener...");
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", interface, port)).await?;
    tracing::info!("Ready for connections, listening on {}:{}", interface, port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

#[cfg(test)]
mod test {
    // 3rd party imports
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value as JsonValue};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    // internal imports
    use super::*;

    const OPEN_HDX_TABLE: &str = "state,exposure,start,end,sequence
apo,0.0,1,5,MSEQN
apo,30.0,1,5,MSEQN
apo,60.0,1,5,MSEQN
holo,0.0,1,5,MSEQN
holo,30.0,1,5,MSEQN
";

    fn app() -> (TempDir, Router) {
        let upload_root = tempdir().unwrap();
        let file_store = DirectoryFileStore::new(upload_root.path().to_path_buf());
        file_store
            .add_file("session", "table", "peptides.csv", OPEN_HDX_TABLE.as_bytes())
            .unwrap();
        let app_state = Arc::new(AppState::new(Configuration::default(), Arc::new(file_store)));
        (upload_root, router(app_state))
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_request(uri: &str, body: JsonValue) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_dataframe_info() {
        let (_dir, app) = app();
        let (status, body) = call(app, get_request("/api/dataframe/table?session_id=session")).await;
        assert_eq!(status, StatusCode::OK);
        let info: JsonValue = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            info,
            json!({
                "file_id": "table",
                "shape": {"rows": 5, "columns": 5},
                "columns": ["state", "exposure", "start", "end", "sequence"]
            })
        );
    }

    #[tokio::test]
    async fn test_columns_and_unique_values() {
        let (_dir, app) = app();
        let (status, body) = call(
            app.clone(),
            get_request("/api/dataframe/columns/table?session_id=session"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let columns: JsonValue = serde_json::from_slice(&body).unwrap();
        assert_eq!(columns["columns"][0], "state");

        let (status, body) = call(
            app.clone(),
            get_request("/api/dataframe/unique-values/table/state?session_id=session"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let unique: JsonValue = serde_json::from_slice(&body).unwrap();
        assert_eq!(unique, json!({"column": "state", "unique_values": ["apo", "holo"]}));

        let (status, body) = call(
            app,
            get_request("/api/dataframe/unique-values/table/charge?session_id=session"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(String::from_utf8(body).unwrap(), "Column 'charge' not found");
    }

    #[tokio::test]
    async fn test_unknown_file() {
        let (_dir, app) = app();
        let (status, body) = call(app, get_request("/api/dataframe/missing?session_id=session")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(String::from_utf8(body).unwrap(), "File not found");
    }

    #[tokio::test]
    async fn test_filter_options() {
        let (_dir, app) = app();
        // filter columns of the identified format
        let (status, body) = call(
            app.clone(),
            post_request(
                "/api/dataframe/filter-options/table?session_id=session",
                json!({"filters": {"state": "holo"}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let options: JsonValue = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            options,
            json!({"state": ["apo", "holo"], "exposure": ["0.0", "30.0"]})
        );

        let (status, _) = call(
            app,
            post_request(
                "/api/dataframe/filter-options/table?session_id=session",
                json!({"filter_columns": ["charge"], "filters": {}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validate_state() {
        let (_dir, app) = app();
        let (status, body) = call(
            app,
            post_request(
                "/api/validate/state",
                json!({
                    "name": "apo",
                    "protein_state": {"sequence": "MSEQN", "n_term": 1, "c_term": 5}
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let response: JsonValue = serde_json::from_slice(&body).unwrap();
        assert_eq!(response["valid"], true);
        assert_eq!(response["warnings"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cache_stats_and_invalidation() {
        let (_dir, app) = app();
        call(app.clone(), get_request("/api/dataframe/table?session_id=session")).await;
        let (status, body) = call(app.clone(), get_request("/api/cache/stats")).await;
        assert_eq!(status, StatusCode::OK);
        let stats: JsonValue = serde_json::from_slice(&body).unwrap();
        assert_eq!(stats["size"], 1);
        assert_eq!(stats["max_size"], 50);

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/cache/session")
            .body(Body::empty())
            .unwrap();
        let (status, _) = call(app.clone(), request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = call(app, get_request("/api/cache/stats")).await;
        let stats: JsonValue = serde_json::from_slice(&body).unwrap();
        assert_eq!(stats["size"], 0);
    }

    #[tokio::test]
    async fn test_health_and_fallback() {
        let (_dir, app) = app();
        let (status, body) = call(app.clone(), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<JsonValue>(&body).unwrap(),
            json!({"status": "healthy"})
        );
        let (status, body) = call(app, get_request("/api/unknown")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(String::from_utf8(body).unwrap(), "Page not found.");
    }
}
