// 3rd party imports
use axum::http::{Method, Uri};
use tracing::debug;

// internal imports
use crate::web::web_error::WebError;

/// Fallback for requests without a matching route.
///
pub async fn page_not_found(method: Method, uri: Uri) -> WebError {
    debug!("No route for {} {}", method, uri);
    WebError::not_found("Page not found.".to_string())
}
