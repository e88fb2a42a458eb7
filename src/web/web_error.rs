// std imports
use std::fmt;

// 3rd party imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

// internal imports
use crate::cache::errors::CacheLoadError;
use crate::dataframe::errors::TableError;

/// Error returned by the API handlers.
/// Rendered as plain text body with the given status.
///
#[derive(Debug)]
pub struct WebError {
    status_code: StatusCode,
    msg: String,
}

impl WebError {
    /// # Arguments
    /// * `status_code` - Status of the response
    /// * `msg` - Response body
    ///
    pub fn new(status_code: StatusCode, msg: String) -> Self {
        Self { status_code, msg }
    }

    pub fn not_found(msg: String) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn bad_request(msg: String) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn get_status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn get_msg(&self) -> &str {
        &self.msg
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            tracing::error!("{}", self);
        }
        (self.status_code, self.msg).into_response()
    }
}

/// Unexpected failures (I/O, serialization) end up as 500
///
impl From<anyhow::Error> for WebError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err))
    }
}

impl From<CacheLoadError> for WebError {
    fn from(err: CacheLoadError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to load dataframe: {}", err),
        )
    }
}

/// Table errors are caused by the request (unknown columns etc.)
///
impl From<TableError> for WebError {
    fn from(err: TableError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status_code.as_u16(), self.msg)
    }
}
