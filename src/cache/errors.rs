// 3rd party imports
use thiserror::Error;

/// Failure to load a table into the cache. Failures are never cached.
///
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Failed to load {path}: {message}")]
pub struct CacheLoadError {
    pub path: String,
    pub message: String,
}
