/// App state shared by the handlers
pub mod app_state;
/// Statistics and invalidation of the dataframe cache, health check
pub mod cache_controller;
/// Preview, columns, unique values and filter options of uploaded files
pub mod dataframe_controller;
/// Fallback for unknown routes
pub mod error_controller;
/// Lookup of uploaded files
pub mod file_store;
/// Web server definition
pub mod server;
/// Validation of states and metadata before a dataset is assembled
pub mod validation_controller;
/// Wrapper for anyhow::Error
pub mod web_error;
