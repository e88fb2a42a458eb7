/// Errors of the local and remote dataset database
pub mod database_error;
