// 3rd party imports
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Missing column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}
