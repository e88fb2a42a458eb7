// 3rd party imports
use polars::error::PolarsError;
use thiserror::Error;

// internal imports
use crate::dataframe::errors::TableError;

#[derive(Error, Debug)]
pub enum FormatError {
    /// Configuration error, the format name is unknown
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    /// Schema error, the table lacks columns the format requires
    #[error("Schema error, missing column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Invalid value `{value}` in column `{column}`")]
    InvalidValue { column: String, value: String },
    #[error(transparent)]
    Table(TableError),
}

impl From<TableError> for FormatError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::MissingColumns(columns) => FormatError::MissingColumns(columns),
            other => FormatError::Table(other),
        }
    }
}

impl From<PolarsError> for FormatError {
    fn from(err: PolarsError) -> Self {
        FormatError::Table(TableError::Polars(err))
    }
}
