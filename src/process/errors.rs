// 3rd party imports
use polars::error::PolarsError;
use thiserror::Error;

// internal imports
use crate::dataframe::errors::TableError;
use crate::formats::errors::FormatError;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Aggregation requires a single state, found: {}", .0.join(", "))]
    MultipleStates(Vec<String>),
    #[error("No column to merge on, expected `centroid_mass` or `uptake`")]
    NoMergeColumn,
    #[error("{role} control is not unique on (start, end)")]
    NonUniqueControl { role: String },
    #[error("Cannot derive `{column}`: {reason}")]
    DerivationFailed { column: String, reason: String },
    #[error("Unknown unit `{0}`")]
    UnknownUnit(String),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl From<PolarsError> for ProcessError {
    fn from(err: PolarsError) -> Self {
        ProcessError::Table(TableError::Polars(err))
    }
}
