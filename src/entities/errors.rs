// 3rd party imports
use thiserror::Error;

/// Errors of invalid dataset entities
///
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Sequence length ({actual}) doesn't match N-term({n_term}) to C-term({c_term}): expected {expected}")]
    SequenceLength {
        actual: usize,
        n_term: i64,
        c_term: i64,
        expected: i64,
    },
    #[error("Duplicate state name `{0}`")]
    DuplicateStateName(String),
    #[error("State `{state}` contains more than one {role} peptide set")]
    DuplicatePeptideRole { state: String, role: String },
    #[error("State `{0}` not found in dataset")]
    UnknownState(String),
    #[error("State index {index} out of range, dataset has {len} states")]
    StateIndexOutOfRange { index: usize, len: usize },
}
