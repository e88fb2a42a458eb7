// std imports
use std::path::PathBuf;

// 3rd party imports
use thiserror::Error;

// internal imports
use crate::dataframe::errors::TableError;

/// Errors of dataset verification
///
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Length mismatch at {start}:{end} with sequence {sequence}")]
    PeptideLength {
        start: i64,
        end: i64,
        sequence: String,
    },
    #[error("Peptide {start}:{end} is outside of the protein sequence starting at {n_term} with {length} residues")]
    OutOfRange {
        start: i64,
        end: i64,
        n_term: i64,
        length: usize,
    },
    #[error("State: {state}, Peptides[{index}] does not match protein sequence, mismatches: {mismatches:?}")]
    SequenceMismatch {
        state: String,
        index: usize,
        mismatches: Vec<(i64, char, char)>,
    },
    #[error("Missing datafiles: {0:?}")]
    MissingDataFiles(Vec<PathBuf>),
    #[error("Dataset file hash is not set")]
    MissingFileHash,
    #[error(transparent)]
    Table(#[from] TableError),
}
