// std imports
use std::path::PathBuf;

// 3rd party imports
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Invalid dataset ID: {0}. A valid ID starts with 'HDX_' followed by 8 uppercase alphanumeric characters.")]
    InvalidId(String),
    #[error("{0} is not a dataset, no dataset.json found")]
    NotADataset(PathBuf),
    #[error("Error fetching {url}: {status}")]
    Fetch { url: String, status: u16 },
}
