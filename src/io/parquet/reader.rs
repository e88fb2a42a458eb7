// std imports
use std::fs::File;
use std::path::Path;

// 3rd party imports
use anyhow::{Context, Result};
use polars::prelude::*;

pub struct Reader {}

impl Reader {
    /// Reads a Parquet file, column types are taken from the file schema
    ///
    /// # Arguments
    /// * `path` - Path to the Parquet file
    ///
    pub fn read(path: &Path) -> Result<DataFrame> {
        let file =
            File::open(path).with_context(|| format!("Could not read {}", path.display()))?;
        Ok(ParquetReader::new(file).finish()?)
    }
}
