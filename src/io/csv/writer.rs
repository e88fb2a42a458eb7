// std imports
use std::fs::File;
use std::io::Write;
use std::path::Path;

// 3rd party imports
use anyhow::Result;
use polars::prelude::*;

pub struct Writer {}

impl Writer {
    /// Writes the dataframe as CSV with header, nulls become empty cells
    ///
    /// # Arguments
    /// * `path` - Output path
    /// * `df` - Dataframe to write
    ///
    pub fn write(path: &Path, df: &mut DataFrame) -> Result<()> {
        let mut file = File::create(path)?;
        Self::write_to(&mut file, df)
    }

    pub fn write_to<W: Write>(target: &mut W, df: &mut DataFrame) -> Result<()> {
        CsvWriter::new(target).include_header(true).finish(df)?;
        Ok(())
    }
}
