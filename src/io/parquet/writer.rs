// std imports
use std::fs::File;
use std::path::Path;

// 3rd party imports
use anyhow::Result;
use polars::prelude::*;

pub struct Writer {}

impl Writer {
    /// Writes the dataframe as Parquet
    ///
    /// # Arguments
    /// * `path` - Output path
    /// * `df` - Dataframe to write
    ///
    pub fn write(path: &Path, df: &mut DataFrame) -> Result<()> {
        let file = File::create(path)?;
        ParquetWriter::new(file).finish(df)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    // 3rd party imports
    use tempfile::tempdir;

    // internal imports
    use super::*;
    use crate::dataframe::frame::{column_names, f64_values, i64_values};
    use crate::io::parquet::reader::Reader;

    #[test]
    fn test_write_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("peptides.parquet");
        let mut df = DataFrame::new(vec![
            Series::new("start", &[1i64, 11]),
            Series::new("end", &[10i64, 20]),
            Series::new("uptake", &[Some(2.5), None]),
        ])
        .unwrap();
        Writer::write(&path, &mut df).unwrap();

        let read = Reader::read(&path).unwrap();
        assert_eq!(column_names(&read), vec!["start", "end", "uptake"]);
        assert_eq!(i64_values(&read, "end").unwrap(), vec![Some(10), Some(20)]);
        assert_eq!(f64_values(&read, "uptake").unwrap(), vec![Some(2.5), None]);
    }
}
