// std imports
use std::fs::File;
use std::io::Cursor;
use std::path::Path;

// 3rd party imports
use anyhow::{Context, Result};
use polars::prelude::*;

/// Options shared by file and buffer reads.
/// The schema is inferred from all rows, empty cells are null.
///
fn read_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
}

pub struct Reader {}

impl Reader {
    /// Reads a CSV file with header line.
    /// Columns become integer, float (`inf` and `NaN` included) or string by polars schema inference.
    ///
    /// # Arguments
    /// * `path` - Path to the CSV file
    ///
    pub fn read(path: &Path) -> Result<DataFrame> {
        let file =
            File::open(path).with_context(|| format!("Could not read {}", path.display()))?;
        read_options()
            .into_reader_with_file_handle(file)
            .finish()
            .with_context(|| format!("Could not parse {}", path.display()))
    }

    /// Reads CSV data from a buffer, e.g. an uploaded file
    ///
    /// # Arguments
    /// * `content` - CSV content with header line
    ///
    pub fn read_from(content: Vec<u8>) -> Result<DataFrame> {
        Ok(read_options()
            .into_reader_with_file_handle(Cursor::new(content))
            .finish()?)
    }
}

#[cfg(test)]
mod test {
    // internal imports
    use super::*;
    use crate::dataframe::frame::f64_values;

    #[test]
    fn test_read() {
        let df = Reader::read(Path::new("test_files/dynamx_v3_state.csv")).unwrap();
        assert_eq!(df.shape(), (8, 16));
        assert_eq!(df.column("Start").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("Exposure").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("State").unwrap().dtype(), &DataType::String);
        // empty column
        let modification = df.column("Modification").unwrap();
        assert_eq!(modification.null_count(), modification.len());
    }

    #[test]
    fn test_inference() {
        let data = "exposure,label,count\n15s,a,1\n,b,\n20s,c,3\n";
        let df = Reader::read_from(data.as_bytes().to_vec()).unwrap();
        assert_eq!(df.column("exposure").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("exposure").unwrap().null_count(), 1);
        assert_eq!(df.column("count").unwrap().dtype(), &DataType::Int64);

        let data = "exposure\n0\ninf\n30.5\n";
        let df = Reader::read_from(data.as_bytes().to_vec()).unwrap();
        assert_eq!(
            f64_values(&df, "exposure").unwrap(),
            vec![Some(0.0), Some(f64::INFINITY), Some(30.5)]
        );
    }

    #[test]
    fn test_missing_file() {
        let err = Reader::read(Path::new("test_files/missing.csv")).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.csv"));
    }
}
