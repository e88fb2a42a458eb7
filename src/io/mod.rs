// std imports
use std::path::Path;

// 3rd party imports
use anyhow::{bail, Result};
use polars::prelude::DataFrame;

/// IO for comma separated tables
pub mod csv;
/// IO for HXMS files
pub mod hxms;
/// IO for Parquet files
pub mod parquet;

/// Lower case extension of a path, empty if there is none
///
fn extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Reads a peptide table, the reader is chosen by the file extension (`.csv`, `.hxms` or `.parquet`)
///
/// # Arguments
/// * `path` - Path of the data file
///
pub fn load_data(path: &Path) -> Result<DataFrame> {
    let extension = extension(path);
    match extension.as_str() {
        "csv" => self::csv::reader::Reader::read(path),
        "hxms" => Ok(self::hxms::reader::Reader::read(path)?.into_data()),
        "parquet" => self::parquet::reader::Reader::read(path),
        _ => bail!(
            "Unsupported file format `.{}` of {}",
            extension,
            path.display()
        ),
    }
}

/// Writes a dataframe as CSV or Parquet, chosen by the file extension
///
/// # Arguments
/// * `path` - Output path
/// * `df` - Dataframe to write
///
pub fn write_data(path: &Path, df: &mut DataFrame) -> Result<()> {
    let extension = extension(path);
    match extension.as_str() {
        "csv" => self::csv::writer::Writer::write(path, df),
        "parquet" => self::parquet::writer::Writer::write(path, df),
        _ => bail!(
            "Cannot write `.{}` files, use .csv or .parquet for {}",
            extension,
            path.display()
        ),
    }
}

#[cfg(test)]
mod test {
    // 3rd party imports
    use tempfile::tempdir;

    // internal imports
    use super::*;
    use crate::dataframe::frame::{column_names, str_values};

    #[test]
    fn test_unsupported_extension() {
        let err = load_data(Path::new("test_files/peptides.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }

    #[test]
    fn test_dispatch_by_extension() {
        let df = load_data(Path::new("test_files/secb.hxms")).unwrap();
        assert_eq!(df.shape(), (12, 10));
        assert_eq!(
            str_values(&df, "sequence").unwrap()[0],
            Some("MSEQNNTEMT".to_string())
        );

        let df = load_data(Path::new("test_files/dynamx_v3_state.csv")).unwrap();
        assert_eq!(df.shape(), (8, 16));
    }

    #[test]
    fn test_csv_to_parquet() {
        let dir = tempdir().unwrap();
        let mut df = load_data(Path::new("test_files/dynamx_v3_state.csv")).unwrap();
        let path = dir.path().join("state.parquet");
        write_data(&path, &mut df).unwrap();
        let read = load_data(&path).unwrap();
        assert_eq!(read.shape(), (8, 16));
        assert_eq!(column_names(&read), column_names(&df));
        assert_eq!(str_values(&read, "State").unwrap(), str_values(&df, "State").unwrap());

        assert!(write_data(&dir.path().join("state.hxms"), &mut df).is_err());
    }
}
