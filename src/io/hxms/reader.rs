// std imports
use std::path::Path;

// 3rd party imports
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use polars::prelude::*;
use tracing::warn;

// internal imports
use crate::dataframe::frame::is_unique_by;
use crate::dataframe::value::parse_float;

/// Type of a `TP` record cell
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellType {
    Int,
    Float,
    Str,
}

/// Data columns of the `TP` records with their type, in file order.
/// `ENVELOPE` is a comma separated list of floats and kept as string.
///
pub const HXMS_COLUMNS: [(&str, CellType); 9] = [
    ("INDEX", CellType::Int),
    ("MOD", CellType::Str),
    ("START", CellType::Int),
    ("END", CellType::Int),
    ("REP", CellType::Int),
    ("PTM_ID", CellType::Int),
    ("TIME(Sec)", CellType::Float),
    ("UPTAKE", CellType::Float),
    ("ENVELOPE", CellType::Str),
];

/// Metadata key holding the full protein sequence
///
pub const PROTEIN_SEQUENCE_KEY: &str = "PROTEIN_SEQUENCE";

/// Content of a HXMS file
///
#[derive(Debug)]
pub struct HxmsFile {
    header: Vec<String>,
    metadata: IndexMap<String, String>,
    remarks: IndexMap<String, String>,
    data: DataFrame,
}

impl HxmsFile {
    pub fn get_header(&self) -> &[String] {
        &self.header
    }

    pub fn get_metadata(&self) -> &IndexMap<String, String> {
        &self.metadata
    }

    pub fn get_remarks(&self) -> &IndexMap<String, String> {
        &self.remarks
    }

    pub fn get_data(&self) -> &DataFrame {
        &self.data
    }

    pub fn into_data(self) -> DataFrame {
        self.data
    }
}

/// Returns the content of a record line without its prefix
///
fn line_content(line: &str) -> Vec<&str> {
    line.split_whitespace().skip(1).collect()
}

/// Adds a key value record to the given map, records with other than two items are ignored
///
fn insert_key_value(line: &str, map: &mut IndexMap<String, String>) {
    if let [key, value] = line_content(line).as_slice() {
        map.insert(key.to_string(), value.to_string());
    }
}

fn is_valid_cell(raw: &str, cell_type: CellType) -> bool {
    match cell_type {
        CellType::Int => raw.parse::<i64>().is_ok(),
        CellType::Float => parse_float(raw).is_some(),
        CellType::Str => true,
    }
}

/// Builds a typed column from validated cells
///
fn typed_series(name: &str, cell_type: CellType, cells: &[Option<String>]) -> Series {
    match cell_type {
        CellType::Int => Series::new(
            name,
            cells
                .iter()
                .map(|cell| cell.as_deref().and_then(|raw| raw.parse::<i64>().ok()))
                .collect::<Vec<Option<i64>>>(),
        ),
        CellType::Float => Series::new(
            name,
            cells
                .iter()
                .map(|cell| cell.as_deref().and_then(parse_float))
                .collect::<Vec<Option<f64>>>(),
        ),
        CellType::Str => Series::new(name, cells),
    }
}

pub struct Reader {}

impl Reader {
    /// Reads a HXMS file
    ///
    /// # Arguments
    /// * `path` - Path to the HXMS file
    ///
    pub fn read(path: &Path) -> Result<HxmsFile> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parses the content of a HXMS file.
    /// Peptide sequences are cut from the `PROTEIN_SEQUENCE` metadata,
    /// where `START` is 1-based and `END` inclusive.
    ///
    /// # Arguments
    /// * `content` - File content
    ///
    pub fn parse(content: &str) -> Result<HxmsFile> {
        let mut header: Vec<String> = Vec::new();
        let mut metadata: IndexMap<String, String> = IndexMap::new();
        let mut remarks: IndexMap<String, String> = IndexMap::new();
        let mut title_columns: Option<Vec<String>> = None;

        let mut lines = content.lines().enumerate();
        for (_, line) in lines.by_ref() {
            if let Some(rest) = line.strip_prefix("HEADER") {
                header.push(rest.trim().to_string());
            } else if line.starts_with("METADATA") {
                insert_key_value(line, &mut metadata);
            } else if line.starts_with("REMARK") {
                insert_key_value(line, &mut remarks);
            } else if line.starts_with("TITLE_TP") {
                title_columns = Some(line_content(line).iter().map(|c| c.to_string()).collect());
                break;
            }
        }

        let title_columns = match title_columns {
            Some(columns) => columns,
            None => bail!("HXMS file contains no TITLE_TP record"),
        };
        let sequence: Vec<char> = match metadata.get(PROTEIN_SEQUENCE_KEY) {
            Some(sequence) => sequence.chars().collect(),
            None => bail!("HXMS file contains no {} metadata", PROTEIN_SEQUENCE_KEY),
        };

        let num_columns = title_columns.len().min(HXMS_COLUMNS.len());
        let used_columns = &HXMS_COLUMNS[..num_columns];
        let expected: Vec<&str> = used_columns.iter().map(|(name, _)| *name).collect();
        if title_columns != expected {
            warn!(
                "Columns in HXMS file do not match expected columns. Found: {:?}, expected: {:?}",
                title_columns, expected
            );
        }

        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); num_columns];
        let mut sequences: Vec<String> = Vec::new();
        for (line_idx, line) in lines {
            if !line.starts_with("TP") {
                continue;
            }
            let content = line_content(line);
            let mut start: Option<i64> = None;
            let mut end: Option<i64> = None;
            for (idx, (name, cell_type)) in used_columns.iter().enumerate() {
                let cell = content.get(idx).copied();
                if let Some(raw) = cell {
                    if !is_valid_cell(raw, *cell_type) {
                        bail!(
                            "Invalid value `{}` for {} in line {}",
                            raw,
                            name,
                            line_idx + 1
                        );
                    }
                }
                match *name {
                    "START" => start = cell.and_then(|raw| raw.parse().ok()),
                    "END" => end = cell.and_then(|raw| raw.parse().ok()),
                    _ => {}
                }
                columns[idx].push(cell.map(str::to_string));
            }
            let peptide = match (start, end) {
                (Some(start), Some(end))
                    if start >= 1 && end >= start && end as usize <= sequence.len() =>
                {
                    sequence[(start as usize - 1)..(end as usize)].iter().collect::<String>()
                }
                _ => bail!(
                    "Peptide in line {} is outside of the protein sequence",
                    line_idx + 1
                ),
            };
            sequences.push(peptide);
        }

        let mut series: Vec<Series> = used_columns
            .iter()
            .zip(columns.iter())
            .map(|((name, cell_type), cells)| typed_series(name, *cell_type, cells))
            .collect();
        series.push(Series::new("sequence", sequences));

        Ok(HxmsFile {
            header,
            metadata,
            remarks,
            data: DataFrame::new(series)?,
        })
    }
}

/// A HXMS table is aggregated if every row is a distinct (START, END, TIME(Sec)) combination
///
/// # Arguments
/// * `df` - Dataframe read from a HXMS file
///
pub fn is_aggregated(df: &DataFrame) -> Result<bool> {
    Ok(is_unique_by(df, &["START", "END", "TIME(Sec)"])?)
}

#[cfg(test)]
mod test {
    // internal imports
    use super::*;
    use crate::dataframe::frame::{f64_values, str_values};

    const HXMS: &str = "HEADER hxms example\n\
        METADATA PROTEIN_SEQUENCE MKTAYIAKQR\n\
        METADATA PH 7.5\n\
        REMARK software test\n\
        TITLE_TP INDEX MOD START END REP PTM_ID TIME(Sec) UPTAKE ENVELOPE\n\
        TP 1 0 1 4 1 0 30.0 1.25 0.1,0.5,0.4\n\
        TP 2 0 1 4 2 0 30.0 1.35 0.2,0.5,0.3\n\
        TP 3 0 3 7 1 0 60.0 2.5 0.3,0.4,0.3\n";

    #[test]
    fn test_parse() {
        let hxms = Reader::parse(HXMS).unwrap();
        assert_eq!(hxms.get_header(), &["hxms example".to_string()]);
        assert_eq!(hxms.get_metadata().get("PH").unwrap(), "7.5");
        assert_eq!(hxms.get_remarks().get("software").unwrap(), "test");
        let data = hxms.get_data();
        assert_eq!(data.shape(), (3, 10));
        assert_eq!(
            str_values(data, "sequence").unwrap(),
            vec![
                Some("MKTA".to_string()),
                Some("MKTA".to_string()),
                Some("TAYIA".to_string())
            ]
        );
        assert_eq!(data.column("START").unwrap().dtype(), &DataType::Int64);
        assert_eq!(f64_values(data, "UPTAKE").unwrap()[2], Some(2.5));
        assert!(!is_aggregated(data).unwrap());
    }

    #[test]
    fn test_peptide_outside_sequence() {
        let content = HXMS.replace("TP 3 0 3 7", "TP 3 0 3 70");
        assert!(Reader::parse(&content).is_err());
    }

    #[test]
    fn test_invalid_cell() {
        let content = HXMS.replace("TP 2 0 1 4 2", "TP 2 0 1 4 two");
        let err = Reader::parse(&content).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value `two` for REP in line 7");
    }

    #[test]
    fn test_missing_sequence() {
        let content = HXMS.replace("METADATA PROTEIN_SEQUENCE MKTAYIAKQR\n", "");
        assert!(Reader::parse(&content).is_err());
    }
}
