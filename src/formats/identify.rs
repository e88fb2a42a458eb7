// std imports
use std::collections::HashSet;
use std::path::Path;

// 3rd party imports
use polars::prelude::DataFrame;

// internal imports
use crate::formats::peptide_format::{FormatDescriptor, PeptideFormat, REGISTRY};

/// Matches observed columns against the registry.
/// Returns the first registered format whose columns match, or the open schema
/// descriptor which is aggregated if there is no `replicate` column.
///
/// # Arguments
/// * `columns` - Observed column names in table order
/// * `exact` - If true the column lists must be equal including order, otherwise as sets
///
pub fn identify_format(columns: &[&str], exact: bool) -> FormatDescriptor {
    let observed: HashSet<&str> = columns.iter().copied().collect();
    for format in REGISTRY.iter() {
        let expected = format.get_columns();
        let is_match = if exact {
            columns == expected
        } else {
            observed == expected.iter().copied().collect::<HashSet<&str>>()
        };
        if is_match {
            // registry formats are aggregated by schema
            return FormatDescriptor::new(
                *format,
                format.get_schema_aggregation().unwrap_or(false),
            );
        }
    }
    FormatDescriptor::new(PeptideFormat::OpenHdx, !observed.contains("replicate"))
}

/// Identifies the format of a loaded data file.
/// HXMS files are recognized by their extension, CSV tables by their columns.
///
/// # Arguments
/// * `path` - Path of the data file
/// * `df` - Dataframe read from the file
///
pub fn identify_file_format(path: &Path, df: &DataFrame) -> FormatDescriptor {
    let is_hxms = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("hxms"))
        .unwrap_or(false);
    if is_hxms {
        return PeptideFormat::Hxms.describe(df);
    }
    identify_format(&df.get_column_names(), false)
}
