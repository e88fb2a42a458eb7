//! Contains formatting functions for displaying data in a (human-)readable format.

// std imports
use std::fmt::Write;

// 3rd party imports
use polars::prelude::DataFrame;

// internal imports
use crate::dataframe::frame::column_names;
use crate::dataframe::value::format_any_value;

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Converts a number of bytes into a human-readable format.
/// E.g. 11811160064 -> "11.00 GB"
///
/// # Arguments
/// * `num_bytes` - The number of bytes to convert.
///
pub fn bytes_to_human_readable(num_bytes: u64) -> String {
    let mut size = num_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, BYTE_UNITS[unit])
}

/// Renders the first rows of a dataframe as aligned text, followed by its shape.
///
/// # Arguments
/// * `df` - Dataframe to display
/// * `max_rows` - Maximum number of rows to print
///
pub fn dataframe_preview(df: &DataFrame, max_rows: usize) -> String {
    let shown = df.height().min(max_rows);
    let names = column_names(df);
    let cells: Vec<Vec<String>> = df
        .head(Some(shown))
        .get_columns()
        .iter()
        .map(|column| {
            column
                .iter()
                .map(|value| format_any_value(&value).unwrap_or_else(|| "null".to_string()))
                .collect()
        })
        .collect();
    let widths: Vec<usize> = names
        .iter()
        .zip(cells.iter())
        .map(|(name, column)| {
            column
                .iter()
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut preview = String::new();
    let header: Vec<String> = names
        .iter()
        .zip(widths.iter())
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect();
    let _ = writeln!(preview, "{}", header.join(" | ").trim_end());
    for row in 0..shown {
        let line: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(column, width)| format!("{:<width$}", column[row], width = width))
            .collect();
        let _ = writeln!(preview, "{}", line.join(" | ").trim_end());
    }
    if shown < df.height() {
        let _ = writeln!(preview, "...");
    }
    let _ = write!(preview, "shape: ({}, {})", df.height(), df.width());
    preview
}

#[cfg(test)]
mod test {
    // 3rd party imports
    use polars::prelude::*;

    // internal imports
    use super::*;

    #[test]
    fn test_bytes_to_human_readable() {
        assert_eq!(bytes_to_human_readable(512), "512.00 B");
        assert_eq!(bytes_to_human_readable(2048), "2.00 KB");
        assert_eq!(bytes_to_human_readable(11811160064), "11.00 GB");
    }

    #[test]
    fn test_dataframe_preview() {
        let df = DataFrame::new(vec![
            Series::new("start", &[1i64, 11, 21]),
            Series::new("uptake", &[Some(2.5), None, Some(3.0)]),
        ])
        .unwrap();
        assert_eq!(
            dataframe_preview(&df, 2),
            "start | uptake\n1     | 2.5\n11    | null\n...\nshape: (3, 2)"
        );
    }
}
