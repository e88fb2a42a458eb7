// 3rd party imports
use polars::prelude::DataFrame;

// internal imports
use crate::dataframe::errors::TableError;
use crate::dataframe::frame::{self, column_names, has_column, sort_by};

/// Row sort keys of a canonical table, keys absent from a table are skipped
///
pub const ROW_SORT_KEYS: [&str; 5] = ["state", "exposure", "start", "end", "replicate"];

/// Column order of a canonical table.
/// Columns not listed here keep their relative order and follow the listed ones.
///
pub const CANONICAL_COLUMN_ORDER: [&str; 30] = [
    "state",
    "exposure",
    "start",
    "end",
    "stop",
    "sequence",
    "replicate",
    "charge",
    "centroid_mz",
    "centroid_mz_sd",
    "centroid_mass",
    "centroid_mass_sd",
    "intensity",
    "rt",
    "rt_sd",
    "uptake",
    "uptake_sd",
    "n_replicates",
    "n_cluster",
    "nd_centroid_mass",
    "nd_centroid_mass_sd",
    "nd_uptake",
    "nd_uptake_sd",
    "fd_centroid_mass",
    "fd_centroid_mass_sd",
    "fd_uptake",
    "fd_uptake_sd",
    "rfu",
    "rfu_sd",
    "max_uptake",
];

/// Sorts rows by (state, exposure, start, end, replicate), using the keys present
///
/// # Arguments
/// * `df` - Canonical dataframe
///
pub fn sort_rows(df: &DataFrame) -> Result<DataFrame, TableError> {
    let keys: Vec<&str> = ROW_SORT_KEYS
        .iter()
        .copied()
        .filter(|key| has_column(df, key))
        .collect();
    sort_by(df, &keys)
}

/// Reorders columns into the canonical order, unknown columns last
///
/// # Arguments
/// * `df` - Canonical dataframe
///
pub fn sort_columns(df: &DataFrame) -> Result<DataFrame, TableError> {
    let mut order: Vec<String> = CANONICAL_COLUMN_ORDER
        .iter()
        .filter(|name| has_column(df, name))
        .map(|name| name.to_string())
        .collect();
    order.extend(
        column_names(df)
            .into_iter()
            .filter(|name| !CANONICAL_COLUMN_ORDER.contains(&name.as_str())),
    );
    Ok(df.select(order)?)
}

/// Removes columns containing only nulls
///
pub fn drop_null_columns(df: &DataFrame) -> DataFrame {
    frame::drop_null_columns(df)
}

#[cfg(test)]
mod test {
    // 3rd party imports
    use polars::prelude::*;

    // internal imports
    use super::*;
    use crate::dataframe::frame::i64_values;

    #[test]
    fn test_sort_columns_keeps_unknown_columns_last() {
        let df = DataFrame::new(vec![
            Series::new("protein", &["secA"]),
            Series::new("end", &[4i64]),
            Series::new("state", &["apo"]),
            Series::new("quality", &[0.9]),
            Series::new("start", &[1i64]),
        ])
        .unwrap();
        let sorted = sort_columns(&df).unwrap();
        assert_eq!(
            column_names(&sorted),
            vec!["state", "start", "end", "protein", "quality"]
        );
    }

    #[test]
    fn test_sort_rows_with_missing_keys() {
        let df = DataFrame::new(vec![
            Series::new("start", &[7i64, 1]),
            Series::new("exposure", &[10.0, 10.0]),
        ])
        .unwrap();
        let sorted = sort_rows(&df).unwrap();
        assert_eq!(i64_values(&sorted, "start").unwrap(), vec![Some(1), Some(7)]);
    }
}
