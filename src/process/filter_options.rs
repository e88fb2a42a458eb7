// std imports
use std::cmp::Ordering;

// 3rd party imports
use indexmap::IndexMap;
use polars::prelude::*;

// internal imports
use crate::dataframe::errors::TableError;
use crate::dataframe::frame::{require_columns, unique_values};
use crate::dataframe::value::{format_any_value, parse_float};
use crate::process::filters::{filter_expr, Filters};

/// Available values per filter column, serialized as strings, `None` for null
///
pub type FilterOptions = IndexMap<String, Vec<Option<String>>>;

/// Sorts serialized values numerically if every value is a number (including `inf`/`-inf`),
/// otherwise lexicographically. Nulls are last in both cases.
///
/// # Arguments
/// * `values` - Serialized values
///
pub fn sort_serialized(values: &mut [Option<String>]) {
    let numeric = values
        .iter()
        .flatten()
        .all(|value| parse_float(value).is_some());
    values.sort_by(|left, right| match (left, right) {
        (None, None) => Ordering::Equal,
        (None, _) => Ordering::Greater,
        (_, None) => Ordering::Less,
        (Some(left), Some(right)) if numeric => {
            let left = parse_float(left).unwrap_or(f64::NAN);
            let right = parse_float(right).unwrap_or(f64::NAN);
            left.total_cmp(&right)
        }
        (Some(left), Some(right)) => left.cmp(right),
    });
}

/// Computes the values selectable for each filter column.
/// The options of column `i` only consider the chosen values of the columns before `i`,
/// neither its own choice nor choices of later columns. Filters on columns not listed are ignored.
///
/// # Arguments
/// * `df` - Raw dataframe
/// * `filter_columns` - Ordered filter columns
/// * `filters` - Chosen values per column
///
pub fn filter_options(
    df: &DataFrame,
    filter_columns: &[&str],
    filters: &Filters,
) -> Result<FilterOptions, TableError> {
    require_columns(df, filter_columns)?;
    let mut options = FilterOptions::new();
    let mut view = df.clone();
    for column in filter_columns.iter() {
        let unique = unique_values(&view, column)?;
        let mut values: Vec<Option<String>> = unique
            .iter()
            .map(|value| format_any_value(&value))
            .collect();
        sort_serialized(&mut values);
        options.insert(column.to_string(), values);

        // narrow the view for the following columns
        if let Some(filter) = filters.get(*column) {
            let predicate = filter_expr(&view, column, filter)?;
            view = view.lazy().filter(predicate).collect()?;
        }
    }
    Ok(options)
}
