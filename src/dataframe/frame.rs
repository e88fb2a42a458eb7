// 3rd party imports
use polars::prelude::*;

// internal imports
use crate::dataframe::errors::TableError;

/// True if the dataframe has a column with the given name
///
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().contains(&name)
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Fails with all missing columns at once
///
/// # Arguments
/// * `df` - Dataframe to check
/// * `names` - Required columns
///
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<(), TableError> {
    let present = df.get_column_names();
    let missing: Vec<String> = names
        .iter()
        .filter(|name| !present.contains(*name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(TableError::MissingColumns(missing));
    }
    Ok(())
}

/// Column by name, a missing column is reported as [TableError::MissingColumns]
///
pub fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series, TableError> {
    require_columns(df, &[name])?;
    Ok(df.column(name)?)
}

/// Values of a column as floats, values which cannot be cast are null
///
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, TableError> {
    let series = column(df, name)?.cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().collect();
    Ok(values)
}

/// Values of a column as integers, values which cannot be cast are null
///
pub fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>, TableError> {
    let series = column(df, name)?.cast(&DataType::Int64)?;
    let values = series.i64()?.into_iter().collect();
    Ok(values)
}

/// Values of a column as text
///
pub fn str_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, TableError> {
    let series = column(df, name)?.cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(values)
}

/// Distinct values of a column in order of first appearance, null included
///
pub fn unique_values(df: &DataFrame, name: &str) -> Result<Series, TableError> {
    Ok(column(df, name)?.unique_stable()?)
}

/// Inserts the series right after column `after`.
/// A column with the same name is moved to the new position.
///
/// # Arguments
/// * `df` - Dataframe to modify
/// * `after` - Column to insert after
/// * `series` - New column
///
pub fn insert_column_after(
    df: &mut DataFrame,
    after: &str,
    series: Series,
) -> Result<(), TableError> {
    let name = series.name().to_string();
    if name != after && has_column(df, &name) {
        df.drop_in_place(&name)?;
    }
    let idx = match df.get_column_names().iter().position(|column| *column == after) {
        Some(idx) => idx,
        None => return Err(TableError::MissingColumns(vec![after.to_string()])),
    };
    df.insert_column(idx + 1, series)?;
    Ok(())
}

/// Stable sort by the given columns, ascending with nulls last
///
/// # Arguments
/// * `df` - Dataframe to sort
/// * `keys` - Sort columns, most significant first
///
pub fn sort_by(df: &DataFrame, keys: &[&str]) -> Result<DataFrame, TableError> {
    if keys.is_empty() {
        return Ok(df.clone());
    }
    require_columns(df, keys)?;
    Ok(df.sort(
        keys.to_vec(),
        SortMultipleOptions::default()
            .with_nulls_last(true)
            .with_maintain_order(true),
    )?)
}

/// True if no two rows share the same values in `keys`
///
pub fn is_unique_by(df: &DataFrame, keys: &[&str]) -> Result<bool, TableError> {
    require_columns(df, keys)?;
    Ok(!df.select(keys.to_vec())?.is_duplicated()?.any())
}

/// Removes the columns consisting of nulls only, columns of an empty dataframe are kept
///
pub fn drop_null_columns(df: &DataFrame) -> DataFrame {
    let empty: Vec<&str> = df
        .get_columns()
        .iter()
        .filter(|series| !series.is_empty() && series.null_count() == series.len())
        .map(|series| series.name())
        .collect();
    df.drop_many(&empty)
}

#[cfg(test)]
mod test {
    // internal imports
    use super::*;

    fn peptides() -> DataFrame {
        DataFrame::new(vec![
            Series::new("start", &[Some(5i64), None, Some(1), Some(5)]),
            Series::new("end", &[10i64, 8, 4, 9]),
            Series::new("label", &["a", "b", "c", "d"]),
            Series::new("empty", &[None::<f64>, None, None, None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_require_columns_reports_all_missing() {
        let err = require_columns(&peptides(), &["start", "charge", "rt"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing column(s): charge, rt");
        assert!(matches!(
            column(&peptides(), "charge"),
            Err(TableError::MissingColumns(_))
        ));
    }

    #[test]
    fn test_sort_is_stable_with_nulls_last() {
        let sorted = sort_by(&peptides(), &["start"]).unwrap();
        assert_eq!(
            str_values(&sorted, "label").unwrap(),
            vec![
                Some("c".to_string()),
                Some("a".to_string()),
                Some("d".to_string()),
                Some("b".to_string())
            ]
        );
    }

    #[test]
    fn test_insert_column_after_moves_existing() {
        let mut df = peptides();
        insert_column_after(&mut df, "start", Series::new("label", &["w", "x", "y", "z"]))
            .unwrap();
        assert_eq!(column_names(&df), vec!["start", "label", "end", "empty"]);
        assert!(insert_column_after(&mut df, "stop", Series::new("x", &[1i64; 4])).is_err());
    }

    #[test]
    fn test_uniqueness_and_unique_values() {
        let df = peptides();
        assert!(is_unique_by(&df, &["start", "end"]).unwrap());
        assert!(!is_unique_by(&df, &["start"]).unwrap());
        let unique = unique_values(&df, "start").unwrap();
        assert_eq!(unique.len(), 3);
        assert_eq!(unique.get(0).unwrap(), AnyValue::Int64(5));
    }

    #[test]
    fn test_value_extraction_and_null_columns() {
        let df = peptides();
        assert_eq!(f64_values(&df, "end").unwrap()[0], Some(10.0));
        assert_eq!(i64_values(&df, "start").unwrap()[1], None);
        let dropped = drop_null_columns(&df);
        assert_eq!(column_names(&dropped), vec!["start", "end", "label"]);
    }
}
