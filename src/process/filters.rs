// 3rd party imports
use indexmap::IndexMap;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// internal imports
use crate::dataframe::errors::TableError;
use crate::dataframe::frame::column;
use crate::dataframe::value::{json_to_f64, json_to_string};

/// Filter on a single column, a scalar selects by equality, a list by membership
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    List(Vec<JsonValue>),
    Scalar(JsonValue),
}

impl FilterValue {
    /// Returns the filter values
    ///
    pub fn values(&self) -> Vec<&JsonValue> {
        match self {
            FilterValue::List(values) => values.iter().collect(),
            FilterValue::Scalar(value) => vec![value],
        }
    }
}

impl From<JsonValue> for FilterValue {
    fn from(value: JsonValue) -> Self {
        FilterValue::Scalar(value)
    }
}

impl From<Vec<JsonValue>> for FilterValue {
    fn from(values: Vec<JsonValue>) -> Self {
        FilterValue::List(values)
    }
}

/// Column name to filter, applied in insertion order
///
pub type Filters = IndexMap<String, FilterValue>;

/// Returns the predicate of rows matching a single column filter.
/// Filter values are cast to the column dtype first, values which cannot be cast match nothing.
///
/// # Arguments
/// * `df` - Dataframe to filter
/// * `name` - Column name
/// * `filter` - Accepted value(s)
///
pub fn filter_expr(df: &DataFrame, name: &str, filter: &FilterValue) -> Result<Expr, TableError> {
    let values = filter.values();
    if column(df, name)?.dtype().is_numeric() {
        let accepted: Vec<f64> = values.into_iter().filter_map(json_to_f64).collect();
        Ok(col(name)
            .cast(DataType::Float64)
            .is_in(lit(Series::new(name, accepted))))
    } else {
        let accepted: Vec<String> = values.into_iter().filter_map(json_to_string).collect();
        Ok(col(name)
            .cast(DataType::String)
            .is_in(lit(Series::new(name, accepted))))
    }
}

/// Keeps the rows matching all filters.
/// Filtering on an unknown column is an error.
///
/// # Arguments
/// * `df` - Dataframe to filter
/// * `filters` - Column filters
///
pub fn apply_filters(df: &DataFrame, filters: &Filters) -> Result<DataFrame, TableError> {
    let mut predicate: Option<Expr> = None;
    for (name, filter) in filters.iter() {
        let expr = filter_expr(df, name, filter)?;
        predicate = Some(match predicate {
            Some(previous) => previous.and(expr),
            None => expr,
        });
    }
    match predicate {
        Some(predicate) => Ok(df.clone().lazy().filter(predicate).collect()?),
        None => Ok(df.clone()),
    }
}

#[cfg(test)]
mod test {
    // 3rd party imports
    use serde_json::json;

    // internal imports
    use super::*;
    use crate::dataframe::frame::i64_values;

    fn peptides() -> DataFrame {
        DataFrame::new(vec![
            Series::new("state", &["apo", "holo", "apo"]),
            Series::new("exposure", &[0.0, 30.0, f64::INFINITY]),
            Series::new("start", &[1i64, 2, 3]),
        ])
        .unwrap()
    }

    #[test]
    fn test_scalar_and_list_filters() {
        let mut filters = Filters::new();
        filters.insert("state".to_string(), json!("apo").into());
        let filtered = apply_filters(&peptides(), &filters).unwrap();
        assert_eq!(filtered.height(), 2);

        filters.insert("start".to_string(), vec![json!(3), json!(2)].into());
        let filtered = apply_filters(&peptides(), &filters).unwrap();
        assert_eq!(i64_values(&filtered, "start").unwrap(), vec![Some(3)]);
    }

    #[test]
    fn test_filter_values_are_coerced() {
        let mut filters = Filters::new();
        // strings from requests
        filters.insert("exposure".to_string(), json!("inf").into());
        filters.insert("start".to_string(), json!("3").into());
        let filtered = apply_filters(&peptides(), &filters).unwrap();
        assert_eq!(filtered.height(), 1);

        let mut filters = Filters::new();
        filters.insert("exposure".to_string(), json!(30).into());
        assert_eq!(apply_filters(&peptides(), &filters).unwrap().height(), 1);

        let mut filters = Filters::new();
        filters.insert("start".to_string(), json!("first").into());
        assert_eq!(apply_filters(&peptides(), &filters).unwrap().height(), 0);
    }

    #[test]
    fn test_unknown_column() {
        let mut filters = Filters::new();
        filters.insert("protein".to_string(), json!("SecB").into());
        assert!(matches!(
            apply_filters(&peptides(), &filters),
            Err(TableError::MissingColumns(columns)) if columns == vec!["protein".to_string()]
        ));
    }

    #[test]
    fn test_deserialize() {
        let filters: Filters =
            serde_json::from_str(r#"{"state": "apo", "exposure": [0.0, "inf"]}"#).unwrap();
        assert_eq!(filters["state"], FilterValue::Scalar(json!("apo")));
        assert_eq!(
            filters["exposure"],
            FilterValue::List(vec![json!(0.0), json!("inf")])
        );
    }
}
