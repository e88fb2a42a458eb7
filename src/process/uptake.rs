// std imports
use std::fmt;
use std::str::FromStr;

// 3rd party imports
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// internal imports
use crate::chemistry::amino_acid::max_uptake;
use crate::dataframe::frame::{
    column_names, f64_values, has_column, is_unique_by, require_columns, str_values,
};
use crate::process::errors::ProcessError;

const JOIN_KEYS: [&str; 2] = ["start", "end"];

/// What to do if a derived column cannot be computed
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Return an error
    #[default]
    Raise,
    /// Log a warning and skip the column
    Warn,
    /// Skip the column silently
    Ignore,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Raise => write!(f, "raise"),
            FailurePolicy::Warn => write!(f, "warn"),
            FailurePolicy::Ignore => write!(f, "ignore"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = ProcessError;

    fn from_str(policy: &str) -> Result<Self, Self::Err> {
        match policy.to_lowercase().as_str() {
            "raise" => Ok(FailurePolicy::Raise),
            "warn" => Ok(FailurePolicy::Warn),
            "ignore" => Ok(FailurePolicy::Ignore),
            _ => Err(ProcessError::DerivationFailed {
                column: "failure_policy".to_string(),
                reason: format!("unknown policy `{}`", policy),
            }),
        }
    }
}

/// Resolves the column controls are merged on.
/// `centroid_mass` is preferred over `uptake` if not given explicitly.
///
fn merge_column(pd: &DataFrame, column: Option<&str>) -> Result<String, ProcessError> {
    if let Some(column) = column {
        return Ok(column.to_string());
    }
    ["centroid_mass", "uptake"]
        .into_iter()
        .find(|name| has_column(pd, name))
        .map(str::to_string)
        .ok_or(ProcessError::NoMergeColumn)
}

/// Reduces a control to (start, end, column[, column_sd]), which has to be unique on (start, end).
/// Non-key columns get the role prefix.
///
fn control_view(
    control: &DataFrame,
    column: &str,
    role: &str,
    prefix: &str,
) -> Result<DataFrame, ProcessError> {
    let sd_column = format!("{}_sd", column);
    let mut names = vec!["start", "end", column];
    if has_column(control, &sd_column) {
        names.push(&sd_column);
    }
    require_columns(control, &names)?;
    let mut view = control.select(names.clone())?;
    if !is_unique_by(&view, &JOIN_KEYS)? {
        return Err(ProcessError::NonUniqueControl {
            role: role.to_string(),
        });
    }
    for name in names.iter().skip(JOIN_KEYS.len()) {
        view.rename(name, &format!("{}{}", prefix, name))?;
    }
    Ok(view)
}

/// Joins non- and fully deuterated controls onto the partially deuterated peptides.
/// Joined columns are prefixed with `nd_` and `fd_`, existing columns of the same name are replaced.
///
/// # Arguments
/// * `pd` - Partially deuterated peptides
/// * `nd` - Non-deuterated control
/// * `fd` - Fully deuterated control
/// * `column` - Column to take from the controls, defaults to `centroid_mass` or `uptake`
///
pub fn merge_peptides(
    pd: &DataFrame,
    nd: Option<&DataFrame>,
    fd: Option<&DataFrame>,
    column: Option<&str>,
) -> Result<DataFrame, ProcessError> {
    let column = merge_column(pd, column)?;
    let mut merged = pd.clone();
    for (control, role, prefix) in [
        (nd, "non_deuterated", "nd_"),
        (fd, "fully_deuterated", "fd_"),
    ] {
        if let Some(control) = control {
            let view = control_view(control, &column, role, prefix)?;
            let replaced: Vec<String> = column_names(&view)
                .into_iter()
                .skip(JOIN_KEYS.len())
                .filter(|name| has_column(&merged, name))
                .collect();
            merged = merged.drop_many(&replaced).join(
                &view,
                JOIN_KEYS,
                JOIN_KEYS,
                JoinArgs::new(JoinType::Left),
            )?;
        }
    }
    debug!("Merged controls on `{}`", column);
    Ok(merged)
}

/// Elementwise operation over columns, null if any operand is null or not numeric
///
fn derive<F>(df: &DataFrame, name: &str, inputs: &[&str], operation: F) -> Result<Series, ProcessError>
where
    F: Fn(&[f64]) -> f64,
{
    let columns = inputs
        .iter()
        .map(|input| f64_values(df, input))
        .collect::<Result<Vec<Vec<Option<f64>>>, _>>()?;
    let mut operands = vec![0.0; columns.len()];
    let mut derived = Vec::with_capacity(df.height());
    'rows: for row in 0..df.height() {
        for (operand, column) in operands.iter_mut().zip(columns.iter()) {
            match column[row] {
                Some(value) => *operand = value,
                None => {
                    derived.push(None);
                    continue 'rows;
                }
            }
        }
        derived.push(Some(operation(&operands)));
    }
    Ok(Series::new(name, derived))
}

fn quadrature(operands: &[f64]) -> f64 {
    operands.iter().map(|value| value.powi(2)).sum::<f64>().sqrt()
}

fn difference(operands: &[f64]) -> f64 {
    operands[0] - operands[1]
}

/// Standard deviation of `uptake / fd_uptake` from operands (uptake, uptake_sd, fd_uptake, fd_uptake_sd)
///
fn ratio_sd(operands: &[f64]) -> f64 {
    let (uptake, uptake_sd, fd_uptake, fd_uptake_sd) =
        (operands[0], operands[1], operands[2], operands[3]);
    (uptake_sd.powi(2) / fd_uptake.powi(2)
        + fd_uptake_sd.powi(2) * uptake.powi(2) / fd_uptake.powi(4))
    .sqrt()
}

/// Derived column with its inputs
///
struct Derivation {
    column: &'static str,
    inputs: &'static [&'static str],
    operation: fn(&[f64]) -> f64,
}

const DERIVATIONS: [Derivation; 6] = [
    Derivation {
        column: "uptake",
        inputs: &["centroid_mass", "nd_centroid_mass"],
        operation: difference,
    },
    Derivation {
        column: "uptake_sd",
        inputs: &["centroid_mass_sd", "nd_centroid_mass_sd"],
        operation: quadrature,
    },
    Derivation {
        column: "fd_uptake",
        inputs: &["fd_centroid_mass", "nd_centroid_mass"],
        operation: difference,
    },
    Derivation {
        column: "fd_uptake_sd",
        inputs: &["fd_centroid_mass_sd", "nd_centroid_mass_sd"],
        operation: quadrature,
    },
    Derivation {
        column: "rfu",
        inputs: &["uptake", "fd_uptake"],
        operation: |operands| operands[0] / operands[1],
    },
    Derivation {
        column: "rfu_sd",
        inputs: &["uptake", "uptake_sd", "fd_uptake", "fd_uptake_sd"],
        operation: ratio_sd,
    },
];

/// Handles a derivation which is not possible according to the policy
///
fn on_failure(policy: FailurePolicy, column: &str, reason: String) -> Result<(), ProcessError> {
    match policy {
        FailurePolicy::Raise => Err(ProcessError::DerivationFailed {
            column: column.to_string(),
            reason,
        }),
        FailurePolicy::Warn => {
            warn!("Skipping `{}`: {}", column, reason);
            Ok(())
        }
        FailurePolicy::Ignore => Ok(()),
    }
}

/// Adds uptake, uptake_sd, fd_uptake, fd_uptake_sd, rfu, rfu_sd and max_uptake, in this order.
/// Columns already present are kept as they are. Before a column is derived its inputs are
/// checked, missing inputs are handled by the given policy.
///
/// # Arguments
/// * `df` - Merged peptides, see [merge_peptides]
/// * `policy` - What to do if a column cannot be derived
///
pub fn compute_uptake_metrics(
    df: &DataFrame,
    policy: FailurePolicy,
) -> Result<DataFrame, ProcessError> {
    let mut df = df.clone();
    for derivation in DERIVATIONS.iter() {
        if has_column(&df, derivation.column) {
            continue;
        }
        let missing: Vec<&str> = derivation
            .inputs
            .iter()
            .copied()
            .filter(|name| !has_column(&df, name))
            .collect();
        if !missing.is_empty() {
            on_failure(
                policy,
                derivation.column,
                format!("missing column(s) {}", missing.join(", ")),
            )?;
            continue;
        }
        let derived = derive(&df, derivation.column, derivation.inputs, derivation.operation)?;
        df.with_column(derived)?;
    }

    if !has_column(&df, "max_uptake") {
        if has_column(&df, "sequence") {
            let values: Vec<Option<i64>> = str_values(&df, "sequence")?
                .iter()
                .map(|sequence| sequence.as_deref().map(|sequence| max_uptake(sequence) as i64))
                .collect();
            df.with_column(Series::new("max_uptake", values))?;
        } else {
            on_failure(
                policy,
                "max_uptake",
                "missing column(s) sequence".to_string(),
            )?;
        }
    }
    Ok(df)
}

#[cfg(test)]
mod test {
    // 3rd party imports
    use tracing_test::traced_test;

    // internal imports
    use super::*;
    use crate::dataframe::frame::i64_values;

    fn peptides(masses: &[f64]) -> DataFrame {
        let height = masses.len();
        DataFrame::new(vec![
            Series::new("start", (1..=height as i64).collect::<Vec<i64>>()),
            Series::new("end", vec![10i64; height]),
            Series::new("sequence", vec!["PEPTIDEAAA"; height]),
            Series::new("centroid_mass", masses),
            Series::new("centroid_mass_sd", vec![0.0; height]),
        ])
        .unwrap()
    }

    fn first(df: &DataFrame, name: &str) -> Option<f64> {
        f64_values(df, name).unwrap()[0]
    }

    #[test]
    fn test_uptake_and_rfu() {
        let merged = merge_peptides(
            &peptides(&[105.0]),
            Some(&peptides(&[100.0])),
            Some(&peptides(&[110.0])),
            None,
        )
        .unwrap();
        assert!(has_column(&merged, "nd_centroid_mass_sd"));
        let metrics = compute_uptake_metrics(&merged, FailurePolicy::Raise).unwrap();
        assert_eq!(first(&metrics, "uptake"), Some(5.0));
        assert_eq!(first(&metrics, "fd_uptake"), Some(10.0));
        assert_eq!(first(&metrics, "rfu"), Some(0.5));
        assert_eq!(first(&metrics, "uptake_sd"), Some(0.0));
        assert_eq!(first(&metrics, "rfu_sd"), Some(0.0));
        assert_eq!(i64_values(&metrics, "max_uptake").unwrap(), vec![Some(8)]);
    }

    #[test]
    fn test_error_propagation() {
        let mut pd = peptides(&[105.0]);
        pd.with_column(Series::new("centroid_mass_sd", &[0.3])).unwrap();
        let mut fd = peptides(&[110.0]);
        fd.with_column(Series::new("centroid_mass_sd", &[0.4])).unwrap();
        let merged = merge_peptides(&pd, Some(&peptides(&[100.0])), Some(&fd), None).unwrap();
        let metrics = compute_uptake_metrics(&merged, FailurePolicy::Raise).unwrap();
        let uptake_sd = first(&metrics, "uptake_sd").unwrap();
        let fd_uptake_sd = first(&metrics, "fd_uptake_sd").unwrap();
        let rfu_sd = first(&metrics, "rfu_sd").unwrap();
        assert!((uptake_sd - 0.3).abs() < 1e-12);
        assert!((fd_uptake_sd - 0.4).abs() < 1e-12);
        let expected = (0.09_f64 / 100.0 + 0.16 * 25.0 / 10_000.0).sqrt();
        assert!((rfu_sd - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unmatched_peptides_get_null() {
        let merged = merge_peptides(
            &peptides(&[105.0, 106.0]),
            Some(&peptides(&[100.0])),
            None,
            None,
        )
        .unwrap();
        assert_eq!(merged.height(), 2);
        let metrics = compute_uptake_metrics(&merged, FailurePolicy::Ignore).unwrap();
        assert_eq!(f64_values(&metrics, "uptake").unwrap(), vec![Some(5.0), None]);
        assert!(!has_column(&metrics, "rfu"));
    }

    #[test]
    fn test_failure_policy_raise() {
        let merged = merge_peptides(&peptides(&[105.0]), Some(&peptides(&[100.0])), None, None)
            .unwrap();
        assert!(matches!(
            compute_uptake_metrics(&merged, FailurePolicy::Raise),
            Err(ProcessError::DerivationFailed { column, reason })
                if column == "fd_uptake" && reason == "missing column(s) fd_centroid_mass"
        ));
    }

    #[test]
    #[traced_test]
    fn test_failure_policy_warn() {
        let merged = merge_peptides(&peptides(&[105.0]), Some(&peptides(&[100.0])), None, None)
            .unwrap();
        let metrics = compute_uptake_metrics(&merged, FailurePolicy::Warn).unwrap();
        assert!(has_column(&metrics, "uptake"));
        assert!(has_column(&metrics, "max_uptake"));
        assert!(logs_contain("Skipping `fd_uptake`"));
    }

    #[test]
    fn test_existing_columns_are_kept() {
        let mut df = peptides(&[105.0]);
        df.with_column(Series::new("uptake", &[1.5])).unwrap();
        let metrics = compute_uptake_metrics(&df, FailurePolicy::Ignore).unwrap();
        assert_eq!(first(&metrics, "uptake"), Some(1.5));
    }

    #[test]
    fn test_merge_column_resolution() {
        let mut df = DataFrame::new(vec![
            Series::new("start", &[1i64]),
            Series::new("end", &[5i64]),
        ])
        .unwrap();
        assert!(matches!(
            merge_peptides(&df, None, None, None),
            Err(ProcessError::NoMergeColumn)
        ));
        df.with_column(Series::new("uptake", &[2.0])).unwrap();
        let merged = merge_peptides(&df, Some(&df), None, None).unwrap();
        assert_eq!(first(&merged, "nd_uptake"), Some(2.0));
        // merging again replaces the control columns
        let merged = merge_peptides(&merged, Some(&df), None, None).unwrap();
        assert_eq!(
            column_names(&merged),
            vec!["start", "end", "uptake", "nd_uptake"]
        );
    }

    #[test]
    fn test_non_unique_control() {
        let pd = peptides(&[105.0]);
        let nd = DataFrame::new(vec![
            Series::new("start", &[1i64, 1]),
            Series::new("end", &[10i64, 10]),
            Series::new("centroid_mass", &[100.0, 100.5]),
        ])
        .unwrap();
        assert!(matches!(
            merge_peptides(&pd, Some(&nd), None, None),
            Err(ProcessError::NonUniqueControl { role }) if role == "non_deuterated"
        ));
    }

    #[test]
    fn test_failure_policy_from_str() {
        assert_eq!(FailurePolicy::from_str("WARN").unwrap(), FailurePolicy::Warn);
        assert!(FailurePolicy::from_str("panic").is_err());
    }
}
