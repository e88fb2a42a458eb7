// 3rd party imports
use polars::prelude::*;
use tracing::debug;

// internal imports
use crate::chemistry::molecule::{neutral_mass, singly_charged_mass};
use crate::dataframe::frame::{
    f64_values, has_column, i64_values, require_columns, sort_by, unique_values,
};
use crate::dataframe::value::format_any_value;
use crate::formats::peptide_format::DYNAMX_V3_STATE_COLUMNS;
use crate::process::errors::ProcessError;
use crate::process::stats::{weighted_stats, WeightedStats};

/// Columns averaged with intensity weights, each followed by a `<name>_sd` column
///
pub const WEIGHTED_COLUMNS: [&str; 4] = ["centroid_mz", "centroid_mass", "rt", "uptake"];

/// Natural key of an aggregated table
///
pub const GROUP_KEYS: [&str; 3] = ["start", "end", "exposure"];

const REPLICATE_COLUMNS: [&str; 2] = ["replicate", "file"];
const N_REPLICATES: &str = "n_replicates";
const N_CLUSTER: &str = "n_cluster";

const WEIGHT: &str = "__weight";
const GROUP_LEN: &str = "__len";

/// Name of the list column holding the values of a weighted column per group
///
fn values_alias(name: &str) -> String {
    format!("__values_{}", name)
}

/// Name of the column holding the first input value per group
///
fn input_alias(name: &str) -> String {
    format!("__input_{}", name)
}

/// Fails if the dataframe contains more than one distinct (non-null) value in `column`
///
/// # Arguments
/// * `df` - Dataframe to check
/// * `column` - State column, dataframes without it pass
///
pub fn ensure_single_state(df: &DataFrame, column: &str) -> Result<(), ProcessError> {
    if !has_column(df, column) {
        return Ok(());
    }
    let states: Vec<String> = unique_values(df, column)?
        .iter()
        .filter_map(|state| format_any_value(&state))
        .collect();
    if states.len() > 1 {
        return Err(ProcessError::MultipleStates(states));
    }
    Ok(())
}

/// Value shared by all rows of a group or null if the rows disagree (nulls included)
///
fn shared_value(name: &str, dtype: &DataType) -> Expr {
    when(col(name).n_unique().eq(lit(1)))
        .then(col(name).first())
        .otherwise(lit(NULL))
        .cast(dtype.clone())
        .alias(name)
}

/// Weighted statistics of one group from its value and weight lists
///
fn group_stats(
    values: Option<Series>,
    weights: Option<Series>,
) -> Result<Option<WeightedStats>, ProcessError> {
    let (Some(values), Some(weights)) = (values, weights) else {
        return Ok(None);
    };
    let samples: Vec<(f64, f64)> = values
        .f64()?
        .into_iter()
        .zip(weights.f64()?.into_iter())
        .filter_map(|(value, weight)| Some((value?, weight?)))
        .collect();
    Ok(weighted_stats(&samples))
}

/// Weighted mean and deviation per group of the list column `values`
///
fn stats_series(
    groups: &DataFrame,
    values: &str,
) -> Result<Vec<Option<WeightedStats>>, ProcessError> {
    groups
        .column(values)?
        .list()?
        .into_iter()
        .zip(groups.column(WEIGHT)?.list()?.into_iter())
        .map(|(values, weights)| group_stats(values, weights))
        .collect()
}

fn mean_and_std(stats: &[Option<WeightedStats>]) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    stats
        .iter()
        .map(|stats| match stats {
            Some(stats) => (Some(stats.get_mean()), Some(stats.get_std())),
            None => (None, None),
        })
        .unzip()
}

/// Collapses replicate rows into one row per (start, end, exposure).
///
/// Columns in [WEIGHTED_COLUMNS] become their intensity weighted mean followed by the weighted
/// population standard deviation in `<name>_sd`. Without an `intensity` column all rows weigh the same,
/// rows with a null intensity are left out. Single row groups keep their values and any existing `_sd` value.
/// All other columns keep the value shared by the group or become null if the group disagrees.
/// `n_replicates` (distinct replicates) and `n_cluster` (rows) are appended.
///
/// # Arguments
/// * `df` - Canonical dataframe of a single state
///
pub fn aggregate(df: &DataFrame) -> Result<DataFrame, ProcessError> {
    ensure_single_state(df, "state")?;
    require_columns(df, &GROUP_KEYS)?;
    let weighted: Vec<&str> = WEIGHTED_COLUMNS
        .iter()
        .copied()
        .filter(|name| has_column(df, name))
        .collect();
    let sd_columns: Vec<String> = weighted.iter().map(|name| format!("{}_sd", name)).collect();
    let kept: Vec<&Series> = df
        .get_columns()
        .iter()
        .filter(|series| {
            let name = series.name();
            !sd_columns.iter().any(|sd| sd == name) && name != N_REPLICATES && name != N_CLUSTER
        })
        .collect();

    let weight = if has_column(df, "intensity") {
        col("intensity").cast(DataType::Float64)
    } else {
        lit(1.0)
    };
    let mut aggregations = vec![col(WEIGHT), len().cast(DataType::Int64).alias(GROUP_LEN)];
    for series in kept.iter() {
        let name = series.name();
        if GROUP_KEYS.contains(&name) {
            continue;
        }
        if weighted.contains(&name) {
            aggregations.push(col(name).cast(DataType::Float64).alias(&values_alias(name)));
        } else {
            aggregations.push(shared_value(name, series.dtype()));
        }
    }
    let mut inputs = sd_columns.clone();
    inputs.extend([N_REPLICATES.to_string(), N_CLUSTER.to_string()]);
    for name in inputs.iter().filter(|name| has_column(df, name)) {
        aggregations.push(col(name).first().alias(&input_alias(name)));
    }
    let replicates = REPLICATE_COLUMNS.iter().find(|name| has_column(df, name));
    if let Some(replicates) = replicates {
        aggregations.push(
            col(replicates)
                .n_unique()
                .cast(DataType::Int64)
                .alias(N_REPLICATES),
        );
    }

    let groups = df
        .clone()
        .lazy()
        .with_column(weight.alias(WEIGHT))
        .group_by_stable(GROUP_KEYS.iter().map(|key| col(key)).collect::<Vec<_>>())
        .agg(aggregations)
        .collect()?;
    let lengths: Vec<i64> = groups
        .column(GROUP_LEN)?
        .i64()?
        .into_iter()
        .map(|len| len.unwrap_or(0))
        .collect();
    let single = |idx: usize| lengths[idx] == 1;

    let mut columns: Vec<Series> = Vec::with_capacity(df.width() + 2);
    for series in kept.iter() {
        let name = series.name();
        if !weighted.contains(&name) {
            columns.push(groups.column(name)?.clone());
            continue;
        }
        let values_column = values_alias(name);
        let (means, sds) = mean_and_std(&stats_series(&groups, &values_column)?);
        let firsts: Vec<Option<f64>> = groups
            .column(&values_column)?
            .list()?
            .into_iter()
            .map(|values| -> Result<Option<f64>, ProcessError> {
                Ok(match values {
                    Some(values) => values.f64()?.get(0),
                    None => None,
                })
            })
            .collect::<Result<_, _>>()?;
        let input_sd_column = input_alias(&format!("{}_sd", name));
        let input_sd = if has_column(&groups, &input_sd_column) {
            Some(f64_values(&groups, &input_sd_column)?)
        } else {
            None
        };
        let mut mean_values = Vec::with_capacity(groups.height());
        let mut sd_values = Vec::with_capacity(groups.height());
        for idx in 0..groups.height() {
            if single(idx) {
                mean_values.push(firsts[idx]);
                sd_values.push(match &input_sd {
                    Some(input_sd) => input_sd[idx],
                    None => firsts[idx].map(|_| 0.0),
                });
            } else {
                mean_values.push(means[idx]);
                sd_values.push(sds[idx]);
            }
        }
        columns.push(Series::new(name, mean_values));
        columns.push(Series::new(&format!("{}_sd", name), sd_values));
    }

    let computed_replicates = if replicates.is_some() {
        Some(groups.column(N_REPLICATES)?.i64()?.into_iter().collect::<Vec<_>>())
    } else {
        None
    };
    let input_counts = |name: &str| -> Result<Option<Vec<Option<i64>>>, ProcessError> {
        let alias = input_alias(name);
        if has_column(&groups, &alias) {
            Ok(Some(i64_values(&groups, &alias)?))
        } else {
            Ok(None)
        }
    };
    let input_n_replicates = input_counts(N_REPLICATES)?;
    let input_n_cluster = input_counts(N_CLUSTER)?;
    let mut n_replicates = Vec::with_capacity(groups.height());
    let mut n_cluster = Vec::with_capacity(groups.height());
    for idx in 0..groups.height() {
        n_replicates.push(match (&input_n_replicates, &computed_replicates) {
            (Some(input), _) if single(idx) => input[idx],
            (_, Some(computed)) => computed[idx],
            _ => Some(1),
        });
        n_cluster.push(match &input_n_cluster {
            Some(input) if single(idx) => input[idx],
            _ => Some(lengths[idx]),
        });
    }
    columns.push(Series::new(N_REPLICATES, n_replicates));
    columns.push(Series::new(N_CLUSTER, n_cluster));

    debug!(
        "Aggregated {} rows into {} peptides",
        df.height(),
        groups.height()
    );
    Ok(DataFrame::new(columns)?)
}

/// Converts raw DynamX cluster data of a single state into DynamX state data.
///
/// The non-deuterated rows (`Exposure == nd_exposure`) give a per peptide reference mass
/// (intensity weighted). For every (Start, End, Exposure) group the intensity weighted
/// `Center` (as singly charged mass) and `RT` are computed, `Uptake` is the weighted mean
/// neutral mass minus the reference mass. `Uptake SD` is the weighted deviation of the group
/// alone, the uncertainty of the reference is not propagated. Peptides without reference get
/// null uptake.
///
/// The result has the DynamX v3 state layout and can be converted like a vendor state export.
///
/// # Arguments
/// * `raw` - DynamX v3 cluster dataframe as read from file (exposure in minutes)
/// * `nd_exposure` - Exposure of the non-deuterated rows
///
pub fn dynamx_cluster_to_state(raw: &DataFrame, nd_exposure: f64) -> Result<DataFrame, ProcessError> {
    require_columns(
        raw,
        &[
            "Protein", "Start", "End", "Sequence", "State", "Exposure", "z", "RT", "Inten", "Center",
        ],
    )?;
    ensure_single_state(raw, "State")?;

    let charges = f64_values(raw, "z")?;
    let centers = f64_values(raw, "Center")?;
    let (masses, singly_charged): (Vec<Option<f64>>, Vec<Option<f64>>) = charges
        .into_iter()
        .zip(centers)
        .map(|(z, mz)| match (z, mz) {
            (Some(z), Some(mz)) => (Some(neutral_mass(z, mz)), Some(singly_charged_mass(z, mz))),
            _ => (None, None),
        })
        .unzip();
    let mut clusters = raw.clone();
    clusters.with_column(Series::new("__mass", masses))?;
    clusters.with_column(Series::new("__singly_charged", singly_charged))?;
    let clusters = clusters.lazy().with_columns([
        col("Inten").cast(DataType::Float64).alias(WEIGHT),
        col("RT").cast(DataType::Float64).alias("__rt"),
    ]);

    // reference masses of the non-deuterated peptides
    let nd_groups = clusters
        .clone()
        .filter(col("Exposure").cast(DataType::Float64).eq(lit(nd_exposure)))
        .group_by_stable([col("Start"), col("End")])
        .agg([col("__mass"), col(WEIGHT)])
        .collect()?;
    let reference: Vec<Option<f64>> = stats_series(&nd_groups, "__mass")?
        .iter()
        .map(|stats| stats.as_ref().map(WeightedStats::get_mean))
        .collect();
    let reference = DataFrame::new(vec![
        nd_groups.column("Start")?.clone(),
        nd_groups.column("End")?.clone(),
        Series::new("__reference", reference),
    ])?;

    let carried: Vec<&str> = [
        "Protein",
        "Sequence",
        "Modification",
        "Fragment",
        "MaxUptake",
        "MHP",
        "State",
    ]
    .into_iter()
    .filter(|name| has_column(raw, name))
    .collect();
    let mut aggregations: Vec<Expr> = carried.iter().map(|name| col(name).first()).collect();
    aggregations.extend([col("__singly_charged"), col("__rt"), col("__mass"), col(WEIGHT)]);
    let groups = clusters
        .group_by_stable([col("Start"), col("End"), col("Exposure")])
        .agg(aggregations)
        .collect()?
        .join(
            &reference,
            ["Start", "End"],
            ["Start", "End"],
            JoinArgs::new(JoinType::Left),
        )?;

    let (center, center_sd) = mean_and_std(&stats_series(&groups, "__singly_charged")?);
    let (rt, rt_sd) = mean_and_std(&stats_series(&groups, "__rt")?);
    let (mass, mass_sd) = mean_and_std(&stats_series(&groups, "__mass")?);
    let (uptake, uptake_sd): (Vec<Option<f64>>, Vec<Option<f64>>) = mass
        .into_iter()
        .zip(mass_sd)
        .zip(f64_values(&groups, "__reference")?)
        .map(|((mass, sd), nd_mass)| match (mass, nd_mass) {
            (Some(mass), Some(nd_mass)) => (Some(mass - nd_mass), sd),
            _ => (None, None),
        })
        .unzip();
    let computed = [
        Series::new("Center", center),
        Series::new("Center SD", center_sd),
        Series::new("Uptake", uptake),
        Series::new("Uptake SD", uptake_sd),
        Series::new("RT", rt),
        Series::new("RT SD", rt_sd),
    ];

    let columns = DYNAMX_V3_STATE_COLUMNS
        .iter()
        .map(|name| {
            if let Some(series) = computed.iter().find(|series| series.name() == *name) {
                Ok(series.clone())
            } else if has_column(&groups, name) {
                Ok(groups.column(name)?.clone())
            } else {
                // columns missing in the cluster data (e.g. Modification) become null
                Ok(Series::full_null(name, groups.height(), &DataType::String))
            }
        })
        .collect::<Result<Vec<Series>, ProcessError>>()?;
    let state = DataFrame::new(columns)?;
    debug!(
        "Converted {} cluster rows into {} state rows",
        raw.height(),
        state.height()
    );
    Ok(sort_by(&state, &["Start", "End", "Exposure"])?)
}

#[cfg(test)]
mod test {
    // std imports
    use std::path::Path;

    // 3rd party imports
    use serde_json::json;

    // internal imports
    use super::*;
    use crate::chemistry::molecule::PROTON_MASS;
    use crate::dataframe::frame::{column_names, str_values};
    use crate::formats::identify::identify_format;
    use crate::formats::peptide_format::PeptideFormat;
    use crate::io::csv::reader::Reader;
    use crate::process::filters::{apply_filters, FilterValue, Filters};

    fn read(name: &str) -> DataFrame {
        Reader::read(&Path::new("test_files").join(name)).unwrap()
    }

    fn assert_same_column(left: &DataFrame, right: &DataFrame, name: &str) {
        if left.column(name).unwrap().dtype().is_numeric() {
            assert_eq!(f64_values(left, name).unwrap(), f64_values(right, name).unwrap(), "{}", name);
        } else {
            assert_eq!(str_values(left, name).unwrap(), str_values(right, name).unwrap(), "{}", name);
        }
    }

    #[test]
    fn test_multiple_states_are_rejected() {
        let df = DataFrame::new(vec![
            Series::new("state", &["apo", "holo"]),
            Series::new("start", &[1i64, 1]),
            Series::new("end", &[5i64, 5]),
            Series::new("exposure", &[10.0, 10.0]),
        ])
        .unwrap();
        assert!(matches!(
            aggregate(&df),
            Err(ProcessError::MultipleStates(states)) if states == vec!["apo".to_string(), "holo".to_string()]
        ));
    }

    #[test]
    fn test_weighted_aggregation() {
        let df = DataFrame::new(vec![
            Series::new("state", &["apo"; 3]),
            Series::new("start", &[1i64; 3]),
            Series::new("end", &[5i64; 3]),
            Series::new("exposure", &[10.0; 3]),
            Series::new("replicate", &["r1", "r1", "r2"]),
            Series::new("charge", &[1i64, 2, 1]),
            Series::new("centroid_mass", &[100.0, 102.0, 104.0]),
            Series::new("intensity", &[1.0, 2.0, 1.0]),
        ])
        .unwrap();
        let aggregated = aggregate(&df).unwrap();
        assert_eq!(aggregated.height(), 1);
        assert_eq!(
            column_names(&aggregated),
            vec![
                "state",
                "start",
                "end",
                "exposure",
                "replicate",
                "charge",
                "centroid_mass",
                "centroid_mass_sd",
                "intensity",
                "n_replicates",
                "n_cluster"
            ]
        );
        // mean = (100 + 204 + 104) / 4 = 102, var = (4 + 0 + 4) / 4 = 2
        let mean = f64_values(&aggregated, "centroid_mass").unwrap()[0].unwrap();
        let sd = f64_values(&aggregated, "centroid_mass_sd").unwrap()[0].unwrap();
        assert!((mean - 102.0).abs() < 1e-9);
        assert!((sd - 2.0_f64.sqrt()).abs() < 1e-9);
        // ambiguous columns become null
        assert_eq!(str_values(&aggregated, "replicate").unwrap(), vec![None]);
        assert_eq!(i64_values(&aggregated, "charge").unwrap(), vec![None]);
        assert_eq!(str_values(&aggregated, "state").unwrap(), vec![Some("apo".to_string())]);
        assert_eq!(i64_values(&aggregated, "n_replicates").unwrap(), vec![Some(2)]);
        assert_eq!(i64_values(&aggregated, "n_cluster").unwrap(), vec![Some(3)]);
    }

    #[test]
    fn test_aggregation_of_aggregated_data_is_a_no_op() {
        let mut filters = Filters::new();
        filters.insert("State".to_string(), FilterValue::Scalar(json!("SecB WT apo")));
        let raw = apply_filters(&read("dynamx_v3_state.csv"), &filters).unwrap();
        let state = PeptideFormat::DynamXv3State.convert(&raw).unwrap();
        let aggregated = aggregate(&state).unwrap();

        assert_eq!(aggregated.height(), state.height());
        for name in column_names(&state) {
            assert_same_column(&aggregated, &state, &name);
        }
        assert!(i64_values(&aggregated, "n_replicates")
            .unwrap()
            .iter()
            .all(|value| value == &Some(1)));
        assert!(i64_values(&aggregated, "n_cluster")
            .unwrap()
            .iter()
            .all(|value| value == &Some(1)));
        // aggregating twice changes nothing
        let twice = aggregate(&aggregated).unwrap();
        assert_eq!(column_names(&twice), column_names(&aggregated));
        for name in column_names(&aggregated) {
            assert_same_column(&twice, &aggregated, &name);
        }
    }

    #[test]
    fn test_cluster_to_state_reference_mass() {
        let raw = read("dynamx_v3_cluster.csv");
        let state = dynamx_cluster_to_state(&raw, 0.0).unwrap();
        assert_eq!(
            identify_format(&state.get_column_names(), true).get_format(),
            PeptideFormat::DynamXv3State
        );
        // non-deuterated rows have zero uptake
        for (exposure, uptake) in f64_values(&state, "Exposure")
            .unwrap()
            .into_iter()
            .zip(f64_values(&state, "Uptake").unwrap())
        {
            if exposure == Some(0.0) {
                assert!(uptake.unwrap().abs() < 1e-9);
            }
        }
        // center is reported as singly charged mass
        let center = f64_values(&state, "Center").unwrap()[0].unwrap();
        assert!(center > PROTON_MASS);
    }

    /// Cluster rows of a peptide with hand-computed uptake.
    /// ND: mass 500 (weight 1) and 501 (weight 3), reference 500.75.
    /// 0.5 min: mass 503 and 504 (equal weights), mean 503.5, uptake 2.75.
    /// A second peptide has no ND rows.
    ///
    fn clusters() -> DataFrame {
        let masses = [500.0, 501.0, 503.0, 504.0, 700.0];
        let charges = [1i64, 2, 1, 2, 1];
        let centers: Vec<f64> = masses
            .iter()
            .zip(charges)
            .map(|(mass, z)| mass / z as f64 + PROTON_MASS)
            .collect();
        DataFrame::new(vec![
            Series::new("Protein", &["SecB"; 5]),
            Series::new("Start", &[1i64, 1, 1, 1, 20]),
            Series::new("End", &[5i64, 5, 5, 5, 24]),
            Series::new("Sequence", &["MSEQN", "MSEQN", "MSEQN", "MSEQN", "TEMTF"]),
            Series::new("State", &["SecB WT apo"; 5]),
            Series::new("Exposure", &[0.0, 0.0, 0.5, 0.5, 0.5]),
            Series::new("z", &charges),
            Series::new("RT", &[1.0, 1.0, 2.0, 4.0, 5.0]),
            Series::new("Inten", &[1.0, 3.0, 2.0, 2.0, 1.0]),
            Series::new("Center", centers),
        ])
        .unwrap()
    }

    #[test]
    fn test_cluster_to_state_against_hand_computed_uptake() {
        let state = dynamx_cluster_to_state(&clusters(), 0.0).unwrap();
        assert_eq!(state.height(), 3);
        assert_eq!(
            i64_values(&state, "Start").unwrap(),
            vec![Some(1), Some(1), Some(20)]
        );

        let expected = [Some(0.0), Some(2.75), None];
        let uptake = f64_values(&state, "Uptake").unwrap();
        assert_eq!(uptake[2], None);
        let errors: Vec<f64> = uptake
            .iter()
            .zip(expected)
            .filter_map(|(computed, expected)| Some((computed.as_ref()? - expected?).powi(2)))
            .collect();
        assert_eq!(errors.len(), 2);
        let mse = errors.iter().sum::<f64>() / errors.len() as f64;
        assert!(mse < 1e-12, "uptake mse {}", mse);

        // deviations are not pinned to a reference, they only have to be sane
        let uptake_sd = f64_values(&state, "Uptake SD").unwrap();
        assert!(uptake_sd[1].unwrap() >= 0.0);
        assert_eq!(uptake_sd[2], None);

        let center = f64_values(&state, "Center").unwrap();
        assert!((center[0].unwrap() - (500.75 + PROTON_MASS)).abs() < 1e-9);
        let rt = f64_values(&state, "RT").unwrap();
        assert!((rt[1].unwrap() - 3.0).abs() < 1e-9);
        // Modification is not part of the cluster rows
        assert_eq!(state.column("Modification").unwrap().null_count(), 3);
    }

    #[test]
    fn test_cluster_to_state_single_state_only() {
        let raw = read("dynamx_v3_cluster.csv");
        let mut mixed = str_values(&raw, "State").unwrap();
        mixed[0] = Some("other".to_string());
        let mut mixed_df = raw.clone();
        mixed_df.with_column(Series::new("State", mixed)).unwrap();
        assert!(matches!(
            dynamx_cluster_to_state(&mixed_df, 0.0),
            Err(ProcessError::MultipleStates(_))
        ));
    }
}
