// 3rd party imports
use polars::prelude::*;

// internal imports
use crate::chemistry::molecule::neutral_mass;
use crate::dataframe::frame::{column, f64_values, insert_column_after, require_columns, str_values};
use crate::dataframe::value::{format_any_value, parse_float};
use crate::formats::errors::FormatError;
use crate::formats::peptide_format::PeptideFormat;
use crate::process::ordering::sort_rows;

/// Seconds per minute, DynamX reports exposure in minutes
///
const SECONDS_PER_MINUTE: f64 = 60.0;

const DYNAMX_CLUSTER_MAPPING: [(&str, &str); 10] = [
    ("State", "state"),
    ("Exposure", "exposure"),
    ("Start", "start"),
    ("End", "end"),
    ("Sequence", "sequence"),
    ("File", "replicate"),
    ("z", "charge"),
    ("Center", "centroid_mz"),
    ("Inten", "intensity"),
    ("RT", "rt"),
];

const DYNAMX_STATE_MAPPING: [(&str, &str); 11] = [
    ("State", "state"),
    ("Exposure", "exposure"),
    ("Start", "start"),
    ("End", "end"),
    ("Sequence", "sequence"),
    ("Center", "centroid_mz"),
    ("Center SD", "centroid_mz_sd"),
    ("Uptake", "uptake"),
    ("Uptake SD", "uptake_sd"),
    ("RT", "rt"),
    ("RT SD", "rt_sd"),
];

const HDEXAMINER_MAPPING: [(&str, &str); 9] = [
    ("Protein State", "state"),
    ("Deut Time", "exposure"),
    ("Start", "start"),
    ("End", "end"),
    ("Sequence", "sequence"),
    ("Experiment", "replicate"),
    ("Charge", "charge"),
    ("Exp Cent", "centroid_mz"),
    ("Max Inty", "intensity"),
];

const HXMS_MAPPING: [(&str, &str); 6] = [
    ("START", "start"),
    ("END", "end"),
    ("sequence", "sequence"),
    ("REP", "replicate"),
    ("TIME(Sec)", "exposure"),
    ("UPTAKE", "uptake"),
];

impl PeptideFormat {
    /// Converts a raw dataframe of this format into the canonical peptide table
    ///
    /// # Arguments
    /// * `df` - Raw dataframe
    ///
    pub fn convert(&self, df: &DataFrame) -> Result<DataFrame, FormatError> {
        match self {
            PeptideFormat::DynamXv3Cluster => from_dynamx_cluster(df),
            PeptideFormat::DynamXv3State | PeptideFormat::DynamXvxState => from_dynamx_state(df),
            PeptideFormat::HDExaminerV3 => from_hdexaminer(df, &[]),
            PeptideFormat::Hxms => from_hxms(df),
            PeptideFormat::OpenHdx => Ok(df.clone()),
        }
    }
}

/// Selects the mapped source columns and renames them
///
fn rename_select(df: &DataFrame, mapping: &[(&str, &str)]) -> Result<DataFrame, FormatError> {
    let sources: Vec<&str> = mapping.iter().map(|(source, _)| *source).collect();
    require_columns(df, &sources)?;
    let mut converted = df.select(sources)?;
    for (source, target) in mapping.iter().filter(|(source, target)| source != target) {
        converted.rename(source, target)?;
    }
    Ok(converted)
}

/// Fails with the first value which became null by casting `column` to float
///
fn ensure_numeric(original: &Series, cast: &Series) -> Result<(), FormatError> {
    if cast.null_count() == original.null_count() {
        return Ok(());
    }
    for idx in 0..original.len() {
        let value = original.get(idx)?;
        if !matches!(value, AnyValue::Null) && matches!(cast.get(idx)?, AnyValue::Null) {
            return Err(FormatError::InvalidValue {
                column: original.name().to_string(),
                value: format_any_value(&value).unwrap_or_default(),
            });
        }
    }
    Ok(())
}

/// Adds `stop = end + 1` right after `end`
///
fn with_stop(mut df: DataFrame) -> Result<DataFrame, FormatError> {
    let end = column(&df, "end")?;
    if !end.dtype().is_numeric() {
        ensure_numeric(end, &end.cast(&DataType::Float64)?)?;
    }
    let stop = (end + 1).with_name("stop");
    insert_column_after(&mut df, "end", stop)?;
    Ok(df)
}

/// Adds `centroid_mass = charge * (centroid_mz - proton mass)` right after `charge`
///
fn with_centroid_mass(mut df: DataFrame) -> Result<DataFrame, FormatError> {
    let centroid_mass: Vec<Option<f64>> = f64_values(&df, "charge")?
        .into_iter()
        .zip(f64_values(&df, "centroid_mz")?)
        .map(|(charge, mz)| Some(neutral_mass(charge?, mz?)))
        .collect();
    insert_column_after(&mut df, "charge", Series::new("centroid_mass", centroid_mass))?;
    Ok(df)
}

/// Converts exposure from minutes to seconds
///
fn exposure_minutes_to_seconds(mut df: DataFrame) -> Result<DataFrame, FormatError> {
    let exposure = column(&df, "exposure")?;
    let minutes = exposure.cast(&DataType::Float64)?;
    ensure_numeric(exposure, &minutes)?;
    df.with_column(&minutes * SECONDS_PER_MINUTE)?;
    Ok(df)
}

/// Casts exposure values with a unit suffix (e.g. `"15s"`) to float seconds.
/// If any value cannot be cast, e.g. a `"FD"` sentinel, the column is left unchanged.
///
/// # Arguments
/// * `df` - Dataframe with `exposure` column
///
pub fn cast_exposure(mut df: DataFrame) -> Result<DataFrame, FormatError> {
    if column(&df, "exposure")?.dtype().is_numeric() {
        let exposure = df.column("exposure")?.cast(&DataType::Float64)?;
        df.with_column(exposure)?;
        return Ok(df);
    }
    let cast: Option<Vec<Option<f64>>> = str_values(&df, "exposure")?
        .iter()
        .map(|value| match value {
            None => Some(None),
            Some(raw) => parse_float(raw.trim().trim_end_matches('s')).map(Some),
        })
        .collect();
    if let Some(cast) = cast {
        df.with_column(Series::new("exposure", cast))?;
    }
    Ok(df)
}

/// Converts a retention time range like `"7.44-7.65"` to its midpoint `7.545`.
/// The width of the range is lost.
///
/// # Arguments
/// * `raw` - Range string
///
pub fn convert_rt(raw: &str) -> Result<f64, FormatError> {
    let invalid = || FormatError::InvalidValue {
        column: "rt".to_string(),
        value: raw.to_string(),
    };
    let (lower, upper) = raw.trim().split_once('-').ok_or_else(invalid)?;
    match (parse_float(lower), parse_float(upper)) {
        (Some(lower), Some(upper)) => Ok((lower + upper) / 2.0),
        _ => Err(invalid()),
    }
}

/// `rt` column from HDExaminer `Actual RT`, numeric columns are taken as they are
///
fn rt_series(actual_rt: &Series) -> Result<Series, FormatError> {
    if actual_rt.dtype().is_numeric() {
        return Ok(actual_rt.cast(&DataType::Float64)?.with_name("rt"));
    }
    let ranges = actual_rt.cast(&DataType::String)?;
    let rt = ranges
        .str()?
        .into_iter()
        .map(|raw| raw.map(convert_rt).transpose())
        .collect::<Result<Vec<Option<f64>>, FormatError>>()?;
    Ok(Series::new("rt", rt))
}

/// Converts DynamX v3 cluster data.
///
/// # Arguments
/// * `df` - Raw DynamX cluster dataframe
///
pub fn from_dynamx_cluster(df: &DataFrame) -> Result<DataFrame, FormatError> {
    let converted = rename_select(df, &DYNAMX_CLUSTER_MAPPING)?;
    let converted = with_stop(converted)?;
    let converted = with_centroid_mass(converted)?;
    let converted = exposure_minutes_to_seconds(converted)?;
    Ok(sort_rows(&converted)?)
}

/// Converts DynamX state data (v3 or vx)
///
/// # Arguments
/// * `df` - Raw DynamX state dataframe
///
pub fn from_dynamx_state(df: &DataFrame) -> Result<DataFrame, FormatError> {
    let converted = rename_select(df, &DYNAMX_STATE_MAPPING)?;
    let converted = with_stop(converted)?;
    let converted = exposure_minutes_to_seconds(converted)?;
    Ok(sort_rows(&converted)?)
}

/// Converts HDExaminer v3 data.
/// `Actual RT` ranges become their midpoint in `rt`.
///
/// # Arguments
/// * `df` - Raw HDExaminer dataframe
/// * `extra_columns` - Additional (source, target) columns to carry
///
pub fn from_hdexaminer(
    df: &DataFrame,
    extra_columns: &[(&str, &str)],
) -> Result<DataFrame, FormatError> {
    let rt = rt_series(column(df, "Actual RT")?)?;
    let mut mapping = HDEXAMINER_MAPPING.to_vec();
    mapping.extend_from_slice(extra_columns);

    let converted = rename_select(df, &mapping)?;
    let converted = with_stop(converted)?;
    let mut converted = with_centroid_mass(converted)?;
    insert_column_after(&mut converted, "intensity", rt)?;
    let converted = cast_exposure(converted)?;
    Ok(sort_rows(&converted)?)
}

/// Converts a dataframe read from a HXMS file
///
/// # Arguments
/// * `df` - Dataframe returned by the HXMS reader
///
pub fn from_hxms(df: &DataFrame) -> Result<DataFrame, FormatError> {
    let converted = rename_select(df, &HXMS_MAPPING)?;
    let converted = with_stop(converted)?;
    let converted = cast_exposure(converted)?;
    Ok(sort_rows(&converted)?)
}

#[cfg(test)]
mod test {
    // std imports
    use std::path::Path;

    // internal imports
    use super::*;
    use crate::chemistry::amino_acid::max_uptake;
    use crate::chemistry::molecule::PROTON_MASS;
    use crate::dataframe::frame::{column_names, has_column, i64_values};
    use crate::io::csv::reader::Reader;

    fn read(name: &str) -> DataFrame {
        Reader::read(&Path::new("test_files").join(name)).unwrap()
    }

    #[test]
    fn test_convert_rt() {
        let rt = convert_rt("7.44-7.65").unwrap();
        assert!((rt - 7.545).abs() < 1e-12);
        assert!(convert_rt("7.44").is_err());

        let numeric = Series::new("Actual RT", &[Some(3.0), None]);
        let rt = rt_series(&numeric).unwrap();
        assert_eq!(rt.name(), "rt");
        assert_eq!(rt.null_count(), 1);
    }

    #[test]
    fn test_cast_exposure() {
        let df = DataFrame::new(vec![Series::new("exposure", &["0s", "15s", "150.5s"])]).unwrap();
        let cast = cast_exposure(df).unwrap();
        assert_eq!(
            f64_values(&cast, "exposure").unwrap(),
            vec![Some(0.0), Some(15.0), Some(150.5)]
        );

        // sentinel values leave the column untouched
        let df = DataFrame::new(vec![Series::new("exposure", &["15s", "FD"])]).unwrap();
        let cast = cast_exposure(df.clone()).unwrap();
        assert_eq!(cast.column("exposure").unwrap().dtype(), &DataType::String);
        assert_eq!(
            str_values(&cast, "exposure").unwrap(),
            str_values(&df, "exposure").unwrap()
        );
    }

    #[test]
    fn test_from_dynamx_cluster() {
        let converted = PeptideFormat::DynamXv3Cluster
            .convert(&read("dynamx_v3_cluster.csv"))
            .unwrap();
        assert_eq!(
            column_names(&converted),
            vec![
                "state",
                "exposure",
                "start",
                "end",
                "stop",
                "sequence",
                "replicate",
                "charge",
                "centroid_mass",
                "centroid_mz",
                "intensity",
                "rt"
            ]
        );
        // minutes to seconds, rows sorted by exposure
        let exposure = f64_values(&converted, "exposure").unwrap();
        assert_eq!(exposure[0], Some(0.0));
        assert_eq!(exposure[exposure.len() - 1], Some(60.0));
        let charge = f64_values(&converted, "charge").unwrap()[0].unwrap();
        let mz = f64_values(&converted, "centroid_mz").unwrap()[0].unwrap();
        let mass = f64_values(&converted, "centroid_mass").unwrap()[0].unwrap();
        assert!((mass - charge * (mz - PROTON_MASS)).abs() < 1e-9);
        for (end, stop) in i64_values(&converted, "end")
            .unwrap()
            .into_iter()
            .zip(i64_values(&converted, "stop").unwrap())
        {
            assert_eq!(end.unwrap() + 1, stop.unwrap());
        }
    }

    #[test]
    fn test_from_dynamx_state_max_uptake() {
        let converted = from_dynamx_state(&read("dynamx_v3_state.csv")).unwrap();
        assert!(has_column(&converted, "centroid_mz_sd"));
        assert!(!has_column(&converted, "Protein"));
        for sequence in str_values(&converted, "sequence").unwrap() {
            let sequence = sequence.unwrap();
            let prolines = sequence.chars().filter(|c| *c == 'P').count();
            assert_eq!(max_uptake(&sequence), sequence.len() - prolines);
        }
    }

    #[test]
    fn test_missing_source_column() {
        let df = read("dynamx_v3_state.csv").drop("Center SD").unwrap();
        assert!(matches!(
            from_dynamx_state(&df),
            Err(FormatError::MissingColumns(columns)) if columns == vec!["Center SD".to_string()]
        ));
    }

    #[test]
    fn test_invalid_exposure() {
        let df = DataFrame::new(vec![
            Series::new("exposure", &["0.5", "FD"]),
            Series::new("end", &[5i64, 5]),
        ])
        .unwrap();
        let err = exposure_minutes_to_seconds(df).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value `FD` in column `exposure`");
    }

    #[test]
    fn test_from_hdexaminer() {
        let converted = PeptideFormat::HDExaminerV3
            .convert(&read("hdexaminer_v3.csv"))
            .unwrap();
        assert_eq!(converted.column("exposure").unwrap().dtype(), &DataType::Float64);
        assert!(has_column(&converted, "replicate"));
        let rt = f64_values(&converted, "rt").unwrap();
        assert!(rt.iter().all(Option::is_some));
        assert_eq!(
            f64_values(&converted, "exposure").unwrap().last().copied().flatten(),
            Some(300.0)
        );
    }
}
