// std imports
use std::fmt;
use std::str::FromStr;

// 3rd party imports
use polars::prelude::DataFrame;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

// internal imports
use crate::dataframe::frame::has_column;
use crate::formats::errors::FormatError;
use crate::io::hxms::reader::is_aggregated as hxms_is_aggregated;

pub const DYNAMX_V3_STATE_COLUMNS: [&str; 16] = [
    "Protein",
    "Start",
    "End",
    "Sequence",
    "Modification",
    "Fragment",
    "MaxUptake",
    "MHP",
    "State",
    "Exposure",
    "Center",
    "Center SD",
    "Uptake",
    "Uptake SD",
    "RT",
    "RT SD",
];

pub const DYNAMX_VX_STATE_COLUMNS: [&str; 14] = [
    "Protein",
    "Start",
    "End",
    "Sequence",
    "MaxUptake",
    "MHP",
    "State",
    "Exposure",
    "Center",
    "Center SD",
    "Uptake",
    "Uptake SD",
    "RT",
    "RT SD",
];

pub const DYNAMX_V3_CLUSTER_COLUMNS: [&str; 15] = [
    "Protein",
    "Start",
    "End",
    "Sequence",
    "Modification",
    "Fragment",
    "MaxUptake",
    "MHP",
    "State",
    "Exposure",
    "File",
    "z",
    "RT",
    "Inten",
    "Center",
];

pub const HDEXAMINER_V3_COLUMNS: [&str; 20] = [
    "Protein State",
    "Deut Time",
    "Experiment",
    "Start",
    "End",
    "Sequence",
    "Charge",
    "Search RT",
    "Actual RT",
    "# Spectra",
    "Peak Width Da",
    "m/z Shift Da",
    "Max Inty",
    "Exp Cent",
    "Theor Cent",
    "Score",
    "Cent Diff",
    "# Deut",
    "Deut %",
    "Confidence",
];

const DYNAMX_FILTER_COLUMNS: [&str; 3] = ["Protein", "State", "Exposure"];
const HDEXAMINER_FILTER_COLUMNS: [&str; 2] = ["Protein State", "Deut Time"];
const HXMS_FILTER_COLUMNS: [&str; 1] = ["TIME(Sec)"];
const OPEN_HDX_FILTER_COLUMNS: [&str; 2] = ["state", "exposure"];

/// Formats of peptide tables.
/// The serialized names are the names used in dataset documents.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeptideFormat {
    #[serde(rename = "DynamX_v3_state")]
    DynamXv3State,
    #[serde(rename = "DynamX_vx_state")]
    DynamXvxState,
    #[serde(rename = "DynamX_v3_cluster")]
    DynamXv3Cluster,
    #[serde(rename = "HDExaminer_v3")]
    HDExaminerV3,
    #[serde(rename = "HXMS")]
    Hxms,
    /// Open schema, the table already uses the canonical column names
    #[serde(rename = "OpenHDX")]
    OpenHdx,
}

/// Formats identified by their columns, in identification priority order.
/// The first format matching a table wins.
///
pub const REGISTRY: [PeptideFormat; 4] = [
    PeptideFormat::DynamXv3State,
    PeptideFormat::DynamXvxState,
    PeptideFormat::DynamXv3Cluster,
    PeptideFormat::HDExaminerV3,
];

impl PeptideFormat {
    pub fn get_name(&self) -> &'static str {
        match self {
            PeptideFormat::DynamXv3State => "DynamX_v3_state",
            PeptideFormat::DynamXvxState => "DynamX_vx_state",
            PeptideFormat::DynamXv3Cluster => "DynamX_v3_cluster",
            PeptideFormat::HDExaminerV3 => "HDExaminer_v3",
            PeptideFormat::Hxms => "HXMS",
            PeptideFormat::OpenHdx => "OpenHDX",
        }
    }

    /// Expected source columns in file order, empty for formats without fixed layout
    ///
    pub fn get_columns(&self) -> &'static [&'static str] {
        match self {
            PeptideFormat::DynamXv3State => &DYNAMX_V3_STATE_COLUMNS,
            PeptideFormat::DynamXvxState => &DYNAMX_VX_STATE_COLUMNS,
            PeptideFormat::DynamXv3Cluster => &DYNAMX_V3_CLUSTER_COLUMNS,
            PeptideFormat::HDExaminerV3 => &HDEXAMINER_V3_COLUMNS,
            PeptideFormat::Hxms | PeptideFormat::OpenHdx => &[],
        }
    }

    /// Name of the source column holding the protein state, HXMS has none
    ///
    pub fn get_state_name(&self) -> Option<&'static str> {
        match self {
            PeptideFormat::DynamXv3State
            | PeptideFormat::DynamXvxState
            | PeptideFormat::DynamXv3Cluster => Some("State"),
            PeptideFormat::HDExaminerV3 => Some("Protein State"),
            PeptideFormat::Hxms => None,
            PeptideFormat::OpenHdx => Some("state"),
        }
    }

    /// Name of the source column holding the deuteration time
    ///
    pub fn get_exposure_name(&self) -> &'static str {
        match self {
            PeptideFormat::DynamXv3State
            | PeptideFormat::DynamXvxState
            | PeptideFormat::DynamXv3Cluster => "Exposure",
            PeptideFormat::HDExaminerV3 => "Deut Time",
            PeptideFormat::Hxms => "TIME(Sec)",
            PeptideFormat::OpenHdx => "exposure",
        }
    }

    /// Source columns offered for selecting rows, in cascading order
    ///
    pub fn get_filter_columns(&self) -> &'static [&'static str] {
        match self {
            PeptideFormat::DynamXv3State
            | PeptideFormat::DynamXvxState
            | PeptideFormat::DynamXv3Cluster => &DYNAMX_FILTER_COLUMNS,
            PeptideFormat::HDExaminerV3 => &HDEXAMINER_FILTER_COLUMNS,
            PeptideFormat::Hxms => &HXMS_FILTER_COLUMNS,
            PeptideFormat::OpenHdx => &OPEN_HDX_FILTER_COLUMNS,
        }
    }

    /// Returns if data of this format is aggregated by its schema alone.
    /// `None` if it depends on the data.
    ///
    pub fn get_schema_aggregation(&self) -> Option<bool> {
        match self {
            PeptideFormat::DynamXv3State | PeptideFormat::DynamXvxState => Some(true),
            PeptideFormat::DynamXv3Cluster | PeptideFormat::HDExaminerV3 => Some(false),
            PeptideFormat::Hxms | PeptideFormat::OpenHdx => None,
        }
    }

    /// Returns if the given (raw) dataframe of this format holds one row per (start, end, exposure).
    ///
    /// # Arguments
    /// * `df` - Raw dataframe in this format
    ///
    pub fn is_aggregated(&self, df: &DataFrame) -> bool {
        match self.get_schema_aggregation() {
            Some(aggregated) => aggregated,
            None => match self {
                PeptideFormat::Hxms => hxms_is_aggregated(df).unwrap_or(false),
                _ => !has_column(df, "replicate"),
            },
        }
    }

    /// Returns the descriptor of this format for the given dataframe
    ///
    /// # Arguments
    /// * `df` - Raw dataframe in this format
    ///
    pub fn describe(&self, df: &DataFrame) -> FormatDescriptor {
        FormatDescriptor::new(*self, self.is_aggregated(df))
    }
}

impl fmt::Display for PeptideFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get_name())
    }
}

impl FromStr for PeptideFormat {
    type Err = FormatError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "DynamX_v3_state" => Ok(PeptideFormat::DynamXv3State),
            "DynamX_vx_state" => Ok(PeptideFormat::DynamXvxState),
            "DynamX_v3_cluster" => Ok(PeptideFormat::DynamXv3Cluster),
            "HDExaminer_v3" => Ok(PeptideFormat::HDExaminerV3),
            "HXMS" => Ok(PeptideFormat::Hxms),
            "OpenHDX" => Ok(PeptideFormat::OpenHdx),
            _ => Err(FormatError::UnsupportedFormat(name.to_string())),
        }
    }
}

/// Immutable description of a format as found for a table
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    format: PeptideFormat,
    aggregated: bool,
}

impl FormatDescriptor {
    pub fn new(format: PeptideFormat, aggregated: bool) -> Self {
        Self { format, aggregated }
    }

    pub fn get_format(&self) -> PeptideFormat {
        self.format
    }

    pub fn get_columns(&self) -> &'static [&'static str] {
        self.format.get_columns()
    }

    pub fn get_state_name(&self) -> Option<&'static str> {
        self.format.get_state_name()
    }

    pub fn get_exposure_name(&self) -> &'static str {
        self.format.get_exposure_name()
    }

    pub fn get_filter_columns(&self) -> &'static [&'static str] {
        self.format.get_filter_columns()
    }

    pub fn is_aggregated(&self) -> bool {
        self.aggregated
    }
}

impl Serialize for FormatDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FormatDescriptor", 6)?;
        state.serialize_field("name", self.format.get_name())?;
        state.serialize_field("columns", self.get_columns())?;
        state.serialize_field("state_name", &self.get_state_name())?;
        state.serialize_field("exposure_name", self.get_exposure_name())?;
        state.serialize_field("aggregated", &self.aggregated)?;
        state.serialize_field("filter_columns", self.get_filter_columns())?;
        state.end()
    }
}
