// std imports
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

// 3rd party imports
use anyhow::{bail, Result};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// internal imports
use crate::entities::structure::StructureMapping;
use crate::formats::peptide_format::PeptideFormat;
use crate::io::load_data;
use crate::process::aggregate::aggregate;
use crate::process::filters::{apply_filters, Filters};
use crate::process::ordering::{drop_null_columns, sort_columns, sort_rows};

/// Number of memo slots, one per combination of the five resolved load flags
///
const MEMO_SLOTS: usize = 32;

/// Experimental role of a peptide set within a state
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeuterationType {
    PartiallyDeuterated,
    FullyDeuterated,
    NonDeuterated,
}

impl DeuterationType {
    pub fn get_name(&self) -> &'static str {
        match self {
            DeuterationType::PartiallyDeuterated => "partially_deuterated",
            DeuterationType::FullyDeuterated => "fully_deuterated",
            DeuterationType::NonDeuterated => "non_deuterated",
        }
    }
}

impl fmt::Display for DeuterationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get_name())
    }
}

/// Requested processing steps of [Peptides::load]
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Convert into the canonical table
    pub convert: bool,
    /// Aggregate replicates, `None` aggregates unless the source is already aggregated
    pub aggregate: Option<bool>,
    pub sort_rows: bool,
    pub sort_columns: bool,
    /// Drop columns containing only nulls
    pub drop_null: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            convert: true,
            aggregate: None,
            sort_rows: true,
            sort_columns: true,
            drop_null: true,
        }
    }
}

/// Processing steps actually applied after resolving [LoadOptions] against the source
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedLoadOptions {
    pub convert: bool,
    pub aggregate: bool,
    pub sort_rows: bool,
    pub sort_columns: bool,
    pub drop_null: bool,
}

impl ResolvedLoadOptions {
    /// Slot of these flags in the load memo
    ///
    pub fn memo_index(&self) -> usize {
        [
            self.convert,
            self.aggregate,
            self.sort_rows,
            self.sort_columns,
            self.drop_null,
        ]
        .iter()
        .enumerate()
        .map(|(bit, flag)| (*flag as usize) << bit)
        .sum()
    }
}

/// Requested steps which were skipped
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadWarning {
    PreAggregated,
    AggregateWithoutConversion,
    SortRowsWithoutConversion,
    SortColumnsWithoutConversion,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            LoadWarning::PreAggregated => {
                "Data format is pre-aggregated. Aggregation will be skipped."
            }
            LoadWarning::AggregateWithoutConversion => {
                "Cannot aggregate data without conversion. Aggregation will be skipped."
            }
            LoadWarning::SortRowsWithoutConversion => {
                "Cannot sort rows without conversion. Sorting will be skipped."
            }
            LoadWarning::SortColumnsWithoutConversion => {
                "Cannot sort columns without conversion. Sorting will be skipped."
            }
        };
        write!(f, "{}", message)
    }
}

/// Resolves the requested options. Rules are applied in order, each may disable a later step:
/// 1. an unset `aggregate` aggregates unless the source is aggregated
/// 2. aggregated sources are never aggregated again
/// 3. unconverted data is neither aggregated nor sorted
///
/// # Arguments
/// * `options` - Requested options
/// * `source_aggregated` - True if the (filtered) source holds one row per peptide and exposure
///
pub fn resolve_load_options(
    options: &LoadOptions,
    source_aggregated: bool,
) -> (ResolvedLoadOptions, Vec<LoadWarning>) {
    let mut warnings = Vec::new();
    let mut aggregate = options.aggregate.unwrap_or(!source_aggregated);
    let mut sort_rows = options.sort_rows;
    let mut sort_columns = options.sort_columns;
    if aggregate && source_aggregated {
        warnings.push(LoadWarning::PreAggregated);
        aggregate = false;
    }
    if !options.convert {
        if aggregate {
            warnings.push(LoadWarning::AggregateWithoutConversion);
            aggregate = false;
        }
        if sort_rows {
            warnings.push(LoadWarning::SortRowsWithoutConversion);
            sort_rows = false;
        }
        if sort_columns {
            warnings.push(LoadWarning::SortColumnsWithoutConversion);
            sort_columns = false;
        }
    }
    (
        ResolvedLoadOptions {
            convert: options.convert,
            aggregate,
            sort_rows,
            sort_columns,
            drop_null: options.drop_null,
        },
        warnings,
    )
}

/// Loaded tables of a single peptide set, indexed by [ResolvedLoadOptions::memo_index].
/// Clones start empty.
///
#[derive(Debug, Default)]
struct LoadMemo {
    raw: OnceLock<Arc<DataFrame>>,
    tables: [OnceLock<Arc<DataFrame>>; MEMO_SLOTS],
}

impl Clone for LoadMemo {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for LoadMemo {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// A set of HDX-MS peptides in a data file, selected by filters.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peptides {
    data_file: PathBuf,
    data_format: PeptideFormat,
    deuteration_type: DeuterationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chain: Option<Vec<String>>,
    #[serde(default)]
    filters: Filters,
    #[serde(rename = "pH", default, skip_serializing_if = "Option::is_none")]
    ph: Option<f64>,
    /// Kelvin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    d_percentage: Option<f64>,
    /// Molar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ionic_strength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    structure_mapping: Option<StructureMapping>,
    #[serde(skip)]
    memo: LoadMemo,
}

impl Peptides {
    /// Creates a new peptide set
    ///
    /// # Arguments
    /// * `data_file` - Path of the data file
    /// * `data_format` - Format of the data file
    /// * `deuteration_type` - Role of the peptides
    /// * `filters` - Filters selecting the peptides from the raw data
    ///
    pub fn new(
        data_file: PathBuf,
        data_format: PeptideFormat,
        deuteration_type: DeuterationType,
        filters: Filters,
    ) -> Self {
        Self {
            data_file,
            data_format,
            deuteration_type,
            entity_id: None,
            chain: None,
            filters,
            ph: None,
            temperature: None,
            d_percentage: None,
            ionic_strength: None,
            structure_mapping: None,
            memo: LoadMemo::default(),
        }
    }

    pub fn get_data_file(&self) -> &Path {
        &self.data_file
    }

    /// Replaces the data file, memoized tables are dropped
    ///
    pub fn set_data_file(&mut self, data_file: PathBuf) {
        self.data_file = data_file;
        self.memo = LoadMemo::default();
    }

    pub fn get_data_format(&self) -> PeptideFormat {
        self.data_format
    }

    pub fn get_deuteration_type(&self) -> DeuterationType {
        self.deuteration_type
    }

    pub fn get_entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn get_chain(&self) -> Option<&[String]> {
        self.chain.as_deref()
    }

    pub fn get_filters(&self) -> &Filters {
        &self.filters
    }

    pub fn get_ph(&self) -> Option<f64> {
        self.ph
    }

    pub fn get_temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn get_d_percentage(&self) -> Option<f64> {
        self.d_percentage
    }

    pub fn get_ionic_strength(&self) -> Option<f64> {
        self.ionic_strength
    }

    pub fn get_structure_mapping(&self) -> Option<&StructureMapping> {
        self.structure_mapping.as_ref()
    }

    pub fn with_ph(mut self, ph: f64) -> Self {
        self.ph = Some(ph);
        self
    }

    /// Sets the temperature in Kelvin
    ///
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_d_percentage(mut self, d_percentage: f64) -> Self {
        self.d_percentage = Some(d_percentage);
        self
    }

    pub fn with_chain(mut self, chain: Vec<String>) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn with_structure_mapping(mut self, structure_mapping: StructureMapping) -> Self {
        self.structure_mapping = Some(structure_mapping);
        self
    }

    /// Reads the data file and applies the filters. The result is memoized.
    ///
    fn load_raw(&self) -> Result<Arc<DataFrame>> {
        if let Some(raw) = self.memo.raw.get() {
            return Ok(raw.clone());
        }
        if !self.data_file.exists() {
            bail!("Data file {} does not exist.", self.data_file.display());
        }
        let table = apply_filters(&load_data(&self.data_file)?, &self.filters)?;
        debug!(
            "Read {} peptide rows from {}",
            table.height(),
            self.data_file.display()
        );
        Ok(self.memo.raw.get_or_init(|| Arc::new(table)).clone())
    }

    /// Applies the resolved steps: convert, aggregate, drop nulls, sort rows, sort columns
    ///
    fn process(&self, raw: &DataFrame, options: &ResolvedLoadOptions) -> Result<DataFrame> {
        let mut table = if options.convert {
            self.data_format.convert(raw)?
        } else {
            raw.clone()
        };
        if options.aggregate {
            table = aggregate(&table)?;
        }
        if options.drop_null {
            table = drop_null_columns(&table);
        }
        if options.sort_rows {
            table = sort_rows(&table)?;
        }
        if options.sort_columns {
            table = sort_columns(&table)?;
        }
        Ok(table)
    }

    /// Loads the peptides, see [Peptides::load_with_warnings]
    ///
    /// # Arguments
    /// * `options` - Requested processing steps
    ///
    pub fn load(&self, options: &LoadOptions) -> Result<Arc<DataFrame>> {
        Ok(self.load_with_warnings(options)?.0)
    }

    /// Loads the peptides and returns the skipped steps.
    /// Dataframes are memoized per resolved options, so requests resolving to the same steps share one.
    /// Skipped steps are logged as warnings as well.
    ///
    /// # Arguments
    /// * `options` - Requested processing steps
    ///
    pub fn load_with_warnings(
        &self,
        options: &LoadOptions,
    ) -> Result<(Arc<DataFrame>, Vec<LoadWarning>)> {
        let raw = self.load_raw()?;
        let (resolved, warnings) =
            resolve_load_options(options, self.data_format.is_aggregated(&raw));
        for warning in warnings.iter() {
            warn!("{}: {}", self.data_file.display(), warning);
        }
        let slot = &self.memo.tables[resolved.memo_index()];
        if let Some(table) = slot.get() {
            debug!("Reusing loaded peptides for {:?}", resolved);
            return Ok((table.clone(), warnings));
        }
        let table = Arc::new(self.process(&raw, &resolved)?);
        Ok((slot.get_or_init(|| table).clone(), warnings))
    }
}
