// std imports
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// 3rd party imports
use anyhow::Result;
use itertools::Itertools;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::debug;

// internal imports
use crate::entities::errors::ValidationError;
use crate::entities::metadata::DatasetMetadata;
use crate::entities::peptides::{DeuterationType, LoadOptions};
use crate::entities::protein::ProteinIdentifiers;
use crate::entities::state::State;
use crate::entities::structure::Structure;
use crate::process::uptake::{compute_uptake_metrics, merge_peptides, FailurePolicy};
use crate::tools::hash::{hash_files, truncate_hash};

/// Addresses a state by name or position
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateKey<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for StateKey<'a> {
    fn from(name: &'a str) -> Self {
        StateKey::Name(name)
    }
}

impl From<usize> for StateKey<'_> {
    fn from(index: usize) -> Self {
        StateKey::Index(index)
    }
}

/// HDX-MS dataset with one or more states, the structure and metadata.
/// `file_hash` identifies the content of all referenced files.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedDataSet")]
pub struct HDXDataSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    hdx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    states: Vec<State>,
    #[serde(skip_serializing_if = "Option::is_none")]
    structure: Option<Structure>,
    protein_identifiers: ProteinIdentifiers,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<DatasetMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_hash: Option<String>,
}

impl HDXDataSet {
    /// Creates a new dataset, the file hash is not computed
    ///
    /// # Arguments
    /// * `states` - States, names must be unique
    /// * `structure` - Structural model
    /// * `protein_identifiers` - Identifiers of the protein
    /// * `metadata` - Authors, publication, etc.
    ///
    pub fn new(
        states: Vec<State>,
        structure: Option<Structure>,
        protein_identifiers: ProteinIdentifiers,
        metadata: Option<DatasetMetadata>,
    ) -> Result<Self, ValidationError> {
        let mut names = HashSet::new();
        for state in states.iter() {
            if !names.insert(state.get_name()) {
                return Err(ValidationError::DuplicateStateName(
                    state.get_name().to_string(),
                ));
            }
        }
        Ok(Self {
            hdx_id: None,
            description: None,
            states,
            structure,
            protein_identifiers,
            metadata,
            file_hash: None,
        })
    }

    /// Reads a dataset document. Relative data file paths are resolved against `root`.
    ///
    /// # Arguments
    /// * `json` - Dataset document
    /// * `root` - Directory relative paths are relative to
    ///
    pub fn from_json(json: &str, root: Option<&Path>) -> Result<Self> {
        let mut dataset: HDXDataSet = serde_json::from_str(json)?;
        if let Some(root) = root {
            dataset.map_data_files(|path| {
                if path.is_relative() {
                    root.join(path)
                } else {
                    path.to_path_buf()
                }
            });
        }
        Ok(dataset)
    }

    /// Serializes the dataset, paths are written as they are
    ///
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get_hdx_id(&self) -> Option<&str> {
        self.hdx_id.as_deref()
    }

    pub fn set_hdx_id(&mut self, hdx_id: String) {
        self.hdx_id = Some(hdx_id);
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn get_states(&self) -> &[State] {
        &self.states
    }

    pub fn get_structure(&self) -> Option<&Structure> {
        self.structure.as_ref()
    }

    pub fn get_protein_identifiers(&self) -> &ProteinIdentifiers {
        &self.protein_identifiers
    }

    pub fn get_metadata(&self) -> Option<&DatasetMetadata> {
        self.metadata.as_ref()
    }

    pub fn get_file_hash(&self) -> Option<&str> {
        self.file_hash.as_deref()
    }

    /// Returns a state by name or index
    ///
    /// # Arguments
    /// * `key` - State name or index
    ///
    pub fn get_state<'a>(&self, key: impl Into<StateKey<'a>>) -> Result<&State, ValidationError> {
        match key.into() {
            StateKey::Name(name) => self
                .states
                .iter()
                .find(|state| state.get_name() == name)
                .ok_or_else(|| ValidationError::UnknownState(name.to_string())),
            StateKey::Index(index) => {
                self.states
                    .get(index)
                    .ok_or(ValidationError::StateIndexOutOfRange {
                        index,
                        len: self.states.len(),
                    })
            }
        }
    }

    /// All distinct referenced files, sorted
    ///
    pub fn data_files(&self) -> Vec<PathBuf> {
        self.states
            .iter()
            .flat_map(|state| state.get_peptide_sets())
            .map(|peptides| peptides.get_data_file().to_path_buf())
            .chain(
                self.structure
                    .iter()
                    .map(|structure| structure.get_data_file().to_path_buf()),
            )
            .sorted()
            .dedup()
            .collect()
    }

    /// Replaces every referenced file path
    ///
    /// # Arguments
    /// * `map` - Maps the current path to the new one
    ///
    pub fn map_data_files<F>(&mut self, map: F)
    where
        F: Fn(&Path) -> PathBuf,
    {
        for state in self.states.iter_mut() {
            for peptides in state.get_peptide_sets_mut() {
                let mapped = map(peptides.get_data_file());
                peptides.set_data_file(mapped);
            }
        }
        if let Some(structure) = self.structure.as_mut() {
            let mapped = map(structure.get_data_file());
            structure.set_data_file(mapped);
        }
    }

    /// Full SHA-256 digest over all referenced files
    ///
    pub fn hash_files(&self) -> Result<String> {
        hash_files(&self.data_files())
    }

    /// Computes and stores the truncated file hash.
    /// If a referenced file is missing the hash is unset.
    ///
    /// # Arguments
    /// * `length` - Number of hex characters to keep
    ///
    pub fn update_file_hash(&mut self, length: usize) -> Result<Option<&str>> {
        if self.data_files().iter().any(|path| !path.exists()) {
            self.file_hash = None;
            return Ok(None);
        }
        self.file_hash = Some(truncate_hash(&self.hash_files()?, length));
        debug!("File hash {:?}", self.file_hash);
        Ok(self.file_hash.as_deref())
    }

    /// True if the stored hash is a prefix of the digest of the current files
    ///
    pub fn validate_file_integrity(&self) -> Result<bool> {
        match self.file_hash.as_deref() {
            Some(file_hash) => Ok(self.hash_files()?.starts_with(file_hash)),
            None => Ok(false),
        }
    }

    /// Loads partially, non- and fully deuterated peptides of a state and computes uptake and RFU.
    ///
    /// # Arguments
    /// * `key` - State name or index
    /// * `policy` - What to do if a metric cannot be derived
    ///
    pub fn compute_uptake_metrics<'a>(
        &self,
        key: impl Into<StateKey<'a>>,
        policy: FailurePolicy,
    ) -> Result<DataFrame> {
        let state = self.get_state(key)?;
        let options = LoadOptions::default();
        let pd = match state.get_peptides(DeuterationType::PartiallyDeuterated) {
            Some(peptides) => peptides.load(&options)?,
            None => anyhow::bail!(
                "State `{}` has no partially deuterated peptides",
                state.get_name()
            ),
        };
        let nd = match state.get_peptides(DeuterationType::NonDeuterated) {
            Some(peptides) => Some(peptides.load(&options)?),
            None => None,
        };
        let fd = match state.get_peptides(DeuterationType::FullyDeuterated) {
            Some(peptides) => Some(peptides.load(&options)?),
            None => None,
        };
        let merged = merge_peptides(&pd, nd.as_deref(), fd.as_deref(), None)?;
        Ok(compute_uptake_metrics(&merged, policy)?)
    }
}

#[derive(Deserialize)]
struct UncheckedDataSet {
    #[serde(default)]
    hdx_id: Option<String>,
    #[serde(default)]
    description: Option<String>,
    states: Vec<State>,
    #[serde(default)]
    structure: Option<Structure>,
    #[serde(default)]
    protein_identifiers: ProteinIdentifiers,
    #[serde(default)]
    metadata: Option<DatasetMetadata>,
    #[serde(default)]
    file_hash: Option<String>,
}

impl TryFrom<UncheckedDataSet> for HDXDataSet {
    type Error = ValidationError;

    fn try_from(unchecked: UncheckedDataSet) -> Result<Self, Self::Error> {
        let mut dataset = HDXDataSet::new(
            unchecked.states,
            unchecked.structure,
            unchecked.protein_identifiers,
            unchecked.metadata,
        )?;
        dataset.hdx_id = unchecked.hdx_id;
        dataset.description = unchecked.description;
        dataset.file_hash = unchecked.file_hash;
        Ok(dataset)
    }
}
