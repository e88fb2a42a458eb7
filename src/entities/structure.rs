// std imports
use std::path::{Path, PathBuf};

// 3rd party imports
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Structural model file of a dataset.
/// If the HDX data uses the residue numbers or chain labels assigned by the author of the structure
/// `auth_residue_numbers` or `auth_chain_labels` are set.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    data_file: PathBuf,
    format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pdb_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alphafold_id: Option<String>,
    #[serde(default)]
    auth_residue_numbers: bool,
    #[serde(default)]
    auth_chain_labels: bool,
}

impl Structure {
    pub fn new(data_file: PathBuf, format: String) -> Self {
        Self {
            data_file,
            format,
            description: None,
            pdb_id: None,
            alphafold_id: None,
            auth_residue_numbers: false,
            auth_chain_labels: false,
        }
    }

    pub fn get_data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn set_data_file(&mut self, data_file: PathBuf) {
        self.data_file = data_file;
    }

    pub fn get_format(&self) -> &str {
        &self.format
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn get_pdb_id(&self) -> Option<&str> {
        self.pdb_id.as_deref()
    }

    pub fn get_alphafold_id(&self) -> Option<&str> {
        self.alphafold_id.as_deref()
    }

    pub fn get_auth_residue_numbers(&self) -> bool {
        self.auth_residue_numbers
    }

    pub fn get_auth_chain_labels(&self) -> bool {
        self.auth_chain_labels
    }

    /// Name of the residue number field in structure viewers
    ///
    pub fn get_residue_name(&self) -> &'static str {
        if self.auth_residue_numbers {
            "auth_residue_number"
        } else {
            "residue_number"
        }
    }

    /// Name of the chain field in structure viewers
    ///
    pub fn get_chain_name(&self) -> &'static str {
        if self.auth_chain_labels {
            "auth_asym_id"
        } else {
            "struct_asym_id"
        }
    }

    pub fn with_pdb_id(mut self, pdb_id: String) -> Self {
        self.pdb_id = Some(pdb_id);
        self
    }
}

/// Maps residue numbers of the peptide data onto residue numbers of the structure
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chain: Option<Vec<String>>,
    #[serde(default)]
    residue_offset: i64,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    mapping: IndexMap<i64, i64>,
}

impl StructureMapping {
    pub fn new(chain: Option<Vec<String>>, residue_offset: i64, mapping: IndexMap<i64, i64>) -> Self {
        Self {
            chain,
            residue_offset,
            mapping,
        }
    }

    pub fn get_chain(&self) -> Option<&[String]> {
        self.chain.as_deref()
    }

    pub fn get_residue_offset(&self) -> i64 {
        self.residue_offset
    }

    /// Returns the structure residue number. Explicitly mapped residues take precedence over the offset.
    ///
    /// # Arguments
    /// * `residue_number` - Residue number in the peptide data
    ///
    pub fn map_residue(&self, residue_number: i64) -> i64 {
        match self.mapping.get(&residue_number) {
            Some(mapped) => *mapped,
            None => residue_number + self.residue_offset,
        }
    }
}
