// 3rd party imports
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};

// internal imports
use crate::entities::metadata::{Author, Publication};
use crate::entities::peptides::DeuterationType;
use crate::entities::protein::{check_sequence_length, ProteinIdentifiers};
use crate::process::filters::Filters;

lazy_static! {
    static ref ORCID_REGEX: Regex = Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{3}[0-9X]$").unwrap();
    static ref DOI_REGEX: Regex = Regex::new(r"^10\.\d{4,}/.*$").unwrap();
}

/// Outcome of a validation check. Validation never fails, problems are reported as errors and warnings.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ValidationResponse {
    fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Protein state as submitted, not yet validated
///
#[derive(Clone, Debug, Deserialize)]
pub struct ProteinStateInput {
    pub sequence: String,
    pub n_term: i64,
    pub c_term: i64,
    #[serde(default)]
    pub mutations: Option<Vec<String>>,
    #[serde(default)]
    pub oligomeric_state: Option<u32>,
    #[serde(default)]
    pub ligand: Option<String>,
}

/// Peptide set as submitted, the data file is referenced by its upload id
///
#[derive(Clone, Debug, Deserialize)]
pub struct PeptidesInput {
    pub data_file_id: String,
    pub data_format: String,
    pub deuteration_type: DeuterationType,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default, rename = "pH")]
    pub ph: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub d_percentage: Option<f64>,
    #[serde(default)]
    pub chain: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StateInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub protein_state: ProteinStateInput,
    #[serde(default)]
    pub peptides: Vec<PeptidesInput>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MetadataInput {
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub publication: Option<Publication>,
    #[serde(default)]
    pub protein_identifiers: Option<ProteinIdentifiers>,
    #[serde(default)]
    pub conversion_notes: Option<String>,
}

pub fn is_valid_orcid(orcid: &str) -> bool {
    ORCID_REGEX.is_match(orcid).unwrap_or(false)
}

pub fn is_valid_doi(doi: &str) -> bool {
    DOI_REGEX.is_match(doi).unwrap_or(false)
}

/// Validates a state before it is added to a dataset
///
/// # Arguments
/// * `state` - Submitted state
///
pub fn validate_state(state: &StateInput) -> ValidationResponse {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let protein_state = &state.protein_state;
    if let Err(err) = check_sequence_length(
        &protein_state.sequence,
        protein_state.n_term,
        protein_state.c_term,
    ) {
        errors.push(err.to_string());
    }
    if state.peptides.is_empty() {
        warnings.push("No peptides defined for this state".to_string());
    }
    if protein_state.oligomeric_state.is_none() {
        warnings.push("No oligomeric state specified (recommended)".to_string());
    }
    ValidationResponse::new(errors, warnings)
}

/// Validates protein identifiers, which are all optional
///
pub fn validate_protein_identifiers(identifiers: &ProteinIdentifiers) -> ValidationResponse {
    let mut warnings = Vec::new();
    if identifiers.get_uniprot_accession_number().is_none() {
        warnings.push("UniProt accession number not provided (recommended)".to_string());
    }
    ValidationResponse::new(Vec::new(), warnings)
}

/// Validates authorship, license and publication
///
/// # Arguments
/// * `metadata` - Submitted metadata
///
pub fn validate_metadata(metadata: &MetadataInput) -> ValidationResponse {
    let mut errors = Vec::new();
    if metadata.license.is_empty() {
        errors.push("License is required".to_string());
    }
    if metadata.authors.is_empty() {
        errors.push("At least one author is required".to_string());
    }
    for author in metadata.authors.iter() {
        if let Some(orcid) = author.get_orcid() {
            if !is_valid_orcid(orcid) {
                errors.push(format!(
                    "Invalid ORCID format for {}: {}",
                    author.get_name(),
                    orcid
                ));
            }
        }
    }
    if let Some(doi) = metadata.publication.as_ref().and_then(|publication| publication.get_doi()) {
        if !is_valid_doi(doi) {
            errors.push(format!("Invalid DOI format: {}", doi));
        }
    }
    let warnings = match metadata.protein_identifiers.as_ref() {
        Some(identifiers) => validate_protein_identifiers(identifiers).warnings,
        None => vec!["UniProt accession number not provided (recommended)".to_string()],
    };
    ValidationResponse::new(errors, warnings)
}
