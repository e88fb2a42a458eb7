// 3rd party imports
use serde::{Deserialize, Serialize};

// internal imports
use crate::entities::errors::ValidationError;

/// Protein of a single state. The sequence covers the residues `n_term..=c_term`.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedProteinState")]
pub struct ProteinState {
    sequence: String,
    n_term: i64,
    c_term: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    mutations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    oligomeric_state: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ligand: Option<String>,
}

impl ProteinState {
    /// Creates a new protein state
    ///
    /// # Arguments
    /// * `sequence` - Amino acid sequence in one letter code
    /// * `n_term` - Residue number of the first residue, may be negative for tags
    /// * `c_term` - Residue number of the last residue
    ///
    pub fn new(sequence: String, n_term: i64, c_term: i64) -> Result<Self, ValidationError> {
        check_sequence_length(&sequence, n_term, c_term)?;
        Ok(Self {
            sequence,
            n_term,
            c_term,
            mutations: None,
            oligomeric_state: None,
            ligand: None,
        })
    }

    pub fn get_sequence(&self) -> &str {
        &self.sequence
    }

    pub fn get_n_term(&self) -> i64 {
        self.n_term
    }

    pub fn get_c_term(&self) -> i64 {
        self.c_term
    }

    pub fn get_mutations(&self) -> Option<&[String]> {
        self.mutations.as_deref()
    }

    pub fn get_oligomeric_state(&self) -> Option<u32> {
        self.oligomeric_state
    }

    pub fn get_ligand(&self) -> Option<&str> {
        self.ligand.as_deref()
    }

    pub fn with_mutations(mut self, mutations: Vec<String>) -> Self {
        self.mutations = Some(mutations);
        self
    }

    pub fn with_oligomeric_state(mut self, oligomeric_state: u32) -> Self {
        self.oligomeric_state = Some(oligomeric_state);
        self
    }

    pub fn with_ligand(mut self, ligand: String) -> Self {
        self.ligand = Some(ligand);
        self
    }
}

/// Checks `len(sequence) == c_term - n_term + 1`
///
/// # Arguments
/// * `sequence` - Amino acid sequence
/// * `n_term` - Residue number of the first residue
/// * `c_term` - Residue number of the last residue
///
pub fn check_sequence_length(sequence: &str, n_term: i64, c_term: i64) -> Result<(), ValidationError> {
    let actual = sequence.chars().count();
    let expected = c_term - n_term + 1;
    if actual as i64 != expected {
        return Err(ValidationError::SequenceLength {
            actual,
            n_term,
            c_term,
            expected,
        });
    }
    Ok(())
}

#[derive(Deserialize)]
struct UncheckedProteinState {
    sequence: String,
    n_term: i64,
    c_term: i64,
    #[serde(default)]
    mutations: Option<Vec<String>>,
    #[serde(default)]
    oligomeric_state: Option<u32>,
    #[serde(default)]
    ligand: Option<String>,
}

impl TryFrom<UncheckedProteinState> for ProteinState {
    type Error = ValidationError;

    fn try_from(unchecked: UncheckedProteinState) -> Result<Self, Self::Error> {
        let mut protein_state =
            ProteinState::new(unchecked.sequence, unchecked.n_term, unchecked.c_term)?;
        protein_state.mutations = unchecked.mutations;
        protein_state.oligomeric_state = unchecked.oligomeric_state;
        protein_state.ligand = unchecked.ligand;
        Ok(protein_state)
    }
}

/// General identifiers of the protein
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProteinIdentifiers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uniprot_accession_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uniprot_entry_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    protein_name: Option<String>,
}

impl ProteinIdentifiers {
    pub fn new(
        uniprot_accession_number: Option<String>,
        uniprot_entry_name: Option<String>,
        protein_name: Option<String>,
    ) -> Self {
        Self {
            uniprot_accession_number,
            uniprot_entry_name,
            protein_name,
        }
    }

    pub fn get_uniprot_accession_number(&self) -> Option<&str> {
        self.uniprot_accession_number.as_deref()
    }

    pub fn get_uniprot_entry_name(&self) -> Option<&str> {
        self.uniprot_entry_name.as_deref()
    }

    pub fn get_protein_name(&self) -> Option<&str> {
        self.protein_name.as_deref()
    }
}

#[cfg(test)]
mod test {
    // internal imports
    use super::*;

    #[test]
    fn test_sequence_length_mismatch() {
        let err = ProteinState::new("MSEQNNT".to_string(), 1, 14).unwrap_err();
        assert_eq!(
            err,
            ValidationError::SequenceLength {
                actual: 7,
                n_term: 1,
                c_term: 14,
                expected: 14
            }
        );
        assert_eq!(
            err.to_string(),
            "Sequence length (7) doesn't match N-term(1) to C-term(14): expected 14"
        );
    }

    #[test]
    fn test_negative_n_term() {
        // purification tag before the first residue
        let protein_state = ProteinState::new("HHHMSEQ".to_string(), -2, 4).unwrap();
        assert_eq!(protein_state.get_n_term(), -2);
    }

    #[test]
    fn test_deserialization_is_validated() {
        let valid: ProteinState =
            serde_json::from_str(r#"{"sequence": "MSEQ", "n_term": 1, "c_term": 4, "oligomeric_state": 4}"#)
                .unwrap();
        assert_eq!(valid.get_oligomeric_state(), Some(4));
        let invalid = serde_json::from_str::<ProteinState>(r#"{"sequence": "MSEQ", "n_term": 1, "c_term": 5}"#);
        assert!(invalid.unwrap_err().to_string().contains("expected 5"));
    }
}
