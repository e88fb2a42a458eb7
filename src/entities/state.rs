// std imports
use std::collections::HashSet;

// 3rd party imports
use serde::{Deserialize, Serialize};

// internal imports
use crate::entities::errors::ValidationError;
use crate::entities::peptides::{DeuterationType, Peptides};
use crate::entities::protein::ProteinState;

/// Experimental condition of the protein with its peptide sets.
/// A state contains at most one peptide set per [DeuterationType].
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedState")]
pub struct State {
    name: String,
    description: String,
    peptides: Vec<Peptides>,
    protein_state: ProteinState,
}

impl State {
    /// Creates a new state
    ///
    /// # Arguments
    /// * `name` - State name, unique within a dataset
    /// * `description` - Free text description
    /// * `peptides` - Peptide sets, one per deuteration type
    /// * `protein_state` - Protein of this state
    ///
    pub fn new(
        name: String,
        description: String,
        peptides: Vec<Peptides>,
        protein_state: ProteinState,
    ) -> Result<Self, ValidationError> {
        let mut roles = HashSet::new();
        for peptide_set in peptides.iter() {
            if !roles.insert(peptide_set.get_deuteration_type()) {
                return Err(ValidationError::DuplicatePeptideRole {
                    state: name,
                    role: peptide_set.get_deuteration_type().to_string(),
                });
            }
        }
        Ok(Self {
            name,
            description,
            peptides,
            protein_state,
        })
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_description(&self) -> &str {
        &self.description
    }

    pub fn get_protein_state(&self) -> &ProteinState {
        &self.protein_state
    }

    /// Returns all peptide sets in stored order
    ///
    pub fn get_peptide_sets(&self) -> &[Peptides] {
        &self.peptides
    }

    pub(crate) fn get_peptide_sets_mut(&mut self) -> &mut [Peptides] {
        &mut self.peptides
    }

    /// Returns the peptide set of the given role
    ///
    /// # Arguments
    /// * `deuteration_type` - Role of the peptide set
    ///
    pub fn get_peptides(&self, deuteration_type: DeuterationType) -> Option<&Peptides> {
        self.peptides
            .iter()
            .find(|peptides| peptides.get_deuteration_type() == deuteration_type)
    }

    /// Positional view on the peptide sets
    ///
    /// # Arguments
    /// * `index` - Index in stored order
    ///
    pub fn peptides_by_index(&self, index: usize) -> Option<&Peptides> {
        self.peptides.get(index)
    }
}

#[derive(Deserialize)]
struct UncheckedState {
    name: String,
    #[serde(default)]
    description: String,
    peptides: Vec<Peptides>,
    protein_state: ProteinState,
}

impl TryFrom<UncheckedState> for State {
    type Error = ValidationError;

    fn try_from(unchecked: UncheckedState) -> Result<Self, Self::Error> {
        State::new(
            unchecked.name,
            unchecked.description,
            unchecked.peptides,
            unchecked.protein_state,
        )
    }
}

#[cfg(test)]
mod test {
    // std imports
    use std::path::PathBuf;

    // internal imports
    use super::*;
    use crate::formats::peptide_format::PeptideFormat;
    use crate::process::filters::Filters;

    fn peptides(deuteration_type: DeuterationType) -> Peptides {
        Peptides::new(
            PathBuf::from("test_files/dynamx_v3_state.csv"),
            PeptideFormat::DynamXv3State,
            deuteration_type,
            Filters::new(),
        )
    }

    fn protein_state() -> ProteinState {
        ProteinState::new("MSEQ".to_string(), 1, 4).unwrap()
    }

    #[test]
    fn test_role_and_index_access() {
        let state = State::new(
            "apo".to_string(),
            String::new(),
            vec![
                peptides(DeuterationType::PartiallyDeuterated),
                peptides(DeuterationType::FullyDeuterated),
            ],
            protein_state(),
        )
        .unwrap();
        assert_eq!(
            state.get_peptides(DeuterationType::FullyDeuterated),
            state.peptides_by_index(1)
        );
        assert!(state.get_peptides(DeuterationType::NonDeuterated).is_none());
        assert!(state.peptides_by_index(2).is_none());
    }

    #[test]
    fn test_duplicate_role() {
        let err = State::new(
            "apo".to_string(),
            String::new(),
            vec![
                peptides(DeuterationType::PartiallyDeuterated),
                peptides(DeuterationType::PartiallyDeuterated),
            ],
            protein_state(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicatePeptideRole {
                state: "apo".to_string(),
                role: "partially_deuterated".to_string()
            }
        );
    }
}
