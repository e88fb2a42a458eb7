// std imports
use std::path::PathBuf;

// 3rd party imports
use anyhow::Result;
use tracing::debug;

// internal imports
use crate::entities::dataset::HDXDataSet;
use crate::entities::peptides::LoadOptions;
use crate::verification::errors::VerificationError;
use crate::verification::sequence::verify_sequence;

/// Checks that the peptide sequences of every state match the protein sequence of the state
///
/// # Arguments
/// * `dataset` - Dataset to check
///
pub fn verify_peptides(dataset: &HDXDataSet) -> Result<()> {
    for state in dataset.get_states() {
        let protein_state = state.get_protein_state();
        for (index, peptides) in state.get_peptide_sets().iter().enumerate() {
            let table = peptides.load(&LoadOptions::default())?;
            let mismatches = verify_sequence(
                &table,
                protein_state.get_sequence(),
                protein_state.get_n_term(),
            )?;
            if !mismatches.is_empty() {
                return Err(VerificationError::SequenceMismatch {
                    state: state.get_name().to_string(),
                    index,
                    mismatches,
                }
                .into());
            }
            debug!("State {}, peptides[{}] match", state.get_name(), index);
        }
    }
    Ok(())
}

/// Returns every referenced file which does not exist
///
/// # Arguments
/// * `dataset` - Dataset to check
///
pub fn missing_data_files(dataset: &HDXDataSet) -> Vec<PathBuf> {
    dataset
        .data_files()
        .into_iter()
        .filter(|path| !path.exists())
        .collect()
}

/// Verifies sequences, the existence of all data files and that the file hash is set.
///
/// # Arguments
/// * `dataset` - Dataset to check
///
pub fn verify_dataset(dataset: &HDXDataSet) -> Result<()> {
    let missing = missing_data_files(dataset);
    if !missing.is_empty() {
        return Err(VerificationError::MissingDataFiles(missing).into());
    }
    verify_peptides(dataset)?;
    if dataset.get_file_hash().is_none() {
        return Err(VerificationError::MissingFileHash.into());
    }
    Ok(())
}

#[cfg(test)]
mod test {
    // std imports
    use std::fs::read_to_string;
    use std::path::Path;

    // internal imports
    use super::*;

    fn dataset() -> HDXDataSet {
        let root = Path::new("test_files/dataset");
        HDXDataSet::from_json(&read_to_string(root.join("dataset.json")).unwrap(), Some(root))
            .unwrap()
    }

    #[test]
    fn test_verify_dataset() {
        let mut dataset = dataset();
        verify_peptides(&dataset).unwrap();
        assert!(missing_data_files(&dataset).is_empty());
        dataset.update_file_hash(16).unwrap();
        verify_dataset(&dataset).unwrap();
    }

    #[test]
    fn test_missing_file_hash() {
        let dataset = dataset();
        let err = verify_dataset(&dataset).unwrap_err();
        assert_eq!(err.to_string(), "Dataset file hash is not set");
    }

    #[test]
    fn test_missing_data_files() {
        let mut dataset = dataset();
        dataset.map_data_files(|path| path.with_file_name("missing.csv"));
        assert_eq!(
            missing_data_files(&dataset),
            vec![PathBuf::from("test_files/dataset/data/missing.csv")]
        );
        assert!(verify_dataset(&dataset)
            .unwrap_err()
            .to_string()
            .starts_with("Missing datafiles"));
    }
}
