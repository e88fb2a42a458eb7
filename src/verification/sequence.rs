// 3rd party imports
use polars::prelude::DataFrame;

// internal imports
use crate::dataframe::frame::{i64_values, str_values};
use crate::verification::errors::VerificationError;

/// Placeholder for residues not covered by any peptide
///
pub const UNKNOWN_RESIDUE: char = 'X';

/// Rows of (start, end, sequence), rows with missing values are skipped
///
fn peptide_rows(df: &DataFrame) -> Result<Vec<(i64, i64, String)>, VerificationError> {
    let starts = i64_values(df, "start")?;
    let ends = i64_values(df, "end")?;
    let sequences = str_values(df, "sequence")?;
    Ok(starts
        .into_iter()
        .zip(ends)
        .zip(sequences)
        .filter_map(|((start, end), sequence)| Some((start?, end?, sequence?)))
        .collect())
}

/// Writes the peptide sequences into the known sequence at their positions.
/// Later peptides overwrite earlier ones.
///
/// # Arguments
/// * `df` - Peptides with `start`, `end` and `sequence`
/// * `known_sequence` - Starting sequence, may consist of placeholders
/// * `n_term` - Residue number of the first residue of `known_sequence`, can be negative for purification tags
///
pub fn reconstruct_sequence(
    df: &DataFrame,
    known_sequence: &str,
    n_term: i64,
) -> Result<String, VerificationError> {
    let mut reconstructed: Vec<char> = known_sequence.chars().collect();
    for (start, end, sequence) in peptide_rows(df)? {
        if end - start + 1 != sequence.chars().count() as i64 {
            return Err(VerificationError::PeptideLength {
                start,
                end,
                sequence,
            });
        }
        let offset = start - n_term;
        if offset < 0 || end - n_term >= reconstructed.len() as i64 {
            return Err(VerificationError::OutOfRange {
                start,
                end,
                n_term,
                length: reconstructed.len(),
            });
        }
        for (idx, residue) in sequence.chars().enumerate() {
            reconstructed[offset as usize + idx] = residue;
        }
    }
    Ok(reconstructed.into_iter().collect())
}

/// Sequence covered by the peptides from the first start to the last end.
/// Uncovered residues are [UNKNOWN_RESIDUE]. Returns the residue number of the first residue and the sequence.
///
/// # Arguments
/// * `df` - Peptides with `start`, `end` and `sequence`
///
pub fn covered_sequence(df: &DataFrame) -> Result<Option<(i64, String)>, VerificationError> {
    let rows = peptide_rows(df)?;
    let first = rows.iter().map(|(start, _, _)| *start).min();
    let last = rows.iter().map(|(_, end, _)| *end).max();
    match (first, last) {
        (Some(first), Some(last)) => {
            let placeholder: String =
                std::iter::repeat(UNKNOWN_RESIDUE).take((last - first + 1) as usize).collect();
            Ok(Some((first, reconstruct_sequence(df, &placeholder, first)?)))
        }
        _ => Ok(None),
    }
}

/// Compares the peptide sequences with the protein sequence.
/// Returns every mismatch as (residue number, expected, found).
///
/// # Arguments
/// * `df` - Peptides with `start`, `end` and `sequence`
/// * `known_sequence` - Protein sequence
/// * `n_term` - Residue number of the first residue
///
pub fn verify_sequence(
    df: &DataFrame,
    known_sequence: &str,
    n_term: i64,
) -> Result<Vec<(i64, char, char)>, VerificationError> {
    let reconstructed = reconstruct_sequence(df, known_sequence, n_term)?;
    Ok(known_sequence
        .chars()
        .zip(reconstructed.chars())
        .enumerate()
        .filter(|(_, (expected, found))| expected != found)
        .map(|(idx, (expected, found))| (n_term + idx as i64, expected, found))
        .collect())
}

#[cfg(test)]
mod test {
    // 3rd party imports
    use polars::prelude::*;

    // internal imports
    use super::*;

    fn peptides(rows: &[(i64, i64, &str)]) -> DataFrame {
        DataFrame::new(vec![
            Series::new("start", rows.iter().map(|row| row.0).collect::<Vec<i64>>()),
            Series::new("end", rows.iter().map(|row| row.1).collect::<Vec<i64>>()),
            Series::new("sequence", rows.iter().map(|row| row.2).collect::<Vec<&str>>()),
        ])
        .unwrap()
    }

    #[test]
    fn test_reconstruct_with_placeholders() {
        let df = peptides(&[(2, 4, "SEQ"), (7, 8, "TE")]);
        assert_eq!(
            reconstruct_sequence(&df, "XXXXXXXXXX", 1).unwrap(),
            "XSEQXXTEXX"
        );
        assert_eq!(
            covered_sequence(&df).unwrap(),
            Some((2, "SEQXXTE".to_string()))
        );
    }

    #[test]
    fn test_negative_n_term() {
        let df = peptides(&[(-1, 1, "HMS")]);
        assert_eq!(reconstruct_sequence(&df, "HHHMSEQ", -3).unwrap(), "HHHMSEQ");
    }

    #[test]
    fn test_verify_sequence() {
        let df = peptides(&[(1, 4, "MSEQ"), (5, 7, "NAT")]);
        assert_eq!(
            verify_sequence(&df, "MSEQNNT", 1).unwrap(),
            vec![(6, 'N', 'A')]
        );
    }

    #[test]
    fn test_length_mismatch() {
        let df = peptides(&[(1, 5, "MSEQ")]);
        let err = reconstruct_sequence(&df, "MSEQNNT", 1).unwrap_err();
        assert_eq!(err.to_string(), "Length mismatch at 1:5 with sequence MSEQ");
    }

    #[test]
    fn test_out_of_range() {
        let df = peptides(&[(6, 9, "NTEM")]);
        assert!(matches!(
            verify_sequence(&df, "MSEQNNT", 1),
            Err(VerificationError::OutOfRange { .. })
        ));
    }
}
