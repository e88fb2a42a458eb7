// std imports
use std::collections::HashSet;

lazy_static! {
    /// Residues without backbone amide hydrogen, they do not exchange.
    pub static ref NON_EXCHANGING_RESIDUES: HashSet<char> = HashSet::from(['P']);
}

/// Maximum number of exchangeable hydrogens of a peptide, i.e. the number of non-proline residues.
///
/// # Arguments
/// * `sequence` - Peptide sequence in one letter code
///
pub fn max_uptake(sequence: &str) -> usize {
    sequence
        .chars()
        .filter(|code| !NON_EXCHANGING_RESIDUES.contains(&code.to_ascii_uppercase()))
        .count()
}
