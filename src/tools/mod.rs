// Functions for formatting outputs
pub mod display;
/// Content hashing of dataset files
pub mod hash;
/// Peptide coverage and redundancy
pub mod peptides;
