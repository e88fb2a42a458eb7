/// Verification of complete datasets before they are submitted
pub mod dataset;
pub mod errors;
/// Sequence reconstruction from peptides
pub mod sequence;
/// Structured validation of user input
pub mod validation;
