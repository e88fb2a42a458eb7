/// Conversion of vendor tables into the canonical peptide table
pub mod convert;
/// Errors raised while identifying or converting formats
pub mod errors;
/// Identification of a format from the columns of a table
pub mod identify;
/// Supported formats with their column layout
pub mod peptide_format;
