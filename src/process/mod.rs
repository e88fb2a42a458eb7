/// Intensity weighted aggregation of replicate rows
pub mod aggregate;
/// Errors of the processing functions
pub mod errors;
/// Cascading filter options
pub mod filter_options;
/// Row selection by column values
pub mod filters;
/// Canonical row and column ordering, removal of empty columns
pub mod ordering;
/// Weighted statistics
pub mod stats;
/// Conversion of time and temperature units
pub mod units;
/// Merging of control tables and uptake metrics
pub mod uptake;
