/// Errors raised by dataframe operations
pub mod errors;
/// Column access, ordering and uniqueness helpers on top of polars dataframes
pub mod frame;
/// Conversion of cell values from and to text and JSON
pub mod value;
