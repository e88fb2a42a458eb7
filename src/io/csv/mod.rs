/// Reads delimited tables, inferring a dtype per column
pub mod reader;
/// Writes tables as CSV
pub mod writer;
