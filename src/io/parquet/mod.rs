/// Reads Parquet files
pub mod reader;
/// Writes Parquet files
pub mod writer;
