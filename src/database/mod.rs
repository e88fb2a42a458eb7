/// Catalog of the datasets in a database directory
pub mod catalog;
/// Errors when working with the database
pub mod errors;
/// Minting and validation of dataset IDs
pub mod id;
/// Database in a local directory
pub mod local;
/// Download of datasets from a remote database
pub mod remote;
