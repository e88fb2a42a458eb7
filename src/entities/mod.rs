// Struct which keeps configuration parameters
pub mod configuration;
/// Dataset document with states, structure and metadata
pub mod dataset;
pub mod errors;
/// Authors, publication and other dataset metadata
pub mod metadata;
/// Peptide sets referencing a data file
pub mod peptides;
/// Protein state and identifiers
pub mod protein;
/// Experimental state, a protein state with its peptide sets
pub mod state;
/// Reference to a structure file
pub mod structure;
