// # Create absolute path to readme ti increase compatible for different build targets
//  https://gist.github.com/JakeHartnell/2c1fa387f185f5dc46c9429470a2e2be
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Readme.md"))]

// 3rd party imports
#[allow(unused_imports)]
#[macro_use]
extern crate lazy_static;

/// LRU cache of loaded tables for the web server
pub mod cache;
/// Chemistry related functions and constants, e.g. proton mass
pub mod chemistry;
/// Local and remote dataset databases
pub mod database;
/// Minimal column ordered table used throughout the pipeline
pub mod dataframe;
/// Contains different entities, e.g. datasets, states, peptides, etc.
pub mod entities;
/// Known peptide table formats and their conversion
pub mod formats;
/// Input and output functions
pub mod io;
/// Filtering, aggregation and uptake computations
pub mod process;
/// Contains handy functions
pub mod tools;
/// Verification and validation of datasets
pub mod verification;
/// Web API for preview and validation of uploads
pub mod web;
