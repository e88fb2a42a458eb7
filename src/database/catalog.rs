// std imports
use std::io::Read;
use std::path::Path;

// 3rd party imports
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

// internal imports
use crate::database::local::{list_datasets, load_dataset};

/// Name of the catalog file in the database directory
///
pub const CATALOG_FILE: &str = "datasets_catalog.csv";

/// Row of the dataset catalog
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub doi: Option<String>,
    pub created_date: Option<String>,
    pub uniprot_accession_number: Option<String>,
    pub file_hash: Option<String>,
}

/// Builds the catalog of all datasets in the database directory and writes it to [CATALOG_FILE].
///
/// # Arguments
/// * `database_dir` - Database directory
///
pub fn generate_datasets_catalog(database_dir: &Path) -> Result<Vec<CatalogRecord>> {
    let mut records = Vec::new();
    for dataset_id in list_datasets(database_dir)? {
        let dataset = load_dataset(&database_dir.join(&dataset_id))?;
        let metadata = dataset.get_metadata();
        records.push(CatalogRecord {
            id: dataset_id,
            description: dataset.get_description().map(String::from),
            author: metadata
                .and_then(|metadata| metadata.get_authors().first())
                .map(|author| author.last_name().to_string()),
            doi: metadata
                .and_then(|metadata| metadata.get_publication())
                .and_then(|publication| publication.get_doi())
                .map(String::from),
            created_date: metadata.map(|metadata| metadata.get_created_date().to_rfc3339()),
            uniprot_accession_number: dataset
                .get_protein_identifiers()
                .get_uniprot_accession_number()
                .map(String::from),
            file_hash: dataset.get_file_hash().map(String::from),
        });
    }

    let catalog_path = database_dir.join(CATALOG_FILE);
    let mut writer = csv::Writer::from_path(&catalog_path)
        .with_context(|| format!("Cannot write {}", catalog_path.display()))?;
    for record in records.iter() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    debug!("Catalog with {} datasets written", records.len());
    Ok(records)
}

/// Reads a catalog
///
/// # Arguments
/// * `source` - Catalog CSV
///
pub fn read_catalog<R: Read>(source: R) -> Result<Vec<CatalogRecord>> {
    let mut reader = csv::Reader::from_reader(source);
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Reads the catalog of the database directory, an empty catalog if none exists
///
/// # Arguments
/// * `database_dir` - Database directory
///
pub fn load_catalog(database_dir: &Path) -> Result<Vec<CatalogRecord>> {
    let catalog_path = database_dir.join(CATALOG_FILE);
    if !catalog_path.is_file() {
        return Ok(Vec::new());
    }
    read_catalog(
        std::fs::File::open(&catalog_path)
            .with_context(|| format!("Cannot read {}", catalog_path.display()))?,
    )
}

/// IDs of catalog entries with the same file hash.
/// Hashes of different lengths match if one is a prefix of the other.
///
/// # Arguments
/// * `catalog` - Catalog records
/// * `file_hash` - File hash of the new dataset
///
pub fn find_file_hash_matches(catalog: &[CatalogRecord], file_hash: &str) -> Vec<String> {
    catalog
        .iter()
        .filter(|record| match record.file_hash.as_deref() {
            Some(known) if !known.is_empty() && !file_hash.is_empty() => {
                known.starts_with(file_hash) || file_hash.starts_with(known)
            }
            _ => false,
        })
        .map(|record| record.id.clone())
        .collect()
}
