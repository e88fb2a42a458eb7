// std imports
use std::collections::HashSet;
use std::fs::{copy, create_dir_all, read_dir, read_to_string, remove_dir_all, write};
use std::path::{Path, PathBuf};

// 3rd party imports
use anyhow::{bail, Context, Result};
use tracing::{debug, info, info_span};

// internal imports
use crate::database::catalog::{find_file_hash_matches, generate_datasets_catalog, load_catalog};
use crate::database::errors::database_error::DatabaseError;
use crate::database::id::{mint_new_dataset_id, valid_id};
use crate::entities::dataset::HDXDataSet;
use crate::verification::dataset::verify_dataset;

/// Name of the dataset document within a dataset directory
///
pub const DATASET_FILE: &str = "dataset.json";

/// Subdirectory of a dataset directory which holds the data files
///
pub const DATA_DIR: &str = "data";

/// Loads a dataset from its directory or its `dataset.json`.
/// Relative paths are resolved against the dataset directory.
///
/// # Arguments
/// * `path` - Dataset directory or document
///
pub fn load_dataset(path: &Path) -> Result<HDXDataSet> {
    let (dataset_root, document) = match path.is_file() {
        true => (
            path.parent().unwrap_or(Path::new("")).to_path_buf(),
            path.to_path_buf(),
        ),
        false => (path.to_path_buf(), path.join(DATASET_FILE)),
    };
    if !document.is_file() {
        return Err(DatabaseError::NotADataset(path.to_path_buf()).into());
    }
    let json = read_to_string(&document)
        .with_context(|| format!("Cannot read {}", document.display()))?;
    HDXDataSet::from_json(&json, Some(&dataset_root))
        .with_context(|| format!("Invalid dataset {}", document.display()))
}

/// IDs of all datasets in the database directory, sorted.
/// A dataset is a directory named by a valid ID which contains a `dataset.json`.
///
/// # Arguments
/// * `database_dir` - Database directory
///
pub fn list_datasets(database_dir: &Path) -> Result<Vec<String>> {
    if !database_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut dataset_ids = Vec::new();
    for entry in read_dir(database_dir)? {
        let path = entry?.path();
        let dataset_id = match path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => continue,
        };
        if valid_id(&dataset_id) && path.join(DATASET_FILE).is_file() {
            dataset_ids.push(dataset_id);
        }
    }
    dataset_ids.sort();
    Ok(dataset_ids)
}

/// Copies every referenced file into `target_dir/data/`, rewrites the paths relative to `target_dir`
/// and writes the dataset document.
///
/// # Arguments
/// * `dataset` - Dataset with resolvable file paths
/// * `target_dir` - Dataset directory to create
///
pub fn export_dataset(dataset: &HDXDataSet, target_dir: &Path) -> Result<()> {
    let data_dir = target_dir.join(DATA_DIR);
    create_dir_all(&data_dir)
        .with_context(|| format!("Cannot create {}", data_dir.display()))?;

    let span = info_span!("exporting dataset");
    let _span_guard = span.enter();

    for source in dataset.data_files() {
        let file_name = match source.file_name() {
            Some(file_name) => file_name,
            None => bail!("Data file {} has no file name", source.display()),
        };
        copy(&source, data_dir.join(file_name))
            .with_context(|| format!("Cannot copy {}", source.display()))?;
        debug!("Copied {}", source.display());
    }

    let mut exported = dataset.clone();
    exported.map_data_files(|path| match path.file_name() {
        Some(file_name) => Path::new(DATA_DIR).join(file_name),
        None => path.to_path_buf(),
    });
    write(target_dir.join(DATASET_FILE), exported.to_json()?)?;
    info!("Dataset exported to {}", target_dir.display());
    Ok(())
}

/// Options of [submit_dataset]
///
#[derive(Clone, Copy, Debug)]
pub struct SubmitOptions {
    /// Mint a new ID if the dataset's ID is already taken
    pub allow_mint_new_id: bool,
    /// Reject datasets whose file hash is already in the catalog
    pub check_existing: bool,
    pub verify: bool,
    /// Length of the file hash if it needs to be computed
    pub file_hash_length: usize,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            allow_mint_new_id: false,
            check_existing: true,
            verify: true,
            file_hash_length: 16,
        }
    }
}

/// Submits a dataset to a local database.
/// Returns `(true, dataset ID)` on success and `(false, reason)` if the dataset was rejected.
///
/// # Arguments
/// * `dataset` - Dataset to submit
/// * `database_dir` - Database directory
/// * `options` - Submit options
///
pub fn submit_dataset(
    dataset: &HDXDataSet,
    database_dir: &Path,
    options: SubmitOptions,
) -> Result<(bool, String)> {
    let mut submission = dataset.clone();
    if submission.get_file_hash().is_none() {
        submission.update_file_hash(options.file_hash_length)?;
    }
    if options.verify {
        verify_dataset(&submission)?;
    }

    if options.check_existing {
        if let Some(file_hash) = submission.get_file_hash() {
            let matches = find_file_hash_matches(&load_catalog(database_dir)?, file_hash);
            match matches.len() {
                0 => {}
                1 => {
                    return Ok((
                        false,
                        format!(
                            "Dataset matches an existing dataset in the database: {}",
                            matches[0]
                        ),
                    ))
                }
                _ => {
                    return Ok((
                        false,
                        format!(
                            "Dataset matches existing datasets in the database: {}",
                            matches.join(", ")
                        ),
                    ))
                }
            }
        }
    }

    let existing_ids: HashSet<String> = list_datasets(database_dir)?.into_iter().collect();
    let dataset_id = match submission.get_hdx_id() {
        Some(hdx_id) if existing_ids.contains(hdx_id) => {
            if !options.allow_mint_new_id {
                return Ok((
                    false,
                    format!("Dataset ID {} already exists in the database.", hdx_id),
                ));
            }
            mint_new_dataset_id(&existing_ids)
        }
        Some(hdx_id) => hdx_id.to_string(),
        None => mint_new_dataset_id(&existing_ids),
    };
    if !valid_id(&dataset_id) {
        return Err(DatabaseError::InvalidId(dataset_id).into());
    }
    submission.set_hdx_id(dataset_id.clone());

    export_dataset(&submission, &database_dir.join(&dataset_id))?;
    generate_datasets_catalog(database_dir)?;
    info!("Dataset {} submitted", dataset_id);
    Ok((true, dataset_id))
}

/// Dataset database in a local directory
///
pub struct LocalDatabase {
    database_dir: PathBuf,
}

impl LocalDatabase {
    /// Opens the database, the directory is created if necessary
    ///
    /// # Arguments
    /// * `database_dir` - Database directory
    ///
    pub fn new(database_dir: PathBuf) -> Result<Self> {
        create_dir_all(&database_dir)
            .with_context(|| format!("Cannot create {}", database_dir.display()))?;
        Ok(Self { database_dir })
    }

    pub fn get_database_dir(&self) -> &Path {
        &self.database_dir
    }

    pub fn get_datasets(&self) -> Result<Vec<String>> {
        list_datasets(&self.database_dir)
    }

    pub fn load_dataset(&self, dataset_id: &str) -> Result<HDXDataSet> {
        load_dataset(&self.database_dir.join(dataset_id))
    }

    /// Removes a dataset from the database
    ///
    pub fn remove_dataset(&self, dataset_id: &str) -> Result<()> {
        if !valid_id(dataset_id) {
            return Err(DatabaseError::InvalidId(dataset_id.to_string()).into());
        }
        remove_dir_all(self.database_dir.join(dataset_id))?;
        generate_datasets_catalog(&self.database_dir)?;
        Ok(())
    }
}
