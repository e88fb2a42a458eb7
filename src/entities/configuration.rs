// std imports
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

// 3rd party imports
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// internal imports
use crate::process::uptake::FailurePolicy;

/// Default remote database, a plain file server with one directory per dataset
///
pub const DEFAULT_REMOTE_URL: &str =
    "https://raw.githubusercontent.com/Jhsmit/HDXMS-database/master/datasets/";

fn default_cache_max_size() -> usize {
    50
}

fn default_file_hash_length() -> usize {
    16
}

fn default_upload_root() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_database_dir() -> PathBuf {
    PathBuf::from("hdxms_datasets_db")
}

fn default_remote_url() -> String {
    DEFAULT_REMOTE_URL.to_string()
}

/// Keeps the settings passed to the pipeline, cache, database and web server.
/// Every field has a default, so a JSON file only needs to contain the values which differ.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default = "default_cache_max_size")]
    cache_max_size: usize,
    #[serde(default = "default_file_hash_length")]
    file_hash_length: usize,
    #[serde(default)]
    nd_exposure: f64,
    #[serde(default)]
    failure_policy: FailurePolicy,
    #[serde(default = "default_upload_root")]
    upload_root: PathBuf,
    #[serde(default = "default_database_dir")]
    database_dir: PathBuf,
    #[serde(default = "default_remote_url")]
    remote_url: String,
}

impl Configuration {
    pub fn new(
        cache_max_size: usize,
        file_hash_length: usize,
        nd_exposure: f64,
        failure_policy: FailurePolicy,
        upload_root: PathBuf,
        database_dir: PathBuf,
        remote_url: String,
    ) -> Self {
        Self {
            cache_max_size,
            file_hash_length,
            nd_exposure,
            failure_policy,
            upload_root,
            database_dir,
            remote_url,
        }
    }

    /// Reads the configuration from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to the JSON file
    ///
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = read_to_string(path)
            .with_context(|| format!("Cannot read configuration {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration {}", path.display()))
    }

    /// Returns the maximum number of tables kept by the dataframe cache
    ///
    pub fn get_cache_max_size(&self) -> usize {
        self.cache_max_size
    }

    /// Returns the number of hex characters of the stored dataset file hash
    ///
    pub fn get_file_hash_length(&self) -> usize {
        self.file_hash_length
    }

    /// Returns the exposure of non-deuterated rows in DynamX cluster data
    ///
    pub fn get_nd_exposure(&self) -> f64 {
        self.nd_exposure
    }

    pub fn get_failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn get_upload_root(&self) -> &Path {
        &self.upload_root
    }

    pub fn get_database_dir(&self) -> &Path {
        &self.database_dir
    }

    pub fn get_remote_url(&self) -> &str {
        &self.remote_url
    }

    pub fn with_cache_max_size(mut self, cache_max_size: usize) -> Self {
        self.cache_max_size = cache_max_size;
        self
    }

    pub fn with_upload_root(mut self, upload_root: PathBuf) -> Self {
        self.upload_root = upload_root;
        self
    }

    pub fn with_database_dir(mut self, database_dir: PathBuf) -> Self {
        self.database_dir = database_dir;
        self
    }

    pub fn with_remote_url(mut self, remote_url: String) -> Self {
        self.remote_url = remote_url;
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            cache_max_size: default_cache_max_size(),
            file_hash_length: default_file_hash_length(),
            nd_exposure: 0.0,
            failure_policy: FailurePolicy::default(),
            upload_root: default_upload_root(),
            database_dir: default_database_dir(),
            remote_url: default_remote_url(),
        }
    }
}
