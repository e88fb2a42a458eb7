// std imports
use std::fs::{create_dir_all, remove_dir_all, write};
use std::path::{Path, PathBuf};

// 3rd party imports
use anyhow::Result;
use indicatif::ProgressStyle;
use tracing::{debug, info, info_span, Instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

// internal imports
use crate::database::catalog::{read_catalog, CatalogRecord, CATALOG_FILE};
use crate::database::errors::database_error::DatabaseError;
use crate::database::local::{LocalDatabase, DATASET_FILE};
use crate::entities::dataset::HDXDataSet;

/// Joins a relative path onto the base URL
///
fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Local database which downloads datasets from a remote database
///
pub struct RemoteDatabase {
    local: LocalDatabase,
    remote_url: String,
    client: reqwest::Client,
    catalog: Vec<CatalogRecord>,
}

impl RemoteDatabase {
    /// Opens the local database and fetches the remote catalog
    ///
    /// # Arguments
    /// * `database_dir` - Local database directory
    /// * `remote_url` - Base URL of the remote database
    ///
    pub async fn new(database_dir: PathBuf, remote_url: String) -> Result<Self> {
        let local = LocalDatabase::new(database_dir)?;
        let client = reqwest::Client::new();
        let catalog_url = join_url(&remote_url, CATALOG_FILE);
        let response = client.get(&catalog_url).send().await?;
        if !response.status().is_success() {
            return Err(DatabaseError::Fetch {
                url: catalog_url,
                status: response.status().as_u16(),
            }
            .into());
        }
        let catalog = read_catalog(response.bytes().await?.as_ref())?;
        debug!("Remote catalog with {} datasets", catalog.len());
        Ok(Self {
            local,
            remote_url,
            client,
            catalog,
        })
    }

    pub fn get_local(&self) -> &LocalDatabase {
        &self.local
    }

    pub fn get_remote_url(&self) -> &str {
        &self.remote_url
    }

    pub fn get_catalog(&self) -> &[CatalogRecord] {
        &self.catalog
    }

    /// IDs of the datasets available remotely
    ///
    pub fn remote_datasets(&self) -> Vec<&str> {
        self.catalog.iter().map(|record| record.id.as_str()).collect()
    }

    /// Downloads a dataset into the local database.
    /// Returns `(false, reason)` if the dataset is unknown, invalid, already present or a download fails.
    /// Partial downloads are removed.
    ///
    /// # Arguments
    /// * `dataset_id` - ID of the dataset
    ///
    pub async fn fetch_dataset(&self, dataset_id: &str) -> Result<(bool, String)> {
        if !self.remote_datasets().contains(&dataset_id) {
            return Ok((
                false,
                format!("Dataset ID {:?} not found in remote database.", dataset_id),
            ));
        }

        let document_url = join_url(&self.remote_url, &format!("{}/{}", dataset_id, DATASET_FILE));
        let document = self.client.get(&document_url).send().await?.text().await?;
        let dataset = match HDXDataSet::from_json(&document, None) {
            Ok(dataset) => dataset,
            Err(err) => return Ok((false, format!("Error validating dataset JSON: {}", err))),
        };

        let output_dir = self.local.get_database_dir().join(dataset_id);
        if output_dir.exists() {
            return Ok((
                false,
                "Dataset already exists in the local database.".to_string(),
            ));
        }
        create_dir_all(&output_dir)?;

        let mut files = dataset.data_files();
        files.push(PathBuf::from(DATASET_FILE));

        let span = info_span!("fetching dataset");
        span.pb_set_style(&ProgressStyle::default_bar());
        span.pb_set_length(files.len() as u64);
        let result = self
            .download_files(dataset_id, &files, &output_dir)
            .instrument(span)
            .await;
        match result {
            Ok(None) => {
                info!("Dataset {} fetched", dataset_id);
                Ok((true, String::new()))
            }
            Ok(Some(message)) => {
                remove_dir_all(&output_dir)?;
                Ok((false, message))
            }
            Err(err) => {
                remove_dir_all(&output_dir)?;
                Err(err)
            }
        }
    }

    /// Downloads the files of a dataset. Returns a message if a file is not available.
    ///
    async fn download_files(
        &self,
        dataset_id: &str,
        files: &[PathBuf],
        output_dir: &Path,
    ) -> Result<Option<String>> {
        for file in files {
            let relative = file.to_string_lossy().replace('\\', "/");
            let url = join_url(&self.remote_url, &format!("{}/{}", dataset_id, relative));
            let response = self.client.get(&url).send().await?;
            if !response.status().is_success() {
                return Ok(Some(format!(
                    "Failed to download {}: {}",
                    relative,
                    response.status().as_u16()
                )));
            }
            let target = output_dir.join(file);
            if let Some(parent) = target.parent() {
                create_dir_all(parent)?;
            }
            write(&target, response.bytes().await?)?;
            debug!("Downloaded {}", relative);
            tracing::Span::current().pb_inc(1);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod test {
    // std imports
    use std::path::Path;

    // 3rd party imports
    use axum::extract::Path as UrlPath;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use serial_test::serial;
    use tempfile::tempdir;

    // internal imports
    use super::*;
    use crate::database::local::{load_dataset, submit_dataset, SubmitOptions};

    /// Serves the files of `root` on a random local port and returns the base URL
    ///
    async fn serve_directory(root: PathBuf) -> String {
        let app = Router::new().route(
            "/*path",
            get(move |UrlPath(path): UrlPath<String>| {
                let root = root.clone();
                async move {
                    match std::fs::read(root.join(path)) {
                        Ok(content) => Ok(content),
                        Err(_) => Err(StatusCode::NOT_FOUND),
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", address)
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://host/db/", "HDX_1/dataset.json"),
            "http://host/db/HDX_1/dataset.json"
        );
        assert_eq!(join_url("http://host/db", "/x.csv"), "http://host/db/x.csv");
    }

    #[tokio::test]
    #[serial]
    async fn test_fetch_dataset() {
        let remote_dir = tempdir().unwrap();
        let dataset = load_dataset(Path::new("test_files/dataset")).unwrap();
        let (_, dataset_id) =
            submit_dataset(&dataset, remote_dir.path(), SubmitOptions::default()).unwrap();
        let remote_url = serve_directory(remote_dir.path().to_path_buf()).await;

        let local_dir = tempdir().unwrap();
        let database = RemoteDatabase::new(local_dir.path().to_path_buf(), remote_url)
            .await
            .unwrap();
        assert_eq!(database.remote_datasets(), vec![dataset_id.as_str()]);

        assert_eq!(
            database.fetch_dataset(&dataset_id).await.unwrap(),
            (true, String::new())
        );
        let fetched = database.get_local().load_dataset(&dataset_id).unwrap();
        assert!(fetched.validate_file_integrity().unwrap());

        assert_eq!(
            database.fetch_dataset(&dataset_id).await.unwrap(),
            (false, "Dataset already exists in the local database.".to_string())
        );
        assert_eq!(
            database.fetch_dataset("HDX_00000000").await.unwrap(),
            (
                false,
                "Dataset ID \"HDX_00000000\" not found in remote database.".to_string()
            )
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_partial_download_is_removed() {
        let remote_dir = tempdir().unwrap();
        let dataset = load_dataset(Path::new("test_files/dataset")).unwrap();
        let (_, dataset_id) =
            submit_dataset(&dataset, remote_dir.path(), SubmitOptions::default()).unwrap();
        std::fs::remove_file(remote_dir.path().join(&dataset_id).join("data/secb_structure.pdb"))
            .unwrap();
        let remote_url = serve_directory(remote_dir.path().to_path_buf()).await;

        let local_dir = tempdir().unwrap();
        let database = RemoteDatabase::new(local_dir.path().to_path_buf(), remote_url)
            .await
            .unwrap();
        assert_eq!(
            database.fetch_dataset(&dataset_id).await.unwrap(),
            (
                false,
                "Failed to download data/secb_structure.pdb: 404".to_string()
            )
        );
        assert!(!local_dir.path().join(&dataset_id).exists());
    }
}
