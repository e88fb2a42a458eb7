// 3rd party imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_license() -> String {
    "CC0".to_string()
}

fn default_package_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_dataset_version() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Author {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    orcid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contact_email: Option<String>,
}

impl Author {
    pub fn new(name: String, orcid: Option<String>, affiliation: Option<String>) -> Self {
        Self {
            name,
            orcid,
            affiliation,
            contact_email: None,
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_orcid(&self) -> Option<&str> {
        self.orcid.as_deref()
    }

    pub fn get_affiliation(&self) -> Option<&str> {
        self.affiliation.as_deref()
    }

    pub fn get_contact_email(&self) -> Option<&str> {
        self.contact_email.as_deref()
    }

    /// Last name, names are either given as `Lastname, Firstname` or `Firstname Lastname`
    ///
    pub fn last_name(&self) -> &str {
        match self.name.split_once(", ") {
            Some((last_name, _)) => last_name,
            None => self.name.rsplit(' ').next().unwrap_or(&self.name),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    journal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pmid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl Publication {
    pub fn get_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn get_doi(&self) -> Option<&str> {
        self.doi.as_deref()
    }

    pub fn get_year(&self) -> Option<i32> {
        self.year
    }

    pub fn with_doi(mut self, doi: String) -> Self {
        self.doi = Some(doi);
        self
    }
}

/// Repository where the raw data is published, e.g. PRIDE or Zenodo
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataRepository {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl DataRepository {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn get_identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn get_doi(&self) -> Option<&str> {
        self.doi.as_deref()
    }
}

/// Authorship, license and provenance of a dataset
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    authors: Vec<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    publication: Option<Publication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repository: Option<DataRepository>,
    #[serde(default = "default_license")]
    license: String,
    #[serde(default = "Utc::now")]
    created_date: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    modified_date: DateTime<Utc>,
    #[serde(default = "default_package_version")]
    package_version: String,
    #[serde(default = "default_dataset_version")]
    dataset_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conversion_notes: Option<String>,
}

impl DatasetMetadata {
    pub fn new(authors: Vec<Author>) -> Self {
        let now = Utc::now();
        Self {
            authors,
            publication: None,
            repository: None,
            license: default_license(),
            created_date: now,
            modified_date: now,
            package_version: default_package_version(),
            dataset_version: default_dataset_version(),
            conversion_notes: None,
        }
    }

    pub fn get_authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn get_publication(&self) -> Option<&Publication> {
        self.publication.as_ref()
    }

    pub fn get_repository(&self) -> Option<&DataRepository> {
        self.repository.as_ref()
    }

    pub fn get_license(&self) -> &str {
        &self.license
    }

    pub fn get_created_date(&self) -> &DateTime<Utc> {
        &self.created_date
    }

    pub fn get_modified_date(&self) -> &DateTime<Utc> {
        &self.modified_date
    }

    pub fn get_package_version(&self) -> &str {
        &self.package_version
    }

    pub fn get_dataset_version(&self) -> u32 {
        self.dataset_version
    }

    pub fn get_conversion_notes(&self) -> Option<&str> {
        self.conversion_notes.as_deref()
    }

    pub fn with_publication(mut self, publication: Publication) -> Self {
        self.publication = Some(publication);
        self
    }
}
