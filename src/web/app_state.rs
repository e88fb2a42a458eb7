// std imports
use std::sync::Arc;

// internal imports
use crate::cache::dataframe_cache::DataframeCache;
use crate::entities::configuration::Configuration;
use crate::web::file_store::FileStore;

pub struct AppState {
    configuration: Arc<Configuration>,
    dataframe_cache: Arc<DataframeCache>,
    file_store: Arc<dyn FileStore>,
}

impl AppState {
    pub fn new(configuration: Configuration, file_store: Arc<dyn FileStore>) -> Self {
        Self {
            dataframe_cache: Arc::new(DataframeCache::new(configuration.get_cache_max_size())),
            configuration: Arc::new(configuration),
            file_store,
        }
    }

    /// Returns a new ARC of the configuration
    ///
    pub fn get_configuration(&self) -> Arc<Configuration> {
        self.configuration.clone()
    }

    /// Returns a reference to the dataframe cache
    ///
    pub fn get_dataframe_cache_as_ref(&self) -> &DataframeCache {
        self.dataframe_cache.as_ref()
    }

    /// Returns a reference to the file store
    ///
    pub fn get_file_store_as_ref(&self) -> &dyn FileStore {
        self.file_store.as_ref()
    }
}
