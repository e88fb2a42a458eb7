// std imports
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// 3rd party imports
use indexmap::IndexMap;
use polars::prelude::DataFrame;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

// internal imports
use crate::cache::errors::CacheLoadError;
use crate::io::load_data;

/// (session ID, file ID)
///
pub type CacheKey = (String, String);

type LoadResult = Result<Arc<DataFrame>, CacheLoadError>;

/// Statistics of the cache
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub sessions: usize,
    pub loading: usize,
    /// Number of physical loads so far
    pub loads: usize,
}

#[derive(Default)]
struct CacheState {
    /// Least recently used entry first
    entries: IndexMap<CacheKey, Arc<DataFrame>>,
    loading: HashMap<CacheKey, watch::Receiver<Option<LoadResult>>>,
    loads: usize,
}

impl CacheState {
    /// Marks the entry as most recently used and returns it
    ///
    fn touch(&mut self, key: &CacheKey) -> Option<Arc<DataFrame>> {
        let idx = self.entries.get_index_of(key)?;
        let last = self.entries.len() - 1;
        self.entries.move_index(idx, last);
        self.entries.get_index(last).map(|(_, df)| df.clone())
    }
}

enum Lookup<'a> {
    Hit(Arc<DataFrame>),
    Wait(watch::Receiver<Option<LoadResult>>),
    Load(LoadingGuard<'a>),
}

/// Marks a key as loading. The marker is removed when the load is finished or, if the
/// loading future is cancelled, when the guard is dropped. Waiters are woken up in either case.
///
struct LoadingGuard<'a> {
    cache: &'a DataframeCache,
    key: CacheKey,
    sender: watch::Sender<Option<LoadResult>>,
    /// False once the marker was removed by [LoadingGuard::finish], the key may be loading again by then
    armed: bool,
}

impl LoadingGuard<'_> {
    /// Stores a successful load, clears the loading marker and hands the result to the waiters
    ///
    fn finish(&mut self, result: LoadResult) {
        {
            let mut state = self.cache.state();
            state.loads += 1;
            if let Ok(df) = result.as_ref() {
                state.entries.insert(self.key.clone(), df.clone());
                while state.entries.len() > self.cache.max_size {
                    if let Some((evicted, _)) = state.entries.shift_remove_index(0) {
                        info!(
                            "LRU eviction: removed {}:{} (cache size: {})",
                            evicted.0,
                            evicted.1,
                            state.entries.len()
                        );
                    }
                }
            }
            state.loading.remove(&self.key);
            self.armed = false;
        }
        self.sender.send_replace(Some(result));
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.cache.state().loading.remove(&self.key);
        }
    }
}

/// In-memory LRU cache of raw dataframes keyed by (session ID, file ID).
/// Concurrent requests for the same key result in a single load.
/// Parsing runs on the blocking thread pool, the bookkeeping lock is never held across an await.
///
pub struct DataframeCache {
    max_size: usize,
    state: Mutex<CacheState>,
}

impl DataframeCache {
    /// Creates a new cache
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of cached dataframes
    ///
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn get_max_size(&self) -> usize {
        self.max_size
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, key: &CacheKey) -> Lookup<'_> {
        let mut state = self.state();
        if let Some(df) = state.touch(key) {
            return Lookup::Hit(df);
        }
        if let Some(receiver) = state.loading.get(key) {
            return Lookup::Wait(receiver.clone());
        }
        let (sender, receiver) = watch::channel(None);
        state.loading.insert(key.clone(), receiver);
        Lookup::Load(LoadingGuard {
            cache: self,
            key: key.clone(),
            sender,
            armed: true,
        })
    }

    /// Returns the cached dataframe or loads it from `path`.
    /// Hits and waiters of a concurrent load both count as use of the entry.
    ///
    /// # Arguments
    /// * `session_id` - Session ID
    /// * `file_id` - File ID
    /// * `path` - Path of the file, only read on a cache miss
    ///
    pub async fn get(&self, session_id: &str, file_id: &str, path: &Path) -> LoadResult {
        let key: CacheKey = (session_id.to_string(), file_id.to_string());
        loop {
            match self.lookup(&key) {
                Lookup::Hit(df) => {
                    debug!("Cache hit {}:{}", session_id, file_id);
                    return Ok(df);
                }
                Lookup::Wait(mut receiver) => {
                    debug!("Waiting for load of {}:{}", session_id, file_id);
                    let result = match receiver.wait_for(Option::is_some).await {
                        Ok(result) => result.as_ref().cloned(),
                        Err(_) => None,
                    };
                    match result {
                        Some(Ok(df)) => {
                            self.state().touch(&key);
                            return Ok(df);
                        }
                        Some(Err(err)) => return Err(err),
                        // loader was cancelled, check the cache again
                        None => {}
                    }
                }
                Lookup::Load(mut guard) => {
                    debug!("Cache miss {}:{}, loading {}", session_id, file_id, path.display());
                    let result = Self::load(path).await;
                    if let Err(err) = result.as_ref() {
                        warn!("{}", err);
                    }
                    guard.finish(result.clone());
                    return result;
                }
            }
        }
    }

    async fn load(path: &Path) -> LoadResult {
        let path_buf = path.to_path_buf();
        let into_error = |message: String| CacheLoadError {
            path: path.display().to_string(),
            message,
        };
        match tokio::task::spawn_blocking(move || load_data(&path_buf)).await {
            Ok(Ok(df)) => Ok(Arc::new(df)),
            Ok(Err(err)) => Err(into_error(format!("{:#}", err))),
            Err(err) => Err(into_error(err.to_string())),
        }
    }

    /// Removes the entry of a file or, without file ID, all entries of the session
    ///
    /// # Arguments
    /// * `session_id` - Session ID
    /// * `file_id` - File ID
    ///
    pub fn invalidate(&self, session_id: &str, file_id: Option<&str>) {
        self.state().entries.retain(|(session, file), _| {
            session != session_id || file_id.map_or(false, |file_id| file != file_id)
        });
    }

    /// File IDs of the session with a cached dataframe, least recently used first
    ///
    pub fn cached_file_ids(&self, session_id: &str) -> Vec<String> {
        self.state()
            .entries
            .keys()
            .filter(|(session, _)| session == session_id)
            .map(|(_, file)| file.clone())
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state();
        let sessions: HashSet<&String> = state.entries.keys().map(|(session, _)| session).collect();
        CacheStats {
            size: state.entries.len(),
            max_size: self.max_size,
            sessions: sessions.len(),
            loading: state.loading.len(),
            loads: state.loads,
        }
    }
}
