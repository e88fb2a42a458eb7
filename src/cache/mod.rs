/// LRU cache of loaded data files, shared by all sessions
pub mod dataframe_cache;
pub mod errors;
