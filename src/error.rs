//! Error types.
//!
//! Only [`LoadFailure`] is a genuine fault. An empty query is reported through
//! [`SearchError::EmptyQuery`] so the caller can prompt for input, and a search
//! with no matching rows is a normal [`SearchStatus`](crate::searching::search_results::SearchStatus).

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use arrow::error::ArrowError;
use thiserror::Error;

/// Boxed error produced by the loader layer.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// One region's backing data could not be loaded or normalized.
///
/// Cloneable so the registry can hand the same cached failure to every caller.
#[derive(Debug, Clone, Error)]
#[error("failed to load region '{region}': {cause}")]
pub struct LoadFailure {
    /// Label of the region that failed.
    pub region: String,
    /// Underlying loader or normalization error.
    pub cause: Arc<dyn Error + Send + Sync>,
}

impl LoadFailure {
    pub fn new(region: impl Into<String>, cause: BoxError) -> Self {
        Self {
            region: region.into(),
            cause: Arc::from(cause),
        }
    }
}

/// Errors returned by [`DatasetRegistry::get`](crate::registry::DatasetRegistry::get).
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error(transparent)]
    Load(#[from] LoadFailure),
}

/// Errors from a single search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Neither term had any content after normalization.
    #[error("enter at least one name to search for")]
    EmptyQuery,

    #[error("failed to assemble result rows: {0}")]
    Arrow(#[from] ArrowError),
}

/// Errors while rendering or serializing a result set.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode results: {0}")]
    Arrow(#[from] ArrowError),

    #[error("failed to write export file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: io::Error,
    },
}

/// Errors while loading the region configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config file {path} declares no regions")]
    NoRegions { path: PathBuf },

    #[error("config file {path} uses column '{column}' for both search fields")]
    SameSearchColumn { path: PathBuf, column: String },
}
