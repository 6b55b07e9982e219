//! Where a region file lives and how to open it.
//!
//! By the time a region reaches the loader its `file` entry has already been
//! joined onto `data_dir` (see [`RegistryConfig::source_for`]), so only two
//! shapes remain: a filesystem path or an `s3://bucket/key` URL, optionally
//! with `?anon=true` for public buckets.
//!
//! [`RegistryConfig::source_for`]: crate::config::RegistryConfig::source_for

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use object_store::{ObjectStore, aws::AmazonS3Builder, local::LocalFileSystem, path::Path as ObjectPath};
use tracing::debug;
use url::Url;
use crate::error::BoxError;

/// One local store serves every filesystem region.
static LOCAL_STORE: Lazy<Arc<dyn ObjectStore>> =
    Lazy::new(|| Arc::new(LocalFileSystem::new()));

/// S3 stores keyed by (bucket, anonymous).
///
/// All regions of a district usually sit in one bucket, so warming the
/// registry reuses a single store instead of resolving credentials per region.
static S3_STORES: Lazy<DashMap<(String, bool), Arc<dyn ObjectStore>>> =
    Lazy::new(DashMap::new);

/// A resolved region file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionLocation {
    Local(PathBuf),
    S3 {
        bucket: String,
        key: String,
        anonymous: bool,
    },
}

impl RegionLocation {
    /// Parses a region file string.
    ///
    /// Plain strings are filesystem paths, as is a `file://` URL. `s3://`
    /// needs both a bucket and a key.
    ///
    /// # Errors
    ///
    /// Returns an error for an `s3://` URL without bucket or key, or for any
    /// other URL scheme.
    pub fn parse(file: &str) -> Result<Self, BoxError> {
        if !file.contains("://") {
            return Ok(RegionLocation::Local(PathBuf::from(file)));
        }

        let url = Url::parse(file)?;
        match url.scheme() {
            "file" => url.to_file_path()
                .map(RegionLocation::Local)
                .map_err(|_| BoxError::from(format!("'{}' is not a usable file URL", file))),
            "s3" => {
                let bucket = url.host_str()
                    .filter(|b| !b.is_empty())
                    .ok_or_else(|| format!("'{}' names no bucket", file))?;
                let key = url.path().trim_start_matches('/');
                if key.is_empty() {
                    return Err(format!("'{}' names no object key", file).into());
                }
                let anonymous = url.query_pairs()
                    .any(|(k, v)| k == "anon" && (v == "true" || v == "1"));
                Ok(RegionLocation::S3 {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    anonymous,
                })
            }
            other => Err(format!("unsupported scheme '{}' in region file '{}'", other, file).into()),
        }
    }

    /// The store holding this file and the file's path inside it.
    ///
    /// # Errors
    ///
    /// A local path that does not exist fails here, since it is canonicalized.
    /// For S3 the store must build (bucket name, credentials from the
    /// environment unless anonymous).
    pub fn open(&self) -> Result<(Arc<dyn ObjectStore>, ObjectPath), BoxError> {
        match self {
            RegionLocation::Local(path) => {
                let object_path = ObjectPath::from_filesystem_path(path)?;
                Ok((Arc::clone(&LOCAL_STORE), object_path))
            }
            RegionLocation::S3 { bucket, key, anonymous } => {
                let store = S3_STORES
                    .entry((bucket.clone(), *anonymous))
                    .or_try_insert_with(|| {
                        debug!(bucket = %bucket, anonymous, "creating s3 store");
                        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
                        if *anonymous {
                            builder = builder.with_skip_signature(true);
                        }
                        Ok::<_, BoxError>(Arc::new(builder.build()?) as Arc<dyn ObjectStore>)
                    })?;
                Ok((Arc::clone(store.value()), ObjectPath::from(key.as_str())))
            }
        }
    }
}

impl fmt::Display for RegionLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionLocation::Local(path) => write!(f, "{}", path.display()),
            RegionLocation::S3 { bucket, key, anonymous: true } => write!(f, "s3://{}/{}?anon=true", bucket, key),
            RegionLocation::S3 { bucket, key, anonymous: false } => write!(f, "s3://{}/{}", bucket, key),
        }
    }
}
