//! Roll Search - Name Lookup over Electoral Roll Parquet Files
//!
//! Loads one Parquet file per assembly constituency ("region") and answers
//! free-text lookups on two name fields: the voter's name and the father's or
//! husband's name. Matching is a case-insensitive, Unicode-normalized
//! substring test, so a Tamil name typed with a different code-point sequence
//! still finds the stored record.
//!
//! # Overview
//!
//! A lookup flows through five stages:
//! - **Loading**: [`column_parquet_reader`] decodes a local, `s3://` or
//!   in-memory Parquet file, keeping repeated column names.
//! - **Schema repair**: [`schema_normalizer`] drops bookkeeping columns,
//!   renames duplicates and normalizes the name fields.
//! - **Index preparation**: [`index_structure::search_index`] builds folded
//!   copies of the name fields once per region.
//! - **Matching**: [`searching::query_matcher`] ANDs the per-field masks.
//! - **Formatting**: [`searching::result_formatter`] highlights the matched
//!   spans and produces a UTF-8 CSV export.
//!
//! [`registry::DatasetRegistry`] ties the first three together and caches
//! every region after its first use.
//!
//! # Quick Start
//!
//! ```no_run
//! use roll_search::config::RegistryConfig;
//! use roll_search::registry::DatasetRegistry;
//! use roll_search::searching::query_matcher::search;
//! use roll_search::searching::result_formatter::{format, HighlightStyle};
//! use roll_search::searching::search_results::SearchTerms;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let registry = DatasetRegistry::from_config(&RegistryConfig::default());
//!     let table = registry.get("116 - திருப்பூர் (Tiruppur)").await?;
//!
//!     let result = search(&table, &SearchTerms::new("பிரகாஷ்", "வேலுசாமி"))?;
//!     let formatted = format(&result, HighlightStyle::Terminal)?;
//!     println!("{}", formatted.status);
//!     for row in &formatted.rows {
//!         println!("{}", row.cells.join(" | "));
//!     }
//!     Ok(())
//! }
//! ```
pub mod config;
pub mod error;
pub mod text_normalize;
pub mod column_parquet_reader;
pub mod schema_normalizer;
pub mod index_structure;
pub mod searching;
pub mod registry;
#[cfg(test)]
pub mod unit_tests;
pub mod utils;

use std::fmt;
use bytes::Bytes;

/// Source of one region's Parquet data.
///
/// Allows providing Parquet data either from a file path or directly from
/// memory as bytes. The bytes variant is mostly used by tests, which build
/// their fixtures in memory.
///
/// # Examples
///
/// ```no_run
/// use roll_search::ParquetSource;
///
/// // Local file or s3:// URL
/// let source = ParquetSource::Path("AC_116_Tiruppur.parquet".to_string());
///
/// // From bytes
/// let parquet_bytes = vec![/* parquet data */];
/// let source = ParquetSource::from(parquet_bytes);
/// ```
#[derive(Debug, Clone)]
pub enum ParquetSource {
    /// Path to a Parquet file (local or remote like s3://)
    Path(String),
    /// In-memory Parquet data as bytes
    Bytes(Bytes),
}

impl From<Vec<u8>> for ParquetSource {
    fn from(vec: Vec<u8>) -> Self {
        ParquetSource::Bytes(Bytes::from(vec))
    }
}

impl From<Bytes> for ParquetSource {
    fn from(bytes: Bytes) -> Self {
        ParquetSource::Bytes(bytes)
    }
}

impl fmt::Display for ParquetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParquetSource::Path(path) => f.write_str(path),
            ParquetSource::Bytes(bytes) => write!(f, "<{} bytes in memory>", bytes.len()),
        }
    }
}
