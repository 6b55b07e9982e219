//! Loading one region's Parquet file into a [`RawTable`].
//!
//! The loader is deliberately dumb: it decodes every column with its stored
//! name and type and hands the result to the schema normalizer. Parquet allows
//! several columns to share a name (files exported from dataframe tools often
//! do), so the raw table is a list of `(name, array)` pairs instead of a map.

use std::sync::Arc;
use arrow::array::{ArrayRef, RecordBatch};
use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use bytes::Bytes;
use futures::StreamExt;
use futures::future::BoxFuture;
use parquet::arrow::async_reader::{AsyncFileReader, ParquetObjectReader, ParquetRecordBatchStreamBuilder};
use tracing::debug;
use crate::ParquetSource;
use crate::error::BoxError;
use crate::utils::file_interaction_local_and_cloud::RegionLocation;

/// Rows per decoded batch. Batches are concatenated after reading.
pub const READ_BATCH_SIZE: usize = 8192;

/// Parquet footer size: 4 bytes metadata length + 4 bytes "PAR1" magic number.
pub const FOOTER_SIZE: usize = 8;

/// One column exactly as stored in the file.
#[derive(Debug, Clone)]
pub struct RawColumn {
    pub name: String,
    pub values: ArrayRef,
}

/// A freshly loaded table: columns in file order, names possibly repeated or
/// reserved.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub columns: Vec<RawColumn>,
    pub num_rows: usize,
}

impl RawTable {
    /// Builds a raw table from named columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the columns do not all have the same length.
    pub fn new(columns: Vec<RawColumn>) -> Result<Self, BoxError> {
        let num_rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.values.len() != num_rows) {
            return Err(format!(
                "column '{}' has {} rows, expected {}",
                bad.name,
                bad.values.len(),
                num_rows
            ).into());
        }
        Ok(Self { columns, num_rows })
    }

    /// Splits a decoded batch into named columns, keeping duplicate names.
    pub fn from_batch(batch: &RecordBatch) -> Self {
        let columns = batch.schema().fields().iter()
            .zip(batch.columns())
            .map(|(field, values)| RawColumn {
                name: field.name().clone(),
                values: Arc::clone(values),
            })
            .collect();
        Self { columns, num_rows: batch.num_rows() }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// The loader seam used by the registry.
///
/// [`ParquetLoader`] is the production implementation; tests plug in loaders
/// that count calls or fail on purpose.
pub trait TableLoader: Send + Sync {
    fn load<'a>(&'a self, source: &'a ParquetSource) -> BoxFuture<'a, Result<RawTable, BoxError>>;
}

/// Reads Parquet from local paths, `s3://` URLs or in-memory bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParquetLoader;

impl TableLoader for ParquetLoader {
    fn load<'a>(&'a self, source: &'a ParquetSource) -> BoxFuture<'a, Result<RawTable, BoxError>> {
        Box::pin(load_raw_table(source))
    }
}

/// Checks the trailing "PAR1" magic of in-memory data.
///
/// The Parquet reader would fail as well, but with a much less useful message
/// for the common case of a truncated or mislabeled file.
fn check_footer(bytes: &[u8]) -> Result<(), BoxError> {
    if bytes.len() < FOOTER_SIZE {
        return Err("Footer too short".into());
    }
    if &bytes[bytes.len() - 4..] != b"PAR1" {
        return Err("Invalid Parquet file - missing PAR1 magic number".into());
    }
    Ok(())
}

/// Opens the async reader for a region source.
///
/// Files go through their object store with the size from `head`, so every
/// read is a bounded range request. In-memory data is read straight from the
/// buffer.
async fn open_reader(source: &ParquetSource) -> Result<Box<dyn AsyncFileReader>, BoxError> {
    match source {
        ParquetSource::Path(file) => {
            let location = RegionLocation::parse(file)?;
            let (store, path) = location.open()?;
            let meta = store.head(&path).await?;
            debug!(location = %location, size = meta.size, "opening region file");
            Ok(Box::new(ParquetObjectReader::new(store, path).with_file_size(meta.size)))
        }
        ParquetSource::Bytes(bytes) => {
            check_footer(bytes)?;
            Ok(Box::new(std::io::Cursor::new(Bytes::clone(bytes))))
        }
    }
}

/// Loads every column and row of a Parquet source.
///
/// All row groups are decoded in order and concatenated into a single batch,
/// then split into [`RawColumn`]s. Column names are kept verbatim.
///
/// # Errors
///
/// Returns an error if the file cannot be reached, is not valid Parquet, or a
/// batch fails to decode.
///
/// # Examples
///
/// ```no_run
/// use roll_search::ParquetSource;
/// use roll_search::column_parquet_reader::load_raw_table;
///
/// # tokio_test::block_on(async {
/// let raw = load_raw_table(&ParquetSource::Path("AC_116_Tiruppur.parquet".to_string())).await.unwrap();
/// println!("{} rows, columns {:?}", raw.num_rows, raw.column_names());
/// # });
/// ```
pub async fn load_raw_table(source: &ParquetSource) -> Result<RawTable, BoxError> {
    let reader = open_reader(source).await?;
    let builder = ParquetRecordBatchStreamBuilder::new(reader).await?;
    let schema: SchemaRef = Arc::clone(builder.schema());

    let mut stream = builder
        .with_batch_size(READ_BATCH_SIZE)
        .build()?;

    let mut batches = Vec::new();
    while let Some(batch_result) = stream.next().await {
        batches.push(batch_result?);
    }

    let combined = concat_batches(&schema, &batches)?;
    debug!(
        source = %source,
        batches = batches.len(),
        rows = combined.num_rows(),
        columns = combined.num_columns(),
        "decoded parquet source"
    );
    Ok(RawTable::from_batch(&combined))
}
