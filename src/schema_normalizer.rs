//! Repairs a freshly loaded [`RawTable`] into a [`RecordTable`].
//!
//! Three things are fixed here, once per region load:
//!
//! 1. Bookkeeping columns injected by the dataset writer (fragment and batch
//!    indices, source file names) are dropped before anything can search them.
//! 2. Repeated column names are made unique with [`ColumnPool`].
//! 3. The two searchable name columns are cast to text, trimmed and put into
//!    Unicode NFC.
//!
//! None of these repairs are reported to the caller; they are logged at
//! `debug` and the table is returned as if the file had been clean.

use std::sync::Arc;
use arrow::array::{Array, ArrayRef, AsArray, RecordBatch, RecordBatchOptions, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use tracing::{debug, warn};
use crate::column_parquet_reader::RawTable;
use crate::config::SearchFields;
use crate::error::BoxError;
use crate::text_normalize::normalize_field_value;
use crate::utils::column_pool::ColumnPool;

/// Columns written by the partitioned dataset writer. Never part of the
/// searchable schema.
pub const RESERVED_COLUMNS: &[&str] = &[
    "__fragment_index",
    "__batch_index",
    "__last_in_fragment",
    "__filename",
];

/// The two searchable name fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    /// The voter's own name.
    PrimaryName,
    /// Father's or husband's name.
    RelatedName,
}

impl SearchField {
    pub const ALL: [SearchField; 2] = [SearchField::PrimaryName, SearchField::RelatedName];
}

/// Which searchable fields a table has, by column position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFieldPresence {
    pub primary: Option<usize>,
    pub related: Option<usize>,
}

impl SearchFieldPresence {
    pub fn column(&self, field: SearchField) -> Option<usize> {
        match field {
            SearchField::PrimaryName => self.primary,
            SearchField::RelatedName => self.related,
        }
    }
}

/// A normalized region table.
///
/// Column names are unique. Searchable columns, where present, are `Utf8`
/// holding trimmed NFC text.
#[derive(Debug, Clone)]
pub struct RecordTable {
    pub batch: RecordBatch,
    pub fields: SearchFieldPresence,
}

impl RecordTable {
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch.schema().fields().iter().map(|f| f.name().clone()).collect()
    }

    /// The text column backing `field`, if the table has it.
    pub fn text_column(&self, field: SearchField) -> Option<&StringArray> {
        self.fields.column(field)
            .map(|idx| self.batch.column(idx).as_string::<i32>())
    }
}

pub fn is_reserved(column_name: &str) -> bool {
    RESERVED_COLUMNS.contains(&column_name)
}

/// Casts a column to text and normalizes every non-null value.
fn normalize_text_column(values: &ArrayRef) -> Result<ArrayRef, BoxError> {
    let text = cast(values.as_ref(), &DataType::Utf8)?;
    let normalized: StringArray = text.as_string::<i32>()
        .iter()
        .map(|value| value.map(normalize_field_value))
        .collect();
    Ok(Arc::new(normalized))
}

/// Normalizes a raw table.
///
/// `search_fields` names the two searchable columns. A column matches only
/// under its de-duplicated name, so when a name column is repeated the first
/// occurrence is the searchable one.
///
/// # Errors
///
/// Returns an error if a searchable column cannot be cast to text or the
/// repaired columns cannot be assembled into a batch. The registry reports
/// this as a load failure for the region.
pub fn normalize(raw: RawTable, search_fields: &SearchFields) -> Result<RecordTable, BoxError> {
    let mut pool = ColumnPool::new();
    let mut schema_fields = Vec::with_capacity(raw.columns.len());
    let mut arrays = Vec::with_capacity(raw.columns.len());
    let mut presence = SearchFieldPresence::default();
    let mut dropped = Vec::new();

    for column in raw.columns {
        if is_reserved(&column.name) {
            dropped.push(column.name);
            continue;
        }

        let name = pool.intern(&column.name);
        let position = arrays.len();
        let is_primary = name == search_fields.primary;
        let is_related = name == search_fields.related;
        if is_primary {
            presence.primary = Some(position);
        }
        if is_related {
            presence.related = Some(position);
        }
        let values = if is_primary || is_related {
            normalize_text_column(&column.values)?
        } else {
            column.values
        };

        schema_fields.push(Field::new(name, values.data_type().clone(), true));
        arrays.push(values);
    }

    if !dropped.is_empty() {
        debug!(columns = ?dropped, "dropped reserved columns");
    }
    if pool.renamed() > 0 {
        debug!(renamed = pool.renamed(), columns = ?pool.strings, "renamed duplicate columns");
    }
    for (field, column) in [
        (SearchField::PrimaryName, &search_fields.primary),
        (SearchField::RelatedName, &search_fields.related),
    ] {
        if presence.column(field).is_none() {
            warn!(field = ?field, column = %column, "searchable column not found");
        }
    }

    let options = RecordBatchOptions::new().with_row_count(Some(raw.num_rows));
    let batch = RecordBatch::try_new_with_options(
        Arc::new(Schema::new(schema_fields)),
        arrays,
        &options,
    )?;

    Ok(RecordTable { batch, fields: presence })
}

#[cfg(test)]
mod tests;
