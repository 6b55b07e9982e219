//! Folded shadow columns for repeated substring search.
//!
//! A region is searched many times but loaded once, so every searchable value
//! is run through [`search_key`] exactly once here. A search then only has to
//! normalize its own term and scan plain lowercase strings.

use std::sync::Arc;
use arrow::array::{Array, StringArray};
use smallvec::SmallVec;
use tracing::debug;
use crate::schema_normalizer::{RecordTable, SearchField};
use crate::text_normalize::search_key;

/// Suffix of the derived column names, e.g. `FM_NAME_V2__folded`.
pub const FOLDED_SUFFIX: &str = "__folded";

/// One derived column: the search key of every row of a searchable field.
#[derive(Debug, Clone)]
pub struct DerivedColumn {
    pub name: String,
    pub field: SearchField,
    pub values: StringArray,
}

/// A [`RecordTable`] plus its folded shadow columns. Immutable once built.
///
/// The derived columns live beside the record batch rather than inside it, so
/// nothing that renders or exports the batch can leak them.
#[derive(Debug, Clone)]
pub struct IndexedTable {
    pub table: RecordTable,
    derived: SmallVec<[DerivedColumn; 2]>,
}

impl IndexedTable {
    pub fn num_rows(&self) -> usize {
        self.table.num_rows()
    }

    /// Folded values for `field`, if the table has that field.
    pub fn folded(&self, field: SearchField) -> Option<&StringArray> {
        self.derived.iter()
            .find(|d| d.field == field)
            .map(|d| &d.values)
    }

    pub fn derived_columns(&self) -> &[DerivedColumn] {
        &self.derived
    }
}

/// Builds the folded shadow column for every searchable field the table has.
///
/// Nulls stay null so they can never match.
pub fn prepare(table: RecordTable) -> IndexedTable {
    let mut derived = SmallVec::new();

    for field in SearchField::ALL {
        let (Some(idx), Some(values)) = (table.fields.column(field), table.text_column(field)) else {
            continue;
        };

        let folded: StringArray = values.iter()
            .map(|value| value.map(search_key))
            .collect();

        let name = format!("{}{}", table.batch.schema().field(idx).name(), FOLDED_SUFFIX);
        debug!(column = %name, rows = folded.len(), nulls = folded.null_count(), "built folded column");
        derived.push(DerivedColumn { name, field, values: folded });
    }

    IndexedTable { table, derived }
}

/// Convenience for callers that share the table across requests.
pub fn prepare_shared(table: RecordTable) -> Arc<IndexedTable> {
    Arc::new(prepare(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int32Array};
    use crate::column_parquet_reader::{RawColumn, RawTable};
    use crate::config::SearchFields;
    use crate::schema_normalizer::normalize;

    fn table(primary: &[Option<&str>], related: Option<&[Option<&str>]>) -> RecordTable {
        let mut columns = vec![
            RawColumn {
                name: "SLNOINPART".to_string(),
                values: Arc::new(Int32Array::from((1..=primary.len() as i32).collect::<Vec<_>>())) as ArrayRef,
            },
            RawColumn {
                name: "FM_NAME_V2".to_string(),
                values: Arc::new(StringArray::from(primary.to_vec())) as ArrayRef,
            },
        ];
        if let Some(related) = related {
            columns.push(RawColumn {
                name: "RLN_FM_NM_V2".to_string(),
                values: Arc::new(StringArray::from(related.to_vec())) as ArrayRef,
            });
        }
        normalize(RawTable::new(columns).unwrap(), &SearchFields::default()).unwrap()
    }

    #[test]
    fn test_folded_columns_built_once_per_field() {
        let indexed = prepare(table(
            &[Some("Ravi KUMAR"), Some("  e\u{301}lan ")],
            Some(&[Some("RAMAN"), None]),
        ));

        let names: Vec<&str> = indexed.derived_columns().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["FM_NAME_V2__folded", "RLN_FM_NM_V2__folded"]);

        let primary = indexed.folded(SearchField::PrimaryName).unwrap();
        assert_eq!(primary.value(0), "ravi kumar");
        assert_eq!(primary.value(1), "\u{e9}lan");

        let related = indexed.folded(SearchField::RelatedName).unwrap();
        assert_eq!(related.value(0), "raman");
        assert!(related.is_null(1));
    }

    #[test]
    fn test_derived_columns_not_in_record_batch() {
        let indexed = prepare(table(&[Some("Ravi")], Some(&[Some("Raman")])));
        assert_eq!(indexed.table.column_names(), vec!["SLNOINPART", "FM_NAME_V2", "RLN_FM_NM_V2"]);
        assert_eq!(indexed.num_rows(), 1);
    }

    #[test]
    fn test_absent_field_has_no_derived_column() {
        let indexed = prepare(table(&[Some("Ravi")], None));
        assert!(indexed.folded(SearchField::PrimaryName).is_some());
        assert!(indexed.folded(SearchField::RelatedName).is_none());
        assert_eq!(indexed.derived_columns().len(), 1);
    }

    #[test]
    fn test_internal_whitespace_collapsed_in_key() {
        let indexed = prepare(table(&[Some("Ravi   Kumar")], None));
        assert_eq!(indexed.folded(SearchField::PrimaryName).unwrap().value(0), "ravi kumar");
        // The display copy keeps the stored spacing
        let display = indexed.table.text_column(SearchField::PrimaryName).unwrap();
        assert_eq!(display.value(0), "Ravi   Kumar");
    }
}
