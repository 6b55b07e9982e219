// Tests for the schema normalizer, compiled only under #[cfg(test)] in schema_normalizer.rs

use crate::schema_normalizer::*;
use crate::column_parquet_reader::{RawColumn, RawTable};
use crate::config::SearchFields;

use std::sync::Arc;
use arrow::array::{ArrayRef, Int64Array, StringArray};


fn text(name: &str, values: &[Option<&str>]) -> RawColumn {
    RawColumn {
        name: name.to_string(),
        values: Arc::new(StringArray::from(values.to_vec())) as ArrayRef,
    }
}

fn ints(name: &str, values: &[i64]) -> RawColumn {
    RawColumn {
        name: name.to_string(),
        values: Arc::new(Int64Array::from(values.to_vec())) as ArrayRef,
    }
}

fn raw(columns: Vec<RawColumn>) -> RawTable {
    RawTable::new(columns).unwrap()
}

fn default_fields() -> SearchFields {
    SearchFields::default()
}
