//! Multi-field substring matching over an [`IndexedTable`].
//!
//! # Matching rules
//!
//! - Each term is normalized with [`search_key`](crate::text_normalize::search_key),
//!   the same function that built the folded index.
//! - A row matches a term when the folded value contains the folded term as a
//!   literal substring. Names like `A.(B)` are never treated as patterns.
//! - Null values never match.
//! - With both terms given, a row must match both (logical AND).
//!
//! # Basic Usage
//!
//! ```no_run
//! use roll_search::registry::DatasetRegistry;
//! use roll_search::config::RegistryConfig;
//! use roll_search::searching::query_matcher::search;
//! use roll_search::searching::search_results::SearchTerms;
//!
//! # tokio_test::block_on(async {
//! let registry = DatasetRegistry::from_config(&RegistryConfig::default());
//! let table = registry.get("116 - திருப்பூர் (Tiruppur)").await.unwrap();
//!
//! let result = search(&table, &SearchTerms::new("பிரகாஷ்", "வேலுசாமி")).unwrap();
//! println!("{}", result.status());
//! # });
//! ```

use arrow::array::{Array, BooleanArray, StringArray};
use arrow::compute::{and, filter_record_batch};
use tracing::{debug, warn};
use crate::error::SearchError;
use crate::index_structure::search_index::IndexedTable;
use crate::searching::search_results::{NormalizedTerms, ResultSet, SearchTerms};

/// Per-row containment test of one folded term against one folded column.
///
/// The mask has no nulls: a null value is simply `false`.
pub fn match_mask(folded: &StringArray, key: &str) -> BooleanArray {
    let matches: Vec<bool> = folded.iter()
        .map(|value| value.is_some_and(|v| v.contains(key)))
        .collect();
    BooleanArray::from(matches)
}

/// Searches one region.
///
/// # Errors
///
/// - [`SearchError::EmptyQuery`] if both terms are empty after normalization.
///   The table is not scanned.
/// - [`SearchError::Arrow`] if the matching rows cannot be extracted.
///
/// Zero matching rows is not an error; check [`ResultSet::status`].
pub fn search(indexed: &IndexedTable, terms: &SearchTerms) -> Result<ResultSet, SearchError> {
    let normalized = NormalizedTerms::from_terms(terms)?;
    search_normalized(indexed, normalized)
}

/// Searches with terms that were already normalized.
pub fn search_normalized(
    indexed: &IndexedTable,
    terms: NormalizedTerms,
) -> Result<ResultSet, SearchError> {
    let num_rows = indexed.num_rows();
    let mut combined: Option<BooleanArray> = None;

    for term in terms.iter() {
        let mask = match indexed.folded(term.field) {
            Some(folded) => match_mask(folded, &term.key),
            None => {
                warn!(field = ?term.field, "searched field is absent from this table, no row can match");
                BooleanArray::from(vec![false; num_rows])
            }
        };
        debug!(field = ?term.field, term = %term.display, matched = mask.true_count(), "field mask");

        combined = Some(match combined {
            Some(previous) => and(&previous, &mask)?,
            None => mask,
        });
    }

    // NormalizedTerms is never empty, so there is always a mask
    let mask = combined.unwrap_or_else(|| BooleanArray::from(vec![false; num_rows]));

    let row_indices: Vec<u32> = mask.values()
        .set_indices()
        .map(|idx| idx as u32)
        .collect();
    let batch = filter_record_batch(&indexed.table.batch, &mask)?;

    debug!(rows_scanned = num_rows, matched = batch.num_rows(), "search complete");

    Ok(ResultSet {
        terms,
        batch,
        row_indices,
        fields: indexed.table.fields,
        rows_scanned: num_rows,
    })
}
