//! Request-scoped search types: the user's terms, their normalized form, the
//! filtered result set and the status reported to the user.

use std::fmt;
use arrow::array::RecordBatch;
use smallvec::SmallVec;
use crate::error::SearchError;
use crate::schema_normalizer::{SearchField, SearchFieldPresence};
use crate::text_normalize::{normalize_term, search_key};

/// The two free-text inputs of a search. An empty string means "no
/// constraint" for that field.
///
/// # Examples
///
/// ```
/// # use roll_search::searching::search_results::SearchTerms;
/// let terms = SearchTerms::new("பிரகாஷ்", "");
/// assert_eq!(terms.primary_name, "பிரகாஷ்");
/// assert!(terms.related_name.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms {
    /// Voter name term.
    pub primary_name: String,
    /// Father / husband name term.
    pub related_name: String,
}

impl SearchTerms {
    pub fn new(primary_name: impl Into<String>, related_name: impl Into<String>) -> Self {
        Self {
            primary_name: primary_name.into(),
            related_name: related_name.into(),
        }
    }

    pub fn term(&self, field: SearchField) -> &str {
        match field {
            SearchField::PrimaryName => &self.primary_name,
            SearchField::RelatedName => &self.related_name,
        }
    }
}

/// One non-empty term after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTerm {
    pub field: SearchField,
    /// NFC, whitespace collapsed, original case. Shown back to the user.
    pub display: String,
    /// [`search_key`] of the term; compared against the folded index.
    pub key: String,
}

/// The active constraints of a search, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTerms {
    terms: SmallVec<[NormalizedTerm; 2]>,
}

impl NormalizedTerms {
    /// Normalizes both terms and keeps the non-empty ones.
    ///
    /// # Errors
    ///
    /// [`SearchError::EmptyQuery`] when neither term has any content left.
    pub fn from_terms(terms: &SearchTerms) -> Result<Self, SearchError> {
        let mut active = SmallVec::new();
        for field in SearchField::ALL {
            let display = normalize_term(terms.term(field));
            if display.is_empty() {
                continue;
            }
            let key = search_key(&display);
            active.push(NormalizedTerm { field, display, key });
        }

        if active.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Self { terms: active })
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedTerm> {
        self.terms.iter()
    }

    pub fn get(&self, field: SearchField) -> Option<&NormalizedTerm> {
        self.terms.iter().find(|t| t.field == field)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Rows of one region surviving every active constraint.
///
/// Built fresh for each search and never modified. An empty result is still a
/// `ResultSet` (with a zero-row batch carrying the full schema), so callers can
/// render headers and export an empty file.
#[derive(Debug, Clone)]
pub struct ResultSet {
    pub terms: NormalizedTerms,
    /// Matching rows, all record columns, source order.
    pub batch: RecordBatch,
    /// Positions of the matching rows in the region table.
    pub row_indices: Vec<u32>,
    /// Searchable column positions, identical in `batch` and the source table.
    pub fields: SearchFieldPresence,
    /// Row count of the searched table.
    pub rows_scanned: usize,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn status(&self) -> SearchStatus {
        if self.is_empty() {
            SearchStatus::NoMatches
        } else {
            SearchStatus::Found(self.len())
        }
    }
}

/// What the presentation layer tells the user after a search attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// The region's data could not be loaded.
    Unavailable { region: String },
    /// Both inputs were empty.
    EmptyQuery,
    /// Valid search, zero rows.
    NoMatches,
    /// Valid search with this many rows.
    Found(usize),
}

impl SearchStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SearchStatus::Found(_))
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStatus::Unavailable { region } => write!(
                f,
                "இந்த தொகுதி கோப்பை ஏற்ற முடியவில்லை. (Could not load data for {})",
                region
            ),
            SearchStatus::EmptyQuery => write!(
                f,
                "குறைந்தது ஒரு பெயரை உள்ளிடுங்கள். (Enter at least one name.)"
            ),
            SearchStatus::NoMatches => write!(
                f,
                "பொருந்தும் பதிவுகள் இல்லை. (No matching records.)"
            ),
            SearchStatus::Found(count) => write!(
                f,
                "{} பதிவுகள் கிடைத்தன. ({} records found.)",
                count, count
            ),
        }
    }
}
