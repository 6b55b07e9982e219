//! Text normalization shared by the schema normalizer, the search index, the
//! query matcher and the highlighter.
//!
//! Every comparison in the crate goes through [`search_key`]. The indexed
//! shadow columns and the user's terms must be produced by the same function,
//! otherwise names typed with decomposed marks (common for Tamil vowel signs
//! entered on some keyboards) silently stop matching stored NFC text.

use std::iter;
use std::ops::Range;
use unicode_normalization::UnicodeNormalization;

/// Normalizes a stored field value: leading/trailing whitespace removed, NFC.
///
/// Internal whitespace is left alone so the display copy keeps the source text.
pub fn normalize_field_value(value: &str) -> String {
    value.trim().nfc().collect()
}

/// Collapses every run of Unicode whitespace to a single ASCII space and trims
/// both ends.
pub fn collapse_whitespace(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for word in value.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Normalizes a user supplied term while keeping its case.
///
/// This is the form echoed back to the user and used as the highlight target.
pub fn normalize_term(raw: &str) -> String {
    collapse_whitespace(raw).nfc().collect()
}

/// Appends the case fold of one char.
///
/// Lowercase, except that final sigma folds to `σ` and `ß` / `ẞ` fold to
/// `ss`, so "ΟΔΟΣ" and "οδος" or "Straße" and "STRASSE" share a key. Other
/// full case foldings (ligatures, Cherokee) fall back to `char::to_lowercase`.
fn push_folded(c: char, out: &mut String) {
    match c {
        'ς' => out.push('σ'),
        'ß' | 'ẞ' => out.push_str("ss"),
        _ => out.extend(c.to_lowercase()),
    }
}

/// Case-folds char by char.
///
/// Per-char mapping (rather than `str::to_lowercase`) keeps folding context
/// free, which [`find_case_insensitive`] relies on to map offsets back.
pub fn fold_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        push_folded(c, &mut out);
    }
    out
}

/// The comparison form of any text: whitespace collapsed, trimmed, NFC,
/// case-folded.
///
/// # Examples
///
/// ```
/// use roll_search::text_normalize::search_key;
///
/// // Decomposed "é" and composed "É" produce the same key
/// assert_eq!(search_key("  Re\u{301}na  Kumar "), search_key("RÉNA kumar"));
/// ```
pub fn search_key(value: &str) -> String {
    fold_case(&normalize_term(value))
}

/// Locates the first case-insensitive occurrence of `folded_needle` in
/// `haystack` and returns its byte range in the ORIGINAL `haystack`.
///
/// `folded_needle` must already be a [`search_key`]. The haystack is folded on
/// the fly with the same rules (whitespace runs count as one space), while a
/// map from every folded byte back to the originating char is kept. The
/// returned range always lies on char boundaries of `haystack`, so callers can
/// slice it directly.
///
/// Returns `None` for an empty needle or when there is no occurrence.
///
/// # Examples
///
/// ```
/// use roll_search::text_normalize::{find_case_insensitive, search_key};
///
/// let stored = "Prakash KUMAR";
/// let span = find_case_insensitive(stored, &search_key("kumar")).unwrap();
/// assert_eq!(&stored[span], "KUMAR");
/// ```
pub fn find_case_insensitive(haystack: &str, folded_needle: &str) -> Option<Range<usize>> {
    if folded_needle.is_empty() {
        return None;
    }

    let mut folded = String::with_capacity(haystack.len());
    // (start, end) of the original char behind each folded byte
    let mut origin: Vec<(usize, usize)> = Vec::with_capacity(haystack.len());
    let mut in_whitespace = false;

    for (start, c) in haystack.char_indices() {
        let end = start + c.len_utf8();
        if c.is_whitespace() {
            if in_whitespace {
                if let Some(last) = origin.last_mut() {
                    last.1 = end;
                }
            } else {
                folded.push(' ');
                origin.push((start, end));
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        let before = folded.len();
        push_folded(c, &mut folded);
        origin.extend(iter::repeat_n((start, end), folded.len() - before));
    }

    let pos = folded.find(folded_needle)?;
    let last = pos + folded_needle.len() - 1;
    Some(origin[pos].0..origin[last].1)
}
