//! Display rows with highlighted matches, and the CSV export of a result set.
//!
//! Highlighting never searches the display text for the user's literal term.
//! The span is found with [`find_case_insensitive`], which works on the folded
//! form and maps the hit back to byte offsets of the stored value; the wrap is
//! then applied by slicing. A row that matched case-insensitively therefore
//! always gets its highlight, whatever the casing of the stored text.

use std::fs;
use std::path::Path;
use arrow::array::{Array, RecordBatch};
use arrow::csv::WriterBuilder;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use bytes::Bytes;
use tracing::info;
use crate::error::ExportError;
use crate::schema_normalizer::SearchField;
use crate::searching::search_results::{ResultSet, SearchStatus};
use crate::text_normalize::find_case_insensitive;

/// Byte-order mark written before the CSV so spreadsheet tools detect UTF-8.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How matched spans are marked in display cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightStyle {
    /// `<mark><b>…</b></mark>`; every cell is HTML-escaped.
    Html,
    /// ANSI bold + reverse video for terminals; no escaping.
    Terminal,
}

impl HighlightStyle {
    fn open(self) -> &'static str {
        match self {
            HighlightStyle::Html => "<mark><b>",
            HighlightStyle::Terminal => "\x1b[1;7m",
        }
    }

    fn close(self) -> &'static str {
        match self {
            HighlightStyle::Html => "</b></mark>",
            HighlightStyle::Terminal => "\x1b[0m",
        }
    }

    fn escape(self, text: &str) -> String {
        match self {
            HighlightStyle::Html => escape_html(text),
            HighlightStyle::Terminal => text.to_string(),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps the first case-insensitive occurrence of `folded_term` in `value`.
///
/// `folded_term` is a search key. When there is no occurrence the value is
/// returned escaped but otherwise unchanged.
///
/// # Examples
///
/// ```
/// use roll_search::searching::result_formatter::{highlight, HighlightStyle};
/// use roll_search::text_normalize::search_key;
///
/// let cell = highlight("RAVI Kumar", &search_key("ravi"), HighlightStyle::Html);
/// assert_eq!(cell, "<mark><b>RAVI</b></mark> Kumar");
/// ```
pub fn highlight(value: &str, folded_term: &str, style: HighlightStyle) -> String {
    match find_case_insensitive(value, folded_term) {
        Some(span) => {
            let mut out = String::with_capacity(value.len() + 24);
            out.push_str(&style.escape(&value[..span.start]));
            out.push_str(style.open());
            out.push_str(&style.escape(&value[span.start..span.end]));
            out.push_str(style.close());
            out.push_str(&style.escape(&value[span.end..]));
            out
        }
        None => style.escape(value),
    }
}

/// One rendered result row, cells in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub cells: Vec<String>,
}

/// Everything the presentation layer needs after a search.
#[derive(Debug, Clone)]
pub struct FormattedResults {
    pub status: SearchStatus,
    pub columns: Vec<String>,
    pub rows: Vec<DisplayRow>,
    /// UTF-8 CSV with BOM and header.
    pub export: Bytes,
}

impl FormattedResults {
    /// Writes the CSV export to `path`.
    pub fn write_export(&self, path: &Path) -> Result<(), ExportError> {
        fs::write(path, &self.export).map_err(|source| ExportError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), bytes = self.export.len(), "wrote export");
        Ok(())
    }
}

/// Export file name for a region: `{region}_voter_results.csv`.
///
/// Path separators in the label are replaced so the name stays a single path
/// component.
pub fn export_file_name(region: &str) -> String {
    let safe: String = region.chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}_voter_results.csv", safe)
}

/// Serializes a batch as UTF-8 CSV with a BOM and a header line.
///
/// Text is written as-is (quoted where needed), so every code point survives.
pub fn export_csv(batch: &RecordBatch) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::with_capacity(UTF8_BOM.len() + batch.get_array_memory_size());
    buffer.extend_from_slice(UTF8_BOM);
    {
        let mut writer = WriterBuilder::new()
            .with_header(true)
            .build(&mut buffer);
        writer.write(batch)?;
    }
    Ok(buffer)
}

/// Renders display rows and the export for a result set.
///
/// Cells of searched fields are highlighted; every other cell is rendered with
/// Arrow's display formatting (nulls as empty cells).
///
/// # Errors
///
/// Returns an error if a cell cannot be formatted or the CSV cannot be written.
pub fn format(result: &ResultSet, style: HighlightStyle) -> Result<FormattedResults, ExportError> {
    let batch = &result.batch;
    let schema = batch.schema();
    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

    // For every column: the folded term to highlight, if it is a searched field
    let highlight_terms: Vec<Option<&str>> = (0..batch.num_columns())
        .map(|idx| {
            SearchField::ALL.iter()
                .find(|field| result.fields.column(**field) == Some(idx))
                .and_then(|field| result.terms.get(*field))
                .map(|term| term.key.as_str())
        })
        .collect();

    let options = FormatOptions::default();
    let formatters = batch.columns().iter()
        .map(|column| ArrayFormatter::try_new(column.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let mut cells = Vec::with_capacity(columns.len());
        for (col, formatter) in formatters.iter().enumerate() {
            let raw = if batch.column(col).is_null(row) {
                String::new()
            } else {
                formatter.value(row).try_to_string()?
            };
            let cell = match highlight_terms[col] {
                Some(term) => highlight(&raw, term, style),
                None => style.escape(&raw),
            };
            cells.push(cell);
        }
        rows.push(DisplayRow { cells });
    }

    let export = Bytes::from(export_csv(batch)?);

    Ok(FormattedResults {
        status: result.status(),
        columns,
        rows,
        export,
    })
}
