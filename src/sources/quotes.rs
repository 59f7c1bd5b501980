use std::path::PathBuf;

use anyhow::Context as _;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::foundation::error::{ReelError, ReelResult};
use crate::http::{build_client, expect_success};

/// Column holding the quote text.
pub const QUOTE_COLUMN: &str = "Quote";
/// Column holding the author.
pub const AUTHOR_COLUMN: &str = "Author";
/// Column added by [`QuoteSource::mark_used`].
pub const USED_COLUMN: &str = "Used";

/// One table row. Identity is the row position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Quote body.
    pub text: String,
    /// Attribution.
    pub author: String,
}

/// Ordered quote table.
pub trait QuoteSource {
    /// Fetch every row in table order.
    fn fetch(&mut self) -> ReelResult<Vec<Quote>>;
    /// Remove the row at `row` (0-based, header excluded).
    fn delete_row(&mut self, row: usize) -> ReelResult<()>;
    /// Flag the row at `row` as used.
    fn mark_used(&mut self, row: usize) -> ReelResult<()>;
}

/// What happens to the used row after a confirmed publish.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Leave the table alone.
    #[default]
    Off,
    /// Delete the row, marking it used if deletion fails.
    Delete,
    /// Mark the row used.
    MarkUsed,
}

/// Result of [`apply_row_policy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowOutcome {
    /// Nothing was attempted.
    Untouched,
    /// The row is gone; later rows moved up by one.
    Deleted,
    /// The row carries `Used = Yes`.
    Marked,
    /// Every attempt failed (logged).
    Failed,
}

/// Best-effort row management. Failures are logged, never returned.
pub fn apply_row_policy(source: &mut dyn QuoteSource, policy: RowPolicy, row: usize) -> RowOutcome {
    let mark = |source: &mut dyn QuoteSource| match source.mark_used(row) {
        Ok(()) => {
            tracing::info!(row, "marked quote as used");
            RowOutcome::Marked
        }
        Err(e) => {
            tracing::warn!(row, error = %e, "could not mark quote as used");
            RowOutcome::Failed
        }
    };

    match policy {
        RowPolicy::Off => RowOutcome::Untouched,
        RowPolicy::MarkUsed => mark(source),
        RowPolicy::Delete => match source.delete_row(row) {
            Ok(()) => {
                tracing::info!(row, "deleted used quote");
                RowOutcome::Deleted
            }
            Err(e) => {
                tracing::warn!(row, error = %e, "could not delete quote, marking it instead");
                mark(source)
            }
        },
    }
}

/// Parse a JSON array of row objects carrying `Quote` and `Author` fields.
///
/// Columns are the union of keys over all rows; a row without a value yields an empty string.
pub fn parse_records(value: &Value) -> ReelResult<Vec<Quote>> {
    let rows = value
        .as_array()
        .ok_or_else(|| ReelError::fatal_fetch("quote table must be a JSON array of rows"))?;

    let mut columns = Vec::<&str>::new();
    for row in rows {
        let obj = row
            .as_object()
            .ok_or_else(|| ReelError::fatal_fetch("every quote row must be a JSON object"))?;
        for k in obj.keys() {
            if !columns.contains(&k.as_str()) {
                columns.push(k.as_str());
            }
        }
    }

    let missing: Vec<&str> = [QUOTE_COLUMN, AUTHOR_COLUMN]
        .into_iter()
        .filter(|c| !columns.contains(c))
        .collect();
    if rows.is_empty() {
        return Err(ReelError::fatal_fetch("quote table is empty"));
    }
    if !missing.is_empty() {
        return Err(ReelError::fatal_fetch(format!(
            "missing required columns {missing:?} (available: {columns:?})"
        )));
    }

    Ok(rows
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| Quote {
            text: cell_text(obj, QUOTE_COLUMN),
            author: cell_text(obj, AUTHOR_COLUMN),
        })
        .collect())
}

fn cell_text(obj: &Map<String, Value>, column: &str) -> String {
    match obj.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_owned(),
        Some(other) => other.to_string(),
    }
}

/// Quote table stored as a local JSON records file (spreadsheet export shape).
#[derive(Clone, Debug)]
pub struct JsonTableSource {
    path: PathBuf,
}

impl JsonTableSource {
    /// Source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_rows(&self) -> ReelResult<Vec<Value>> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            ReelError::fatal_fetch(format!("read '{}': {e}", self.path.display()))
        })?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            ReelError::fatal_fetch(format!("parse '{}': {e}", self.path.display()))
        })?;
        match value {
            Value::Array(rows) => Ok(rows),
            _ => Err(ReelError::fatal_fetch(
                "quote table must be a JSON array of rows",
            )),
        }
    }

    fn write_rows(&self, rows: Vec<Value>) -> ReelResult<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let json = serde_json::to_vec_pretty(&Value::Array(rows)).context("serialize quotes")?;
        std::fs::write(&tmp, json).with_context(|| format!("write '{}'", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace '{}'", self.path.display()))?;
        Ok(())
    }

    fn row_bounds(rows: &[Value], row: usize) -> ReelResult<()> {
        if row >= rows.len() {
            return Err(ReelError::validation(format!(
                "quote row {row} out of range (table has {} rows)",
                rows.len()
            )));
        }
        Ok(())
    }
}

impl QuoteSource for JsonTableSource {
    fn fetch(&mut self) -> ReelResult<Vec<Quote>> {
        let rows = self.read_rows()?;
        let quotes = parse_records(&Value::Array(rows))?;
        tracing::info!(count = quotes.len(), path = %self.path.display(), "fetched quotes");
        Ok(quotes)
    }

    fn delete_row(&mut self, row: usize) -> ReelResult<()> {
        let mut rows = self.read_rows()?;
        Self::row_bounds(&rows, row)?;
        rows.remove(row);
        self.write_rows(rows)
    }

    fn mark_used(&mut self, row: usize) -> ReelResult<()> {
        let mut rows = self.read_rows()?;
        Self::row_bounds(&rows, row)?;
        let obj = rows[row]
            .as_object_mut()
            .ok_or_else(|| ReelError::validation(format!("quote row {row} is not an object")))?;
        obj.insert(USED_COLUMN.to_owned(), Value::String("Yes".to_owned()));
        self.write_rows(rows)
    }
}

/// Read-only quote table served as JSON over HTTP.
#[derive(Clone, Debug)]
pub struct HttpTableSource {
    http: Client,
    url: String,
}

impl HttpTableSource {
    /// Source fetching `url`.
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> ReelResult<Self> {
        Ok(Self {
            http: build_client(timeout_secs)?,
            url: url.into(),
        })
    }
}

impl QuoteSource for HttpTableSource {
    fn fetch(&mut self) -> ReelResult<Vec<Quote>> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .map_err(|e| ReelError::fatal_fetch(format!("GET {}: {e}", self.url)))?;
        let response =
            expect_success(response).map_err(|e| ReelError::fatal_fetch(e.to_string()))?;
        let value: Value = response
            .json()
            .map_err(|e| ReelError::fatal_fetch(format!("decode {}: {e}", self.url)))?;
        let quotes = parse_records(&value)?;
        tracing::info!(count = quotes.len(), url = %self.url, "fetched quotes");
        Ok(quotes)
    }

    fn delete_row(&mut self, _row: usize) -> ReelResult<()> {
        Err(ReelError::validation("http quote source is read-only"))
    }

    fn mark_used(&mut self, _row: usize) -> ReelResult<()> {
        Err(ReelError::validation("http quote source is read-only"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sources/quotes.rs"]
mod tests;
