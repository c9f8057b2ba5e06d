//! Implements the `Sheet` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the
//! whole app, top-to-bottom, without using Google Sheets.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use serde_json::Value;

use super::{Row, Sheet, SheetError, first_column};

/// An implementation of the `Sheet` trait that keeps every tab in memory.
///
/// Tabs behave like the real service for the ranges this app uses: appending to or reading from
/// a tab that does not exist is an error, as is creating a tab twice.
#[derive(Debug, Default)]
pub struct InMemorySheet {
    tabs: Mutex<HashMap<String, Vec<Row>>>,
}

impl InMemorySheet {
    /// Create a spreadsheet with no tabs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of all rows in the tab `sheet_name`, or `None` if there is no such tab.
    pub fn rows(&self, sheet_name: &str) -> Option<Vec<Row>> {
        self.lock().ok()?.get(sheet_name).cloned()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<Row>>>, SheetError> {
        self.tabs
            .lock()
            .map_err(|_| SheetError::Request("in-memory spreadsheet lock poisoned".to_owned()))
    }
}

#[async_trait::async_trait]
impl Sheet for InMemorySheet {
    async fn create_sheet(&self, title: &str) -> Result<(), SheetError> {
        let mut tabs = self.lock()?;

        if tabs.contains_key(title) {
            return Err(SheetError::InvalidRange(title.to_owned()));
        }

        tabs.insert(title.to_owned(), Vec::new());
        Ok(())
    }

    async fn append_rows(&self, range: &str, rows: &[Row]) -> Result<(), SheetError> {
        let parsed = ParsedRange::parse(range)?;
        let mut tabs = self.lock()?;

        tabs.get_mut(&parsed.sheet_name)
            .ok_or_else(|| SheetError::InvalidRange(range.to_owned()))?
            .extend(rows.iter().cloned());

        Ok(())
    }

    async fn read_column(&self, range: &str) -> Result<Vec<String>, SheetError> {
        let parsed = ParsedRange::parse(range)?;
        let tabs = self.lock()?;

        let rows = tabs
            .get(&parsed.sheet_name)
            .ok_or_else(|| SheetError::InvalidRange(range.to_owned()))?;

        let cells: Vec<Row> = rows
            .iter()
            .skip(parsed.first_row.saturating_sub(1))
            .map(|row| {
                row.get(parsed.column)
                    .cloned()
                    .map(|cell| vec![cell])
                    .unwrap_or_default()
            })
            .collect();

        Ok(first_column(&cells))
    }
}

/// The parts of an A1 range such as `'alice'!C2:C` that the in-memory sheet understands.
#[derive(Debug, PartialEq)]
struct ParsedRange {
    sheet_name: String,
    /// Zero-based index of the first column.
    column: usize,
    /// One-based index of the first row.
    first_row: usize,
}

impl ParsedRange {
    fn parse(range: &str) -> Result<Self, SheetError> {
        let invalid = || SheetError::InvalidRange(range.to_owned());

        let (sheet_name, cells) = range.rsplit_once('!').ok_or_else(invalid)?;
        let sheet_name = match sheet_name
            .strip_prefix('\'')
            .and_then(|name| name.strip_suffix('\''))
        {
            Some(quoted) => quoted.replace("''", "'"),
            None => sheet_name.to_owned(),
        };

        let start = cells.split(':').next().unwrap_or_default();
        let letters: String = start.chars().take_while(char::is_ascii_uppercase).collect();
        let digits = &start[letters.len()..];

        if letters.is_empty() {
            return Err(invalid());
        }

        let column = letters
            .bytes()
            .fold(0, |acc, letter| acc * 26 + usize::from(letter - b'A' + 1))
            - 1;
        let first_row = if digits.is_empty() {
            1
        } else {
            digits.parse().map_err(|_| invalid())?
        };

        Ok(Self {
            sheet_name,
            column,
            first_row,
        })
    }
}

/// Build a row of text cells.
pub(crate) fn text_row(cells: &[&str]) -> Row {
    cells
        .iter()
        .map(|cell| Value::String((*cell).to_owned()))
        .collect()
}
