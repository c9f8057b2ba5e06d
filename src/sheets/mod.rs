//! The spreadsheet service that stores each user's transactions.
//!
//! All tabs live in a single spreadsheet. The [Sheet] trait is the seam between the request
//! handlers and the service: [GoogleSheet] talks to the Google Sheets v4 REST API and
//! [InMemorySheet] keeps the tabs in memory so the whole app can run without Google.

use serde_json::Value;

mod google;
mod in_memory;

pub use google::{GoogleSheet, SPREADSHEETS_SCOPE};
pub use in_memory::InMemorySheet;
pub(crate) use in_memory::text_row;

/// A single row of cell values, written left to right starting at column A.
pub type Row = Vec<Value>;

/// The operations the app needs from the spreadsheet service.
#[async_trait::async_trait]
pub trait Sheet: Send + Sync {
    /// Add a new tab called `title` to the spreadsheet.
    async fn create_sheet(&self, title: &str) -> Result<(), SheetError>;

    /// Append `rows` after the last row of the table found in `range`, e.g. `'alice'!A:E`.
    ///
    /// Rows are inserted (not overwritten) and values are stored as given, without any parsing
    /// by the spreadsheet.
    async fn append_rows(&self, range: &str, rows: &[Row]) -> Result<(), SheetError>;

    /// Read a single column range such as `'alice'!C2:C`.
    ///
    /// Each returned string is the formatted value of one row. Empty cells are returned as empty
    /// strings, and trailing empty rows are not returned.
    async fn read_column(&self, range: &str) -> Result<Vec<String>, SheetError>;
}

/// Errors from the spreadsheet service.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SheetError {
    /// The service account credentials could not be loaded or no access token was issued.
    #[error("could not authenticate with the spreadsheet service: {0}")]
    Auth(String),

    /// The request could not be sent or the response could not be read.
    #[error("request to the spreadsheet service failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request to the spreadsheet service timed out")]
    Timeout,

    /// The service responded with a non-success status code.
    #[error("the spreadsheet service responded with status {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, usually a JSON error description.
        body: String,
    },

    /// The range does not name an existing tab, or the tab being created already exists.
    #[error("invalid range or tab name \"{0}\"")]
    InvalidRange(String),
}

impl From<reqwest::Error> for SheetError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            SheetError::Timeout
        } else {
            SheetError::Request(error.to_string())
        }
    }
}

/// Build an A1 notation range for the tab `sheet_name`, e.g. `a1_range("alice", "C2:C")` gives
/// `'alice'!C2:C`.
///
/// The tab name is always quoted so that names containing spaces or punctuation are valid.
pub fn a1_range(sheet_name: &str, cells: &str) -> String {
    format!("'{}'!{cells}", sheet_name.replace('\'', "''"))
}

/// Convert a cell value returned by the service into the text shown in the spreadsheet.
fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(true) => "TRUE".to_owned(),
        Value::Bool(false) => "FALSE".to_owned(),
        other => other.to_string(),
    }
}

/// Keep the first cell of each row, dropping trailing empty rows.
fn first_column(rows: &[Row]) -> Vec<String> {
    let mut column: Vec<String> = rows
        .iter()
        .map(|row| row.first().map(cell_to_string).unwrap_or_default())
        .collect();

    while column.last().is_some_and(|cell| cell.is_empty()) {
        column.pop();
    }

    column
}

#[cfg(test)]
mod a1_range_tests {
    use serde_json::json;

    use super::{a1_range, first_column};

    #[test]
    fn quotes_sheet_name() {
        assert_eq!(a1_range("alice", "A:E"), "'alice'!A:E");
        assert_eq!(a1_range("my budget", "C2:C"), "'my budget'!C2:C");
    }

    #[test]
    fn escapes_single_quotes() {
        assert_eq!(a1_range("bob's", "A:E"), "'bob''s'!A:E");
    }

    #[test]
    fn first_column_fills_empty_rows_and_drops_trailing_ones() {
        let rows = vec![
            vec![json!("Food")],
            vec![],
            vec![json!(12.5), json!("ignored")],
            vec![json!(true)],
            vec![],
            vec![json!(null)],
        ];

        assert_eq!(first_column(&rows), vec!["Food", "", "12.5", "TRUE"]);
    }
}
