//! Transaction records as sent by the client and stored as spreadsheet rows.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sheets::Row;

/// The header row written to a new user's sheet. The columns of every transaction row follow
/// this order.
pub(crate) const HEADER_ROW: [&str; 5] = ["Date", "Detail", "Category", "Amount", "Type"];

/// Whether money came in or went out.
///
/// Labels are matched exactly and case-sensitively against `"Credit"` and `"Debit"`. Any other
/// label is unrecognized: [TransactionType::parse] returns `None` and the row does not contribute
/// to credit or debit totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money received.
    Credit,
    /// Money spent.
    Debit,
}

impl TransactionType {
    /// Parse a type label, returning `None` for unrecognized labels.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Credit" => Some(Self::Credit),
            "Debit" => Some(Self::Debit),
            _ => None,
        }
    }
}

/// A transaction amount as it arrives from the client: either a JSON number or numeric text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Amount {
    /// A JSON number, e.g. `12.5`.
    Number(f64),
    /// Text that should contain a number, e.g. `"12.5"`.
    Text(String),
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Text(String::new())
    }
}

impl Amount {
    /// The numeric value, or `None` if the text is not a number.
    pub fn value(&self) -> Option<f64> {
        match self {
            Amount::Number(number) => Some(*number),
            Amount::Text(text) => parse_amount(text).filter(|_| !text.trim().is_empty()),
        }
    }
}

/// A single transaction submitted by the client.
///
/// Missing fields are treated as empty so that one sloppy row does not reject the whole batch.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionRecord {
    /// The date of the transaction, stored as the client formatted it.
    pub date: String,
    /// A description of the transaction.
    pub transaction_detail: String,
    /// The category used to group the transaction in reports.
    pub category: String,
    /// How much money moved.
    pub amount: Amount,
    /// `"Credit"` or `"Debit"`, stored verbatim.
    pub debit_credit: String,
}

impl TransactionRecord {
    /// The parsed transaction type, if the label is recognized.
    pub fn transaction_type(&self) -> Option<TransactionType> {
        TransactionType::parse(&self.debit_credit)
    }

    /// Convert the record into a spreadsheet row in [HEADER_ROW] order.
    ///
    /// The amount is written as a number. An amount that is not a number is written as an empty
    /// cell.
    pub fn into_row(self) -> Row {
        let amount = self
            .amount
            .value()
            .map(Value::from)
            .unwrap_or(Value::Null);

        vec![
            Value::String(self.date),
            Value::String(self.transaction_detail),
            Value::String(self.category),
            amount,
            Value::String(self.debit_credit),
        ]
    }
}

/// Parse the text of an amount cell.
///
/// Surrounding whitespace is ignored and empty text is zero. Returns `None` if the text is not a
/// finite number.
pub fn parse_amount(text: &str) -> Option<f64> {
    let text = text.trim();

    if text.is_empty() {
        return Some(0.0);
    }

    text.parse::<f64>().ok().filter(|amount| amount.is_finite())
}
