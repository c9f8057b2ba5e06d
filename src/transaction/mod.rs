//! Transaction records and the endpoint that appends them to a user's sheet.

mod append_endpoint;
mod core;

pub use append_endpoint::append_transactions_endpoint;
pub(crate) use core::HEADER_ROW;
pub use core::{Amount, TransactionRecord, TransactionType, parse_amount};
