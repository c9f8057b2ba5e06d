//! Per-category reporting over a user's transactions.

mod aggregate;
mod fetch_endpoint;

pub use aggregate::{CategoryTotal, aggregate_category_totals};
pub use fetch_endpoint::fetch_category_totals_endpoint;
