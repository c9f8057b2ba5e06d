//! The API endpoints URIs.
//!
//! Endpoints that take a parameter, e.g. '/fetch-data/{username}', use axum's path syntax.

/// The route for registering a new user.
pub const NEW_USER: &str = "/newUser";
/// The route for logging in a user.
pub const LOG_IN: &str = "/login";
/// The route for getting a user's net totals per category.
pub const FETCH_DATA: &str = "/fetch-data/{username}";
/// The route for appending transactions to a user's sheet.
pub const SHEETS: &str = "/sheets/{username}";
