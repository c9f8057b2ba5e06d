//! Sheet Ledger is a small REST backend for a budgeting client.
//!
//! Users are registered and authenticated against a local SQLite database, while each user's
//! transactions are stored as rows in their own tab of a Google spreadsheet. The data-fetch route
//! aggregates those rows into per-category net totals.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod category;
mod db;
mod endpoints;
mod log_in;
mod logging;
mod password;
mod register_user;
mod routing;
pub mod sheets;
mod transaction;
mod user;

pub use app_state::AppState;
pub use category::{CategoryTotal, aggregate_category_totals};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::PasswordHash;
pub use routing::build_router;
pub use transaction::{TransactionRecord, TransactionType};
pub use user::{NewUser, User, UserID, count_users, create_user, get_user_by_username};

use crate::sheets::SheetError;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username used to register is already taken.
    #[error("the username is already in use")]
    DuplicateUsername,

    /// The password did not match the stored password hash.
    #[error("invalid password")]
    InvalidCredentials,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A request to the spreadsheet service failed.
    #[error("spreadsheet request failed: {0}")]
    Sheets(#[from] SheetError),

    /// The request body was not valid JSON or did not have the expected shape.
    ///
    /// The string is axum's description of the rejection and is only logged.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// Appending transactions to a user's sheet failed.
    ///
    /// The append route answers with its own message for any of its failures.
    #[error("could not add transactions: {0}")]
    AppendFailed(#[source] Box<Error>),
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        Error::InvalidRequestBody(rejection.body_text())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The error message sent with a 500 response.
const INTERNAL_SERVER_ERROR_MSG: &str = "Internal Server Error";

/// The error message sent with a 500 response from the append route.
const APPEND_FAILED_MSG: &str = "Internal server error";

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::DuplicateUsername => (StatusCode::BAD_REQUEST, "User already exists"),
            Error::NotFound => (StatusCode::NOT_FOUND, "User not found"),
            Error::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Incorrect password"),
            Error::AppendFailed(error) => {
                tracing::error!("An unexpected error occurred: {}", error);
                (StatusCode::INTERNAL_SERVER_ERROR, APPEND_FAILED_MSG)
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_MSG)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
