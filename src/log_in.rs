//! This file defines the route for handling log-in requests.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    user::{User, get_user_by_username},
};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data sent by the client to log in.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInData {
    /// The username to log in as.
    pub user_id: String,
    /// The plain text password to check against the stored hash.
    pub password: String,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request the user's details are returned.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The body is not valid log-in data ([Error::InvalidRequestBody]).
/// - The username does not belong to a registered user ([Error::NotFound]).
/// - The password is not correct ([Error::InvalidCredentials]).
/// - An internal error occurred when verifying the password.
pub async fn post_log_in(
    State(state): State<LoginState>,
    user_data: Result<Json<LogInData>, JsonRejection>,
) -> Result<Json<User>, Error> {
    let Json(user_data) = user_data?;
    let username = &user_data.user_id;
    tracing::info!("Attempting login for user: {username}");

    let user = get_user_by_username(
        username,
        &*state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?,
    )
    .inspect_err(|error| match error {
        Error::NotFound => tracing::warn!("User not found: {username}"),
        error => tracing::error!("Unhandled error while verifying credentials: {error}"),
    })?;

    let is_password_valid = user.password_hash.verify(&user_data.password).map_err(|error| {
        tracing::error!("Unhandled error while verifying credentials: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_password_valid {
        tracing::warn!("Incorrect password for user: {username}");
        return Err(Error::InvalidCredentials);
    }

    tracing::info!("Login successful for user: {username}");

    Ok(Json(user))
}
