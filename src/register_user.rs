//! The endpoint for registering a new user and creating their sheet.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash,
    sheets::{Sheet, a1_range, text_row},
    transaction::HEADER_ROW,
    user::{NewUser, User, create_user, get_user_by_username},
};

/// The state needed for creating a new user.
#[derive(Clone)]
pub struct RegistrationState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The spreadsheet that holds every user's sheet.
    pub sheet: Arc<dyn Sheet>,
    /// The bcrypt cost used when hashing the new password.
    pub password_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            sheet: state.sheet.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The registration request body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    /// The username to register.
    pub name: String,
    /// The plain text password, hashed before it is stored.
    pub password: String,
    /// The title of the spreadsheet tab to create for the user.
    pub sheet_name: String,
    /// Whether the client has already created the sheet.
    #[serde(default)]
    pub sheet_created: bool,
}

/// Register a new user, then create their sheet with a header row.
///
/// The user is saved before the sheet is created. If creating the sheet fails the user stays
/// registered and the client gets an internal server error.
///
/// # Errors
///
/// Returns [Error::InvalidRequestBody] if the body is missing a field and
/// [Error::DuplicateUsername] if the name is taken. Database, hashing and spreadsheet
/// failures are returned as their respective errors and are reported to the client as internal
/// server errors.
pub async fn register_user(
    State(state): State<RegistrationState>,
    user_data: Result<Json<RegisterForm>, JsonRejection>,
) -> Result<Json<User>, Error> {
    let Json(user_data) = user_data?;
    tracing::info!("Attempting to create a new user: {}", user_data.name);

    {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_username(&user_data.name, &connection) {
            Ok(_) => {
                tracing::warn!("User already exists: {}", user_data.name);
                return Err(Error::DuplicateUsername);
            }
            Err(Error::NotFound) => {}
            Err(error) => return Err(error),
        }
    }

    let password_hash = PasswordHash::new(&user_data.password, state.password_cost)
        .inspect_err(|e| tracing::error!("an error occurred while hashing a password: {e}"))?;

    // A concurrent registration of the same name is caught by the UNIQUE constraint.
    let user = create_user(
        NewUser {
            username: user_data.name,
            password_hash,
            sheet_name: user_data.sheet_name,
            sheet_created: user_data.sheet_created,
        },
        &*state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?,
    )?;

    tracing::info!("Created new user: {}", user.username);

    state.sheet.create_sheet(&user.sheet_name).await?;
    state
        .sheet
        .append_rows(&a1_range(&user.sheet_name, "A:E"), &[text_row(&HEADER_ROW)])
        .await?;

    tracing::info!(
        "Sheet created and initial row added for: {}",
        user.sheet_name
    );

    Ok(Json(user))
}
