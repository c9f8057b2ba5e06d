//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{Error, PasswordHash, db::initialize, sheets::Sheet};

/// The state of the REST server.
///
/// Constructed once at startup and shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The spreadsheet that holds each user's transactions.
    pub sheet: Arc<dyn Sheet>,

    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection and a spreadsheet client.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// Passwords are hashed with [PasswordHash::DEFAULT_COST].
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, sheet: Arc<dyn Sheet>) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            sheet,
            password_cost: PasswordHash::DEFAULT_COST,
        })
    }

    /// Set the bcrypt cost for hashing new passwords.
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }
}

/// The state needed by the routes that only talk to the spreadsheet.
#[derive(Clone)]
pub struct SheetState {
    /// The spreadsheet that holds each user's transactions.
    pub sheet: Arc<dyn Sheet>,
}

impl FromRef<AppState> for SheetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            sheet: state.sheet.clone(),
        }
    }
}
