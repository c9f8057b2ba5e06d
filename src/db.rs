//! Sets up the application's SQLite database.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, user::create_user_table};

/// Create the all of the database tables for the application.
///
/// Safe to call on an existing database: tables that already exist are left untouched.
///
/// # Errors
/// This function may return an error if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
