//! Database initialization for the application's domain models.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    account::create_account_table, transaction::create_transaction_table,
};

/// Create the tables for the domain models in the database.
///
/// All tables are created within a single exclusive transaction so that a
/// partially initialized schema is never visible.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_account_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()
}
