//! Defines the core data model and database queries for accounts.

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::AccountId};

/// A named balance-holding entity, e.g. a bank account or a cash box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The name of the account.
    pub name: String,
    /// The current balance.
    ///
    /// This is kept equal to the sum of signed effects of all non-deleted
    /// transactions referencing the account: income and incoming transfers
    /// add, expenses and outgoing transfers subtract.
    pub balance: f64,
}

/// Create the account table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            balance REAL NOT NULL DEFAULT 0
        )",
        (),
    )?;

    Ok(())
}

/// Map a database row to an [Account].
pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let name = row.get(1)?;
    let balance = row.get(2)?;

    Ok(Account { id, name, balance })
}

/// Retrieve an account from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::AccountNotFound] if `id` does not refer to a valid account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .query_one(
            "SELECT id, name, balance FROM account WHERE id = ?1",
            params![id],
            map_row_to_account,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::AccountNotFound,
            error => error.into(),
        })
}

/// Add `delta` (which may be negative) to the balance of account `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::AccountNotFound] if `id` does not refer to a valid account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn adjust_balance(id: AccountId, delta: f64, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2",
        params![delta, id],
    )?;

    if rows_affected == 0 {
        return Err(Error::AccountNotFound);
    }

    Ok(())
}

/// Subtract `amount` from the balance of account `id`, refusing to take the
/// balance below zero.
///
/// The existence check and the balance floor are folded into a single
/// conditional UPDATE so the debit cannot race a concurrent write. The caller
/// must have already established that the account exists: zero rows affected
/// is reported as [Error::InsufficientFunds].
pub fn debit_account(id: AccountId, amount: f64, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE account SET balance = balance - ?1 WHERE id = ?2 AND balance >= ?1",
        params![amount, id],
    )?;

    if rows_affected == 0 {
        return Err(Error::InsufficientFunds);
    }

    Ok(())
}
