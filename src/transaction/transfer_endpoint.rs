//! Defines the endpoints for transferring money between two accounts.
//!
//! The API exposes two entry points, one scoped under accounts and one under
//! transactions. They differ only in the name of the date field in the
//! request body and share the same transfer operation.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    account::{adjust_balance, debit_account, get_account},
    database_id::AccountId,
    transaction::{NewTransaction, Transaction, insert_transaction},
};

/// The request body for the account-scoped transfer endpoint.
#[derive(Debug, Deserialize)]
pub struct AccountTransferPayload {
    /// The account to debit.
    #[serde(rename = "fromAccountId")]
    pub from_account_id: AccountId,
    /// The account to credit.
    #[serde(rename = "toAccountId")]
    pub to_account_id: AccountId,
    /// The amount to move.
    #[serde(rename = "transferAmount")]
    pub transfer_amount: f64,
    /// An optional note.
    #[serde(default)]
    pub note: Option<String>,
    /// The effective date of the transfer.
    pub date: Date,
}

/// The request body for the transaction-scoped transfer endpoint.
///
/// Same fields as [AccountTransferPayload] except the date field is named
/// `transactionDate`.
#[derive(Debug, Deserialize)]
pub struct TransactionTransferPayload {
    /// The account to debit.
    #[serde(rename = "fromAccountId")]
    pub from_account_id: AccountId,
    /// The account to credit.
    #[serde(rename = "toAccountId")]
    pub to_account_id: AccountId,
    /// The amount to move.
    #[serde(rename = "transferAmount")]
    pub transfer_amount: f64,
    /// An optional note.
    #[serde(default)]
    pub note: Option<String>,
    /// The effective date of the transfer.
    #[serde(rename = "transactionDate")]
    pub date: Date,
}

/// A route handler for the account-scoped transfer endpoint.
pub async fn account_transfer_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<AccountTransferPayload>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let transaction = transfer(
        payload.from_account_id,
        payload.to_account_id,
        payload.transfer_amount,
        payload.note,
        payload.date,
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for the transaction-scoped transfer endpoint.
pub async fn transaction_transfer_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<TransactionTransferPayload>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let transaction = transfer(
        payload.from_account_id,
        payload.to_account_id,
        payload.transfer_amount,
        payload.note,
        payload.date,
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Move `amount` from `from_account` to `to_account` and record one transfer
/// transaction carrying both references.
///
/// The debit, the credit and the insert happen inside a single database
/// transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::AccountsNotFound] if either account does not exist,
/// - [Error::NonPositiveAmount] if `amount` is zero or negative,
/// - [Error::InsufficientFunds] if the source balance is less than `amount`,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn transfer(
    from_account: AccountId,
    to_account: AccountId,
    amount: f64,
    note: Option<String>,
    date: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let missing_to_accounts_error = |error| match error {
        Error::AccountNotFound => Error::AccountsNotFound,
        error => error,
    };
    let source = get_account(from_account, &sql_transaction).map_err(missing_to_accounts_error)?;
    let destination =
        get_account(to_account, &sql_transaction).map_err(missing_to_accounts_error)?;

    // Build the record before touching either balance so an invalid amount is
    // rejected without any side effect.
    let new_transaction = NewTransaction::transfer(amount, note, source.id, destination.id, date)?;

    debit_account(source.id, amount, &sql_transaction)?;
    adjust_balance(destination.id, amount, &sql_transaction)?;

    let transaction = insert_transaction(new_transaction, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(transaction)
}
