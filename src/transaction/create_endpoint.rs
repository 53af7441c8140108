//! Defines the endpoint for recording a new income or expense transaction.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    account::{adjust_balance, debit_account, get_account},
    database_id::AccountId,
    transaction::{Division, NewTransaction, Transaction, TransactionKind, insert_transaction},
};

/// The request body for recording an income or expense.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionPayload {
    /// Whether the transaction is an income or an expense.
    #[serde(rename = "transactionType")]
    pub transaction_type: TransactionKind,
    /// The amount of money earned or spent.
    pub amount: f64,
    /// A free-text category label.
    #[serde(rename = "categoryName")]
    pub category_name: String,
    /// Office or personal.
    #[serde(rename = "divisionType")]
    pub division_type: Division,
    /// An optional note.
    #[serde(rename = "descriptionText", default)]
    pub description_text: Option<String>,
    /// The account the money is earned into or spent from.
    #[serde(rename = "accountId")]
    pub account_id: AccountId,
    /// The effective date of the transaction.
    #[serde(rename = "transactionDate")]
    pub transaction_date: Date,
}

/// A route handler for recording an income or expense against an account.
///
/// The balance adjustment and the transaction insert happen inside a single
/// database transaction, so no partial effect is ever visible.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionPayload>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let transaction = create_entry(&payload, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Record an income or expense, adjusting the account balance in lockstep.
///
/// # Errors
/// This function will return a:
/// - [Error::AccountNotFound] if the account does not exist,
/// - [Error::NonPositiveAmount] if the amount is zero or negative,
/// - [Error::EmptyCategoryName] if the category label is empty,
/// - [Error::InsufficientFunds] if an expense exceeds the account's balance,
/// - [Error::TransferViaCreate] if the payload carries the transfer kind,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn create_entry(
    payload: &CreateTransactionPayload,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let account = get_account(payload.account_id, &sql_transaction)?;

    // Build the record before touching the balance so an invalid payload is
    // rejected without any side effect.
    let new_transaction = match payload.transaction_type {
        TransactionKind::Income => NewTransaction::income(
            payload.amount,
            &payload.category_name,
            payload.division_type,
            payload.description_text.clone(),
            account.id,
            payload.transaction_date,
        )?,
        TransactionKind::Expense => NewTransaction::expense(
            payload.amount,
            &payload.category_name,
            payload.division_type,
            payload.description_text.clone(),
            account.id,
            payload.transaction_date,
        )?,
        TransactionKind::Transfer => return Err(Error::TransferViaCreate),
    };

    match payload.transaction_type {
        TransactionKind::Income => adjust_balance(account.id, payload.amount, &sql_transaction)?,
        TransactionKind::Expense => debit_account(account.id, payload.amount, &sql_transaction)?,
        TransactionKind::Transfer => unreachable!("rejected above"),
    }

    let transaction = insert_transaction(new_transaction, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(transaction)
}
