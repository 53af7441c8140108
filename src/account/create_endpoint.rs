//! Defines the endpoint for creating a new account.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, params};
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{Account, map_row_to_account},
};

/// The request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountPayload {
    /// The name for the new account.
    #[serde(rename = "accountName")]
    pub account_name: String,
    /// The balance to start the account with. Defaults to zero.
    #[serde(rename = "openingBalance", default)]
    pub opening_balance: Option<f64>,
}

/// A route handler for creating a new account, returns the created account.
pub async fn create_account_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountPayload>,
) -> Result<(StatusCode, Json<Account>), Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let account = create_account(&payload, &connection)?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Insert a new account with the name and opening balance from `payload`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyAccountName] if the name is empty,
/// - or [Error::SqlError] if there is an SQL error.
pub fn create_account(
    payload: &CreateAccountPayload,
    connection: &Connection,
) -> Result<Account, Error> {
    if payload.account_name.trim().is_empty() {
        return Err(Error::EmptyAccountName);
    }

    let account = connection
        .prepare(
            "INSERT INTO account (name, balance) VALUES (?1, ?2)
             RETURNING id, name, balance",
        )?
        .query_one(
            params![
                payload.account_name,
                payload.opening_balance.unwrap_or(0.0)
            ],
            map_row_to_account,
        )?;

    Ok(account)
}
