//! Tally is a small ledger backend for tracking office and personal finances.
//!
//! This library provides a REST API for creating accounts and recording
//! income, expense and transfer transactions against them. Account balances
//! are kept in lockstep with the transaction records: every create, update
//! and delete adjusts the affected balances inside a single database
//! transaction.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod account;
mod app_state;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod routing;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The account referenced by a transaction does not exist.
    #[error("Account not found")]
    AccountNotFound,

    /// One or both sides of a transfer refer to accounts that do not exist.
    #[error("One or both accounts not found")]
    AccountsNotFound,

    /// An expense or transfer would take the source account's balance below
    /// zero.
    #[error("Insufficient balance")]
    InsufficientFunds,

    /// An update was attempted more than twelve hours after the transaction
    /// was created.
    #[error("Edit window expired (12 hours)")]
    EditWindowExpired,

    /// A transfer was submitted to the income/expense creation endpoint.
    ///
    /// Transfers touch two balances and must go through the transfer
    /// endpoints so both sides are recorded.
    #[error("Transfers must be created via the transfer endpoints")]
    TransferViaCreate,

    /// A transaction was submitted with a zero or negative amount.
    #[error("Amount must be a positive number")]
    NonPositiveAmount,

    /// An empty string was given as an account name.
    #[error("Account name cannot be empty")]
    EmptyAccountName,

    /// An empty string was given as a transaction category.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// An update was attempted on a transfer transaction.
    ///
    /// There is no rebalancing path for transfers, so amending one would
    /// silently break the balance invariant. See DESIGN.md.
    #[error("Transfer transactions cannot be edited")]
    TransferEditUnsupported,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::NotFound | Error::AccountNotFound | Error::AccountsNotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            Error::InsufficientFunds
            | Error::EditWindowExpired
            | Error::NonPositiveAmount
            | Error::EmptyAccountName
            | Error::EmptyCategoryName
            | Error::TransferViaCreate
            | Error::TransferEditUnsupported => (StatusCode::BAD_REQUEST, self.to_string()),
            // Store failures are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
