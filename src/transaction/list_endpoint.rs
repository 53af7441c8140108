//! Defines the endpoint for listing all transactions.

use axum::{Json, extract::State};

use crate::{
    AppState, Error,
    transaction::query::{PopulatedTransaction, TransactionFilter, get_populated_transactions},
};

/// A route handler for listing all transactions, newest first, with their
/// account references resolved.
pub async fn list_transactions_endpoint(
    State(state): State<AppState>,
) -> Result<Json<Vec<PopulatedTransaction>>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let transactions = get_populated_transactions(&TransactionFilter::default(), &connection)?;

    Ok(Json(transactions))
}
