//! Defines the endpoint for filtering transactions.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    transaction::Division,
    transaction::query::{PopulatedTransaction, TransactionFilter, get_populated_transactions},
};

/// The query parameters accepted by the filter endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    /// Only return transactions with this division.
    pub division: Option<Division>,
    /// Only return transactions with exactly this category.
    pub category: Option<String>,
    /// The inclusive lower bound on the effective date.
    #[serde(rename = "startDate")]
    pub start_date: Option<Date>,
    /// The inclusive upper bound on the effective date.
    #[serde(rename = "endDate")]
    pub end_date: Option<Date>,
}

impl From<FilterParams> for TransactionFilter {
    fn from(params: FilterParams) -> Self {
        TransactionFilter {
            division: params.division,
            category: params.category,
            // The date range only activates when both bounds were supplied.
            date_range: params.start_date.zip(params.end_date),
        }
    }
}

/// A route handler for filtering transactions by division, category and date
/// range. Criteria that match nothing yield an empty array, not an error.
pub async fn filter_transactions_endpoint(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<PopulatedTransaction>>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let transactions = get_populated_transactions(&params.into(), &connection)?;

    Ok(Json(transactions))
}
