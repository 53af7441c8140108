//! Application router configuration.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    AppState,
    account::{create_account_endpoint, list_accounts_endpoint},
    endpoints,
    transaction::{
        account_transfer_endpoint, create_transaction_endpoint, delete_transaction_endpoint,
        filter_transactions_endpoint, list_transactions_endpoint, transaction_transfer_endpoint,
        update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::ACCOUNTS,
            post(create_account_endpoint).get(list_accounts_endpoint),
        )
        .route(endpoints::ACCOUNT_TRANSFER, post(account_transfer_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            post(create_transaction_endpoint).get(list_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION_TRANSFER,
            post(transaction_transfer_endpoint),
        )
        .route(
            endpoints::TRANSACTION_FILTER,
            get(filter_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .with_state(state)
}
