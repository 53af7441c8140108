//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The [Transaction] model, the [TransactionKind] and [Division] variants,
//!   and the validating [NewTransaction] constructors
//! - Database functions for storing, querying and filtering transactions
//! - The handlers for the transaction endpoints, which keep account balances
//!   in lockstep with every create, update, delete and transfer

mod core;
pub(crate) mod create_endpoint;
mod delete_endpoint;
mod filter_endpoint;
mod list_endpoint;
pub(crate) mod query;
pub(crate) mod transfer_endpoint;
mod update_endpoint;

pub use core::{
    Division, EDIT_WINDOW, NewTransaction, TRANSFER_CATEGORY, Transaction, TransactionKind,
    create_transaction_table, get_transaction, insert_transaction, map_transaction_row,
};
pub(crate) use core::{validate_amount, validate_category};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use filter_endpoint::filter_transactions_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use query::{PopulatedTransaction, TransactionFilter};
pub use transfer_endpoint::{account_transfer_endpoint, transaction_transfer_endpoint};
pub use update_endpoint::update_transaction_endpoint;
