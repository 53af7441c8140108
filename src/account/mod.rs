//! Account management for the ledger.
//!
//! This module contains everything related to accounts:
//! - The [Account] model and its database functions
//! - The balance adjustment helpers used by the ledger operations
//! - The handlers for the account endpoints

mod core;
pub(crate) mod create_endpoint;
mod list_endpoint;

pub use core::{
    Account, adjust_balance, create_account_table, debit_account, get_account,
    map_row_to_account,
};
pub use create_endpoint::create_account_endpoint;
pub use list_endpoint::list_accounts_endpoint;
