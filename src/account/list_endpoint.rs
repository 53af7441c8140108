//! Defines the endpoint for listing all accounts.

use axum::{Json, extract::State};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, map_row_to_account},
};

/// A route handler for listing all accounts in natural store order.
pub async fn list_accounts_endpoint(
    State(state): State<AppState>,
) -> Result<Json<Vec<Account>>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let accounts = get_all_accounts(&connection)?;

    Ok(Json(accounts))
}

/// Get all accounts from the database.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare("SELECT id, name, balance FROM account")?
        .query_map([], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::SqlError))
        .collect()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        account::create_endpoint::{CreateAccountPayload, create_account},
        db::initialize,
    };

    use super::get_all_accounts;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn returns_empty_list_for_no_accounts() {
        let conn = get_test_connection();

        let accounts = get_all_accounts(&conn).unwrap();

        assert!(accounts.is_empty());
    }

    #[test]
    fn returns_all_accounts() {
        let conn = get_test_connection();
        let names = ["Checking", "Savings", "Office float"];
        for name in names {
            create_account(
                &CreateAccountPayload {
                    account_name: name.to_owned(),
                    opening_balance: None,
                },
                &conn,
            )
            .unwrap();
        }

        let accounts = get_all_accounts(&conn).unwrap();

        assert_eq!(accounts.len(), names.len());
        for (account, name) in accounts.iter().zip(names) {
            assert_eq!(account.name, name);
        }
    }
}
