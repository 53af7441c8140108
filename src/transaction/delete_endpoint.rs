//! Defines the endpoint for deleting a transaction.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior, params};
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    account::adjust_balance,
    database_id::TransactionId,
    transaction::{TransactionKind, get_transaction},
};

/// A route handler for deleting a transaction, returns a confirmation message.
///
/// The transaction's balance effect is reversed on its source account before
/// the record is removed. If the account no longer exists the transaction is
/// deleted anyway without a balance correction.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    delete_entry(transaction_id, &connection)?;

    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}

/// Delete the transaction `id`, reversing its balance effect best-effort.
///
/// Income is subtracted back off the source account and expenses are added
/// back. Transfers are removed without touching either balance, matching the
/// behavior this ledger replaces.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn delete_entry(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let transaction = get_transaction(id, &sql_transaction)?;

    let reversal = match transaction.kind {
        TransactionKind::Income => Some(-transaction.amount),
        TransactionKind::Expense => Some(transaction.amount),
        TransactionKind::Transfer => None,
    };

    if let Some(delta) = reversal {
        match adjust_balance(transaction.from_account, delta, &sql_transaction) {
            // Best-effort: a missing account does not block the deletion.
            Ok(()) | Err(Error::AccountNotFound) => {}
            Err(error) => return Err(error),
        }
    }

    sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1",
        params![id],
    )?;
    sql_transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::{Connection, params};
    use time::macros::date;

    use crate::{
        Error,
        account::{
            create_endpoint::{CreateAccountPayload, create_account},
            get_account,
        },
        database_id::TransactionId,
        db::initialize,
        transaction::{
            Division, TransactionKind,
            create_endpoint::{CreateTransactionPayload, create_entry},
            get_transaction,
            transfer_endpoint::transfer,
        },
    };

    use super::delete_entry;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn create_test_account(conn: &Connection, balance: f64) -> i64 {
        create_account(
            &CreateAccountPayload {
                account_name: "test account".to_owned(),
                opening_balance: Some(balance),
            },
            conn,
        )
        .unwrap()
        .id
    }

    fn create_test_entry(
        conn: &Connection,
        kind: TransactionKind,
        amount: f64,
        account_id: i64,
    ) -> TransactionId {
        create_entry(
            &CreateTransactionPayload {
                transaction_type: kind,
                amount,
                category_name: "misc".to_owned(),
                division_type: Division::Personal,
                description_text: None,
                account_id,
                transaction_date: date!(2025 - 10 - 05),
            },
            conn,
        )
        .unwrap()
        .id
    }

    #[test]
    fn deleting_an_income_subtracts_its_amount() {
        let conn = get_test_connection();
        let account_id = create_test_account(&conn, 100.0);
        let transaction_id = create_test_entry(&conn, TransactionKind::Income, 40.0, account_id);

        delete_entry(transaction_id, &conn).unwrap();

        assert_eq!(get_account(account_id, &conn).unwrap().balance, 100.0);
        assert_eq!(get_transaction(transaction_id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn deleting_an_expense_restores_its_amount() {
        let conn = get_test_connection();
        let account_id = create_test_account(&conn, 100.0);
        let transaction_id = create_test_entry(&conn, TransactionKind::Expense, 30.0, account_id);
        assert_eq!(get_account(account_id, &conn).unwrap().balance, 70.0);

        delete_entry(transaction_id, &conn).unwrap();

        assert_eq!(get_account(account_id, &conn).unwrap().balance, 100.0);
    }

    #[test]
    fn deleting_a_transfer_leaves_balances_as_they_are() {
        let conn = get_test_connection();
        let from = create_test_account(&conn, 100.0);
        let to = create_test_account(&conn, 0.0);
        let transaction = transfer(from, to, 25.0, None, date!(2025 - 10 - 05), &conn).unwrap();

        delete_entry(transaction.id, &conn).unwrap();

        assert_eq!(get_account(from, &conn).unwrap().balance, 75.0);
        assert_eq!(get_account(to, &conn).unwrap().balance, 25.0);
        assert_eq!(get_transaction(transaction.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn missing_account_does_not_block_deletion() {
        let conn = get_test_connection();
        let account_id = create_test_account(&conn, 100.0);
        let transaction_id = create_test_entry(&conn, TransactionKind::Income, 40.0, account_id);
        // Accounts are never deleted through the API, so remove the row
        // directly to simulate a dangling reference. Foreign key checks must
        // be turned off first or SQLite refuses the delete.
        conn.pragma_update(None, "foreign_keys", false).unwrap();
        conn.execute("DELETE FROM account WHERE id = ?1", params![account_id])
            .unwrap();

        delete_entry(transaction_id, &conn).unwrap();

        assert_eq!(get_transaction(transaction_id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn deleting_a_missing_transaction_returns_not_found() {
        let conn = get_test_connection();

        assert_eq!(delete_entry(42, &conn), Err(Error::NotFound));
    }
}
