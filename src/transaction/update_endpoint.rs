//! Defines the endpoint for amending a transaction within its edit window.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior, params};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    account::{adjust_balance, get_account},
    database_id::TransactionId,
    transaction::{
        Division, EDIT_WINDOW, Transaction, TransactionKind, get_transaction,
        map_transaction_row, validate_amount, validate_category,
    },
};

/// The request body for updating a transaction.
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionPayload {
    /// The new amount.
    pub amount: f64,
    /// The new category label.
    #[serde(rename = "categoryName")]
    pub category_name: String,
    /// The new division.
    #[serde(rename = "divisionType")]
    pub division_type: Division,
    /// The new description.
    #[serde(rename = "descriptionText", default)]
    pub description_text: Option<String>,
    /// The new effective date.
    #[serde(rename = "transactionDate")]
    pub transaction_date: Date,
}

/// A route handler for updating a transaction's mutable fields.
///
/// Updates are only allowed within twelve hours of the transaction's
/// creation. The owning account's balance is recomputed by removing the old
/// amount's effect and applying the new one.
pub async fn update_transaction_endpoint(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
    Json(payload): Json<UpdateTransactionPayload>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let transaction = update_entry(transaction_id, &payload, &connection)?;

    Ok(Json(transaction))
}

/// Amend the transaction `id`, rebalancing its account in the same database
/// transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - [Error::NonPositiveAmount] if the new amount is zero or negative,
/// - [Error::EmptyCategoryName] if the new category label is empty,
/// - [Error::EditWindowExpired] if the transaction is older than [EDIT_WINDOW],
/// - [Error::TransferEditUnsupported] if the transaction is a transfer,
/// - [Error::AccountNotFound] if the owning account no longer exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn update_entry(
    id: TransactionId,
    payload: &UpdateTransactionPayload,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(payload.amount)?;
    validate_category(&payload.category_name)?;

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let transaction = get_transaction(id, &sql_transaction)?;

    if OffsetDateTime::now_utc() - transaction.created_at > EDIT_WINDOW {
        return Err(Error::EditWindowExpired);
    }

    // Transfers have no rebalancing path, so amending one would break the
    // balance invariant. See DESIGN.md.
    if transaction.kind == TransactionKind::Transfer {
        return Err(Error::TransferEditUnsupported);
    }

    let account = get_account(transaction.from_account, &sql_transaction)?;

    let delta = match transaction.kind {
        TransactionKind::Income => payload.amount - transaction.amount,
        TransactionKind::Expense => transaction.amount - payload.amount,
        TransactionKind::Transfer => unreachable!("transfer updates are rejected above"),
    };
    adjust_balance(account.id, delta, &sql_transaction)?;

    let updated = sql_transaction
        .prepare(
            "UPDATE \"transaction\"
             SET amount = ?1, category = ?2, division = ?3, description = ?4, date = ?5
             WHERE id = ?6
             RETURNING id, kind, amount, category, division, description, from_account, to_account, date, created_at",
        )?
        .query_one(
            params![
                payload.amount,
                payload.category_name,
                payload.division_type,
                payload.description_text,
                payload.transaction_date,
                id,
            ],
            map_transaction_row,
        )?;

    sql_transaction.commit()?;

    Ok(updated)
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
            transfer_endpoint::transfer,
        },
    };

    use super::{UpdateTransactionPayload, update_entry};

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

    fn payload(amount: f64) -> UpdateTransactionPayload {
        UpdateTransactionPayload {
            amount,
            category_name: "updated".to_owned(),
            division_type: Division::Office,
            description_text: Some("corrected".to_owned()),
            transaction_date: date!(2025 - 10 - 06),
        }
    }

    fn age_transaction_by_hours(id: TransactionId, hours: i64, connection: &Connection) {
        let created_at = time::OffsetDateTime::now_utc() - time::Duration::hours(hours);
        connection
            .execute(
                "UPDATE \"transaction\" SET created_at = ?1 WHERE id = ?2",
                params![created_at, id],
            )
            .unwrap();
    }

    #[test]
    fn income_update_rebalances_account() {
        let conn = get_test_connection();
        let account_id = create_test_account(&conn, 100.0);
        let transaction_id = create_test_entry(&conn, TransactionKind::Income, 40.0, account_id);

        let updated = update_entry(transaction_id, &payload(10.0), &conn).unwrap();

        assert_eq!(updated.amount, 10.0);
        assert_eq!(updated.category, "updated");
        assert_eq!(updated.division, Division::Office);
        assert_eq!(updated.date, date!(2025 - 10 - 06));
        // 100 + 40 income, then the income is corrected down to 10.
        assert_eq!(get_account(account_id, &conn).unwrap().balance, 110.0);
    }

    #[test]
    fn expense_update_rebalances_account() {
        let conn = get_test_connection();
        let account_id = create_test_account(&conn, 100.0);
        let transaction_id = create_test_entry(&conn, TransactionKind::Expense, 30.0, account_id);

        update_entry(transaction_id, &payload(50.0), &conn).unwrap();

        // 100 - 30 expense, then the expense is corrected up to 50.
        assert_eq!(get_account(account_id, &conn).unwrap().balance, 50.0);
    }

    #[test]
    fn update_past_edit_window_is_rejected_and_changes_nothing() {
        let conn = get_test_connection();
        let account_id = create_test_account(&conn, 100.0);
        let transaction_id = create_test_entry(&conn, TransactionKind::Income, 40.0, account_id);
        age_transaction_by_hours(transaction_id, 13, &conn);

        let result = update_entry(transaction_id, &payload(10.0), &conn);

        assert_eq!(result, Err(Error::EditWindowExpired));
        assert_eq!(get_account(account_id, &conn).unwrap().balance, 140.0);
    }

    #[test]
    fn update_within_edit_window_is_allowed() {
        let conn = get_test_connection();
        let account_id = create_test_account(&conn, 100.0);
        let transaction_id = create_test_entry(&conn, TransactionKind::Income, 40.0, account_id);
        age_transaction_by_hours(transaction_id, 11, &conn);

        let result = update_entry(transaction_id, &payload(10.0), &conn);

        assert!(result.is_ok());
    }

    #[test]
    fn transfer_update_is_rejected() {
        let conn = get_test_connection();
        let from = create_test_account(&conn, 100.0);
        let to = create_test_account(&conn, 0.0);
        let transaction = transfer(from, to, 25.0, None, date!(2025 - 10 - 05), &conn).unwrap();

        let result = update_entry(transaction.id, &payload(10.0), &conn);

        assert_eq!(result, Err(Error::TransferEditUnsupported));
        assert_eq!(get_account(from, &conn).unwrap().balance, 75.0);
        assert_eq!(get_account(to, &conn).unwrap().balance, 25.0);
    }

    #[test]
    fn negative_amount_update_is_rejected_and_changes_nothing() {
        let conn = get_test_connection();
        let account_id = create_test_account(&conn, 100.0);
        let transaction_id = create_test_entry(&conn, TransactionKind::Income, 40.0, account_id);

        let result = update_entry(transaction_id, &payload(-10.0), &conn);

        assert_eq!(result, Err(Error::NonPositiveAmount));
        assert_eq!(get_account(account_id, &conn).unwrap().balance, 140.0);
    }

    #[test]
    fn empty_category_update_is_rejected() {
        let conn = get_test_connection();
        let account_id = create_test_account(&conn, 100.0);
        let transaction_id = create_test_entry(&conn, TransactionKind::Income, 40.0, account_id);
        let mut payload = payload(10.0);
        payload.category_name = String::new();

        let result = update_entry(transaction_id, &payload, &conn);

        assert_eq!(result, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn missing_transaction_is_rejected() {
        let conn = get_test_connection();

        let result = update_entry(42, &payload(10.0), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }
}
