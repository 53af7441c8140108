//! Database query helpers for listing and filtering transactions.

use rusqlite::{Connection, Row, types::ToSql};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    account::Account,
    database_id::TransactionId,
    transaction::{Division, TransactionKind},
};

/// A transaction with its account references resolved to full account data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedTransaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether this transaction is an income, expense or transfer.
    #[serde(rename = "transactionType")]
    pub kind: TransactionKind,
    /// The amount of money moved by this transaction.
    pub amount: f64,
    /// A free-text label used for filtering.
    #[serde(rename = "categoryName")]
    pub category: String,
    /// Whether this is an office or personal transaction.
    #[serde(rename = "divisionType")]
    pub division: Division,
    /// An optional note on what the transaction was for.
    #[serde(rename = "descriptionText")]
    pub description: Option<String>,
    /// The source account, if it still exists.
    pub from_account: Option<Account>,
    /// The destination account for transfers, if it still exists.
    pub to_account: Option<Account>,
    /// The user-supplied effective date of the transaction.
    #[serde(rename = "transactionDate")]
    pub date: Date,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

/// The criteria for narrowing down a transaction listing.
///
/// All fields are optional; the default filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only return transactions with this division.
    pub division: Option<Division>,
    /// Only return transactions with exactly this category.
    pub category: Option<String>,
    /// Only return transactions whose effective date falls in this inclusive
    /// range. The range only applies when both bounds were supplied.
    pub date_range: Option<(Date, Date)>,
}

/// Get the transactions matching `filter`, ordered by effective date
/// descending, with both account references resolved.
///
/// Transactions are sorted by date, and then ID to keep the order stable
/// after updates.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn get_populated_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<PopulatedTransaction>, Error> {
    let mut where_clauses: Vec<&str> = Vec::new();
    let mut params: Vec<&dyn ToSql> = Vec::new();

    if let Some(division) = &filter.division {
        where_clauses.push("t.division = ?");
        params.push(division);
    }

    if let Some(category) = &filter.category {
        where_clauses.push("t.category = ?");
        params.push(category);
    }

    if let Some((start, end)) = &filter.date_range {
        where_clauses.push("t.date BETWEEN ? AND ?");
        params.push(start);
        params.push(end);
    }

    let where_clause = if where_clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {} ", where_clauses.join(" AND "))
    };

    let query = format!(
        "SELECT t.id, t.kind, t.amount, t.category, t.division, t.description, t.date, t.created_at, \
            source.id, source.name, source.balance, \
            destination.id, destination.name, destination.balance \
        FROM \"transaction\" t \
        LEFT JOIN account source ON t.from_account = source.id \
        LEFT JOIN account destination ON t.to_account = destination.id \
        {where_clause}\
        ORDER BY t.date DESC, t.id ASC"
    );

    connection
        .prepare(&query)?
        .query_map(&params[..], map_populated_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

fn map_populated_transaction_row(row: &Row) -> Result<PopulatedTransaction, rusqlite::Error> {
    let from_account = map_joined_account(row, 8)?;
    let to_account = map_joined_account(row, 11)?;

    Ok(PopulatedTransaction {
        id: row.get(0)?,
        kind: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        division: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
        from_account,
        to_account,
    })
}

// The joined account columns are all NULL when the reference itself was NULL
// or the account row is gone.
fn map_joined_account(row: &Row, offset: usize) -> Result<Option<Account>, rusqlite::Error> {
    let id: Option<i64> = row.get(offset)?;

    match id {
        Some(id) => Ok(Some(Account {
            id,
            name: row.get(offset + 1)?,
            balance: row.get(offset + 2)?,
        })),
        None => Ok(None),
    }
}
