//! Defines the core data models and database queries for transactions.

use rusqlite::{
    Connection, Row, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::{
    Error,
    database_id::{AccountId, TransactionId},
};

/// The period after creation during which a transaction may be amended.
pub const EDIT_WINDOW: Duration = Duration::hours(12);

/// The category label assigned to every transfer transaction.
pub const TRANSFER_CATEGORY: &str = "transfer";

// ============================================================================
// MODELS
// ============================================================================

/// The kind of monetary event a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned into an account.
    Income,
    /// Money spent from an account.
    Expense,
    /// Money moved from one account to another.
    Transfer,
}

impl TransactionKind {
    fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Transfer => "transfer",
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            "transfer" => Ok(TransactionKind::Transfer),
            other => Err(FromSqlError::Other(
                format!("unknown transaction kind {other:?}").into(),
            )),
        }
    }
}

/// The classification tag used for filtering and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Division {
    /// Office finances.
    Office,
    /// Personal finances.
    Personal,
}

impl Division {
    fn as_str(&self) -> &'static str {
        match self {
            Division::Office => "office",
            Division::Personal => "personal",
        }
    }
}

impl ToSql for Division {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Division {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "office" => Ok(Division::Office),
            "personal" => Ok(Division::Personal),
            other => Err(FromSqlError::Other(
                format!("unknown division {other:?}").into(),
            )),
        }
    }
}

/// A single recorded monetary event affecting one or two accounts.
///
/// To create a new transaction, use one of the [NewTransaction] constructors
/// together with [insert_transaction].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether this transaction is an income, expense or transfer.
    #[serde(rename = "transactionType")]
    pub kind: TransactionKind,
    /// The amount of money moved by this transaction. Always positive; the
    /// kind determines the sign of the balance effect.
    pub amount: f64,
    /// A free-text label used for filtering, e.g. "groceries".
    #[serde(rename = "categoryName")]
    pub category: String,
    /// Whether this is an office or personal transaction.
    #[serde(rename = "divisionType")]
    pub division: Division,
    /// An optional note on what the transaction was for.
    #[serde(rename = "descriptionText")]
    pub description: Option<String>,
    /// The source account: where income lands, and where expenses and
    /// outgoing transfers are drawn from.
    pub from_account: AccountId,
    /// The destination account. Present exactly when the kind is transfer.
    pub to_account: Option<AccountId>,
    /// The user-supplied effective date of the transaction.
    #[serde(rename = "transactionDate")]
    pub date: Date,
    /// When the transaction was recorded. Immutable; the 12-hour edit window
    /// is measured from this instant.
    pub created_at: OffsetDateTime,
}

/// The data needed to record a new transaction.
///
/// The fields are private and only reachable through the [NewTransaction::income],
/// [NewTransaction::expense] and [NewTransaction::transfer] constructors, so a
/// transfer always carries both account references and an income or expense
/// never carries a second one. The constructors also reject non-positive
/// amounts and empty category labels, so no invalid transaction can reach the
/// database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    kind: TransactionKind,
    amount: f64,
    category: String,
    division: Division,
    description: Option<String>,
    from_account: AccountId,
    to_account: Option<AccountId>,
    date: Date,
}

impl NewTransaction {
    /// Money earned into `account`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NonPositiveAmount] if `amount` is zero or negative,
    /// - or [Error::EmptyCategoryName] if `category` is empty.
    pub fn income(
        amount: f64,
        category: &str,
        division: Division,
        description: Option<String>,
        account: AccountId,
        date: Date,
    ) -> Result<Self, Error> {
        validate_amount(amount)?;
        validate_category(category)?;

        Ok(Self {
            kind: TransactionKind::Income,
            amount,
            category: category.to_owned(),
            division,
            description,
            from_account: account,
            to_account: None,
            date,
        })
    }

    /// Money spent from `account`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NonPositiveAmount] if `amount` is zero or negative,
    /// - or [Error::EmptyCategoryName] if `category` is empty.
    pub fn expense(
        amount: f64,
        category: &str,
        division: Division,
        description: Option<String>,
        account: AccountId,
        date: Date,
    ) -> Result<Self, Error> {
        validate_amount(amount)?;
        validate_category(category)?;

        Ok(Self {
            kind: TransactionKind::Expense,
            amount,
            category: category.to_owned(),
            division,
            description,
            from_account: account,
            to_account: None,
            date,
        })
    }

    /// Money moved from `from_account` to `to_account`.
    ///
    /// The category is fixed to [TRANSFER_CATEGORY] and the division defaults
    /// to personal.
    ///
    /// # Errors
    /// This function will return an [Error::NonPositiveAmount] if `amount` is
    /// zero or negative.
    pub fn transfer(
        amount: f64,
        note: Option<String>,
        from_account: AccountId,
        to_account: AccountId,
        date: Date,
    ) -> Result<Self, Error> {
        validate_amount(amount)?;

        Ok(Self {
            kind: TransactionKind::Transfer,
            amount,
            category: TRANSFER_CATEGORY.to_owned(),
            division: Division::Personal,
            description: note,
            from_account,
            to_account: Some(to_account),
            date,
        })
    }
}

/// Check that a transaction amount is strictly positive.
///
/// Amounts are stored unsigned; the transaction kind decides whether the
/// balance goes up or down, so a negative amount would invert that effect.
pub(crate) fn validate_amount(amount: f64) -> Result<(), Error> {
    if amount > 0.0 {
        Ok(())
    } else {
        Err(Error::NonPositiveAmount)
    }
}

/// Check that a category label is not empty.
pub(crate) fn validate_category(category: &str) -> Result<(), Error> {
    if category.trim().is_empty() {
        Err(Error::EmptyCategoryName)
    } else {
        Ok(())
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                division TEXT NOT NULL,
                description TEXT,
                from_account INTEGER NOT NULL REFERENCES account(id),
                to_account INTEGER REFERENCES account(id),
                date TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    // Index for the date-descending listing and range filters.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Insert a new transaction into the database, stamping it with the current
/// UTC time as its creation timestamp.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn insert_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let created_at = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
                (kind, amount, category, division, description, from_account, to_account, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, kind, amount, category, division, description, from_account, to_account, date, created_at",
        )?
        .query_one(
            params![
                new_transaction.kind,
                new_transaction.amount,
                new_transaction.category,
                new_transaction.division,
                new_transaction.description,
                new_transaction.from_account,
                new_transaction.to_account,
                new_transaction.date,
                created_at,
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, kind, amount, category, division, description, from_account, to_account, date, created_at
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let kind = row.get(1)?;
    let amount = row.get(2)?;
    let category = row.get(3)?;
    let division = row.get(4)?;
    let description = row.get(5)?;
    let from_account = row.get(6)?;
    let to_account = row.get(7)?;
    let date = row.get(8)?;
    let created_at = row.get(9)?;

    Ok(Transaction {
        id,
        kind,
        amount,
        category,
        division,
        description,
        from_account,
        to_account,
        date,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
