//! Defines the core data models and database queries for transactions.

use std::str::FromStr;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{CategoryId, CreditCardId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction brings money in or takes money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. a supermarket purchase.
    Expense,
}

impl TransactionKind {
    /// The string stored in the database for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("{other} is not a valid transaction kind")),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// How a transaction was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// A debit card.
    Debit,
    /// A credit card.
    Credit,
    /// An instant account-to-account transfer.
    InstantTransfer,
    /// A regular bank transfer.
    BankTransfer,
}

impl PaymentMethod {
    /// The string stored in the database for this payment method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Debit => "debit",
            PaymentMethod::Credit => "credit",
            PaymentMethod::InstantTransfer => "instant_transfer",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "cash" => Ok(PaymentMethod::Cash),
            "debit" => Ok(PaymentMethod::Debit),
            "credit" => Ok(PaymentMethod::Credit),
            "instant_transfer" => Ok(PaymentMethod::InstantTransfer),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(format!("{other} is not a valid payment method")),
        }
    }
}

impl ToSql for PaymentMethod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for PaymentMethod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// A transaction may stand alone, be one installment of a purchase split
/// across months, or be a member of a recurring series. Installment and
/// recurrence members are linked by [Transaction::parent_transaction_id]:
/// the first member of a group has no parent and every later member points
/// at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned in this transaction.
    ///
    /// Always positive; [Transaction::kind] carries the direction.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// How the transaction was paid.
    pub payment_method: Option<PaymentMethod>,
    /// The ID of the credit card the transaction was charged to.
    ///
    /// Present only for credit-card expenses.
    pub credit_card_id: Option<CreditCardId>,
    /// How many installments the original purchase was split into.
    pub installments: i64,
    /// The 1-based position of this row within its installment set.
    pub installment_number: i64,
    /// The ID of the first member of this row's group, absent on the first
    /// member itself and on standalone transactions.
    pub parent_transaction_id: Option<TransactionId>,
    /// Whether this transaction is part of a recurring series.
    pub is_recurring: bool,
}

/// The fields of a single transaction row to insert.
///
/// Used by the group expander and the occurrence endpoint; not part of the
/// HTTP surface.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewTransactionRow {
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned, always positive.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// How the transaction was paid.
    pub payment_method: Option<PaymentMethod>,
    /// The ID of the credit card the transaction was charged to.
    pub credit_card_id: Option<CreditCardId>,
    /// How many installments the original purchase was split into.
    pub installments: i64,
    /// The 1-based position of this row within its installment set.
    pub installment_number: i64,
    /// The ID of the first member of this row's group.
    pub parent_transaction_id: Option<TransactionId>,
    /// Whether this transaction is part of a recurring series.
    pub is_recurring: bool,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub(crate) const TRANSACTION_COLUMNS: &str = "id, description, amount, date, kind, category_id, \
     payment_method, credit_card_id, installments, installment_number, parent_transaction_id, \
     is_recurring";

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                kind TEXT NOT NULL,
                category_id INTEGER,
                payment_method TEXT,
                credit_card_id INTEGER,
                installments INTEGER NOT NULL DEFAULT 1,
                installment_number INTEGER NOT NULL DEFAULT 1,
                parent_transaction_id INTEGER,
                is_recurring INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL,
                FOREIGN KEY(credit_card_id) REFERENCES credit_card(id) ON UPDATE CASCADE ON DELETE SET NULL,
                FOREIGN KEY(parent_transaction_id) REFERENCES \"transaction\"(id)
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Composite index used by the monthly window queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_category
         ON \"transaction\"(date, category_id);",
        (),
    )?;

    // Index used to resolve installment sets and recurring series.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_parent
         ON \"transaction\"(parent_transaction_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        kind: row.get(4)?,
        category_id: row.get(5)?,
        payment_method: row.get(6)?,
        credit_card_id: row.get(7)?,
        installments: row.get(8)?,
        installment_number: row.get(9)?,
        parent_transaction_id: row.get(10)?,
        is_recurring: row.get(11)?,
    })
}

/// Insert a single transaction row.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category reference is dangling,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn insert_transaction_row(
    row: &NewTransactionRow,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (description, amount, date, kind, category_id, \
             payment_method, credit_card_id, installments, installment_number, \
             parent_transaction_id, is_recurring)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                &row.description,
                row.amount,
                row.date,
                row.kind,
                row.category_id,
                row.payment_method,
                row.credit_card_id,
                row.installments,
                row.installment_number,
                row.parent_transaction_id,
                row.is_recurring,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(row.category_id),
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn get_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
#[cfg(test)]
pub(crate) fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

// ============================================================================
// TESTS
// ============================================================================
