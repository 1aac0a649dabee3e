//! Defines the core data model and database queries for subscriptions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::{CategoryId, CreditCardId, SubscriptionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// A recurring paid service, e.g. a streaming plan, billed monthly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// The ID of the subscription.
    pub id: SubscriptionId,
    /// The display name of the subscription.
    pub name: String,
    /// An identifier for the service being subscribed to, e.g. "netflix".
    pub service: String,
    /// The monthly amount charged.
    pub amount: f64,
    /// The day of the month the subscription bills.
    pub billing_day: u8,
    /// Whether the subscription is currently active.
    ///
    /// Toggling this never alters past transactions.
    pub is_active: bool,
    /// The ID of the category the subscription belongs to.
    pub category_id: Option<CategoryId>,
    /// The ID of the credit card the subscription bills to.
    pub credit_card_id: Option<CreditCardId>,
}

/// The fields needed to create or replace a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    /// The display name of the subscription.
    pub name: String,
    /// An identifier for the service being subscribed to.
    pub service: String,
    /// The monthly amount charged.
    pub amount: f64,
    /// The day of the month the subscription bills.
    pub billing_day: u8,
    /// Whether the subscription is currently active.
    pub is_active: bool,
    /// The ID of the category the subscription belongs to.
    pub category_id: Option<CategoryId>,
    /// The ID of the credit card the subscription bills to.
    pub credit_card_id: Option<CreditCardId>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the subscription table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_subscription_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS subscription (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                service TEXT NOT NULL,
                amount REAL NOT NULL,
                billing_day INTEGER NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                category_id INTEGER,
                credit_card_id INTEGER,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL,
                FOREIGN KEY(credit_card_id) REFERENCES credit_card(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Subscription].
pub(crate) fn map_subscription_row(row: &Row) -> Result<Subscription, rusqlite::Error> {
    Ok(Subscription {
        id: row.get(0)?,
        name: row.get(1)?,
        service: row.get(2)?,
        amount: row.get(3)?,
        billing_day: row.get(4)?,
        is_active: row.get(5)?,
        category_id: row.get(6)?,
        credit_card_id: row.get(7)?,
    })
}

const SUBSCRIPTION_COLUMNS: &str =
    "id, name, service, amount, billing_day, is_active, category_id, credit_card_id";

/// Create a new subscription in the database.
///
/// The caller is expected to have validated the category and credit card
/// references; a dangling reference surfaces as an [Error::SqlError].
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn create_subscription(
    new_subscription: &NewSubscription,
    connection: &Connection,
) -> Result<Subscription, Error> {
    let subscription = connection
        .prepare(&format!(
            "INSERT INTO subscription (name, service, amount, billing_day, is_active, category_id, credit_card_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {SUBSCRIPTION_COLUMNS}"
        ))?
        .query_row(
            (
                &new_subscription.name,
                &new_subscription.service,
                new_subscription.amount,
                new_subscription.billing_day,
                new_subscription.is_active,
                new_subscription.category_id,
                new_subscription.credit_card_id,
            ),
            map_subscription_row,
        )?;

    Ok(subscription)
}

/// Retrieve a subscription from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid subscription,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn get_subscription(
    id: SubscriptionId,
    connection: &Connection,
) -> Result<Subscription, Error> {
    let subscription = connection
        .prepare(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscription WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_subscription_row)?;

    Ok(subscription)
}

/// Retrieve all subscriptions, active ones first, then by name.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn list_subscriptions(connection: &Connection) -> Result<Vec<Subscription>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscription
             ORDER BY is_active DESC, name ASC, id ASC"
        ))?
        .query_map([], map_subscription_row)?
        .map(|maybe_subscription| maybe_subscription.map_err(Error::from))
        .collect()
}

pub(crate) type RowsAffected = usize;

/// Replace the fields of the subscription `id` with `new_subscription`.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn update_subscription(
    id: SubscriptionId,
    new_subscription: &NewSubscription,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE subscription
             SET name = ?1, service = ?2, amount = ?3, billing_day = ?4, is_active = ?5,
                 category_id = ?6, credit_card_id = ?7
             WHERE id = ?8",
            (
                &new_subscription.name,
                &new_subscription.service,
                new_subscription.amount,
                new_subscription.billing_day,
                new_subscription.is_active,
                new_subscription.category_id,
                new_subscription.credit_card_id,
                id,
            ),
        )
        .map_err(Error::from)
}

/// Delete the subscription `id`.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn delete_subscription(
    id: SubscriptionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM subscription WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}

// ============================================================================
// TESTS
// ============================================================================
