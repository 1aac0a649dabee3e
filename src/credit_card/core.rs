//! Defines the core data model and database queries for credit cards.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CreditCardId, money::round_to_cents};

// ============================================================================
// MODELS
// ============================================================================

/// A credit card that expenses can be charged against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCard {
    /// The ID of the credit card.
    pub id: CreditCardId,
    /// The display name of the card, e.g. "Personal Visa".
    pub name: String,
    /// The card brand, e.g. "Visa".
    pub brand: String,
    /// The issuing bank.
    pub bank: String,
    /// The credit limit in currency units.
    pub credit_limit: f64,
    /// The running total of the limit currently in use.
    ///
    /// Maintained by the transaction write paths; exceeding the limit is a
    /// display concern and is not rejected here.
    pub current_used: f64,
    /// The day of the month the statement closes.
    pub closing_day: u8,
    /// The day of the month payment is due.
    pub due_day: u8,
}

/// The fields needed to create or replace a credit card.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCreditCard {
    /// The display name of the card.
    pub name: String,
    /// The card brand.
    pub brand: String,
    /// The issuing bank.
    pub bank: String,
    /// The credit limit in currency units.
    pub credit_limit: f64,
    /// The day of the month the statement closes.
    pub closing_day: u8,
    /// The day of the month payment is due.
    pub due_day: u8,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the credit card table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_credit_card_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS credit_card (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                brand TEXT NOT NULL,
                bank TEXT NOT NULL,
                credit_limit REAL NOT NULL,
                current_used REAL NOT NULL DEFAULT 0,
                closing_day INTEGER NOT NULL,
                due_day INTEGER NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [CreditCard].
pub(crate) fn map_credit_card_row(row: &Row) -> Result<CreditCard, rusqlite::Error> {
    Ok(CreditCard {
        id: row.get(0)?,
        name: row.get(1)?,
        brand: row.get(2)?,
        bank: row.get(3)?,
        credit_limit: row.get(4)?,
        current_used: row.get(5)?,
        closing_day: row.get(6)?,
        due_day: row.get(7)?,
    })
}

const CREDIT_CARD_COLUMNS: &str =
    "id, name, brand, bank, credit_limit, current_used, closing_day, due_day";

/// Create a new credit card in the database with nothing in use yet.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn create_credit_card(
    new_card: &NewCreditCard,
    connection: &Connection,
) -> Result<CreditCard, Error> {
    let card = connection
        .prepare(&format!(
            "INSERT INTO credit_card (name, brand, bank, credit_limit, closing_day, due_day)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {CREDIT_CARD_COLUMNS}"
        ))?
        .query_row(
            (
                &new_card.name,
                &new_card.brand,
                &new_card.bank,
                new_card.credit_limit,
                new_card.closing_day,
                new_card.due_day,
            ),
            map_credit_card_row,
        )?;

    Ok(card)
}

/// Retrieve a credit card from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid credit card,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn get_credit_card(
    id: CreditCardId,
    connection: &Connection,
) -> Result<CreditCard, Error> {
    let card = connection
        .prepare(&format!(
            "SELECT {CREDIT_CARD_COLUMNS} FROM credit_card WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_credit_card_row)?;

    Ok(card)
}

/// Retrieve all credit cards, ordered by name.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn list_credit_cards(connection: &Connection) -> Result<Vec<CreditCard>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CREDIT_CARD_COLUMNS} FROM credit_card ORDER BY name ASC, id ASC"
        ))?
        .query_map([], map_credit_card_row)?
        .map(|maybe_card| maybe_card.map_err(Error::from))
        .collect()
}

pub(crate) type RowsAffected = usize;

/// Replace the editable fields of the credit card `id` with `new_card`.
///
/// `current_used` is deliberately not editable here: it is a running total
/// maintained by the transaction write paths.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn update_credit_card(
    id: CreditCardId,
    new_card: &NewCreditCard,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE credit_card
             SET name = ?1, brand = ?2, bank = ?3, credit_limit = ?4, closing_day = ?5, due_day = ?6
             WHERE id = ?7",
            (
                &new_card.name,
                &new_card.brand,
                &new_card.bank,
                new_card.credit_limit,
                new_card.closing_day,
                new_card.due_day,
                id,
            ),
        )
        .map_err(Error::from)
}

/// Delete the credit card `id`.
///
/// Transactions that referenced the card keep working: their card reference
/// is set to NULL by the schema.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn delete_credit_card(
    id: CreditCardId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM credit_card WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}

/// Add `delta` (which may be negative) to the card's used amount.
///
/// Charging an expense passes the expense total; releasing on delete passes
/// the negated row amounts.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCreditCard] if `id` does not refer to a valid credit card,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn adjust_used_amount(
    id: CreditCardId,
    delta: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE credit_card SET current_used = ROUND(current_used + ?1, 2) WHERE id = ?2",
        (round_to_cents(delta), id),
    )?;

    if rows_affected == 0 {
        return Err(Error::InvalidCreditCard(Some(id)));
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        credit_card::core::{
            NewCreditCard, adjust_used_amount, create_credit_card, delete_credit_card,
            get_credit_card, list_credit_cards, update_credit_card,
        },
        db::initialize,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_card(name: &str) -> NewCreditCard {
        NewCreditCard {
            name: name.to_owned(),
            brand: "Visa".to_owned(),
            bank: "Acme Bank".to_owned(),
            credit_limit: 5000.0,
            closing_day: 28,
            due_day: 5,
        }
    }

    #[test]
    fn create_starts_with_nothing_used() {
        let conn = get_test_connection();

        let card = create_credit_card(&new_card("Personal Visa"), &conn).unwrap();

        assert_eq!(card.current_used, 0.0);
        assert_eq!(card.credit_limit, 5000.0);
        assert_eq!(card.closing_day, 28);
    }

    #[test]
    fn get_card_fails_on_invalid_id() {
        let conn = get_test_connection();

        assert_eq!(get_credit_card(1337, &conn), Err(Error::NotFound));
    }

    #[test]
    fn list_orders_by_name() {
        let conn = get_test_connection();
        create_credit_card(&new_card("Platinum"), &conn).unwrap();
        create_credit_card(&new_card("Gold"), &conn).unwrap();

        let cards = list_credit_cards(&conn).unwrap();

        let names: Vec<&str> = cards.iter().map(|card| card.name.as_str()).collect();
        assert_eq!(names, vec!["Gold", "Platinum"]);
    }

    #[test]
    fn update_does_not_touch_used_amount() {
        let conn = get_test_connection();
        let card = create_credit_card(&new_card("Personal Visa"), &conn).unwrap();
        adjust_used_amount(card.id, 150.0, &conn).unwrap();

        let rows_affected = update_credit_card(card.id, &new_card("Renamed"), &conn).unwrap();

        assert_eq!(rows_affected, 1);
        let updated = get_credit_card(card.id, &conn).unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.current_used, 150.0);
    }

    #[test]
    fn adjust_used_amount_charges_and_releases() {
        let conn = get_test_connection();
        let card = create_credit_card(&new_card("Personal Visa"), &conn).unwrap();

        adjust_used_amount(card.id, 300.0, &conn).unwrap();
        adjust_used_amount(card.id, -100.0, &conn).unwrap();

        let updated = get_credit_card(card.id, &conn).unwrap();
        assert_eq!(updated.current_used, 200.0);
    }

    #[test]
    fn adjust_used_amount_may_exceed_limit() {
        // The limit is a display constraint, not a write-time constraint.
        let conn = get_test_connection();
        let card = create_credit_card(&new_card("Personal Visa"), &conn).unwrap();

        adjust_used_amount(card.id, 6000.0, &conn).unwrap();

        let updated = get_credit_card(card.id, &conn).unwrap();
        assert!(updated.current_used > updated.credit_limit);
    }

    #[test]
    fn adjust_used_amount_fails_on_invalid_card() {
        let conn = get_test_connection();

        let result = adjust_used_amount(42, 10.0, &conn);

        assert_eq!(result, Err(Error::InvalidCreditCard(Some(42))));
    }

    #[test]
    fn delete_removes_row() {
        let conn = get_test_connection();
        let card = create_credit_card(&new_card("Personal Visa"), &conn).unwrap();

        let rows_affected = delete_credit_card(card.id, &conn).unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(get_credit_card(card.id, &conn), Err(Error::NotFound));
    }
}
