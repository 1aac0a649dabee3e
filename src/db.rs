//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, category::create_category_table, credit_card::create_credit_card_table,
    subscription::create_subscription_table, transaction::create_transaction_table,
};

/// Create the tables for the application's domain models.
///
/// The tables are created within a single exclusive transaction so that a
/// half-initialized schema is never left behind.
///
/// # Errors
/// Returns an [Error::SqlError] if any table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;
    create_credit_card_table(&transaction)?;
    create_subscription_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).expect("could not initialize database");

        let mut statement = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let table_names: Vec<String> = statement
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect();

        for want in ["category", "credit_card", "subscription", "transaction"] {
            assert!(
                table_names.iter().any(|name| name == want),
                "table {want} is missing, got tables {table_names:?}"
            );
        }
    }

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).expect("could not initialize database");
        initialize(&conn).expect("initializing twice should not fail");
    }
}
