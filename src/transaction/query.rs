//! Database query helpers for windowed transaction views.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    transaction::core::{TRANSACTION_COLUMNS, Transaction, map_transaction_row},
};

/// The order to sort transactions in a query.
pub(crate) enum SortOrder {
    /// Sort in order of increasing date.
    Ascending,
    /// Sort in order of decreasing date.
    Descending,
}

/// Whether credit-card expenses are part of the result set.
///
/// The general transaction history hides card-derived expense rows to avoid
/// double bookkeeping noise, while the monthly summary must still count
/// them.
pub(crate) enum CardExpenseFilter {
    /// Include credit-card expenses.
    Include,
    /// Exclude credit-card expenses.
    Exclude,
}

/// Get the transactions dated within `[start, end]` (inclusive).
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub(crate) fn get_transactions_in_range(
    start: Date,
    end: Date,
    card_filter: CardExpenseFilter,
    sort_order: SortOrder,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let filter_clause = match card_filter {
        CardExpenseFilter::Include => "",
        CardExpenseFilter::Exclude => {
            "AND NOT (kind = 'expense' AND credit_card_id IS NOT NULL) "
        }
    };
    let order_clause = match sort_order {
        SortOrder::Ascending => "ORDER BY date ASC",
        SortOrder::Descending => "ORDER BY date DESC",
    };

    // Sort by date, then ID to keep the order stable after updates.
    let query = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
         WHERE date BETWEEN ?1 AND ?2 {filter_clause}{order_clause}, id ASC"
    );

    connection
        .prepare(&query)?
        .query_map([start, end], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the anchors of recurring series dated strictly before `date`.
///
/// Used by the monthly summary to project recurring transactions into
/// months after their anchor.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub(crate) fn get_recurring_anchors_dated_before(
    date: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
             WHERE is_recurring = 1 AND parent_transaction_id IS NULL AND date < ?1 \
             ORDER BY date ASC, id ASC"
        ))?
        .query_map([date], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}
