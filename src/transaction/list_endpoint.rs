//! Defines the endpoint for the monthly transaction history listing.
//!
//! Credit-card expenses are hidden from this view to avoid double
//! bookkeeping noise; the monthly summary still counts them.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    summary::{month_range, validate_month, validate_year},
    transaction::query::{CardExpenseFilter, SortOrder, get_transactions_in_range},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The month window to list transactions for.
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    /// The calendar month, 1-12.
    pub month: u8,
    /// The four-digit year.
    pub year: i32,
}

/// A route handler for the transaction history of a single month, newest
/// first.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Query(query): Query<MonthQuery>,
) -> Response {
    let month = match validate_month(query.month) {
        Ok(month) => month,
        Err(error) => return error.into_response(),
    };
    let year = match validate_year(query.year) {
        Ok(year) => year,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let (first_day, last_day) = month_range(year, month);

    match get_transactions_in_range(
        first_day,
        last_day,
        CardExpenseFilter::Exclude,
        SortOrder::Descending,
        &connection,
    ) {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        body::to_bytes,
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        transaction::{
            core::{Transaction, insert_transaction_row, test_utils},
            list_endpoint::{ListTransactionsState, MonthQuery, list_transactions_endpoint},
        },
    };

    fn get_test_state() -> ListTransactionsState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        ListTransactionsState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    async fn list_month(state: &ListTransactionsState, month: u8, year: i32) -> Vec<Transaction> {
        let response = list_transactions_endpoint(
            State(state.clone()),
            Query(MonthQuery { month, year }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn hides_card_expenses_from_history() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            connection
                .execute(
                    "INSERT INTO credit_card (name, brand, bank, credit_limit, closing_day, due_day)
                     VALUES ('Visa', 'Visa', 'Acme', 5000, 28, 5)",
                    (),
                )
                .unwrap();
            insert_transaction_row(
                &test_utils::standalone_expense("cash expense", 100.0, date!(2024 - 03 - 05)),
                &connection,
            )
            .unwrap();
            let mut card_expense =
                test_utils::standalone_expense("card expense", 50.0, date!(2024 - 03 - 06));
            card_expense.credit_card_id = Some(1);
            insert_transaction_row(&card_expense, &connection).unwrap();
        }

        let transactions = list_month(&state, 3, 2024).await;

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].description, "cash expense");
        assert_eq!(transactions[0].amount, 100.0);
    }

    #[tokio::test]
    async fn empty_month_returns_empty_list() {
        let state = get_test_state();

        let transactions = list_month(&state, 1, 2024).await;

        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_month_is_rejected() {
        let state = get_test_state();

        let response = list_transactions_endpoint(
            State(state),
            Query(MonthQuery {
                month: 13,
                year: 2024,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
