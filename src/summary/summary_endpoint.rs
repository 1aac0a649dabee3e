//! Defines the endpoint for the monthly financial summary.

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
    summary::aggregation::{compute_monthly_summary, validate_month, validate_year},
};

/// The state needed to compute a monthly summary.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The month to summarize.
#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    /// The calendar month, 1-12.
    pub month: u8,
    /// The four-digit year.
    pub year: i32,
}

/// A route handler for the financial summary of a single month: total
/// income, total expenses, the month balance, and expenses broken down by
/// category.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    Query(params): Query<SummaryParams>,
) -> Response {
    let month = match validate_month(params.month) {
        Ok(month) => month,
        Err(error) => return error.into_response(),
    };
    let year = match validate_year(params.year) {
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

    match compute_monthly_summary(year, month, &connection) {
        Ok(summary) => Json(summary).into_response(),
        Err(error) => {
            tracing::error!("Could not compute summary for {year}-{month:?}: {error}");
            error.into_response()
        }
    }
}
