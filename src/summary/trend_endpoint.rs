//! Defines the endpoint for the multi-month summary trend.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    summary::aggregation::{
        MonthlySummary, compute_monthly_summary, shift_month, validate_month, validate_year,
    },
};

/// The state needed to compute a summary trend.
#[derive(Debug, Clone)]
pub struct SummaryTrendState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryTrendState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The trend window to compute: `months` months ending at `month`/`year`.
#[derive(Debug, Deserialize)]
pub struct TrendParams {
    /// The window length in months. Either 6 or 12, defaults to 6.
    #[serde(default = "default_window")]
    pub months: u32,
    /// The calendar month the window ends at, 1-12.
    pub month: u8,
    /// The four-digit year the window ends at.
    pub year: i32,
}

fn default_window() -> u32 {
    6
}

/// One month of the trend.
#[derive(Debug, Serialize)]
pub struct TrendPoint {
    /// The four-digit year of this point.
    pub year: i32,
    /// The calendar month of this point, 1-12.
    pub month: u8,
    /// The summary for the month.
    #[serde(flatten)]
    pub summary: MonthlySummary,
}

/// A route handler for the summary trend over a 6 or 12 month window
/// ending at the selected month, oldest month first.
///
/// Months without transactions contribute zero totals.
pub async fn get_summary_trend_endpoint(
    State(state): State<SummaryTrendState>,
    Query(params): Query<TrendParams>,
) -> Response {
    if params.months != 6 && params.months != 12 {
        return Error::InvalidTrendWindow(params.months).into_response();
    }
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

    let mut points = Vec::with_capacity(params.months as usize);
    for offset in (0..params.months as i32).rev() {
        let (point_year, point_month) = shift_month(year, month, -offset);

        let summary = match compute_monthly_summary(point_year, point_month, &connection) {
            Ok(summary) => summary,
            Err(error) => {
                tracing::error!(
                    "Could not compute summary for {point_year}-{point_month:?}: {error}"
                );
                return error.into_response();
            }
        };

        points.push(TrendPoint {
            year: point_year,
            month: u8::from(point_month),
            summary,
        });
    }

    Json(points).into_response()
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
    use serde_json::Value;
    use time::macros::date;

    use crate::{
        db::initialize,
        transaction::{insert_transaction_row, test_utils},
    };

    use super::{SummaryTrendState, TrendParams, get_summary_trend_endpoint};

    fn get_test_state() -> SummaryTrendState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        SummaryTrendState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    async fn fetch_trend(state: &SummaryTrendState, params: TrendParams) -> Vec<Value> {
        let response = get_summary_trend_endpoint(State(state.clone()), Query(params)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn trend_covers_window_ending_at_selected_month() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            insert_transaction_row(
                &test_utils::standalone_expense("January rent", 1200.0, date!(2024 - 01 - 10)),
                &connection,
            )
            .unwrap();
        }

        let points = fetch_trend(
            &state,
            TrendParams {
                months: 6,
                month: 3,
                year: 2024,
            },
        )
        .await;

        assert_eq!(points.len(), 6);
        // Window is Oct 2023 through Mar 2024, oldest first.
        assert_eq!(points[0]["year"], 2023);
        assert_eq!(points[0]["month"], 10);
        assert_eq!(points[5]["year"], 2024);
        assert_eq!(points[5]["month"], 3);

        // January has the expense; empty months report zeros, not errors.
        assert_eq!(points[3]["total_expenses"], 1200.0);
        assert_eq!(points[4]["total_expenses"], 0.0);
    }

    #[tokio::test]
    async fn twelve_month_window_is_supported() {
        let state = get_test_state();

        let points = fetch_trend(
            &state,
            TrendParams {
                months: 12,
                month: 12,
                year: 2024,
            },
        )
        .await;

        assert_eq!(points.len(), 12);
        assert_eq!(points[0]["month"], 1);
        assert_eq!(points[0]["year"], 2024);
    }

    #[tokio::test]
    async fn unsupported_window_is_rejected() {
        let state = get_test_state();

        let response = get_summary_trend_endpoint(
            State(state),
            Query(TrendParams {
                months: 9,
                month: 3,
                year: 2024,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
