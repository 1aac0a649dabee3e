//! Defines the endpoint for listing all subscriptions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, subscription::core::list_subscriptions};

/// The state needed to list subscriptions.
#[derive(Debug, Clone)]
pub struct ListSubscriptionsState {
    /// The database connection for managing subscriptions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListSubscriptionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing all subscriptions, active ones first.
pub async fn list_subscriptions_endpoint(State(state): State<ListSubscriptionsState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match list_subscriptions(&connection) {
        Ok(subscriptions) => Json(subscriptions).into_response(),
        Err(error) => error.into_response(),
    }
}
