//! Defines the endpoint for deleting a subscription.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::SubscriptionId, subscription::core::delete_subscription};

/// The state needed to delete a subscription.
#[derive(Debug, Clone)]
pub struct DeleteSubscriptionState {
    /// The database connection for managing subscriptions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteSubscriptionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a subscription.
pub async fn delete_subscription_endpoint(
    State(state): State<DeleteSubscriptionState>,
    Path(subscription_id): Path<SubscriptionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_subscription(subscription_id, &connection) {
        Ok(0) => Error::DeleteMissingSubscription.into_response(),
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => {
            tracing::error!("Could not delete subscription {subscription_id}: {error}");
            error.into_response()
        }
    }
}
