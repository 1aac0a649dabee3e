//! Defines the endpoint for editing an existing subscription.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::SubscriptionId,
    subscription::{
        core::{get_subscription, update_subscription},
        create_endpoint::{SubscriptionRequest, check_references},
    },
};

/// The state needed to edit a subscription.
#[derive(Debug, Clone)]
pub struct EditSubscriptionState {
    /// The database connection for managing subscriptions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditSubscriptionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for replacing the fields of a subscription, including
/// toggling its active flag.
pub async fn edit_subscription_endpoint(
    State(state): State<EditSubscriptionState>,
    Path(subscription_id): Path<SubscriptionId>,
    Json(request): Json<SubscriptionRequest>,
) -> Response {
    let new_subscription = match request.into_new_subscription() {
        Ok(new_subscription) => new_subscription,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    if let Err(error) = check_references(&new_subscription, &connection) {
        return error.into_response();
    }

    match update_subscription(subscription_id, &new_subscription, &connection) {
        Ok(0) => Error::UpdateMissingSubscription.into_response(),
        Ok(_) => match get_subscription(subscription_id, &connection) {
            Ok(subscription) => Json(subscription).into_response(),
            Err(error) => error.into_response(),
        },
        Err(error) => {
            tracing::error!("Could not update subscription {subscription_id}: {error}");
            error.into_response()
        }
    }
}
