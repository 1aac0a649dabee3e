//! Defines the endpoint for listing all credit cards.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, credit_card::core::list_credit_cards};

/// The state needed to list credit cards.
#[derive(Debug, Clone)]
pub struct ListCreditCardsState {
    /// The database connection for managing credit cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCreditCardsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing all credit cards, ordered by name.
pub async fn list_credit_cards_endpoint(State(state): State<ListCreditCardsState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match list_credit_cards(&connection) {
        Ok(cards) => Json(cards).into_response(),
        Err(error) => error.into_response(),
    }
}
