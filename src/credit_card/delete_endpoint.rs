//! Defines the endpoint for deleting a credit card.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, credit_card::core::delete_credit_card, database_id::CreditCardId};

/// The state needed to delete a credit card.
#[derive(Debug, Clone)]
pub struct DeleteCreditCardState {
    /// The database connection for managing credit cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCreditCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a credit card.
///
/// Transactions that referenced the card are left in place with their card
/// reference cleared.
pub async fn delete_credit_card_endpoint(
    State(state): State<DeleteCreditCardState>,
    Path(card_id): Path<CreditCardId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_credit_card(card_id, &connection) {
        Ok(0) => Error::DeleteMissingCreditCard.into_response(),
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => {
            tracing::error!("Could not delete credit card {card_id}: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        Error,
        credit_card::{
            core::{NewCreditCard, create_credit_card, get_credit_card},
            delete_endpoint::{DeleteCreditCardState, delete_credit_card_endpoint},
        },
        db::initialize,
    };

    #[tokio::test]
    async fn can_delete_credit_card() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let card = create_credit_card(
            &NewCreditCard {
                name: "Personal Visa".to_owned(),
                brand: "Visa".to_owned(),
                bank: "Acme Bank".to_owned(),
                credit_limit: 5000.0,
                closing_day: 28,
                due_day: 5,
            },
            &conn,
        )
        .unwrap();
        let state = DeleteCreditCardState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = delete_credit_card_endpoint(State(state.clone()), Path(card.id)).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_credit_card(card.id, &connection), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn delete_missing_card_returns_not_found() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = DeleteCreditCardState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = delete_credit_card_endpoint(State(state), Path(42)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
