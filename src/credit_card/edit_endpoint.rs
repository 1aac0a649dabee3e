//! Defines the endpoint for editing an existing credit card.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    credit_card::{
        core::{get_credit_card, update_credit_card},
        create_endpoint::CreditCardRequest,
    },
    database_id::CreditCardId,
};

/// The state needed to edit a credit card.
#[derive(Debug, Clone)]
pub struct EditCreditCardState {
    /// The database connection for managing credit cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCreditCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for replacing the editable fields of a credit card.
///
/// The card's used amount is not editable; it is maintained by the
/// transaction write paths.
pub async fn edit_credit_card_endpoint(
    State(state): State<EditCreditCardState>,
    Path(card_id): Path<CreditCardId>,
    Json(request): Json<CreditCardRequest>,
) -> Response {
    let new_card = match request.into_new_credit_card() {
        Ok(new_card) => new_card,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_credit_card(card_id, &new_card, &connection) {
        Ok(0) => Error::UpdateMissingCreditCard.into_response(),
        Ok(_) => match get_credit_card(card_id, &connection) {
            Ok(card) => Json(card).into_response(),
            Err(error) => error.into_response(),
        },
        Err(error) => {
            tracing::error!("Could not update credit card {card_id}: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        credit_card::{
            core::{NewCreditCard, create_credit_card, get_credit_card},
            create_endpoint::CreditCardRequest,
            edit_endpoint::{EditCreditCardState, edit_credit_card_endpoint},
        },
        db::initialize,
    };

    #[tokio::test]
    async fn can_edit_credit_card() {
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
        let state = EditCreditCardState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let request = CreditCardRequest {
            name: "Work Visa".to_owned(),
            brand: "Visa".to_owned(),
            bank: "Acme Bank".to_owned(),
            credit_limit: 8000.0,
            closing_day: 15,
            due_day: 22,
        };
        let response =
            edit_credit_card_endpoint(State(state.clone()), Path(card.id), Json(request)).await;

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        let updated = get_credit_card(card.id, &connection).unwrap();
        assert_eq!(updated.name, "Work Visa");
        assert_eq!(updated.credit_limit, 8000.0);
    }

    #[tokio::test]
    async fn edit_missing_card_returns_not_found() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = EditCreditCardState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let request = CreditCardRequest {
            name: "Work Visa".to_owned(),
            brand: String::new(),
            bank: String::new(),
            credit_limit: 8000.0,
            closing_day: 15,
            due_day: 22,
        };
        let response = edit_credit_card_endpoint(State(state), Path(42), Json(request)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
