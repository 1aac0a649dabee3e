//! Defines the endpoint for creating a new credit card.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, FieldError,
    credit_card::core::{NewCreditCard, create_credit_card},
};

/// The state needed to create a credit card.
#[derive(Debug, Clone)]
pub struct CreateCreditCardState {
    /// The database connection for managing credit cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCreditCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating or replacing a credit card.
#[derive(Debug, Deserialize)]
pub struct CreditCardRequest {
    /// The display name of the card.
    pub name: String,
    /// The card brand, e.g. "Visa".
    #[serde(default)]
    pub brand: String,
    /// The issuing bank.
    #[serde(default)]
    pub bank: String,
    /// The credit limit in currency units.
    pub credit_limit: f64,
    /// The day of the month the statement closes.
    pub closing_day: u8,
    /// The day of the month payment is due.
    pub due_day: u8,
}

impl CreditCardRequest {
    /// Validate the request, returning the fields to persist.
    ///
    /// # Errors
    /// Returns [Error::Validation] with one entry per offending field.
    pub(crate) fn into_new_credit_card(self) -> Result<NewCreditCard, Error> {
        let mut field_errors = Vec::new();

        if self.name.trim().is_empty() {
            field_errors.push(FieldError::new("name", "name must not be empty"));
        }

        if self.credit_limit < 0.0 {
            field_errors.push(FieldError::new(
                "credit_limit",
                "credit limit must not be negative",
            ));
        }

        if !(1..=31).contains(&self.closing_day) {
            field_errors.push(FieldError::new(
                "closing_day",
                "closing day must be a day of the month from 1 to 31",
            ));
        }

        if !(1..=31).contains(&self.due_day) {
            field_errors.push(FieldError::new(
                "due_day",
                "due day must be a day of the month from 1 to 31",
            ));
        }

        if !field_errors.is_empty() {
            return Err(Error::Validation(field_errors));
        }

        Ok(NewCreditCard {
            name: self.name,
            brand: self.brand,
            bank: self.bank,
            credit_limit: self.credit_limit,
            closing_day: self.closing_day,
            due_day: self.due_day,
        })
    }
}

/// A route handler for creating a new credit card.
pub async fn create_credit_card_endpoint(
    State(state): State<CreateCreditCardState>,
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

    match create_credit_card(&new_card, &connection) {
        Ok(card) => (StatusCode::CREATED, Json(card)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        credit_card::{
            core::get_credit_card,
            create_endpoint::{
                CreateCreditCardState, CreditCardRequest, create_credit_card_endpoint,
            },
        },
        db::initialize,
    };

    fn get_test_state() -> CreateCreditCardState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        CreateCreditCardState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn can_create_credit_card() {
        let state = get_test_state();
        let request = CreditCardRequest {
            name: "Personal Visa".to_owned(),
            brand: "Visa".to_owned(),
            bank: "Acme Bank".to_owned(),
            credit_limit: 5000.0,
            closing_day: 28,
            due_day: 5,
        };

        let response = create_credit_card_endpoint(State(state.clone()), Json(request)).await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let connection = state.db_connection.lock().unwrap();
        let card = get_credit_card(1, &connection).unwrap();
        assert_eq!(card.name, "Personal Visa");
        assert_eq!(card.current_used, 0.0);
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_days() {
        let state = get_test_state();
        let request = CreditCardRequest {
            name: "Personal Visa".to_owned(),
            brand: String::new(),
            bank: String::new(),
            credit_limit: 5000.0,
            closing_day: 0,
            due_day: 32,
        };

        let response = create_credit_card_endpoint(State(state), Json(request)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
