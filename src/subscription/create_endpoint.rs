//! Defines the endpoint for creating a new subscription.

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
    category::get_category,
    credit_card::get_credit_card,
    database_id::{CategoryId, CreditCardId},
    subscription::core::{NewSubscription, create_subscription},
};

/// The state needed to create a subscription.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionState {
    /// The database connection for managing subscriptions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateSubscriptionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating or replacing a subscription.
#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    /// The display name of the subscription.
    pub name: String,
    /// An identifier for the service being subscribed to.
    #[serde(default)]
    pub service: String,
    /// The monthly amount charged.
    pub amount: f64,
    /// The day of the month the subscription bills.
    pub billing_day: u8,
    /// Whether the subscription is currently active. Defaults to true.
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    /// The ID of the category the subscription belongs to.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// The ID of the credit card the subscription bills to.
    #[serde(default)]
    pub credit_card_id: Option<CreditCardId>,
}

fn default_is_active() -> bool {
    true
}

impl SubscriptionRequest {
    /// Validate the request fields, returning the fields to persist.
    ///
    /// Reference validity is checked separately against the database.
    ///
    /// # Errors
    /// Returns [Error::Validation] with one entry per offending field.
    pub(crate) fn into_new_subscription(self) -> Result<NewSubscription, Error> {
        let mut field_errors = Vec::new();

        if self.name.trim().is_empty() {
            field_errors.push(FieldError::new("name", "name must not be empty"));
        }

        if self.amount <= 0.0 {
            field_errors.push(FieldError::new(
                "amount",
                "amount must be greater than zero",
            ));
        }

        if !(1..=31).contains(&self.billing_day) {
            field_errors.push(FieldError::new(
                "billing_day",
                "billing day must be a day of the month from 1 to 31",
            ));
        }

        if !field_errors.is_empty() {
            return Err(Error::Validation(field_errors));
        }

        Ok(NewSubscription {
            name: self.name,
            service: self.service,
            amount: self.amount,
            billing_day: self.billing_day,
            is_active: self.is_active,
            category_id: self.category_id,
            credit_card_id: self.credit_card_id,
        })
    }
}

/// Check that the category and credit card referenced by `new_subscription`
/// exist.
///
/// # Errors
/// Returns [Error::InvalidCategory] or [Error::InvalidCreditCard] for a
/// dangling reference.
pub(crate) fn check_references(
    new_subscription: &NewSubscription,
    connection: &Connection,
) -> Result<(), Error> {
    if let Some(category_id) = new_subscription.category_id {
        get_category(category_id, connection)
            .map_err(|_| Error::InvalidCategory(Some(category_id)))?;
    }

    if let Some(card_id) = new_subscription.credit_card_id {
        get_credit_card(card_id, connection)
            .map_err(|_| Error::InvalidCreditCard(Some(card_id)))?;
    }

    Ok(())
}

/// A route handler for creating a new subscription.
pub async fn create_subscription_endpoint(
    State(state): State<CreateSubscriptionState>,
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

    match create_subscription(&new_subscription, &connection) {
        Ok(subscription) => (StatusCode::CREATED, Json(subscription)).into_response(),
        Err(error) => error.into_response(),
    }
}
