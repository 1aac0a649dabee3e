//! Defines the endpoint for creating a new transaction.
//!
//! One create request may expand into several rows: an installment purchase
//! produces one row per installment, linked by the first row's id.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    database_id::{CategoryId, CreditCardId},
    transaction::{
        core::{PaymentMethod, TransactionKind},
        expansion::{NewTransaction, expand_transaction},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Text detailing the transaction.
    pub description: String,
    /// The total value of the transaction in currency units.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The ID of the category to file the transaction under.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// How the transaction was paid.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// The ID of the credit card the transaction was charged to.
    #[serde(default)]
    pub credit_card_id: Option<CreditCardId>,
    /// How many installments to split the purchase into. Defaults to 1.
    #[serde(default = "default_installments")]
    pub installments: i64,
    /// Whether the transaction repeats monthly. Defaults to false.
    #[serde(default)]
    pub is_recurring: bool,
}

fn default_installments() -> i64 {
    1
}

/// A route handler for creating a new transaction.
///
/// Responds with the full list of created rows: a single row for standalone
/// and recurring transactions, or one row per installment.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Response {
    let new_transaction = NewTransaction {
        description: request.description,
        amount: request.amount,
        date: request.date,
        kind: request.kind,
        category_id: request.category_id,
        payment_method: request.payment_method,
        credit_card_id: request.credit_card_id,
        installments: request.installments,
        is_recurring: request.is_recurring,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match expand_transaction(&new_transaction, &connection) {
        Ok(rows) => (StatusCode::CREATED, Json(rows)).into_response(),
        Err(error) => error.into_response(),
    }
}
