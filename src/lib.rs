//! Carteira is a web service for tracking personal finances: income,
//! expenses, credit-card installment purchases, recurring transactions, and
//! subscriptions, with aggregated monthly summaries for dashboards.
//!
//! This library provides a JSON REST API over a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod category;
mod credit_card;
mod database_id;
mod db;
mod endpoints;
mod money;
mod routing;
mod subscription;
mod summary;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use routing::build_router;

use crate::database_id::{CategoryId, CreditCardId};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// A validation failure for a single request field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// The name of the request field that failed validation.
    pub field: &'static str,
    /// A human-readable description of what is wrong with the field.
    pub message: String,
}

impl FieldError {
    /// Create a field error for `field` with a human-readable `message`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more request fields were missing or malformed.
    ///
    /// Holds one entry per offending field so the client can surface
    /// field-level messages.
    #[error("one or more fields failed validation")]
    Validation(Vec<FieldError>),

    /// A create request asked for a recurring transaction that is also split
    /// into multiple installments. Group membership would be ambiguous, so
    /// the combination is rejected.
    #[error("a transaction cannot be both recurring and split into installments")]
    ConflictingTransactionMode,

    /// The requested installment count is outside the supported range.
    #[error("{0} is not a valid installment count, expected a value from 1 to 24")]
    InvalidInstallmentCount(i64),

    /// The month in an aggregation query was outside 1-12.
    #[error("{0} is not a valid month, expected a value from 1 to 12")]
    InvalidMonth(u8),

    /// The trend window length was not one of the supported sizes.
    #[error("{0} is not a valid trend window, expected 6 or 12 months")]
    InvalidTrendWindow(u32),

    /// The category ID used in a write did not match a valid category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// The credit card ID used in a write did not match a valid credit card.
    #[error("the credit card ID does not refer to a valid credit card")]
    InvalidCreditCard(Option<CreditCardId>),

    /// The target of an occurrence request is not part of a recurring series.
    #[error("the transaction is not part of a recurring series")]
    NotRecurring,

    /// A recurring series already has a materialized occurrence in the
    /// requested month.
    #[error("the recurring series already has an occurrence in that month")]
    DuplicateOccurrence,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a credit card that does not exist
    #[error("tried to update a credit card that is not in the database")]
    UpdateMissingCreditCard,

    /// Tried to delete a credit card that does not exist
    #[error("tried to delete a credit card that is not in the database")]
    DeleteMissingCreditCard,

    /// Tried to update a subscription that does not exist
    #[error("tried to update a subscription that is not in the database")]
    UpdateMissingSubscription,

    /// Tried to delete a subscription that does not exist
    #[error("tried to delete a subscription that is not in the database")]
    DeleteMissingSubscription,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body returned for every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// A human-readable description of the failure.
    error: String,
    /// Field-level validation messages, present for validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldError>>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_)
            | Error::ConflictingTransactionMode
            | Error::InvalidInstallmentCount(_)
            | Error::InvalidMonth(_)
            | Error::InvalidTrendWindow(_)
            | Error::InvalidCategory(_)
            | Error::InvalidCreditCard(_)
            | Error::NotRecurring
            | Error::DuplicateOccurrence => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory
            | Error::UpdateMissingCreditCard
            | Error::DeleteMissingCreditCard
            | Error::UpdateMissingSubscription
            | Error::DeleteMissingSubscription => StatusCode::NOT_FOUND,
            Error::SqlError(_) | Error::DatabaseLockError => {
                tracing::error!("An unexpected error occurred: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let fields = match self {
            Error::Validation(ref fields) => Some(fields.clone()),
            _ => None,
        };

        // Internal errors must not leak SQL details to the client.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "an internal error occurred, check the server logs for more details".to_owned()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                fields,
            }),
        )
            .into_response()
    }
}
