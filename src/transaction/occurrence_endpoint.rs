//! Defines the endpoint for materializing an occurrence of a recurring
//! transaction.
//!
//! Creating a recurring transaction persists only its first row; the
//! monthly summary projects later occurrences without storing them. This
//! endpoint turns one projected occurrence into a real row, copying the
//! series anchor's fields and linking the new row into the series, so it
//! can be edited or deleted like any other member.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    summary::month_range,
    transaction::{
        core::{NewTransactionRow, Transaction, get_transaction, insert_transaction_row},
        grouping::{GroupKind, classify, get_group_members, resolve_group_key},
    },
};

/// The state needed to materialize a recurring occurrence.
#[derive(Debug, Clone)]
pub struct CreateOccurrenceState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateOccurrenceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for materializing an occurrence.
#[derive(Debug, Deserialize)]
pub struct OccurrenceRequest {
    /// The date the occurrence lands on.
    pub date: Date,
}

fn materialize_occurrence(
    target: &Transaction,
    date: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if classify(target) != GroupKind::Recurring {
        return Err(Error::NotRecurring);
    }

    let group_key = resolve_group_key(target);
    let anchor = if target.id == group_key {
        target.clone()
    } else {
        get_transaction(group_key, connection)?
    };

    // One materialized row per series per month.
    let (first_day, last_day) = month_range(date.year(), date.month());
    let members = get_group_members(group_key, connection)?;
    if members
        .iter()
        .any(|member| member.date >= first_day && member.date <= last_day)
    {
        return Err(Error::DuplicateOccurrence);
    }

    insert_transaction_row(
        &NewTransactionRow {
            description: anchor.description.clone(),
            amount: anchor.amount,
            date,
            kind: anchor.kind,
            category_id: anchor.category_id,
            payment_method: anchor.payment_method,
            credit_card_id: anchor.credit_card_id,
            installments: 1,
            installment_number: 1,
            parent_transaction_id: Some(group_key),
            is_recurring: true,
        },
        connection,
    )
}

/// A route handler for materializing an occurrence of a recurring series.
pub async fn create_occurrence_endpoint(
    State(state): State<CreateOccurrenceState>,
    Path(transaction_id): Path<TransactionId>,
    Json(request): Json<OccurrenceRequest>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let target = match get_transaction(transaction_id, &connection) {
        Ok(target) => target,
        Err(error) => return error.into_response(),
    };

    match materialize_occurrence(&target, request.date, &connection) {
        Ok(occurrence) => (StatusCode::CREATED, Json(occurrence)).into_response(),
        Err(error) => error.into_response(),
    }
}
