//! Defines the endpoint for editing a transaction, either alone or across
//! its whole group.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, FieldError,
    database_id::TransactionId,
    transaction::{
        core::get_transaction,
        grouping::{
            GroupKind, MutationScope, TransactionChanges, classify, update_group, update_single,
        },
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The scope query parameter for edits and deletes.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeParams {
    /// How far the mutation should reach. Defaults to the single row.
    #[serde(default)]
    pub scope: MutationScope,
}

fn validate_changes(changes: &TransactionChanges) -> Result<(), Error> {
    let mut field_errors = Vec::new();

    if let Some(description) = &changes.description
        && description.trim().is_empty()
    {
        field_errors.push(FieldError::new(
            "description",
            "description must not be empty",
        ));
    }

    if let Some(amount) = changes.amount
        && amount <= 0.0
    {
        field_errors.push(FieldError::new(
            "amount",
            "amount must be greater than zero",
        ));
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(field_errors))
    }
}

/// A route handler for editing a transaction.
///
/// With `scope=single` (the default) only the targeted row changes. With
/// `scope=group` the change is applied to every member of the row's
/// installment set or recurring series; an amount supplied for an
/// installment set is the new purchase total, re-split evenly. Standalone
/// transactions always behave as `scope=single`.
///
/// Responds with the list of rows that changed.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Query(scope_params): Query<ScopeParams>,
    Json(changes): Json<TransactionChanges>,
) -> Response {
    if let Err(error) = validate_changes(&changes) {
        return error.into_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let target = match get_transaction(transaction_id, &connection) {
        Ok(target) => target,
        Err(Error::NotFound) => return Error::UpdateMissingTransaction.into_response(),
        Err(error) => return error.into_response(),
    };

    let apply_to_group = scope_params.scope == MutationScope::Group
        && classify(&target) != GroupKind::Standalone;

    let result = if apply_to_group {
        update_group(&target, &changes, &connection)
    } else {
        update_single(&target, &changes, &connection).map(|updated| vec![updated])
    };

    match result {
        Ok(updated_rows) => Json(updated_rows).into_response(),
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            error.into_response()
        }
    }
}
