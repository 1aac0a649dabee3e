//! Defines the endpoint for deleting a transaction, either alone or across
//! its whole group.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    transaction::{
        core::get_transaction,
        edit_endpoint::ScopeParams,
        grouping::{GroupKind, MutationScope, classify, delete_group, delete_single},
    },
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// With `scope=single` (the default) exactly one row is removed. With
/// `scope=group` every member of the row's installment set or recurring
/// series goes in one logical operation. Deleted credit-card expense rows
/// release their amounts from the linked card's used total.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Query(scope_params): Query<ScopeParams>,
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
        Err(Error::NotFound) => return Error::DeleteMissingTransaction.into_response(),
        Err(error) => return error.into_response(),
    };

    let apply_to_group = scope_params.scope == MutationScope::Group
        && classify(&target) != GroupKind::Standalone;

    let result = if apply_to_group {
        delete_group(&target, &connection).map(|_| ())
    } else {
        delete_single(&target, &connection)
    };

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        credit_card::{NewCreditCard, create_credit_card, get_credit_card},
        db::initialize,
        transaction::{
            core::{PaymentMethod, Transaction, TransactionKind, count_transactions},
            delete_endpoint::{DeleteTransactionState, delete_transaction_endpoint},
            edit_endpoint::ScopeParams,
            expansion::{NewTransaction, expand_transaction},
            grouping::MutationScope,
        },
    };

    fn get_test_state() -> DeleteTransactionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn create_installment_set(state: &DeleteTransactionState) -> Vec<Transaction> {
        let connection = state.db_connection.lock().unwrap();
        let card_id = create_credit_card(
            &NewCreditCard {
                name: "Personal Visa".to_owned(),
                brand: "Visa".to_owned(),
                bank: "Acme Bank".to_owned(),
                credit_limit: 5000.0,
                closing_day: 28,
                due_day: 5,
            },
            &connection,
        )
        .unwrap()
        .id;

        expand_transaction(
            &NewTransaction {
                description: "New fridge".to_owned(),
                amount: 300.0,
                date: date!(2024 - 01 - 15),
                kind: TransactionKind::Expense,
                category_id: None,
                payment_method: Some(PaymentMethod::Credit),
                credit_card_id: Some(card_id),
                installments: 3,
                is_recurring: false,
            },
            &connection,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn single_scope_deletes_one_row() {
        let state = get_test_state();
        let rows = create_installment_set(&state);

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Path(rows[1].id),
            Query(ScopeParams::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection).unwrap(), 2);
    }

    #[tokio::test]
    async fn group_scope_deletes_whole_set_and_releases_card() {
        let state = get_test_state();
        let rows = create_installment_set(&state);
        let card_id = rows[0].credit_card_id.unwrap();

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Path(rows[2].id),
            Query(ScopeParams {
                scope: MutationScope::Group,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection).unwrap(), 0);
        assert_eq!(
            get_credit_card(card_id, &connection).unwrap().current_used,
            0.0
        );
    }

    #[tokio::test]
    async fn deleting_missing_transaction_returns_not_found() {
        let state = get_test_state();

        let response =
            delete_transaction_endpoint(State(state), Path(42), Query(ScopeParams::default()))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
