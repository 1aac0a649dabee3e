//! Defines the endpoint for listing all categories.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, category::core::list_categories};

/// The state needed to list categories.
#[derive(Debug, Clone)]
pub struct ListCategoriesState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing all categories, ordered by name.
pub async fn list_categories_endpoint(State(state): State<ListCategoriesState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match list_categories(&connection) {
        Ok(categories) => Json(categories).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        category::{
            core::{CategoryKind, NewCategory, create_category},
            list_endpoint::{ListCategoriesState, list_categories_endpoint},
        },
        db::initialize,
    };

    #[tokio::test]
    async fn lists_categories() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        create_category(
            &NewCategory {
                name: "Groceries".to_owned(),
                icon: "🛒".to_owned(),
                color: "#e74c3c".to_owned(),
                kind: CategoryKind::Expense,
            },
            &conn,
        )
        .unwrap();
        let state = ListCategoriesState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = list_categories_endpoint(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
