//! Defines the endpoint for creating a new category.

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
    category::core::{CategoryKind, NewCategory, create_category},
};

/// The state needed to create a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating or replacing a category.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    /// The display name of the category.
    pub name: String,
    /// The icon glyph shown next to the category name.
    #[serde(default)]
    pub icon: String,
    /// The display color for the category.
    #[serde(default)]
    pub color: String,
    /// The kind of entries the category applies to.
    pub kind: CategoryKind,
}

impl CategoryRequest {
    /// Validate the request, returning the fields to persist.
    ///
    /// # Errors
    /// Returns [Error::Validation] with per-field messages when the name is
    /// blank.
    pub(crate) fn into_new_category(self) -> Result<NewCategory, Error> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(vec![FieldError::new(
                "name",
                "name must not be empty",
            )]));
        }

        Ok(NewCategory {
            name: self.name,
            icon: self.icon,
            color: self.color,
            kind: self.kind,
        })
    }
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Json(request): Json<CategoryRequest>,
) -> Response {
    let new_category = match request.into_new_category() {
        Ok(new_category) => new_category,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_category(&new_category, &connection) {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        category::{
            core::{CategoryKind, get_category},
            create_endpoint::{CategoryRequest, CreateCategoryState, create_category_endpoint},
        },
        db::initialize,
    };

    fn get_test_state() -> CreateCategoryState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        CreateCategoryState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn can_create_category() {
        let state = get_test_state();
        let request = CategoryRequest {
            name: "Groceries".to_owned(),
            icon: "🛒".to_owned(),
            color: "#e74c3c".to_owned(),
            kind: CategoryKind::Expense,
        };

        let response = create_category_endpoint(State(state.clone()), Json(request)).await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let connection = state.db_connection.lock().unwrap();
        let category = get_category(1, &connection).unwrap();
        assert_eq!(category.name, "Groceries");
        assert_eq!(category.kind, CategoryKind::Expense);
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let state = get_test_state();
        let request = CategoryRequest {
            name: "   ".to_owned(),
            icon: String::new(),
            color: String::new(),
            kind: CategoryKind::Income,
        };

        let response = create_category_endpoint(State(state), Json(request)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
