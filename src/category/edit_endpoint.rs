//! Defines the endpoint for editing an existing category.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        core::{get_category, update_category},
        create_endpoint::CategoryRequest,
    },
    database_id::CategoryId,
};

/// The state needed to edit a category.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for replacing the fields of a category.
pub async fn edit_category_endpoint(
    State(state): State<EditCategoryState>,
    Path(category_id): Path<CategoryId>,
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

    match update_category(category_id, &new_category, &connection) {
        Ok(0) => Error::UpdateMissingCategory.into_response(),
        Ok(_) => match get_category(category_id, &connection) {
            Ok(category) => Json(category).into_response(),
            Err(error) => error.into_response(),
        },
        Err(error) => {
            tracing::error!("Could not update category {category_id}: {error}");
            error.into_response()
        }
    }
}
