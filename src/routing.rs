//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;

use crate::{
    AppState,
    category::{
        create_category_endpoint, delete_category_endpoint, edit_category_endpoint,
        list_categories_endpoint,
    },
    credit_card::{
        create_credit_card_endpoint, delete_credit_card_endpoint, edit_credit_card_endpoint,
        list_credit_cards_endpoint,
    },
    endpoints,
    subscription::{
        create_subscription_endpoint, delete_subscription_endpoint, edit_subscription_endpoint,
        list_subscriptions_endpoint,
    },
    summary::{get_summary_endpoint, get_summary_trend_endpoint},
    transaction::{
        create_occurrence_endpoint, create_transaction_endpoint, delete_transaction_endpoint,
        edit_transaction_endpoint, list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            post(create_transaction_endpoint).get(list_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION_OCCURRENCES,
            post(create_occurrence_endpoint),
        )
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(endpoints::SUMMARY_TREND, get(get_summary_trend_endpoint))
        .route(
            endpoints::CATEGORIES,
            post(create_category_endpoint).get(list_categories_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            put(edit_category_endpoint).delete(delete_category_endpoint),
        )
        .route(
            endpoints::CARDS,
            post(create_credit_card_endpoint).get(list_credit_cards_endpoint),
        )
        .route(
            endpoints::CARD,
            put(edit_credit_card_endpoint).delete(delete_credit_card_endpoint),
        )
        .route(
            endpoints::SUBSCRIPTIONS,
            post(create_subscription_endpoint).get(list_subscriptions_endpoint),
        )
        .route(
            endpoints::SUBSCRIPTION,
            put(edit_subscription_endpoint).delete(delete_subscription_endpoint),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The JSON body served for unknown routes.
async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "the requested resource could not be found" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{AppState, build_router};

    #[test]
    fn router_builds_with_all_routes() {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(conn).unwrap();

        // Route registration panics on malformed paths, so building the
        // router at all is the assertion here.
        let _router = build_router(state);
    }
}
