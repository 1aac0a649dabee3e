//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}',
//! use [format_endpoint].

/// The route to create or list transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to materialize an occurrence of a recurring transaction.
pub const TRANSACTION_OCCURRENCES: &str = "/api/transactions/{transaction_id}/occurrences";
/// The route for the monthly financial summary.
pub const SUMMARY: &str = "/api/summary";
/// The route for the multi-month summary trend.
pub const SUMMARY_TREND: &str = "/api/summary/trend";
/// The route to create or list categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to update or delete a category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to create or list credit cards.
pub const CARDS: &str = "/api/cards";
/// The route to update or delete a credit card.
pub const CARD: &str = "/api/cards/{card_id}";
/// The route to create or list subscriptions.
pub const SUBSCRIPTIONS: &str = "/api/subscriptions";
/// The route to update or delete a subscription.
pub const SUBSCRIPTION: &str = "/api/subscriptions/{subscription_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/cards/{card_id}', '{card_id}' is
/// the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know the routes will parse as URIs.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION_OCCURRENCES);
        assert_endpoint_is_valid_uri(endpoints::SUMMARY);
        assert_endpoint_is_valid_uri(endpoints::SUMMARY_TREND);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::CARDS);
        assert_endpoint_is_valid_uri(endpoints::CARD);
        assert_endpoint_is_valid_uri(endpoints::SUBSCRIPTIONS);
        assert_endpoint_is_valid_uri(endpoints::SUBSCRIPTION);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint(endpoints::TRANSACTION, 1);

        assert_eq!(formatted_path, "/api/transactions/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint(endpoints::SUMMARY, 1);

        assert_eq!(formatted_path, "/api/summary");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::TRANSACTION_OCCURRENCES, 7);

        assert_eq!(formatted_path, "/api/transactions/7/occurrences");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
