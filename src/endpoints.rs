//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the dashboard or sign in page.
pub const ROOT: &str = "/";
/// The landing page for signed in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The welcome page where users choose how to sign in.
pub const SIGN_IN_VIEW: &str = "/sign_in";
/// The page the payment provider returns to after a completed checkout.
pub const CHECKOUT_SUCCESS_VIEW: &str = "/success";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route that starts the Google sign in flow.
pub const GOOGLE_SIGN_IN: &str = "/api/auth/google";
/// The route the identity provider redirects back to after sign in.
pub const AUTH_CALLBACK: &str = "/api/auth/callback";
/// The route for signing out the current user.
pub const SIGN_OUT: &str = "/api/sign_out";
/// The route for creating transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route for deleting a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for creating a checkout session for the Premium subscription.
pub const CHECKOUT: &str = "/api/checkout";
/// The route for checking, and possibly activating, the Premium flag.
pub const PREMIUM_STATUS: &str = "/api/premium";
/// The route for generating AI insights for the current user.
pub const INSIGHTS: &str = "/api/insights";
/// Get a coffee.
pub const COFFEE: &str = "/api/coffee";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/transactions/{transaction_id}',
/// '{transaction_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
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
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::SIGN_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CHECKOUT_SUCCESS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::GOOGLE_SIGN_IN);
        assert_endpoint_is_valid_uri(endpoints::AUTH_CALLBACK);
        assert_endpoint_is_valid_uri(endpoints::SIGN_OUT);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::CHECKOUT);
        assert_endpoint_is_valid_uri(endpoints::PREMIUM_STATUS);
        assert_endpoint_is_valid_uri(endpoints::INSIGHTS);
        assert_endpoint_is_valid_uri(endpoints::COFFEE);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn accepts_string_ids() {
        let formatted_path = format_endpoint(endpoints::TRANSACTION, "3f2b-41aa");

        assert_eq!(formatted_path, "/api/transactions/3f2b-41aa");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
    }
}
