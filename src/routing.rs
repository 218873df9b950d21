//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_sign_in_page, get_sign_out, sign_in_callback,
        start_google_sign_in,
    },
    billing::{create_checkout_endpoint, get_checkout_success_page, get_premium_status},
    dashboard::get_dashboard_page,
    endpoints,
    insights::get_insights,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{create_transaction_endpoint, delete_transaction_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    // The billing routes check the auth cookie themselves so that they can
    // answer with JSON instead of a redirect.
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::SIGN_IN_VIEW, get(get_sign_in_page))
        .route(endpoints::GOOGLE_SIGN_IN, get(start_google_sign_in))
        .route(endpoints::AUTH_CALLBACK, get(sign_in_callback))
        .route(endpoints::SIGN_OUT, get(get_sign_out))
        .route(endpoints::CHECKOUT, post(create_checkout_endpoint))
        .route(endpoints::PREMIUM_STATUS, get(get_premium_status))
        .route(
            endpoints::CHECKOUT_SUCCESS_VIEW,
            get(get_checkout_success_page),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint),
            )
            .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
            .route(endpoints::INSIGHTS, post(get_insights))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
