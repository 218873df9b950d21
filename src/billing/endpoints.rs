//! Route handlers for buying Premium and checking the Premium status.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::{HxRedirect, HxRequest};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error,
    auth::get_user_id_from_cookies,
    billing::{
        bridge::{create_checkout, verify_and_activate},
        provider::PaymentProvider,
    },
    endpoints,
    user::is_premium,
};

/// The state needed by the billing routes.
#[derive(Clone)]
pub struct BillingState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The public URL of the server, used for the checkout return URLs.
    pub base_url: String,
    /// The database connection for reading and writing the Premium flag.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Creates and verifies checkout sessions.
    pub payment_provider: Arc<dyn PaymentProvider>,
}

impl FromRef<AppState> for BillingState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            base_url: state.base_url.clone(),
            db_connection: state.db_connection.clone(),
            payment_provider: state.payment_provider.clone(),
        }
    }
}

impl FromRef<BillingState> for Key {
    fn from_ref(state: &BillingState) -> Self {
        state.cookie_key.clone()
    }
}

/// The query string set by the payment provider on the success URL.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    /// The ID of the checkout session that the user just completed.
    pub session_id: Option<String>,
}

/// Shown instead of the provider's error, which may echo its raw response.
const CHECKOUT_FAILED_MESSAGE: &str = "Could not start checkout. Please try again later.";

/// Create a checkout session for the signed in user.
///
/// Responds with the JSON `{"id": ..., "url": ...}`. HTMX requests are also
/// redirected to the checkout page.
pub async fn create_checkout_endpoint(
    State(state): State<BillingState>,
    HxRequest(is_htmx_request): HxRequest,
    jar: PrivateCookieJar,
) -> Response {
    let user_id = get_user_id_from_cookies(&jar);

    match create_checkout(user_id, state.payment_provider.as_ref(), &state.base_url).await {
        Ok(session) => {
            let body = Json(json!({ "id": session.id, "url": session.url }));

            match session.url {
                Some(url) if is_htmx_request => (HxRedirect(url), body).into_response(),
                _ => body.into_response(),
            }
        }
        Err(Error::NotAuthenticated) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Not authenticated" })),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not create checkout session: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": CHECKOUT_FAILED_MESSAGE })),
            )
                .into_response()
        }
    }
}

async fn check_premium(
    state: &BillingState,
    jar: &PrivateCookieJar,
    session_id: Option<&str>,
) -> bool {
    let Some(user_id) = get_user_id_from_cookies(jar) else {
        return false;
    };

    if let Some(session_id) = session_id {
        let activated = verify_and_activate(
            user_id,
            session_id,
            state.payment_provider.as_ref(),
            &state.db_connection,
        )
        .await;

        if activated {
            return true;
        }
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return false;
        }
    };

    is_premium(user_id, &connection).unwrap_or_else(|error| {
        tracing::error!("Could not read Premium status for user {user_id}: {error}");
        false
    })
}

/// Respond with `{"isPremium": bool}` for the signed in user.
///
/// If `session_id` refers to a paid checkout opened by the same user, Premium
/// is activated first.
pub async fn get_premium_status(
    State(state): State<BillingState>,
    jar: PrivateCookieJar,
    Query(query): Query<SessionQuery>,
) -> Response {
    let is_premium = check_premium(&state, &jar, query.session_id.as_deref()).await;

    Json(json!({ "isPremium": is_premium })).into_response()
}

/// The page the payment provider returns the user to after paying.
///
/// Activates Premium if the payment checks out and sends the user back to the dashboard.
pub async fn get_checkout_success_page(
    State(state): State<BillingState>,
    jar: PrivateCookieJar,
    Query(query): Query<SessionQuery>,
) -> Response {
    if get_user_id_from_cookies(&jar).is_none() {
        return Redirect::to(endpoints::SIGN_IN_VIEW).into_response();
    }

    let is_premium = check_premium(&state, &jar, query.session_id.as_deref()).await;
    tracing::info!("Returned from checkout, Premium: {is_premium}");

    Redirect::to(endpoints::DASHBOARD_VIEW).into_response()
}
