//! Opens checkouts for the Premium subscription and activates Premium once
//! a checkout has been paid for.

use std::sync::Mutex;

use rusqlite::Connection;

use crate::{
    Error,
    billing::provider::{CheckoutRequest, CheckoutSession, PaymentProvider, PaymentStatus, Price},
    endpoints,
    user::{UserID, set_premium},
};

/// The price of the Premium subscription.
pub const PREMIUM_PRICE: Price = Price {
    product_name: "Premium Subscription",
    unit_amount: 500,
    currency: "usd",
    interval: "month",
};

/// The payment provider replaces this placeholder with the session ID.
const CHECKOUT_SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Open a checkout for the Premium subscription tagged with `user_id`.
///
/// # Errors
///
/// Returns [Error::NotAuthenticated] if there is no signed in user, or the
/// provider's error if the checkout could not be created.
pub async fn create_checkout(
    user_id: Option<UserID>,
    provider: &dyn PaymentProvider,
    base_url: &str,
) -> Result<CheckoutSession, Error> {
    let user_id = user_id.ok_or(Error::NotAuthenticated)?;

    let request = CheckoutRequest {
        price: PREMIUM_PRICE,
        client_reference_id: user_id.to_string(),
        success_url: format!(
            "{base_url}{}?session_id={CHECKOUT_SESSION_ID_PLACEHOLDER}",
            endpoints::CHECKOUT_SUCCESS_VIEW
        ),
        cancel_url: format!("{base_url}{}", endpoints::ROOT),
    };

    let session = provider.create_checkout_session(&request).await?;
    tracing::info!("Created checkout session {} for user {user_id}", session.id);

    Ok(session)
}

/// Activate Premium for `user_id` if the checkout `session_id` has been paid
/// for and was opened by the same user.
///
/// Returns whether Premium was activated. Provider and database errors are
/// logged and reported as `false`.
pub async fn verify_and_activate(
    user_id: UserID,
    session_id: &str,
    provider: &dyn PaymentProvider,
    db_connection: &Mutex<Connection>,
) -> bool {
    let session = match provider.retrieve_checkout_session(session_id).await {
        Ok(session) => session,
        Err(error) => {
            tracing::error!("Could not retrieve checkout session {session_id}: {error}");
            return false;
        }
    };

    if session.payment_status != PaymentStatus::Paid {
        tracing::info!(
            "Checkout session {session_id} has not been paid: {:?}",
            session.payment_status
        );
        return false;
    }

    let expected_reference = user_id.to_string();
    if session.client_reference_id.as_deref() != Some(expected_reference.as_str()) {
        tracing::warn!(
            "Checkout session {session_id} belongs to {:?}, not user {user_id}",
            session.client_reference_id
        );
        return false;
    }

    let connection = match db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return false;
        }
    };

    match set_premium(user_id, &connection) {
        Ok(()) => {
            tracing::info!("Activated Premium for user {user_id}");
            true
        }
        Err(error) => {
            tracing::error!("Could not activate Premium for user {user_id}: {error}");
            false
        }
    }
}
