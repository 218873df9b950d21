//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error, auth::DEFAULT_COOKIE_DURATION, auth::IdentityProvider, billing::PaymentProvider,
    db::initialize, insights::TextGenerator,
};

/// The external services the server talks to.
pub struct Providers {
    /// Signs users in, e.g. with Google.
    pub identity: Arc<dyn IdentityProvider>,
    /// Takes payment for the Premium subscription, e.g. with Stripe.
    pub payment: Arc<dyn PaymentProvider>,
    /// Generates the text for AI insights, e.g. with OpenAI.
    pub text: Arc<dyn TextGenerator>,
}

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The public URL of the server without a trailing slash, e.g. "https://example.com".
    pub base_url: String,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Signs users in.
    pub identity_provider: Arc<dyn IdentityProvider>,

    /// Creates and verifies checkout sessions.
    pub payment_provider: Arc<dyn PaymentProvider>,

    /// Generates insight text.
    pub text_generator: Arc<dyn TextGenerator>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
        base_url: &str,
        providers: Providers,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            db_connection: connection,
            identity_provider: providers.identity,
            payment_provider: providers.payment,
            text_generator: providers.text,
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
