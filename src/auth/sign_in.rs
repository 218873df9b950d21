//! This file defines the routes for the sign-in page and the OAuth sign-in flow.
//! The auth module handles the lower level authentication and cookie auth logic.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key, SameSite},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

use crate::{
    AppState, Error,
    auth::{cookie::set_auth_cookie, identity::IdentityProvider, redirect::safe_return_path},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, CARD_STYLE, base, link},
    user::upsert_user,
};

/// The private cookie holding the sign-in state while the user is at the identity provider.
const COOKIE_SIGN_IN_STATE: &str = "oauth_state";
const SIGN_IN_STATE_DURATION: Duration = Duration::minutes(10);

/// The state needed for signing in.
#[derive(Clone)]
pub struct SignInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for creating and updating users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The provider users sign in with.
    pub identity_provider: Arc<dyn IdentityProvider>,
}

impl FromRef<AppState> for SignInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
            identity_provider: state.identity_provider.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignInState> for Key {
    fn from_ref(state: &SignInState) -> Self {
        state.cookie_key.clone()
    }
}

/// Where to send the user once they have signed in.
#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    /// A relative URL on this site.
    pub redirect_url: Option<String>,
}

/// The query string the identity provider sends to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// The authorization code to exchange for the user's identity.
    pub code: Option<String>,
    /// Must match the state stored in the sign-in cookie.
    pub state: Option<String>,
    /// Set by the provider if the user denied access or something went wrong.
    pub error: Option<String>,
}

/// Stored in a private cookie between redirecting to the identity provider and the callback.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct SignInCookie {
    csrf_token: String,
    redirect_url: Option<String>,
}

fn parse_redirect_url(raw_url: Option<&str>) -> Option<String> {
    match raw_url.and_then(safe_return_path) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL: {redirect_url}");
            }
            None
        }
    }
}

fn google_sign_in_url(redirect_url: Option<&str>) -> String {
    let query = redirect_url
        .and_then(|redirect_url| serde_urlencoded::to_string([("redirect_url", redirect_url)]).ok());

    match query {
        Some(query) => format!("{}?{query}", endpoints::GOOGLE_SIGN_IN),
        None => endpoints::GOOGLE_SIGN_IN.to_owned(),
    }
}

fn sign_in_card(heading: &str, content: Markup) -> Markup {
    html! {
        section class="flex flex-col items-center justify-center min-h-screen px-6 py-8 mx-auto"
        {
            div class={ (CARD_STYLE) " max-w-md space-y-6 text-center" }
            {
                h1 class="text-2xl font-bold text-gray-900 dark:text-white" { (heading) }

                (content)
            }
        }
    }
}

/// Display the sign-in page.
pub async fn get_sign_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref());

    let content = sign_in_card(
        "Welcome to Expense Tracker",
        html! {
            p class="text-gray-600 dark:text-gray-300"
            {
                "Please sign in to start tracking your expenses."
            }

            a
                id="google-sign-in"
                href=(google_sign_in_url(redirect_url.as_deref()))
                class={ "block " (BUTTON_PRIMARY_STYLE) }
            {
                "Sign in with Google"
            }
        },
    );

    base("Sign In", &[], &content).into_response()
}

fn sign_in_failed_page(status: StatusCode) -> Response {
    let content = sign_in_card(
        "Sign in failed",
        html! {
            p class="text-gray-600 dark:text-gray-300"
            {
                "We could not sign you in. Please "
                (link(endpoints::SIGN_IN_VIEW, "try again"))
                "."
            }
        },
    );

    (status, base("Sign In Failed", &[], &content)).into_response()
}

/// Redirect the user to the identity provider's consent page.
///
/// A random state is stored in a short-lived private cookie and checked in the callback.
pub async fn start_google_sign_in(
    State(state): State<SignInState>,
    jar: PrivateCookieJar,
    Query(query): Query<RedirectQuery>,
) -> Response {
    let sign_in_cookie = SignInCookie {
        csrf_token: Uuid::new_v4().to_string(),
        redirect_url: parse_redirect_url(query.redirect_url.as_deref()),
    };

    let value = match serde_json::to_string(&sign_in_cookie) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!("Could not serialize sign-in state: {error}");
            return sign_in_failed_page(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let jar = jar.add(
        Cookie::build((COOKIE_SIGN_IN_STATE, value))
            .max_age(SIGN_IN_STATE_DURATION)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(true),
    );
    let authorization_url = state
        .identity_provider
        .authorization_url(&sign_in_cookie.csrf_token);

    (jar, Redirect::to(&authorization_url)).into_response()
}

fn take_sign_in_cookie(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<SignInCookie>) {
    let sign_in_cookie = jar
        .get(COOKIE_SIGN_IN_STATE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok());

    (
        jar.remove(Cookie::build(COOKIE_SIGN_IN_STATE).path("/")),
        sign_in_cookie,
    )
}

/// The sign-in cookie, if the provider echoed back the state stored in it.
///
/// # Errors
///
/// Returns [Error::SignInStateMismatch] if the cookie is missing or the states differ.
fn check_sign_in_state(
    sign_in_cookie: Option<SignInCookie>,
    returned_state: Option<&str>,
) -> Result<SignInCookie, Error> {
    match sign_in_cookie {
        Some(sign_in_cookie) if returned_state == Some(sign_in_cookie.csrf_token.as_str()) => {
            Ok(sign_in_cookie)
        }
        _ => Err(Error::SignInStateMismatch),
    }
}

/// Handle the identity provider redirecting back after the user consented.
///
/// On success the user is created or updated, the auth cookie is set and the
/// user is sent to where they were going before signing in.
pub async fn sign_in_callback(
    State(state): State<SignInState>,
    jar: PrivateCookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let (jar, sign_in_cookie) = take_sign_in_cookie(jar);

    if let Some(error) = query.error {
        tracing::warn!("Identity provider returned an error: {error}");
        return (jar, sign_in_failed_page(StatusCode::UNAUTHORIZED)).into_response();
    }

    let sign_in_cookie = match check_sign_in_state(sign_in_cookie, query.state.as_deref()) {
        Ok(sign_in_cookie) => sign_in_cookie,
        Err(error) => {
            tracing::warn!("Sign-in rejected: {error}");
            return (jar, sign_in_failed_page(StatusCode::BAD_REQUEST)).into_response();
        }
    };

    let Some(code) = query.code else {
        tracing::warn!("Sign-in callback is missing the authorization code.");
        return (jar, sign_in_failed_page(StatusCode::BAD_REQUEST)).into_response();
    };

    let identity = match state.identity_provider.exchange_code(&code).await {
        Ok(identity) => identity,
        Err(error) => {
            tracing::error!("Could not exchange authorization code: {error}");
            return (jar, sign_in_failed_page(StatusCode::BAD_GATEWAY)).into_response();
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return (jar, sign_in_failed_page(StatusCode::INTERNAL_SERVER_ERROR))
                    .into_response();
            }
        };

        match upsert_user(&identity, &connection) {
            Ok(user) => user,
            Err(error) => {
                tracing::error!("Could not save user {}: {error}", identity.subject);
                return (jar, sign_in_failed_page(StatusCode::INTERNAL_SERVER_ERROR))
                    .into_response();
            }
        }
    };

    let jar = match set_auth_cookie(jar.clone(), user.id, state.cookie_duration) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            return (jar, sign_in_failed_page(StatusCode::INTERNAL_SERVER_ERROR)).into_response();
        }
    };

    tracing::info!("User {} signed in", user.id);
    let redirect_url = sign_in_cookie
        .redirect_url
        .unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());

    (jar, Redirect::to(&redirect_url)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{Router, routing::get};
    use axum_test::TestServer;
    use scraper::Selector;

    use crate::{
        Error,
        auth::cookie::COOKIE_TOKEN,
        endpoints,
        test_utils::{
            VALID_AUTH_CODE, assert_valid_html, get_test_app_state, get_test_connection,
            parse_html_document, test_identity,
        },
        user::get_user_by_id,
    };

    use super::{
        SignInCookie, check_sign_in_state, get_sign_in_page, sign_in_callback,
        start_google_sign_in,
    };

    fn get_test_server() -> (TestServer, crate::AppState) {
        let state = get_test_app_state(get_test_connection());
        let app = Router::new()
            .route(endpoints::SIGN_IN_VIEW, get(get_sign_in_page))
            .route(endpoints::GOOGLE_SIGN_IN, get(start_google_sign_in))
            .route(endpoints::AUTH_CALLBACK, get(sign_in_callback))
            .with_state(state.clone());

        let server = TestServer::new(app);

        (server, state)
    }

    fn state_from_location(location: &str) -> String {
        location
            .split_once("state=")
            .map(|(_, state)| state.to_owned())
            .expect("authorization URL has no state")
    }

    #[tokio::test]
    async fn sign_in_page_links_to_google_with_redirect() {
        let (server, _) = get_test_server();

        let response = server
            .get(endpoints::SIGN_IN_VIEW)
            .add_query_param("redirect_url", "/dashboard?range=month")
            .await;

        response.assert_status_ok();
        let html = parse_html_document(&response.text());
        assert_valid_html(&html);
        let text: String = html.root_element().text().collect();
        assert!(text.contains("Welcome to Expense Tracker"));
        assert!(text.contains("Please sign in to start tracking your expenses."));
        let link = html
            .select(&Selector::parse("a#google-sign-in").unwrap())
            .next()
            .expect("no sign in link");
        assert_eq!(
            link.value().attr("href"),
            Some("/api/auth/google?redirect_url=%2Fdashboard%3Frange%3Dmonth")
        );
    }

    #[tokio::test]
    async fn sign_in_page_drops_unsafe_redirect() {
        let (server, _) = get_test_server();

        let response = server
            .get(endpoints::SIGN_IN_VIEW)
            .add_query_param("redirect_url", "https://evil.example")
            .await;

        let html = parse_html_document(&response.text());
        let link = html
            .select(&Selector::parse("a#google-sign-in").unwrap())
            .next()
            .unwrap();
        assert_eq!(link.value().attr("href"), Some(endpoints::GOOGLE_SIGN_IN));
    }

    #[tokio::test]
    async fn full_sign_in_flow_sets_auth_cookie_and_redirects() {
        let (server, state) = get_test_server();

        let response = server
            .get(endpoints::GOOGLE_SIGN_IN)
            .add_query_param("redirect_url", "/dashboard?range=all")
            .await;
        response.assert_status_see_other();
        let csrf_state = state_from_location(response.header("location").to_str().unwrap());

        let response = server
            .get(endpoints::AUTH_CALLBACK)
            .add_cookies(response.cookies())
            .add_query_param("code", VALID_AUTH_CODE)
            .add_query_param("state", &csrf_state)
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), "/dashboard?range=all");
        assert_eq!(response.cookie(COOKIE_TOKEN).http_only(), Some(true));

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_id(crate::UserID::new(1), &connection).unwrap();
        assert_eq!(user.subject, test_identity().subject);
        assert!(!user.is_premium);
    }

    #[tokio::test]
    async fn callback_with_wrong_state_fails() {
        let (server, _) = get_test_server();
        let response = server.get(endpoints::GOOGLE_SIGN_IN).await;

        let response = server
            .get(endpoints::AUTH_CALLBACK)
            .add_cookies(response.cookies())
            .add_query_param("code", VALID_AUTH_CODE)
            .add_query_param("state", "not-the-state")
            .await;

        response.assert_status_bad_request();
        assert!(response.text().contains("Sign in failed"));
        assert!(response.cookies().get(COOKIE_TOKEN).is_none());
    }

    #[tokio::test]
    async fn callback_without_sign_in_cookie_fails() {
        let (server, _) = get_test_server();

        let response = server
            .get(endpoints::AUTH_CALLBACK)
            .add_query_param("code", VALID_AUTH_CODE)
            .add_query_param("state", "anything")
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn callback_with_rejected_code_fails() {
        let (server, _) = get_test_server();
        let response = server.get(endpoints::GOOGLE_SIGN_IN).await;
        let csrf_state = state_from_location(response.header("location").to_str().unwrap());

        let response = server
            .get(endpoints::AUTH_CALLBACK)
            .add_cookies(response.cookies())
            .add_query_param("code", "bad-code")
            .add_query_param("state", &csrf_state)
            .await;

        response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
        assert!(response.text().contains("Sign in failed"));
    }

    #[test]
    fn sign_in_state_must_match_the_cookie() {
        let cookie = || SignInCookie {
            csrf_token: "abc".to_owned(),
            redirect_url: Some("/dashboard".to_owned()),
        };

        assert_eq!(check_sign_in_state(Some(cookie()), Some("abc")), Ok(cookie()));
        assert_eq!(
            check_sign_in_state(Some(cookie()), Some("abd")),
            Err(Error::SignInStateMismatch)
        );
        assert_eq!(
            check_sign_in_state(Some(cookie()), None),
            Err(Error::SignInStateMismatch)
        );
        assert_eq!(
            check_sign_in_state(None, Some("abc")),
            Err(Error::SignInStateMismatch)
        );
    }
}
