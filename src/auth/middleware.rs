//! Middleware that only lets signed in users through.
//!
//! Guarded handlers receive the user as `Extension<UserID>`, and every
//! response to a signed in user pushes the auth cookie's expiry forward.

use axum::{
    extract::{FromRef, Request, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{return_path_for, sign_in_url},
    },
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session lasts after the user's latest request.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How a request without a valid auth cookie is sent to the sign in page.
#[derive(Debug, Clone, Copy)]
enum Rejection {
    /// A `303 See Other`, for full page loads.
    Redirect,
    /// An `HX-Redirect` header, since HTMX swaps the body of a redirect instead of following it.
    HxRedirect,
}

impl Rejection {
    fn respond(self, request: &Request) -> Response {
        let url = sign_in_url(&return_path_for(request));

        match self {
            Rejection::Redirect => Redirect::to(&url).into_response(),
            Rejection::HxRedirect => (HxRedirect(url), StatusCode::OK).into_response(),
        }
    }
}

async fn guard(
    state: AuthState,
    rejection: Rejection,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = PrivateCookieJar::from_headers(request.headers(), state.cookie_key.clone());
    let token = match get_token_from_cookies(&jar) {
        Ok(token) => token,
        Err(error) => {
            tracing::debug!("Turning away {} {}: {error}", request.method(), request.uri());
            return rejection.respond(&request);
        }
    };

    request.extensions_mut().insert(token.user_id);
    let mut response = next.run(request).await;
    refresh_auth_cookie(jar, state.cookie_duration, response.headers_mut());

    response
}

/// Append a `Set-Cookie` header that keeps the session alive for another `duration`.
fn refresh_auth_cookie(jar: PrivateCookieJar, duration: Duration, headers: &mut HeaderMap) {
    let jar = match extend_auth_cookie_duration_if_needed(jar, duration) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not extend the auth cookie: {error}");
            return;
        }
    };

    for value in jar.into_response().headers().get_all(SET_COOKIE) {
        headers.append(SET_COOKIE, value.clone());
    }
}

/// Guard for pages: signed out users are redirected to sign in.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, Rejection::Redirect, request, next).await
}

/// Guard for HTMX endpoints: signed out users get an `HX-Redirect` to sign in
/// that returns them to the page they were on.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, Rejection::HxRedirect, request, next).await
}
