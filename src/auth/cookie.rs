//! Defines functions for handling user authentication with cookies.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::token::Token, user::UserID};

/// The name of the private cookie holding the auth [Token].
pub(crate) const COOKIE_TOKEN: &str = "token";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::hours(1);

/// The auth cookie must be sent on the top-level navigation back from the
/// identity provider, so `Strict` is not an option.
const AUTH_COOKIE_SAME_SITE: SameSite = SameSite::Lax;

fn build_token_cookie(token: &Token) -> Result<Cookie<'static>, Error> {
    let value = serde_json::to_string(token)?;

    Ok(Cookie::build((COOKIE_TOKEN, value))
        .expires(token.expires_at)
        .path("/")
        .http_only(true)
        .same_site(AUTH_COOKIE_SAME_SITE)
        .secure(true)
        .build())
}

/// Add an auth cookie to the cookie jar, indicating that a user is signed in and authenticated.
///
/// Sets the initial expiry of the cookie to `duration` from the current time.
/// You can use [DEFAULT_COOKIE_DURATION] for the default duration.
///
/// # Errors
///
/// Returns an [Error::InvalidDateFormat] if the expiry would overflow, or an
/// [Error::JSONSerializationError] if the token could not be serialized.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let cookie = build_token_cookie(&Token::new(user_id, duration)?)?;

    Ok(jar.add(cookie))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .path("/")
            .http_only(true)
            .same_site(AUTH_COOKIE_SAME_SITE)
            .secure(true),
    )
}

/// Get the token from the auth cookie.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if there is no auth cookie in `jar`.
/// - [Error::JSONSerializationError] if the cookie does not hold a token.
/// - [Error::CookieExpired] if the token has expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token: Token = serde_json::from_str(cookie.value())?;

    if token.is_expired(OffsetDateTime::now_utc()) {
        return Err(Error::CookieExpired);
    }

    Ok(token)
}

/// The ID of the signed in user, or `None` if there is no valid auth cookie.
pub(crate) fn get_user_id_from_cookies(jar: &PrivateCookieJar) -> Option<UserID> {
    get_token_from_cookies(jar).ok().map(|token| token.user_id)
}

/// Set the expiry of the auth cookie in `jar` to the latest of UTC now
/// plus `duration` and the cookie's current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns an error if the auth cookie is missing, invalid or expired, or if
/// the new expiry would overflow.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?.extended(duration)?;
    let cookie = build_token_cookie(&token)?;

    Ok(jar.add(cookie))
}
