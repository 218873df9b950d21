//! Signing users in with an external identity provider and keeping them
//! signed in with a private auth cookie.

mod cookie;
mod identity;
mod middleware;
mod redirect;
mod sign_in;
mod sign_out;
mod token;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub(crate) use cookie::get_user_id_from_cookies;
pub use identity::{GoogleIdentityProvider, IdentityProvider};
pub use middleware::{auth_guard, auth_guard_hx};
pub use sign_in::{get_sign_in_page, sign_in_callback, start_google_sign_in};
pub use sign_out::get_sign_out;

#[cfg(test)]
pub(crate) use cookie::{COOKIE_TOKEN, set_auth_cookie};
