//! Signing users in with an external OAuth 2.0 identity provider.

use async_trait::async_trait;
use serde::Deserialize;

use crate::{Error, user::Identity};

const GOOGLE_AUTHORIZATION_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const PROVIDER_NAME: &str = "Google";

/// An OAuth 2.0 provider using the authorization code flow.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The URL of the provider's consent page. `state` is echoed back to the callback.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange the authorization code from the callback for the user's identity.
    async fn exchange_code(&self, code: &str) -> Result<Identity, Error>;
}

/// Sign in with Google.
pub struct GoogleIdentityProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    http: reqwest::Client,
}

impl GoogleIdentityProvider {
    /// `redirect_uri` must match one registered for `client_id` in the Google Cloud console.
    pub fn new(client_id: &str, client_secret: &str, redirect_uri: &str) -> Self {
        Self {
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            redirect_uri: redirect_uri.to_owned(),
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

fn provider_error(error: impl std::fmt::Display) -> Error {
    Error::ProviderError {
        provider: PROVIDER_NAME,
        message: error.to_string(),
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self, state: &str) -> String {
        let query = serde_urlencoded::to_string([
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", "openid email profile"),
            ("state", state),
        ])
        .unwrap_or_default();

        format!("{GOOGLE_AUTHORIZATION_URL}?{query}")
    }

    async fn exchange_code(&self, code: &str) -> Result<Identity, Error> {
        let token: TokenResponse = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(provider_error)?
            .json()
            .await
            .map_err(provider_error)?;

        let user_info: UserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(provider_error)?
            .json()
            .await
            .map_err(provider_error)?;

        let email = user_info.email.unwrap_or_default();
        let name = user_info.name.unwrap_or_else(|| email.clone());

        Ok(Identity {
            subject: user_info.sub,
            name,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{GoogleIdentityProvider, IdentityProvider};

    #[test]
    fn authorization_url_has_code_flow_parameters() {
        let provider = GoogleIdentityProvider::new(
            "client-id",
            "secret",
            "https://example.com/api/auth/callback",
        );

        let url = provider.authorization_url("abc123");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid+email+profile"));
        assert!(url.contains("state=abc123"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fapi%2Fauth%2Fcallback"));
        assert!(!url.contains("secret"));
    }
}
