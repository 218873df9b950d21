//! A [PaymentProvider] backed by the Stripe Checkout Sessions API.

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::{
    Error,
    billing::provider::{CheckoutRequest, CheckoutSession, PaymentProvider},
};

const STRIPE_API_URL: &str = "https://api.stripe.com/v1";
const PROVIDER_NAME: &str = "Stripe";

/// Talks to Stripe with a secret API key.
pub struct StripeClient {
    secret_key: String,
    client: Client,
    endpoint: String,
}

impl StripeClient {
    /// Create a client that authenticates with `secret_key`.
    pub fn new(secret_key: &str) -> Self {
        Self {
            secret_key: secret_key.to_owned(),
            client: Client::new(),
            endpoint: STRIPE_API_URL.to_owned(),
        }
    }
}

fn provider_error(error: impl std::fmt::Display) -> Error {
    Error::ProviderError {
        provider: PROVIDER_NAME,
        message: error.to_string(),
    }
}

/// The URL of a single checkout session, with `session_id` escaped as one path segment.
fn session_url(endpoint: &str, session_id: &str) -> Result<Url, Error> {
    let mut url = Url::parse(endpoint).map_err(provider_error)?;
    url.path_segments_mut()
        .map_err(|_| provider_error(format!("{endpoint} cannot have a path")))?
        .extend(["checkout", "sessions", session_id]);

    Ok(url)
}

/// Stripe expects nested parameters as bracketed, form-encoded keys.
fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "subscription".to_owned()),
        ("payment_method_types[0]", "card".to_owned()),
        (
            "line_items[0][price_data][currency]",
            request.price.currency.to_owned(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            request.price.product_name.to_owned(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            request.price.unit_amount.to_string(),
        ),
        (
            "line_items[0][price_data][recurring][interval]",
            request.price.interval.to_owned(),
        ),
        ("line_items[0][quantity]", "1".to_owned()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("client_reference_id", request.client_reference_id.clone()),
    ]
}

async fn parse_session(response: reqwest::Response) -> Result<CheckoutSession, Error> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(provider_error(format!("Stripe returned {status}: {body}")));
    }

    response.json().await.map_err(provider_error)
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, Error> {
        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.endpoint))
            .bearer_auth(&self.secret_key)
            .form(&checkout_form(request))
            .send()
            .await
            .map_err(provider_error)?;

        parse_session(response).await
    }

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<CheckoutSession, Error> {
        let response = self
            .client
            .get(session_url(&self.endpoint, session_id)?)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(provider_error)?;

        parse_session(response).await
    }
}

#[cfg(test)]
mod tests {
    use crate::billing::provider::{CheckoutRequest, CheckoutSession, PaymentStatus, Price};

    use super::{STRIPE_API_URL, checkout_form, session_url};

    #[test]
    fn checkout_form_describes_monthly_subscription() {
        let request = CheckoutRequest {
            price: Price {
                product_name: "Premium Subscription",
                unit_amount: 500,
                currency: "usd",
                interval: "month",
            },
            client_reference_id: "42".to_owned(),
            success_url: "https://example.com/success?session_id={CHECKOUT_SESSION_ID}".to_owned(),
            cancel_url: "https://example.com/".to_owned(),
        };

        let form = checkout_form(&request);
        let get = |key: &str| {
            form.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.as_str())
        };

        assert_eq!(get("mode"), Some("subscription"));
        assert_eq!(get("payment_method_types[0]"), Some("card"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("500"));
        assert_eq!(
            get("line_items[0][price_data][recurring][interval]"),
            Some("month")
        );
        assert_eq!(get("client_reference_id"), Some("42"));
    }

    #[test]
    fn parses_stripe_session_json() {
        let json = r#"{
            "id": "cs_test_123",
            "object": "checkout.session",
            "url": null,
            "payment_status": "paid",
            "client_reference_id": "42",
            "status": "complete"
        }"#;

        let session: CheckoutSession = serde_json::from_str(json).unwrap();

        assert_eq!(
            session,
            CheckoutSession {
                id: "cs_test_123".to_owned(),
                url: None,
                payment_status: PaymentStatus::Paid,
                client_reference_id: Some("42".to_owned()),
            }
        );
    }

    #[test]
    fn session_id_stays_inside_its_path_segment() {
        let url = session_url(STRIPE_API_URL, "cs_test_123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.stripe.com/v1/checkout/sessions/cs_test_123"
        );

        let url = session_url(STRIPE_API_URL, "../x?y").unwrap();
        let segments: Vec<_> = url.path_segments().unwrap().collect();
        assert_eq!(segments.len(), 4);
        assert_eq!(&segments[..3], ["v1", "checkout", "sessions"]);
        assert!(segments[3].contains("%2F"));
        assert_eq!(url.query(), None);
    }
}
