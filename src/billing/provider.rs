//! The payment provider capability used by the billing bridge.

use async_trait::async_trait;
use serde::Deserialize;

use crate::Error;

/// A recurring price for a single product.
#[derive(Debug, Clone, PartialEq)]
pub struct Price {
    /// The product name shown on the checkout page.
    pub product_name: &'static str,
    /// The price in the smallest unit of `currency`, e.g. cents.
    pub unit_amount: u32,
    /// Lowercase ISO currency code, e.g. "usd".
    pub currency: &'static str,
    /// How often the price is charged, e.g. "month".
    pub interval: &'static str,
}

/// The details needed to open a provider-hosted checkout page.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// What the user is paying for.
    pub price: Price,
    /// Identifies the user that the checkout belongs to.
    pub client_reference_id: String,
    /// Where the provider sends the user after paying.
    pub success_url: String,
    /// Where the provider sends the user if they back out.
    pub cancel_url: String,
}

/// Whether a checkout has been paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// The payment went through.
    Paid,
    /// The payment has not been made, or has not finished processing.
    Unpaid,
    /// The checkout completed without needing a payment.
    NoPaymentRequired,
}

/// A checkout session as reported by the payment provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutSession {
    /// The provider's ID for the session.
    pub id: String,
    /// The URL of the hosted checkout page. Only present while the session is open.
    #[serde(default)]
    pub url: Option<String>,
    /// Whether the session has been paid for.
    pub payment_status: PaymentStatus,
    /// The reference given when the session was created.
    #[serde(default)]
    pub client_reference_id: Option<String>,
}

/// Takes payments through a provider-hosted checkout page.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Open a new checkout session.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, Error>;

    /// Look up an existing checkout session by its ID.
    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<CheckoutSession, Error>;
}
