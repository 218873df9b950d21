//! Buying the Premium tier through an external payment provider.

mod bridge;
mod endpoints;
mod provider;
mod stripe;

pub use endpoints::{create_checkout_endpoint, get_checkout_success_page, get_premium_status};
pub use provider::PaymentProvider;
pub use stripe::StripeClient;

#[cfg(test)]
pub(crate) use provider::{CheckoutRequest, CheckoutSession, PaymentStatus};
