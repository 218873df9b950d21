//! AI-generated insights about a user's finances, a Premium feature.

mod endpoint;
mod generator;
mod requester;
mod stats;
mod view;

pub use endpoint::get_insights;
pub use generator::{OpenAiClient, TextGenerator};
pub(crate) use view::{insights_card, upsell_card};
