//! Requests an observation and saving tips for a set of transactions.

use crate::{
    insights::{generator::TextGenerator, stats::InsightStats},
    transaction::Transaction,
};

/// Shown in place of the observation when the text generator fails.
pub const OBSERVATION_UNAVAILABLE: &str =
    "Unable to generate insights at this time. Please try again later.";

/// Shown when the tips could not be generated or parsed.
pub const FALLBACK_TIPS: [&str; 3] = [
    "Consider reducing your largest expense category",
    "Try to save at least 20% of your income",
    "Track your expenses regularly to identify patterns",
];

const TIP_COUNT: usize = 3;

/// What the text generator had to say about a user's finances.
#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub observation: String,
    pub tips: Vec<String>,
}

fn fallback_tips() -> Vec<String> {
    FALLBACK_TIPS.iter().map(|tip| (*tip).to_owned()).collect()
}

/// Removes a Markdown code fence, e.g. "```json\n[...]\n```", around `text`.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };

    // Drop the language tag on the opening line.
    let inner = match inner.split_once('\n') {
        Some((_, rest)) => rest,
        None => inner,
    };

    inner.trim_end().trim_end_matches("```").trim()
}

/// Parse the tips response, a JSON array of strings.
///
/// The first three tips are kept. Anything other than an array of at least
/// three strings yields [FALLBACK_TIPS].
pub fn parse_tips(text: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(strip_code_fence(text)) {
        Ok(mut tips) if tips.len() >= TIP_COUNT => {
            tips.truncate(TIP_COUNT);
            tips
        }
        Ok(tips) => {
            tracing::warn!("Expected {TIP_COUNT} tips, got {}", tips.len());
            fallback_tips()
        }
        Err(error) => {
            tracing::warn!("Could not parse tips response: {error}");
            fallback_tips()
        }
    }
}

/// Ask `generator` for an observation and three tips about `transactions`.
///
/// Both requests run concurrently and failures are replaced with fallback text.
pub async fn request_insights(
    transactions: &[Transaction],
    generator: &dyn TextGenerator,
) -> Insights {
    let stats = InsightStats::from_transactions(transactions);
    let observation_prompt = stats.observation_prompt();
    let tips_prompt = stats.tips_prompt();

    let (observation, tips) = tokio::join!(
        generator.generate_text(&observation_prompt),
        generator.generate_text(&tips_prompt)
    );

    let observation = observation.unwrap_or_else(|error| {
        tracing::error!("Error generating insights: {error}");
        OBSERVATION_UNAVAILABLE.to_owned()
    });

    let tips = match tips {
        Ok(text) => parse_tips(&text),
        Err(error) => {
            tracing::error!("Error generating tips: {error}");
            fallback_tips()
        }
    };

    Insights { observation, tips }
}
