//! The "AI Insights" card and its upsell.

use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PREMIUM_STYLE, CARD_STYLE, CARD_TITLE_STYLE, loading_spinner},
    insights::requester::Insights,
};

/// The card for Premium users, which loads its content once the page is shown.
pub fn insights_card() -> Markup {
    html! {
        section id="insights-card" class=(CARD_STYLE)
        {
            div class="flex items-center justify-between mb-4"
            {
                h2 class=(CARD_TITLE_STYLE) { "AI Insights" }

                button
                    type="button"
                    id="refresh-insights"
                    hx-post=(endpoints::INSIGHTS)
                    hx-target="#insights-content"
                    hx-target-error="#alert-container"
                    class="px-3 py-1 text-sm rounded border border-gray-300 dark:border-gray-600 \
                        hover:bg-gray-100 dark:hover:bg-gray-700"
                {
                    "Refresh"
                }
            }

            div
                id="insights-content"
                hx-post=(endpoints::INSIGHTS)
                hx-trigger="load"
                hx-target-error="#alert-container"
            {
                p class="text-gray-500 dark:text-gray-400"
                {
                    (loading_spinner()) " Analyzing your finances..."
                }
            }
        }
    }
}

/// The card shown to free users in place of insights.
pub fn upsell_card() -> Markup {
    html! {
        section id="insights-upsell" class=(CARD_STYLE)
        {
            h2 class=(CARD_TITLE_STYLE) { "AI Insights" }

            p class="mb-4 text-gray-600 dark:text-gray-300"
            {
                "Upgrade to Premium for AI-powered insights!"
            }

            button
                type="button"
                hx-post=(endpoints::CHECKOUT)
                hx-target-error="#alert-container"
                class=(BUTTON_PREMIUM_STYLE)
            {
                "Upgrade to Premium"
            }
        }
    }
}

pub fn insights_content(insights: &Insights) -> Markup {
    html! {
        p class="mb-4 text-gray-700 dark:text-gray-300 whitespace-pre-line"
        {
            (insights.observation)
        }

        h3 class="mb-2 font-semibold" { "Saving Tips" }

        ul class="space-y-2 list-disc list-inside"
        {
            @for tip in &insights.tips {
                li { (tip) }
            }
        }
    }
}
