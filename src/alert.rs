//! Alert messages that are swapped into the page's alert container by HTMX.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A dismissable message shown to the user after an HTMX request.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Something went wrong and the user may need to act on it.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (message, details, container_style, icon) = match self {
            Alert::Error { message, details } => (
                message,
                details,
                "text-red-800 border-red-300 bg-red-50 dark:bg-gray-800 \
                dark:text-red-400 dark:border-red-800",
                "!",
            ),
        };

        html! {
            div
                role="alert"
                class={ "flex items-start gap-3 p-4 mb-4 text-sm border rounded-lg " (container_style) }
            {
                span class="font-bold" { (icon) }

                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="ms-auto font-bold"
                    onclick="this.parentElement.remove()"
                {
                    "×"
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn error_alert_shows_message_and_details() {
        let alert = Alert::Error {
            message: "Invalid transaction".to_owned(),
            details: "Description cannot be empty".to_owned(),
        };

        let fragment = Html::parse_fragment(&alert.into_html().into_string());
        let selector = Selector::parse("div[role=alert] p").unwrap();
        let paragraphs = fragment
            .select(&selector)
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();

        assert_eq!(
            paragraphs,
            vec!["Invalid transaction", "Description cannot be empty"]
        );
    }

    #[test]
    fn empty_details_are_omitted() {
        let alert = Alert::Error {
            message: "Something went wrong".to_owned(),
            details: String::new(),
        };

        let fragment = Html::parse_fragment(&alert.into_html().into_string());
        let selector = Selector::parse("div[role=alert] p").unwrap();

        assert_eq!(fragment.select(&selector).count(), 1);
    }
}
