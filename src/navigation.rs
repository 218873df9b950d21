//! This file defines the header shown at the top of signed-in pages.

use maud::{Markup, html};

use crate::{endpoints, html::BUTTON_PREMIUM_STYLE, user::User};

const PREMIUM_BADGE_STYLE: &str = "inline-flex items-center px-3 py-1 text-sm \
    font-semibold text-amber-800 bg-amber-100 rounded-full \
    dark:bg-amber-900 dark:text-amber-200";

const SIGN_OUT_STYLE: &str = "px-4 py-2 text-sm font-medium text-gray-700 \
    dark:text-gray-200 border border-gray-300 dark:border-gray-600 rounded \
    hover:bg-gray-100 dark:hover:bg-gray-700";

/// The header with the user's name, their tier and a sign out link.
///
/// Free users get an upgrade button that starts a checkout via HTMX and
/// follows the `HX-Redirect` to the payment provider.
pub fn header(user: &User) -> Markup {
    // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
    html!(
        nav class="bg-white border-gray-200 dark:bg-gray-900"
        {
            div
                class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4 gap-4"
            {
                a href=(endpoints::DASHBOARD_VIEW) class="flex items-center"
                {
                    span
                        class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        "Expense Tracker"
                    }
                }

                div class="flex flex-wrap items-center gap-4"
                {
                    span id="greeting" class="text-gray-700 dark:text-gray-300"
                    {
                        "Hello, " (user.name)
                    }

                    @if user.is_premium {
                        span id="premium-badge" class=(PREMIUM_BADGE_STYLE) { "Premium" }
                    } @else {
                        button
                            type="button"
                            id="upgrade-button"
                            hx-post=(endpoints::CHECKOUT)
                            hx-swap="none"
                            hx-target-error="#alert-container"
                            class=(BUTTON_PREMIUM_STYLE)
                        {
                            "Upgrade to Premium"
                        }
                    }

                    a href=(endpoints::SIGN_OUT) class=(SIGN_OUT_STYLE) { "Sign out" }
                }
            }
        }
    )
}
