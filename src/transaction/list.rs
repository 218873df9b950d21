//! The "Recent Transactions" card.

use maud::{Markup, html};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, CARD_STYLE, CARD_TITLE_STYLE, CATEGORY_BADGE_STYLE},
    tier::is_recent,
    transaction::{Transaction, TransactionKind},
};

/// Date format for list items, e.g. "Jan 1, 2024".
const LIST_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[month repr:short] [day padding:none], [year]");

/// Renders the user's transactions in storage order.
///
/// Transactions older than the free history window are listed after the
/// recent ones for Premium users and collapsed into an upgrade notice otherwise.
pub fn transaction_list(transactions: &[Transaction], is_premium: bool, today: Date) -> Markup {
    let (recent, older): (Vec<&Transaction>, Vec<&Transaction>) = transactions
        .iter()
        .partition(|transaction| is_recent(transaction, today));

    html! {
        section class=(CARD_STYLE)
        {
            h2 class=(CARD_TITLE_STYLE) { "Recent Transactions" }

            @if transactions.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No transactions yet. Add one to get started!"
                }
            } @else {
                ul id="transaction-list" class="space-y-3 max-h-[400px] overflow-y-auto pr-2"
                {
                    @for transaction in &recent {
                        (transaction_item(transaction))
                    }

                    @if is_premium {
                        @for transaction in &older {
                            (transaction_item(transaction))
                        }
                    } @else if !older.is_empty() {
                        li
                            id="locked-history"
                            class="p-3 rounded-md text-yellow-800 bg-yellow-100 \
                                dark:bg-yellow-900 dark:text-yellow-200"
                        {
                            "You have " (older.len()) " older transactions. \
                            Upgrade to Premium to access your full history!"
                        }
                    }
                }
            }
        }
    }
}

fn transaction_item(transaction: &Transaction) -> Markup {
    let (sign, amount_style) = match transaction.kind {
        TransactionKind::Income => ("+", "text-green-500"),
        TransactionKind::Expense => ("-", "text-red-500"),
    };
    let date = transaction
        .date
        .format(LIST_DATE_FORMAT)
        .unwrap_or_else(|_| transaction.date.to_string());
    let delete_url = format_endpoint(endpoints::TRANSACTION, &transaction.id);

    html! {
        li class="flex items-center justify-between p-3 rounded-md bg-gray-50 dark:bg-gray-700"
        {
            div class="flex-1"
            {
                div class="flex justify-between"
                {
                    h3 class="font-medium" { (transaction.description) }
                    span class={ "font-semibold " (amount_style) }
                    {
                        (sign) "$" (format!("{:.2}", transaction.amount))
                    }
                }

                div class="flex justify-between mt-1 text-sm text-gray-500 dark:text-gray-400"
                {
                    @if let Some(category) = &transaction.category {
                        span class=(CATEGORY_BADGE_STYLE) { (category) }
                    } @else {
                        span {}
                    }
                    span { (date) }
                }
            }

            button
                hx-delete=(delete_url)
                hx-confirm={ "Delete \"" (transaction.description) "\"?" }
                hx-target-error="#alert-container"
                class={ "ml-4 " (BUTTON_DELETE_STYLE) }
            {
                "Delete"
            }
        }
    }
}
