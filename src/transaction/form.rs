use maud::{Markup, html};
use time::Date;

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, CARD_TITLE_STYLE, FORM_LABEL_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner,
    },
};

/// The "Add Transaction" card. The date defaults to `today` and the kind to expense.
pub fn transaction_form(today: Date) -> Markup {
    let spinner = loading_spinner();

    html! {
        section class=(CARD_STYLE)
        {
            h2 class=(CARD_TITLE_STYLE) { "Add Transaction" }

            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                class="w-full space-y-4"
            {
                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        name="description"
                        id="description"
                        type="text"
                        placeholder="e.g. Groceries"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="grid grid-cols-1 gap-4 md:grid-cols-2"
                {
                    div
                    {
                        label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                        input
                            name="amount"
                            id="amount"
                            type="number"
                            step="0.01"
                            min="0.01"
                            placeholder="0.00"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                        input
                            name="category"
                            id="category"
                            type="text"
                            placeholder="Optional"
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        required
                        value=(today)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                fieldset class="space-y-2"
                {
                    legend class=(FORM_LABEL_STYLE) { "Type" }

                    div class="flex gap-3"
                    {
                        div class="flex flex-1 items-center gap-3"
                        {
                            input
                                name="kind"
                                id="kind-expense"
                                type="radio"
                                value="expense"
                                checked
                                required
                                class=(FORM_RADIO_INPUT_STYLE);

                            label for="kind-expense" class=(FORM_RADIO_LABEL_STYLE) { "Expense" }
                        }

                        div class="flex flex-1 items-center gap-3"
                        {
                            input
                                name="kind"
                                id="kind-income"
                                type="radio"
                                value="income"
                                required
                                class=(FORM_RADIO_INPUT_STYLE);

                            label for="kind-income" class=(FORM_RADIO_LABEL_STYLE) { "Income" }
                        }
                    }
                }

                button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="htmx-indicator" { (spinner) }
                    "Add Transaction"
                }
            }
        }
    }
}
