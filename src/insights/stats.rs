//! Summary statistics sent to the text generator.

use serde_json::{Map, Value};

use crate::transaction::{Transaction, TransactionKind};

/// Expenses without a category are grouped under this name.
const UNCATEGORIZED: &str = "Other";

/// Totals over a set of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightStats {
    pub total_income: f64,
    pub total_expense: f64,
    /// Expense totals per category in the order the categories first appear.
    pub expense_categories: Vec<(String, f64)>,
}

impl InsightStats {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut total_income = 0.0;
        let mut total_expense = 0.0;
        let mut expense_categories: Vec<(String, f64)> = Vec::new();

        for transaction in transactions {
            match transaction.kind {
                TransactionKind::Income => total_income += transaction.amount,
                TransactionKind::Expense => {
                    total_expense += transaction.amount;

                    let name = transaction.category.as_deref().unwrap_or(UNCATEGORIZED);
                    match expense_categories.iter_mut().find(|(category, _)| category == name) {
                        Some((_, total)) => *total += transaction.amount,
                        None => expense_categories.push((name.to_owned(), transaction.amount)),
                    }
                }
            }
        }

        Self {
            total_income,
            total_expense,
            expense_categories,
        }
    }

    /// The expense categories as a JSON object, e.g. `{"Food":40.0,"Other":10.0}`.
    pub fn categories_json(&self) -> String {
        let categories: Map<String, Value> = self
            .expense_categories
            .iter()
            .map(|(name, total)| (name.clone(), Value::from(*total)))
            .collect();

        Value::Object(categories).to_string()
    }

    fn summary(&self) -> String {
        format!(
            "Total Income: ${:.2}\nTotal Expenses: ${:.2}\nExpense Categories: {}",
            self.total_income,
            self.total_expense,
            self.categories_json()
        )
    }

    /// Asks for a short free-text observation about spending patterns.
    pub fn observation_prompt(&self) -> String {
        format!(
            "Analyze this financial data and provide a brief, helpful insight about the spending patterns:\n\n\
            {}\n\n\
            Keep your response under 150 words and focus on the most important patterns or observations.",
            self.summary()
        )
    }

    /// Asks for three saving tips formatted as a JSON array of strings.
    pub fn tips_prompt(&self) -> String {
        format!(
            "Based on this financial data, provide 3 specific, actionable tips to help the user save money:\n\n\
            {}\n\n\
            Format your response as a JSON array of 3 strings, each containing one tip.\n\
            Each tip should be concise (under 100 characters) and specific to the data.\n\
            Example format: [\"Tip 1\", \"Tip 2\", \"Tip 3\"]",
            self.summary()
        )
    }
}
