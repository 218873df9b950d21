//! Transaction aggregation for the dashboard charts.
//!
//! Each aggregation keeps the order in which its buckets are first seen
//! while scanning the transactions, so callers control the output order
//! through the order of their input.

use std::collections::HashMap;

use serde::Deserialize;
use time::{Date, Duration, format_description::BorrowedFormatItem, macros::format_description};

use crate::transaction::{Transaction, TransactionKind};

/// Chart label format, e.g. "Jan 1".
const DAY_LABEL_FORMAT: &[BorrowedFormatItem] =
    format_description!("[month repr:short] [day padding:none]");

/// The time window shown in the charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// The last seven days, including today.
    #[default]
    Week,
    /// The current calendar month.
    Month,
    /// Every transaction.
    All,
}

impl TimeRange {
    /// The value of the `range` query parameter for this range.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::All => "all",
        }
    }

    /// The text shown on the tab for this range.
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Week => "Week",
            TimeRange::Month => "Month",
            TimeRange::All => "All Time",
        }
    }

    fn contains(&self, date: Date, today: Date) -> bool {
        match self {
            TimeRange::Week => {
                let start = today.saturating_sub(Duration::days(6));
                start <= date && date <= today
            }
            TimeRange::Month => date.year() == today.year() && date.month() == today.month(),
            TimeRange::All => true,
        }
    }
}

/// The transactions inside `range`, in their original order.
pub fn filter_by_range<'a>(
    transactions: &'a [Transaction],
    range: TimeRange,
    today: Date,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|transaction| range.contains(transaction.date, today))
        .collect()
}

/// Formats a date as a short month and day, e.g. "Jan 1".
///
/// The year is omitted, so dates a year apart share a label.
pub fn format_day_label(date: Date) -> String {
    date.format(DAY_LABEL_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// The income and expense totals for a single day label.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotal {
    pub label: String,
    pub income: f64,
    pub expense: f64,
}

/// Sums income and expenses per day label, in first-seen order.
pub fn daily_totals(transactions: &[&Transaction]) -> Vec<DailyTotal> {
    let mut totals: Vec<DailyTotal> = Vec::new();
    let mut index_by_label: HashMap<String, usize> = HashMap::new();

    for transaction in transactions {
        let label = format_day_label(transaction.date);
        let index = *index_by_label.entry(label.clone()).or_insert_with(|| {
            totals.push(DailyTotal {
                label,
                income: 0.0,
                expense: 0.0,
            });
            totals.len() - 1
        });

        let total = &mut totals[index];
        match transaction.kind {
            TransactionKind::Income => total.income += transaction.amount,
            TransactionKind::Expense => total.expense += transaction.amount,
        }
    }

    totals
}

/// The total for one category of one kind of transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    pub value: f64,
    pub kind: TransactionKind,
}

/// Sums amounts per (category, kind), in first-seen order.
///
/// Transactions without a category are grouped under
/// [TransactionKind::default_category].
pub fn category_totals(transactions: &[&Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index_by_key: HashMap<(String, TransactionKind), usize> = HashMap::new();

    for transaction in transactions {
        let name = transaction
            .category
            .clone()
            .unwrap_or_else(|| transaction.kind.default_category().to_owned());
        let key = (name.clone(), transaction.kind);
        let index = *index_by_key.entry(key).or_insert_with(|| {
            totals.push(CategoryTotal {
                name,
                value: 0.0,
                kind: transaction.kind,
            });
            totals.len() - 1
        });

        totals[index].value += transaction.amount;
    }

    totals
}

/// The balance at the end of a day label.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancePoint {
    pub label: String,
    pub balance: f64,
}

/// The running balance after each day, in date order.
///
/// Transactions are stably sorted by date before accumulating. When two
/// dates share a label, the later running total overwrites the earlier point.
pub fn running_balance(transactions: &[&Transaction]) -> Vec<BalancePoint> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by_key(|transaction| transaction.date);

    let mut points: Vec<BalancePoint> = Vec::new();
    let mut index_by_label: HashMap<String, usize> = HashMap::new();
    let mut balance = 0.0;

    for transaction in sorted {
        balance += transaction.signed_amount();
        let label = format_day_label(transaction.date);

        match index_by_label.get(&label) {
            Some(&index) => points[index].balance = balance,
            None => {
                index_by_label.insert(label.clone(), points.len());
                points.push(BalancePoint { label, balance });
            }
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::transaction::{Transaction, TransactionId, TransactionKind};

    use super::{
        BalancePoint, CategoryTotal, DailyTotal, TimeRange, category_totals, daily_totals,
        filter_by_range, format_day_label, running_balance,
    };

    fn transaction(
        kind: TransactionKind,
        amount: f64,
        date: Date,
        category: Option<&str>,
    ) -> Transaction {
        Transaction {
            id: TransactionId::new_random(),
            description: "test".to_owned(),
            amount,
            kind,
            date,
            category: category.map(str::to_owned),
        }
    }

    fn scenario() -> Vec<Transaction> {
        vec![
            transaction(TransactionKind::Income, 100.0, date!(2024 - 01 - 01), None),
            transaction(TransactionKind::Expense, 40.0, date!(2024 - 01 - 01), None),
            transaction(TransactionKind::Expense, 10.0, date!(2024 - 01 - 02), None),
        ]
    }

    #[test]
    fn daily_totals_for_scenario() {
        let transactions = scenario();
        let refs: Vec<_> = transactions.iter().collect();

        let got = daily_totals(&refs);

        assert_eq!(
            got,
            vec![
                DailyTotal {
                    label: "Jan 1".to_owned(),
                    income: 100.0,
                    expense: 40.0
                },
                DailyTotal {
                    label: "Jan 2".to_owned(),
                    income: 0.0,
                    expense: 10.0
                },
            ]
        );
    }

    #[test]
    fn running_balance_for_scenario() {
        let transactions = scenario();
        let refs: Vec<_> = transactions.iter().collect();

        let got = running_balance(&refs);

        assert_eq!(
            got,
            vec![
                BalancePoint {
                    label: "Jan 1".to_owned(),
                    balance: 60.0
                },
                BalancePoint {
                    label: "Jan 2".to_owned(),
                    balance: 50.0
                },
            ]
        );
    }

    #[test]
    fn daily_totals_keep_first_seen_order() {
        let transactions = vec![
            transaction(TransactionKind::Expense, 1.0, date!(2024 - 03 - 05), None),
            transaction(TransactionKind::Expense, 2.0, date!(2024 - 03 - 01), None),
            transaction(TransactionKind::Income, 3.0, date!(2024 - 03 - 05), None),
        ];
        let refs: Vec<_> = transactions.iter().collect();

        let labels: Vec<_> = daily_totals(&refs)
            .into_iter()
            .map(|total| total.label)
            .collect();

        assert_eq!(labels, vec!["Mar 5", "Mar 1"]);
    }

    #[test]
    fn running_balance_is_sorted_by_date_and_ends_at_net_total() {
        let transactions = vec![
            transaction(TransactionKind::Expense, 25.0, date!(2024 - 03 - 09), None),
            transaction(TransactionKind::Income, 200.0, date!(2024 - 03 - 01), None),
            transaction(TransactionKind::Expense, 30.0, date!(2024 - 03 - 04), None),
        ];
        let refs: Vec<_> = transactions.iter().collect();

        let got = running_balance(&refs);

        let labels: Vec<_> = got.iter().map(|point| point.label.as_str()).collect();
        assert_eq!(labels, vec!["Mar 1", "Mar 4", "Mar 9"]);
        assert_eq!(got.last().map(|point| point.balance), Some(145.0));
    }

    #[test]
    fn running_balance_collapses_label_collisions_across_years() {
        let transactions = vec![
            transaction(TransactionKind::Income, 10.0, date!(2023 - 01 - 01), None),
            transaction(TransactionKind::Income, 5.0, date!(2023 - 06 - 01), None),
            transaction(TransactionKind::Income, 1.0, date!(2024 - 01 - 01), None),
        ];
        let refs: Vec<_> = transactions.iter().collect();

        let got = running_balance(&refs);

        assert_eq!(
            got,
            vec![
                BalancePoint {
                    label: "Jan 1".to_owned(),
                    balance: 16.0
                },
                BalancePoint {
                    label: "Jun 1".to_owned(),
                    balance: 15.0
                },
            ]
        );
    }

    #[test]
    fn category_totals_split_by_kind_with_defaults() {
        let transactions = vec![
            transaction(TransactionKind::Expense, 10.0, date!(2024 - 03 - 01), Some("Food")),
            transaction(TransactionKind::Income, 50.0, date!(2024 - 03 - 01), None),
            transaction(TransactionKind::Expense, 5.0, date!(2024 - 03 - 02), Some("Food")),
            transaction(TransactionKind::Income, 7.0, date!(2024 - 03 - 02), Some("Food")),
            transaction(TransactionKind::Expense, 3.0, date!(2024 - 03 - 02), None),
        ];
        let refs: Vec<_> = transactions.iter().collect();

        let got = category_totals(&refs);

        assert_eq!(
            got,
            vec![
                CategoryTotal {
                    name: "Food".to_owned(),
                    value: 15.0,
                    kind: TransactionKind::Expense
                },
                CategoryTotal {
                    name: "Other Income".to_owned(),
                    value: 50.0,
                    kind: TransactionKind::Income
                },
                CategoryTotal {
                    name: "Food".to_owned(),
                    value: 7.0,
                    kind: TransactionKind::Income
                },
                CategoryTotal {
                    name: "Other Expense".to_owned(),
                    value: 3.0,
                    kind: TransactionKind::Expense
                },
            ]
        );
    }

    #[test]
    fn category_totals_conserve_amount_per_kind() {
        let transactions = vec![
            transaction(TransactionKind::Expense, 10.25, date!(2024 - 03 - 01), Some("Food")),
            transaction(TransactionKind::Expense, 4.75, date!(2024 - 03 - 01), Some("Rent")),
            transaction(TransactionKind::Income, 80.0, date!(2024 - 03 - 01), None),
            transaction(TransactionKind::Expense, 1.0, date!(2024 - 03 - 01), None),
        ];
        let refs: Vec<_> = transactions.iter().collect();

        let totals = category_totals(&refs);

        let sum_for = |kind| -> f64 {
            totals
                .iter()
                .filter(|total| total.kind == kind)
                .map(|total| total.value)
                .sum()
        };
        assert_eq!(sum_for(TransactionKind::Expense), 16.0);
        assert_eq!(sum_for(TransactionKind::Income), 80.0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let transactions = scenario();
        let refs: Vec<_> = transactions.iter().collect();

        assert_eq!(daily_totals(&refs), daily_totals(&refs));
        assert_eq!(category_totals(&refs), category_totals(&refs));
        assert_eq!(running_balance(&refs), running_balance(&refs));
    }

    #[test]
    fn week_range_covers_last_seven_days() {
        let today = date!(2024 - 06 - 10);
        let transactions = vec![
            transaction(TransactionKind::Expense, 1.0, date!(2024 - 06 - 03), None),
            transaction(TransactionKind::Expense, 1.0, date!(2024 - 06 - 04), None),
            transaction(TransactionKind::Expense, 1.0, date!(2024 - 06 - 10), None),
            transaction(TransactionKind::Expense, 1.0, date!(2024 - 06 - 11), None),
        ];

        let dates: Vec<_> = filter_by_range(&transactions, TimeRange::Week, today)
            .into_iter()
            .map(|transaction| transaction.date)
            .collect();

        assert_eq!(dates, vec![date!(2024 - 06 - 04), date!(2024 - 06 - 10)]);
    }

    #[test]
    fn month_range_covers_current_calendar_month() {
        let today = date!(2024 - 06 - 10);
        let transactions = vec![
            transaction(TransactionKind::Expense, 1.0, date!(2024 - 05 - 31), None),
            transaction(TransactionKind::Expense, 1.0, date!(2024 - 06 - 01), None),
            transaction(TransactionKind::Expense, 1.0, date!(2024 - 06 - 30), None),
            transaction(TransactionKind::Expense, 1.0, date!(2023 - 06 - 15), None),
        ];

        let dates: Vec<_> = filter_by_range(&transactions, TimeRange::Month, today)
            .into_iter()
            .map(|transaction| transaction.date)
            .collect();

        assert_eq!(dates, vec![date!(2024 - 06 - 01), date!(2024 - 06 - 30)]);
    }

    #[test]
    fn all_range_keeps_everything() {
        let transactions = scenario();

        let got = filter_by_range(&transactions, TimeRange::All, date!(2030 - 01 - 01));

        assert_eq!(got.len(), transactions.len());
    }

    #[test]
    fn day_labels_have_no_padding_or_year() {
        assert_eq!(format_day_label(date!(2024 - 01 - 01)), "Jan 1");
        assert_eq!(format_day_label(date!(2023 - 12 - 25)), "Dec 25");
    }
}
