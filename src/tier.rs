//! Decides which transactions a user may see based on their subscription tier.
//!
//! Free users see the trailing two calendar months of history, Premium users see everything.

use time::{Date, Month};

use crate::transaction::Transaction;

/// The number of calendar months of history visible to free users.
const FREE_HISTORY_MONTHS: u8 = 2;

/// The earliest date visible to free users when the current date is `today`.
///
/// Subtracts whole calendar months, clamping the day to the end of the
/// target month, e.g. 2024-04-30 gives 2024-02-29.
pub fn history_cutoff(today: Date) -> Date {
    subtract_months(today, FREE_HISTORY_MONTHS)
}

fn subtract_months(date: Date, months: u8) -> Date {
    let mut year = date.year();
    let mut month = date.month();
    for _ in 0..months {
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }

    let last_day = month.length(year);
    let day = date.day().min(last_day);

    // The day is clamped to the month length so this cannot fail for any
    // year in `time`'s supported range.
    Date::from_calendar_date(year, month, day).unwrap_or(date)
}

/// Whether `transaction` falls inside the history visible to free users.
pub fn is_recent(transaction: &Transaction, today: Date) -> bool {
    transaction.date >= history_cutoff(today)
}

/// The transactions a user may see, in their original order.
///
/// Premium users see every transaction. Free users see only the
/// transactions dated on or after [history_cutoff].
pub fn visible(transactions: &[Transaction], is_premium: bool, today: Date) -> Vec<Transaction> {
    if is_premium {
        return transactions.to_vec();
    }

    transactions
        .iter()
        .filter(|transaction| is_recent(transaction, today))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::transaction::{Transaction, TransactionId, TransactionKind};

    use super::{history_cutoff, visible};

    fn transaction_on(id: &str, date: Date) -> Transaction {
        Transaction {
            id: TransactionId::new_unchecked(id),
            description: id.to_owned(),
            amount: 10.0,
            kind: TransactionKind::Expense,
            date,
            category: None,
        }
    }

    #[test]
    fn premium_sees_everything_in_order() {
        let transactions = vec![
            transaction_on("b", date!(2020 - 01 - 01)),
            transaction_on("a", date!(2024 - 05 - 01)),
        ];

        let got = visible(&transactions, true, date!(2024 - 06 - 01));

        assert_eq!(got, transactions);
    }

    #[test]
    fn free_users_see_last_two_months() {
        let old = transaction_on("old", date!(2024 - 01 - 01));
        let recent = transaction_on("recent", date!(2024 - 04 - 15));
        let transactions = vec![old, recent.clone()];

        let got = visible(&transactions, false, date!(2024 - 06 - 01));

        assert_eq!(got, vec![recent]);
    }

    #[test]
    fn cutoff_date_is_inclusive() {
        let boundary = transaction_on("boundary", date!(2024 - 04 - 01));
        let before = transaction_on("before", date!(2024 - 03 - 31));

        let got = visible(&[before, boundary.clone()], false, date!(2024 - 06 - 01));

        assert_eq!(got, vec![boundary]);
    }

    #[test]
    fn free_filter_preserves_relative_order() {
        let transactions = vec![
            transaction_on("c", date!(2024 - 05 - 20)),
            transaction_on("old", date!(2023 - 05 - 20)),
            transaction_on("a", date!(2024 - 05 - 01)),
        ];

        let ids: Vec<_> = visible(&transactions, false, date!(2024 - 06 - 01))
            .into_iter()
            .map(|transaction| transaction.description)
            .collect();

        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn cutoff_clamps_to_end_of_month() {
        assert_eq!(history_cutoff(date!(2024 - 04 - 30)), date!(2024 - 02 - 29));
        assert_eq!(history_cutoff(date!(2023 - 04 - 30)), date!(2023 - 02 - 28));
    }

    #[test]
    fn cutoff_crosses_year_boundary() {
        assert_eq!(history_cutoff(date!(2024 - 01 - 15)), date!(2023 - 11 - 15));
        assert_eq!(history_cutoff(date!(2024 - 02 - 10)), date!(2023 - 12 - 10));
    }
}
