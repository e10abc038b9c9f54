use chrono::{Local, NaiveDate, TimeZone};
use std::collections::BTreeMap;

use crate::db::Transaction;

/// `YYYY-MM`
pub type MonthKey = String;

/// Bucket transactions by the calendar month of their date in local time.
pub fn group_by_month<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> BTreeMap<MonthKey, Vec<&'a Transaction>> {
    group_by_month_in(transactions, &Local)
}

/// Like [group_by_month], but the month boundaries are taken in `tz`.
///
/// Transactions keep their input order within a bucket.
pub fn group_by_month_in<'a, Tz: TimeZone>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    tz: &Tz,
) -> BTreeMap<MonthKey, Vec<&'a Transaction>> {
    let mut groups: BTreeMap<MonthKey, Vec<&'a Transaction>> = BTreeMap::new();
    for transaction in transactions {
        let key = transaction
            .date
            .with_timezone(tz)
            .naive_local()
            .format("%Y-%m")
            .to_string();
        groups.entry(key).or_default().push(transaction);
    }
    groups
}

/// Newest month first
pub fn month_keys<V>(groups: &BTreeMap<MonthKey, V>) -> Vec<MonthKey> {
    groups.keys().rev().cloned().collect()
}

/// `2025-04` -> `April 2025`. Keys that don't parse are returned as they are.
pub fn format_month_key(key: &str) -> String {
    match NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d") {
        Ok(date) => date.format("%B %Y").to_string(),
        Err(_) => key.to_string(),
    }
}
