//! Pure functions that derive summaries and chart series from a transaction sequence.
//!
//! Nothing here mutates its input. Functions take anything that iterates over `&Transaction` so
//! they can be chained after `filter` without copying records.

use crate::model::{Amount, Categories, Transaction, TransactionStatus, TransactionType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Criteria for selecting transactions. An unset criterion matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    search: Option<String>,
    kind: Option<TransactionType>,
    category_id: Option<String>,
    status: Option<TransactionStatus>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    /// When present, the search text is also matched against resolved category names.
    categories: Option<Categories>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match against the description. Blank text matches everything.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = if text.trim().is_empty() {
            None
        } else {
            Some(text.to_lowercase())
        };
        self
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn category_id(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Inclusive lower bound.
    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    /// Inclusive upper bound.
    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    /// Also match the search text against category names resolved through `categories`.
    pub fn search_categories(mut self, categories: Categories) -> Self {
        self.categories = Some(categories);
        self
    }

    /// Returns true if `t` satisfies every criterion that is set.
    pub fn matches(&self, t: &Transaction) -> bool {
        if let Some(kind) = self.kind {
            if t.kind() != kind {
                return false;
            }
        }
        if let Some(category_id) = &self.category_id {
            if t.category_id() != category_id {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if t.status() != status {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if t.date() < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if t.date() > to {
                return false;
            }
        }
        match &self.search {
            None => true,
            Some(needle) => {
                t.description().to_lowercase().contains(needle)
                    || self.categories.as_ref().is_some_and(|c| {
                        c.resolve(t.category_id()).to_lowercase().contains(needle)
                    })
            }
        }
    }
}

/// Returns the transactions matching `filters`, in their original relative order.
///
/// A `date_from` later than `date_to` matches nothing; it is not an error.
pub fn filter<'a>(transactions: &'a [Transaction], filters: &Filters) -> Vec<&'a Transaction> {
    transactions.iter().filter(|t| filters.matches(t)).collect()
}

/// Totals over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Summary {
    pub total_income: Amount,
    pub total_expense: Amount,
    /// Always `total_income - total_expense`.
    pub balance: Amount,
}

impl Summary {
    fn from_totals(total_income: Amount, total_expense: Amount) -> Self {
        Self {
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }
}

/// Sums income and expense over the transactions that match `filters`. Empty input gives all
/// zeros.
pub fn summarize<'a, I>(transactions: I, filters: &Filters) -> Summary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let (income, expense) = totals(transactions.into_iter().filter(|t| filters.matches(t)));
    Summary::from_totals(income, expense)
}

fn totals<'a, I>(transactions: I) -> (Amount, Amount)
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .fold((Amount::ZERO, Amount::ZERO), |(income, expense), t| {
            match t.kind() {
                TransactionType::Income => (income + t.amount(), expense),
                TransactionType::Expense => (income, expense + t.amount()),
            }
        })
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The full English name of `month` (1 through 12).
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("")
}

fn short_month_name(month: u32) -> &'static str {
    month_name(month).get(..3).unwrap_or("")
}

/// Income and expense for one calendar month of a given year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthBucket {
    /// 1 through 12.
    pub month: u32,
    pub income: Amount,
    pub expense: Amount,
}

impl MonthBucket {
    /// Three-letter month label, e.g. `Jan`.
    pub fn label(&self) -> &'static str {
        short_month_name(self.month)
    }
}

/// Buckets the transactions of `year` by month. Always returns 12 entries, January first, with
/// zeros for months that have no transactions.
pub fn bucket_by_month<'a, I>(transactions: I, year: i32) -> Vec<MonthBucket>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut buckets: Vec<MonthBucket> = (1..=12)
        .map(|month| MonthBucket {
            month,
            income: Amount::ZERO,
            expense: Amount::ZERO,
        })
        .collect();
    for t in transactions.into_iter().filter(|t| t.year() == year) {
        let bucket = &mut buckets[(t.month() - 1) as usize];
        match t.kind() {
            TransactionType::Income => bucket.income = bucket.income + t.amount(),
            TransactionType::Expense => bucket.expense = bucket.expense + t.amount(),
        }
    }
    buckets
}

/// Income and expense for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct YearBucket {
    pub year: i32,
    pub income: Amount,
    pub expense: Amount,
}

/// One entry per distinct year present in the data, ascending.
pub fn bucket_by_year<'a, I>(transactions: I) -> Vec<YearBucket>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut years: BTreeMap<i32, (Amount, Amount)> = BTreeMap::new();
    for t in transactions {
        let (income, expense) = years.entry(t.year()).or_insert((Amount::ZERO, Amount::ZERO));
        match t.kind() {
            TransactionType::Income => *income = *income + t.amount(),
            TransactionType::Expense => *expense = *expense + t.amount(),
        }
    }
    years
        .into_iter()
        .map(|(year, (income, expense))| YearBucket {
            year,
            income,
            expense,
        })
        .collect()
}

/// Income and expense for a calendar month, identified by year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PeriodBucket {
    pub year: i32,
    pub month: u32,
    pub income: Amount,
    pub expense: Amount,
}

impl PeriodBucket {
    /// Label such as `Jan 24`.
    pub fn label(&self) -> String {
        format!(
            "{} {:02}",
            short_month_name(self.month),
            self.year.rem_euclid(100)
        )
    }
}

/// The dashboard series: one entry per month that has data, oldest first, limited to the most
/// recent `months` entries.
pub fn rolling_months<'a, I>(transactions: I, months: usize) -> Vec<PeriodBucket>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut periods: BTreeMap<(i32, u32), (Amount, Amount)> = BTreeMap::new();
    for t in transactions {
        let (income, expense) = periods
            .entry((t.year(), t.month()))
            .or_insert((Amount::ZERO, Amount::ZERO));
        match t.kind() {
            TransactionType::Income => *income = *income + t.amount(),
            TransactionType::Expense => *expense = *expense + t.amount(),
        }
    }
    let skip = periods.len().saturating_sub(months);
    periods
        .into_iter()
        .skip(skip)
        .map(|((year, month), (income, expense))| PeriodBucket {
            year,
            month,
            income,
            expense,
        })
        .collect()
}

/// Stable sort by descending date. Records with the same date keep their relative order.
pub fn sort_by_date_desc(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date().cmp(&a.date()));
}

/// The `n` most recent transactions.
pub fn recent(transactions: &[Transaction], n: usize) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.date().cmp(&a.date()));
    sorted.truncate(n);
    sorted
}

/// The years that have data plus `current_year`, newest first.
pub fn years<'a, I>(transactions: I, current_year: i32) -> Vec<i32>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut years: Vec<i32> = transactions.into_iter().map(Transaction::year).collect();
    years.push(current_year);
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_date, TransactionDraft};
    use std::str::FromStr;

    fn txn(id: &str, date: &str, kind: TransactionType, amount: &str, cat: &str) -> Transaction {
        Transaction::with_id(
            id,
            TransactionDraft::new(
                parse_date(date).unwrap(),
                kind,
                format!("txn {id}"),
                Amount::from_str(amount).unwrap(),
                cat,
            ),
        )
    }

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn scenario() -> Vec<Transaction> {
        vec![
            txn("a", "2024-01-10", TransactionType::Expense, "250", "1"),
            txn("b", "2024-01-20", TransactionType::Income, "1500", "5"),
        ]
    }

    fn ids(ts: &[&Transaction]) -> Vec<String> {
        ts.iter().map(|t| t.id().to_string()).collect()
    }

    #[test]
    fn test_summarize_scenario() {
        let s = summarize(&scenario(), &Filters::new());
        assert_eq!(s.total_income, amt("1500"));
        assert_eq!(s.total_expense, amt("250"));
        assert_eq!(s.balance, amt("1250"));
    }

    #[test]
    fn test_summarize_empty_is_zero() {
        let s = summarize(&Vec::<Transaction>::new(), &Filters::new());
        assert_eq!(s, Summary::default());
        assert!(s.balance.is_zero());
    }

    #[test]
    fn test_summarize_all_filtered_out_is_zero() {
        let filters = Filters::new().category_id("nope");
        assert_eq!(summarize(&scenario(), &filters), Summary::default());
    }

    #[test]
    fn test_balance_identity_with_negative_balance() {
        let data = vec![
            txn("a", "2024-03-01", TransactionType::Expense, "10.10", "1"),
            txn("b", "2024-03-02", TransactionType::Expense, "0.20", "1"),
            txn("c", "2024-03-03", TransactionType::Income, "5", "5"),
        ];
        let s = summarize(&data, &Filters::new());
        assert_eq!(s.balance, s.total_income - s.total_expense);
        assert_eq!(s.balance, amt("-5.3"));
    }

    #[test]
    fn test_filter_date_bounds_inclusive() {
        let data = vec![
            txn("before", "2024-01-09", TransactionType::Expense, "1", "1"),
            txn("from", "2024-01-10", TransactionType::Expense, "1", "1"),
            txn("mid", "2024-01-15", TransactionType::Expense, "1", "1"),
            txn("to", "2024-01-20", TransactionType::Expense, "1", "1"),
            txn("after", "2024-01-21", TransactionType::Expense, "1", "1"),
        ];
        let filters = Filters::new()
            .date_from(parse_date("2024-01-10").unwrap())
            .date_to(parse_date("2024-01-20").unwrap());
        assert_eq!(ids(&filter(&data, &filters)), vec!["from", "mid", "to"]);
    }

    #[test]
    fn test_filter_single_bound() {
        let data = scenario();
        let from = Filters::new().date_from(parse_date("2024-01-15").unwrap());
        assert_eq!(ids(&filter(&data, &from)), vec!["b"]);
        let to = Filters::new().date_to(parse_date("2024-01-15").unwrap());
        assert_eq!(ids(&filter(&data, &to)), vec!["a"]);
    }

    #[test]
    fn test_filter_inverted_range_is_empty() {
        let filters = Filters::new()
            .date_from(parse_date("2024-02-01").unwrap())
            .date_to(parse_date("2024-01-01").unwrap());
        assert!(filter(&scenario(), &filters).is_empty());
    }

    #[test]
    fn test_filter_preserves_order() {
        let data = vec![
            txn("z", "2024-01-01", TransactionType::Income, "1", "5"),
            txn("y", "2024-03-01", TransactionType::Expense, "1", "1"),
            txn("x", "2024-02-01", TransactionType::Income, "1", "5"),
        ];
        let filters = Filters::new().kind(TransactionType::Income);
        assert_eq!(ids(&filter(&data, &filters)), vec!["z", "x"]);
    }

    #[test]
    fn test_filter_search_case_insensitive() {
        let mut data = scenario();
        data[0].description = "Electricity BILL".to_string();
        let filters = Filters::new().search("bill");
        assert_eq!(ids(&filter(&data, &filters)), vec!["a"]);
        let blank = Filters::new().search("   ");
        assert_eq!(filter(&data, &blank).len(), 2);
    }

    #[test]
    fn test_filter_search_category_names() {
        let data = scenario();
        let plain = Filters::new().search("donation");
        assert!(filter(&data, &plain).is_empty());
        let rich = plain.search_categories(Categories::defaults());
        assert_eq!(ids(&filter(&data, &rich)), vec!["b"]);
    }

    #[test]
    fn test_filter_status() {
        let mut data = scenario();
        data[1].status = TransactionStatus::Pending;
        let filters = Filters::new().status(TransactionStatus::Pending);
        assert_eq!(ids(&filter(&data, &filters)), vec!["b"]);
    }

    #[test]
    fn test_bucket_by_month_is_complete() {
        let buckets = bucket_by_month(&scenario(), 2024);
        assert_eq!(buckets.len(), 12);
        let months: Vec<u32> = buckets.iter().map(|b| b.month).collect();
        assert_eq!(months, (1..=12).collect::<Vec<u32>>());
        assert_eq!(buckets[0].income, amt("1500"));
        assert_eq!(buckets[0].expense, amt("250"));
        assert!(buckets[1..].iter().all(|b| b.income.is_zero() && b.expense.is_zero()));
        assert_eq!(buckets[0].label(), "Jan");
        assert_eq!(buckets[11].label(), "Dec");
    }

    #[test]
    fn test_bucket_by_month_other_year_is_all_zero() {
        let buckets = bucket_by_month(&scenario(), 2023);
        assert_eq!(buckets.len(), 12);
        assert!(buckets.iter().all(|b| b.income.is_zero() && b.expense.is_zero()));
    }

    #[test]
    fn test_bucket_by_year_ascending() {
        let data = vec![
            txn("a", "2025-05-01", TransactionType::Income, "10", "5"),
            txn("b", "2023-05-01", TransactionType::Expense, "3", "1"),
            txn("c", "2025-06-01", TransactionType::Expense, "4", "1"),
        ];
        let buckets = bucket_by_year(&data);
        assert_eq!(
            buckets,
            vec![
                YearBucket {
                    year: 2023,
                    income: Amount::ZERO,
                    expense: amt("3"),
                },
                YearBucket {
                    year: 2025,
                    income: amt("10"),
                    expense: amt("4"),
                },
            ]
        );
        assert!(bucket_by_year(&Vec::<Transaction>::new()).is_empty());
    }

    #[test]
    fn test_rolling_months_keeps_latest() {
        let data = vec![
            txn("a", "2023-11-01", TransactionType::Income, "1", "5"),
            txn("b", "2024-01-05", TransactionType::Expense, "2", "1"),
            txn("c", "2023-12-01", TransactionType::Expense, "3", "1"),
            txn("d", "2024-01-09", TransactionType::Income, "4", "5"),
        ];
        let series = rolling_months(&data, 2);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label(), "Dec 23");
        assert_eq!(series[1].label(), "Jan 24");
        assert_eq!(series[1].income, amt("4"));
        assert_eq!(series[1].expense, amt("2"));
    }

    #[test]
    fn test_sort_by_date_desc_is_stable() {
        let mut data = vec![
            txn("first", "2024-01-10", TransactionType::Expense, "1", "1"),
            txn("newest", "2024-02-01", TransactionType::Expense, "1", "1"),
            txn("second", "2024-01-10", TransactionType::Income, "1", "5"),
        ];
        sort_by_date_desc(&mut data);
        let order: Vec<&str> = data.iter().map(Transaction::id).collect();
        assert_eq!(order, vec!["newest", "first", "second"]);
    }

    #[test]
    fn test_recent() {
        let data = scenario();
        assert_eq!(ids(&recent(&data, 1)), vec!["b"]);
        assert_eq!(recent(&data, 5).len(), 2);
    }

    #[test]
    fn test_years_includes_current() {
        let data = vec![
            txn("a", "2022-01-01", TransactionType::Income, "1", "5"),
            txn("b", "2024-01-01", TransactionType::Income, "1", "5"),
            txn("c", "2022-06-01", TransactionType::Income, "1", "5"),
        ];
        assert_eq!(years(&data, 2026), vec![2026, 2024, 2022]);
        assert_eq!(years(&data, 2024), vec![2024, 2022]);
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(3), "March");
        assert_eq!(month_name(0), "");
        assert_eq!(month_name(13), "");
    }

    #[test]
    fn test_labels_out_of_range_month() {
        let bucket = MonthBucket {
            month: 0,
            income: Amount::ZERO,
            expense: Amount::ZERO,
        };
        assert_eq!(bucket.label(), "");
        let period = PeriodBucket {
            year: 2024,
            month: 13,
            income: Amount::ZERO,
            expense: Amount::ZERO,
        };
        assert_eq!(period.label(), " 24");
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let max = "79228162514264337593543950335";
        let data = vec![
            txn("a", "2024-01-10", TransactionType::Income, max, "5"),
            txn("b", "2024-01-11", TransactionType::Income, max, "5"),
            txn("c", "2024-01-12", TransactionType::Expense, max, "1"),
        ];
        let s = summarize(&data, &Filters::new());
        assert_eq!(s.total_income, amt(max));
        assert_eq!(s.balance, Amount::ZERO);
        assert_eq!(bucket_by_month(&data, 2024)[0].income, amt(max));
        assert_eq!(bucket_by_year(&data)[0].income, amt(max));
        assert_eq!(rolling_months(&data, 1)[0].income, amt(max));
    }
}
