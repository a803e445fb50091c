//! Demonstration data seeded on first run.

use crate::aggregate::sort_by_date_desc;
use crate::model::{Transaction, TransactionDraft, TransactionType};
use chrono::NaiveDate;

const SAMPLE: [(i32, u32, u32, TransactionType, &str, i32, &str); 10] = [
    (2023, 10, 25, TransactionType::Income, "Monthly member contributions", 1500, "5"),
    (2023, 10, 28, TransactionType::Expense, "Electricity & water bill", 250, "1"),
    (2023, 11, 1, TransactionType::Expense, "Office rent", 800, "3"),
    (2023, 11, 5, TransactionType::Income, "Charity programme proceeds", 3200, "5"),
    (2023, 11, 15, TransactionType::Expense, "Equipment for the open day", 550, "4"),
    (2023, 11, 20, TransactionType::Expense, "Staff wages", 1200, "2"),
    (2023, 11, 25, TransactionType::Income, "Member contributions", 500, "5"),
    (2023, 12, 1, TransactionType::Expense, "Office rent", 800, "3"),
    (2023, 12, 10, TransactionType::Expense, "Year-end dinner", 700, "4"),
    (2023, 12, 20, TransactionType::Expense, "Staff wages", 1200, "2"),
];

/// Ten transactions spread over October to December 2023, newest first, each with a fresh id.
pub fn sample_transactions() -> Vec<Transaction> {
    let mut transactions: Vec<Transaction> = SAMPLE
        .iter()
        .filter_map(|&(y, m, d, kind, description, amount, category_id)| {
            let date = NaiveDate::from_ymd_opt(y, m, d)?;
            let draft = TransactionDraft::new(date, kind, description, amount, category_id);
            Some(Transaction::new(draft))
        })
        .collect();
    sort_by_date_desc(&mut transactions);
    transactions
}
