//! Period reports: the transactions of a year or month, oldest first, followed by totals.

use crate::aggregate::{month_name, summarize, Filters, Summary};
use crate::error::ErrorType;
use crate::model::{AmountFormat, Categories, Transaction, DATE_FORMAT};
use crate::rows::{OutputFormat, Rows, Table};
use crate::Result;
use serde::Serialize;

/// A calendar year, or one month of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    year: i32,
    month: Option<u32>,
}

impl ReportPeriod {
    pub fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    /// # Errors
    /// Returns a validation error if `month` is not 1 through 12.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ErrorType::Validation.err(format!(
                "Month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self {
            year,
            month: Some(month),
        })
    }

    /// `March 2024` for a month, `Year 2024` for a whole year.
    pub fn label(&self) -> String {
        match self.month {
            Some(month) => format!("{} {}", month_name(month), self.year),
            None => format!("Year {}", self.year),
        }
    }

    pub fn contains(&self, t: &Transaction) -> bool {
        t.year() == self.year && self.month.map_or(true, |m| t.month() == m)
    }

    /// The transactions in this period, oldest first. Same-date records keep their order.
    pub fn select<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        let mut selected: Vec<&Transaction> =
            transactions.iter().filter(|t| self.contains(t)).collect();
        selected.sort_by_key(|t| t.date());
        selected
    }
}

/// One line of a report, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportRow {
    pub date: String,
    /// `Income` or `Expense`.
    pub kind: String,
    pub description: String,
    /// The category name, or `N/A` if the category no longer exists.
    pub category: String,
    /// Two decimal places.
    pub amount: String,
}

/// The report table: rows plus the three summary lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Report {
    period: String,
    rows: Vec<ReportRow>,
    summary: Summary,
}

const HEADERS: [&str; 5] = ["Date", "Type", "Description", "Category", "Amount"];
const TOTAL_INCOME: &str = "Total Income";
const TOTAL_EXPENSE: &str = "Total Expense";
const BALANCE: &str = "Balance";

impl Report {
    /// Builds the report for `period`.
    ///
    /// # Errors
    /// Returns a `NotFound` error if the period has no transactions, since there is nothing to
    /// export.
    pub fn build(
        transactions: &[Transaction],
        categories: &Categories,
        period: ReportPeriod,
    ) -> Result<Self> {
        let selected = period.select(transactions);
        if selected.is_empty() {
            return Err(ErrorType::NotFound.err(format!(
                "There is no data to export for {}",
                period.label()
            )));
        }
        let rows = selected
            .iter()
            .map(|t| ReportRow {
                date: t.date().format(DATE_FORMAT).to_string(),
                kind: t.kind().label().to_string(),
                description: t.description().to_string(),
                category: categories.resolve(t.category_id()).to_string(),
                amount: t.amount().format(AmountFormat::Fixed),
            })
            .collect();
        let summary = summarize(selected.iter().copied(), &Filters::new());
        Ok(Self {
            period: period.label(),
            rows,
            summary,
        })
    }

    pub fn period(&self) -> &str {
        &self.period
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// The three summary lines as label and two-decimal amount.
    pub fn summary_rows(&self) -> [(&'static str, String); 3] {
        [
            (
                TOTAL_INCOME,
                self.summary.total_income.format(AmountFormat::Fixed),
            ),
            (
                TOTAL_EXPENSE,
                self.summary.total_expense.format(AmountFormat::Fixed),
            ),
            (BALANCE, self.summary.balance.format(AmountFormat::Fixed)),
        ]
    }

    /// Renders the report. CSV and table output carry a blank separator row and then the summary
    /// rows under the amount column; JSON carries the report as an object.
    pub fn render(&self, format: OutputFormat) -> Result<Rows> {
        if format == OutputFormat::Json {
            let value = serde_json::json!({
                "period": self.period,
                "rows": self.rows,
                "summary": self.summary_rows()
                    .iter()
                    .map(|(label, amount)| serde_json::json!({"label": label, "amount": amount}))
                    .collect::<Vec<_>>(),
            });
            return Ok(Rows::Json(value));
        }

        let mut table = Table::new(HEADERS).align_right(&[4]);
        for row in &self.rows {
            table.push([
                row.date.as_str(),
                row.kind.as_str(),
                row.description.as_str(),
                row.category.as_str(),
                row.amount.as_str(),
            ]);
        }
        table.push(Vec::<String>::new());
        for (label, amount) in self.summary_rows() {
            table.push([String::new(), String::new(), String::new(), label.to_string(), amount]);
        }

        Ok(match table.render(format)? {
            Rows::Table(s) => Rows::Table(format!("Report for: {}\n\n{s}", self.period)),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_date, Amount, TransactionDraft, TransactionType};
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

    fn data() -> Vec<Transaction> {
        vec![
            txn("d", "2024-03-20", TransactionType::Expense, "99.5", "42"),
            txn("c", "2024-03-02", TransactionType::Income, "1500", "5"),
            txn("b", "2024-02-10", TransactionType::Expense, "250", "1"),
            txn("a", "2023-03-05", TransactionType::Income, "10", "5"),
        ]
    }

    #[test]
    fn test_period_label() {
        assert_eq!(ReportPeriod::month(2024, 3).unwrap().label(), "March 2024");
        assert_eq!(ReportPeriod::year(2024).label(), "Year 2024");
        assert!(ReportPeriod::month(2024, 13).is_err());
        assert!(ReportPeriod::month(2024, 0).is_err());
    }

    #[test]
    fn test_select_ascending() {
        let data = data();
        let ids: Vec<&str> = ReportPeriod::year(2024)
            .select(&data)
            .into_iter()
            .map(Transaction::id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "d"]);

        let march = ReportPeriod::month(2024, 3).unwrap().select(&data);
        assert_eq!(march.len(), 2);
    }

    #[test]
    fn test_build_rows_and_summary() {
        let report = Report::build(
            &data(),
            &Categories::defaults(),
            ReportPeriod::month(2024, 3).unwrap(),
        )
        .unwrap();
        assert_eq!(report.period(), "March 2024");
        assert_eq!(
            report.rows()[0],
            ReportRow {
                date: "2024-03-02".to_string(),
                kind: "Income".to_string(),
                description: "txn c".to_string(),
                category: "Donations".to_string(),
                amount: "1500.00".to_string(),
            }
        );
        assert_eq!(report.rows()[1].category, "N/A");
        assert_eq!(report.rows()[1].amount, "99.50");
        assert_eq!(
            report.summary_rows(),
            [
                ("Total Income", "1500.00".to_string()),
                ("Total Expense", "99.50".to_string()),
                ("Balance", "1400.50".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_period_is_refused() {
        let e = Report::build(&data(), &Categories::defaults(), ReportPeriod::year(2020))
            .unwrap_err();
        assert_eq!(ErrorType::of(&e), Some(ErrorType::NotFound));
        assert!(format!("{e:#}").contains("Year 2020"));
    }

    #[test]
    fn test_render_csv() {
        let report =
            Report::build(&data(), &Categories::defaults(), ReportPeriod::year(2023)).unwrap();
        let Rows::Csv(s) = report.render(OutputFormat::Csv).unwrap() else {
            panic!("expected csv");
        };
        let expected = "Date,Type,Description,Category,Amount\n\
            2023-03-05,Income,txn a,Donations,10.00\n\
            ,,,,\n\
            ,,,Total Income,10.00\n\
            ,,,Total Expense,0.00\n\
            ,,,Balance,10.00\n";
        assert_eq!(s, expected);
    }

    #[test]
    fn test_render_json_and_table() {
        let report =
            Report::build(&data(), &Categories::defaults(), ReportPeriod::year(2024)).unwrap();
        let Rows::Json(v) = report.render(OutputFormat::Json).unwrap() else {
            panic!("expected json");
        };
        assert_eq!(v["period"], "Year 2024");
        assert_eq!(v["rows"].as_array().unwrap().len(), 3);
        assert_eq!(v["summary"][2]["label"], "Balance");
        assert_eq!(v["summary"][2]["amount"], "1150.50");

        let Rows::Table(s) = report.render(OutputFormat::Table).unwrap() else {
            panic!("expected a table");
        };
        assert!(s.starts_with("Report for: Year 2024\n\n| Date"));
        assert!(s.contains("Total Expense"));
    }
}
