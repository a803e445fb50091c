//! Handlers for the dashboard numbers: totals, chart series and recent activity.

use crate::aggregate::{
    bucket_by_month, bucket_by_year, recent as most_recent, rolling_months, summarize, Summary,
};
use crate::args::{ChartArgs, FilterArgs, RecentArgs, Series};
use crate::commands::transactions::transaction_table;
use crate::commands::{plural, Out};
use crate::model::{Amount, AmountFormat};
use crate::rows::{OutputFormat, Rows, Table};
use crate::{utils, Config, Result};
use chrono::Datelike;

/// Totals income, expense and balance over the transactions that match `args`.
pub async fn summary(config: Config, args: FilterArgs) -> Result<Out<Summary>> {
    let ledger = config.ledger().await?;
    let filters = args.filters(&ledger.categories());
    let summary = summarize(&ledger.transactions(), &filters);
    let money = |a: Amount| format!("{} {}", config.currency(), a.format(AmountFormat::Money));
    let message = format!(
        "Total income: {}, total expense: {}, balance: {}",
        money(summary.total_income),
        money(summary.total_expense),
        money(summary.balance)
    );
    Ok(Out::new(message, summary))
}

/// Computes one of the chart series and renders it as rows.
pub async fn chart(config: Config, args: ChartArgs) -> Result<Out<Rows>> {
    let ledger = config.ledger().await?;
    let transactions = ledger.transactions();
    let (label, series) = match *args.series() {
        Series::Monthly { year } => {
            let year = year.unwrap_or_else(|| utils::today().year());
            let buckets = bucket_by_month(&transactions, year);
            let series = buckets
                .iter()
                .map(|b| (b.label().to_string(), b.income, b.expense));
            (format!("Monthly totals for {year}"), series_table("Month", series))
        }
        Series::Yearly => {
            let buckets = bucket_by_year(&transactions);
            let series = buckets
                .iter()
                .map(|b| (b.year.to_string(), b.income, b.expense));
            ("Yearly totals".to_string(), series_table("Year", series))
        }
        Series::Rolling { months } => {
            let buckets = rolling_months(&transactions, months);
            let series = buckets.iter().map(|b| (b.label(), b.income, b.expense));
            (
                format!("Totals for the last {}", plural(months, "month")),
                series_table("Period", series),
            )
        }
    };
    Ok(Out::new(label, series.render(args.format())?))
}

fn series_table<I>(first: &str, series: I) -> Table
where
    I: IntoIterator<Item = (String, Amount, Amount)>,
{
    let mut table = Table::new([first, "Income", "Expense", "Net"]).align_right(&[1, 2, 3]);
    for (label, income, expense) in series {
        table.push([
            label,
            income.format(AmountFormat::Fixed),
            expense.format(AmountFormat::Fixed),
            (income - expense).format(AmountFormat::Fixed),
        ]);
    }
    table
}

/// The `args.count()` most recent transactions.
pub async fn recent(config: Config, args: RecentArgs) -> Result<Out<Rows>> {
    let ledger = config.ledger().await?;
    let transactions = ledger.transactions();
    let latest = most_recent(&transactions, args.count());
    let message = format!(
        "Showing {} of {}",
        latest.len(),
        plural(transactions.len(), "transaction")
    );
    let rows = transaction_table(latest, &ledger.categories()).render(OutputFormat::Table)?;
    Ok(Out::new(message, rows))
}
