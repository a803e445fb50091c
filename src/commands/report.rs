use crate::args::ReportArgs;
use crate::commands::{plural, Out};
use crate::report::{Report, ReportPeriod};
use crate::rows::Rows;
use crate::{utils, Config, Result};
use chrono::Datelike;

/// Builds the report for a year, or for one month when `--month` is given. The year defaults to
/// the current one.
///
/// # Errors
/// - Returns a validation error if the month is not 1 through 12.
/// - Returns a `NotFound` error if the period has no transactions.
pub async fn report(config: Config, args: ReportArgs) -> Result<Out<Rows>> {
    let year = args.year().unwrap_or_else(|| utils::today().year());
    let period = match args.month() {
        Some(month) => ReportPeriod::month(year, month)?,
        None => ReportPeriod::year(year),
    };
    let ledger = config.ledger().await?;
    let report = Report::build(&ledger.transactions(), &ledger.categories(), period)?;
    let message = format!(
        "Report for {} with {}",
        report.period(),
        plural(report.rows().len(), "transaction")
    );
    Ok(Out::new(message, report.render(args.format())?))
}
