//! These structs provide the CLI interface for the cashbook CLI.

use crate::aggregate::Filters;
use crate::model::{
    Amount, Categories, FontSize, TransactionDraft, TransactionStatus, TransactionType,
};
use crate::rows::OutputFormat;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// cashbook: A command-line tool for keeping the books of a household, club or small
/// organization.
///
/// Transactions are recorded as income or expense with a category. The program keeps them in
/// local JSON files, derives totals and monthly or yearly charts, prints period reports, and
/// backs everything up to (and restores it from) CSV files.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// This is the first command you should run. By default the data directory is ~/cashbook; pass
    /// --cashbook-home or set CASHBOOK_HOME to put it somewhere else. On the very first run the
    /// ten sample transactions are added so there is something to look at. Pass --no-sample to
    /// start empty.
    Init(InitArgs),
    /// Record a new transaction.
    Add(AddArgs),
    /// Change fields of an existing transaction.
    Update(UpdateArgs),
    /// Delete a transaction.
    Delete(DeleteArgs),
    /// List transactions, newest first.
    List(ListArgs),
    /// Print total income, total expense and balance.
    Summary(FilterArgs),
    /// Print a chart series as a table.
    Chart(ChartArgs),
    /// Print the most recent transactions.
    Recent(RecentArgs),
    /// List the categories.
    Categories,
    /// Show or change display preferences.
    Prefs(PrefsArgs),
    /// Write all transactions to a CSV backup file.
    Export(ExportArgs),
    /// Replace all transactions with the contents of a CSV backup file.
    Import(ImportArgs),
    /// Print a report of one year or month.
    Report(ReportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where cashbook data and configuration is held. Defaults to ~/cashbook
    #[arg(long, env = "CASHBOOK_HOME", default_value_t = default_cashbook_home())]
    cashbook_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, cashbook_home: PathBuf) -> Self {
        Self {
            log_level,
            cashbook_home: cashbook_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn cashbook_home(&self) -> &DisplayPath {
        &self.cashbook_home
    }
}

/// (Not shown): Args for the `cashbook init` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct InitArgs {
    /// Do not add the sample transactions on the first run.
    #[arg(long)]
    no_sample: bool,
}

impl InitArgs {
    pub fn new(no_sample: bool) -> Self {
        Self { no_sample }
    }

    pub fn no_sample(&self) -> bool {
        self.no_sample
    }
}

/// (Not shown): Args for the `cashbook add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// Either income or expense.
    #[arg(long = "type", short = 't')]
    kind: TransactionType,

    /// The amount, a positive number such as 250 or 12.50.
    #[arg(long, short = 'a')]
    amount: Amount,

    /// What the transaction was for.
    #[arg(long, short = 'd')]
    description: String,

    /// The category id, see `cashbook categories`.
    #[arg(long, short = 'c')]
    category: String,

    /// The date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// cleared or pending.
    #[arg(long, default_value_t = TransactionStatus::Cleared)]
    status: TransactionStatus,
}

impl AddArgs {
    pub fn new(
        kind: TransactionType,
        amount: Amount,
        description: impl Into<String>,
        category: impl Into<String>,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            kind,
            amount,
            description: description.into(),
            category: category.into(),
            date,
            status: TransactionStatus::Cleared,
        }
    }

    /// Builds the draft, using `today` when no date was given.
    pub fn draft(&self, today: NaiveDate) -> TransactionDraft {
        TransactionDraft::new(
            self.date.unwrap_or(today),
            self.kind,
            self.description.clone(),
            self.amount,
            self.category.clone(),
        )
        .with_status(self.status.clone())
    }
}

/// (Not shown): Args for the `cashbook update` command. Only the given fields are changed.
#[derive(Debug, Parser, Clone, Default)]
pub struct UpdateArgs {
    /// The id of the transaction to change.
    id: String,

    #[arg(long = "type", short = 't')]
    kind: Option<TransactionType>,

    #[arg(long, short = 'a')]
    amount: Option<Amount>,

    #[arg(long, short = 'd')]
    description: Option<String>,

    #[arg(long, short = 'c')]
    category: Option<String>,

    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    status: Option<TransactionStatus>,
}

impl UpdateArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Overlays the given fields onto `draft`.
    pub fn apply(&self, mut draft: TransactionDraft) -> TransactionDraft {
        if let Some(kind) = self.kind {
            draft.kind = kind;
        }
        if let Some(amount) = self.amount {
            draft.amount = amount;
        }
        if let Some(description) = &self.description {
            draft.description = description.clone();
        }
        if let Some(category) = &self.category {
            draft.category_id = category.clone();
        }
        if let Some(date) = self.date {
            draft.date = date;
        }
        if let Some(status) = &self.status {
            draft.status = status.clone();
        }
        draft
    }
}

/// (Not shown): Args for the `cashbook delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the transaction to delete.
    id: String,

    /// Do not ask for confirmation.
    #[arg(long, short = 'y')]
    yes: bool,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>, yes: bool) -> Self {
        Self { id: id.into(), yes }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// Criteria shared by `list` and `summary`.
#[derive(Debug, Parser, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive text to look for in the description or category name.
    #[arg(long, short = 's')]
    search: Option<String>,

    /// Only income or only expense.
    #[arg(long = "type", short = 't')]
    kind: Option<TransactionType>,

    /// Only this category id.
    #[arg(long, short = 'c')]
    category: Option<String>,

    /// Only this status.
    #[arg(long)]
    status: Option<TransactionStatus>,

    /// Earliest date, inclusive.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Latest date, inclusive.
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Converts the arguments to `Filters`. `categories` lets the search text match category
    /// names.
    pub fn filters(&self, categories: &Categories) -> Filters {
        let mut filters = Filters::new();
        if let Some(search) = &self.search {
            filters = filters
                .search(search.clone())
                .search_categories(categories.clone());
        }
        if let Some(kind) = self.kind {
            filters = filters.kind(kind);
        }
        if let Some(category) = &self.category {
            filters = filters.category_id(category.clone());
        }
        if let Some(status) = &self.status {
            filters = filters.status(status.clone());
        }
        if let Some(from) = self.from {
            filters = filters.date_from(from);
        }
        if let Some(to) = self.to {
            filters = filters.date_to(to);
        }
        filters
    }
}

/// (Not shown): Args for the `cashbook list` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ListArgs {
    #[clap(flatten)]
    filters: FilterArgs,

    /// The output format.
    #[arg(long, short = 'f', default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ListArgs {
    pub fn new(filters: FilterArgs, format: OutputFormat) -> Self {
        Self { filters, format }
    }

    pub fn filters(&self) -> &FilterArgs {
        &self.filters
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// (Not shown): Args for the `cashbook chart` command.
#[derive(Debug, Parser, Clone)]
pub struct ChartArgs {
    #[command(subcommand)]
    series: Series,

    /// The output format.
    #[arg(long, short = 'f', global = true, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ChartArgs {
    pub fn new(series: Series, format: OutputFormat) -> Self {
        Self { series, format }
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    /// Income and expense for each month of one year.
    Monthly {
        /// Defaults to the current year.
        #[arg(long)]
        year: Option<i32>,
    },
    /// Income and expense for each year that has data.
    Yearly,
    /// Income and expense for the most recent months that have data.
    Rolling {
        #[arg(long, default_value_t = 12)]
        months: usize,
    },
}

/// (Not shown): Args for the `cashbook recent` command.
#[derive(Debug, Parser, Clone)]
pub struct RecentArgs {
    /// How many transactions to show.
    #[arg(short = 'n', long, default_value_t = 5)]
    count: usize,
}

impl RecentArgs {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// (Not shown): Args for the `cashbook prefs` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct PrefsArgs {
    /// Switch between the light and dark theme.
    #[arg(long)]
    toggle_theme: bool,

    /// Set the font size.
    #[arg(long, value_enum)]
    font_size: Option<FontSize>,
}

impl PrefsArgs {
    pub fn new(toggle_theme: bool, font_size: Option<FontSize>) -> Self {
        Self {
            toggle_theme,
            font_size,
        }
    }

    pub fn toggle_theme(&self) -> bool {
        self.toggle_theme
    }

    pub fn font_size(&self) -> Option<FontSize> {
        self.font_size
    }
}

/// (Not shown): Args for the `cashbook export` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ExportArgs {
    /// Write to this file instead of the backups directory.
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(out: Option<PathBuf>) -> Self {
        Self { out }
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }
}

/// (Not shown): Args for the `cashbook import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The CSV file to read.
    file: PathBuf,

    /// Replace the existing transactions without asking.
    #[arg(long, short = 'y')]
    yes: bool,
}

impl ImportArgs {
    pub fn new(file: impl Into<PathBuf>, yes: bool) -> Self {
        Self {
            file: file.into(),
            yes,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// (Not shown): Args for the `cashbook report` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ReportArgs {
    /// Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,

    /// 1 through 12. Leave out for the whole year.
    #[arg(long)]
    month: Option<u32>,

    /// The output format.
    #[arg(long, short = 'f', default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ReportArgs {
    pub fn new(year: Option<i32>, month: Option<u32>, format: OutputFormat) -> Self {
        Self {
            year,
            month,
            format,
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

fn default_cashbook_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("cashbook"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --cashbook-home or CASHBOOK_HOME instead of relying on the \
                default cashbook home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("cashbook")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
