//! Handlers that record, change, remove and list transactions.

use crate::aggregate::filter;
use crate::args::{AddArgs, DeleteArgs, ListArgs, UpdateArgs};
use crate::commands::{plural, Out};
use crate::confirm::Confirm;
use crate::ledger::not_found;
use crate::model::{AmountFormat, Categories, Transaction};
use crate::rows::{Rows, Table};
use crate::{utils, Config, Result};

const HEADERS: [&str; 7] = [
    "Date",
    "Type",
    "Description",
    "Category",
    "Amount",
    "Status",
    "Id",
];

/// Builds the transaction table used by `list` and `recent`.
pub(super) fn transaction_table<'a, I>(transactions: I, categories: &Categories) -> Table
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut table = Table::new(HEADERS).align_right(&[4]);
    for t in transactions {
        table.push([
            t.date().to_string(),
            t.kind().label().to_string(),
            t.description().to_string(),
            categories.resolve(t.category_id()).to_string(),
            t.amount().format(AmountFormat::Fixed),
            t.status().to_string(),
            t.id().to_string(),
        ]);
    }
    table
}

/// Records a new transaction. A missing date means today.
///
/// # Errors
/// - Returns a validation error if the description is blank, the amount is not positive or the
///   category does not exist.
/// - Returns an error if the store cannot be written.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Transaction>> {
    let ledger = config.ledger().await?;
    let added = ledger.add(args.draft(utils::today())).await?;
    let message = format!(
        "Added {} of {} {} on {} with id {}",
        added.kind(),
        config.currency(),
        added.amount().format(AmountFormat::Money),
        added.date(),
        added.id()
    );
    Ok(Out::new(message, added))
}

/// Changes the fields given in `args` on the transaction `args.id()`. Fields that are not given
/// keep their current values.
///
/// # Errors
/// - Returns a `NotFound` error if no transaction has the id.
/// - Returns a validation error if the result is not a valid transaction.
pub async fn update(config: Config, args: UpdateArgs) -> Result<Out<Transaction>> {
    let ledger = config.ledger().await?;
    let existing = ledger.get(args.id()).ok_or_else(|| not_found(args.id()))?;
    let updated = ledger
        .update(args.id(), args.apply(existing.to_draft()))
        .await?;
    Ok(Out::new(format!("Updated transaction {}", updated.id()), updated))
}

/// Deletes the transaction `args.id()` after asking `confirm`.
///
/// # Errors
/// - Returns a `NotFound` error if no transaction has the id.
pub async fn delete(
    config: Config,
    args: DeleteArgs,
    confirm: &mut (dyn Confirm + Send),
) -> Result<Out<Option<Transaction>>> {
    let ledger = config.ledger().await?;
    let removed = ledger.delete(args.id(), confirm).await?;
    let message = match &removed {
        Some(t) => format!("Deleted transaction {}", t.id()),
        None => "Nothing was deleted".to_string(),
    };
    Ok(Out::new(message, removed))
}

/// Lists the transactions that match the filters, newest first.
pub async fn list(config: Config, args: ListArgs) -> Result<Out<Rows>> {
    let ledger = config.ledger().await?;
    let categories = ledger.categories();
    let filters = args.filters().filters(&categories);
    let transactions = ledger.transactions();
    let selected = filter(&transactions, &filters);
    let count = selected.len();
    let rows = transaction_table(selected, &categories).render(args.format())?;
    Ok(Out::new(format!("Found {}", plural(count, "transaction")), rows))
}
