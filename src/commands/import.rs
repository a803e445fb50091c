use crate::args::ImportArgs;
use crate::commands::{plural, Out};
use crate::confirm::Confirm;
use crate::import::{import_file, ImportOutcome};
use crate::{Config, Result};

/// Replaces every transaction with the contents of the CSV file `args.file()`, after `confirm`
/// agrees.
///
/// # Errors
/// - Returns an `Import` error if the file cannot be read or has no valid rows. The existing
///   transactions are untouched.
pub async fn import(
    config: Config,
    args: ImportArgs,
    confirm: &mut (dyn Confirm + Send),
) -> Result<Out<ImportOutcome>> {
    let ledger = config.ledger().await?;
    let outcome = import_file(&ledger, args.file(), confirm).await?;
    let message = match outcome {
        ImportOutcome::Committed { count } => format!(
            "Imported {} from {}",
            plural(count, "transaction"),
            args.file().display()
        ),
        ImportOutcome::Cancelled => "Import cancelled, nothing was changed".to_string(),
    };
    Ok(Out::new(message, outcome))
}
