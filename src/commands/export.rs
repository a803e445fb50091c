use crate::args::ExportArgs;
use crate::commands::{plural, Out};
use crate::{Config, Result};
use std::path::PathBuf;

/// Writes every transaction to a CSV file.
///
/// Without `--out` the file goes to the backups directory as `backup_{context}_{date}.csv` and
/// the oldest backups beyond `backup_copies` are removed. With `--out` the file is written to
/// that path and the backups directory is left alone.
///
/// # Errors
/// - Returns a validation error if there are no transactions.
/// - Returns an error if the file cannot be written.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<PathBuf>> {
    let transactions = config.ledger().await?.transactions();
    let backup = config.backup();
    let path = match args.out() {
        Some(out) => {
            backup.save_to(out, &transactions).await?;
            out.to_path_buf()
        }
        None => backup.save(&transactions).await?,
    };
    let message = format!(
        "Exported {} to {}",
        plural(transactions.len(), "transaction"),
        path.display()
    );
    Ok(Out::new(message, path))
}
