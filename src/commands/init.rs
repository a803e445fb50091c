use crate::args::InitArgs;
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::ledger::FirstRun;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories and an initial `config.json`, then opens the
/// store. On the first run with no data, the sample transactions are added unless
/// `args.no_sample()` is set.
///
/// Running `init` again on an existing directory keeps the existing `config.json` and data.
///
/// # Arguments
/// - `cashbook_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/cashbook`
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(cashbook_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let config = Config::create(cashbook_home)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    let ledger = config.ledger().await?;
    let message = match ledger.seed_first_run(!args.no_sample()).await? {
        FirstRun::Seeded(count) => format!(
            "Successfully created the cashbook directory at {} and added {}",
            config.root().display(),
            plural(count, "sample transaction")
        ),
        FirstRun::Declined | FirstRun::Skipped => format!(
            "Successfully created the cashbook directory at {}",
            config.root().display()
        ),
    };
    Ok(message.into())
}
