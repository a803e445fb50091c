//! CSV backup files written by `cashbook export`.

use crate::codec::to_csv;
use crate::error::ErrorType;
use crate::model::{Transaction, DATE_FORMAT};
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes backup files and rotates old ones.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
    context: String,
}

impl Backup {
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
            context: config.backup_context().to_string(),
        }
    }

    /// The file name of the backup for `date`: `backup_{context}_{YYYY-MM-DD}.csv`.
    pub fn filename(&self, date: NaiveDate) -> String {
        format!("backup_{}_{}.csv", self.context, date.format(DATE_FORMAT))
    }

    /// Writes today's backup into the backups directory and removes the oldest backups beyond
    /// `backup_copies`. A second backup on the same day replaces the first.
    ///
    /// Returns the path to the created backup file.
    pub async fn save(&self, transactions: &[Transaction]) -> Result<PathBuf> {
        self.save_dated(transactions, utils::today()).await
    }

    async fn save_dated(&self, transactions: &[Transaction], date: NaiveDate) -> Result<PathBuf> {
        let path = self.backups_dir.join(self.filename(date));
        self.save_to(&path, transactions).await?;
        self.rotate().await?;
        Ok(path)
    }

    /// Writes the backup to an explicit `path`. No rotation is done.
    pub async fn save_to(&self, path: &Path, transactions: &[Transaction]) -> Result<()> {
        if transactions.is_empty() {
            return Err(ErrorType::Validation.err("There are no transactions to export"));
        }
        let csv = to_csv(transactions).context("Failed to serialize the transactions to CSV")?;
        utils::write(path, csv).await
    }

    /// Rotates old backup files, keeping only the newest `backup_copies` for this context.
    async fn rotate(&self) -> Result<()> {
        let mut files: Vec<(NaiveDate, PathBuf)> = Vec::new();

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            if let Some(date) = backup_date(&file_name.to_string_lossy(), &self.context) {
                files.push((date, entry.path()));
            }
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for (_, path) in files.into_iter().take(to_delete) {
            debug!("Removing old backup {}", path.display());
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

/// Returns the date of a backup file name for `context`, or `None` if `filename` is not one.
fn backup_date(filename: &str, context: &str) -> Option<NaiveDate> {
    let date = filename
        .strip_prefix("backup_")?
        .strip_prefix(context)?
        .strip_prefix('_')?
        .strip_suffix(".csv")?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}
