//! Configuration file handling.
//!
//! The configuration file is stored at `$CASHBOOK_HOME/config.json` and holds the backup settings
//! and the currency label used when printing amounts. The persisted datasets live next to it in
//! `$CASHBOOK_HOME/store` and backups in `$CASHBOOK_HOME/backups`.

use crate::backup::Backup;
use crate::ledger::Ledger;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "cashbook";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUP_CONTEXT: &str = "finance";
const CURRENCY: &str = "RM";
const BACKUPS: &str = "backups";
const STORE: &str = "store";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CASHBOOK_HOME` and from there it loads `$CASHBOOK_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    store: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its subdirectories and an initial `config.json` with default
    /// settings. An existing `config.json` is loaded instead of being overwritten.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the cashbook home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;
        let store = root.join(STORE);
        utils::make_dir(&store).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = if config_path.is_file() {
            ConfigFile::load(&config_path).await?
        } else {
            let config_file = ConfigFile::default();
            config_file.save(&config_path).await?;
            config_file
        };

        Ok(Self {
            root,
            backups,
            store,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `cashbook_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups and store directories exist
    /// - return the loaded configuration object
    pub async fn load(cashbook_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = cashbook_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Cashbook home is missing, run 'cashbook init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            backups: root.join(BACKUPS),
            store: root.join(STORE),
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        if !config.store.is_dir() {
            bail!(
                "The store directory is missing '{}'",
                config.store.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn store(&self) -> &Path {
        &self.store
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    pub fn backup_context(&self) -> &str {
        &self.config_file.backup_context
    }

    /// The label printed in front of amounts, e.g. `RM`.
    pub fn currency(&self) -> &str {
        &self.config_file.currency
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// Opens the persisted datasets.
    pub async fn ledger(&self) -> Result<Ledger> {
        Ledger::open(&self.store).await
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "cashbook",
///   "config_version": 1,
///   "backup_context": "finance",
///   "backup_copies": 5,
///   "currency": "RM"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "cashbook"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Used in backup file names: `backup_{backup_context}_{date}.csv`
    #[serde(default = "default_backup_context")]
    backup_context: String,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    #[serde(default = "default_currency")]
    currency: String,
}

fn default_backup_context() -> String {
    BACKUP_CONTEXT.to_string()
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

fn default_currency() -> String {
    CURRENCY.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_context: default_backup_context(),
            backup_copies: default_backup_copies(),
            currency: default_currency(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if `app_name` is wrong.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            !config.backup_context.trim().is_empty(),
            "backup_context in config file must not be empty"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
