//! The persisted key-value store.
//!
//! Each named dataset lives in its own JSON file, `<dir>/<key>.json`, and is held in memory by a
//! `Cell`. A cell loads eagerly when it is constructed, writes through to disk on every `set`, and
//! publishes each new value to subscribers over a `tokio::sync::watch` channel. There is no
//! caching policy beyond "last write wins".

use crate::model::{Categories, Preferences, Transaction};
use crate::{utils, Result};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, trace, warn};

/// Key of the transaction sequence.
pub const TRANSACTIONS: &str = "transactions";

/// Key of the category list.
pub const CATEGORIES: &str = "categories";

/// Key of the user preferences.
pub const PREFERENCES: &str = "preferences";

/// A typed, persisted, observable value.
#[derive(Debug)]
pub struct Cell<T> {
    key: String,
    path: PathBuf,
    sender: watch::Sender<T>,
}

/// What was found on disk for a key.
enum Stored<T> {
    Value(T),
    Missing,
    Corrupt(anyhow::Error),
}

impl<T> Cell<T>
where
    T: Serialize + DeserializeOwned + Clone + Debug,
{
    /// Loads the value stored under `key` in `dir`.
    ///
    /// If nothing is stored yet, `default` is called and its result is both held in memory and
    /// persisted. A stored value that cannot be decoded is treated the same way: it is logged,
    /// discarded and reseeded with the default.
    ///
    /// # Errors
    /// - Returns an error if the file exists but cannot be read (e.g. permissions).
    /// - Returns an error if the seeded default cannot be written.
    pub async fn load<F>(dir: impl AsRef<Path>, key: &str, default: F) -> Result<Self>
    where
        F: FnOnce() -> T,
    {
        let path = dir.as_ref().join(format!("{key}.json"));
        let (value, seed) = match read_stored::<T>(&path).await? {
            Stored::Value(value) => {
                trace!("Loaded '{key}' from {}", path.display());
                (value, false)
            }
            Stored::Missing => {
                debug!("No stored value for '{key}', seeding the default");
                (default(), true)
            }
            Stored::Corrupt(e) => {
                warn!(
                    "The stored value for '{key}' at {} is unreadable and will be replaced with \
                    the default: {e:#}",
                    path.display()
                );
                (default(), true)
            }
        };

        let (sender, _) = watch::channel(value);
        let cell = Self {
            key: key.to_string(),
            path,
            sender,
        };
        if seed {
            let value = cell.get();
            cell.persist(&value).await?;
        }
        Ok(cell)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a snapshot of the current value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Calls `f` with a reference to the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Persists `value` and then publishes it to subscribers. If persisting fails, the in-memory
    /// value is left unchanged and nobody is notified.
    pub async fn set(&self, value: T) -> Result<()> {
        self.persist(&value).await?;
        self.sender.send_replace(value);
        trace!("Published new value for '{}'", self.key);
        Ok(())
    }

    /// Applies `f` to a copy of the current value and `set`s the result.
    pub async fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut value = self.get();
        let r = f(&mut value);
        self.set(value).await?;
        Ok(r)
    }

    /// Returns a receiver that observes every value published after this call.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    async fn persist(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("Unable to serialize '{}'", self.key))?;
        utils::write_replace(&self.path, json)
            .await
            .with_context(|| format!("Unable to persist '{}'", self.key))
    }
}

async fn read_stored<T>(path: &Path) -> Result<Stored<T>>
where
    T: DeserializeOwned,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Stored::Missing),
        Err(e) => {
            return Err(e).with_context(|| format!("Unable to read {}", path.display()));
        }
    };
    match serde_json::from_slice::<T>(&bytes) {
        Ok(value) => Ok(Stored::Value(value)),
        Err(e) => Ok(Stored::Corrupt(e.into())),
    }
}

/// The three datasets of the application.
#[derive(Debug)]
pub struct Store {
    transactions: Cell<Vec<Transaction>>,
    categories: Cell<Categories>,
    preferences: Cell<Preferences>,
}

impl Store {
    /// Opens (and if needed seeds) every dataset in `dir`. The transaction list starts empty, the
    /// category list starts with `Categories::defaults()`.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        utils::make_dir(dir).await?;
        Ok(Self {
            transactions: Cell::load(dir, TRANSACTIONS, Vec::new).await?,
            categories: Cell::load(dir, CATEGORIES, Categories::defaults).await?,
            preferences: Cell::load(dir, PREFERENCES, Preferences::default).await?,
        })
    }

    pub fn transactions(&self) -> &Cell<Vec<Transaction>> {
        &self.transactions
    }

    pub fn categories(&self) -> &Cell<Categories> {
        &self.categories
    }

    pub fn preferences(&self) -> &Cell<Preferences> {
        &self.preferences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Theme, TransactionDraft, TransactionType};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn transaction() -> Transaction {
        Transaction::with_id(
            "t1",
            TransactionDraft::new(
                NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                TransactionType::Expense,
                "Rent",
                800,
                "3",
            ),
        )
    }

    #[tokio::test]
    async fn test_load_seeds_default_and_persists_it() {
        let dir = TempDir::new().unwrap();
        let cell: Cell<Vec<String>> = Cell::load(dir.path(), "names", || vec!["a".to_string()])
            .await
            .unwrap();
        assert_eq!(cell.get(), vec!["a".to_string()]);
        let on_disk = utils::read(&dir.path().join("names.json")).await.unwrap();
        let parsed: Vec<String> = serde_json::from_str(&on_disk).unwrap();
        assert_eq!(parsed, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_default_not_called_when_value_exists() {
        let dir = TempDir::new().unwrap();
        utils::write(dir.path().join("names.json"), r#"["stored"]"#)
            .await
            .unwrap();
        let cell: Cell<Vec<String>> =
            Cell::load(dir.path(), "names", || panic!("default must not be called"))
                .await
                .unwrap();
        assert_eq!(cell.get(), vec!["stored".to_string()]);
    }

    #[tokio::test]
    async fn test_set_writes_through() {
        let dir = TempDir::new().unwrap();
        let cell: Cell<Vec<Transaction>> = Cell::load(dir.path(), TRANSACTIONS, Vec::new)
            .await
            .unwrap();
        cell.set(vec![transaction()]).await.unwrap();

        // A second cell over the same directory sees the write.
        let reopened: Cell<Vec<Transaction>> =
            Cell::load(dir.path(), TRANSACTIONS, Vec::new).await.unwrap();
        assert_eq!(reopened.get(), vec![transaction()]);
        assert!(!dir.path().join("transactions.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_value_is_reseeded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        utils::write(&path, "{ this is not json").await.unwrap();

        let cell: Cell<Preferences> = Cell::load(dir.path(), PREFERENCES, Preferences::default)
            .await
            .unwrap();
        assert_eq!(cell.get(), Preferences::default());

        let on_disk = utils::read(&path).await.unwrap();
        let parsed: Preferences = serde_json::from_str(&on_disk).unwrap();
        assert_eq!(parsed, Preferences::default());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_reseeded() {
        let dir = TempDir::new().unwrap();
        utils::write(dir.path().join("categories.json"), [0xff, 0xfe, 0x00])
            .await
            .unwrap();
        let cell: Cell<Categories> = Cell::load(dir.path(), CATEGORIES, Categories::defaults)
            .await
            .unwrap();
        assert_eq!(cell.get(), Categories::defaults());
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let dir = TempDir::new().unwrap();
        let cell: Cell<Preferences> = Cell::load(dir.path(), PREFERENCES, Preferences::default)
            .await
            .unwrap();
        let mut rx = cell.subscribe();
        assert!(!rx.has_changed().unwrap());

        cell.update(|p| p.toggle_theme()).await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().theme(), Theme::Dark);
        assert_eq!(cell.with(|p| p.theme()), Theme::Dark);
    }

    #[tokio::test]
    async fn test_store_open_seeds_all_keys() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("store")).await.unwrap();
        assert!(store.transactions().get().is_empty());
        assert_eq!(store.categories().get(), Categories::defaults());
        assert!(store.preferences().get().first_run());
        for key in [TRANSACTIONS, CATEGORIES, PREFERENCES] {
            assert!(dir.path().join("store").join(format!("{key}.json")).is_file());
        }
    }
}
