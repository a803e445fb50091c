//! The mutation entry points for the transaction list.
//!
//! `Ledger` owns the `Store` and is the only place the canonical transaction sequence is changed.
//! Every change is validated, applied to a copy, re-sorted and then written through the store in
//! one `set`, so a failed validation or a failed write leaves the stored sequence as it was.

use crate::aggregate::sort_by_date_desc;
use crate::confirm::Confirm;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Categories, Preferences, Transaction, TransactionDraft};
use crate::sample::sample_transactions;
use crate::store::Store;
use crate::Result;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Ledger {
    store: Store,
}

/// What happened on first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstRun {
    /// This was not the first run, or there was already data. The flag is left as it was.
    Skipped,
    /// The sample transactions were added.
    Seeded(usize),
    /// The first run flag was cleared without adding sample data.
    Declined,
}

impl Ledger {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Opens the store in `dir` and wraps it.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let store = Store::open(dir).await.pub_result(ErrorType::Store)?;
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Snapshot of the transactions, newest first.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.store.transactions().get()
    }

    pub fn categories(&self) -> Categories {
        self.store.categories().get()
    }

    pub fn preferences(&self) -> Preferences {
        self.store.preferences().get()
    }

    pub fn get(&self, id: &str) -> Option<Transaction> {
        self.store
            .transactions()
            .with(|ts| ts.iter().find(|t| t.id() == id).cloned())
    }

    /// Validates `draft`, assigns a new id and inserts the transaction in date order. A new record
    /// precedes existing records that have the same date.
    pub async fn add(&self, draft: TransactionDraft) -> Result<Transaction> {
        draft.validate(&self.categories())?;
        let transaction = Transaction::new(draft);
        let mut transactions = Vec::with_capacity(self.store.transactions().with(Vec::len) + 1);
        transactions.push(transaction.clone());
        transactions.extend(self.transactions());
        sort_by_date_desc(&mut transactions);
        self.save(transactions).await?;
        debug!("Added transaction {}", transaction.id());
        Ok(transaction)
    }

    /// Replaces every field of the transaction `id` with `draft` and re-sorts.
    pub async fn update(&self, id: &str, draft: TransactionDraft) -> Result<Transaction> {
        draft.validate(&self.categories())?;
        let mut transactions = self.transactions();
        let slot = transactions
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| not_found(id))?;
        *slot = Transaction::with_id(id, draft);
        let updated = slot.clone();
        sort_by_date_desc(&mut transactions);
        self.save(transactions).await?;
        debug!("Updated transaction {id}");
        Ok(updated)
    }

    /// Removes the transaction `id` if `confirm` agrees. Returns the removed transaction, or `None`
    /// if the user declined.
    pub async fn delete(
        &self,
        id: &str,
        confirm: &mut (dyn Confirm + Send),
    ) -> Result<Option<Transaction>> {
        let existing = self.get(id).ok_or_else(|| not_found(id))?;
        let question = format!(
            "Delete '{}' ({}, {})?",
            existing.description(),
            existing.date(),
            existing.amount()
        );
        if !confirm.confirm(&question)? {
            info!("Delete cancelled");
            return Ok(None);
        }
        let transactions: Vec<Transaction> = self
            .transactions()
            .into_iter()
            .filter(|t| t.id() != id)
            .collect();
        self.save(transactions).await?;
        debug!("Deleted transaction {id}");
        Ok(Some(existing))
    }

    /// Replaces the whole transaction list. An empty replacement is refused because it would
    /// silently wipe the dataset.
    pub async fn replace_all(&self, mut transactions: Vec<Transaction>) -> Result<usize> {
        if transactions.is_empty() {
            return Err(ErrorType::Import.err("Refusing to replace the data with nothing"));
        }
        sort_by_date_desc(&mut transactions);
        let count = transactions.len();
        self.save(transactions).await?;
        Ok(count)
    }

    /// On the first run with an empty dataset, adds the sample transactions (if `with_sample`) and
    /// clears the first run flag.
    pub async fn seed_first_run(&self, with_sample: bool) -> Result<FirstRun> {
        let first_run = self.preferences().first_run();
        if !first_run || !self.transactions().is_empty() {
            return Ok(FirstRun::Skipped);
        }
        let outcome = if with_sample {
            let sample = sample_transactions();
            let count = sample.len();
            self.save(sample).await?;
            FirstRun::Seeded(count)
        } else {
            FirstRun::Declined
        };
        self.store
            .preferences()
            .update(|p| p.first_run = false)
            .await
            .pub_result(ErrorType::Store)?;
        Ok(outcome)
    }

    async fn save(&self, transactions: Vec<Transaction>) -> Result<()> {
        self.store
            .transactions()
            .set(transactions)
            .await
            .pub_result(ErrorType::Store)
    }
}

pub(crate) fn not_found(id: &str) -> crate::Error {
    ErrorType::NotFound.err(format!("No transaction with id '{id}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::AssumeYes;
    use crate::model::{parse_date, Amount, TransactionType};
    use tempfile::TempDir;

    fn draft(date: &str, description: &str) -> TransactionDraft {
        TransactionDraft::new(
            parse_date(date).unwrap(),
            TransactionType::Expense,
            description,
            10,
            "1",
        )
    }

    async fn ledger(dir: &TempDir) -> Ledger {
        Ledger::open(dir.path()).await.unwrap()
    }

    fn descriptions(ledger: &Ledger) -> Vec<String> {
        ledger
            .transactions()
            .iter()
            .map(|t| t.description().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_add_sorts_and_prepends_same_date() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir).await;
        ledger.add(draft("2024-01-10", "old")).await.unwrap();
        ledger.add(draft("2024-03-01", "newest")).await.unwrap();
        ledger.add(draft("2024-01-10", "same day, added later")).await.unwrap();
        assert_eq!(
            descriptions(&ledger),
            vec!["newest", "same day, added later", "old"]
        );
    }

    #[tokio::test]
    async fn test_add_invalid_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir).await;
        ledger.add(draft("2024-01-10", "ok")).await.unwrap();

        let mut bad = draft("2024-01-11", "bad");
        bad.amount = Amount::ZERO;
        let e = ledger.add(bad).await.unwrap_err();
        assert_eq!(ErrorType::of(&e), Some(ErrorType::Validation));

        let e = ledger.add(draft("2024-01-11", " ")).await.unwrap_err();
        assert_eq!(ErrorType::of(&e), Some(ErrorType::Validation));

        let mut unknown = draft("2024-01-11", "x");
        unknown.category_id = "nope".to_string();
        assert!(ledger.add(unknown).await.is_err());

        assert_eq!(descriptions(&ledger), vec!["ok"]);
    }

    #[tokio::test]
    async fn test_add_persists() {
        let dir = TempDir::new().unwrap();
        let added = ledger(&dir).await.add(draft("2024-01-10", "x")).await.unwrap();
        let reopened = ledger(&dir).await;
        assert_eq!(reopened.transactions(), vec![added]);
    }

    #[tokio::test]
    async fn test_update_replaces_and_resorts() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir).await;
        let a = ledger.add(draft("2024-01-10", "a")).await.unwrap();
        ledger.add(draft("2024-02-10", "b")).await.unwrap();

        let mut change = a.to_draft();
        change.date = parse_date("2024-05-01").unwrap();
        change.description = "a moved".to_string();
        let updated = ledger.update(a.id(), change).await.unwrap();
        assert_eq!(updated.id(), a.id());
        assert_eq!(descriptions(&ledger), vec!["a moved", "b"]);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir).await;
        let e = ledger
            .update("missing", draft("2024-01-10", "x"))
            .await
            .unwrap_err();
        assert_eq!(ErrorType::of(&e), Some(ErrorType::NotFound));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir).await;
        let a = ledger.add(draft("2024-01-10", "a")).await.unwrap();

        let mut decline = |_: &str| false;
        assert_eq!(ledger.delete(a.id(), &mut decline).await.unwrap(), None);
        assert_eq!(ledger.transactions().len(), 1);

        let removed = ledger.delete(a.id(), &mut AssumeYes).await.unwrap();
        assert_eq!(removed, Some(a.clone()));
        assert!(ledger.transactions().is_empty());

        let e = ledger.delete(a.id(), &mut AssumeYes).await.unwrap_err();
        assert_eq!(ErrorType::of(&e), Some(ErrorType::NotFound));
    }

    #[tokio::test]
    async fn test_replace_all() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir).await;
        ledger.add(draft("2024-01-10", "before")).await.unwrap();

        let e = ledger.replace_all(Vec::new()).await.unwrap_err();
        assert_eq!(ErrorType::of(&e), Some(ErrorType::Import));
        assert_eq!(descriptions(&ledger), vec!["before"]);

        let replacement = vec![
            Transaction::with_id("1", draft("2023-01-01", "older")),
            Transaction::with_id("2", draft("2023-06-01", "newer")),
        ];
        assert_eq!(ledger.replace_all(replacement).await.unwrap(), 2);
        assert_eq!(descriptions(&ledger), vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_seed_first_run() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir).await;
        assert_eq!(ledger.seed_first_run(true).await.unwrap(), FirstRun::Seeded(10));
        assert!(!ledger.preferences().first_run());
        assert_eq!(ledger.transactions().len(), 10);

        // Only once.
        assert_eq!(ledger.seed_first_run(true).await.unwrap(), FirstRun::Skipped);
        assert_eq!(ledger.transactions().len(), 10);
    }

    #[tokio::test]
    async fn test_seed_first_run_declined() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir).await;
        assert_eq!(ledger.seed_first_run(false).await.unwrap(), FirstRun::Declined);
        assert!(ledger.transactions().is_empty());
        assert!(!ledger.preferences().first_run());
        assert_eq!(ledger.seed_first_run(true).await.unwrap(), FirstRun::Skipped);
    }

    #[tokio::test]
    async fn test_seed_first_run_with_existing_data() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir).await;
        ledger.add(draft("2024-01-10", "mine")).await.unwrap();
        assert_eq!(ledger.seed_first_run(true).await.unwrap(), FirstRun::Skipped);
        assert_eq!(descriptions(&ledger), vec!["mine"]);
        assert!(ledger.preferences().first_run());
    }
}
