//! Restoring the transaction list from a CSV backup.
//!
//! An import walks through these states:
//!
//! ```text
//! Idle -> FileSelected -> Parsing -> ParseFailed ----------------> Idle
//!                                 -> ParsedEmpty ----------------> Idle
//!                                 -> ParsedNonEmpty -> AwaitingConfirmation
//!                                                        -> Committed
//!                                                        -> Cancelled -> Idle
//! ```
//!
//! Nothing is written until the user confirms, and a file with no valid rows never replaces the
//! existing data. Selecting another file while one is pending discards the pending one.

use crate::codec::from_csv;
use crate::confirm::Confirm;
use crate::error::{ErrorType, IntoResult};
use crate::ledger::Ledger;
use crate::model::Transaction;
use crate::{utils, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImportState {
    #[default]
    Idle,
    FileSelected {
        path: PathBuf,
    },
    Parsing {
        path: PathBuf,
    },
    /// The file could not be read.
    ParseFailed {
        notice: String,
    },
    /// The file was read but had no valid rows.
    ParsedEmpty {
        path: PathBuf,
    },
    ParsedNonEmpty {
        path: PathBuf,
        transactions: Vec<Transaction>,
    },
    AwaitingConfirmation {
        path: PathBuf,
        transactions: Vec<Transaction>,
    },
    Committed {
        count: usize,
    },
    Cancelled,
}

impl ImportState {
    pub fn name(&self) -> &'static str {
        match self {
            ImportState::Idle => "Idle",
            ImportState::FileSelected { .. } => "FileSelected",
            ImportState::Parsing { .. } => "Parsing",
            ImportState::ParseFailed { .. } => "ParseFailed",
            ImportState::ParsedEmpty { .. } => "ParsedEmpty",
            ImportState::ParsedNonEmpty { .. } => "ParsedNonEmpty",
            ImportState::AwaitingConfirmation { .. } => "AwaitingConfirmation",
            ImportState::Committed { .. } => "Committed",
            ImportState::Cancelled => "Cancelled",
        }
    }
}

/// How a completed import ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ImportOutcome {
    Committed { count: usize },
    Cancelled,
}

/// Drives one import at a time through `ImportState`.
#[derive(Debug, Default)]
pub struct Importer {
    state: ImportState,
    trail: Vec<&'static str>,
}

impl Importer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ImportState {
        &self.state
    }

    /// The names of every state entered so far, in order.
    pub fn trail(&self) -> &[&'static str] {
        &self.trail
    }

    fn enter(&mut self, state: ImportState) {
        debug!("Import: {} -> {}", self.state.name(), state.name());
        self.trail.push(state.name());
        self.state = state;
    }

    fn invalid(&self, action: &str) -> crate::Error {
        ErrorType::Import.err(format!(
            "Cannot {action} while the import is in the {} state",
            self.state.name()
        ))
    }

    /// Chooses the file to import. A file that is selected or parsed but not yet committed is
    /// replaced; the last selection wins.
    pub fn select(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        match &self.state {
            ImportState::Idle | ImportState::Committed { .. } => {}
            ImportState::FileSelected { path: pending }
            | ImportState::ParsedNonEmpty { path: pending, .. }
            | ImportState::AwaitingConfirmation { path: pending, .. } => {
                debug!("Discarding pending import of {}", pending.display());
            }
            _ => return Err(self.invalid("select a file")),
        }
        self.enter(ImportState::FileSelected { path: path.into() });
        Ok(())
    }

    /// Reads and parses the selected file. Returns the number of valid rows.
    ///
    /// # Errors
    /// If the file cannot be read, or it has no valid rows, the importer returns to `Idle` and an
    /// `ErrorType::Import` error carries the notice for the user.
    pub async fn parse(&mut self) -> Result<usize> {
        let path = match &self.state {
            ImportState::FileSelected { path } => path.clone(),
            _ => return Err(self.invalid("parse")),
        };
        self.enter(ImportState::Parsing { path: path.clone() });

        let text = match utils::read(&path).await {
            Ok(text) => text,
            Err(e) => {
                let notice = format!("{e:#}");
                self.enter(ImportState::ParseFailed { notice });
                return Err(self.back_to_idle());
            }
        };

        let transactions = from_csv(&text);
        if transactions.is_empty() {
            self.enter(ImportState::ParsedEmpty { path });
            return Err(self.back_to_idle());
        }
        let count = transactions.len();
        self.enter(ImportState::ParsedNonEmpty { path, transactions });
        Ok(count)
    }

    /// Asks for confirmation and, if given, replaces all transactions in `ledger` with the parsed
    /// ones.
    pub async fn commit(
        &mut self,
        ledger: &Ledger,
        confirm: &mut (dyn Confirm + Send),
    ) -> Result<ImportOutcome> {
        let (path, transactions) = match &self.state {
            ImportState::ParsedNonEmpty { path, transactions } => {
                (path.clone(), transactions.clone())
            }
            _ => return Err(self.invalid("commit")),
        };
        let question = format!(
            "Replace all {} existing transactions with the {} transactions in {}?",
            ledger.store().transactions().with(Vec::len),
            transactions.len(),
            path.display()
        );
        self.enter(ImportState::AwaitingConfirmation {
            path,
            transactions: transactions.clone(),
        });

        let agreed = match confirm.confirm(&question) {
            Ok(agreed) => agreed,
            Err(e) => {
                self.state = ImportState::Idle;
                return Err(e);
            }
        };
        if !agreed {
            self.enter(ImportState::Cancelled);
            self.enter(ImportState::Idle);
            info!("Import cancelled, nothing was changed");
            return Ok(ImportOutcome::Cancelled);
        }

        match ledger.replace_all(transactions).await {
            Ok(count) => {
                self.enter(ImportState::Committed { count });
                Ok(ImportOutcome::Committed { count })
            }
            Err(e) => {
                self.state = ImportState::Idle;
                Err(e)
            }
        }
    }

    /// Leaves a failure state and returns its notice as an error.
    fn back_to_idle(&mut self) -> crate::Error {
        let notice = match &self.state {
            ImportState::ParseFailed { notice } => notice.clone(),
            ImportState::ParsedEmpty { path } => {
                format!("No valid transactions were found in {}", path.display())
            }
            other => format!("Import stopped in the {} state", other.name()),
        };
        self.enter(ImportState::Idle);
        ErrorType::Import.err(notice)
    }
}

/// Runs a whole import of `path` into `ledger`.
pub async fn import_file(
    ledger: &Ledger,
    path: &Path,
    confirm: &mut (dyn Confirm + Send),
) -> Result<ImportOutcome> {
    let mut importer = Importer::new();
    importer.select(path)?;
    let count = importer.parse().await.pub_result(ErrorType::Import)?;
    info!("Found {count} valid transactions in {}", path.display());
    importer.commit(ledger, confirm).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::to_csv;
    use crate::confirm::AssumeYes;
    use crate::model::{parse_date, TransactionDraft, TransactionType};
    use tempfile::TempDir;

    const VALID: &str = "id,date,type,description,amount,categoryId,status\n\
        a,2024-01-10,expense,\"Electricity\",250,1,cleared\n\
        b,2024-01-20,income,\"Dues\",1500,5";

    async fn setup() -> (TempDir, Ledger) {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path().join("store")).await.unwrap();
        ledger
            .add(TransactionDraft::new(
                parse_date("2022-05-05").unwrap(),
                TransactionType::Expense,
                "existing",
                5,
                "1",
            ))
            .await
            .unwrap();
        (dir, ledger)
    }

    async fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        utils::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_confirmed_import_replaces_everything() {
        let (dir, ledger) = setup().await;
        let path = write(&dir, "backup.csv", VALID).await;

        let mut importer = Importer::new();
        importer.select(&path).unwrap();
        assert_eq!(importer.parse().await.unwrap(), 2);
        let outcome = importer.commit(&ledger, &mut AssumeYes).await.unwrap();

        assert_eq!(outcome, ImportOutcome::Committed { count: 2 });
        assert_eq!(
            importer.trail(),
            &[
                "FileSelected",
                "Parsing",
                "ParsedNonEmpty",
                "AwaitingConfirmation",
                "Committed"
            ]
        );
        let ids: Vec<String> = ledger
            .transactions()
            .iter()
            .map(|t| t.id().to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_cancelled_import_leaves_data() {
        let (dir, ledger) = setup().await;
        let before = ledger.transactions();
        let path = write(&dir, "backup.csv", VALID).await;

        let mut importer = Importer::new();
        importer.select(&path).unwrap();
        importer.parse().await.unwrap();
        let mut decline = |_: &str| false;
        let outcome = importer.commit(&ledger, &mut decline).await.unwrap();

        assert_eq!(outcome, ImportOutcome::Cancelled);
        assert_eq!(importer.state(), &ImportState::Idle);
        assert_eq!(importer.trail().last(), Some(&"Idle"));
        assert!(importer.trail().contains(&"Cancelled"));
        assert_eq!(ledger.transactions(), before);
    }

    #[tokio::test]
    async fn test_empty_import_is_rejected() {
        let (dir, ledger) = setup().await;
        let before = ledger.transactions();
        let path = write(&dir, "bad.csv", "header\nnot,a,valid,row\n").await;

        let mut asked = false;
        let mut confirm = |_: &str| {
            asked = true;
            true
        };
        let e = import_file(&ledger, &path, &mut confirm).await.unwrap_err();
        assert_eq!(ErrorType::of(&e), Some(ErrorType::Import));
        assert!(format!("{e:#}").contains("No valid transactions"));
        assert!(!asked);
        assert_eq!(ledger.transactions(), before);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_parse_failed() {
        let (dir, ledger) = setup().await;
        let before = ledger.transactions();
        let mut importer = Importer::new();
        importer.select(dir.path().join("missing.csv")).unwrap();
        let e = importer.parse().await.unwrap_err();

        assert_eq!(ErrorType::of(&e), Some(ErrorType::Import));
        assert_eq!(importer.trail(), &["FileSelected", "Parsing", "ParseFailed", "Idle"]);
        assert_eq!(ledger.transactions(), before);
    }

    #[tokio::test]
    async fn test_out_of_order_transitions_are_errors() {
        let (_dir, ledger) = setup().await;
        let mut importer = Importer::new();
        assert!(importer.parse().await.is_err());
        assert!(importer.commit(&ledger, &mut AssumeYes).await.is_err());
        importer.select("a.csv").unwrap();
        assert!(importer.commit(&ledger, &mut AssumeYes).await.is_err());
    }

    #[tokio::test]
    async fn test_last_selection_wins() {
        let (dir, ledger) = setup().await;
        let other = "id,date,type,description,amount,categoryId,status\n\
            z,2023-03-03,income,\"Grant\",40,5,cleared";
        let first = write(&dir, "first.csv", VALID).await;
        let second = write(&dir, "second.csv", other).await;

        let mut importer = Importer::new();
        importer.select(dir.path().join("missing.csv")).unwrap();
        importer.select(&first).unwrap();
        assert_eq!(
            importer.state(),
            &ImportState::FileSelected {
                path: first.clone()
            }
        );
        assert_eq!(importer.parse().await.unwrap(), 2);

        importer.select(&second).unwrap();
        assert_eq!(importer.parse().await.unwrap(), 1);
        let outcome = importer.commit(&ledger, &mut AssumeYes).await.unwrap();

        assert_eq!(outcome, ImportOutcome::Committed { count: 1 });
        let ids: Vec<String> = ledger
            .transactions()
            .iter()
            .map(|t| t.id().to_string())
            .collect();
        assert_eq!(ids, vec!["z"]);
    }

    #[tokio::test]
    async fn test_export_then_import_round_trip() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path().join("store")).await.unwrap();
        ledger.seed_first_run(true).await.unwrap();
        let exported = ledger.transactions();
        let path = write(&dir, "roundtrip.csv", &to_csv(&exported).unwrap()).await;

        let outcome = import_file(&ledger, &path, &mut AssumeYes).await.unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Committed {
                count: exported.len()
            }
        );
        assert_eq!(ledger.transactions(), exported);
    }
}
