//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
mod preferences;
mod transaction;

pub use amount::{Amount, AmountError, AmountFormat};
pub use category::{Categories, Category, NOT_AVAILABLE};
pub use preferences::{FontSize, Preferences, Theme};
pub use transaction::{
    parse_date, Transaction, TransactionDraft, TransactionStatus, TransactionType, DATE_FORMAT,
};
