//! A small bookkeeping library: income and expense transactions kept in a local store, with
//! summaries, chart series, period reports and CSV backups.

pub mod aggregate;
pub mod args;
mod backup;
pub mod codec;
pub mod commands;
mod config;
pub mod confirm;
pub mod error;
pub mod import;
pub mod ledger;
pub mod model;
pub mod report;
pub mod rows;
mod sample;
pub mod store;
mod utils;


pub use backup::Backup;
pub use config::Config;
pub use error::Error;
pub use error::ErrorType;
pub use error::Result;
