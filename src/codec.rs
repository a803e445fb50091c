//! The CSV backup format.
//!
//! ```text
//! id,date,type,description,amount,categoryId,status
//! 9f1c...,2024-01-10,expense,"Electricity, January",250,1,cleared
//! ```
//!
//! The description is always quoted. Other fields are quoted only when they contain a delimiter,
//! a quote or a line break. Rows are separated by `\n` and there is no trailing newline.

use crate::model::{
    parse_date, Amount, AmountFormat, Transaction, TransactionDraft, TransactionStatus,
    TransactionType, DATE_FORMAT,
};
use crate::Result;
use anyhow::{bail, Context};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::str::FromStr;
use tracing::debug;

/// The fixed header row.
pub const HEADER: [&str; 7] = [
    "id",
    "date",
    "type",
    "description",
    "amount",
    "categoryId",
    "status",
];

/// Rows with fewer fields than this are dropped. The trailing `status` column is optional.
const MIN_FIELDS: usize = 6;

/// Serializes `transactions` to CSV text, one row per transaction in the given order.
pub fn to_csv(transactions: &[Transaction]) -> Result<String> {
    // Quoting is done here so that the description is quoted even when it doesn't need to be.
    let mut w = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    w.write_record(HEADER)?;
    for t in transactions {
        let date = t.date().format(DATE_FORMAT).to_string();
        w.write_record([
            quote_if_needed(t.id()),
            date,
            t.kind().to_string(),
            quote(t.description()),
            t.amount().format(AmountFormat::Plain),
            quote_if_needed(t.category_id()),
            quote_if_needed(t.status().as_str()),
        ])?;
    }
    let bytes = w
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Unable to flush the CSV writer")?;
    let mut text = String::from_utf8(bytes).context("The CSV writer produced invalid UTF-8")?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn quote_if_needed(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        quote(s)
    } else {
        s.to_string()
    }
}

/// Parses CSV text into transactions, skipping the header line and dropping every row that is
/// not a complete, valid transaction. Dropped rows are logged at `debug` and never abort the
/// parse, so the result may be empty.
pub fn from_csv(text: &str) -> Vec<Transaction> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut transactions = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        // Line numbers are 1-based and the header is line 1.
        let line = result
            .as_ref()
            .ok()
            .and_then(|r| r.position())
            .map(|p| p.line())
            .unwrap_or(i as u64 + 2);
        let parsed = result
            .context("Malformed CSV")
            .and_then(|record| parse_row(&record));
        match parsed {
            Ok(t) => transactions.push(t),
            Err(e) => debug!("Skipping CSV row at line {line}: {e:#}"),
        }
    }
    transactions
}

fn parse_row(record: &StringRecord) -> Result<Transaction> {
    if record.len() < MIN_FIELDS {
        bail!("Expected at least {MIN_FIELDS} fields, found {}", record.len());
    }
    let id = required(record, 0)?.trim();
    let date = parse_date(required(record, 1)?)?;
    let kind_text = required(record, 2)?.trim();
    let kind = TransactionType::from_str(kind_text)
        .with_context(|| format!("Unknown transaction type '{kind_text}'"))?;
    let description = required(record, 3)?;
    let amount = Amount::from_str(field(record, 4))?;
    if !amount.is_valid_entry() {
        bail!(
            "Amount must be greater than 0 and at most {}, got {amount}",
            Amount::MAX_ENTRY
        );
    }
    let category_id = required(record, 5)?.trim();
    let status = TransactionStatus::parse_lenient(field(record, 6));
    if let TransactionStatus::Other(s) = &status {
        debug!("Keeping unrecognized status '{s}' for transaction {id}");
    }

    let draft = TransactionDraft::new(date, kind, description, amount, category_id)
        .with_status(status);
    Ok(Transaction::with_id(id, draft))
}

fn field(record: &StringRecord, i: usize) -> &str {
    record.get(i).unwrap_or_default()
}

fn required(record: &StringRecord, i: usize) -> Result<&str> {
    let value = field(record, i);
    if value.trim().is_empty() {
        bail!("The '{}' field is empty", HEADER[i]);
    }
    Ok(value)
}
