//! Row-oriented output shared by `list`, `chart` and `report`.

use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// How tabular output is written.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A markdown table.
    #[default]
    Table,
    /// CSV with a header row.
    Csv,
    /// A JSON array of objects keyed by column name.
    Json,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// Rows in the requested output format.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    /// JSON array of objects where each row is a self-describing object with column names as keys.
    Json(serde_json::Value),
    /// Markdown table as a single formatted string.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => write!(f, "Rows::Json({:?})", v),
            Rows::Table(s) => write!(f, "Rows::Table({} chars)", s.len()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => {
                if let Ok(s) = serde_json::to_string_pretty(v) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "{:?}", v)
                }
            }
            Rows::Table(s) => write!(f, "{}", s),
            Rows::Csv(s) => write!(f, "{}", s),
        }
    }
}

/// A header and rows of text cells. Numeric columns are right-aligned in the markdown rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    right_aligned: Vec<bool>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let right_aligned = vec![false; headers.len()];
        Self {
            headers,
            right_aligned,
            rows: Vec::new(),
        }
    }

    /// Right-aligns the columns at `columns` in the markdown rendering.
    pub fn align_right(mut self, columns: &[usize]) -> Self {
        for &c in columns {
            if let Some(flag) = self.right_aligned.get_mut(c) {
                *flag = true;
            }
        }
        self
    }

    /// Appends a row. Missing cells are filled with empty text and extra cells are dropped.
    pub fn push<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        let mut row: Vec<String> = row.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self, format: OutputFormat) -> Result<Rows> {
        Ok(match format {
            OutputFormat::Table => Rows::Table(self.markdown()),
            OutputFormat::Csv => Rows::Csv(self.csv()?),
            OutputFormat::Json => Rows::Json(self.json()),
        })
    }

    fn markdown(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .map(|r| escape_pipe(&r[i]).chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
                    .max(3)
            })
            .collect();

        let line = |cells: &[String]| -> String {
            let padded: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    let cell = escape_pipe(c);
                    if self.right_aligned[i] {
                        format!("{cell:>width$}", width = widths[i])
                    } else {
                        format!("{cell:<width$}", width = widths[i])
                    }
                })
                .collect();
            format!("| {} |", padded.join(" | "))
        };

        let separator: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                if self.right_aligned[i] {
                    format!("{}:", "-".repeat(w - 1))
                } else {
                    "-".repeat(*w)
                }
            })
            .collect();

        let mut out = vec![line(&self.headers), format!("| {} |", separator.join(" | "))];
        out.extend(self.rows.iter().map(|r| line(r)));
        out.join("\n")
    }

    fn csv(&self) -> Result<String> {
        let mut w = csv::Writer::from_writer(Vec::new());
        w.write_record(&self.headers)?;
        for row in &self.rows {
            w.write_record(row)?;
        }
        let bytes = w
            .into_inner()
            .map_err(|e| e.into_error())
            .context("Unable to flush the CSV writer")?;
        String::from_utf8(bytes).context("The CSV writer produced invalid UTF-8")
    }

    fn json(&self) -> serde_json::Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .headers
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned().map(serde_json::Value::String))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

// Pipes are escaped so a description cannot break the table.
fn escape_pipe(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let mut t = Table::new(["Name", "Amount"]).align_right(&[1]);
        t.push(["Rent", "800.00"]);
        t.push(["Dues | fees", "1,500.00"]);
        t
    }

    #[test]
    fn test_markdown() {
        let Rows::Table(s) = table().render(OutputFormat::Table).unwrap() else {
            panic!("expected a table");
        };
        let expected = "\
| Name         |   Amount |
| ------------ | -------: |
| Rent         |   800.00 |
| Dues \\| fees | 1,500.00 |";
        assert_eq!(s, expected);
    }

    #[test]
    fn test_csv_quotes_when_needed() {
        let mut t = Table::new(["a", "b"]);
        t.push(["x, y", "z"]);
        let Rows::Csv(s) = t.render(OutputFormat::Csv).unwrap() else {
            panic!("expected csv");
        };
        assert_eq!(s, "a,b\n\"x, y\",z\n");
    }

    #[test]
    fn test_json() {
        let Rows::Json(v) = table().render(OutputFormat::Json).unwrap() else {
            panic!("expected json");
        };
        assert_eq!(v[0]["Name"], "Rent");
        assert_eq!(v[1]["Amount"], "1,500.00");
        assert_eq!(v.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_push_pads_short_rows() {
        let mut t = Table::new(["a", "b", "c"]);
        t.push(["1"]);
        assert_eq!(t.len(), 1);
        let Rows::Json(v) = t.render(OutputFormat::Json).unwrap() else {
            panic!("expected json");
        };
        assert_eq!(v[0]["c"], "");
    }

    #[test]
    fn test_format_text() {
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    }
}
