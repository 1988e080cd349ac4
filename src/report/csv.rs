use miette::{IntoDiagnostic, Result, WrapErr};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// One CSV record, by column name
pub type Row = BTreeMap<String, String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    #[error("Unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },
    #[error("Line {line} has {found} fields, the header has {expected}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Writes per-app rows to a CSV file, keeping rows already in it
#[derive(Debug, Clone)]
pub struct CsvReport {
    path: PathBuf,
    blanks: bool,
}

/// What [`CsvReport::write`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub new_rows: usize,
    pub kept_rows: usize,
    pub columns: usize,
}

impl CsvReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            blanks: false,
        }
    }

    /// Leave missing cells empty instead of writing 0
    pub fn with_blanks(mut self, blanks: bool) -> Self {
        self.blanks = blanks;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `rows` followed by the rows already in the file.
    ///
    /// The header is the sorted union of every row's columns.
    pub fn write(&self, rows: Vec<Row>) -> Result<WriteSummary> {
        let (mut header, existing) = if self.path.exists() {
            info!("Appending data to {}", self.path.display());
            read_csv(&self.path)?
        } else {
            info!("Creating {}", self.path.display());
            (Vec::new(), Vec::new())
        };

        let kept_rows = existing.len();
        let new_rows = rows.len();
        let mut all_rows = rows;
        all_rows.extend(existing);

        let mut columns: BTreeSet<String> = header.drain(..).collect();
        for row in &all_rows {
            columns.extend(row.keys().cloned());
        }
        let columns: Vec<String> = columns.into_iter().collect();

        let missing = if self.blanks { "" } else { "0" };
        let text = format_csv(&columns, &all_rows, missing);

        std::fs::write(&self.path, text)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write CSV: {}", self.path.display()))?;

        Ok(WriteSummary {
            new_rows,
            kept_rows,
            columns: columns.len(),
        })
    }
}

/// Header and rows of a CSV file
pub fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Row>)> {
    let text = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read CSV: {}", path.display()))?;
    parse_rows(&text)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse CSV: {}", path.display()))
}

/// Split CSV text into header and keyed rows
pub fn parse_rows(text: &str) -> std::result::Result<(Vec<String>, Vec<Row>), CsvError> {
    let mut records = parse_records(text)?.into_iter();
    let Some((_, header)) = records.next() else {
        return Ok((Vec::new(), Vec::new()));
    };

    let mut rows = Vec::new();
    for (line, record) in records {
        if record.len() != header.len() {
            return Err(CsvError::RowLength {
                line,
                expected: header.len(),
                found: record.len(),
            });
        }
        rows.push(header.iter().cloned().zip(record).collect());
    }

    Ok((header, rows))
}

/// Records with the line each starts on. Quoted fields may hold commas,
/// newlines and doubled quotes.
fn parse_records(text: &str) -> std::result::Result<Vec<(usize, Vec<String>)>, CsvError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut quote_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                quote_line = line;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push((record_line, std::mem::take(&mut record)));
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote { line: quote_line });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push((record_line, record));
    }

    Ok(records)
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn format_csv(columns: &[String], rows: &[Row], missing: &str) -> String {
    let mut out = String::new();
    let header: Vec<String> = columns.iter().map(|c| quote(c)).collect();
    out.push_str(&header.join(","));
    out.push_str("\r\n");

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| quote(row.get(column).map_or(missing, String::as_str)))
            .collect();
        out.push_str(&cells.join(","));
        out.push_str("\r\n");
    }
    out
}
