mod csv;
mod terminal;

pub use csv::{parse_rows, read_csv, CsvError, CsvReport, Row, WriteSummary};
pub use terminal::{describe, TerminalReporter};
