use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryParseError {
    #[error("Row {row} has {found} columns, expected {expected}")]
    ColumnCount {
        row: u64,
        expected: usize,
        found: usize,
    },

    #[error("Row {row} has an invalid date '{value}'")]
    InvalidDate { row: u64, value: String },

    #[error("Row {row} has an invalid {column} value '{value}'")]
    InvalidNumber {
        row: u64,
        column: &'static str,
        value: String,
    },

    #[error("Row {row} is a data row but no year/month header precedes it")]
    MissingPeriodHeader { row: u64 },

    #[error("Row {row} is neither a header nor a data row: '{value}'")]
    UnrecognizedRow { row: u64, value: String },

    #[error("History table '{0}' not found in markup")]
    MissingTable(&'static str),

    #[error("Failed to read delimited history data")]
    Csv(#[from] csv::Error),
}
