//! FILENAME: core/pivot-grid/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PivotGridError {
    #[error("Malformed column id segment '{segment}' in {col_id}")]
    MalformedColId { col_id: String, segment: String },

    #[error("No attribute header matches token {token} of column {col_id}")]
    UnknownAttribute { col_id: String, token: String },

    #[error("No measure at index {index} for column {col_id}")]
    UnknownMeasure { col_id: String, index: usize },

    #[error("Unexpected segment '{segment}' in column {col_id}")]
    UnexpectedSegment { col_id: String, segment: String },

    #[error("Execution response has no {0} dimension")]
    MissingDimension(&'static str),

    #[error("Sort locator cannot be resolved: {0}")]
    UnknownLocator(String),

    #[error("Column not found: {0}")]
    UnknownColumn(String),

    #[error("Row {row} out of range ({row_count} rows)")]
    RowOutOfRange { row: usize, row_count: usize },

    #[error("No grid snapshot has been built yet")]
    NoSnapshot,

    #[error("Update {version} was superseded by update {current}")]
    StaleUpdate { version: u64, current: u64 },

    #[error("Page of {rows} rows at offset {offset} does not fit {total} rows")]
    InvalidPage { offset: usize, rows: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, PivotGridError>;
