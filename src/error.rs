use std::io;
use thiserror::Error;

use crate::value::DataKind;

/// Error type for table construction, lookup, and query building.
#[derive(Error, Debug)]
pub enum TableError {
    /// IO error while reading a byte source.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No column with the given name (case-insensitive lookup).
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// A column with the same case-insensitive name already exists.
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    /// Column position outside the current column count.
    #[error("column index {0} out of bounds")]
    ColumnOutOfBounds(usize),

    /// Row position outside the current row count.
    #[error("row index {0} out of bounds")]
    RowOutOfBounds(usize),

    /// A typed accessor, predicate, or facet was applied to a column of a
    /// different variant.
    #[error("column '{column}' is {found}, expected {expected}")]
    KindMismatch {
        /// Name of the column involved.
        column: String,
        /// Variant the operation requires.
        expected: DataKind,
        /// Variant the column actually declares.
        found: DataKind,
    },

    /// A predicate family or facet was applied to a column variant it
    /// cannot work on.
    #[error("{operation} cannot apply to {kind} column '{column}'")]
    Unsupported {
        /// Name of the column involved.
        column: String,
        /// Variant the column declares.
        kind: DataKind,
        /// What was attempted, e.g. `"range predicate"`.
        operation: &'static str,
    },

    /// Raw cell text could not be parsed as the column's variant.
    #[error("cannot parse {text:?} as {kind}")]
    Format {
        /// Variant the parse targeted.
        kind: DataKind,
        /// The offending raw text.
        text: String,
    },

    /// Invalid regular expression supplied to a pattern predicate.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
