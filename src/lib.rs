//! csv-loom: typed in-memory tables from delimiter-separated text
//!
//! Reads CSV-like files (comma, tab, semicolon, or pipe separated) into a
//! [`Table`] of typed values, with charset and separator auto-detection,
//! per-column type inference, a composable filter/sort query engine, and
//! frequency/range summaries over single columns.
//!
//! # Quick Start
//!
//! ```no_run
//! use csv_loom::{Facet, Reader};
//!
//! // Read a file with auto-detected charset and separator
//! let table = Reader::new().read_path("orders.csv").unwrap();
//!
//! for column in table.metadata().columns() {
//!     println!("{}: {}", column.name(), column.kind());
//! }
//!
//! // Filter and sort without copying rows
//! let hits = table
//!     .query()
//!     .column("amount").unwrap().greater_than(100).unwrap()
//!     .asc("day").unwrap()
//!     .rows();
//! println!("{} rows match", hits.len());
//!
//! // Count distinct values through a facet
//! let by_year = table.frequency("day", Facet::Year).unwrap();
//! for (year, count) in by_year.iter() {
//!     println!("{year}: {count}");
//! }
//! ```
//!
//! # Data model
//!
//! A [`Table`] owns a [`MetaData`] (ordered [`Column`]s plus the table-wide
//! separator, quote character, and charset) and a sequence of [`Row`]s.
//! Every cell is an optional [`Value`] whose variant matches its column's
//! [`DataKind`]: text, integer, float, double, decimal, boolean, date, URL,
//! or bytes. Cells parse leniently (a malformed cell becomes null) but
//! mutate strictly (storing a mismatched variant is an error).
//!
//! Header cells may carry annotations such as `amount(type=Double)` or
//! `day(type=Date,format=%d.%m.%Y)`; annotated columns keep their declared
//! kind, all others get the most specific kind every non-null cell in the
//! column agrees on.

mod column;
mod encoding;
mod error;
mod metadata;
mod query;
mod read;
mod row;
mod serialize;
mod stats;
mod table;
mod value;

// Re-export public API
pub use column::{Column, DEFAULT_DATE_FORMAT};
pub use encoding::Charset;
pub use error::{Result, TableError};
pub use metadata::MetaData;
pub use query::{ColumnClause, Direction, Matcher, Query, ResultSet};
pub use read::Reader;
pub use row::Row;
pub use stats::{Bucket, DEFAULT_BUCKETS, Facet, FrequencyDistribution, RangeDistribution};
pub use table::{FromRow, Table, TableEvent};
pub use value::{DataKind, Value};

// Re-export for advanced usage
pub use encoding::{detect_bom, is_utf8, sniff_charset};
pub use read::tokenizer::{DELIMITERS, RawRecord, Tokenizer, detect_separator};
pub use serialize::{format_field, quote_field, record_fields};
