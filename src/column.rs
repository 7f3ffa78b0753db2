//! Column definitions: a name, a declared variant, and per-variant parsing
//! and formatting.

use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use url::Url;

use crate::error::{Result, TableError};
use crate::value::{DataKind, Value};

/// Default strftime pattern for Date columns.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A typed, named field definition shared by all rows of a table.
///
/// The variant never changes after construction; renames go through the
/// owning table so the name index and change events stay consistent.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    kind: DataKind,
    date_format: String,
    /// Fixed display width hint for consumers.
    pub width: Option<usize>,
    /// Display visibility hint for consumers.
    pub visible: bool,
}

impl Column {
    /// Create a column with the given name and variant.
    pub fn new(name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            kind,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            width: None,
            visible: true,
        }
    }

    /// Create a Date column with a custom strftime pattern.
    pub fn date(name: impl Into<String>, format: &str) -> Self {
        let mut column = Self::new(name, DataKind::Date);
        column.set_date_format(format);
        column
    }

    /// The column's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column's declared variant.
    pub fn kind(&self) -> DataKind {
        self.kind
    }

    /// The strftime pattern used by Date parsing and formatting.
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Set the Date pattern. Rejects patterns chrono cannot compile and
    /// keeps the previous one; returns whether the pattern was accepted.
    pub fn set_date_format(&mut self, format: &str) -> bool {
        if date_format_valid(format) {
            self.date_format = format.to_string();
            true
        } else {
            tracing::warn!("rejecting invalid date format {format:?}");
            false
        }
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    /// Parse raw cell text into a typed value.
    ///
    /// Text columns take the input verbatim; every other variant trims
    /// surrounding whitespace first. Failure reports the variant and the
    /// offending text; callers that load files recover per-cell by storing
    /// null instead.
    pub fn parse(&self, text: &str) -> Result<Value> {
        let trimmed = text.trim();
        let fail = || TableError::Format {
            kind: self.kind,
            text: text.to_string(),
        };

        match self.kind {
            DataKind::Text => Ok(Value::Text(text.to_string())),
            DataKind::Integer => trimmed
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| fail()),
            DataKind::Float => trimmed.parse::<f32>().map(Value::Float).map_err(|_| fail()),
            DataKind::Double => trimmed
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| fail()),
            DataKind::Decimal => BigDecimal::from_str(trimmed)
                .map(Value::Decimal)
                .map_err(|_| fail()),
            DataKind::Boolean => parse_boolean(trimmed).map(Value::Boolean).ok_or_else(fail),
            DataKind::Date => NaiveDate::parse_from_str(trimmed, &self.date_format)
                .map(Value::Date)
                .map_err(|_| fail()),
            DataKind::Url => Url::parse(trimmed).map(Value::Url).map_err(|_| fail()),
            DataKind::Bytes => BASE64.decode(trimmed).map(Value::Bytes).map_err(|_| fail()),
        }
    }

    /// Format a typed value back to text. Inverse of [`Column::parse`] for
    /// every representable value; Date values honor the column's pattern.
    pub fn format(&self, value: &Value) -> String {
        match value {
            Value::Date(d) => d.format(&self.date_format).to_string(),
            other => other.to_string(),
        }
    }

    /// Build a column from one header cell, honoring an inline annotation
    /// of the form `name(type=Integer)` or
    /// `born(type=Date,format=%d/%m/%Y,width=12)`.
    ///
    /// Cells without a well-formed annotation become Text columns named by
    /// the whole (trimmed) cell.
    pub fn from_header_cell(cell: &str) -> Column {
        let trimmed = cell.trim();
        Self::header_annotation(trimmed).unwrap_or_else(|| Column::new(trimmed, DataKind::Text))
    }

    /// The annotated column, or `None` when the cell carries no
    /// well-formed annotation.
    pub(crate) fn header_annotation(cell: &str) -> Option<Column> {
        let trimmed = cell.trim();
        let open = trimmed.find('(')?;
        if !trimmed.ends_with(')') {
            return None;
        }
        let name = trimmed[..open].trim();
        let body = &trimmed[open + 1..trimmed.len() - 1];
        let column = Self::from_annotation(name, body);
        if column.is_none() {
            tracing::debug!("ignoring malformed header annotation in {cell:?}");
        }
        column
    }

    fn from_annotation(name: &str, body: &str) -> Option<Column> {
        let mut kind = None;
        let mut format = None;
        let mut width = None;

        for part in body.split(',') {
            let (key, val) = part.split_once('=')?;
            match key.trim().to_ascii_lowercase().as_str() {
                "type" => kind = Some(DataKind::from_name(val)?),
                "format" => format = Some(val.trim().to_string()),
                "width" => width = val.trim().parse::<usize>().ok(),
                _ => return None,
            }
        }

        let mut column = Column::new(name, kind?);
        if let Some(fmt) = format {
            column.set_date_format(&fmt);
        }
        column.width = width;
        Some(column)
    }
}

/// Check a strftime pattern without formatting anything.
fn date_format_valid(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// Parse the accepted boolean spellings, case-insensitively.
pub(crate) fn parse_boolean(s: &str) -> Option<bool> {
    match s.len() {
        1 => match s.as_bytes()[0].to_ascii_lowercase() {
            b'1' | b'y' | b't' => Some(true),
            b'0' | b'n' | b'f' => Some(false),
            _ => None,
        },
        2 => {
            if s.eq_ignore_ascii_case("on") {
                Some(true)
            } else if s.eq_ignore_ascii_case("no") {
                Some(false)
            } else {
                None
            }
        }
        3 => {
            if s.eq_ignore_ascii_case("yes") {
                Some(true)
            } else if s.eq_ignore_ascii_case("off") {
                Some(false)
            } else {
                None
            }
        }
        4 if s.eq_ignore_ascii_case("true") => Some(true),
        5 if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}
