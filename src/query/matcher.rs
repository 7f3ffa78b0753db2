//! Per-column predicates evaluated against single cell values.

use regex::Regex;

use crate::column::Column;
use crate::error::{Result, TableError};
use crate::value::{DataKind, Value};

/// A pure predicate over one column's cell value.
///
/// Matchers never see the row set; the query engine hands each one the
/// already-extracted cell for its column. A null cell fails every matcher
/// except [`Matcher::In`] with an explicit `None` among its candidates.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// The value equals the given one.
    Equals(Value),
    /// The cell is one of the candidates; `None` stands for a null cell.
    In(Vec<Option<Value>>),
    /// The cell holds any value at all.
    NotNull,
    /// The value lies in the inclusive range `[low, high]`.
    Between(Value, Value),
    GreaterThan(Value),
    LessThan(Value),
    /// Text starts with the given prefix.
    StartsWith(String),
    /// Text ends with the given suffix.
    EndsWith(String),
    /// Text begins with the given character.
    FirstLetter(char),
    /// Text is exactly this many characters long.
    Length(usize),
    /// Text has exactly this many whitespace-separated words.
    WordCount(usize),
    /// Text matches the regular expression.
    Matches(Regex),
    /// URL host equals the given one.
    Host(String),
    /// URL port (explicit or the scheme default) equals the given one.
    Port(u16),
    /// URL path equals the given one.
    Path(String),
    /// Final URL path segment equals the given one.
    FileName(String),
    /// URL query string equals the given one.
    UrlQuery(String),
    /// URL fragment equals the given one.
    Fragment(String),
    /// URL scheme equals the given one.
    Scheme(String),
}

impl Matcher {
    /// Does the cell satisfy this matcher?
    pub fn matches(&self, cell: Option<&Value>) -> bool {
        match cell {
            Some(value) => self.matches_value(value),
            None => matches!(self, Self::In(candidates) if candidates.contains(&None)),
        }
    }

    fn matches_value(&self, value: &Value) -> bool {
        match self {
            Self::Equals(expected) => value == expected,
            Self::In(candidates) => candidates
                .iter()
                .any(|candidate| candidate.as_ref() == Some(value)),
            Self::NotNull => true,
            Self::Between(low, high) => {
                value.compare(low).is_ge() && value.compare(high).is_le()
            }
            Self::GreaterThan(bound) => value.compare(bound).is_gt(),
            Self::LessThan(bound) => value.compare(bound).is_lt(),
            Self::StartsWith(prefix) => {
                value.as_text().is_some_and(|text| text.starts_with(prefix))
            }
            Self::EndsWith(suffix) => {
                value.as_text().is_some_and(|text| text.ends_with(suffix))
            }
            Self::FirstLetter(letter) => value
                .as_text()
                .is_some_and(|text| text.chars().next() == Some(*letter)),
            Self::Length(length) => value
                .as_text()
                .is_some_and(|text| text.chars().count() == *length),
            Self::WordCount(count) => value
                .as_text()
                .is_some_and(|text| text.split_whitespace().count() == *count),
            Self::Matches(regex) => value.as_text().is_some_and(|text| regex.is_match(text)),
            Self::Host(host) => value
                .as_url()
                .is_some_and(|url| url.host_str() == Some(host.as_str())),
            Self::Port(port) => value
                .as_url()
                .is_some_and(|url| url.port_or_known_default() == Some(*port)),
            Self::Path(path) => value.as_url().is_some_and(|url| url.path() == path),
            Self::FileName(name) => value.as_url().is_some_and(|url| {
                url.path_segments()
                    .and_then(Iterator::last)
                    .is_some_and(|segment| segment == name)
            }),
            Self::UrlQuery(query) => value
                .as_url()
                .is_some_and(|url| url.query() == Some(query.as_str())),
            Self::Fragment(fragment) => value
                .as_url()
                .is_some_and(|url| url.fragment() == Some(fragment.as_str())),
            Self::Scheme(scheme) => value.as_url().is_some_and(|url| url.scheme() == scheme),
        }
    }

    /// Check that this matcher can be applied to the given column.
    ///
    /// Fails at query-build time rather than silently mismatching during
    /// evaluation: range matchers need a numeric or date column, string
    /// facets a text column, URL facets a URL column, and every literal
    /// must carry the column's variant.
    pub fn validate(&self, column: &Column) -> Result<()> {
        match self {
            Self::Equals(value) => check_value_kind(column, value),
            Self::In(candidates) => candidates
                .iter()
                .flatten()
                .try_for_each(|value| check_value_kind(column, value)),
            Self::NotNull => Ok(()),
            Self::Between(low, high) => {
                check_range_column(column)?;
                check_value_kind(column, low)?;
                check_value_kind(column, high)
            }
            Self::GreaterThan(bound) | Self::LessThan(bound) => {
                check_range_column(column)?;
                check_value_kind(column, bound)
            }
            Self::StartsWith(_)
            | Self::EndsWith(_)
            | Self::FirstLetter(_)
            | Self::Length(_)
            | Self::WordCount(_)
            | Self::Matches(_) => check_column_kind(column, DataKind::Text, "string predicate"),
            Self::Host(_)
            | Self::Port(_)
            | Self::Path(_)
            | Self::FileName(_)
            | Self::UrlQuery(_)
            | Self::Fragment(_)
            | Self::Scheme(_) => check_column_kind(column, DataKind::Url, "URL predicate"),
        }
    }
}

fn check_value_kind(column: &Column, value: &Value) -> Result<()> {
    if value.kind() == column.kind() {
        Ok(())
    } else {
        Err(TableError::KindMismatch {
            column: column.name().to_string(),
            expected: column.kind(),
            found: value.kind(),
        })
    }
}

fn check_column_kind(column: &Column, expected: DataKind, operation: &'static str) -> Result<()> {
    if column.kind() == expected {
        Ok(())
    } else {
        Err(TableError::Unsupported {
            column: column.name().to_string(),
            kind: column.kind(),
            operation,
        })
    }
}

fn check_range_column(column: &Column) -> Result<()> {
    let kind = column.kind();
    if kind.is_numeric() || kind.is_temporal() {
        Ok(())
    } else {
        Err(TableError::Unsupported {
            column: column.name().to_string(),
            kind,
            operation: "range predicate",
        })
    }
}
