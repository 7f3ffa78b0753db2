//! Column type inference from raw cell text.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use url::Url;

use super::tokenizer::RawRecord;
use crate::column::{DEFAULT_DATE_FORMAT, parse_boolean};
use crate::value::DataKind;

/// Pattern for floating point numbers (various formats).
static FLOAT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+\.?\d*|\d*\.?\d+)(?:[eE][-+]?\d+)?$").expect("Invalid float pattern")
});

/// Pattern for ISO 8601 dates (YYYY-MM-DD).
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("Invalid date pattern"));

/// Pattern for absolute URLs with a web scheme.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?|ftp)://\S+$").expect("Invalid URL pattern"));

/// Check for NULL-like placeholder values. These carry no type vote.
#[inline]
fn is_null_word(s: &str) -> bool {
    s.eq_ignore_ascii_case("null")
        || s.eq_ignore_ascii_case("nil")
        || s.eq_ignore_ascii_case("none")
        || s.eq_ignore_ascii_case("na")
        || s.eq_ignore_ascii_case("n/a")
        || s.eq_ignore_ascii_case("nan")
        || matches!(s, "-" | "--" | "." | ".." | "?")
}

/// Check for a signed integer using string parsing instead of regex.
/// This is a hot path - called for every cell. Limit to 18 digits so
/// every accepted value fits in i64.
#[inline]
fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.len() <= 18 && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Guess the kind of a single cell.
///
/// Returns `None` for empty or placeholder text, which casts no vote.
/// Integers are checked before booleans so `1` and `0` count as numbers,
/// and dates and URLs must survive a real parse, not just the pattern.
pub fn detect_kind(text: &str) -> Option<DataKind> {
    let trimmed = text.trim();
    if trimmed.is_empty() || is_null_word(trimmed) {
        return None;
    }

    if is_integer(trimmed) {
        return Some(DataKind::Integer);
    }
    if parse_boolean(trimmed).is_some() {
        return Some(DataKind::Boolean);
    }
    if FLOAT_PATTERN.is_match(trimmed) && trimmed.contains(['.', 'e', 'E']) {
        return Some(DataKind::Double);
    }
    if DATE_PATTERN.is_match(trimmed)
        && NaiveDate::parse_from_str(trimmed, DEFAULT_DATE_FORMAT).is_ok()
    {
        return Some(DataKind::Date);
    }
    if URL_PATTERN.is_match(trimmed) && Url::parse(trimmed).is_ok() {
        return Some(DataKind::Url);
    }

    Some(DataKind::Text)
}

/// Combine two cell-level guesses into one column-level kind.
///
/// Integers widen to doubles; any other disagreement falls back to text.
fn merge(a: DataKind, b: DataKind) -> DataKind {
    if a == b {
        return a;
    }
    match (a, b) {
        (DataKind::Integer, DataKind::Double) | (DataKind::Double, DataKind::Integer) => {
            DataKind::Double
        }
        _ => DataKind::Text,
    }
}

/// Infer one kind per column from all records.
///
/// Cells beyond `columns` are ignored; a column whose cells were all
/// empty or placeholders stays text.
pub fn infer_kinds(records: &[RawRecord], columns: usize) -> Vec<DataKind> {
    let mut kinds: Vec<Option<DataKind>> = vec![None; columns];

    for record in records {
        for (index, cell) in record.fields.iter().enumerate().take(columns) {
            let Some(detected) = detect_kind(cell) else {
                continue;
            };
            kinds[index] = Some(match kinds[index] {
                Some(current) => merge(current, detected),
                None => detected,
            });
        }
    }

    kinds.into_iter().map(Option::unwrap_or_default).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_kind() {
        assert_eq!(detect_kind("123"), Some(DataKind::Integer));
        assert_eq!(detect_kind("-123"), Some(DataKind::Integer));
        assert_eq!(detect_kind("1"), Some(DataKind::Integer));
        assert_eq!(detect_kind("yes"), Some(DataKind::Boolean));
        assert_eq!(detect_kind("12.34"), Some(DataKind::Double));
        assert_eq!(detect_kind("1e5"), Some(DataKind::Double));
        assert_eq!(detect_kind("2023-12-31"), Some(DataKind::Date));
        assert_eq!(detect_kind("https://example.com/a"), Some(DataKind::Url));
        assert_eq!(detect_kind("hello"), Some(DataKind::Text));
        assert_eq!(detect_kind(""), None);
        assert_eq!(detect_kind("NULL"), None);
        assert_eq!(detect_kind("n/a"), None);
    }

    #[test]
    fn test_impossible_date_is_text() {
        // Matches the shape but not the calendar.
        assert_eq!(detect_kind("2023-13-45"), Some(DataKind::Text));
    }

    #[test]
    fn test_merge_widens_and_falls_back() {
        assert_eq!(merge(DataKind::Integer, DataKind::Integer), DataKind::Integer);
        assert_eq!(merge(DataKind::Integer, DataKind::Double), DataKind::Double);
        assert_eq!(merge(DataKind::Double, DataKind::Integer), DataKind::Double);
        assert_eq!(merge(DataKind::Date, DataKind::Integer), DataKind::Text);
    }

    fn record(fields: &[&str]) -> RawRecord {
        RawRecord {
            fields: fields.iter().map(ToString::to_string).collect(),
            raw: fields.join(","),
        }
    }

    #[test]
    fn test_infer_kinds() {
        let records = vec![
            record(&["1", "hello", "2023-01-01", ""]),
            record(&["2.5", "world", "2023-01-02", "NULL"]),
            record(&["3", "", "2023-01-03", "-"]),
        ];

        let kinds = infer_kinds(&records, 4);
        assert_eq!(
            kinds,
            vec![
                DataKind::Double,
                DataKind::Text,
                DataKind::Date,
                DataKind::Text,
            ]
        );
    }
}
