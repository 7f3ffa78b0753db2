//! Frequency and range summaries over one column.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use bigdecimal::ToPrimitive;
use chrono::Datelike;
use url::Url;

use crate::column::Column;
use crate::error::{Result, TableError};
use crate::table::Table;
use crate::value::{DataKind, Value};

/// Default number of buckets for [`RangeDistribution`].
pub const DEFAULT_BUCKETS: usize = 10;

/// How a cell value is projected before counting.
///
/// [`Facet::Identity`] counts the values themselves; the others derive a
/// summary key such as the year of a date or the host of a URL. A value
/// the facet cannot represent (an empty string's first letter, a URL
/// without a host) counts as null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    /// The value itself. Applies to every column variant.
    Identity,
    /// Calendar year of a date.
    Year,
    /// Month number (1 to 12) of a date.
    Month,
    /// Abbreviated weekday name of a date.
    Weekday,
    /// Host of a URL.
    Host,
    /// Scheme of a URL.
    Scheme,
    /// First character of a text value.
    FirstLetter,
    /// Character count of a text value.
    Length,
}

impl Facet {
    /// Project one value to its summary key, or `None` when the facet
    /// cannot represent it.
    pub fn extract(&self, value: &Value) -> Option<Value> {
        match self {
            Self::Identity => Some(value.clone()),
            Self::Year => value
                .as_date()
                .map(|date| Value::Integer(i64::from(date.year()))),
            Self::Month => value
                .as_date()
                .map(|date| Value::Integer(i64::from(date.month()))),
            Self::Weekday => value
                .as_date()
                .map(|date| Value::Text(date.weekday().to_string())),
            Self::Host => value
                .as_url()
                .and_then(Url::host_str)
                .map(|host| Value::Text(host.to_string())),
            Self::Scheme => value
                .as_url()
                .map(|url| Value::Text(url.scheme().to_string())),
            Self::FirstLetter => value
                .as_text()
                .and_then(|text| text.chars().next())
                .map(|letter| Value::Text(letter.to_string())),
            Self::Length => value
                .as_text()
                .map(|text| Value::Integer(text.chars().count() as i64)),
        }
    }

    /// Check that this facet can be applied to the given column.
    pub fn validate(&self, column: &Column) -> Result<()> {
        let kind = column.kind();
        let applies = match self {
            Self::Identity => true,
            Self::Year | Self::Month | Self::Weekday => kind.is_temporal(),
            Self::Host | Self::Scheme => kind == DataKind::Url,
            Self::FirstLetter | Self::Length => kind == DataKind::Text,
        };
        if applies {
            Ok(())
        } else {
            Err(TableError::Unsupported {
                column: column.name().to_string(),
                kind,
                operation: self.name(),
            })
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity facet",
            Self::Year => "year facet",
            Self::Month => "month facet",
            Self::Weekday => "weekday facet",
            Self::Host => "host facet",
            Self::Scheme => "scheme facet",
            Self::FirstLetter => "first-letter facet",
            Self::Length => "length facet",
        }
    }
}

/// Value wrapper ordered by the column comparison rule, so enumeration
/// order is deterministic.
#[derive(Debug, Clone, PartialEq)]
struct Key(Value);

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.compare(&other.0)
    }
}

/// Occurrence counts per distinct (faceted) value of one column.
///
/// Every row lands in exactly one bucket: the key its cell projects to,
/// or the null bucket for null cells and unrepresentable values. The
/// structure is a read-only snapshot; rebuild it after the table changes.
#[derive(Debug)]
pub struct FrequencyDistribution {
    column: String,
    facet: Facet,
    counts: BTreeMap<Key, usize>,
    null_count: usize,
    total: usize,
}

impl FrequencyDistribution {
    /// Count the given column's values across all rows.
    pub fn build(table: &Table, column: &str, facet: Facet) -> Result<Self> {
        let index = table.metadata().column_index(column)?;
        let col = table.metadata().column(index)?;
        facet.validate(col)?;

        let mut counts: BTreeMap<Key, usize> = BTreeMap::new();
        let mut null_count = 0;
        for row in table.rows() {
            match row.get(index).and_then(|value| facet.extract(value)) {
                Some(key) => *counts.entry(Key(key)).or_insert(0) += 1,
                None => null_count += 1,
            }
        }

        Ok(Self {
            column: col.name().to_string(),
            facet,
            counts,
            null_count,
            total: table.row_count(),
        })
    }

    /// Name of the summarized column.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// The facet the values were projected through.
    pub fn facet(&self) -> Facet {
        self.facet
    }

    /// Number of distinct non-null keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if no non-null key was seen.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Rows whose cell was null or unrepresentable under the facet.
    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Total rows summarized. Always equals the sum of all key counts
    /// plus the null count.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Occurrences of one key.
    pub fn count(&self, value: &Value) -> usize {
        self.counts.get(&Key(value.clone())).copied().unwrap_or(0)
    }

    /// Keys and counts in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, usize)> {
        self.counts.iter().map(|(key, &count)| (&key.0, count))
    }
}

/// One equal-width bucket of a [`RangeDistribution`].
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub low: f64,
    pub high: f64,
    pub count: usize,
}

/// Counts per equal-width bucket between a column's observed minimum and
/// maximum, for numeric and date columns with too many distinct values to
/// enumerate usefully.
///
/// Bounds live on a numeric axis: dates project to their day number.
/// Buckets are half-open except the last, which includes the maximum.
#[derive(Debug)]
pub struct RangeDistribution {
    column: String,
    buckets: Vec<Bucket>,
    null_count: usize,
    total: usize,
}

impl RangeDistribution {
    /// Bucket the given column's values across all rows.
    pub fn build(table: &Table, column: &str, buckets: usize) -> Result<Self> {
        let index = table.metadata().column_index(column)?;
        let col = table.metadata().column(index)?;
        let kind = col.kind();
        if !kind.is_numeric() && !kind.is_temporal() {
            return Err(TableError::Unsupported {
                column: col.name().to_string(),
                kind,
                operation: "range bucketing",
            });
        }

        let mut values = Vec::with_capacity(table.row_count());
        let mut null_count = 0;
        for row in table.rows() {
            match row.get(index).and_then(axis) {
                Some(value) => values.push(value),
                None => null_count += 1,
            }
        }

        let column = col.name().to_string();
        let total = table.row_count();
        if values.is_empty() {
            return Ok(Self {
                column,
                buckets: Vec::new(),
                null_count,
                total,
            });
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            return Ok(Self {
                column,
                buckets: vec![Bucket {
                    low: min,
                    high: max,
                    count: values.len(),
                }],
                null_count,
                total,
            });
        }

        let bucket_count = buckets.max(1);
        let width = (max - min) / bucket_count as f64;
        let mut counts = vec![0usize; bucket_count];
        for value in &values {
            let slot = (((value - min) / width) as usize).min(bucket_count - 1);
            counts[slot] += 1;
        }

        let buckets = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| Bucket {
                low: min + width * i as f64,
                high: if i + 1 == bucket_count {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count,
            })
            .collect();

        Ok(Self {
            column,
            buckets,
            null_count,
            total,
        })
    }

    /// Name of the summarized column.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// The buckets in ascending axis order.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Number of buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if no value landed in any bucket.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Rows whose cell was null or could not be projected to the axis.
    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Total rows summarized.
    pub fn total(&self) -> usize {
        self.total
    }
}

/// Project a value onto the bucketing axis. Dates become day numbers;
/// non-finite numbers are treated as unrepresentable.
fn axis(value: &Value) -> Option<f64> {
    let projected = match value {
        Value::Integer(n) => *n as f64,
        Value::Float(f) => f64::from(*f),
        Value::Double(d) => *d,
        Value::Decimal(d) => d.to_f64()?,
        Value::Date(date) => f64::from(date.num_days_from_ce()),
        _ => return None,
    };
    projected.is_finite().then_some(projected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::Reader;

    fn orders() -> Table {
        Reader::new()
            .read_bytes(
                b"day,amount\n\
                  2023-01-02,10\n\
                  2023-01-02,20\n\
                  2024-06-15,30\n\
                  ,40\n",
            )
            .unwrap()
    }

    #[test]
    fn test_identity_counts_and_sum_law() {
        let table = orders();
        let freq = table.frequency("day", Facet::Identity).unwrap();

        assert_eq!(freq.len(), 2);
        assert_eq!(freq.null_count(), 1);
        assert_eq!(freq.total(), 4);

        let counted: usize = freq.iter().map(|(_, count)| count).sum();
        assert_eq!(counted + freq.null_count(), freq.total());
    }

    #[test]
    fn test_year_facet() {
        let table = orders();
        let freq = table.frequency("day", Facet::Year).unwrap();

        assert_eq!(freq.count(&Value::Integer(2023)), 2);
        assert_eq!(freq.count(&Value::Integer(2024)), 1);
        assert_eq!(freq.null_count(), 1);
    }

    #[test]
    fn test_facet_kind_checked_at_build_time() {
        let table = orders();
        assert!(matches!(
            table.frequency("amount", Facet::Year),
            Err(TableError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_keys_enumerate_in_ascending_order() {
        let table = orders();
        let freq = table.frequency("amount", Facet::Identity).unwrap();
        let keys: Vec<i64> = freq
            .iter()
            .filter_map(|(value, _)| value.as_integer())
            .collect();
        assert_eq!(keys, vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_first_letter_of_empty_text_is_null() {
        let mut table = Table::new();
        table
            .add_column(Column::new("name", DataKind::Text))
            .unwrap();
        table.push_row(vec![Some(Value::Text("Ann".into()))]).unwrap();
        table.push_row(vec![Some(Value::Text(String::new()))]).unwrap();
        table.push_row(vec![None]).unwrap();

        let freq = table.frequency("name", Facet::FirstLetter).unwrap();
        assert_eq!(freq.count(&Value::Text("A".into())), 1);
        assert_eq!(freq.null_count(), 2);
    }

    #[test]
    fn test_equal_width_buckets() {
        let mut table = Table::new();
        table.add_column(Column::new("n", DataKind::Integer)).unwrap();
        for n in 1..=10 {
            table.push_row(vec![Some(Value::Integer(n))]).unwrap();
        }
        table.push_row(vec![None]).unwrap();

        let ranges = table.ranges("n", 5).unwrap();
        assert_eq!(ranges.len(), 5);
        assert!(ranges.buckets().iter().all(|bucket| bucket.count == 2));
        assert_eq!(ranges.null_count(), 1);

        let counted: usize = ranges.buckets().iter().map(|bucket| bucket.count).sum();
        assert_eq!(counted + ranges.null_count(), ranges.total());

        // The maximum lands in the last bucket, not past it.
        assert_eq!(ranges.buckets()[4].high, 10.0);
    }

    #[test]
    fn test_single_valued_column_gets_one_bucket() {
        let mut table = Table::new();
        table.add_column(Column::new("n", DataKind::Integer)).unwrap();
        for _ in 0..3 {
            table.push_row(vec![Some(Value::Integer(7))]).unwrap();
        }

        let ranges = table.ranges("n", DEFAULT_BUCKETS).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges.buckets()[0].count, 3);
        assert_eq!(ranges.buckets()[0].low, 7.0);
        assert_eq!(ranges.buckets()[0].high, 7.0);
    }

    #[test]
    fn test_ranges_reject_text_columns() {
        let table = orders();
        assert!(matches!(
            RangeDistribution::build(&table, "day", 5),
            Ok(_)
        ));

        let mut table = Table::new();
        table.add_column(Column::new("t", DataKind::Text)).unwrap();
        assert!(matches!(
            RangeDistribution::build(&table, "t", 5),
            Err(TableError::Unsupported { .. })
        ));
    }
}
