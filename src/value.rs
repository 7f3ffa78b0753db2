//! Typed cell values and the per-variant comparison table.

use std::cmp::Ordering;
use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use url::Url;

/// Declared data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataKind {
    /// Free-form text (fallback type).
    #[default]
    Text,
    /// 64-bit signed integer.
    Integer,
    /// 32-bit floating point number.
    Float,
    /// 64-bit floating point number.
    Double,
    /// Arbitrary-precision decimal number.
    Decimal,
    /// Boolean value.
    Boolean,
    /// Calendar date (no time component).
    Date,
    /// Absolute URL.
    Url,
    /// Raw byte sequence, Base64 in text form.
    Bytes,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DataKind {
    /// Number of variants in the `DataKind` enum.
    pub const COUNT: usize = 9;

    /// Canonical variant name, as accepted by header annotations.
    pub const fn name(&self) -> &'static str {
        match self {
            DataKind::Text => "Text",
            DataKind::Integer => "Integer",
            DataKind::Float => "Float",
            DataKind::Double => "Double",
            DataKind::Decimal => "Decimal",
            DataKind::Boolean => "Boolean",
            DataKind::Date => "Date",
            DataKind::Url => "Url",
            DataKind::Bytes => "Bytes",
        }
    }

    /// Returns the index for this kind (0-8), suitable for array indexing
    /// and used as the cross-variant tie-break in comparisons.
    #[inline]
    pub const fn as_index(&self) -> usize {
        match self {
            DataKind::Text => 0,
            DataKind::Integer => 1,
            DataKind::Float => 2,
            DataKind::Double => 3,
            DataKind::Decimal => 4,
            DataKind::Boolean => 5,
            DataKind::Date => 6,
            DataKind::Url => 7,
            DataKind::Bytes => 8,
        }
    }

    /// Returns true if this kind is numeric.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataKind::Integer | DataKind::Float | DataKind::Double | DataKind::Decimal
        )
    }

    /// Returns true if this kind is temporal.
    #[inline]
    pub fn is_temporal(&self) -> bool {
        matches!(self, DataKind::Date)
    }

    /// Resolve a kind from a case-insensitive name. Accepts the canonical
    /// names plus the aliases commonly seen in header annotations.
    pub fn from_name(name: &str) -> Option<DataKind> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("text")
            || name.eq_ignore_ascii_case("string")
            || name.eq_ignore_ascii_case("varchar")
        {
            Some(DataKind::Text)
        } else if name.eq_ignore_ascii_case("integer") || name.eq_ignore_ascii_case("int") {
            Some(DataKind::Integer)
        } else if name.eq_ignore_ascii_case("float") {
            Some(DataKind::Float)
        } else if name.eq_ignore_ascii_case("double") {
            Some(DataKind::Double)
        } else if name.eq_ignore_ascii_case("decimal") || name.eq_ignore_ascii_case("bigdecimal") {
            Some(DataKind::Decimal)
        } else if name.eq_ignore_ascii_case("boolean") || name.eq_ignore_ascii_case("bool") {
            Some(DataKind::Boolean)
        } else if name.eq_ignore_ascii_case("date") {
            Some(DataKind::Date)
        } else if name.eq_ignore_ascii_case("url") {
            Some(DataKind::Url)
        } else if name.eq_ignore_ascii_case("bytes") || name.eq_ignore_ascii_case("byte") {
            Some(DataKind::Bytes)
        } else {
            None
        }
    }
}

/// A single typed cell value.
///
/// Every variant corresponds to one [`DataKind`]; a column only ever holds
/// values of its declared variant (or no value at all for empty cells).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Free-form text.
    Text(String),
    /// 64-bit signed integer.
    Integer(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Arbitrary-precision decimal.
    Decimal(BigDecimal),
    /// Boolean.
    Boolean(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Absolute URL.
    Url(Url),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl Value {
    /// The kind this value is an instance of.
    pub fn kind(&self) -> DataKind {
        match self {
            Value::Text(_) => DataKind::Text,
            Value::Integer(_) => DataKind::Integer,
            Value::Float(_) => DataKind::Float,
            Value::Double(_) => DataKind::Double,
            Value::Decimal(_) => DataKind::Decimal,
            Value::Boolean(_) => DataKind::Boolean,
            Value::Date(_) => DataKind::Date,
            Value::Url(_) => DataKind::Url,
            Value::Bytes(_) => DataKind::Bytes,
        }
    }

    /// Total order used by the sorter and by distribution keys.
    ///
    /// Same-variant values compare by their natural rule: numbers by value
    /// (floats via `total_cmp`, so NaN orders deterministically), dates by
    /// instant, text lexicographically, booleans false < true, URLs by
    /// normalized string form, bytes bytewise. Values of different variants
    /// never share a column; if compared anyway they order by variant index.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Url(a), Value::Url(b)) => a.as_str().cmp(b.as_str()),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            _ => self.kind().as_index().cmp(&other.kind().as_index()),
        }
    }

    /// Borrow the text payload, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, if this is an `Integer` value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The float payload, if this is a `Float` value.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// The double payload, if this is a `Double` value.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow the decimal payload, if this is a `Decimal` value.
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Value::Decimal(n) => Some(n),
            _ => None,
        }
    }

    /// The boolean payload, if this is a `Boolean` value.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The date payload, if this is a `Date` value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Borrow the URL payload, if this is a `Url` value.
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Value::Url(u) => Some(u),
            _ => None,
        }
    }

    /// Borrow the byte payload, if this is a `Bytes` value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// Canonical text form, using each variant's default format. Date columns
/// with a custom format pattern serialize through
/// [`Column::format`](crate::Column::format) instead.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Double(n) => write!(f, "{n}"),
            Value::Decimal(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Url(u) => f.write_str(u.as_str()),
            Value::Bytes(b) => f.write_str(&BASE64.encode(b)),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<BigDecimal> for Value {
    fn from(n: BigDecimal) -> Self {
        Value::Decimal(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<Url> for Value {
    fn from(u: Url) -> Self {
        Value::Url(u)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}
