//! Fluent row filtering, sorting, and projection over a table.

mod matcher;

pub use matcher::Matcher;

use std::cmp::Ordering;

use regex::Regex;

use crate::column::Column;
use crate::error::Result;
use crate::row::Row;
use crate::serialize;
use crate::table::Table;
use crate::value::Value;

/// Sort direction for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A query under construction: predicates, sort keys, and a projection.
///
/// Predicates are AND-combined; a row is kept only when every one of them
/// matches. Sort keys apply in declaration order and the sort is stable,
/// so rows tying on all keys keep their original relative order. The
/// projection only affects which columns are reported, never which rows
/// match.
///
/// ```
/// # use csv_loom::{Reader, Result};
/// # fn demo() -> Result<()> {
/// let table = Reader::new().read_bytes(b"id,name\n1,Bill\n2,Ann\n")?;
/// let result = table
///     .query()
///     .column("id")?.greater_than(1)?
///     .desc("name")?
///     .select(["name"])?
///     .rows();
/// assert_eq!(result.len(), 1);
/// # Ok(())
/// # }
/// # demo().unwrap();
/// ```
#[derive(Debug)]
pub struct Query<'t> {
    table: &'t Table,
    predicates: Vec<(usize, Matcher)>,
    sort_keys: Vec<(usize, Direction)>,
    projection: Option<Vec<usize>>,
}

impl<'t> Query<'t> {
    pub(crate) fn new(table: &'t Table) -> Self {
        Self {
            table,
            predicates: Vec::new(),
            sort_keys: Vec::new(),
            projection: None,
        }
    }

    /// Open a predicate clause against the named column.
    pub fn column(self, name: &str) -> Result<ColumnClause<'t>> {
        let index = self.table.metadata().column_index(name)?;
        Ok(ColumnClause { query: self, index })
    }

    /// Add an ascending sort key on the named column.
    pub fn asc(self, name: &str) -> Result<Self> {
        self.order_by(name, Direction::Ascending)
    }

    /// Add a descending sort key on the named column.
    pub fn desc(self, name: &str) -> Result<Self> {
        self.order_by(name, Direction::Descending)
    }

    /// Add a sort key on the named column.
    pub fn order_by(mut self, name: &str, direction: Direction) -> Result<Self> {
        let index = self.table.metadata().column_index(name)?;
        self.sort_keys.push((index, direction));
        Ok(self)
    }

    /// Report only the named columns in the result. Rows still match on
    /// every column.
    pub fn select<I, S>(mut self, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let indices = columns
            .into_iter()
            .map(|name| self.table.metadata().column_index(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        self.projection = Some(indices);
        Ok(self)
    }

    /// Evaluate the query.
    ///
    /// Every predicate is tested against every row; a row is included iff
    /// the number of matching predicates equals the number registered.
    /// Filtering keeps table order; sorting is applied afterwards.
    pub fn rows(self) -> ResultSet<'t> {
        let mut indices = Vec::new();
        for (row_index, row) in self.table.rows().iter().enumerate() {
            let matched = self
                .predicates
                .iter()
                .filter(|(column, matcher)| matcher.matches(row.get(*column)))
                .count();
            if matched == self.predicates.len() {
                indices.push(row_index);
            }
        }

        if !self.sort_keys.is_empty() {
            let rows = self.table.rows();
            indices.sort_by(|&a, &b| compare_rows(&rows[a], &rows[b], &self.sort_keys));
        }

        ResultSet {
            table: self.table,
            indices,
            projection: self.projection,
        }
    }
}

/// Multi-key comparison: first non-equal key decides, nulls sort before
/// values on an ascending key.
fn compare_rows(a: &Row, b: &Row, keys: &[(usize, Direction)]) -> Ordering {
    for &(column, direction) in keys {
        let ordering = compare_cells(a.get(column), b.get(column));
        let ordering = match direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(b),
    }
}

/// A predicate clause scoped to one column.
///
/// Each predicate method validates the matcher against the column's
/// variant and hands the query back, so a mistyped predicate fails when
/// the query is built, not when it runs.
#[derive(Debug)]
pub struct ColumnClause<'t> {
    query: Query<'t>,
    index: usize,
}

impl<'t> ColumnClause<'t> {
    fn push(mut self, matcher: Matcher) -> Result<Query<'t>> {
        let column = self.query.table.metadata().column(self.index)?;
        matcher.validate(column)?;
        self.query.predicates.push((self.index, matcher));
        Ok(self.query)
    }

    /// The cell equals the given value.
    pub fn eq(self, value: impl Into<Value>) -> Result<Query<'t>> {
        self.push(Matcher::Equals(value.into()))
    }

    /// The cell is one of the candidates; `None` matches a null cell.
    pub fn is_in<I>(self, values: I) -> Result<Query<'t>>
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        self.push(Matcher::In(values.into_iter().collect()))
    }

    /// The cell is null.
    pub fn is_null(self) -> Result<Query<'t>> {
        self.push(Matcher::In(vec![None]))
    }

    /// The cell holds any value.
    pub fn is_not_null(self) -> Result<Query<'t>> {
        self.push(Matcher::NotNull)
    }

    /// The cell lies in the inclusive range `[low, high]`.
    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> Result<Query<'t>> {
        self.push(Matcher::Between(low.into(), high.into()))
    }

    /// The cell is strictly greater than the given value.
    pub fn greater_than(self, value: impl Into<Value>) -> Result<Query<'t>> {
        self.push(Matcher::GreaterThan(value.into()))
    }

    /// The cell is strictly less than the given value.
    pub fn less_than(self, value: impl Into<Value>) -> Result<Query<'t>> {
        self.push(Matcher::LessThan(value.into()))
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Result<Query<'t>> {
        self.push(Matcher::StartsWith(prefix.into()))
    }

    pub fn ends_with(self, suffix: impl Into<String>) -> Result<Query<'t>> {
        self.push(Matcher::EndsWith(suffix.into()))
    }

    pub fn first_letter(self, letter: char) -> Result<Query<'t>> {
        self.push(Matcher::FirstLetter(letter))
    }

    pub fn length(self, length: usize) -> Result<Query<'t>> {
        self.push(Matcher::Length(length))
    }

    pub fn word_count(self, count: usize) -> Result<Query<'t>> {
        self.push(Matcher::WordCount(count))
    }

    /// The text cell matches the regular expression.
    pub fn matches(self, pattern: &str) -> Result<Query<'t>> {
        let regex = Regex::new(pattern)?;
        self.push(Matcher::Matches(regex))
    }

    pub fn host(self, host: impl Into<String>) -> Result<Query<'t>> {
        self.push(Matcher::Host(host.into()))
    }

    /// The URL cell's port, explicit or the scheme default, equals the
    /// given one.
    pub fn port(self, port: u16) -> Result<Query<'t>> {
        self.push(Matcher::Port(port))
    }

    pub fn path(self, path: impl Into<String>) -> Result<Query<'t>> {
        self.push(Matcher::Path(path.into()))
    }

    /// The URL cell's final path segment equals the given one.
    pub fn file_name(self, name: impl Into<String>) -> Result<Query<'t>> {
        self.push(Matcher::FileName(name.into()))
    }

    pub fn url_query(self, query: impl Into<String>) -> Result<Query<'t>> {
        self.push(Matcher::UrlQuery(query.into()))
    }

    pub fn fragment(self, fragment: impl Into<String>) -> Result<Query<'t>> {
        self.push(Matcher::Fragment(fragment.into()))
    }

    pub fn scheme(self, scheme: impl Into<String>) -> Result<Query<'t>> {
        self.push(Matcher::Scheme(scheme.into()))
    }
}

/// The outcome of a query: matching rows in result order, plus the
/// projected column set.
#[derive(Debug)]
pub struct ResultSet<'t> {
    table: &'t Table,
    indices: Vec<usize>,
    projection: Option<Vec<usize>>,
}

impl<'t> ResultSet<'t> {
    /// Number of matching rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if no row matched.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Table positions of the matching rows, in result order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The matching rows, in result order.
    pub fn iter(&self) -> impl Iterator<Item = &'t Row> + '_ {
        let rows = self.table.rows();
        self.indices.iter().map(move |&index| &rows[index])
    }

    /// The row at the given result position.
    pub fn row(&self, position: usize) -> Option<&'t Row> {
        let rows = self.table.rows();
        self.indices.get(position).map(|&index| &rows[index])
    }

    /// The projected columns, or all columns when nothing was selected.
    pub fn columns(&self) -> Vec<&'t Column> {
        let metadata = self.table.metadata();
        match &self.projection {
            Some(indices) => indices
                .iter()
                .filter_map(|&index| metadata.columns().get(index))
                .collect(),
            None => metadata.columns().iter().collect(),
        }
    }

    /// Serialize every matching row to ordered field lists, honoring the
    /// projection.
    pub fn records(&self) -> Vec<Vec<String>> {
        let metadata = self.table.metadata();
        let column_indices: Vec<usize> = match &self.projection {
            Some(indices) => indices.clone(),
            None => (0..metadata.len()).collect(),
        };

        self.indices
            .iter()
            .map(|&row_index| {
                let row = &self.table.rows()[row_index];
                column_indices
                    .iter()
                    .filter_map(|&column_index| {
                        metadata.columns().get(column_index).map(|column| {
                            serialize::format_field(column, row.get(column_index))
                        })
                    })
                    .collect()
            })
            .collect()
    }
}
