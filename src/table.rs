//! The table aggregate: column metadata plus the ordered sequence of rows.

use std::sync::mpsc::{self, Receiver, Sender};

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use url::Url;

use crate::column::Column;
use crate::error::{Result, TableError};
use crate::metadata::MetaData;
use crate::query::Query;
use crate::row::Row;
use crate::stats::{Facet, FrequencyDistribution, RangeDistribution};
use crate::value::{DataKind, Value};

/// A structural change to a table, delivered to subscribers after the
/// mutation has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    ColumnAdded { index: usize, name: String },
    ColumnRemoved { index: usize, name: String },
    ColumnRenamed { index: usize, old_name: String, new_name: String },
}

/// Maps one table row onto a caller-defined structure.
///
/// Implementations pull each field through the table's variant-checked
/// accessors, so a schema mismatch surfaces as an error instead of a
/// silently wrong value:
///
/// ```
/// use csv_loom::{FromRow, Result, Table};
///
/// struct Person {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for Person {
///     fn from_row(table: &Table, row: usize) -> Result<Self> {
///         Ok(Self {
///             id: table.integer(row, "id")?.unwrap_or_default(),
///             name: table.text(row, "name")?.unwrap_or_default().to_string(),
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(table: &Table, row: usize) -> Result<Self>;
}

/// A typed, in-memory table.
///
/// The table owns its [`MetaData`] and rows and is the only way to mutate
/// either, which keeps two invariants intact: every row has exactly one
/// cell per column, and every present cell value carries the variant its
/// column declares. Row order is insertion order; queries never reorder
/// the table itself.
#[derive(Debug, Default)]
pub struct Table {
    metadata: MetaData,
    rows: Vec<Row>,
    listeners: Vec<Sender<TableEvent>>,
}

impl Table {
    /// Create an empty table with default parse settings.
    pub fn new() -> Self {
        Self {
            metadata: MetaData::new(),
            rows: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub(crate) fn assemble(metadata: MetaData, rows: Vec<Row>) -> Self {
        Self {
            metadata,
            rows,
            listeners: Vec::new(),
        }
    }

    /// Column layout and table-wide parse settings.
    #[inline]
    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    /// Mutable access to parse settings (separator, quote, charset).
    ///
    /// Structural changes still go through the table itself; the column
    /// set cannot be modified through this handle.
    #[inline]
    pub fn metadata_mut(&mut self) -> &mut MetaData {
        &mut self.metadata
    }

    /// All rows in insertion order.
    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at the given position.
    pub fn row(&self, index: usize) -> Result<&Row> {
        self.rows.get(index).ok_or(TableError::RowOutOfBounds(index))
    }

    /// Register a subscriber for structural change events.
    ///
    /// Events are delivered through a channel after each mutation commits.
    /// Dropping the receiver unsubscribes; the dead sender is pruned on
    /// the next event.
    pub fn subscribe(&mut self) -> Receiver<TableEvent> {
        let (sender, receiver) = mpsc::channel();
        self.listeners.push(sender);
        receiver
    }

    fn emit(&mut self, event: TableEvent) {
        self.listeners.retain(|listener| listener.send(event.clone()).is_ok());
    }

    /// Append a column; every existing row gains a null cell for it.
    pub fn add_column(&mut self, column: Column) -> Result<usize> {
        let name = column.name().to_string();
        let index = self.metadata.add_column(column)?;
        for row in &mut self.rows {
            row.push_cell();
        }
        self.emit(TableEvent::ColumnAdded { index, name });
        Ok(index)
    }

    /// Remove the column at the given position; every row loses that cell.
    pub fn remove_column(&mut self, index: usize) -> Result<Column> {
        let column = self.metadata.remove_column(index)?;
        for row in &mut self.rows {
            row.remove_cell(index);
        }
        self.emit(TableEvent::ColumnRemoved {
            index,
            name: column.name().to_string(),
        });
        Ok(column)
    }

    /// Rename the column at the given position. Variant and position are
    /// unchanged.
    pub fn rename_column(&mut self, index: usize, name: &str) -> Result<()> {
        let old_name = self.metadata.rename_column(index, name)?;
        self.emit(TableEvent::ColumnRenamed {
            index,
            old_name,
            new_name: name.to_string(),
        });
        Ok(())
    }

    /// Append a row of nulls and return its position.
    pub fn push_empty_row(&mut self) -> usize {
        self.rows.push(Row::new(vec![None; self.metadata.len()]));
        self.rows.len() - 1
    }

    /// Append a row from pre-typed cells and return its position.
    ///
    /// A shorter row is padded with nulls; a row with more cells than
    /// columns is rejected. Every present value must carry its column's
    /// variant.
    pub fn push_row(&mut self, mut cells: Vec<Option<Value>>) -> Result<usize> {
        let width = self.metadata.len();
        if cells.len() > width {
            return Err(TableError::ColumnOutOfBounds(width));
        }
        for (index, cell) in cells.iter().enumerate() {
            if let Some(value) = cell {
                self.check_kind(index, value)?;
            }
        }
        cells.resize(width, None);
        self.rows.push(Row::new(cells));
        Ok(self.rows.len() - 1)
    }

    /// Remove and return the row at the given position.
    pub fn remove_row(&mut self, index: usize) -> Result<Row> {
        if index >= self.rows.len() {
            return Err(TableError::RowOutOfBounds(index));
        }
        Ok(self.rows.remove(index))
    }

    /// Drop all rows, keeping the column layout.
    pub fn clear_rows(&mut self) {
        self.rows.clear();
    }

    /// Parse raw text through the column's parser and store the result.
    /// Empty text stores a null.
    pub fn set_text(&mut self, row: usize, column: &str, text: &str) -> Result<()> {
        let index = self.metadata.column_index(column)?;
        if row >= self.rows.len() {
            return Err(TableError::RowOutOfBounds(row));
        }
        let value = if text.is_empty() {
            None
        } else {
            Some(self.metadata.column(index)?.parse(text)?)
        };
        self.rows[row].set(index, value);
        Ok(())
    }

    /// Store an already-typed value; its variant must match the column's.
    pub fn set_value(&mut self, row: usize, column: &str, value: Value) -> Result<()> {
        let index = self.metadata.column_index(column)?;
        if row >= self.rows.len() {
            return Err(TableError::RowOutOfBounds(row));
        }
        self.check_kind(index, &value)?;
        self.rows[row].set(index, Some(value));
        Ok(())
    }

    /// Clear the cell at the given row and column.
    pub fn set_null(&mut self, row: usize, column: &str) -> Result<()> {
        let index = self.metadata.column_index(column)?;
        if row >= self.rows.len() {
            return Err(TableError::RowOutOfBounds(row));
        }
        self.rows[row].set(index, None);
        Ok(())
    }

    /// The cell at the given row and column, or `None` when null.
    pub fn cell(&self, row: usize, column: &str) -> Result<Option<&Value>> {
        let index = self.metadata.column_index(column)?;
        let row = self.row(row)?;
        Ok(row.get(index))
    }

    fn check_kind(&self, index: usize, value: &Value) -> Result<()> {
        let column = self.metadata.column(index)?;
        if value.kind() != column.kind() {
            return Err(TableError::KindMismatch {
                column: column.name().to_string(),
                expected: column.kind(),
                found: value.kind(),
            });
        }
        Ok(())
    }

    fn checked_cell(&self, row: usize, column: &str, expected: DataKind) -> Result<Option<&Value>> {
        let index = self.metadata.column_index(column)?;
        let found = self.metadata.column(index)?.kind();
        if found != expected {
            return Err(TableError::KindMismatch {
                column: column.to_string(),
                expected,
                found,
            });
        }
        let row = self.row(row)?;
        Ok(row.get(index))
    }

    /// The text cell at the given row and column. Fails when the column
    /// is not a text column.
    pub fn text(&self, row: usize, column: &str) -> Result<Option<&str>> {
        Ok(self.checked_cell(row, column, DataKind::Text)?.and_then(Value::as_text))
    }

    /// The integer cell at the given row and column.
    pub fn integer(&self, row: usize, column: &str) -> Result<Option<i64>> {
        Ok(self.checked_cell(row, column, DataKind::Integer)?.and_then(Value::as_integer))
    }

    /// The single-precision float cell at the given row and column.
    pub fn float(&self, row: usize, column: &str) -> Result<Option<f32>> {
        Ok(self.checked_cell(row, column, DataKind::Float)?.and_then(Value::as_float))
    }

    /// The double-precision float cell at the given row and column.
    pub fn double(&self, row: usize, column: &str) -> Result<Option<f64>> {
        Ok(self.checked_cell(row, column, DataKind::Double)?.and_then(Value::as_double))
    }

    /// The arbitrary-precision decimal cell at the given row and column.
    pub fn decimal(&self, row: usize, column: &str) -> Result<Option<&BigDecimal>> {
        Ok(self.checked_cell(row, column, DataKind::Decimal)?.and_then(Value::as_decimal))
    }

    /// The boolean cell at the given row and column.
    pub fn boolean(&self, row: usize, column: &str) -> Result<Option<bool>> {
        Ok(self.checked_cell(row, column, DataKind::Boolean)?.and_then(Value::as_boolean))
    }

    /// The date cell at the given row and column.
    pub fn date(&self, row: usize, column: &str) -> Result<Option<NaiveDate>> {
        Ok(self.checked_cell(row, column, DataKind::Date)?.and_then(Value::as_date))
    }

    /// The URL cell at the given row and column.
    pub fn url(&self, row: usize, column: &str) -> Result<Option<&Url>> {
        Ok(self.checked_cell(row, column, DataKind::Url)?.and_then(Value::as_url))
    }

    /// The byte-array cell at the given row and column.
    pub fn bytes(&self, row: usize, column: &str) -> Result<Option<&[u8]>> {
        Ok(self.checked_cell(row, column, DataKind::Bytes)?.and_then(Value::as_bytes))
    }

    /// Start building a query over this table's rows.
    pub fn query(&self) -> Query<'_> {
        Query::new(self)
    }

    /// Count occurrences of each distinct (or faceted) value in a column.
    pub fn frequency(&self, column: &str, facet: Facet) -> Result<FrequencyDistribution> {
        FrequencyDistribution::build(self, column, facet)
    }

    /// Bucket a numeric or date column into equal-width ranges.
    pub fn ranges(&self, column: &str, buckets: usize) -> Result<RangeDistribution> {
        RangeDistribution::build(self, column, buckets)
    }

    /// Map every row onto `T` through its [`FromRow`] implementation.
    pub fn rows_as<T: FromRow>(&self) -> Result<Vec<T>> {
        (0..self.rows.len()).map(|row| T::from_row(self, row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Table {
        let mut table = Table::new();
        table.add_column(Column::new("id", DataKind::Integer)).unwrap();
        table.add_column(Column::new("name", DataKind::Text)).unwrap();
        table
            .push_row(vec![
                Some(Value::Integer(1)),
                Some(Value::Text("Bill".into())),
            ])
            .unwrap();
        table
            .push_row(vec![
                Some(Value::Integer(2)),
                Some(Value::Text("O'Hare, Jr".into())),
            ])
            .unwrap();
        table
    }

    #[test]
    fn test_typed_accessors_check_the_variant() {
        let table = people();
        assert_eq!(table.integer(0, "id").unwrap(), Some(1));
        assert_eq!(table.text(1, "name").unwrap(), Some("O'Hare, Jr"));
        assert_eq!(table.text(1, "NAME").unwrap(), Some("O'Hare, Jr"));

        // Reading an integer column through the text accessor is a
        // structural error, not a cast.
        assert!(matches!(
            table.text(0, "id"),
            Err(TableError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_set_text_parses_and_empty_clears() {
        let mut table = people();
        table.set_text(0, "id", "42").unwrap();
        assert_eq!(table.integer(0, "id").unwrap(), Some(42));

        table.set_text(0, "id", "").unwrap();
        assert_eq!(table.integer(0, "id").unwrap(), None);

        assert!(matches!(
            table.set_text(0, "id", "not a number"),
            Err(TableError::Format { .. })
        ));
    }

    #[test]
    fn test_set_value_rejects_wrong_variant() {
        let mut table = people();
        let result = table.set_value(0, "id", Value::Text("nope".into()));
        assert!(matches!(result, Err(TableError::KindMismatch { .. })));
    }

    #[test]
    fn test_push_row_pads_and_validates() {
        let mut table = people();
        let index = table.push_row(vec![Some(Value::Integer(3))]).unwrap();
        assert_eq!(table.integer(index, "id").unwrap(), Some(3));
        assert_eq!(table.text(index, "name").unwrap(), None);

        let too_wide = table.push_row(vec![None, None, None]);
        assert!(matches!(too_wide, Err(TableError::ColumnOutOfBounds(_))));
    }

    #[test]
    fn test_remove_column_drops_cells() {
        let mut table = people();
        table.remove_column(0).unwrap();
        assert_eq!(table.metadata().len(), 1);
        assert_eq!(table.rows()[0].len(), 1);
        assert_eq!(table.text(0, "name").unwrap(), Some("Bill"));
        assert!(table.integer(0, "id").is_err());
    }

    #[test]
    fn test_structural_events_fire_after_commit() {
        let mut table = Table::new();
        let events = table.subscribe();

        table.add_column(Column::new("a", DataKind::Text)).unwrap();
        table.rename_column(0, "b").unwrap();
        table.remove_column(0).unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            TableEvent::ColumnAdded { index: 0, name: "a".into() }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            TableEvent::ColumnRenamed {
                index: 0,
                old_name: "a".into(),
                new_name: "b".into()
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            TableEvent::ColumnRemoved { index: 0, name: "b".into() }
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut table = Table::new();
        let events = table.subscribe();
        drop(events);

        table.add_column(Column::new("a", DataKind::Text)).unwrap();
        assert!(table.listeners.is_empty());
    }

    #[test]
    fn test_rows_as_maps_through_accessors() {
        struct Person {
            id: i64,
            name: String,
        }

        impl FromRow for Person {
            fn from_row(table: &Table, row: usize) -> Result<Self> {
                Ok(Self {
                    id: table.integer(row, "id")?.unwrap_or_default(),
                    name: table.text(row, "name")?.unwrap_or_default().to_string(),
                })
            }
        }

        let table = people();
        let mapped = table.rows_as::<Person>().unwrap();
        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped[0].id, 1);
        assert_eq!(mapped[1].name, "O'Hare, Jr");
    }
}
