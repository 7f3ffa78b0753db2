//! A single record: one optional value per column position.

use crate::value::Value;

/// One row of a table.
///
/// Cells are held per column position; a `None` cell is a null. The row
/// itself does not know the column layout, so it is always read and
/// mutated through the owning [`Table`](crate::Table), which keeps cell
/// count and column count in step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<Option<Value>>,
}

impl Row {
    pub(crate) fn new(cells: Vec<Option<Value>>) -> Self {
        Self { cells }
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell at the given position, or `None` when the cell is null or
    /// the position is out of range.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    /// Returns true if the cell at the given position holds no value.
    pub fn is_null(&self, index: usize) -> bool {
        self.get(index).is_none()
    }

    /// All cells in positional order.
    pub fn cells(&self) -> &[Option<Value>] {
        &self.cells
    }

    pub(crate) fn set(&mut self, index: usize, value: Option<Value>) {
        self.cells[index] = value;
    }

    pub(crate) fn push_cell(&mut self) {
        self.cells.push(None);
    }

    pub(crate) fn remove_cell(&mut self, index: usize) -> Option<Value> {
        self.cells.remove(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_null() {
        let row = Row::new(vec![Some(Value::Integer(7)), None]);
        assert_eq!(row.get(0), Some(&Value::Integer(7)));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(9), None);
        assert!(!row.is_null(0));
        assert!(row.is_null(1));
    }

    #[test]
    fn test_push_and_remove_shift_cells() {
        let mut row = Row::new(vec![Some(Value::Integer(1)), Some(Value::Integer(2))]);
        row.push_cell();
        assert_eq!(row.len(), 3);
        assert!(row.is_null(2));
        assert_eq!(row.remove_cell(0), Some(Value::Integer(1)));
        assert_eq!(row.get(0), Some(&Value::Integer(2)));
    }
}
