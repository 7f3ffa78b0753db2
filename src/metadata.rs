//! Ordered column collection plus table-wide parse settings.

use foldhash::{HashMap, HashMapExt};

use crate::column::Column;
use crate::encoding::Charset;
use crate::error::{Result, TableError};

/// The ordered set of columns for one table, with the settings the table
/// was (or will be) parsed with.
///
/// Column positions are contiguous from 0 and insertion order is display
/// order. Name lookups are case-insensitive and fail loudly when absent.
/// Mutations go through the owning [`Table`](crate::Table) so structural
/// change events fire; this type only exposes the read surface publicly.
#[derive(Debug, Clone)]
pub struct MetaData {
    columns: Vec<Column>,
    /// Lowercased name -> position.
    by_name: HashMap<String, usize>,
    /// Field separator character.
    pub separator: char,
    /// Quote character.
    pub quote: char,
    /// Character encoding of the byte source.
    pub charset: Charset,
}

impl Default for MetaData {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaData {
    /// Create an empty column set with default settings (comma separator,
    /// double-quote, UTF-8).
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            by_name: HashMap::new(),
            separator: ',',
            quote: '"',
            charset: Charset::Utf8,
        }
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All columns in positional order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The column at the given position.
    pub fn column(&self, index: usize) -> Result<&Column> {
        self.columns
            .get(index)
            .ok_or(TableError::ColumnOutOfBounds(index))
    }

    /// Case-insensitive position lookup by name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    /// Returns true if a column with the given name exists
    /// (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_lowercase())
    }

    /// Append a column at the next position.
    pub(crate) fn add_column(&mut self, column: Column) -> Result<usize> {
        let key = column.name().to_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(TableError::DuplicateColumn(column.name().to_string()));
        }
        let index = self.columns.len();
        self.by_name.insert(key, index);
        self.columns.push(column);
        Ok(index)
    }

    /// Remove the column at the given position, shifting subsequent
    /// positions down by one.
    pub(crate) fn remove_column(&mut self, index: usize) -> Result<Column> {
        if index >= self.columns.len() {
            return Err(TableError::ColumnOutOfBounds(index));
        }
        let column = self.columns.remove(index);
        self.rebuild_index();
        Ok(column)
    }

    /// Rename the column at the given position; the new name must not
    /// collide case-insensitively with any other column.
    pub(crate) fn rename_column(&mut self, index: usize, name: &str) -> Result<String> {
        if index >= self.columns.len() {
            return Err(TableError::ColumnOutOfBounds(index));
        }
        let key = name.to_lowercase();
        if let Some(&existing) = self.by_name.get(&key)
            && existing != index
        {
            return Err(TableError::DuplicateColumn(name.to_string()));
        }

        let old = self.columns[index].name().to_string();
        self.by_name.remove(&old.to_lowercase());
        self.by_name.insert(key, index);
        self.columns[index].rename(name.to_string());
        Ok(old)
    }

    fn rebuild_index(&mut self) {
        self.by_name.clear();
        for (index, column) in self.columns.iter().enumerate() {
            self.by_name.insert(column.name().to_lowercase(), index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DataKind;

    #[test]
    fn test_case_insensitive_lookup() {
        let mut metadata = MetaData::new();
        metadata
            .add_column(Column::new("Name", DataKind::Text))
            .unwrap();

        assert_eq!(metadata.column_index("name").unwrap(), 0);
        assert_eq!(metadata.column_index("NAME").unwrap(), 0);
        assert!(matches!(
            metadata.column_index("missing"),
            Err(TableError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut metadata = MetaData::new();
        metadata
            .add_column(Column::new("id", DataKind::Integer))
            .unwrap();

        let result = metadata.add_column(Column::new("ID", DataKind::Text));
        assert!(matches!(result, Err(TableError::DuplicateColumn(_))));
    }

    #[test]
    fn test_remove_shifts_positions() {
        let mut metadata = MetaData::new();
        for name in ["a", "b", "c"] {
            metadata.add_column(Column::new(name, DataKind::Text)).unwrap();
        }

        let removed = metadata.remove_column(1).unwrap();
        assert_eq!(removed.name(), "b");
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.column_index("c").unwrap(), 1);
    }

    #[test]
    fn test_rename_keeps_position_and_checks_collisions() {
        let mut metadata = MetaData::new();
        metadata.add_column(Column::new("a", DataKind::Text)).unwrap();
        metadata.add_column(Column::new("b", DataKind::Text)).unwrap();

        let old = metadata.rename_column(0, "first").unwrap();
        assert_eq!(old, "a");
        assert_eq!(metadata.column_index("first").unwrap(), 0);
        assert!(!metadata.contains("a"));

        assert!(matches!(
            metadata.rename_column(0, "B"),
            Err(TableError::DuplicateColumn(_))
        ));
        // Renaming to a different casing of itself is allowed.
        assert!(metadata.rename_column(1, "B").is_ok());
    }
}
