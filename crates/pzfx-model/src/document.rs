//! Ordered collection of named tables.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::table::Table;

/// A Prism project: tables in insertion order, names unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    tables: Vec<Table>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Table names in document order.
    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|table| table.name.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Look up a table, failing with `TableNotFound`.
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.get(name).ok_or_else(|| ModelError::TableNotFound {
            name: name.to_string(),
        })
    }

    /// Add a table.
    ///
    /// With `overwrite` an existing table of the same name is replaced in
    /// place and returned; without it the insert fails with `NamingConflict`.
    pub fn insert(&mut self, table: Table, overwrite: bool) -> Result<Option<Table>> {
        if table.name.trim().is_empty() {
            return Err(ModelError::InvalidTableName);
        }
        match self.position(&table.name) {
            Some(idx) if overwrite => Ok(Some(std::mem::replace(&mut self.tables[idx], table))),
            Some(_) => Err(ModelError::NamingConflict { name: table.name }),
            None => {
                self.tables.push(table);
                Ok(None)
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Table> {
        self.position(name).map(|idx| self.tables.remove(idx))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|table| table.name == name)
    }
}

impl IntoIterator for Document {
    type Item = Table;
    type IntoIter = std::vec::IntoIter<Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableKind;

    #[test]
    fn keeps_insertion_order() {
        let mut doc = Document::new();
        doc.insert(Table::new("b", TableKind::Simple), false).unwrap();
        doc.insert(Table::new("a", TableKind::Simple), false).unwrap();
        assert_eq!(doc.table_names(), vec!["b", "a"]);
    }

    #[test]
    fn duplicate_without_overwrite_conflicts() {
        let mut doc = Document::new();
        doc.insert(Table::new("t", TableKind::Simple), false).unwrap();
        let err = doc
            .insert(Table::new("t", TableKind::GroupedByColumn), false)
            .unwrap_err();
        assert!(matches!(err, ModelError::NamingConflict { ref name } if name == "t"));
        assert_eq!(doc.table("t").unwrap().kind, TableKind::Simple);
    }

    #[test]
    fn overwrite_replaces_in_place() {
        let mut doc = Document::new();
        doc.insert(Table::new("first", TableKind::Simple), false).unwrap();
        doc.insert(Table::new("second", TableKind::Simple), false).unwrap();
        let old = doc
            .insert(Table::new("first", TableKind::GroupedByColumn), true)
            .unwrap();
        assert_eq!(old.map(|t| t.kind), Some(TableKind::Simple));
        assert_eq!(doc.table_names(), vec!["first", "second"]);
        assert_eq!(doc.table("first").unwrap().kind, TableKind::GroupedByColumn);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut doc = Document::new();
        let err = doc.insert(Table::new("  ", TableKind::Simple), true).unwrap_err();
        assert!(matches!(err, ModelError::InvalidTableName));
    }

    #[test]
    fn missing_table_lookup_fails() {
        let doc = Document::new();
        assert!(matches!(
            doc.table("nope"),
            Err(ModelError::TableNotFound { .. })
        ));
    }
}
