//! Element and attribute names of the Prism XML schema.

use pzfx_model::TableKind;

pub const PRISM_XML_VERSION: &str = "5.00";

pub const ROOT: &str = "GraphPadPrismFile";
pub const CREATED: &str = "Created";
pub const ORIGINAL_VERSION: &str = "OriginalVersion";
pub const INFO_SEQUENCE: &str = "InfoSequence";
pub const INFO: &str = "Info";
pub const TABLE_SEQUENCE: &str = "TableSequence";
pub const REF: &str = "Ref";
pub const TABLE: &str = "Table";
pub const HUGE_TABLE: &str = "HugeTable";
pub const TITLE: &str = "Title";
pub const NOTES: &str = "Notes";
pub const ROW_TITLES_COLUMN: &str = "RowTitlesColumn";
pub const Y_COLUMN: &str = "YColumn";
pub const Y_ADVANCED_COLUMN: &str = "YAdvancedColumn";
pub const SUB_COLUMN_TITLES: &str = "SubColumnTitles";
pub const SUBCOLUMN: &str = "Subcolumn";
pub const DATUM: &str = "d";

pub const ATTR_ID: &str = "ID";
pub const ATTR_TABLE_TYPE: &str = "TableType";

pub const ROW_TITLES_WIDTH: &str = "81";
pub const Y_COLUMN_WIDTH: &str = "211";

/// Upper bound for the `Decimals` attribute.
pub const MAX_DECIMALS: usize = 15;

/// The `TableType` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableType {
    OneWay,
    TwoWay,
}

impl TableType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneWay => "OneWay",
            Self::TwoWay => "TwoWay",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OneWay" => Some(Self::OneWay),
            "TwoWay" => Some(Self::TwoWay),
            _ => None,
        }
    }
}

impl From<TableKind> for TableType {
    fn from(kind: TableKind) -> Self {
        if kind.is_grouped() {
            Self::TwoWay
        } else {
            Self::OneWay
        }
    }
}

/// Per-encode identifier allocation.
///
/// Lives for one encode call only, so repeated encodes of the same document
/// produce the same IDs.
#[derive(Debug, Default)]
pub struct IdAllocator {
    tables: usize,
    infos: usize,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_table(&mut self) -> String {
        let id = format!("Table{}", self.tables);
        self.tables += 1;
        id
    }

    pub fn next_info(&mut self) -> String {
        let id = format!("Info{}", self.infos);
        self.infos += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_type_follows_kind() {
        assert_eq!(TableType::from(TableKind::Simple), TableType::OneWay);
        assert_eq!(TableType::from(TableKind::GroupedByColumn), TableType::TwoWay);
        assert_eq!(
            TableType::from(TableKind::GroupedBySubcolumns),
            TableType::TwoWay
        );
        assert_eq!(TableType::parse("TwoWay"), Some(TableType::TwoWay));
        assert_eq!(TableType::parse("XY"), None);
    }

    #[test]
    fn ids_are_sequential_per_allocator() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_table(), "Table0");
        assert_eq!(ids.next_table(), "Table1");
        assert_eq!(ids.next_info(), "Info0");
        assert_eq!(IdAllocator::new().next_table(), "Table0");
    }
}
