use serde::{Deserialize, Serialize};

/// One non-missing cell of a table, addressed by row, Y column and subcolumn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub row_index: usize,
    pub row_label: String,
    pub y_column: String,
    pub subcolumn: String,
    pub value: f64,
}
