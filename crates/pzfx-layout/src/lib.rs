//! Table-layout engine for Prism documents.
//!
//! Turns a flat [`SourceTable`](pzfx_model::SourceTable) plus a
//! [`GroupingSpec`] into a grouped [`Table`](pzfx_model::Table), and flattens
//! tables back into [`FlatRecord`](pzfx_model::FlatRecord)s.
//!
//! # Example
//!
//! ```
//! use pzfx_layout::{GroupingSpec, build_table, table_to_rows};
//! use pzfx_model::{Document, SourceColumn, SourceTable};
//!
//! let source = SourceTable::new(vec![
//!     SourceColumn::categorical("grp", vec![Some("A".into()), Some("A".into()), Some("B".into())]),
//!     SourceColumn::numeric("val", vec![Some(1.0), Some(2.0), Some(3.0)]),
//! ])
//! .unwrap();
//! let spec = GroupingSpec::new()
//!     .with_main_group("grp")
//!     .with_data_columns(["val"]);
//!
//! let mut doc = Document::new();
//! let warnings = build_table(&mut doc, "Data 1", &source, &spec, false).unwrap();
//! assert!(warnings.is_empty());
//!
//! let table = doc.table("Data 1").unwrap();
//! assert_eq!(table.y_columns.len(), 2);
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table_to_rows(&doc, "Data 1").unwrap().len(), 3);
//! ```

mod build;
mod error;
mod flatten;
mod ops;
mod spec;

pub use build::{Layout, layout_table};
pub use error::{LayoutError, LayoutWarning, Result};
pub use flatten::flatten_table;
pub use ops::{build_table, build_table_with_options, table_to_rows};
pub use spec::{GroupingSpec, LayoutOptions};
