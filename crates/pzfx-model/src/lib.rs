//! In-memory model of a GraphPad Prism project.
//!
//! - [`Document`]: ordered, uniquely named [`Table`]s
//! - [`Table`] → [`YColumn`] → [`Subcolumn`] → [`Cell`]
//! - [`SourceTable`]: flat, column-typed input for the layout engine
//! - [`FlatRecord`]: one cell of a table in flattened form

pub mod cell;
pub mod document;
pub mod error;
pub mod numeric;
pub mod record;
pub mod source;
pub mod table;

pub use cell::Cell;
pub use document::Document;
pub use error::{ModelError, Result};
pub use numeric::{format_fixed, format_numeric, fraction_digits, parse_f64};
pub use record::FlatRecord;
pub use source::{ColumnData, ColumnKind, SourceColumn, SourceTable};
pub use table::{Subcolumn, Table, TableKind, YColumn};
