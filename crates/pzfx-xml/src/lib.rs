//! GraphPad Prism `.pzfx` reader and writer.
//!
//! Encodes a [`Document`](pzfx_model::Document) as Prism XML and decodes it
//! back. Table and info IDs are allocated per encode call, so encoding the
//! same document twice yields identical bytes.
//!
//! # Example
//!
//! ```
//! use pzfx_model::{Cell, Document, Subcolumn, Table, TableKind, YColumn};
//! use pzfx_xml::{ReaderOptions, WriterOptions, decode, encode};
//!
//! let mut table = Table::new("Data 1", TableKind::GroupedByColumn);
//! table.row_labels = vec!["day 1".to_string(), "day 2".to_string()];
//! table.y_columns = vec![YColumn::new(
//!     "Control",
//!     vec![Subcolumn::new("", vec![Cell::from(1.5), Cell::NoValue])],
//! )];
//! let mut doc = Document::new();
//! doc.insert(table, false).unwrap();
//!
//! let bytes = encode(&doc, &WriterOptions::default()).unwrap();
//! let back = decode(&bytes, &ReaderOptions::default()).unwrap();
//! assert_eq!(back, doc);
//! ```

mod error;
mod options;
mod reader;
pub mod schema;
mod tree;
mod writer;

pub use error::{PzfxError, Result};
pub use options::{ReaderOptions, WriterOptions};
pub use reader::{PzfxReader, decode, load, load_with_options};
pub use writer::{PzfxWriter, encode, save, save_with_options};
