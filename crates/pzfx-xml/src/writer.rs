//! `.pzfx` writer.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pzfx_model::{Cell, Document, Table, TableKind, format_fixed, format_numeric, fraction_digits};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::{debug, info};

use crate::error::{PzfxError, Result};
use crate::options::WriterOptions;
use crate::schema::{
    CREATED, DATUM, INFO, INFO_SEQUENCE, IdAllocator, MAX_DECIMALS, NOTES, ORIGINAL_VERSION,
    PRISM_XML_VERSION, REF, ROOT, ROW_TITLES_COLUMN, ROW_TITLES_WIDTH, SUB_COLUMN_TITLES,
    SUBCOLUMN, TABLE, TABLE_SEQUENCE, TITLE, TableType, Y_COLUMN, Y_COLUMN_WIDTH,
};

/// `.pzfx` writer over any byte sink.
pub struct PzfxWriter<W: Write> {
    writer: BufWriter<W>,
    options: WriterOptions,
}

impl<W: Write> PzfxWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options: WriterOptions::default(),
        }
    }

    pub fn with_options(writer: W, options: WriterOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Encode the whole document and write it out.
    ///
    /// Nothing reaches the sink unless encoding succeeds.
    pub fn write_document(mut self, document: &Document) -> Result<()> {
        let bytes = encode(document, &self.options)?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Save a document to `path`, replacing any existing file.
pub fn save(document: &Document, path: &Path) -> Result<()> {
    save_with_options(document, path, &WriterOptions::default())
}

/// Save a document with explicit writer options.
///
/// The bytes go to a temp file beside `path` which is then renamed over it,
/// so an existing file is either fully replaced or left untouched.
pub fn save_with_options(document: &Document, path: &Path, options: &WriterOptions) -> Result<()> {
    let bytes = encode(document, options)?;
    let temp_path = temp_path_for(path);
    if let Err(error) = write_synced(&temp_path, &bytes) {
        let _ = fs::remove_file(&temp_path);
        return Err(error.into());
    }
    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(PzfxError::AtomicWriteFailed {
            temp_path,
            target_path: path.to_path_buf(),
            source,
        });
    }
    info!(
        path = %path.display(),
        tables = document.len(),
        bytes = bytes.len(),
        "saved pzfx document"
    );
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Encode a document to `.pzfx` bytes.
pub fn encode(document: &Document, options: &WriterOptions) -> Result<Vec<u8>> {
    for table in document.tables() {
        table.validate()?;
    }
    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);
    let mut ids = IdAllocator::new();
    write_document(&mut xml, document, options, &mut ids)?;
    let mut bytes = xml.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_document<W: Write>(
    xml: &mut Writer<W>,
    document: &Document,
    options: &WriterOptions,
    ids: &mut IdAllocator,
) -> Result<()> {
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new(ROOT);
    root.push_attribute(("PrismXMLVersion", PRISM_XML_VERSION));
    xml.write_event(Event::Start(root))?;

    xml.write_event(Event::Start(BytesStart::new(CREATED)))?;
    let mut original = BytesStart::new(ORIGINAL_VERSION);
    original.push_attribute(("CreatedByProgram", options.created_by_program.as_str()));
    original.push_attribute(("CreatedByVersion", options.created_by_version.as_str()));
    let stamp = options
        .created_at
        .map(|at| at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
    if let Some(stamp) = &stamp {
        original.push_attribute(("DateTime", stamp.as_str()));
    }
    xml.write_event(Event::Empty(original))?;
    xml.write_event(Event::End(BytesEnd::new(CREATED)))?;

    let info_id = ids.next_info();
    write_sequence(xml, INFO_SEQUENCE, std::slice::from_ref(&info_id))?;
    let mut info = BytesStart::new(INFO);
    info.push_attribute(("ID", info_id.as_str()));
    xml.write_event(Event::Start(info))?;
    write_text_element(xml, TITLE, "Project info 1")?;
    xml.write_event(Event::Empty(BytesStart::new(NOTES)))?;
    xml.write_event(Event::End(BytesEnd::new(INFO)))?;

    let table_ids: Vec<String> = document.tables().iter().map(|_| ids.next_table()).collect();
    write_sequence(xml, TABLE_SEQUENCE, &table_ids)?;
    for (table, id) in document.tables().iter().zip(&table_ids) {
        write_table(xml, table, id, options)?;
    }

    xml.write_event(Event::End(BytesEnd::new(ROOT)))?;
    Ok(())
}

/// A sequence of `Ref`s; the first one is marked selected.
fn write_sequence<W: Write>(xml: &mut Writer<W>, name: &str, ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        xml.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    for (idx, id) in ids.iter().enumerate() {
        let mut reference = BytesStart::new(REF);
        reference.push_attribute(("ID", id.as_str()));
        if idx == 0 {
            reference.push_attribute(("Selected", "1"));
        }
        xml.write_event(Event::Empty(reference))?;
    }
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_table<W: Write>(
    xml: &mut Writer<W>,
    table: &Table,
    id: &str,
    options: &WriterOptions,
) -> Result<()> {
    let replicates = table.subcolumn_count().to_string();
    let mut start = BytesStart::new(TABLE);
    start.push_attribute(("ID", id));
    start.push_attribute(("XFormat", "none"));
    start.push_attribute(("TableType", TableType::from(table.kind).as_str()));
    start.push_attribute(("EVFormat", "AsteriskAfterNumber"));
    start.push_attribute(("YFormat", "replicates"));
    start.push_attribute(("Replicates", replicates.as_str()));
    xml.write_event(Event::Start(start))?;
    write_text_element(xml, TITLE, &table.name)?;

    if table.has_row_labels() {
        let mut rows = BytesStart::new(ROW_TITLES_COLUMN);
        rows.push_attribute(("Width", ROW_TITLES_WIDTH));
        xml.write_event(Event::Start(rows))?;
        write_data(xml, table.row_labels.iter().map(|label| Some(label.as_str())))?;
        xml.write_event(Event::End(BytesEnd::new(ROW_TITLES_COLUMN)))?;
    }

    for column in &table.y_columns {
        let rendered: Vec<Vec<Option<String>>> = column
            .subcolumns
            .iter()
            .map(|sub| sub.values.iter().map(|cell| render(*cell, options)).collect())
            .collect();
        let decimals = rendered
            .iter()
            .flatten()
            .flatten()
            .map(|text| fraction_digits(text))
            .max()
            .unwrap_or(0)
            .min(MAX_DECIMALS)
            .to_string();
        let subcolumns = column.subcolumns.len().to_string();

        let mut start = BytesStart::new(Y_COLUMN);
        start.push_attribute(("Width", Y_COLUMN_WIDTH));
        start.push_attribute(("Decimals", decimals.as_str()));
        start.push_attribute(("Subcolumns", subcolumns.as_str()));
        xml.write_event(Event::Start(start))?;
        write_text_element(xml, TITLE, &column.title)?;

        if table.kind == TableKind::GroupedBySubcolumns {
            let mut titles = BytesStart::new(SUB_COLUMN_TITLES);
            titles.push_attribute(("OwnSet", "1"));
            xml.write_event(Event::Start(titles))?;
            write_data(xml, column.subcolumns.iter().map(|sub| Some(sub.title.as_str())))?;
            xml.write_event(Event::End(BytesEnd::new(SUB_COLUMN_TITLES)))?;
        }

        for values in &rendered {
            write_data(xml, values.iter().map(Option::as_deref))?;
        }
        xml.write_event(Event::End(BytesEnd::new(Y_COLUMN)))?;
    }

    xml.write_event(Event::End(BytesEnd::new(TABLE)))?;
    debug!(table = %table.name, id, kind = %table.kind, "encoded table");
    Ok(())
}

/// One `Subcolumn` of `d` cells; `None` and empty text become `<d/>`.
fn write_data<'a, W, I>(xml: &mut Writer<W>, cells: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = Option<&'a str>>,
{
    xml.write_event(Event::Start(BytesStart::new(SUBCOLUMN)))?;
    for cell in cells {
        match cell {
            Some(text) if !text.is_empty() => write_text_element(xml, DATUM, text)?,
            _ => xml.write_event(Event::Empty(BytesStart::new(DATUM)))?,
        }
    }
    xml.write_event(Event::End(BytesEnd::new(SUBCOLUMN)))?;
    Ok(())
}

fn write_text_element<W: Write>(xml: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn render(cell: Cell, options: &WriterOptions) -> Option<String> {
    match cell {
        Cell::Number(value) if value.is_finite() => Some(match options.decimals {
            Some(decimals) => format_fixed(value, decimals),
            None => format_numeric(value),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pzfx_model::{ModelError, Subcolumn, YColumn};

    use super::*;

    fn grouped() -> Document {
        let mut table = Table::new("Data 1", TableKind::GroupedBySubcolumns);
        table.row_labels = vec!["low".to_string(), "high".to_string()];
        table.y_columns = vec![YColumn::new(
            "A",
            vec![
                Subcolumn::new("r1", vec![Cell::from(1.25), Cell::NoValue]),
                Subcolumn::new("r2", vec![Cell::from(2.0), Cell::from(-3.5)]),
            ],
        )];
        let mut doc = Document::new();
        doc.insert(table, false).unwrap();
        doc
    }

    fn encode_str(doc: &Document, options: &WriterOptions) -> String {
        String::from_utf8(encode(doc, options).unwrap()).unwrap()
    }

    #[test]
    fn writes_prism_structure() {
        let xml = encode_str(&grouped(), &WriterOptions::default());
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<GraphPadPrismFile PrismXMLVersion=\"5.00\">"));
        assert!(xml.contains("<Ref ID=\"Table0\" Selected=\"1\"/>"));
        assert!(xml.contains("TableType=\"TwoWay\""));
        assert!(xml.contains("Replicates=\"2\""));
        assert!(xml.contains("<Title>Data 1</Title>"));
        assert!(xml.contains("<RowTitlesColumn Width=\"81\">"));
        assert!(xml.contains("<SubColumnTitles OwnSet=\"1\">"));
        assert!(xml.contains("Decimals=\"2\""));
        assert!(xml.contains("<d>1.25</d>"));
        assert!(xml.contains("<d>-3.5</d>"));
        assert!(xml.contains("<d/>"));
        assert!(!xml.contains("DateTime="));
    }

    #[test]
    fn repeated_encodes_are_identical() {
        let doc = grouped();
        let options = WriterOptions::default();
        assert_eq!(encode(&doc, &options).unwrap(), encode(&doc, &options).unwrap());
    }

    #[test]
    fn fixed_decimals_round_values() {
        let xml = encode_str(&grouped(), &WriterOptions::new().with_decimals(1));
        assert!(xml.contains("<d>1.2</d>") || xml.contains("<d>1.3</d>"));
        assert!(xml.contains("<d>2</d>"));
    }

    #[test]
    fn unlabeled_simple_table_has_no_row_titles() {
        let mut table = Table::new("plain", TableKind::Simple);
        table.row_labels = vec![String::new()];
        table.y_columns = vec![YColumn::new("x", vec![Subcolumn::new("", vec![Cell::from(0.0)])])];
        let mut doc = Document::new();
        doc.insert(table, false).unwrap();

        let xml = encode_str(&doc, &WriterOptions::default());
        assert!(xml.contains("TableType=\"OneWay\""));
        assert!(!xml.contains("RowTitlesColumn"));
        assert!(!xml.contains("SubColumnTitles"));
        assert!(xml.contains("<d>0</d>"));
    }

    #[test]
    fn ragged_table_is_not_encoded() {
        let mut table = Table::new("bad", TableKind::Simple);
        table.row_labels = vec![String::new(), String::new()];
        table.y_columns = vec![YColumn::new("x", vec![Subcolumn::new("", vec![Cell::from(1.0)])])];
        let mut doc = Document::new();
        doc.insert(table, false).unwrap();
        assert!(encode(&doc, &WriterOptions::default()).is_err());
    }

    #[test]
    fn titled_subcolumn_needs_subcolumn_table() {
        let mut table = Table::new("grouped", TableKind::GroupedByColumn);
        table.row_labels = vec!["r".to_string()];
        table.y_columns = vec![YColumn::new("A", vec![Subcolumn::new("x", vec![Cell::from(1.0)])])];
        let mut doc = Document::new();
        doc.insert(table, false).unwrap();
        let err = encode(&doc, &WriterOptions::default()).unwrap_err();
        assert!(matches!(err, PzfxError::Model(ModelError::KindMismatch { .. })));
    }

    #[test]
    fn created_at_is_written_when_set() {
        let at = chrono::DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let options = WriterOptions::new()
            .with_program("tests", "1.0")
            .with_created_at(at);
        let xml = encode_str(&grouped(), &options);
        assert!(xml.contains("CreatedByProgram=\"tests\""));
        assert!(xml.contains("DateTime=\"2024-05-01T12:00:00Z\""));
    }
}
