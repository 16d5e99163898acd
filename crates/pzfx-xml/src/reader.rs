//! `.pzfx` reader.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use pzfx_model::{Cell, Document, Subcolumn, Table, TableKind, YColumn};
use tracing::{debug, info};

use crate::error::{PzfxError, Result};
use crate::options::ReaderOptions;
use crate::schema::{
    ATTR_ID, ATTR_TABLE_TYPE, DATUM, HUGE_TABLE, REF, ROOT, ROW_TITLES_COLUMN, SUB_COLUMN_TITLES,
    SUBCOLUMN, TABLE, TABLE_SEQUENCE, TITLE, TableType, Y_ADVANCED_COLUMN, Y_COLUMN,
};
use crate::tree::{self, Element};

/// `.pzfx` reader over any byte source.
pub struct PzfxReader<R: Read> {
    reader: BufReader<R>,
    options: ReaderOptions,
}

impl<R: Read> PzfxReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            options: ReaderOptions::default(),
        }
    }

    pub fn with_options(reader: R, options: ReaderOptions) -> Self {
        Self {
            reader: BufReader::new(reader),
            options,
        }
    }

    /// Read the whole source and decode it.
    pub fn read_document(mut self) -> Result<Document> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        decode(&data, &self.options)
    }
}

impl PzfxReader<File> {
    /// Open a `.pzfx` file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_options(path, ReaderOptions::default())
    }

    /// Open a `.pzfx` file with options.
    pub fn open_with_options(path: &Path, options: ReaderOptions) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PzfxError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                PzfxError::Io(e)
            }
        })?;
        Ok(Self::with_options(file, options))
    }
}

/// Load a document from `path`.
pub fn load(path: &Path) -> Result<Document> {
    load_with_options(path, &ReaderOptions::default())
}

/// Load a document with explicit reader options.
pub fn load_with_options(path: &Path, options: &ReaderOptions) -> Result<Document> {
    let document = PzfxReader::open_with_options(path, options.clone())?.read_document()?;
    info!(
        path = %path.display(),
        tables = document.len(),
        "loaded pzfx document"
    );
    Ok(document)
}

/// Decode `.pzfx` bytes.
///
/// Tables come back in `TableSequence` order. Elements the decoder does not
/// know are skipped.
pub fn decode(bytes: &[u8], options: &ReaderOptions) -> Result<Document> {
    let root = tree::parse(bytes)?;
    if root.name != ROOT {
        return Err(PzfxError::invalid_format(format!(
            "expected root element <{ROOT}>, found <{}>",
            root.name
        )));
    }
    let sequence = root
        .child(TABLE_SEQUENCE)
        .ok_or_else(|| PzfxError::missing_element(ROOT, TABLE_SEQUENCE))?;

    let mut tables: Vec<(&str, &Element)> = Vec::new();
    for element in root
        .children
        .iter()
        .filter(|child| child.name == TABLE || child.name == HUGE_TABLE)
    {
        let id = element
            .attribute(ATTR_ID)
            .ok_or_else(|| PzfxError::missing_attribute(element.name.as_str(), ATTR_ID))?;
        if tables.iter().any(|(seen, _)| *seen == id) {
            return Err(PzfxError::invalid_format(format!(
                "table ID '{id}' is used twice"
            )));
        }
        tables.push((id, element));
    }

    let mut document = Document::new();
    let mut listed = HashSet::new();
    for reference in sequence.children_named(REF) {
        let id = reference
            .attribute(ATTR_ID)
            .ok_or_else(|| PzfxError::missing_attribute(REF, ATTR_ID))?;
        if !listed.insert(id) {
            return Err(PzfxError::invalid_format(format!(
                "table '{id}' is listed twice in {TABLE_SEQUENCE}"
            )));
        }
        let element = tables
            .iter()
            .find(|(table_id, _)| *table_id == id)
            .map(|(_, element)| *element)
            .ok_or_else(|| {
                PzfxError::invalid_format(format!("{TABLE_SEQUENCE} refers to unknown table '{id}'"))
            })?;
        let table = decode_table(element, id, options)?;
        if document.contains(&table.name) {
            return Err(PzfxError::invalid_format(format!(
                "duplicate table name '{}'",
                table.name
            )));
        }
        document.insert(table, false)?;
    }

    for (id, _) in tables.iter().filter(|(id, _)| !listed.contains(id)) {
        if options.strict {
            return Err(PzfxError::invalid_format(format!(
                "table '{id}' is not listed in {TABLE_SEQUENCE}"
            )));
        }
        debug!(id, "skipping table not listed in sequence");
    }

    debug!(tables = document.len(), "decoded pzfx document");
    Ok(document)
}

fn decode_table(element: &Element, id: &str, options: &ReaderOptions) -> Result<Table> {
    let name = element
        .child(TITLE)
        .ok_or_else(|| PzfxError::missing_element(format!("{} {id}", element.name), TITLE))?
        .text_content();

    let table_type = match element.attribute(ATTR_TABLE_TYPE) {
        Some(value) => match TableType::parse(value) {
            Some(parsed) => parsed,
            None if options.strict => {
                return Err(PzfxError::invalid_format(format!(
                    "table '{name}' has unsupported TableType '{value}'"
                )));
            }
            None => {
                debug!(table = %name, table_type = value, "reading unsupported table type as grouped");
                TableType::TwoWay
            }
        },
        None if options.strict => {
            return Err(PzfxError::missing_attribute(
                element.name.as_str(),
                ATTR_TABLE_TYPE,
            ));
        }
        None => TableType::TwoWay,
    };

    let y_elements: Vec<&Element> = element
        .children
        .iter()
        .filter(|child| child.name == Y_COLUMN || child.name == Y_ADVANCED_COLUMN)
        .collect();
    if y_elements.is_empty() {
        return Err(PzfxError::missing_element(
            format!("{} {id}", element.name),
            Y_COLUMN,
        ));
    }

    let mut has_sub_titles = false;
    let mut y_columns = Vec::with_capacity(y_elements.len());
    for y in y_elements {
        let title = y.child(TITLE).map(Element::text_content).unwrap_or_default();
        let sub_titles = match y.child(SUB_COLUMN_TITLES) {
            Some(titles) => {
                has_sub_titles = true;
                titles
                    .child(SUBCOLUMN)
                    .map(|sub| sub.children_named(DATUM).map(Element::text_content).collect())
                    .unwrap_or_default()
            }
            None => Vec::new(),
        };
        let mut subcolumns = Vec::new();
        for (idx, sub) in y.children_named(SUBCOLUMN).enumerate() {
            let values = sub
                .children_named(DATUM)
                .map(|datum| parse_cell(&name, datum))
                .collect::<Result<Vec<Cell>>>()?;
            let sub_title = sub_titles.get(idx).cloned().unwrap_or_default();
            subcolumns.push(Subcolumn::new(sub_title, values));
        }
        y_columns.push(YColumn::new(title, subcolumns));
    }

    let row_labels: Vec<String> = element
        .child(ROW_TITLES_COLUMN)
        .and_then(|rows| rows.child(SUBCOLUMN))
        .map(|sub| sub.children_named(DATUM).map(Element::text_content).collect())
        .unwrap_or_default();

    // Only subcolumn tables may hold replicates, whatever the declared type.
    let replicates =
        has_sub_titles || y_columns.iter().any(|column| column.subcolumns.len() > 1);
    let kind = match table_type {
        _ if replicates => TableKind::GroupedBySubcolumns,
        TableType::OneWay => TableKind::Simple,
        TableType::TwoWay => TableKind::GroupedByColumn,
    };

    let mut table = Table::new(name, kind);
    table.row_labels = row_labels;
    table.y_columns = y_columns;
    pad(&mut table);
    table.validate()?;
    debug!(
        table = %table.name,
        id,
        kind = %table.kind,
        rows = table.row_count(),
        y_columns = table.y_columns.len(),
        "decoded table"
    );
    Ok(table)
}

fn parse_cell(table: &str, datum: &Element) -> Result<Cell> {
    let text = datum.text_content();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Cell::NoValue);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Cell::Number(value)),
        _ => Err(PzfxError::InvalidNumber {
            table: table.to_string(),
            value: trimmed.to_string(),
        }),
    }
}

/// Bring a decoded table to a rectangular shape.
///
/// Every Y column gets the same number of subcolumns (at least one), and
/// labels and cells are padded to the longest column.
fn pad(table: &mut Table) {
    let subcolumns = table
        .y_columns
        .iter()
        .map(|column| column.subcolumns.len())
        .max()
        .unwrap_or(0)
        .max(1);
    for column in &mut table.y_columns {
        while column.subcolumns.len() < subcolumns {
            column.subcolumns.push(Subcolumn::new("", Vec::new()));
        }
    }

    let rows = table
        .y_columns
        .iter()
        .flat_map(|column| column.subcolumns.iter().map(|sub| sub.values.len()))
        .chain(std::iter::once(table.row_labels.len()))
        .max()
        .unwrap_or(0);
    table.row_labels.resize(rows, String::new());
    for column in &mut table.y_columns {
        for sub in &mut column.subcolumns {
            sub.values.resize(rows, Cell::NoValue);
        }
    }
}
