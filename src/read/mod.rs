//! Reading delimited byte sources into typed tables.

pub mod infer;
pub mod tokenizer;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::column::Column;
use crate::encoding::{Charset, detect_bom, sniff_charset};
use crate::error::Result;
use crate::metadata::MetaData;
use crate::row::Row;
use crate::table::Table;
use crate::value::DataKind;

use infer::infer_kinds;
use tokenizer::{RawRecord, Tokenizer, detect_separator};

/// Reads delimiter-separated text into a [`Table`].
///
/// # Example
///
/// ```no_run
/// use csv_loom::Reader;
///
/// let mut reader = Reader::new();
/// reader.separator(';').headers(true);
///
/// let table = reader.read_path("data.csv").unwrap();
/// println!("{} rows", table.row_count());
/// ```
///
/// Everything left unset is detected from the input: the charset from a
/// byte order mark (or by sniffing the bytes), the separator from the
/// first line, and column kinds from the cell contents unless the header
/// declares them inline as `name(type=Integer)`.
#[derive(Debug, Clone)]
pub struct Reader {
    /// Optional forced separator.
    separator: Option<char>,
    /// Quote character.
    quote: char,
    /// Optional forced charset; a byte order mark still wins.
    charset: Option<Charset>,
    /// Whether the first record is a header row.
    has_headers: bool,
    /// Whether unannotated column kinds are inferred from the data.
    infer_types: bool,
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader {
    /// Create a new Reader with default settings: auto-detected separator
    /// and charset, `"` quoting, a header row, and type inference on.
    pub fn new() -> Self {
        Self {
            separator: None,
            quote: '"',
            charset: None,
            has_headers: true,
            infer_types: true,
        }
    }

    /// Force a specific separator (skip auto-detection).
    pub fn separator(&mut self, separator: char) -> &mut Self {
        self.separator = Some(separator);
        self
    }

    /// Set the quote character.
    pub fn quote(&mut self, quote: char) -> &mut Self {
        self.quote = quote;
        self
    }

    /// Force a specific charset. A byte order mark in the input still
    /// overrides this.
    pub fn charset(&mut self, charset: Charset) -> &mut Self {
        self.charset = Some(charset);
        self
    }

    /// Set whether the first record is a header row.
    pub fn headers(&mut self, has_headers: bool) -> &mut Self {
        self.has_headers = has_headers;
        self
    }

    /// Set whether unannotated columns get their kind inferred from the
    /// data. When off, unannotated columns are text.
    pub fn infer_types(&mut self, infer: bool) -> &mut Self {
        self.infer_types = infer;
        self
    }

    /// Read a file at the given path.
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Table> {
        let file = File::open(path.as_ref())?;
        self.read_reader(std::io::BufReader::new(file))
    }

    /// Read from any byte reader. The source is consumed to its end.
    pub fn read_reader<R: Read>(&self, mut reader: R) -> Result<Table> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.read_bytes(&data)
    }

    /// Read from an in-memory byte buffer.
    pub fn read_bytes(&self, data: &[u8]) -> Result<Table> {
        let charset = match detect_bom(data) {
            Some((from_bom, _)) => from_bom,
            None => self.charset.unwrap_or_else(|| sniff_charset(data)),
        };
        let text = charset.decode(data);

        let separator = self.separator.unwrap_or_else(|| {
            let first_line = text.lines().next().unwrap_or("");
            detect_separator(first_line).unwrap_or(',')
        });
        tracing::debug!(charset = %charset, separator = %separator, "reading table");

        let mut tokenizer = Tokenizer::new(separator, self.quote);
        tokenizer.header_expected(self.has_headers);
        let records = tokenizer.records(&text);

        let (header, body) = if self.has_headers {
            match records.split_first() {
                Some((header, body)) => (Some(header), body),
                None => (None, &records[..]),
            }
        } else {
            (None, &records[..])
        };

        let width = match header {
            Some(header) => header.fields.len(),
            None => body.first().map_or(0, |record| record.fields.len()),
        };

        let (mut columns, annotated) = build_columns(header, width);
        if self.infer_types && !body.is_empty() {
            for (index, kind) in infer_kinds(body, width).into_iter().enumerate() {
                if !annotated[index] && kind != DataKind::Text {
                    let name = columns[index].name().to_string();
                    columns[index] = Column::new(name, kind);
                }
            }
        }

        let mut metadata = MetaData::new();
        metadata.separator = separator;
        metadata.quote = self.quote;
        metadata.charset = charset;
        for column in columns {
            metadata.add_column(column)?;
        }

        let rows = parse_rows(&metadata, body);
        let table = Table::assemble(metadata, rows);
        tracing::debug!(
            columns = table.metadata().len(),
            rows = table.row_count(),
            "table loaded"
        );
        Ok(table)
    }
}

/// Build the column list from the header record, or generate positional
/// names when there is none. Returns which columns carried an explicit
/// type annotation.
fn build_columns(header: Option<&RawRecord>, width: usize) -> (Vec<Column>, Vec<bool>) {
    let mut columns = Vec::with_capacity(width);
    let mut annotated = vec![false; width];

    match header {
        Some(header) => {
            for (index, cell) in header.fields.iter().enumerate() {
                match Column::header_annotation(cell) {
                    Some(column) => {
                        annotated[index] = true;
                        columns.push(column);
                    }
                    None => columns.push(Column::new(cell.trim(), DataKind::Text)),
                }
            }
        }
        None => {
            for index in 0..width {
                columns.push(Column::new(format!("column_{}", index + 1), DataKind::Text));
            }
        }
    }

    for (index, column) in columns.iter_mut().enumerate() {
        if column.name().is_empty() {
            column.rename(format!("column_{}", index + 1));
        }
    }

    (columns, annotated)
}

/// Parse raw records into typed rows.
///
/// A cell that fails its column's parser becomes null for that row only.
/// Short records leave trailing cells null; surplus fields are dropped.
fn parse_rows(metadata: &MetaData, body: &[RawRecord]) -> Vec<Row> {
    let width = metadata.len();
    let mut rows = Vec::with_capacity(body.len());

    for (row_index, record) in body.iter().enumerate() {
        let mut cells = Vec::with_capacity(width);
        for (index, column) in metadata.columns().iter().enumerate() {
            let cell = match record.fields.get(index) {
                Some(text) if !text.is_empty() => match column.parse(text) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::debug!(
                            row = row_index,
                            column = column.name(),
                            text = %text,
                            "cell failed to parse, stored null"
                        );
                        None
                    }
                },
                _ => None,
            };
            cells.push(cell);
        }
        if record.fields.len() > width {
            tracing::debug!(
                row = row_index,
                surplus = record.fields.len() - width,
                "record wider than the column set, extra fields dropped"
            );
        }
        rows.push(Row::new(cells));
    }

    rows
}
