//! In-memory CSV table over a single owned buffer

use crate::diag::{Diagnostics, TracingDiagnostics};
use crate::error::{Error, ErrorKind, Result};
use crate::flags::LoadFlags;
use crate::io::{get_corpus, FileSystem, LocalFs};
use crate::tokenizer::{find, DelimTokenizer, FieldTokenizer, Span};
use crate::CORPUS_PADDING;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// Line terminator recognized on load and written on save
pub const LINE_BREAK: &[u8] = b"\r\n";

/// Field name used for the synthesized header of headerless files
pub const HEADERLESS_FIELD_NAME: &str = "name";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cell {
    Span(Span),
    Literal(&'static str),
}

/// A CSV file loaded into memory as a grid of cells
///
/// Row 0 of the grid is the header; the query methods address data rows from
/// 0, so `cell_value(0, f)` is the first row after the header. Cells are spans
/// into one buffer owned by the table, so every borrowed cell is bounded by
/// the table's lifetime.
pub struct StaticTable {
    buf: Vec<u8>,
    cells: Vec<Vec<Cell>>,
    fs: Arc<dyn FileSystem>,
    diag: Arc<dyn Diagnostics>,
}

impl Default for StaticTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StaticTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTable")
            .field("fields", &self.field_count())
            .field("rows", &self.row_count())
            .field("buffer_len", &self.buf.len())
            .finish_non_exhaustive()
    }
}

impl StaticTable {
    /// Empty table using the local file system and `tracing` diagnostics
    pub fn new() -> Self {
        Self::with_collaborators(Arc::new(LocalFs), Arc::new(TracingDiagnostics))
    }

    pub fn with_collaborators(fs: Arc<dyn FileSystem>, diag: Arc<dyn Diagnostics>) -> Self {
        Self {
            buf: Vec::new(),
            cells: Vec::new(),
            fs,
            diag,
        }
    }

    pub fn with_diagnostics(diag: Arc<dyn Diagnostics>) -> Self {
        Self::with_collaborators(Arc::new(LocalFs), diag)
    }

    /// Create a table and load `path` into it
    pub fn open(path: impl AsRef<Path>, flags: LoadFlags) -> Result<Self> {
        let mut table = Self::new();
        table.read_file(path, flags)?;
        Ok(table)
    }

    pub fn read_file_default(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.read_file(path, LoadFlags::DEFAULT)
    }

    /// Replace the table's contents with the CSV file at `path`
    ///
    /// On failure the table is left empty.
    pub fn read_file(&mut self, path: impl AsRef<Path>, flags: LoadFlags) -> Result<()> {
        let path = path.as_ref();
        self.clear();

        let name = path.file_name().unwrap_or(path.as_os_str()).to_string_lossy();
        self.diag.info(&format!("Loading CSV '{}'...", name));

        let corpus = match get_corpus(self.fs.as_ref(), path, CORPUS_PADDING) {
            Ok(corpus) => corpus,
            Err(e) => return Err(self.fail(e)),
        };
        if corpus.is_empty() {
            return Err(self.fail(
                Error::new(ErrorKind::Io)
                    .with_message("file is empty")
                    .with_path(path),
            ));
        }

        let length = corpus.len();
        self.parse(corpus.into_padded(), length, flags)
            .map_err(|e| self.fail(e.with_path(path)))
    }

    /// Replace the table's contents by parsing `bytes` as a CSV file
    pub fn load_bytes(&mut self, bytes: impl Into<Vec<u8>>, flags: LoadFlags) -> Result<()> {
        self.clear();

        let mut buf = bytes.into();
        if buf.is_empty() {
            return Err(self.fail(Error::new(ErrorKind::Io).with_message("input is empty")));
        }

        let length = buf.len();
        buf.resize(length + CORPUS_PADDING, 0);
        self.parse(buf, length, flags).map_err(|e| self.fail(e))
    }

    fn parse(&mut self, buf: Vec<u8>, length: usize, flags: LoadFlags) -> Result<()> {
        self.buf = buf;

        let content = &self.buf[..length];
        if find(content, LINE_BREAK).is_none() && content.contains(&b'\n') {
            self.diag
                .warn("No CRLF line breaks found; bare LF is not treated as a line separator");
        }

        let mut lines = DelimTokenizer::new(LINE_BREAK);
        lines.seed(Span::new(0, length));
        let mut line_spans = Vec::new();
        while let Some(line) = lines.next_token(&self.buf) {
            line_spans.push(line);
        }
        let tail = lines.remainder();
        if !tail.is_empty() {
            line_spans.push(tail);
        }

        let mut cells: Vec<Vec<Cell>> = Vec::with_capacity(line_spans.len());
        for (i, line) in line_spans.into_iter().enumerate() {
            let row: Vec<Cell> = FieldTokenizer::new(line)
                .collect_fields(&mut self.buf)
                .into_iter()
                .map(Cell::Span)
                .collect();

            let expected = cells.first().map_or(row.len(), Vec::len);
            if row.len() != expected {
                return Err(Error::new(ErrorKind::Schema)
                    .with_message("incorrect number of fields")
                    .with_schema(i, row.len(), expected));
            }
            cells.push(row);
        }
        self.cells = cells;

        if flags.contains(LoadFlags::PRUNE_EMPTY_COLUMNS) {
            self.prune_columns();
        }
        self.prune_rows(flags);

        if flags.contains(LoadFlags::HEADERLESS_SINGLE_FIELD) {
            if self.field_count() != 1 {
                return Err(Error::new(ErrorKind::Schema)
                    .with_message("headerless tables must have a single field")
                    .with_schema(0, self.field_count(), 1));
            }
            self.cells.insert(0, vec![Cell::Literal(HEADERLESS_FIELD_NAME)]);
        }

        Ok(())
    }

    /// Drop all rows and release the buffer
    pub fn clear(&mut self) {
        self.cells = Vec::new();
        self.buf = Vec::new();
    }

    fn fail(&mut self, err: Error) -> Error {
        self.clear();
        self.report(err)
    }

    fn report(&self, err: Error) -> Error {
        self.diag.error(&err.to_string());
        err
    }

    #[inline]
    fn resolve(&self, cell: Cell) -> &[u8] {
        match cell {
            Cell::Span(span) => span.slice(&self.buf),
            Cell::Literal(text) => text.as_bytes(),
        }
    }

    /// Remove every column whose header name is empty
    ///
    /// Non-empty values in a removed column are discarded with a warning each.
    pub fn prune_columns(&mut self) -> usize {
        let mut pruned = 0;
        let mut c = 0;
        // Position in the file, for messages; `c` shifts as columns go.
        let mut original = 0;

        while c < self.field_count() {
            if !self.resolve(self.cells[0][c]).is_empty() {
                c += 1;
                original += 1;
                continue;
            }

            for r in 1..self.cells.len() {
                if !self.resolve(self.cells[r][c]).is_empty() {
                    self.diag.warn(&format!(
                        "Ignoring value with unnamed field (see row {}, field {})",
                        r - 1,
                        original
                    ));
                }
            }
            for row in &mut self.cells {
                row.remove(c);
            }

            pruned += 1;
            original += 1;
        }

        if pruned > 0 {
            self.diag.info(&format!("Pruned {} empty columns from table", pruned));
        }
        pruned
    }

    /// Remove comment and/or empty data rows, as selected by `flags`
    pub fn prune_rows(&mut self, flags: LoadFlags) -> usize {
        let comments = flags.contains(LoadFlags::PRUNE_COMMENT_ROWS);
        let empties = flags.contains(LoadFlags::PRUNE_EMPTY_ROWS);
        if !comments && !empties {
            return 0;
        }

        let mut pruned = 0;
        let mut r = 1;
        while r < self.cells.len() {
            let row = &self.cells[r];
            let is_comment = comments
                && row
                    .first()
                    .is_some_and(|&cell| self.resolve(cell).first() == Some(&b'#'));
            let is_empty = empties && row.iter().all(|&cell| self.resolve(cell).is_empty());

            if is_comment || is_empty {
                self.cells.remove(r);
                pruned += 1;
            } else {
                r += 1;
            }
        }

        if pruned > 0 {
            self.diag.info(&format!("Pruned {} rows from table", pruned));
        }
        pruned
    }

    /// Remove data row `row`
    pub fn delete_row(&mut self, row: usize) -> Result<()> {
        self.check_row(row)?;
        self.cells.remove(row + 1);
        Ok(())
    }

    pub fn field_count(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Number of data rows (the header is not counted)
    pub fn row_count(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn field_name(&self, field: usize) -> Result<&str> {
        let cell = self
            .cells
            .first()
            .and_then(|header| header.get(field))
            .copied()
            .ok_or_else(|| {
                Error::new(ErrorKind::OutOfRange).with_message(format!(
                    "field {} out of range ({} fields)",
                    field,
                    self.field_count()
                ))
            })?;
        to_str(self.resolve(cell))
    }

    /// Index of the first field named `name`
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.cells
            .first()?
            .iter()
            .position(|&cell| self.resolve(cell) == name.as_bytes())
    }

    pub fn cell_bytes(&self, row: usize, field: usize) -> Result<&[u8]> {
        self.check_row(row)?;
        let cell = self.cells[row + 1].get(field).copied().ok_or_else(|| {
            Error::new(ErrorKind::OutOfRange).with_message(format!(
                "field {} out of range ({} fields)",
                field,
                self.field_count()
            ))
        })?;
        Ok(self.resolve(cell))
    }

    pub fn cell_value(&self, row: usize, field: usize) -> Result<&str> {
        to_str(self.cell_bytes(row, field)?)
    }

    /// Data rows in order
    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> + '_ {
        self.cells
            .iter()
            .skip(1)
            .map(move |cells| RowView { table: self, cells })
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row < self.row_count() {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::OutOfRange).with_message(format!(
                "row {} out of range ({} rows)",
                row,
                self.row_count()
            )))
        }
    }

    /// Save the table as CSV
    ///
    /// Fails with `AlreadyExists` if `path` exists and `overwrite` is false.
    pub fn write_file(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        if !overwrite && self.fs.exists(path) {
            return Err(self.report(
                Error::new(ErrorKind::AlreadyExists)
                    .with_message("file already exists")
                    .with_path(path),
            ));
        }

        let mut out = self.fs.create_write(path).map_err(|e| {
            self.report(
                Error::new(ErrorKind::Io)
                    .with_message("unable to open file for writing")
                    .with_path(path)
                    .with_source(e),
            )
        })?;

        self.print_table(out.as_mut(), false)
            .and_then(|()| out.flush())
            .map_err(|e| {
                self.report(
                    Error::new(ErrorKind::Io)
                        .with_message("could not write table")
                        .with_path(path)
                        .with_source(e),
                )
            })
    }

    /// Render every row, header included, as CSV
    ///
    /// With `include_debug_info` each line starts with its grid index, e.g. `[0]: `.
    pub fn print_table<W: Write + ?Sized>(
        &self,
        w: &mut W,
        include_debug_info: bool,
    ) -> io::Result<()> {
        for (r, row) in self.cells.iter().enumerate() {
            if include_debug_info {
                write!(w, "[{}]: ", r)?;
            }
            for (f, &cell) in row.iter().enumerate() {
                if f > 0 {
                    w.write_all(b",")?;
                }
                write_field(w, self.resolve(cell))?;
            }
            w.write_all(LINE_BREAK)?;
        }
        Ok(())
    }
}

/// Borrowed data row of a [`StaticTable`]
#[derive(Clone, Copy)]
pub struct RowView<'a> {
    table: &'a StaticTable,
    cells: &'a [Cell],
}

impl<'a> RowView<'a> {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, field: usize) -> Option<&'a [u8]> {
        let table = self.table;
        self.cells.get(field).map(|&cell| table.resolve(cell))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let table = self.table;
        self.cells.iter().map(move |&cell| table.resolve(cell))
    }

    /// Field values as text, replacing invalid UTF-8
    pub fn to_strings(&self) -> Vec<String> {
        self.iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect()
    }
}

impl fmt::Debug for RowView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_strings()).finish()
    }
}

fn to_str(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| {
        Error::new(ErrorKind::Encoding)
            .with_message("cell is not valid UTF-8")
            .with_source(e)
    })
}

// Quoted iff the value holds a comma or a quote; embedded quotes are doubled.
fn write_field<W: Write + ?Sized>(w: &mut W, field: &[u8]) -> io::Result<()> {
    if !field.iter().any(|&b| b == b',' || b == b'"') {
        return w.write_all(field);
    }

    w.write_all(b"\"")?;
    for chunk in field.split_inclusive(|&b| b == b'"') {
        w.write_all(chunk)?;
        if chunk.last() == Some(&b'"') {
            w.write_all(b"\"")?;
        }
    }
    w.write_all(b"\"")
}
