//! # csvtable
//!
//! Loads a whole CSV file into memory as a grid of string cells, with
//! quote-escaped fields, optional pruning of comment rows, empty rows and
//! unnamed columns, and writes the grid back out.
//!
//! Cells are spans into a single buffer owned by the [`StaticTable`]; quoted
//! fields are decoded in place, so loading allocates only the buffer and the
//! grid.

pub mod diag;
pub mod error;
pub mod flags;
pub mod io;
pub mod table;
pub mod tokenizer;

pub use diag::{CapturedDiagnostics, Diagnostics, TracingDiagnostics};
pub use error::{Error, ErrorKind, Result};
pub use flags::LoadFlags;
pub use table::{RowView, StaticTable};

/// Zeroed bytes kept after the file contents in a loaded buffer
pub const CORPUS_PADDING: usize = 1;
