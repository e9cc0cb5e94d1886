//! Error type shared by loading, querying and writing tables

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Io,
    AlreadyExists,
    Schema,
    OutOfRange,
    Encoding,
}

/// Row whose field count disagreed with the header
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SchemaMismatch {
    pub row: usize,
    pub found: usize,
    pub expected: usize,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    path: Option<PathBuf>,
    schema: Option<SchemaMismatch>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            path: None,
            schema: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn schema(&self) -> Option<SchemaMismatch> {
        self.schema
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_schema(mut self, row: usize, found: usize, expected: usize) -> Self {
        self.schema = Some(SchemaMismatch {
            row,
            found,
            expected,
        });
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(schema) = &self.schema {
            write!(
                f,
                " (row {}: found {} fields, expected {})",
                schema.row, schema.found, schema.expected
            )?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Process exit code for a failed CLI invocation
pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Io => 1,
        ErrorKind::AlreadyExists => 2,
        ErrorKind::Schema => 3,
        ErrorKind::OutOfRange => 4,
        ErrorKind::Encoding => 5,
    }
}
