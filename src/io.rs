//! File-system access used by table loading and writing

use crate::error::{Error, ErrorKind, Result};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// The file operations a table needs from its host
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn file_size(&self, path: &Path) -> io::Result<u64>;

    /// Open for reading with no newline translation
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read>>;

    /// Create or truncate for writing
    fn create_write(&self, path: &Path) -> io::Result<Box<dyn Write>>;
}

/// [`FileSystem`] backed by `std::fs`
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        Ok(std::fs::metadata(path)?.len())
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(path)?))
    }

    fn create_write(&self, path: &Path) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(io::BufWriter::new(File::create(path)?)))
    }
}

/// File contents followed by zeroed padding bytes
pub struct Corpus {
    data: Vec<u8>,
    length: usize,
}

impl Corpus {
    /// The bytes read from the file (excluding padding)
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data[..self.length]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Hand over the whole buffer, padding included
    pub fn into_padded(self) -> Vec<u8> {
        self.data
    }
}

/// Load a whole file into memory, followed by `padding` zero bytes
///
/// The buffer is sized from `file_size`; a file that shrank in the meantime
/// yields a shorter `len()`, never uninitialized data.
pub fn get_corpus(fs: &dyn FileSystem, path: &Path, padding: usize) -> Result<Corpus> {
    let size = fs.file_size(path).map_err(|e| {
        Error::new(ErrorKind::Io)
            .with_message("could not query file size")
            .with_path(path)
            .with_source(e)
    })?;
    let size = usize::try_from(size).map_err(|_| {
        Error::new(ErrorKind::Io)
            .with_message("file is too large to load")
            .with_path(path)
    })?;

    let mut reader = fs.open_read(path).map_err(|e| {
        Error::new(ErrorKind::Io)
            .with_message("unable to open file for reading")
            .with_path(path)
            .with_source(e)
    })?;

    let mut data = vec![0u8; size + padding];
    let mut length = 0;
    while length < size {
        match reader.read(&mut data[length..size]) {
            Ok(0) => break,
            Ok(n) => length += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(Error::new(ErrorKind::Io)
                    .with_message("could not read file data")
                    .with_path(path)
                    .with_source(e))
            }
        }
    }

    // Keep the zeroed padding directly after what was actually read.
    data.truncate(length + padding);

    Ok(Corpus { data, length })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_corpus() {
        let temp = tempfile::tempdir().expect("tempdir");
        let test_file = temp.path().join("test_csvtable.csv");
        std::fs::write(&test_file, b"a,b,c\r\n1,2,3\r\n").unwrap();

        let corpus = get_corpus(&LocalFs, &test_file, 1).unwrap();

        assert_eq!(corpus.len(), 14);
        assert_eq!(corpus.data(), b"a,b,c\r\n1,2,3\r\n");

        let padded = corpus.into_padded();
        assert_eq!(padded.len(), 15);
        assert_eq!(padded[14], 0);
    }

    #[test]
    fn test_get_corpus_keeps_crlf_bytes() {
        let temp = tempfile::tempdir().expect("tempdir");
        let test_file = temp.path().join("binary.csv");
        std::fs::write(&test_file, b"x\r\n\r\ny").unwrap();

        let corpus = get_corpus(&LocalFs, &test_file, 0).unwrap();
        assert_eq!(corpus.data(), b"x\r\n\r\ny");
    }

    #[test]
    fn test_get_corpus_missing_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = match get_corpus(&LocalFs, &temp.path().join("nope.csv"), 1) {
            Ok(_) => panic!("missing file should not load"),
            Err(e) => e,
        };
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_local_fs_exists_and_size() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("sized.csv");
        assert!(!LocalFs.exists(&path));

        {
            let mut w = LocalFs.create_write(&path).unwrap();
            w.write_all(b"12345").unwrap();
            w.flush().unwrap();
        }

        assert!(LocalFs.exists(&path));
        assert_eq!(LocalFs.file_size(&path).unwrap(), 5);
    }
}
