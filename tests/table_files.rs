// File-level load/write behaviour of StaticTable.
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use csvtable::diag::Severity;
use csvtable::io::{FileSystem, LocalFs};
use csvtable::{CapturedDiagnostics, ErrorKind, LoadFlags, StaticTable};

fn table_with_log() -> (StaticTable, Arc<CapturedDiagnostics>) {
    let diag = Arc::new(CapturedDiagnostics::new());
    (StaticTable::with_diagnostics(diag.clone()), diag)
}

fn values(table: &StaticTable) -> Vec<Vec<String>> {
    let mut grid = vec![(0..table.field_count())
        .map(|f| table.field_name(f).unwrap().to_string())
        .collect::<Vec<_>>()];
    grid.extend(table.rows().map(|row| row.to_strings()));
    grid
}

#[test]
fn round_trip_preserves_values() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("units.csv");
    let dst = temp.path().join("units_out.csv");
    std::fs::write(
        &src,
        "id,label,notes\r\n\
         1,plain,\"a,b\"\"c\"\r\n\
         2,\"quote \"\"inside\"\"\",\r\n\
         3,,\"trailing,\"\r\n",
    )
    .unwrap();

    let (mut table, _) = table_with_log();
    table.read_file(&src, LoadFlags::NONE).unwrap();
    assert_eq!(table.cell_value(0, 2).unwrap(), "a,b\"c");
    assert_eq!(table.cell_value(1, 1).unwrap(), "quote \"inside\"");

    table.write_file(&dst, false).unwrap();

    let (mut reloaded, _) = table_with_log();
    reloaded.read_file(&dst, LoadFlags::NONE).unwrap();
    assert_eq!(values(&reloaded), values(&table));
}

#[test]
fn write_refuses_existing_file_without_overwrite() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("in.csv");
    let dst = temp.path().join("out.csv");
    std::fs::write(&src, "a,b\r\n1,2\r\n").unwrap();
    std::fs::write(&dst, "previous contents that are much longer than the table\r\n").unwrap();

    let (mut table, diag) = table_with_log();
    table.read_file(&src, LoadFlags::DEFAULT).unwrap();

    let err = table.write_file(&dst, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(diag.with_severity(Severity::Error).len(), 1);
    assert!(std::fs::read_to_string(&dst).unwrap().starts_with("previous"));

    table.write_file(&dst, true).unwrap();
    assert_eq!(std::fs::read_to_string(&dst).unwrap(), "a,b\r\n1,2\r\n");
}

#[test]
fn headerless_file_gets_name_column() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("names.csv");
    std::fs::write(&src, "a\r\nb\r\nc\r\n").unwrap();

    let table = StaticTable::open(&src, LoadFlags::HEADERLESS_SINGLE_FIELD).unwrap();
    assert_eq!(table.field_count(), 1);
    assert_eq!(table.field_name(0).unwrap(), "name");
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.cell_value(2, 0).unwrap(), "c");
}

#[test]
fn load_logs_and_prunes() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("items.csv");
    std::fs::write(
        &src,
        "name,,age\r\n# disabled,,\r\nann,x,31\r\n,,\r\nbob,,42\r\n",
    )
    .unwrap();

    let (mut table, diag) = table_with_log();
    table
        .read_file(&src, LoadFlags::DEFAULT | LoadFlags::PRUNE_EMPTY_COLUMNS)
        .unwrap();

    assert_eq!(
        values(&table),
        vec![
            vec!["name", "age"],
            vec!["ann", "31"],
            vec!["bob", "42"],
        ]
    );

    let info = diag.with_severity(Severity::Info);
    assert_eq!(info[0], "Loading CSV 'items.csv'...");
    assert!(info.contains(&"Pruned 1 empty columns from table".to_string()));
    assert!(info.contains(&"Pruned 2 rows from table".to_string()));
    assert_eq!(diag.with_severity(Severity::Warn).len(), 1);
}

#[test]
fn missing_and_empty_files_are_io_errors() {
    let temp = tempfile::tempdir().expect("tempdir");

    let (mut table, diag) = table_with_log();
    let err = table
        .read_file(temp.path().join("absent.csv"), LoadFlags::DEFAULT)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(table.is_empty());

    let empty = temp.path().join("empty.csv");
    std::fs::write(&empty, "").unwrap();
    let err = table.read_file(&empty, LoadFlags::DEFAULT).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(diag.with_severity(Severity::Error).len(), 2);
}

#[test]
fn schema_error_from_file_clears_previous_table() {
    let temp = tempfile::tempdir().expect("tempdir");
    let good = temp.path().join("good.csv");
    let bad = temp.path().join("bad.csv");
    std::fs::write(&good, "a,b\r\n1,2\r\n").unwrap();
    std::fs::write(&bad, "a,b\r\n1,2,3\r\n").unwrap();

    let (mut table, _) = table_with_log();
    table.read_file(&good, LoadFlags::DEFAULT).unwrap();
    assert_eq!(table.row_count(), 1);

    let err = table.read_file(&bad, LoadFlags::DEFAULT).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(err.schema().map(|s| (s.row, s.found, s.expected)), Some((1, 3, 2)));
    assert_eq!(table.row_count(), 0);
    assert_eq!(table.field_count(), 0);
}

/// Reads like the local file system but refuses to create files
struct ReadOnlyFs;

impl FileSystem for ReadOnlyFs {
    fn exists(&self, path: &Path) -> bool {
        LocalFs.exists(path)
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        LocalFs.file_size(path)
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        LocalFs.open_read(path)
    }

    fn create_write(&self, _path: &Path) -> io::Result<Box<dyn Write>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
}

#[test]
fn write_reports_open_failure() {
    let temp = tempfile::tempdir().expect("tempdir");
    let src = temp.path().join("in.csv");
    std::fs::write(&src, "a\r\n1\r\n").unwrap();

    let diag = Arc::new(CapturedDiagnostics::new());
    let mut table = StaticTable::with_collaborators(Arc::new(ReadOnlyFs), diag.clone());
    table.read_file(&src, LoadFlags::DEFAULT).unwrap();

    let err = table.write_file(temp.path().join("out.csv"), true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(diag.with_severity(Severity::Error).len(), 1);
    // The table itself is untouched by a failed write.
    assert_eq!(table.cell_value(0, 0).unwrap(), "1");
}
