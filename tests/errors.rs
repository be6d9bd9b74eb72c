use std::io::Cursor;

use fstio::{read_metadata, Column, FstError, FstReader, Table, FILE_ID, FORMAT_VERSION};

fn one_column_table() -> Table {
    let mut table = Table::new();
    table
        .push_column("x", Column::Int32(vec![10, 20, 30]))
        .unwrap();
    table
}

fn encode(table: &Table) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    fstio::write_fst(&mut buffer, table, 0).unwrap();
    buffer.into_inner()
}

#[test]
fn test_header_bytes_sit_at_fixed_offsets() {
    let bytes = encode(&one_column_table());
    assert_eq!(&bytes[..8], &FILE_ID);
    assert_eq!(&bytes[8..12], &FORMAT_VERSION.to_le_bytes());
    assert_eq!(&bytes[12..16], &1u32.to_le_bytes()); // table class
    assert_eq!(&bytes[16..20], &0i32.to_le_bytes()); // key length
    assert_eq!(&bytes[20..24], &1i32.to_le_bytes()); // column count
}

#[test]
fn test_zeroed_magic_fails_metadata_and_read() {
    let mut bytes = encode(&one_column_table());
    bytes[..8].fill(0);

    let err = read_metadata(&mut Cursor::new(&bytes)).unwrap_err();
    assert!(matches!(err, FstError::NotFstFile));

    let err = FstReader::new(Cursor::new(&bytes)).unwrap_err();
    assert!(matches!(err, FstError::NotFstFile));
}

#[test]
fn test_newer_format_version_is_rejected() {
    let mut bytes = encode(&one_column_table());
    bytes[8..12].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());

    let err = read_metadata(&mut Cursor::new(&bytes)).unwrap_err();
    assert!(matches!(err, FstError::VersionTooNew { .. }));
}

#[test]
fn test_truncated_header_is_corrupt() {
    let bytes = encode(&one_column_table());
    let err = read_metadata(&mut Cursor::new(&bytes[..10])).unwrap_err();
    assert!(matches!(err, FstError::CorruptHeader(_)));
}

#[test]
fn test_empty_tables_are_rejected() {
    let empty = Table::new();
    let err = fstio::write_fst(Cursor::new(Vec::new()), &empty, 0).unwrap_err();
    assert!(matches!(err, FstError::EmptyTable));

    let mut zero_rows = Table::new();
    zero_rows.push_column("x", Column::Int32(vec![])).unwrap();
    let err = fstio::write_fst(Cursor::new(Vec::new()), &zero_rows, 0).unwrap_err();
    assert!(matches!(err, FstError::EmptyTable));
}

#[test]
fn test_compression_level_is_checked() {
    let err = fstio::write_fst(Cursor::new(Vec::new()), &one_column_table(), 101).unwrap_err();
    assert!(matches!(err, FstError::InvalidCompressionLevel(101)));
}

#[test]
fn test_unknown_column_name_is_rejected() {
    let mut table = Table::new();
    table.push_column("a", Column::Int32(vec![1])).unwrap();
    table.push_column("b", Column::Int32(vec![2])).unwrap();

    let mut reader = FstReader::new(Cursor::new(encode(&table))).unwrap();
    let err = reader.read_range(Some(&["c"]), 1, None).unwrap_err();
    match err {
        FstError::ColumnNotFound(name) => assert_eq!(name, "c"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_row_range_is_validated() {
    let mut reader = FstReader::new(Cursor::new(encode(&one_column_table()))).unwrap();

    let err = reader.read_range(None, 0, None).unwrap_err();
    assert!(matches!(err, FstError::FromRowMustBePositive));

    let err = reader.read_range(None, 4, None).unwrap_err();
    assert!(matches!(
        err,
        FstError::RowSelectionOutOfRange {
            start_row: 4,
            nr_of_rows: 3,
        }
    ));

    let err = reader.read_range(None, 3, Some(2)).unwrap_err();
    assert!(matches!(
        err,
        FstError::IncorrectRowRange {
            start_row: 3,
            end_row: 2,
        }
    ));
}

// The metadata parse must not depend on anything at or after the chunk
// index: a stream cut right where read_metadata stopped still parses.
#[test]
fn test_metadata_parse_is_disjoint_from_column_data() {
    let bytes = encode(&one_column_table());

    let mut cursor = Cursor::new(bytes.clone());
    let metadata = read_metadata(&mut cursor).unwrap();
    let names_end = cursor.position() as usize;
    assert!(names_end < bytes.len());

    let truncated = read_metadata(&mut Cursor::new(&bytes[..names_end])).unwrap();
    assert_eq!(truncated.col_names, metadata.col_names);
    assert_eq!(truncated.nr_of_rows, metadata.nr_of_rows);

    // but a range read on the truncated stream has to fail
    let mut reader = FstReader::new(Cursor::new(bytes[..names_end].to_vec())).unwrap();
    assert!(reader.read_all().is_err());
}

#[test]
fn test_open_failure_names_the_path() {
    let err = FstReader::open("does/not/exist.fst").unwrap_err();
    match err {
        FstError::FailedToOpen { path, .. } => {
            assert_eq!(path, std::path::Path::new("does/not/exist.fst"))
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_error_messages_are_stable() {
    assert_eq!(FstError::NotFstFile.to_string(), "File is not an fst file");
    assert_eq!(
        FstError::FromRowMustBePositive.to_string(),
        "fromRow must be positive"
    );
    assert_eq!(
        FstError::MultipleChunksNotSupported(2).to_string(),
        "Multiple chunks not implemented (2 chunks)"
    );
    assert_eq!(
        FstError::ColumnNotFound("c".to_string()).to_string(),
        "Selected column not found: 'c'"
    );
}
