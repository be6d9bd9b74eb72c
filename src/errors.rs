//! Definitions of error related things.

use std::fmt;
use std::path::PathBuf;

/// Errors of this crate
#[derive(Debug)]
#[non_exhaustive]
pub enum FstError {
    /// The file could not be opened for the required mode
    FailedToOpen {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file id bytes do not match the fst magic
    NotFstFile,
    /// The file was written by a newer version of the format
    VersionTooNew {
        file_version: u32,
        reader_version: u32,
    },
    /// A header field failed a structural check, or the header was cut short
    CorruptHeader(&'static str),
    /// A column body could not be decoded
    CorruptBlock(String),
    /// Write was attempted on a table with zero columns or zero rows
    EmptyTable,
    /// A column type id outside the known set was encountered
    UnknownColumnType(u16),
    /// A selected column name does not match any stored name
    ColumnNotFound(String),
    /// The requested first row was not a positive (1-based) row number
    FromRowMustBePositive,
    /// The requested first row lies past the end of the table
    RowSelectionOutOfRange { start_row: u64, nr_of_rows: u64 },
    /// The requested last row comes before the requested first row
    IncorrectRowRange { start_row: u64, end_row: u64 },
    /// The chunk index announces more than one chunk
    MultipleChunksNotSupported(u64),
    /// A column added to a table does not have the table's row count
    MismatchedColumnLength { expected: usize, got: usize },
    /// The compression level is outside `0..=100`
    InvalidCompressionLevel(u8),
    /// Wrapper around an io error from the std lib
    IoError(std::io::Error),
}

impl From<std::io::Error> for FstError {
    fn from(e: std::io::Error) -> Self {
        FstError::IoError(e)
    }
}

impl fmt::Display for FstError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            FstError::FailedToOpen { path, source } => {
                write!(f, "Could not open '{}': {}", path.display(), source)
            }
            FstError::NotFstFile => write!(f, "File is not an fst file"),
            FstError::VersionTooNew {
                file_version,
                reader_version,
            } => write!(
                f,
                "File was created by a newer fst version (file format {}, reader format {})",
                file_version, reader_version
            ),
            FstError::CorruptHeader(detail) => write!(f, "Corrupt header: {}", detail),
            FstError::CorruptBlock(detail) => write!(f, "Corrupt column block: {}", detail),
            FstError::EmptyTable => {
                write!(f, "A table must have at least one column and one row")
            }
            FstError::UnknownColumnType(t) => write!(f, "Column type id {} is unknown", t),
            FstError::ColumnNotFound(name) => {
                write!(f, "Selected column not found: '{}'", name)
            }
            FstError::FromRowMustBePositive => write!(f, "fromRow must be positive"),
            FstError::RowSelectionOutOfRange {
                start_row,
                nr_of_rows,
            } => write!(
                f,
                "Row selection out of range (row {} of {})",
                start_row, nr_of_rows
            ),
            FstError::IncorrectRowRange { start_row, end_row } => {
                write!(f, "Incorrect row range ({} to {})", start_row, end_row)
            }
            FstError::MultipleChunksNotSupported(n) => {
                write!(f, "Multiple chunks not implemented ({} chunks)", n)
            }
            FstError::MismatchedColumnLength { expected, got } => {
                write!(f, "Column has {} rows but the table has {}", got, expected)
            }
            FstError::InvalidCompressionLevel(level) => {
                write!(f, "Compression level {} is not in 0..=100", level)
            }
            FstError::IoError(e) => write!(f, "IoError: {}", e),
        }
    }
}

impl std::error::Error for FstError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FstError::FailedToOpen { source, .. } => Some(source),
            FstError::IoError(e) => Some(e),
            _ => None,
        }
    }
}
