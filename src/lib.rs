//! Columnar on-disk serialization of tabular datasets in the fst format.
//!
//! A [`Table`] is a set of equally long, named columns of strings,
//! factors, 32-bit integers, doubles or tri-state logicals. [`write_fst`]
//! lays such a table out in a single little-endian binary stream;
//! [`FstReader`] reads it back, and supports inspecting the schema
//! without touching column data, selecting a subset of columns by name
//! and selecting a contiguous row range without decoding rows outside
//! that range.
//!
//! # Writing and reading a table
//!
//! ```
//! use fstio::{Column, FstReader, Table};
//!
//! # fn main() -> fstio::Result<()> {
//! let mut table = Table::new();
//! table.push_column("id", Column::Int32(vec![1, 2, 3]))?;
//! table.push_column("score", Column::Double64(vec![0.5, 1.5, 2.5]))?;
//!
//! // Here we use a Cursor but a std::fs::File will work just fine
//! let mut buffer = std::io::Cursor::new(Vec::new());
//! fstio::write_fst(&mut buffer, &table, 50)?;
//!
//! buffer.set_position(0);
//! let mut reader = FstReader::new(buffer)?;
//! assert_eq!(reader.metadata().nr_of_rows, 3);
//!
//! let back = reader.read_all()?;
//! assert_eq!(back, table);
//! # Ok(())
//! # }
//! ```
//!
//! # Column and row selection
//!
//! Rows are selected with 1-based inclusive bounds; `None` as the end
//! row reads to the end of the table.
//!
//! ```
//! use fstio::{Column, FstReader, Table, MISSING_INT};
//!
//! # fn main() -> fstio::Result<()> {
//! let mut table = Table::new();
//! table.push_column(
//!     "k",
//!     Column::Character(vec![Some("a".into()), None, Some("b".into())]),
//! )?;
//! table.push_column("v", Column::Int32(vec![10, MISSING_INT, 30]))?;
//!
//! let mut buffer = std::io::Cursor::new(Vec::new());
//! fstio::write_fst(&mut buffer, &table, 0)?;
//! buffer.set_position(0);
//!
//! let mut reader = FstReader::new(buffer)?;
//! let slice = reader.read_range(Some(&["v"]), 2, Some(3))?;
//! assert_eq!(slice.col_names(), ["v"]);
//! assert_eq!(slice.column(0), &Column::Int32(vec![MISSING_INT, 30]));
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod reader;
pub mod table;
pub mod writer;

mod block;
mod chunk_index;
mod compression;
mod header;
mod primitive_block;
mod string_block;

pub use errors::FstError;
pub use header::{FILE_ID, FORMAT_VERSION};
pub use reader::{read_metadata, FstReader, Metadata};
pub use table::{
    is_missing_double, missing_double, Column, ColumnType, Table, MISSING_DOUBLE_BITS, MISSING_INT,
};
pub use writer::{write_fst, write_fst_file};

/// Result type of this crate
pub type Result<T, E = FstError> = std::result::Result<T, E>;
