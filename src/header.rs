//! The table-meta and chunkset-header regions at the head of a file.
//!
//! Everything here is fixed-offset little-endian data; the column-name
//! block and the chunk index follow it. Several fields are reserved for
//! multi-chunk layouts and are written as fixed values and ignored on
//! read (`tableClassType`, the horizontal/vertical chunkset links, the
//! per-column attribute types).

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::table::{Column, ColumnType, Table};
use crate::FstError;

/// The 8 magic bytes every fst file starts with.
pub const FILE_ID: [u8; 8] = *b"fstfile\0";

/// Format version written by this crate. Readers reject anything newer.
pub const FORMAT_VERSION: u32 = 1;

const TABLE_CLASS_DEFAULT: u32 = 1;

fn short_read(e: std::io::Error) -> FstError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        FstError::CorruptHeader("unexpected end of header")
    } else {
        FstError::IoError(e)
    }
}

/// Parsed table-meta plus chunkset header.
#[derive(Debug)]
pub(crate) struct FileHeader {
    pub version: u32,
    pub table_class_type: u32,
    pub key_col_pos: Vec<usize>,
    pub nr_of_rows: u64,
    pub col_types: Vec<ColumnType>,
}

impl FileHeader {
    pub(crate) fn new(table: &Table) -> Self {
        Self {
            version: FORMAT_VERSION,
            table_class_type: TABLE_CLASS_DEFAULT,
            key_col_pos: table.key_col_pos().to_vec(),
            nr_of_rows: table.nr_of_rows() as u64,
            col_types: table.columns().iter().map(Column::column_type).collect(),
        }
    }

    pub(crate) fn nr_of_cols(&self) -> usize {
        self.col_types.len()
    }

    pub(crate) fn write_to<W: Write>(&self, dst: &mut W) -> crate::Result<()> {
        dst.write_all(&FILE_ID)?;
        dst.write_u32::<LittleEndian>(self.version)?;
        dst.write_u32::<LittleEndian>(self.table_class_type)?;
        dst.write_i32::<LittleEndian>(self.key_col_pos.len() as i32)?;
        dst.write_i32::<LittleEndian>(self.nr_of_cols() as i32)?;
        for &pos in &self.key_col_pos {
            dst.write_i32::<LittleEndian>(pos as i32)?;
        }

        dst.write_u64::<LittleEndian>(0)?; // next horizontal chunkset
        dst.write_u64::<LittleEndian>(0)?; // next vertical chunkset
        dst.write_u64::<LittleEndian>(self.nr_of_rows)?;
        dst.write_u32::<LittleEndian>(self.version)?;
        dst.write_u32::<LittleEndian>(self.nr_of_cols() as u32)?;
        for _ in &self.col_types {
            dst.write_u16::<LittleEndian>(0)?; // column attribute types
        }
        for col_type in &self.col_types {
            dst.write_u16::<LittleEndian>((*col_type).into())?;
        }
        for col_type in &self.col_types {
            dst.write_u16::<LittleEndian>(col_type.base_type())?;
        }
        Ok(())
    }

    pub(crate) fn read_from<R: Read>(src: &mut R) -> crate::Result<Self> {
        let mut file_id = [0u8; 8];
        src.read_exact(&mut file_id).map_err(short_read)?;
        if file_id != FILE_ID {
            return Err(FstError::NotFstFile);
        }

        let version = src.read_u32::<LittleEndian>().map_err(short_read)?;
        if version > FORMAT_VERSION {
            return Err(FstError::VersionTooNew {
                file_version: version,
                reader_version: FORMAT_VERSION,
            });
        }

        // parsed but not validated, the writer always emits the default
        let table_class_type = src.read_u32::<LittleEndian>().map_err(short_read)?;

        let key_length = src.read_i32::<LittleEndian>().map_err(short_read)?;
        if key_length < 0 {
            return Err(FstError::CorruptHeader("negative key length"));
        }
        let nr_of_cols = src.read_i32::<LittleEndian>().map_err(short_read)?;
        if nr_of_cols < 1 {
            return Err(FstError::CorruptHeader("column count must be positive"));
        }
        let nr_of_cols = nr_of_cols as usize;

        let mut key_col_pos = Vec::with_capacity(key_length as usize);
        for _ in 0..key_length {
            let pos = src.read_i32::<LittleEndian>().map_err(short_read)?;
            if pos < 0 || pos as usize >= nr_of_cols {
                return Err(FstError::CorruptHeader("key column position out of range"));
            }
            key_col_pos.push(pos as usize);
        }

        let _next_horz_chunkset = src.read_u64::<LittleEndian>().map_err(short_read)?;
        let _next_vert_chunkset = src.read_u64::<LittleEndian>().map_err(short_read)?;
        let nr_of_rows = src.read_u64::<LittleEndian>().map_err(short_read)?;
        if nr_of_rows == 0 {
            return Err(FstError::CorruptHeader("row count must be positive"));
        }
        if src.read_u32::<LittleEndian>().map_err(short_read)? != version {
            return Err(FstError::CorruptHeader("format version fields disagree"));
        }
        if src.read_u32::<LittleEndian>().map_err(short_read)? != nr_of_cols as u32 {
            return Err(FstError::CorruptHeader("column count fields disagree"));
        }

        for _ in 0..nr_of_cols {
            let _col_attribute_type = src.read_u16::<LittleEndian>().map_err(short_read)?;
        }
        let mut col_types = Vec::with_capacity(nr_of_cols);
        for _ in 0..nr_of_cols {
            let type_id = src.read_u16::<LittleEndian>().map_err(short_read)?;
            col_types.push(
                ColumnType::from_u16(type_id).ok_or(FstError::UnknownColumnType(type_id))?,
            );
        }
        for col_type in &col_types {
            if src.read_u16::<LittleEndian>().map_err(short_read)? != col_type.base_type() {
                return Err(FstError::CorruptHeader(
                    "base type does not match the logical type",
                ));
            }
        }

        Ok(Self {
            version,
            table_class_type,
            key_col_pos,
            nr_of_rows,
            col_types,
        })
    }
}
