//! The table writer.
//!
//! A table is written in a single pass: table-meta and chunkset header,
//! the column-name block, a placeholder chunk index, then every column
//! body. The writer records each body's start position and finally seeks
//! back to patch the header region and the chunk index in place.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::chunk_index::{ChunkIndex, CHUNK_INDEX_SIZE};
use crate::compression::Compression;
use crate::header::FileHeader;
use crate::table::{Column, ColumnType, Table};
use crate::{primitive_block, string_block, FstError};

/// Writes `table` to `dst` in the fst format.
///
/// `compression_level` ranges over `0..=100`: 0 stores columns
/// uncompressed, 1 to 50 select LZ4 and 51 to 100 select ZSTD with
/// increasing effort. The destination may be positioned anywhere; the
/// table is written from the current position and the destination is
/// left at the end of the written data.
pub fn write_fst<W: Write + Seek>(
    mut dst: W,
    table: &Table,
    compression_level: u8,
) -> crate::Result<()> {
    let compression = Compression::from_level(compression_level)?;
    let nr_of_cols = table.nr_of_cols();
    if nr_of_cols == 0 || table.nr_of_rows() == 0 {
        return Err(FstError::EmptyTable);
    }

    let start_pos = dst.seek(SeekFrom::Current(0))?;
    let header = FileHeader::new(table);
    header.write_to(&mut dst)?;

    // column names, never compressed
    let names: Vec<Option<&str>> = table.col_names().iter().map(|n| Some(n.as_str())).collect();
    string_block::write_string_block(&mut dst, &names, &Compression::NONE)?;

    let mut index = ChunkIndex::placeholder(nr_of_cols);
    index.write_to(&mut dst)?;

    for (c, column) in table.columns().iter().enumerate() {
        index.col_positions[c] = dst.seek(SeekFrom::Current(0))?;
        write_column(&mut dst, column, &compression)?;
    }

    index.chunk_pos[0] = index.col_positions[0] - 8 * nr_of_cols as u64;
    index.chunk_rows[0] = table.nr_of_rows() as u64;

    let end_pos = dst.seek(SeekFrom::Current(0))?;
    dst.seek(SeekFrom::Start(start_pos))?;
    header.write_to(&mut dst)?;
    dst.seek(SeekFrom::Start(index.chunk_pos[0] - CHUNK_INDEX_SIZE))?;
    index.write_to(&mut dst)?;
    dst.seek(SeekFrom::Start(end_pos))?;
    dst.flush()?;
    Ok(())
}

/// Writes `table` to a new file at `path`. See [`write_fst`].
pub fn write_fst_file<P: AsRef<Path>>(
    path: P,
    table: &Table,
    compression_level: u8,
) -> crate::Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| FstError::FailedToOpen {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_fst(BufWriter::new(file), table, compression_level)
}

fn write_column<W: Write + Seek>(
    dst: &mut W,
    column: &Column,
    compression: &Compression,
) -> crate::Result<()> {
    match column {
        Column::Character(values) => {
            let refs: Vec<Option<&str>> = values.iter().map(|v| v.as_deref()).collect();
            string_block::write_string_block(dst, &refs, compression)
        }
        Column::Factor { codes, levels } => {
            primitive_block::write_i32_block(dst, ColumnType::Int32, codes, compression)?;
            let refs: Vec<Option<&str>> = levels.iter().map(|l| Some(l.as_str())).collect();
            string_block::write_string_block(dst, &refs, compression)
        }
        Column::Int32(values) => {
            primitive_block::write_i32_block(dst, ColumnType::Int32, values, compression)
        }
        Column::Double64(values) => primitive_block::write_f64_block(dst, values, compression),
        Column::Logical(values) => primitive_block::write_logical_block(dst, values, compression),
    }
}
