//! The table reader.
//!
//! Reading is two-phase. [`read_metadata`] parses the header and the
//! column-name block and touches nothing after them; [`FstReader`] keeps
//! that metadata and serves any number of [`read_range`] calls on the
//! same source, each of which decodes only the selected columns over the
//! requested rows.
//!
//! [`read_range`]: FstReader::read_range

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::chunk_index::ChunkIndex;
use crate::header::FileHeader;
use crate::table::{Column, ColumnType, Table};
use crate::{primitive_block, string_block, FstError};

/// Schema information of an fst file, available without decoding any
/// column body.
#[derive(Debug, Clone)]
pub struct Metadata {
    /// Format version the file was written with
    pub version: u32,
    pub nr_of_rows: u64,
    pub col_names: Vec<String>,
    pub col_types: Vec<ColumnType>,
    /// 0-based positions of the key columns, order significant
    pub key_col_pos: Vec<usize>,
}

impl Metadata {
    pub fn nr_of_cols(&self) -> usize {
        self.col_types.len()
    }
}

/// Parses the header and column names of an fst file.
///
/// The source is left at the end of the name block, right before the
/// chunk index; no byte at or after the chunk index is read.
pub fn read_metadata<R: Read + Seek>(src: &mut R) -> crate::Result<Metadata> {
    let header = FileHeader::read_from(src)?;
    let nr_of_cols = header.nr_of_cols();
    let names = string_block::read_string_block(src, nr_of_cols as u64, 0, nr_of_cols)?;
    let col_names = names
        .into_iter()
        .map(|name| name.ok_or(FstError::CorruptHeader("missing column name")))
        .collect::<crate::Result<Vec<_>>>()?;
    Ok(Metadata {
        version: header.version,
        nr_of_rows: header.nr_of_rows,
        col_names,
        col_types: header.col_types,
        key_col_pos: header.key_col_pos,
    })
}

/// Reads tables or slices of tables from an fst source.
#[derive(Debug)]
pub struct FstReader<R: Read + Seek> {
    src: R,
    metadata: Metadata,
    /// Position of the chunk index, cached between range reads
    index_pos: u64,
}

impl FstReader<BufReader<File>> {
    /// Opens an fst file and parses its metadata.
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FstError::FailedToOpen {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> FstReader<R> {
    /// Creates a reader from a source positioned at the start of fst
    /// data, parsing the metadata eagerly.
    pub fn new(mut src: R) -> crate::Result<Self> {
        let metadata = read_metadata(&mut src)?;
        let index_pos = src.seek(SeekFrom::Current(0))?;
        Ok(Self {
            src,
            metadata,
            index_pos,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Reads the whole table.
    pub fn read_all(&mut self) -> crate::Result<Table> {
        self.read_range(None, 1, None)
    }

    /// Reads a slice of the table.
    ///
    /// `selection` picks columns by name, in the given order; `None`
    /// selects every column in file order. `start_row` is 1-based;
    /// `end_row` is the inclusive last row, `None` reads to the end and
    /// values past the end are clamped.
    ///
    /// The returned table's key positions are the longest prefix of the
    /// stored key columns that the selection kept, mapped to positions
    /// within the selection.
    pub fn read_range(
        &mut self,
        selection: Option<&[&str]>,
        start_row: u64,
        end_row: Option<u64>,
    ) -> crate::Result<Table> {
        let metadata = &self.metadata;
        let nr_of_rows = metadata.nr_of_rows;

        self.src.seek(SeekFrom::Start(self.index_pos))?;
        let index = ChunkIndex::read_from(&mut self.src, metadata.nr_of_cols())?;
        if index.chunk_rows[0] != nr_of_rows {
            return Err(FstError::CorruptHeader("chunk row count disagrees"));
        }

        // column selection, caller order preserved, first match wins
        let col_indices: Vec<usize> = match selection {
            None => (0..metadata.nr_of_cols()).collect(),
            Some(names) => names
                .iter()
                .map(|name| {
                    metadata
                        .col_names
                        .iter()
                        .position(|stored| stored == name)
                        .ok_or_else(|| FstError::ColumnNotFound((*name).to_string()))
                })
                .collect::<crate::Result<_>>()?,
        };

        if start_row == 0 {
            return Err(FstError::FromRowMustBePositive);
        }
        let first_row = start_row - 1;
        if first_row >= nr_of_rows {
            return Err(FstError::RowSelectionOutOfRange {
                start_row,
                nr_of_rows,
            });
        }
        let length = match end_row {
            None => nr_of_rows - first_row,
            Some(end) if end < start_row => {
                return Err(FstError::IncorrectRowRange {
                    start_row,
                    end_row: end,
                });
            }
            Some(end) => (end - first_row).min(nr_of_rows - first_row),
        };
        let first_row = first_row as usize;
        let length = length as usize;

        let mut col_names = Vec::with_capacity(col_indices.len());
        let mut columns = Vec::with_capacity(col_indices.len());
        for &col in &col_indices {
            self.src.seek(SeekFrom::Start(index.col_positions[col]))?;
            columns.push(read_column(
                &mut self.src,
                metadata.col_types[col],
                nr_of_rows,
                first_row,
                length,
            )?);
            col_names.push(metadata.col_names[col].clone());
        }

        // keys survive as long as their prefix stays selected
        let mut key_index = Vec::new();
        for &key_pos in &metadata.key_col_pos {
            match col_indices.iter().position(|&c| c == key_pos) {
                Some(projected) => key_index.push(projected),
                None => break,
            }
        }

        Ok(Table::from_parts(col_names, columns, key_index))
    }

    pub fn get(&self) -> &R {
        &self.src
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.src
    }

    pub fn into_inner(self) -> R {
        self.src
    }
}

fn read_column<R: Read + Seek>(
    src: &mut R,
    col_type: ColumnType,
    nr_of_rows: u64,
    first_row: usize,
    length: usize,
) -> crate::Result<Column> {
    match col_type {
        ColumnType::Character => Ok(Column::Character(string_block::read_string_block(
            src, nr_of_rows, first_row, length,
        )?)),
        ColumnType::Factor => {
            let (codes, codes_end) = primitive_block::read_i32_block(
                src,
                ColumnType::Int32,
                nr_of_rows,
                first_row,
                length,
            )?;
            src.seek(SeekFrom::Start(codes_end))?;
            let levels = string_block::read_string_block_all(src)?
                .into_iter()
                .map(|level| {
                    level.ok_or_else(|| {
                        FstError::CorruptBlock("missing factor level name".to_string())
                    })
                })
                .collect::<crate::Result<Vec<_>>>()?;
            Ok(Column::Factor { codes, levels })
        }
        ColumnType::Int32 => {
            let (values, _) = primitive_block::read_i32_block(
                src,
                ColumnType::Int32,
                nr_of_rows,
                first_row,
                length,
            )?;
            Ok(Column::Int32(values))
        }
        ColumnType::Double64 => Ok(Column::Double64(primitive_block::read_f64_block(
            src, nr_of_rows, first_row, length,
        )?)),
        ColumnType::Logical => Ok(Column::Logical(primitive_block::read_logical_block(
            src, nr_of_rows, first_row, length,
        )?)),
    }
}
