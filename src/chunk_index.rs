//! The chunk index and the column-position directory.
//!
//! The index reserves eight chunk slots; only slot 0 is ever used. It is
//! written once as a placeholder before the column bodies and patched in
//! place after them, when the column positions are known.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::FstError;

const CHUNK_SLOTS: usize = 8;

/// Size of the fixed part, before the 8N-byte position directory.
pub(crate) const CHUNK_INDEX_SIZE: u64 = 144;

#[derive(Debug)]
pub(crate) struct ChunkIndex {
    pub chunk_pos: [u64; CHUNK_SLOTS],
    pub chunk_rows: [u64; CHUNK_SLOTS],
    pub nr_of_chunks_per_index_row: u64,
    pub nr_of_chunks: u64,
    /// Absolute offset of each column body
    pub col_positions: Vec<u64>,
}

impl ChunkIndex {
    /// An index with zeroed positions, good for reserving the on-disk
    /// space before the column bodies are written.
    pub(crate) fn placeholder(nr_of_cols: usize) -> Self {
        Self {
            chunk_pos: [0; CHUNK_SLOTS],
            chunk_rows: [0; CHUNK_SLOTS],
            nr_of_chunks_per_index_row: 1,
            nr_of_chunks: 1,
            col_positions: vec![0; nr_of_cols],
        }
    }

    pub(crate) fn write_to<W: Write>(&self, dst: &mut W) -> crate::Result<()> {
        for pos in &self.chunk_pos {
            dst.write_u64::<LittleEndian>(*pos)?;
        }
        for rows in &self.chunk_rows {
            dst.write_u64::<LittleEndian>(*rows)?;
        }
        dst.write_u64::<LittleEndian>(self.nr_of_chunks_per_index_row)?;
        dst.write_u64::<LittleEndian>(self.nr_of_chunks)?;
        for pos in &self.col_positions {
            dst.write_u64::<LittleEndian>(*pos)?;
        }
        Ok(())
    }

    pub(crate) fn read_from<R: Read>(src: &mut R, nr_of_cols: usize) -> crate::Result<Self> {
        let mut chunk_pos = [0u64; CHUNK_SLOTS];
        for pos in &mut chunk_pos {
            *pos = src.read_u64::<LittleEndian>()?;
        }
        let mut chunk_rows = [0u64; CHUNK_SLOTS];
        for rows in &mut chunk_rows {
            *rows = src.read_u64::<LittleEndian>()?;
        }
        let nr_of_chunks_per_index_row = src.read_u64::<LittleEndian>()?;
        let nr_of_chunks = src.read_u64::<LittleEndian>()?;
        if nr_of_chunks > 1 {
            return Err(FstError::MultipleChunksNotSupported(nr_of_chunks));
        }
        if nr_of_chunks == 0 {
            return Err(FstError::CorruptHeader("chunk index holds no chunks"));
        }

        let mut col_positions = Vec::with_capacity(nr_of_cols);
        for _ in 0..nr_of_cols {
            col_positions.push(src.read_u64::<LittleEndian>()?);
        }
        if col_positions[0] != chunk_pos[0] + 8 * nr_of_cols as u64 {
            return Err(FstError::CorruptHeader(
                "first column does not follow the position directory",
            ));
        }
        if col_positions.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(FstError::CorruptHeader(
                "column positions are not strictly increasing",
            ));
        }

        Ok(Self {
            chunk_pos,
            chunk_rows,
            nr_of_chunks_per_index_row,
            nr_of_chunks,
            col_positions,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn sample_index() -> ChunkIndex {
        let mut index = ChunkIndex::placeholder(2);
        index.col_positions = vec![216, 300];
        index.chunk_pos[0] = 200;
        index.chunk_rows[0] = 10;
        index
    }

    #[test]
    fn test_index_round_trip() {
        let mut cursor = Cursor::new(Vec::new());
        sample_index().write_to(&mut cursor).unwrap();
        assert_eq!(cursor.get_ref().len() as u64, CHUNK_INDEX_SIZE + 8 * 2);

        cursor.set_position(0);
        let back = ChunkIndex::read_from(&mut cursor, 2).unwrap();
        assert_eq!(back.nr_of_chunks, 1);
        assert_eq!(back.chunk_pos[0], 200);
        assert_eq!(back.chunk_rows[0], 10);
        assert_eq!(back.col_positions, vec![216, 300]);
    }

    #[test]
    fn test_multiple_chunks_are_rejected() {
        let mut index = sample_index();
        index.nr_of_chunks = 2;
        let mut cursor = Cursor::new(Vec::new());
        index.write_to(&mut cursor).unwrap();

        cursor.set_position(0);
        let err = ChunkIndex::read_from(&mut cursor, 2).unwrap_err();
        assert!(matches!(err, FstError::MultipleChunksNotSupported(2)));
    }

    #[test]
    fn test_non_increasing_positions_are_rejected() {
        let mut index = sample_index();
        index.col_positions = vec![216, 216];
        let mut cursor = Cursor::new(Vec::new());
        index.write_to(&mut cursor).unwrap();

        cursor.set_position(0);
        let err = ChunkIndex::read_from(&mut cursor, 2).unwrap_err();
        assert!(matches!(err, FstError::CorruptHeader(_)));
    }
}
