//! Codecs for the fixed-width column types: int32, double and logical.
//!
//! All three share the row-group frame of [`crate::block`]; a group's raw
//! payload is the little-endian element data and nothing else. Missing
//! values travel in-band ([`MISSING_INT`] for int32 and for the i32
//! encoding of logicals, the reserved NaN for doubles).

use std::io::{Read, Seek, Write};

use byteorder::{ByteOrder, LittleEndian};

use crate::block::{self, BlockInfo};
use crate::compression::Compression;
use crate::table::{ColumnType, MISSING_INT};
use crate::FstError;

/// Writes an int32 body. Factor level codes use `block_type`
/// [`ColumnType::Int32`] as well; logicals pass [`ColumnType::Logical`].
pub(crate) fn write_i32_block<W: Write + Seek>(
    dst: &mut W,
    block_type: ColumnType,
    values: &[i32],
    compression: &Compression,
) -> crate::Result<()> {
    block::write_block(dst, block_type, compression, values.len(), |rows| {
        let mut raw = vec![0u8; rows.len() * 4];
        LittleEndian::write_i32_into(&values[rows], &mut raw);
        Ok(raw)
    })
}

pub(crate) fn write_f64_block<W: Write + Seek>(
    dst: &mut W,
    values: &[f64],
    compression: &Compression,
) -> crate::Result<()> {
    block::write_block(
        dst,
        ColumnType::Double64,
        compression,
        values.len(),
        |rows| {
            let mut raw = vec![0u8; rows.len() * 8];
            LittleEndian::write_f64_into(&values[rows], &mut raw);
            Ok(raw)
        },
    )
}

pub(crate) fn write_logical_block<W: Write + Seek>(
    dst: &mut W,
    values: &[Option<bool>],
    compression: &Compression,
) -> crate::Result<()> {
    block::write_block(
        dst,
        ColumnType::Logical,
        compression,
        values.len(),
        |rows| {
            let mut raw = vec![0u8; rows.len() * 4];
            for (i, value) in values[rows].iter().enumerate() {
                let encoded = match value {
                    Some(true) => 1,
                    Some(false) => 0,
                    None => MISSING_INT,
                };
                LittleEndian::write_i32(&mut raw[i * 4..i * 4 + 4], encoded);
            }
            Ok(raw)
        },
    )
}

fn check_rows(info: &BlockInfo, expected_rows: u64) -> crate::Result<()> {
    if info.nr_of_rows != expected_rows {
        return Err(FstError::CorruptBlock(format!(
            "block holds {} rows but the chunk has {}",
            info.nr_of_rows, expected_rows
        )));
    }
    Ok(())
}

/// Decodes `length` int32 values starting at `first_row`.
///
/// Also returns the absolute offset of the first byte after the block,
/// which the factor decoder uses to locate the level names.
pub(crate) fn read_i32_block<R: Read + Seek>(
    src: &mut R,
    block_type: ColumnType,
    expected_rows: u64,
    first_row: usize,
    length: usize,
) -> crate::Result<(Vec<i32>, u64)> {
    let info = block::read_block_info(src, block_type)?;
    check_rows(&info, expected_rows)?;

    let mut out = vec![0i32; length];
    block::for_each_group(src, &info, first_row, length, |rows, raw| {
        if raw.len() != rows.len() * 4 {
            return Err(FstError::CorruptBlock(format!(
                "int32 group of {} rows holds {} bytes",
                rows.len(),
                raw.len()
            )));
        }
        let take_start = first_row.max(rows.start);
        let take_end = (first_row + length).min(rows.end);
        let bytes = &raw[(take_start - rows.start) * 4..(take_end - rows.start) * 4];
        LittleEndian::read_i32_into(bytes, &mut out[take_start - first_row..take_end - first_row]);
        Ok(())
    })?;
    Ok((out, info.end_pos()))
}

pub(crate) fn read_f64_block<R: Read + Seek>(
    src: &mut R,
    expected_rows: u64,
    first_row: usize,
    length: usize,
) -> crate::Result<Vec<f64>> {
    let info = block::read_block_info(src, ColumnType::Double64)?;
    check_rows(&info, expected_rows)?;

    let mut out = vec![0f64; length];
    block::for_each_group(src, &info, first_row, length, |rows, raw| {
        if raw.len() != rows.len() * 8 {
            return Err(FstError::CorruptBlock(format!(
                "double group of {} rows holds {} bytes",
                rows.len(),
                raw.len()
            )));
        }
        let take_start = first_row.max(rows.start);
        let take_end = (first_row + length).min(rows.end);
        let bytes = &raw[(take_start - rows.start) * 8..(take_end - rows.start) * 8];
        LittleEndian::read_f64_into(bytes, &mut out[take_start - first_row..take_end - first_row]);
        Ok(())
    })?;
    Ok(out)
}

pub(crate) fn read_logical_block<R: Read + Seek>(
    src: &mut R,
    expected_rows: u64,
    first_row: usize,
    length: usize,
) -> crate::Result<Vec<Option<bool>>> {
    let (encoded, _) = read_i32_block(src, ColumnType::Logical, expected_rows, first_row, length)?;
    encoded
        .into_iter()
        .map(|value| match value {
            0 => Ok(Some(false)),
            1 => Ok(Some(true)),
            MISSING_INT => Ok(None),
            other => Err(FstError::CorruptBlock(format!(
                "{} is not a logical value",
                other
            ))),
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::block::ROWS_PER_GROUP;
    use std::io::Cursor;

    #[test]
    fn test_i32_partial_read_across_groups() {
        let values: Vec<i32> = (0..(ROWS_PER_GROUP as i32 * 2)).collect();
        let mut cursor = Cursor::new(Vec::new());
        write_i32_block(
            &mut cursor,
            ColumnType::Int32,
            &values,
            &Compression::from_level(20).unwrap(),
        )
        .unwrap();

        cursor.set_position(0);
        let first_row = ROWS_PER_GROUP - 2;
        let (out, end) =
            read_i32_block(&mut cursor, ColumnType::Int32, values.len() as u64, first_row, 4)
                .unwrap();
        assert_eq!(out, &values[first_row..first_row + 4]);
        assert_eq!(end, cursor.get_ref().len() as u64);
    }

    #[test]
    fn test_logical_round_trip() {
        let values = vec![Some(true), Some(false), None, Some(true)];
        let mut cursor = Cursor::new(Vec::new());
        write_logical_block(&mut cursor, &values, &Compression::NONE).unwrap();

        cursor.set_position(0);
        let out = read_logical_block(&mut cursor, 4, 0, 4).unwrap();
        assert_eq!(out, values);
    }

    #[test]
    fn test_row_count_mismatch_is_rejected() {
        let mut cursor = Cursor::new(Vec::new());
        write_i32_block(&mut cursor, ColumnType::Int32, &[1, 2, 3], &Compression::NONE).unwrap();
        cursor.set_position(0);
        let err = read_i32_block(&mut cursor, ColumnType::Int32, 4, 0, 3).unwrap_err();
        assert!(matches!(err, FstError::CorruptBlock(_)));
    }
}
