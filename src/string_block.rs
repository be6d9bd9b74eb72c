//! Codec for variable-length string columns.
//!
//! A group's raw payload is a table of cumulative u32 end offsets, one
//! per row, followed by the concatenated string bytes. Bit 31 of an
//! offset flags the row as missing; a missing row contributes no bytes,
//! so the masked offsets stay cumulative and missing is distinct from
//! empty. Embedded NUL bytes are ordinary data.

use std::io::{Read, Seek, Write};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::block::{self, BlockInfo};
use crate::compression::Compression;
use crate::table::ColumnType;
use crate::FstError;

const MISSING_FLAG: u32 = 0x8000_0000;
const OFFSET_MASK: u32 = 0x7FFF_FFFF;

pub(crate) fn write_string_block<W: Write + Seek>(
    dst: &mut W,
    values: &[Option<&str>],
    compression: &Compression,
) -> crate::Result<()> {
    block::write_block(
        dst,
        ColumnType::Character,
        compression,
        values.len(),
        |rows| {
            let slice = &values[rows];
            let data_len: usize = slice.iter().flatten().map(|s| s.len()).sum();
            if data_len > OFFSET_MASK as usize {
                return Err(FstError::IoError(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "string row group exceeds 2 GiB",
                )));
            }

            let mut raw = Vec::with_capacity(slice.len() * 4 + data_len);
            let mut end = 0u32;
            for value in slice {
                match value {
                    Some(s) => {
                        end += s.len() as u32;
                        raw.write_u32::<LittleEndian>(end)?;
                    }
                    None => raw.write_u32::<LittleEndian>(end | MISSING_FLAG)?,
                }
            }
            for s in slice.iter().flatten() {
                raw.extend_from_slice(s.as_bytes());
            }
            Ok(raw)
        },
    )
}

fn decode_groups<R: Read + Seek>(
    src: &mut R,
    info: &BlockInfo,
    first_row: usize,
    length: usize,
) -> crate::Result<Vec<Option<String>>> {
    let mut out = Vec::with_capacity(length);
    block::for_each_group(src, info, first_row, length, |rows, raw| {
        let table_size = rows.len() * 4;
        if raw.len() < table_size {
            return Err(FstError::CorruptBlock(format!(
                "string group of {} rows holds only {} bytes",
                rows.len(),
                raw.len()
            )));
        }
        let (offsets, data) = raw.split_at(table_size);

        let take_start = first_row.max(rows.start);
        let take_end = (first_row + length).min(rows.end);
        let skip = take_start - rows.start;
        let mut prev = if skip == 0 {
            0
        } else {
            (LittleEndian::read_u32(&offsets[(skip - 1) * 4..skip * 4]) & OFFSET_MASK) as usize
        };

        for i in skip..take_end - rows.start {
            let entry = LittleEndian::read_u32(&offsets[i * 4..(i + 1) * 4]);
            let end = (entry & OFFSET_MASK) as usize;
            if end < prev || end > data.len() {
                return Err(FstError::CorruptBlock(
                    "string offsets are not cumulative".to_string(),
                ));
            }
            if entry & MISSING_FLAG != 0 {
                if end != prev {
                    return Err(FstError::CorruptBlock(
                        "missing string with a nonzero extent".to_string(),
                    ));
                }
                out.push(None);
            } else {
                let s = String::from_utf8(data[prev..end].to_vec()).map_err(|_| {
                    FstError::CorruptBlock("string data is not valid utf-8".to_string())
                })?;
                out.push(Some(s));
                prev = end;
            }
        }
        Ok(())
    })?;
    Ok(out)
}

/// Decodes `length` strings starting at `first_row` from a block whose
/// row count must match the chunk's.
pub(crate) fn read_string_block<R: Read + Seek>(
    src: &mut R,
    expected_rows: u64,
    first_row: usize,
    length: usize,
) -> crate::Result<Vec<Option<String>>> {
    let info = block::read_block_info(src, ColumnType::Character)?;
    if info.nr_of_rows != expected_rows {
        return Err(FstError::CorruptBlock(format!(
            "string block holds {} rows but the chunk has {}",
            info.nr_of_rows, expected_rows
        )));
    }
    decode_groups(src, &info, first_row, length)
}

/// Decodes a whole string block whose row count is only known from its
/// own header. Factor level names are read this way.
pub(crate) fn read_string_block_all<R: Read + Seek>(
    src: &mut R,
) -> crate::Result<Vec<Option<String>>> {
    let info = block::read_block_info(src, ColumnType::Character)?;
    let rows = info.nr_of_rows as usize;
    decode_groups(src, &info, 0, rows)
}
