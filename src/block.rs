//! Row-group framing shared by all column bodies.
//!
//! A column body starts with a small header, followed by a directory of
//! per-group byte sizes and the groups themselves. Each group is a
//! self-contained unit of [`ROWS_PER_GROUP`] rows (the last one may be
//! shorter), so a row-range read seeks straight to the first overlapping
//! group and decodes nothing outside the range.

use std::io::{Read, Seek, SeekFrom, Write};
use std::ops::Range;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::compression::{self, Codec, Compression};
use crate::table::ColumnType;
use crate::FstError;

/// Number of rows per compression group.
pub(crate) const ROWS_PER_GROUP: usize = 4096;

const GROUP_HEADER_SIZE: u64 = 12;

fn nr_of_groups(rows: u64, rows_per_group: u64) -> u64 {
    if rows == 0 {
        0
    } else {
        (rows - 1) / rows_per_group + 1
    }
}

/// Writes one column body: block header, group-size directory, groups.
///
/// `group_payload` is called once per group with the group's row range
/// and returns the raw (uncompressed) payload bytes for those rows. The
/// directory is written as a placeholder and patched once the encoded
/// group sizes are known; the destination is left positioned after the
/// block.
pub(crate) fn write_block<W, F>(
    dst: &mut W,
    block_type: ColumnType,
    compression: &Compression,
    nr_of_rows: usize,
    mut group_payload: F,
) -> crate::Result<()>
where
    W: Write + Seek,
    F: FnMut(Range<usize>) -> crate::Result<Vec<u8>>,
{
    dst.write_u16::<LittleEndian>(block_type.into())?;
    dst.write_u16::<LittleEndian>(compression.codec() as u16)?;
    dst.write_u64::<LittleEndian>(nr_of_rows as u64)?;
    dst.write_u32::<LittleEndian>(ROWS_PER_GROUP as u32)?;

    let n_groups = nr_of_groups(nr_of_rows as u64, ROWS_PER_GROUP as u64) as usize;
    let directory_pos = dst.seek(SeekFrom::Current(0))?;
    for _ in 0..n_groups {
        dst.write_u64::<LittleEndian>(0)?;
    }

    let mut group_sizes = Vec::with_capacity(n_groups);
    for g in 0..n_groups {
        let start = g * ROWS_PER_GROUP;
        let end = (start + ROWS_PER_GROUP).min(nr_of_rows);
        let raw = group_payload(start..end)?;
        let raw_size = raw.len();

        let (stored, codec) = if compression.codec() == Codec::None {
            (raw, Codec::None)
        } else {
            let compressed = compression.compress(&raw)?;
            if compressed.len() < raw_size {
                (compressed, compression.codec())
            } else {
                // incompressible group, keep it raw
                (raw, Codec::None)
            }
        };

        dst.write_u32::<LittleEndian>(stored.len() as u32)?;
        dst.write_u32::<LittleEndian>(raw_size as u32)?;
        dst.write_u16::<LittleEndian>(codec as u16)?;
        dst.write_u16::<LittleEndian>(0)?;
        dst.write_all(&stored)?;
        group_sizes.push(GROUP_HEADER_SIZE + stored.len() as u64);
    }

    let end_pos = dst.seek(SeekFrom::Current(0))?;
    dst.seek(SeekFrom::Start(directory_pos))?;
    for size in &group_sizes {
        dst.write_u64::<LittleEndian>(*size)?;
    }
    dst.seek(SeekFrom::Start(end_pos))?;
    Ok(())
}

/// Parsed block header and group directory.
///
/// The source position **must** be at the start of the block; after the
/// parse it is at the start of the first group, which [`BlockInfo::end_pos`]
/// uses as its base.
#[derive(Debug)]
pub(crate) struct BlockInfo {
    pub nr_of_rows: u64,
    pub rows_per_group: u32,
    pub group_sizes: Vec<u64>,
    /// Absolute offset of the first group
    pub groups_start: u64,
}

impl BlockInfo {
    /// Absolute offset of the first byte after the block.
    pub(crate) fn end_pos(&self) -> u64 {
        self.groups_start + self.group_sizes.iter().sum::<u64>()
    }
}

pub(crate) fn read_block_info<R: Read + Seek>(
    src: &mut R,
    expected_type: ColumnType,
) -> crate::Result<BlockInfo> {
    let block_type = src.read_u16::<LittleEndian>()?;
    if block_type != u16::from(expected_type) {
        return Err(FstError::CorruptBlock(format!(
            "block type id {} where {} was expected",
            block_type,
            u16::from(expected_type)
        )));
    }
    let _requested_codec = src.read_u16::<LittleEndian>()?;
    let nr_of_rows = src.read_u64::<LittleEndian>()?;
    let rows_per_group = src.read_u32::<LittleEndian>()?;
    if nr_of_rows > 0 && rows_per_group == 0 {
        return Err(FstError::CorruptBlock("zero rows per group".to_string()));
    }

    let n_groups = nr_of_groups(nr_of_rows, u64::from(rows_per_group.max(1))) as usize;
    let mut group_sizes = Vec::with_capacity(n_groups);
    for _ in 0..n_groups {
        group_sizes.push(src.read_u64::<LittleEndian>()?);
    }
    let groups_start = src.seek(SeekFrom::Current(0))?;
    Ok(BlockInfo {
        nr_of_rows,
        rows_per_group,
        group_sizes,
        groups_start,
    })
}

/// Calls `f` once per group overlapping `first_row .. first_row + length`,
/// with the group's row range and its decompressed payload.
pub(crate) fn for_each_group<R, F>(
    src: &mut R,
    info: &BlockInfo,
    first_row: usize,
    length: usize,
    mut f: F,
) -> crate::Result<()>
where
    R: Read + Seek,
    F: FnMut(Range<usize>, &[u8]) -> crate::Result<()>,
{
    if length == 0 {
        return Ok(());
    }
    let rows_per_group = info.rows_per_group as usize;
    let first_group = first_row / rows_per_group;
    let last_group = (first_row + length - 1) / rows_per_group;
    if last_group >= info.group_sizes.len() {
        return Err(FstError::CorruptBlock(format!(
            "row range ends in group {} but the block has {}",
            last_group,
            info.group_sizes.len()
        )));
    }

    let skipped: u64 = info.group_sizes[..first_group].iter().sum();
    src.seek(SeekFrom::Start(info.groups_start + skipped))?;

    for g in first_group..=last_group {
        let stored_size = src.read_u32::<LittleEndian>()? as usize;
        let raw_size = src.read_u32::<LittleEndian>()? as usize;
        let codec_id = src.read_u16::<LittleEndian>()?;
        let _reserved = src.read_u16::<LittleEndian>()?;
        let codec = Codec::from_u16(codec_id)
            .ok_or_else(|| FstError::CorruptBlock(format!("unknown codec id {}", codec_id)))?;

        let mut stored = vec![0u8; stored_size];
        src.read_exact(&mut stored)?;

        let rows_start = g * rows_per_group;
        let rows_end = (rows_start + rows_per_group).min(info.nr_of_rows as usize);
        if codec == Codec::None {
            if stored_size != raw_size {
                return Err(FstError::CorruptBlock(format!(
                    "raw group stores {} bytes but announces {}",
                    stored_size, raw_size
                )));
            }
            f(rows_start..rows_end, &stored)?;
        } else {
            let raw = compression::decompress(codec, &stored, raw_size)?;
            f(rows_start..rows_end, &raw)?;
        }
    }
    Ok(())
}
