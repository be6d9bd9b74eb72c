//! Block-level compression collaborators.
//!
//! Columns are compressed one row group at a time; this module maps the
//! user-facing compression level to a codec and wraps the LZ4 and ZSTD
//! block primitives.

use crate::FstError;

/// On-disk codec id, stored per block (requested) and per group (effective).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Codec {
    None = 0,
    Lz4 = 1,
    Zstd = 2,
}

impl Codec {
    pub(crate) fn from_u16(t: u16) -> Option<Self> {
        match t {
            0 => Some(Codec::None),
            1 => Some(Codec::Lz4),
            2 => Some(Codec::Zstd),
            _ => None,
        }
    }
}

/// Compression settings derived from the `0..=100` level of the write call.
///
/// Level 0 disables compression, 1..=50 select LZ4 and 51..=100 select
/// ZSTD with an inner level ramping from 1 to 19.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Compression {
    codec: Codec,
    zstd_level: i32,
}

impl Compression {
    /// Compression disabled, used for the column-name block.
    pub(crate) const NONE: Compression = Compression {
        codec: Codec::None,
        zstd_level: 0,
    };

    pub(crate) fn from_level(level: u8) -> crate::Result<Self> {
        let codec = match level {
            0 => Codec::None,
            1..=50 => Codec::Lz4,
            51..=100 => Codec::Zstd,
            _ => return Err(FstError::InvalidCompressionLevel(level)),
        };
        let zstd_level = 1 + (i32::from(level.saturating_sub(51)) * 18) / 49;
        Ok(Self { codec, zstd_level })
    }

    pub(crate) fn codec(&self) -> Codec {
        self.codec
    }

    /// Compresses one group payload with the requested codec.
    ///
    /// Must not be called when the codec is [`Codec::None`].
    pub(crate) fn compress(&self, raw: &[u8]) -> crate::Result<Vec<u8>> {
        match self.codec {
            Codec::None => Ok(raw.to_vec()),
            Codec::Lz4 => Ok(lz4_flex::compress(raw)),
            Codec::Zstd => Ok(zstd::bulk::compress(raw, self.zstd_level)?),
        }
    }
}

/// Decompresses one group payload and checks the announced raw size.
pub(crate) fn decompress(codec: Codec, stored: &[u8], raw_size: usize) -> crate::Result<Vec<u8>> {
    let raw = match codec {
        Codec::None => stored.to_vec(),
        Codec::Lz4 => lz4_flex::decompress(stored, raw_size)
            .map_err(|e| FstError::CorruptBlock(format!("lz4: {}", e)))?,
        Codec::Zstd => zstd::bulk::decompress(stored, raw_size)
            .map_err(|e| FstError::CorruptBlock(format!("zstd: {}", e)))?,
    };
    if raw.len() != raw_size {
        return Err(FstError::CorruptBlock(format!(
            "group decompressed to {} bytes, expected {}",
            raw.len(),
            raw_size
        )));
    }
    Ok(raw)
}
