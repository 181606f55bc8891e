//! RIFF container handling
//!
//! A RIFF file is a little-endian sequence of (four-byte id, u32 size,
//! payload) chunks inside a `RIFF`/`WAVE` envelope. This module walks the
//! container and hands each chunk's declared extent to the per-chunk parsers
//! in [`chunks`]; assembly of an output container lives in [`writer`].

pub mod chunks;
pub mod cursor;
pub mod writer;

pub use cursor::ByteCursor;
pub use writer::RiffWriter;

use crate::error::{Error, Result};
use tracing::debug;

/// Outer container magic
pub const RIFF_MAGIC: [u8; 4] = *b"RIFF";
/// Wave form type
pub const WAVE_MAGIC: [u8; 4] = *b"WAVE";
/// Format chunk
pub const FMT_CHUNK: [u8; 4] = *b"fmt ";
/// Sample data chunk
pub const DATA_CHUNK: [u8; 4] = *b"data";
/// Sampler (loop point) chunk
pub const SMPL_CHUNK: [u8; 4] = *b"smpl";
/// LIST chunk (INFO / adtl sub-types)
pub const LIST_CHUNK: [u8; 4] = *b"LIST";
/// Embedded ID3v2 tag chunk
pub const ID3_CHUNK: [u8; 4] = *b"id3 ";
/// Instrument chunk
pub const INST_CHUNK: [u8; 4] = *b"inst";
/// Display (clipboard image) chunk
pub const DISP_CHUNK: [u8; 4] = *b"DISP";
/// LIST sub-type for INFO entries
pub const INFO_TYPE: [u8; 4] = *b"INFO";
/// LIST sub-type for associated-data lists
pub const ADTL_TYPE: [u8; 4] = *b"adtl";

/// One top-level chunk located during the walk.
///
/// `offset` addresses the payload (the byte after the size field) within the
/// original file buffer; `size` is the declared payload size, which may
/// overrun the buffer on malformed files. Parsers validate their own extent
/// through [`ChunkEntry::payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkEntry {
    /// Four-byte chunk id as it appears in the file
    pub id: [u8; 4],
    /// Byte offset of the payload within the file buffer
    pub offset: usize,
    /// Declared payload size in bytes
    pub size: u32,
}

impl ChunkEntry {
    /// The chunk's payload slice, validated against the file buffer
    pub fn payload<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        let need = self.size as usize;
        data.get(self.offset..self.offset + need)
            .ok_or(Error::Truncated {
                need,
                have: data.len().saturating_sub(self.offset),
            })
    }
}

/// Enumerate the top-level chunks of every `RIFF`/`WAVE` block in `data`.
///
/// Chunks are returned in file order. A zero chunk id terminates the walk
/// (tolerating zero-padded tails); concatenated `RIFF` blocks are walked one
/// after another, and anything else where a block header was expected is a
/// format error.
pub fn walk_chunks(data: &[u8]) -> Result<Vec<ChunkEntry>> {
    let mut cursor = ByteCursor::new(data);
    let mut entries = Vec::new();

    while cursor.remaining() > 0 {
        let magic = cursor.read_array::<4>()?;
        if magic != RIFF_MAGIC {
            return Err(Error::bad_format("missing RIFF header"));
        }
        let outer_size = cursor.read_u32_le()? as usize;
        let form = cursor.read_array::<4>()?;
        if form != WAVE_MAGIC {
            return Err(Error::bad_format("missing WAVE form type"));
        }

        // outer_size counts from after its own field, so the chunk region
        // ends 8 + outer_size bytes into the block.
        let end = (cursor.position() - 4)
            .saturating_add(outer_size)
            .min(data.len());
        while cursor.position() < end {
            let id = cursor.read_array::<4>()?;
            if id == [0, 0, 0, 0] {
                // Zero-padded tail; nothing meaningful follows.
                return Ok(entries);
            }
            let size = cursor.read_u32_le()?;
            entries.push(ChunkEntry {
                id,
                offset: cursor.position(),
                size,
            });
            debug!(
                id = %String::from_utf8_lossy(&id),
                size,
                offset = cursor.position(),
                "chunk"
            );
            cursor.skip(size as usize);
        }
    }

    Ok(entries)
}
