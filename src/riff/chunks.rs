//! Per-chunk parsers
//!
//! Each parser takes the chunk's payload slice (already located by the
//! walker) and produces a typed value. Parsers never read outside their
//! slice; a declared length that does not fit reports `Truncated`.

use crate::error::{Error, Result};
use crate::riff::cursor::ByteCursor;
use crate::riff::{ADTL_TYPE, INFO_TYPE};
use crate::wav::format::WavFormat;
use crate::wav::meta::{DispImage, Id3Frame, InfoEntry, Instrument, LoopPoint};

/// Parse a `fmt ` chunk payload.
///
/// Only the 16 PCM-defined bytes are interpreted; extension bytes are
/// ignored.
pub fn parse_fmt(payload: &[u8]) -> Result<WavFormat> {
    let mut cur = ByteCursor::new(payload);
    let tag = cur.read_u16_le()?.into();
    let channels = cur.read_u16_le()?;
    let sample_rate = cur.read_u32_le()?;
    let byte_rate = cur.read_u32_le()?;
    let block_align = cur.read_u16_le()?;
    let bits_per_sample = cur.read_u16_le()?;

    Ok(WavFormat {
        tag,
        channels,
        sample_rate,
        byte_rate,
        block_align,
        bits_per_sample,
    })
}

/// Parse a `data` chunk payload: the interleaved sample bytes, copied
/// verbatim. The copy is grown with fallible allocation so an absurd
/// payload maps to `OutOfMemory` instead of an abort.
pub fn parse_data(payload: &[u8]) -> Result<Vec<u8>> {
    let mut samples = Vec::new();
    samples
        .try_reserve_exact(payload.len())
        .map_err(|_| Error::OutOfMemory)?;
    samples.extend_from_slice(payload);
    Ok(samples)
}

/// Decoded `smpl` chunk: the fixed preamble plus every declared loop record.
///
/// Loop endpoint validation happens at the document level, where the raw
/// sample buffer is known.
#[derive(Debug, Clone)]
pub struct SmplChunk {
    /// Manufacturer code (0 = none)
    pub manufacturer: u32,
    /// Product code (0 = none)
    pub product: u32,
    /// Sample period in nanoseconds
    pub sample_period: u32,
    /// MIDI note at which the sample plays back unshifted
    pub midi_unity_note: u32,
    /// Fraction of a semitone above the unity note
    pub midi_pitch_fraction: u32,
    /// SMPTE format for the offset below
    pub smpte_format: u32,
    /// SMPTE offset
    pub smpte_offset: u32,
    /// Trailing sampler-specific byte count
    pub sampler_data: u32,
    /// Declared loop records, unvalidated
    pub loops: Vec<LoopPoint>,
}

/// Parse a `smpl` chunk payload
pub fn parse_smpl(payload: &[u8]) -> Result<SmplChunk> {
    let mut cur = ByteCursor::new(payload);
    let manufacturer = cur.read_u32_le()?;
    let product = cur.read_u32_le()?;
    let sample_period = cur.read_u32_le()?;
    let midi_unity_note = cur.read_u32_le()?;
    let midi_pitch_fraction = cur.read_u32_le()?;
    let smpte_format = cur.read_u32_le()?;
    let smpte_offset = cur.read_u32_le()?;
    let num_loops = cur.read_u32_le()?;
    let sampler_data = cur.read_u32_le()?;

    let mut loops = Vec::with_capacity((num_loops as usize).min(payload.len() / 24));
    for _ in 0..num_loops {
        loops.push(LoopPoint {
            cue_point_id: cur.read_u32_le()?,
            loop_type: cur.read_u32_le()?,
            start: cur.read_u32_le()?,
            end: cur.read_u32_le()?,
            fraction: cur.read_u32_le()?,
            play_count: cur.read_u32_le()?,
        });
    }

    Ok(SmplChunk {
        manufacturer,
        product,
        sample_period,
        midi_unity_note,
        midi_pitch_fraction,
        smpte_format,
        smpte_offset,
        sampler_data,
        loops,
    })
}

/// Decoded `LIST` chunk body
#[derive(Debug, Clone)]
pub enum ListChunk {
    /// `INFO` sub-type: tag entries in file order
    Info(Vec<InfoEntry>),
    /// `adtl` sub-type: accepted but not decoded
    Adtl,
}

/// Parse a `LIST` chunk payload
pub fn parse_list(payload: &[u8]) -> Result<ListChunk> {
    let mut cur = ByteCursor::new(payload);
    let sub_type = cur.read_array::<4>()?;

    match sub_type {
        INFO_TYPE => {
            let mut entries = Vec::new();
            while cur.remaining() > 0 {
                let id = cur.read_u32_le()?;
                let size = cur.read_u32_le()? as usize;
                let text = cur.read_bytes(size)?.to_vec();
                entries.push(InfoEntry { id, text });
            }
            Ok(ListChunk::Info(entries))
        }
        ADTL_TYPE => Ok(ListChunk::Adtl),
        other => Err(Error::bad_format(format!(
            "unhandled LIST sub-type {:?}",
            String::from_utf8_lossy(&other)
        ))),
    }
}

/// Decode an ID3v2 synchsafe integer: seven bits per byte, first byte in
/// file order most significant.
pub fn synchsafe_decode(bytes: [u8; 4]) -> u32 {
    ((bytes[0] as u32 & 0x7F) << 21)
        | ((bytes[1] as u32 & 0x7F) << 14)
        | ((bytes[2] as u32 & 0x7F) << 7)
        | (bytes[3] as u32 & 0x7F)
}

/// Encode a value below 2^28 as an ID3v2 synchsafe integer
pub fn synchsafe_encode(value: u32) -> [u8; 4] {
    [
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ]
}

/// Parse an `id3 ` chunk payload into ID3v2.3 frames.
///
/// Only tag major version 3 is accepted; anything else is a version error
/// and no frames are stored.
pub fn parse_id3(payload: &[u8]) -> Result<Vec<Id3Frame>> {
    let mut cur = ByteCursor::new(payload);
    cur.advance(3)?; // "ID3"
    let version = cur.read_u16_le()?;
    if version != 3 {
        return Err(Error::bad_version(format!(
            "ID3v2 tag version {}, expected 3",
            version & 0xFF
        )));
    }
    let _flags = cur.read_u8()?;
    let tag_size = synchsafe_decode(cur.read_array::<4>()?) as usize;

    let end = cur.position() + tag_size;
    let mut frames = Vec::new();
    while cur.position() < end {
        let id = cur.read_array::<4>()?;
        let size = synchsafe_decode(cur.read_array::<4>()?) as usize;
        let flags = cur.read_u16_le()?;
        let value = cur.read_bytes(size)?.to_vec();
        frames.push(Id3Frame { id, flags, value });
    }

    Ok(frames)
}

/// Parse an `inst` chunk payload
pub fn parse_inst(payload: &[u8]) -> Result<Instrument> {
    let mut cur = ByteCursor::new(payload);
    Ok(Instrument {
        unshifted_note: cur.read_u8()?,
        fine_tune: cur.read_u8()?,
        gain: cur.read_u8()?,
        low_note: cur.read_u8()?,
        high_note: cur.read_u8()?,
        low_velocity: cur.read_u8()?,
        high_velocity: cur.read_u8()?,
    })
}

/// Parse a `DISP` chunk payload: a u32 clipboard-format code followed by
/// the blob itself.
pub fn parse_disp(payload: &[u8]) -> Result<DispImage> {
    let mut cur = ByteCursor::new(payload);
    let kind = cur.read_u32_le()?;
    let data = cur.read_bytes(cur.remaining())?.to_vec();
    Ok(DispImage { kind, data })
}
