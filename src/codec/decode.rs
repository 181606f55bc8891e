//! PCM/float byte streams to canonical f64 tracks

use crate::error::{Error, Result};
use crate::wav::format::{FormatTag, WavFormat};
use crate::wav::Track;

/// Decode the samples of one channel over the frame range `[from, to)`.
///
/// The stride through `raw` is the derived block align; a frame whose bytes
/// fall outside `raw` decodes to 0.0, tolerating truncated `data` chunks.
pub fn decode_channel(
    raw: &[u8],
    format: &WavFormat,
    channel: u16,
    from: usize,
    to: usize,
) -> Result<Track> {
    if channel >= format.channels {
        return Err(Error::invalid_call(format!(
            "channel {} out of range ({} channels)",
            channel, format.channels
        )));
    }

    let stride = format.calculate_block_align() as usize;
    let start = from * stride + channel as usize * format.bytes_per_sample() as usize;

    match (format.bits_per_sample, format.tag) {
        (8, FormatTag::Pcm) => Ok(pcm8_to_f64(raw, start, stride, to.saturating_sub(from))),
        (16, FormatTag::Pcm) => Ok(pcm16_to_f64(raw, start, stride, to.saturating_sub(from))),
        (24, FormatTag::Pcm) => Ok(pcm24_to_f64(raw, start, stride, to.saturating_sub(from))),
        (32, FormatTag::Pcm) => Ok(pcm32_to_f64(raw, start, stride, to.saturating_sub(from))),
        (32, FormatTag::IeeeFloat) => Ok(f32_to_f64(raw, start, stride, to.saturating_sub(from))),
        (bits, tag) => Err(Error::feature_not_supported(format!(
            "no decoder for {:?} at {} bits per sample",
            tag, bits
        ))),
    }
}

fn sample_bytes<const N: usize>(raw: &[u8], idx: usize) -> Option<[u8; N]> {
    let span = raw.get(idx..idx.checked_add(N)?)?;
    let mut out = [0u8; N];
    out.copy_from_slice(span);
    Some(out)
}

fn pcm8_to_f64(raw: &[u8], start: usize, stride: usize, count: usize) -> Track {
    let mut out = Vec::with_capacity(count);
    let mut idx = start;
    for _ in 0..count {
        let value = match raw.get(idx) {
            Some(&b) => (b as i32 - 128) as f64 / 127.0,
            None => 0.0,
        };
        out.push(value);
        idx += stride;
    }
    out
}

fn pcm16_to_f64(raw: &[u8], start: usize, stride: usize, count: usize) -> Track {
    let mut out = Vec::with_capacity(count);
    let mut idx = start;
    for _ in 0..count {
        let value = match sample_bytes::<2>(raw, idx) {
            Some(b) => i16::from_le_bytes(b) as f64 / 32767.0,
            None => 0.0,
        };
        out.push(value);
        idx += stride;
    }
    out
}

fn pcm24_to_f64(raw: &[u8], start: usize, stride: usize, count: usize) -> Track {
    // The 24-bit value rides in the top three bytes of an i32, so the
    // divisor is (2^23 - 1) * 256.
    let mut out = Vec::with_capacity(count);
    let mut idx = start;
    for _ in 0..count {
        let value = match sample_bytes::<3>(raw, idx) {
            Some([b0, b1, b2]) => {
                i32::from_le_bytes([0, b0, b1, b2]) as f64 / 2_147_483_392.0
            }
            None => 0.0,
        };
        out.push(value);
        idx += stride;
    }
    out
}

fn pcm32_to_f64(raw: &[u8], start: usize, stride: usize, count: usize) -> Track {
    let mut out = Vec::with_capacity(count);
    let mut idx = start;
    for _ in 0..count {
        let value = match sample_bytes::<4>(raw, idx) {
            Some(b) => i32::from_le_bytes(b) as f64 / 2_147_483_647.0,
            None => 0.0,
        };
        out.push(value);
        idx += stride;
    }
    out
}

fn f32_to_f64(raw: &[u8], start: usize, stride: usize, count: usize) -> Track {
    let mut out = Vec::with_capacity(count);
    let mut idx = start;
    for _ in 0..count {
        let value = match sample_bytes::<4>(raw, idx) {
            Some(b) => f32::from_le_bytes(b) as f64,
            None => 0.0,
        };
        out.push(value);
        idx += stride;
    }
    out
}
