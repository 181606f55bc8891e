//! Canonical f64 tracks to interleaved PCM byte streams
//!
//! Quantization clamps to [-1.0, 1.0], scales to the target depth, and
//! rounds half away from zero. The 16- and 32-bit paths quantize each
//! channel in bulk (with an AVX2 fast path when the CPU has it) and then
//! interleave; the fast path is byte-identical to the scalar path.

use crate::error::{Error, Result};
use crate::wav::Audio;

const SCALE_8: f64 = 127.0;
const SCALE_16: f64 = 32767.0;
const SCALE_24: f64 = 8_388_607.0;
const SCALE_32: f64 = 2_147_483_647.0;

/// Quantize `audio` to PCM at `bits_per_sample` and append the interleaved
/// little-endian byte stream to `dst`.
///
/// Every track must have the same length; frames are emitted in order with
/// channels interleaved within each frame.
pub fn encode_interleaved(audio: &Audio, bits_per_sample: u16, dst: &mut Vec<u8>) -> Result<()> {
    let channels = audio.len();
    if channels == 0 {
        return Err(Error::bad_format("no channels to encode"));
    }
    let frames = audio[0].len();
    if audio.iter().any(|track| track.len() != frames) {
        return Err(Error::bad_format("channel lengths differ"));
    }

    let bytes_per_sample = match bits_per_sample {
        8 => 1,
        16 => 2,
        24 => 3,
        32 => 4,
        other => {
            return Err(Error::bad_format(format!(
                "cannot encode {} bits per sample",
                other
            )))
        }
    };
    dst.try_reserve(frames * channels * bytes_per_sample)
        .map_err(|_| Error::OutOfMemory)?;

    match bits_per_sample {
        8 => encode_pcm8(audio, frames, dst),
        16 => encode_pcm16(audio, frames, dst),
        24 => encode_pcm24(audio, frames, dst),
        _ => encode_pcm32(audio, frames, dst),
    }

    Ok(())
}

/// Clamp, scale, and round half away from zero.
///
/// `f64 as i32` squashes NaN to 0 and the clamp bounds the magnitude, so
/// the cast never saturates for the scales used here.
#[inline]
fn quantize(x: f64, scale: f64) -> i32 {
    (x.clamp(-1.0, 1.0) * scale).round() as i32
}

fn encode_pcm8(audio: &Audio, frames: usize, dst: &mut Vec<u8>) {
    for i in 0..frames {
        for track in audio {
            let code = (track[i].clamp(-1.0, 1.0) * SCALE_8 + 128.0).round();
            dst.push(code as u8);
        }
    }
}

fn encode_pcm16(audio: &Audio, frames: usize, dst: &mut Vec<u8>) {
    let lanes: Vec<Vec<i16>> = audio.iter().map(|track| quantize_track_i16(track)).collect();
    for i in 0..frames {
        for lane in &lanes {
            dst.extend_from_slice(&lane[i].to_le_bytes());
        }
    }
}

fn encode_pcm24(audio: &Audio, frames: usize, dst: &mut Vec<u8>) {
    for i in 0..frames {
        for track in audio {
            let code = quantize(track[i], SCALE_24);
            dst.push(code as u8);
            dst.push((code >> 8) as u8);
            dst.push((code >> 16) as u8);
        }
    }
}

fn encode_pcm32(audio: &Audio, frames: usize, dst: &mut Vec<u8>) {
    let lanes: Vec<Vec<i32>> = audio.iter().map(|track| quantize_track_i32(track)).collect();
    for i in 0..frames {
        for lane in &lanes {
            dst.extend_from_slice(&lane[i].to_le_bytes());
        }
    }
}

/// Quantize one channel to 16-bit codes
pub fn quantize_track_i16(track: &[f64]) -> Vec<i16> {
    #[cfg(target_arch = "x86_64")]
    {
        if std::is_x86_feature_detected!("avx2") {
            return unsafe { avx2::quantize_i16(track) };
        }
    }
    track
        .iter()
        .map(|&x| quantize(x, SCALE_16) as i16)
        .collect()
}

/// Quantize one channel to 32-bit codes
pub fn quantize_track_i32(track: &[f64]) -> Vec<i32> {
    #[cfg(target_arch = "x86_64")]
    {
        if std::is_x86_feature_detected!("avx2") {
            return unsafe { avx2::quantize_i32(track) };
        }
    }
    track.iter().map(|&x| quantize(x, SCALE_32)).collect()
}

/// AVX2 quantization, four doubles per step.
///
/// Rounding is done as truncate-then-step so the result matches
/// `f64::round` for every finite input: the truncation and the fractional
/// part are exact, so the half-way comparison is exact too. NaN lanes are
/// zeroed to match what `as i32` does in the scalar path.
#[cfg(target_arch = "x86_64")]
mod avx2 {
    use super::{quantize, SCALE_16, SCALE_32};
    use std::arch::x86_64::*;

    #[target_feature(enable = "avx2")]
    unsafe fn round_away_scaled(v: __m256d, scale: __m256d) -> __m128i {
        let sign_bit = _mm256_set1_pd(-0.0);
        let ordered = _mm256_cmp_pd::<_CMP_ORD_Q>(v, v);
        let clamped = _mm256_min_pd(
            _mm256_max_pd(v, _mm256_set1_pd(-1.0)),
            _mm256_set1_pd(1.0),
        );
        let scaled = _mm256_and_pd(_mm256_mul_pd(clamped, scale), ordered);
        let toward_zero = _mm256_round_pd::<{ _MM_FROUND_TO_ZERO | _MM_FROUND_NO_EXC }>(scaled);
        let frac = _mm256_sub_pd(scaled, toward_zero);
        let abs_frac = _mm256_andnot_pd(sign_bit, frac);
        let at_half = _mm256_cmp_pd::<_CMP_GE_OQ>(abs_frac, _mm256_set1_pd(0.5));
        let signed_one = _mm256_or_pd(_mm256_and_pd(scaled, sign_bit), _mm256_set1_pd(1.0));
        let step = _mm256_and_pd(at_half, signed_one);
        _mm256_cvttpd_epi32(_mm256_add_pd(toward_zero, step))
    }

    #[target_feature(enable = "avx2")]
    pub unsafe fn quantize_i16(track: &[f64]) -> Vec<i16> {
        let mut out = vec![0i16; track.len()];
        let scale = _mm256_set1_pd(SCALE_16);
        let mut i = 0;
        while i + 8 <= track.len() {
            let lo = round_away_scaled(_mm256_loadu_pd(track.as_ptr().add(i)), scale);
            let hi = round_away_scaled(_mm256_loadu_pd(track.as_ptr().add(i + 4)), scale);
            // Codes are within [-32767, 32767], so the saturating pack is
            // value-preserving.
            let packed = _mm_packs_epi32(lo, hi);
            _mm_storeu_si128(out.as_mut_ptr().add(i) as *mut __m128i, packed);
            i += 8;
        }
        for j in i..track.len() {
            out[j] = quantize(track[j], SCALE_16) as i16;
        }
        out
    }

    #[target_feature(enable = "avx2")]
    pub unsafe fn quantize_i32(track: &[f64]) -> Vec<i32> {
        let mut out = vec![0i32; track.len()];
        let scale = _mm256_set1_pd(SCALE_32);
        let mut i = 0;
        while i + 4 <= track.len() {
            let codes = round_away_scaled(_mm256_loadu_pd(track.as_ptr().add(i)), scale);
            _mm_storeu_si128(out.as_mut_ptr().add(i) as *mut __m128i, codes);
            i += 4;
        }
        for j in i..track.len() {
            out[j] = quantize(track[j], SCALE_32);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(audio: &Audio, bits: u16) -> Vec<u8> {
        let mut dst = Vec::new();
        encode_interleaved(audio, bits, &mut dst).unwrap();
        dst
    }

    #[test]
    fn test_mono_16_known_codes() {
        let audio = vec![vec![0.0, 0.5, -0.5, 1.0]];
        // 0.5 * 32767 = 16383.5 rounds away from zero to 16384.
        assert_eq!(
            encode(&audio, 16),
            vec![0x00, 0x00, 0x00, 0x40, 0x00, 0xC0, 0xFF, 0x7F]
        );
    }

    #[test]
    fn test_stereo_8_interleaves_frames() {
        let audio = vec![vec![-1.0, 0.0], vec![1.0, -1.0]];
        assert_eq!(encode(&audio, 8), vec![0x01, 0xFF, 0x80, 0x01]);
    }

    #[test]
    fn test_24_bit_full_scale() {
        let audio = vec![vec![1.0, -1.0, 0.0]];
        assert_eq!(
            encode(&audio, 24),
            vec![0xFF, 0xFF, 0x7F, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_32_bit_full_scale() {
        let audio = vec![vec![1.0, -1.0]];
        let mut expected = Vec::new();
        expected.extend_from_slice(&i32::MAX.to_le_bytes());
        expected.extend_from_slice(&(-i32::MAX).to_le_bytes());
        assert_eq!(encode(&audio, 32), expected);
    }

    #[test]
    fn test_clamps_out_of_range() {
        let audio = vec![vec![3.5, -2.0]];
        assert_eq!(encode(&audio, 16), vec![0xFF, 0x7F, 0x01, 0x80]);
    }

    #[test]
    fn test_asymmetric_minimum_never_produced() {
        let audio = vec![vec![-1.0]];
        // -32767, never -32768.
        assert_eq!(encode(&audio, 16), vec![0x01, 0x80]);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        // ±0.5 scale to exactly ±16383.5, the only exact 16-bit half-way
        // inputs; the tie breaks away from zero.
        let audio = vec![vec![0.5, -0.5]];
        let bytes = encode(&audio, 16);
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), 16384);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), -16384);
    }

    #[test]
    fn test_nan_encodes_to_zero() {
        let audio = vec![vec![f64::NAN, 0.0]];
        assert_eq!(encode(&audio, 16), vec![0x00, 0x00, 0x00, 0x00]);
        assert_eq!(encode(&audio, 32), vec![0u8; 8]);
    }

    #[test]
    fn test_mismatched_track_lengths_rejected() {
        let audio = vec![vec![0.0; 4], vec![0.0; 3]];
        let mut dst = Vec::new();
        assert!(encode_interleaved(&audio, 16, &mut dst).is_err());
    }

    #[test]
    fn test_empty_channel_list_rejected() {
        let mut dst = Vec::new();
        assert!(encode_interleaved(&Vec::new(), 16, &mut dst).is_err());
    }

    #[test]
    fn test_unsupported_depth_rejected() {
        let audio = vec![vec![0.0]];
        let mut dst = Vec::new();
        assert!(encode_interleaved(&audio, 12, &mut dst).is_err());
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_simd_matches_scalar() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let mut track = Vec::with_capacity(1037);
        for i in 0..1037 {
            // Mix of in-range, out-of-range, ties, and edge values.
            let x = ((i as f64) * 0.37).sin() * 1.5;
            track.push(x);
        }
        track[0] = 0.5;
        track[1] = -0.5;
        track[2] = f64::NAN;
        track[3] = 1.0;
        track[4] = -1.0;
        track[5] = 1.5 / 32767.0;
        track[6] = -0.0;

        let simd16 = unsafe { super::avx2::quantize_i16(&track) };
        let scalar16: Vec<i16> = track
            .iter()
            .map(|&x| quantize(x, SCALE_16) as i16)
            .collect();
        assert_eq!(simd16, scalar16);

        let simd32 = unsafe { super::avx2::quantize_i32(&track) };
        let scalar32: Vec<i32> = track.iter().map(|&x| quantize(x, SCALE_32)).collect();
        assert_eq!(simd32, scalar32);
    }
}
