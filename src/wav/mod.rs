//! The WAV document model
//!
//! A [`WavFile`] is the neutral in-memory form of one RIFF/WAVE file: the
//! format descriptor, the raw interleaved sample buffer exactly as it
//! appeared in the `data` chunk, and the auxiliary metadata (loops, INFO
//! entries, ID3 frames, DISP images, instrument record). It is created
//! empty, populated by one [`WavFile::load_from_memory`] call, mutated only
//! through the metadata operations, and consumed non-destructively by the
//! save path.

pub mod format;
pub mod meta;

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::codec;
use crate::error::{Error, Result};
use crate::riff::{self, chunks, RiffWriter};
use self::format::{FormatTag, WavFormat};
use self::meta::{DispImage, Id3Frame, InfoEntry, Instrument, LoopPoint};

/// All samples of one channel, canonical f64
pub type Track = Vec<f64>;
/// One track per channel, equal lengths
pub type Audio = Vec<Track>;

/// Default MIDI base note when no `smpl` chunk provides one
pub const DEFAULT_BASE_NOTE: u32 = 64;

/// Overrides applied when saving; a zero field keeps the loaded value
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveSettings {
    /// Output sample rate in Hz, 0 to keep
    pub sample_rate: u32,
    /// Output bits per sample, 0 to keep
    pub bits_per_sample: u16,
}

/// One WAV file held in memory
#[derive(Debug, Clone)]
pub struct WavFile {
    format: Option<WavFormat>,
    base_note: u32,
    samples: Vec<u8>,
    loops: Vec<LoopPoint>,
    info: Vec<InfoEntry>,
    id3: Vec<Id3Frame>,
    disp: Vec<DispImage>,
    instrument: Option<Instrument>,
}

impl Default for WavFile {
    fn default() -> Self {
        WavFile {
            format: None,
            base_note: DEFAULT_BASE_NOTE,
            samples: Vec::new(),
            loops: Vec::new(),
            info: Vec::new(),
            id3: Vec::new(),
            disp: Vec::new(),
            instrument: None,
        }
    }
}

impl WavFile {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the initial empty state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Populate the document from a whole file held in memory.
    ///
    /// The document is reset first. Chunks are applied in file order;
    /// unknown chunk ids are ignored. Malformed `fmt `/`data` (or any
    /// recognized chunk whose declared extent lies) fail the load; loops
    /// with out-of-range endpoints are dropped silently.
    pub fn load_from_memory(&mut self, data: &[u8]) -> Result<()> {
        self.reset();

        for entry in riff::walk_chunks(data)? {
            match entry.id {
                riff::FMT_CHUNK => {
                    self.format = Some(chunks::parse_fmt(entry.payload(data)?)?);
                }
                riff::DATA_CHUNK => {
                    self.samples = chunks::parse_data(entry.payload(data)?)?;
                }
                riff::SMPL_CHUNK => {
                    let smpl = chunks::parse_smpl(entry.payload(data)?)?;
                    self.base_note = smpl.midi_unity_note;
                    for lp in smpl.loops {
                        if (lp.start as usize) < self.samples.len()
                            && (lp.end as usize) < self.samples.len()
                        {
                            self.loops.push(lp);
                        } else {
                            warn!(start = lp.start, end = lp.end, "dropping out-of-range loop");
                        }
                    }
                }
                riff::LIST_CHUNK => match chunks::parse_list(entry.payload(data)?)? {
                    chunks::ListChunk::Info(entries) => self.info.extend(entries),
                    chunks::ListChunk::Adtl => {}
                },
                riff::ID3_CHUNK => {
                    self.id3.extend(chunks::parse_id3(entry.payload(data)?)?);
                }
                riff::INST_CHUNK => {
                    self.instrument = Some(chunks::parse_inst(entry.payload(data)?)?);
                }
                riff::DISP_CHUNK => {
                    self.disp.push(chunks::parse_disp(entry.payload(data)?)?);
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Sample rate in Hz, 0 before a `fmt ` chunk has been loaded
    pub fn hz(&self) -> u32 {
        self.format.as_ref().map_or(0, |f| f.sample_rate)
    }

    /// Channel count, 0 before a `fmt ` chunk has been loaded
    pub fn channels(&self) -> u16 {
        self.format.as_ref().map_or(0, |f| f.channels)
    }

    /// Bits per sample, 0 before a `fmt ` chunk has been loaded
    pub fn bits_per_sample(&self) -> u16 {
        self.format.as_ref().map_or(0, |f| f.bits_per_sample)
    }

    /// Frame count: raw buffer length over the derived block align.
    /// A trailing partial frame does not count.
    pub fn total_samples(&self) -> u32 {
        match &self.format {
            Some(f) if f.calculate_block_align() != 0 => {
                (self.samples.len() / f.calculate_block_align() as usize) as u32
            }
            _ => 0,
        }
    }

    /// MIDI base note (unity note from `smpl`, 64 by default)
    pub fn base_note(&self) -> u32 {
        self.base_note
    }

    /// Retained loop points in file order
    pub fn loops(&self) -> &[LoopPoint] {
        &self.loops
    }

    /// INFO entries in file/insertion order
    pub fn info_entries(&self) -> &[InfoEntry] {
        &self.info
    }

    /// ID3v2.3 frames in file order
    pub fn id3_frames(&self) -> &[Id3Frame] {
        &self.id3
    }

    /// DISP images in file/insertion order
    pub fn images(&self) -> &[DispImage] {
        &self.disp
    }

    /// The `inst` chunk entry, if one was present
    pub fn instrument(&self) -> Option<&Instrument> {
        self.instrument.as_ref()
    }

    /// Raw interleaved sample bytes exactly as stored in the `data` chunk
    pub fn raw_samples(&self) -> &[u8] {
        &self.samples
    }

    /// Decode one channel over the frame range `[from, to)`
    pub fn get_samples(&self, channel: u16, from: usize, to: usize) -> Result<Track> {
        let format = self
            .format
            .as_ref()
            .ok_or_else(|| Error::bad_format("no fmt chunk loaded"))?;
        codec::decode_channel(&self.samples, format, channel, from, to)
    }

    /// Decode every channel in full; one track per channel
    pub fn get_all_samples(&self) -> Result<Audio> {
        let total = self.total_samples() as usize;
        let mut audio = Vec::with_capacity(self.channels() as usize);
        for channel in 0..self.channels() {
            audio.push(self.get_samples(channel, 0, total)?);
        }
        Ok(audio)
    }

    /// Add or replace a LIST/INFO entry.
    ///
    /// The value is canonicalized through the substitution table, NUL
    /// terminated, and padded to even length with a second NUL. An entry
    /// with the same id is replaced in place; otherwise the entry is
    /// appended.
    pub fn add_list_entry(&mut self, id: u32, value: &str) -> Result<()> {
        let canonical = meta::canonicalize_text(value);
        let mut text = Vec::new();
        text.try_reserve_exact(canonical.len() + 2)
            .map_err(|_| Error::OutOfMemory)?;
        text.extend_from_slice(canonical.as_bytes());
        text.push(0);
        if text.len() & 1 != 0 {
            text.push(0);
        }

        let entry = InfoEntry { id, text };
        if let Some(existing) = self.info.iter_mut().find(|e| e.id == id) {
            *existing = entry;
        } else {
            self.info.push(entry);
        }
        Ok(())
    }

    /// Append a DISP image record
    pub fn add_image(&mut self, kind: u32, data: Vec<u8>) -> Result<()> {
        if u32::try_from(data.len()).is_err() {
            return Err(Error::unsupported_size(format!(
                "DISP payload of {} bytes",
                data.len()
            )));
        }
        self.disp.push(DispImage { kind, data });
        Ok(())
    }

    /// Assemble a PCM RIFF/WAVE file image from `audio`.
    ///
    /// The envelope is `fmt ` + `data`, then `smpl` iff the loop list is
    /// non-empty and `LIST`/`INFO` iff the INFO list is non-empty. ID3,
    /// DISP, and instrument records are not re-emitted.
    pub fn encode_to_vec(&self, audio: &Audio, settings: Option<&SaveSettings>) -> Result<Vec<u8>> {
        if audio.is_empty() {
            return Err(Error::bad_format("no channels to encode"));
        }
        let channels = u16::try_from(audio.len())
            .map_err(|_| Error::unsupported_size(format!("{} channels", audio.len())))?;

        let bits = match settings {
            Some(s) if s.bits_per_sample != 0 => s.bits_per_sample,
            _ => self.bits_per_sample(),
        };
        let sample_rate = match settings {
            Some(s) if s.sample_rate != 0 => s.sample_rate,
            _ => self.hz(),
        };
        if !matches!(bits, 8 | 16 | 24 | 32) {
            return Err(Error::bad_format(format!(
                "cannot write {} bits per sample",
                bits
            )));
        }

        let frames = audio[0].len() as u64;
        let block_align = channels as u32 * (bits as u32 / 8);
        let byte_rate = sample_rate.wrapping_mul(block_align);
        let data_size = u32::try_from(frames * block_align as u64)
            .map_err(|_| Error::unsupported_size(format!("{} frames", frames)))?;

        let smpl_size = if self.loops.is_empty() {
            0
        } else {
            8 + 36 + self.loops.len() * 24
        };
        let list_size = if self.info.is_empty() {
            0
        } else {
            8 + 4 + self
                .info
                .iter()
                .map(|e| 8 + e.text.len())
                .sum::<usize>()
        };

        let total = 4 + (8 + 16) + (8 + data_size as usize) + smpl_size + list_size;
        let total_size = u32::try_from(total)
            .map_err(|_| Error::unsupported_size(format!("{} byte RIFF body", total)))?;

        let mut w = RiffWriter::with_capacity(total + 8)?;
        w.push_fourcc(&riff::RIFF_MAGIC);
        w.push_u32_le(total_size);
        w.push_fourcc(&riff::WAVE_MAGIC);

        w.push_fourcc(&riff::FMT_CHUNK);
        w.push_u32_le(16);
        w.push_u16_le(u16::from(FormatTag::Pcm));
        w.push_u16_le(channels);
        w.push_u32_le(sample_rate);
        w.push_u32_le(byte_rate);
        w.push_u16_le(block_align as u16);
        w.push_u16_le(bits);

        w.push_fourcc(&riff::DATA_CHUNK);
        w.push_u32_le(data_size);
        codec::encode_interleaved(audio, bits, w.buf_mut())?;

        if !self.loops.is_empty() {
            w.push_fourcc(&riff::SMPL_CHUNK);
            w.push_u32_le(36 + self.loops.len() as u32 * 24);
            w.push_u32_le(0); // manufacturer
            w.push_u32_le(0); // product
            w.push_u32_le(0); // sample period
            w.push_u32_le(self.base_note);
            w.push_u32_le(0); // pitch fraction
            w.push_u32_le(0); // SMPTE format
            w.push_u32_le(0); // SMPTE offset
            w.push_u32_le(self.loops.len() as u32);
            w.push_u32_le(0); // sampler data
            for lp in &self.loops {
                w.push_u32_le(lp.cue_point_id);
                w.push_u32_le(lp.loop_type);
                w.push_u32_le(lp.start);
                w.push_u32_le(lp.end);
                w.push_u32_le(lp.fraction);
                w.push_u32_le(lp.play_count);
            }
        }

        if !self.info.is_empty() {
            w.push_fourcc(&riff::LIST_CHUNK);
            let body: usize = 4 + self.info.iter().map(|e| 8 + e.text.len()).sum::<usize>();
            w.push_u32_le(body as u32);
            w.push_fourcc(&riff::INFO_TYPE);
            for entry in &self.info {
                w.push_u32_le(entry.id);
                w.push_u32_le(entry.text.len() as u32);
                w.push_bytes(&entry.text);
            }
        }

        Ok(w.into_inner())
    }

    /// Encode `audio` and write it to `path` as a PCM WAV file.
    ///
    /// The file-name component is passed through the reserved-character
    /// table first so track titles with `?`, `:`, `"` and friends still
    /// produce a creatable file.
    pub fn save_as_pcm(
        &self,
        path: &Path,
        audio: &Audio,
        settings: Option<&SaveSettings>,
    ) -> Result<()> {
        let target = sanitize_file_name(path);
        let bytes = self.encode_to_vec(audio, settings)?;
        std::fs::write(&target, bytes)
            .map_err(|e| Error::from_write(&e, &target.to_string_lossy()))
    }
}

/// Characters Windows refuses in file names, swapped for lookalikes
const NAME_SUBSTITUTIONS: &[(char, &str)] = &[
    ('?', "-"),
    ('*', "\u{02D9}"),
    (':', " -"),
    ('\\', "-"),
    ('/', "\u{2215}"),
    ('<', "\u{2039}"),
    ('>', "\u{203A}"),
    ('|', "\u{00A6}"),
    ('"', "\u{201F}"),
];

/// Replace reserved characters in the file-name component of `path`
pub fn sanitize_file_name(path: &Path) -> PathBuf {
    let name = match path.file_name() {
        Some(n) => n.to_string_lossy().into_owned(),
        None => return path.to_path_buf(),
    };
    let mut clean = String::with_capacity(name.len());
    for c in name.chars() {
        match NAME_SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => clean.push_str(to),
            None => clean.push(c),
        }
    }
    path.with_file_name(clean)
}
