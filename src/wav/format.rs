//! WAV format descriptor

/// WAV format tag identifying the sample encoding
///
/// Only PCM and IEEE float are decodable; the remaining tags are recognized
/// so files using them fail with a clear "not supported" instead of a parse
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    /// PCM (linear quantization)
    Pcm,
    /// ADPCM
    Adpcm,
    /// IEEE float
    IeeeFloat,
    /// A-Law
    ALaw,
    /// Mu-Law
    MuLaw,
    /// DVI/IMA ADPCM
    DviAdpcm,
    /// Yamaha ADPCM
    YamahaAdpcm,
    /// GSM 6.10
    Gsm610,
    /// ITU G.721 ADPCM
    ItuG721Adpcm,
    /// MPEG
    Mpeg,
    /// Extensible format
    Extensible,
    /// Unknown format
    Unknown(u16),
}

impl From<u16> for FormatTag {
    fn from(val: u16) -> Self {
        match val {
            0x0001 => FormatTag::Pcm,
            0x0002 => FormatTag::Adpcm,
            0x0003 => FormatTag::IeeeFloat,
            0x0006 => FormatTag::ALaw,
            0x0007 => FormatTag::MuLaw,
            0x0011 => FormatTag::DviAdpcm,
            0x0016 => FormatTag::YamahaAdpcm,
            0x0031 => FormatTag::Gsm610,
            0x0040 => FormatTag::ItuG721Adpcm,
            0x0050 => FormatTag::Mpeg,
            0xFFFE => FormatTag::Extensible,
            other => FormatTag::Unknown(other),
        }
    }
}

impl From<FormatTag> for u16 {
    fn from(tag: FormatTag) -> Self {
        match tag {
            FormatTag::Pcm => 0x0001,
            FormatTag::Adpcm => 0x0002,
            FormatTag::IeeeFloat => 0x0003,
            FormatTag::ALaw => 0x0006,
            FormatTag::MuLaw => 0x0007,
            FormatTag::DviAdpcm => 0x0011,
            FormatTag::YamahaAdpcm => 0x0016,
            FormatTag::Gsm610 => 0x0031,
            FormatTag::ItuG721Adpcm => 0x0040,
            FormatTag::Mpeg => 0x0050,
            FormatTag::Extensible => 0xFFFE,
            FormatTag::Unknown(val) => val,
        }
    }
}

/// WAV format chunk data
///
/// `byte_rate` and `block_align` are kept as read for inspection, but every
/// computation (and every re-emitted file) uses the derived values.
#[derive(Debug, Clone)]
pub struct WavFormat {
    /// Sample encoding
    pub tag: FormatTag,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Average bytes per second as stored in the file
    pub byte_rate: u32,
    /// Bytes per frame as stored in the file
    pub block_align: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Bytes per single-channel sample
    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Derived bytes per frame
    pub fn calculate_block_align(&self) -> u16 {
        self.channels.wrapping_mul(self.bytes_per_sample())
    }

    /// Derived bytes per second
    pub fn calculate_byte_rate(&self) -> u32 {
        self.sample_rate
            .wrapping_mul(self.calculate_block_align() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tag_conversion() {
        assert_eq!(u16::from(FormatTag::Pcm), 0x0001);
        assert_eq!(FormatTag::from(0x0001), FormatTag::Pcm);
        assert_eq!(FormatTag::from(0x0003), FormatTag::IeeeFloat);
        assert_eq!(FormatTag::from(0x0050), FormatTag::Mpeg);
        assert_eq!(FormatTag::from(0x1234), FormatTag::Unknown(0x1234));
        assert_eq!(u16::from(FormatTag::Unknown(0x1234)), 0x1234);
    }

    #[test]
    fn test_derived_values_win_over_stored() {
        let fmt = WavFormat {
            tag: FormatTag::Pcm,
            channels: 2,
            sample_rate: 44100,
            byte_rate: 1,    // bogus stored value
            block_align: 99, // bogus stored value
            bits_per_sample: 16,
        };
        assert_eq!(fmt.bytes_per_sample(), 2);
        assert_eq!(fmt.calculate_block_align(), 4);
        assert_eq!(fmt.calculate_byte_rate(), 176_400);
    }
}
