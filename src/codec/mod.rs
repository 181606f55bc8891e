//! Sample-format conversion
//!
//! `decode` turns interleaved PCM/float bytes into canonical f64 tracks,
//! one channel at a time; `encode` quantizes f64 tracks back into an
//! interleaved PCM byte stream. The canonical sample is an f64 nominally in
//! [-1.0, +1.0]; values outside that range survive processing and are
//! clamped at encode time.

pub mod decode;
pub mod encode;

pub use decode::decode_channel;
pub use encode::encode_interleaved;
