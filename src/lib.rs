//! wavforge - batch RIFF/WAVE conversion and tagging
//!
//! wavforge loads RIFF/WAVE files into a neutral in-memory document
//! (canonical f64 samples plus metadata), applies an ordered queue of
//! metadata modifiers, and re-emits PCM RIFF/WAVE files.
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - `riff`: RIFF container walking, chunk parsing, and chunk assembly
//! - `codec`: sample-format conversion between raw PCM bytes and f64 tracks
//! - `wav`: the WAV document model (format descriptor, samples, metadata)
//! - `pipeline`: metadata modifiers applied between decode and encode
//! - `cli`: command-line option parsing and output-path resolution

pub mod cli;
pub mod codec;
pub mod error;
pub mod pipeline;
pub mod riff;
pub mod wav;

pub use error::{Error, Result};

/// wavforge version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for the wavforge library
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable verbose logging
    pub verbose: bool,
    /// Enable debug output
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            debug: false,
        }
    }
}

/// Initialize the wavforge library with the given configuration
///
/// Installs a tracing subscriber writing to stderr when verbose or debug
/// output is requested. The per-file contract lines printed by the binary
/// go to stdout and are not routed through tracing.
pub fn init(config: Config) -> Result<()> {
    if config.verbose || config.debug {
        let level = if config.debug { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(level)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}
