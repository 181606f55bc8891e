//! The metadata modifier queue
//!
//! Modifiers run between decode and encode, in the exact order they were
//! entered on the command line. Each modifier sees the document, the
//! position of the current file within the batch, and the decoded audio.

use crate::wav::{meta, Audio, WavFile};

/// Per-file context handed to every modifier
pub struct ModContext<'a> {
    /// Zero-based index of the file being processed
    pub index: usize,
    /// Total number of files in the batch
    pub total: usize,
    /// The decoded audio for the current file
    pub audio: &'a Audio,
}

/// One queued metadata operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    /// Write the batch position into the ITRK entry
    SetTrackByIndex,
    /// Write an expanded string value into an arbitrary INFO entry
    SetMetaString {
        /// INFO id as a little-endian four-character code
        id: u32,
        /// Value; `{idx}` tokens are expanded per file
        value: String,
    },
}

impl Modifier {
    /// The operation name used in diagnostics
    pub fn operation(&self) -> &'static str {
        match self {
            Modifier::SetTrackByIndex => "set_track_by_idx",
            Modifier::SetMetaString { .. } => "set_meta_string",
        }
    }

    /// Run the modifier against `wav`. Returns false on failure; the
    /// driver reports it and keeps going.
    pub fn apply(&self, wav: &mut WavFile, ctx: &ModContext<'_>) -> bool {
        match self {
            Modifier::SetTrackByIndex => wav
                .add_list_entry(meta::ITRK, &expand_tokens("{idx}", ctx))
                .is_ok(),
            Modifier::SetMetaString { id, value } => wav
                .add_list_entry(*id, &expand_tokens(value, ctx))
                .is_ok(),
        }
    }
}

/// Expand `{idx}` to the one-based file index, zero-padded to the batch
/// width (`floor(log10(total)) + 1` digits).
pub fn expand_tokens(value: &str, ctx: &ModContext<'_>) -> String {
    let width = index_width(ctx.total);
    value.replace("{idx}", &format!("{:0width$}", ctx.index + 1))
}

fn index_width(total: usize) -> usize {
    if total < 2 {
        return 1;
    }
    (total as f64).log10().floor() as usize + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::meta::{IART, ITRK};

    fn ctx(index: usize, total: usize, audio: &Audio) -> ModContext<'_> {
        ModContext {
            index,
            total,
            audio,
        }
    }

    #[test]
    fn test_idx_width_follows_batch_size() {
        let audio = Audio::new();
        assert_eq!(expand_tokens("{idx}", &ctx(4, 12, &audio)), "05");
        assert_eq!(expand_tokens("{idx}", &ctx(0, 1, &audio)), "1");
        assert_eq!(expand_tokens("{idx}", &ctx(8, 9, &audio)), "9");
        assert_eq!(expand_tokens("{idx}", &ctx(9, 10, &audio)), "10");
        assert_eq!(expand_tokens("{idx}", &ctx(0, 100, &audio)), "001");
    }

    #[test]
    fn test_expand_inside_text() {
        let audio = Audio::new();
        assert_eq!(
            expand_tokens("Take {idx} of {idx}", &ctx(2, 20, &audio)),
            "Take 03 of 03"
        );
        assert_eq!(expand_tokens("no token", &ctx(0, 5, &audio)), "no token");
    }

    #[test]
    fn test_set_track_by_idx() {
        let audio = Audio::new();
        let mut wav = WavFile::new();
        assert!(Modifier::SetTrackByIndex.apply(&mut wav, &ctx(6, 12, &audio)));
        assert_eq!(wav.info_entries()[0].id, ITRK);
        assert_eq!(wav.info_entries()[0].text, b"07\0\0");
    }

    #[test]
    fn test_set_meta_string_expands_value() {
        let audio = Audio::new();
        let mut wav = WavFile::new();
        let modifier = Modifier::SetMetaString {
            id: IART,
            value: "Artist {idx}".to_string(),
        };
        assert!(modifier.apply(&mut wav, &ctx(0, 3, &audio)));
        assert_eq!(wav.info_entries()[0].id, IART);
        assert_eq!(wav.info_entries()[0].text, b"Artist 1\0\0");
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Modifier::SetTrackByIndex.operation(), "set_track_by_idx");
        assert_eq!(
            Modifier::SetMetaString {
                id: 0,
                value: String::new()
            }
            .operation(),
            "set_meta_string"
        );
    }
}
