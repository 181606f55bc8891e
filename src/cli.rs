//! Command-line option parsing
//!
//! Options are processed strictly left to right with case-insensitive name
//! matching, because the semantics are order-sensitive: `-outfile` resolves
//! against the inputs accumulated so far, and the modifier queue runs in
//! the exact order the flags appeared. Paths are handled as strings so the
//! resolution rules below stay byte-for-byte predictable.

use crate::error::{Error, Result};
use crate::pipeline::Modifier;
use tracing::warn;

/// Everything gathered from the command line
#[derive(Debug, Default)]
pub struct Options {
    /// Input files, in the order collected
    pub inputs: Vec<String>,
    /// Output files, one per input
    pub outputs: Vec<String>,
    /// Metadata modifiers, in flag order
    pub modifiers: Vec<Modifier>,
}

/// Parse a full argument vector (including the program path, which doubles
/// as the default output directory).
///
/// Unknown dash options, and known options missing their trailing values,
/// are skipped silently. A positional argument is a hard error, as is an
/// input/output count mismatch once all options are consumed.
pub fn parse_args(args: &[String]) -> Result<Options> {
    let program_dir = args.first().map(|p| file_path(p)).unwrap_or_default();
    let mut opts = Options::default();

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        if !arg.starts_with('-') {
            return Err(Error::invalid_call(format!(
                "Invalid command: \"{}\".",
                arg
            )));
        }
        let name = &arg[1..];
        let left = args.len() - i;

        if left >= 2 && name.eq_ignore_ascii_case("file") {
            opts.inputs.push(args[i + 1].clone());
            i += 2;
            continue;
        }
        if left >= 2 && name.eq_ignore_ascii_case("dir") {
            append_wav_files(&args[i + 1], &mut opts.inputs);
            i += 2;
            continue;
        }
        if left >= 2
            && (name.eq_ignore_ascii_case("outfile") || name.eq_ignore_ascii_case("out_file"))
        {
            if opts.outputs.len() >= opts.inputs.len() {
                return Err(Error::invalid_call(
                    "Too many outputs for the given number of inputs.",
                ));
            }
            resolve_outputs(&args[i + 1], &program_dir, &opts.inputs, &mut opts.outputs);
            i += 2;
            continue;
        }
        if name.eq_ignore_ascii_case("set_track_by_idx") {
            opts.modifiers.push(Modifier::SetTrackByIndex);
            i += 1;
            continue;
        }
        if left >= 3 && name.eq_ignore_ascii_case("set_meta_string") {
            opts.modifiers.push(Modifier::SetMetaString {
                id: leading_u32(&args[i + 1]),
                value: args[i + 2].clone(),
            });
            i += 3;
            continue;
        }

        // Anything else that starts with '-' is skipped without comment.
        i += 1;
    }

    if opts.outputs.len() != opts.inputs.len() {
        return Err(Error::invalid_call(format!(
            "There must be the same number of inputs and outputs: \"{}\" inputs -> \"{}\" outputs.",
            opts.inputs.len(),
            opts.outputs.len()
        )));
    }

    Ok(opts)
}

/// Extend the output list for one `-outfile VALUE`.
///
/// With an extension present, the value names the final output and earlier
/// slots are auto-filled from the input stems; without one, the value is a
/// directory and every slot is auto-filled. A name of exactly `*`, or any
/// name starting with `.`, means "keep the input stems".
fn resolve_outputs(value: &str, program_dir: &str, inputs: &[String], outputs: &mut Vec<String>) {
    let ext = file_extension(value);
    let mut folder = file_path(value);
    let mut name = file_name(value);
    if ext.is_empty() {
        folder = normalize(value);
        name.clear();
        if !folder.is_empty() && !folder.ends_with('/') {
            folder.push('/');
        }
    }
    if (name.len() == 1 && name.starts_with('*')) || name.starts_with('.') {
        name.clear();
    }
    if folder.is_empty() {
        folder = program_dir.to_string();
    }

    let fill_to = if ext.is_empty() {
        inputs.len()
    } else {
        inputs.len() - 1
    };
    let mut j = outputs.len();
    while outputs.len() < fill_to {
        let input = &inputs[j];
        let out_ext = if ext.is_empty() {
            file_extension(input)
        } else {
            ext.clone()
        };
        outputs.push(format!("{}{}.{}", folder, no_extension(input), out_ext));
        j += 1;
    }

    if outputs.len() < inputs.len() {
        let input = &inputs[outputs.len()];
        let stem = if name.is_empty() {
            no_extension(input)
        } else {
            no_extension(value)
        };
        let out_ext = if ext.is_empty() {
            file_extension(input)
        } else {
            ext
        };
        outputs.push(format!("{}{}.{}", folder, stem, out_ext));
    }
}

/// Append every `*.wav` file directly under `dir`, sorted by name.
/// An unreadable directory contributes nothing.
fn append_wav_files(dir: &str, inputs: &mut Vec<String>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(err) => {
            warn!(dir, %err, "cannot scan directory");
            return;
        }
    };
    let mut found = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("wav"));
        if is_wav && path.is_file() {
            found.push(path.to_string_lossy().into_owned());
        }
    }
    found.sort();
    inputs.extend(found);
}

/// Decimal prefix of `s` as a u32, 0 when there is none
fn leading_u32(s: &str) -> u32 {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Final path component, the whole string when there is no separator
fn file_name(path: &str) -> String {
    let n = normalize(path);
    match n.rfind('/') {
        Some(pos) => n[pos + 1..].to_string(),
        None => n,
    }
}

/// Everything through the last separator inclusive, empty when there is none
fn file_path(path: &str) -> String {
    let n = normalize(path);
    match n.rfind('/') {
        Some(pos) => n[..=pos].to_string(),
        None => String::new(),
    }
}

/// Extension of the final component, empty when it has no dot
fn file_extension(path: &str) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(pos) => name[pos + 1..].to_string(),
        None => String::new(),
    }
}

/// Final component with the extension removed; empty when it has no dot
fn no_extension(path: &str) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(pos) => name[..pos].to_string(),
        None => String::new(),
    }
}
