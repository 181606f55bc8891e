//! CLI integration tests
//!
//! Runs the wavforge binary against temp-dir fixtures and checks the
//! per-file contract lines, exit codes, and written files.

use std::process::Command;
use tempfile::TempDir;

fn run_wavforge(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_wavforge"))
        .args(args)
        .output()
        .expect("Failed to execute wavforge")
}

fn stdout_string(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// A small mono 16-bit WAV: four frames [0, 16384, -16384, 32767]
fn test_wav_bytes() -> Vec<u8> {
    let mut data = Vec::new();
    for v in [0i16, 16384, -16384, 32767] {
        data.extend_from_slice(&v.to_le_bytes());
    }

    let mut body = Vec::new();
    body.extend_from_slice(b"fmt ");
    body.extend_from_slice(&16u32.to_le_bytes());
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(&44100u32.to_le_bytes());
    body.extend_from_slice(&88200u32.to_le_bytes());
    body.extend_from_slice(&2u16.to_le_bytes());
    body.extend_from_slice(&16u16.to_le_bytes());
    body.extend_from_slice(b"data");
    body.extend_from_slice(&(data.len() as u32).to_le_bytes());
    body.extend_from_slice(&data);

    let mut file = Vec::new();
    file.extend_from_slice(b"RIFF");
    file.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
    file.extend_from_slice(b"WAVE");
    file.extend_from_slice(&body);
    file
}

#[test]
fn test_convert_single_file() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    std::fs::write(&input, test_wav_bytes()).unwrap();

    let result = run_wavforge(&[
        "-file",
        input.to_str().unwrap(),
        "-outfile",
        output.to_str().unwrap(),
    ]);

    assert!(result.status.success());
    assert!(stdout_string(&result).contains("Saved file"));

    let written = std::fs::read(&output).expect("output written");
    // Same depth in and out: the data payload is preserved byte for byte.
    let original = test_wav_bytes();
    assert_eq!(&written[36..40], b"data");
    assert_eq!(written[44..52], original[44..52]);
}

#[test]
fn test_set_track_by_idx_writes_itrk() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    std::fs::write(&input, test_wav_bytes()).unwrap();

    let result = run_wavforge(&[
        "-file",
        input.to_str().unwrap(),
        "-set_track_by_idx",
        "-outfile",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success());

    let written = std::fs::read(&output).unwrap();
    // Single-file batch: one digit plus NUL, so the entry is ITRK, size 2,
    // "1\0".
    let needle = b"ITRK\x02\x00\x00\x001\x00";
    assert!(written
        .windows(needle.len())
        .any(|window| window == needle));
}

#[test]
fn test_missing_input_reports_partial_failure() {
    let dir = TempDir::new().expect("temp dir");
    let output = dir.path().join("out.wav");

    let result = run_wavforge(&[
        "-file",
        "/nonexistent/nowhere.wav",
        "-outfile",
        output.to_str().unwrap(),
    ]);

    assert!(!result.status.success());
    assert!(stdout_string(&result).contains("Failed to load file"));
    assert!(!output.exists());
}

#[test]
fn test_batch_continues_after_bad_file() {
    let dir = TempDir::new().expect("temp dir");
    let good = dir.path().join("good.wav");
    std::fs::write(&good, test_wav_bytes()).unwrap();

    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();

    let result = run_wavforge(&[
        "-file",
        dir.path().join("missing.wav").to_str().unwrap(),
        "-file",
        good.to_str().unwrap(),
        "-outfile",
        out_dir.to_str().unwrap(),
    ]);

    // One failure, one save: partial-failure exit, but the good file is
    // still written.
    assert!(!result.status.success());
    let stdout = stdout_string(&result);
    assert!(stdout.contains("Failed to load file"));
    assert!(stdout.contains("Saved file"));
    assert!(out_dir.join("good.wav").exists());
}

#[test]
fn test_positional_argument_is_invalid_call() {
    let result = run_wavforge(&["stray.wav"]);
    assert!(!result.status.success());
    assert!(stdout_string(&result).contains("Invalid command"));
}

#[test]
fn test_count_mismatch_is_invalid_call() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("in.wav");
    std::fs::write(&input, test_wav_bytes()).unwrap();

    let result = run_wavforge(&["-file", input.to_str().unwrap()]);
    assert!(!result.status.success());
    assert!(stdout_string(&result).contains("same number of inputs and outputs"));
}

#[test]
fn test_dir_scan_and_idx_expansion() {
    let dir = TempDir::new().expect("temp dir");
    for name in ["b.wav", "a.wav", "notes.txt"] {
        let path = dir.path().join(name);
        if name.ends_with(".wav") {
            std::fs::write(&path, test_wav_bytes()).unwrap();
        } else {
            std::fs::write(&path, b"not audio").unwrap();
        }
    }
    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();

    let result = run_wavforge(&[
        "-dir",
        dir.path().to_str().unwrap(),
        "-set_meta_string",
        "1263686729", // ITRK as a decimal fourcc
        "{idx}",
        "-outfile",
        out_dir.to_str().unwrap(),
    ]);
    assert!(result.status.success());

    // The scan is sorted, so a.wav is file 1 of 2.
    let first = std::fs::read(out_dir.join("a.wav")).unwrap();
    let needle = b"ITRK\x02\x00\x00\x001\x00";
    assert!(first.windows(needle.len()).any(|w| w == needle));
    let second = std::fs::read(out_dir.join("b.wav")).unwrap();
    let needle = b"ITRK\x02\x00\x00\x002\x00";
    assert!(second.windows(needle.len()).any(|w| w == needle));
}
