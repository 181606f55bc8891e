//! wavforge CLI - batch WAV conversion and tagging
//!
//! Files are processed sequentially: each input is fully loaded, decoded,
//! run through the modifier queue, and re-encoded before the next one
//! starts. One line per file goes to stdout; a failed file is reported and
//! skipped, and the batch carries on.

use std::path::Path;

use tracing::debug;
use wavforge_lib::pipeline::ModContext;
use wavforge_lib::wav::WavFile;
use wavforge_lib::{cli, init, Config, Error};

fn main() {
    let _ = init(Config::default());
    let args: Vec<String> = std::env::args().collect();
    std::process::exit(run(&args));
}

fn run(args: &[String]) -> i32 {
    let opts = match cli::parse_args(args) {
        Ok(opts) => opts,
        Err(err) => {
            println!("{}", err);
            return err.exit_code();
        }
    };

    let total = opts.inputs.len();
    let mut saved = 0usize;
    for (index, input) in opts.inputs.iter().enumerate() {
        let output = &opts.outputs[index];
        debug!(%input, %output, "processing");

        let bytes = match std::fs::read(input) {
            Ok(bytes) => bytes,
            Err(_) => {
                println!("Failed to load file: \"{}\"", input);
                continue;
            }
        };

        let mut wav = WavFile::new();
        if wav.load_from_memory(&bytes).is_err() {
            println!("Failed to load file: \"{}\"", input);
            continue;
        }

        let audio = match wav.get_all_samples() {
            Ok(audio) => audio,
            Err(_) => {
                println!("Failed to get all samples from file: \"{}\"", input);
                continue;
            }
        };

        for modifier in &opts.modifiers {
            let ctx = ModContext {
                index,
                total,
                audio: &audio,
            };
            if !modifier.apply(&mut wav, &ctx) {
                println!(
                    "Operation {} failed on file: \"{}\"",
                    modifier.operation(),
                    output
                );
            }
        }

        if wav.save_as_pcm(Path::new(output), &audio, None).is_err() {
            println!("Failed to save file: \"{}\"", output);
            continue;
        }

        println!("Saved file: \"{}\"", output);
        saved += 1;
    }

    if saved == total {
        0
    } else {
        Error::PartialFailure.exit_code()
    }
}
