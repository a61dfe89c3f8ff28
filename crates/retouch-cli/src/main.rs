//! retouch: run a sequence of edits on an image file.
//!
//! Loads the input into a document, applies each `--edit` (then each
//! transform from `--edits-json`) in order, including `undo`/`redo`
//! steps, and writes the current image as PNG.
//!
//! # Usage
//!
//! ```text
//! retouch photo.jpg -o out.png --edit whitebalance:gray --edit blur:3 --edit undo
//! retouch photo.jpg -o out.png --edits-json '[{"type": "tone", "amount": 10}]'
//! ```
//!
//! Set `RUST_LOG=debug` to see each history transition.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod edit;
mod error;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::info;
use retouch_core::transform::Selection;
use retouch_core::{Document, DocumentConfig, DocumentStates, Transform, codec};

use crate::edit::Step;
use crate::error::CliError;

/// Apply edits to an image with undo/redo.
#[derive(Parser)]
#[command(name = "retouch", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    input: PathBuf,

    /// Where to write the resulting PNG.
    #[arg(short, long)]
    output: PathBuf,

    /// An edit step, e.g. `blur:5`, `resize:200x`, `filter:sepia`, `undo`.
    ///
    /// Repeat to apply several edits in order.
    #[arg(long = "edit", value_name = "EDIT")]
    edits: Vec<Step>,

    /// Further transforms as a JSON array, applied after the `--edit`
    /// steps.
    #[arg(long, value_name = "JSON")]
    edits_json: Option<String>,

    /// Keep at most this many undo entries.
    #[arg(long, value_name = "N")]
    max_history: Option<usize>,

    /// Print the final history state as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let steps = collect_steps(cli.edits, cli.edits_json.as_deref())?;

    let image = codec::decode(&read(&cli.input)?)?;
    info!("loaded {} ({})", cli.input.display(), image.dimensions());

    let config = DocumentConfig {
        max_history: cli.max_history,
    };
    let mut document = Document::load_with_config(image, config);
    for step in &steps {
        run_step(&mut document, step)?;
    }

    let png = codec::encode_png(document.image())?;
    std::fs::write(&cli.output, png).map_err(|e| CliError::io(&cli.output, e))?;
    info!("wrote {}", cli.output.display());

    report(&document.states(), cli.json)
}

/// `--edit` steps in order, then the `--edits-json` transforms.
fn collect_steps(mut steps: Vec<Step>, edits_json: Option<&str>) -> Result<Vec<Step>, CliError> {
    if let Some(json) = edits_json {
        let transforms: Vec<Transform> = serde_json::from_str(json)?;
        steps.extend(transforms.into_iter().map(Step::Apply));
    }
    Ok(steps)
}

fn run_step(document: &mut Document, step: &Step) -> Result<(), CliError> {
    match step {
        Step::Apply(transform) => {
            info!("applying {transform}");
            document.apply(transform)?;
        }
        Step::Select { mask, invert } => {
            let mask = codec::decode_mask(&read(mask)?)?;
            document.apply(&Transform::Select(Selection {
                mask,
                invert: *invert,
            }))?;
        }
        Step::Undo => {
            document.undo()?;
        }
        Step::Redo => {
            document.redo()?;
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|e| CliError::io(path, e))
}

fn report(states: &DocumentStates, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(states)?);
    } else {
        println!(
            "{}x{}  undo: {}  redo: {}",
            states.width, states.height, states.undo, states.redo
        );
    }
    Ok(())
}
