// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Markscan command line: read one photographed answer sheet and print the
// detected answers as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use markscan_core::RecognizerConfig;
use markscan_core::error::Result;
use markscan_core::human_errors::humanize_error;
use markscan_vision::{Recognizer, load_image_path};
use tracing::{debug, error, info};

/// Read the marked answers from a photo of an answer sheet.
#[derive(Debug, Parser)]
#[command(name = "markscan", version)]
#[command(about = "Read the marked answers from a photo of an answer sheet")]
struct Args {
    /// Photo of the answer sheet (JPEG, PNG, ...)
    image: PathBuf,

    /// Number of questions on the sheet
    #[arg(short = 'n', long)]
    questions: u32,

    /// JSON file overriding recognizer settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write intermediate images (mask, rectified table, grid) to this directory
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Print per-cell scores and table geometry along with the answers
    #[arg(long)]
    report: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "Recognition failed");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<String> {
    let config = match &args.config {
        Some(path) => RecognizerConfig::load(path)?,
        None => RecognizerConfig::default(),
    };
    let recognizer = Recognizer::new(config)?;
    debug!(config = ?recognizer.config(), "Recognizer configured");
    let image = load_image_path(&args.image)?;

    let recognition = match &args.debug_dir {
        Some(dir) => {
            let (recognition, artifacts) = recognizer.recognize_with_debug(&image, args.questions)?;
            let written = artifacts.write_to(dir)?;
            info!(dir = %dir.display(), files = written.len(), "Debug images saved");
            recognition
        }
        None => recognizer.recognize_with_report(&image, args.questions)?,
    };

    let json = if args.report {
        serde_json::to_string_pretty(&recognition)?
    } else {
        serde_json::to_string_pretty(&recognition.answers)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_all_flags() {
        let args = Args::try_parse_from([
            "markscan",
            "sheet.jpg",
            "--questions",
            "20",
            "--config",
            "reader.json",
            "--debug-dir",
            "out",
            "--report",
        ])
        .unwrap();
        assert_eq!(args.image, PathBuf::from("sheet.jpg"));
        assert_eq!(args.questions, 20);
        assert_eq!(args.config, Some(PathBuf::from("reader.json")));
        assert_eq!(args.debug_dir, Some(PathBuf::from("out")));
        assert!(args.report);
    }

    #[test]
    fn questions_flag_is_required() {
        assert!(Args::try_parse_from(["markscan", "sheet.jpg"]).is_err());
    }
}
