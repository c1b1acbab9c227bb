//! End-to-end conversion of a raw track file into an activity file.

use std::{fs, path::PathBuf};

use thiserror::Error;
use tracing::info;

use crate::{
    activity::{Assembler, BuildError, Sport},
    sample::{self, ParseError},
    wire::Document,
};

/// Settings for one conversion run.
#[derive(Clone, Debug)]
pub struct Config {
    /// Path of the raw JSON sample track.
    pub input: PathBuf,
    /// Path of the activity file to produce.
    pub output: PathBuf,
    /// Number of times to replay the track, alternating direction.
    pub repeat_count: u32,
    /// Sport stamped into the summary messages.
    pub sport: Sport,
}

/// An error converting a track.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Reading the input or writing the output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The input is not a valid sample track.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The track could not be assembled into a document.
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Convert one raw sample track into a finished activity file.
///
/// Fails without touching the output path if the input cannot be read,
/// parsed, or assembled.
pub fn run(config: &Config) -> Result<(), ConvertError> {
    let raw = fs::read(&config.input)?;
    let samples = sample::parse(&raw)?;

    info!(samples = samples.len(), "parsed sample track");

    let document =
        Assembler::new(Document::new(), config.sport).build(&samples, config.repeat_count)?;

    info!(
        bytes = document.len(),
        output = %config.output.display(),
        "assembled activity"
    );

    fs::write(&config.output, &document)?;

    Ok(())
}
