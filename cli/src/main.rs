use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum, ValueHint};
use pannier::activity::Sport;
use pannier::convert::{self, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert a raw sample track to a FIT activity file", long_about = None)]
struct Cli {
    /// Sample track to convert (JSON)
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output activity file path
    #[arg(short, long, default_value = "activity.fit", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Number of times to replay the track, alternating direction
    #[arg(long, default_value_t = 1)]
    repeat: u32,

    /// Sport stamped into the summary messages
    #[arg(long, value_enum, default_value_t = SportOpt::Cycling)]
    sport: SportOpt,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SportOpt {
    Generic,
    Running,
    Cycling,
}

impl From<SportOpt> for Sport {
    fn from(opt: SportOpt) -> Self {
        match opt {
            SportOpt::Generic => Sport::Generic,
            SportOpt::Running => Sport::Running,
            SportOpt::Cycling => Sport::Cycling,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = Config {
        input: cli.input.clone(),
        output: cli.output.clone(),
        repeat_count: cli.repeat,
        sport: cli.sport.into(),
    };

    convert::run(&config).with_context(|| format!("converting {}", cli.input.display()))?;

    info!(output = %cli.output.display(), "conversion complete");

    Ok(())
}
