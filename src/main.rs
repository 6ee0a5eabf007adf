//! `orbicam` command line: headless gesture replay and options schema.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use orbicam::replay::{self, Script};
use orbicam::{OrbicamError, Options};

#[derive(Parser)]
#[command(name = "orbicam", version, about = "Orbit camera controls toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a gesture script and print one JSON line per rendered frame.
    Replay {
        /// TOML gesture script.
        script: PathBuf,
        /// TOML options preset.
        #[arg(long)]
        options: Option<PathBuf>,
        /// Frames per second of the simulated display.
        #[arg(long, default_value_t = 60.0)]
        fps: f64,
    },
    /// Print the JSON schema of the UI-exposed options.
    Schema,
}

fn replay(
    script: &Path,
    options: Option<&Path>,
    fps: f64,
) -> Result<(), OrbicamError> {
    let options = options.map_or_else(|| Ok(Options::default()), Options::load)?;
    let content = std::fs::read_to_string(script)?;
    let script = Script::from_toml(&content)?;
    let frames = replay::run(&script, &options, fps)?;

    let mut out = std::io::stdout().lock();
    for frame in &frames {
        let line = serde_json::to_string(frame)
            .map_err(|e| OrbicamError::Replay(e.to_string()))?;
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn schema() -> Result<(), OrbicamError> {
    let schema = serde_json::to_string_pretty(&Options::json_schema())
        .map_err(|e| OrbicamError::OptionsParse(e.to_string()))?;
    writeln!(std::io::stdout().lock(), "{schema}")?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Replay {
            script,
            options,
            fps,
        } => replay(&script, options.as_deref(), fps),
        Command::Schema => schema(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
