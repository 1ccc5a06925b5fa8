use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use stackvars::capture::NO_LOCATION;
use stackvars::{
    util, CaptureBuffer, CapturedFrame, Config, LocalBinding, Observed, Routine, SafeValue,
    SnapshotConverter, StackFrame,
};

#[derive(Parser)]
#[command(name = "stackvars", version, about = "Inspect stack captures and their locals")]
struct Cli {
    /// Data directory (default: ~/.stackvars)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file to use instead of ~/.stackvars/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a capture document into diagnostic stack elements
    Convert {
        /// JSON capture document (`-` for stdin)
        input: PathBuf,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
        /// Ignore captured locals
        #[arg(long)]
        no_locals: bool,
    },
    /// Print the effective configuration
    Config,
}

/// A standard trace plus the frames an instrumentation hook captured for it.
#[derive(Deserialize)]
struct CaptureDocument {
    frames: Vec<StackFrame>,
    #[serde(default)]
    capture: Option<Vec<RawFrame>>,
}

#[derive(Deserialize)]
struct RawFrame {
    routine: String,
    #[serde(default)]
    receiver: Option<SafeValue>,
    #[serde(default)]
    locals: Vec<Option<RawLocal>>,
    #[serde(default = "no_location")]
    location: i64,
    line_number: i32,
}

#[derive(Deserialize)]
struct RawLocal {
    name: String,
    #[serde(default)]
    declared_type: String,
    #[serde(default)]
    generic_type: Option<String>,
    #[serde(default = "default_live")]
    live: bool,
    #[serde(default)]
    value: Option<SafeValue>,
}

fn no_location() -> i64 {
    NO_LOCATION
}

fn default_live() -> bool {
    true
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_data_dir(cli.data_dir.clone());

    let (config, warnings) = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            let warning = config.apply_env();
            (config, warning.into_iter().collect::<Vec<_>>())
        }
        None => Config::load_with_warnings(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
    for warning in &warnings {
        warning.log();
    }

    match cli.command {
        Command::Convert {
            input,
            pretty,
            no_locals,
        } => convert(&config, &input, pretty, no_locals),
        Command::Config => {
            let path = cli.config.unwrap_or_else(util::config_path);
            println!("# {}", path.display());
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn convert(config: &Config, input: &Path, pretty: bool, no_locals: bool) -> Result<()> {
    let contents = read_input(input)?;
    let document: CaptureDocument = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid capture document {}", input.display()))?;

    let buffer = document.capture.as_deref().map(build_buffer).transpose()?;
    let captured = buffer.as_ref().map(CaptureBuffer::len);

    let mut converter = SnapshotConverter::from_config(&config.capture);
    if no_locals {
        converter = converter.with_capture_locals(false);
    }
    let elements = converter.convert(&document.frames, buffer);
    tracing::info!(
        frames = document.frames.len(),
        captured = ?captured,
        "Converted capture document"
    );

    let output = if pretty {
        serde_json::to_string_pretty(&elements)?
    } else {
        serde_json::to_string(&elements)?
    };
    println!("{output}");
    Ok(())
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut contents = String::new();
        io::stdin()
            .read_to_string(&mut contents)
            .context("Failed to read stdin")?;
        return Ok(contents);
    }
    fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

/// Borrow every captured value straight out of the parsed document.
fn build_buffer(frames: &[RawFrame]) -> Result<CaptureBuffer<'_>> {
    frames
        .iter()
        .map(|frame| {
            let routine: Routine = frame
                .routine
                .parse()
                .with_context(|| format!("Invalid routine {:?}", frame.routine))?;
            let locals = frame
                .locals
                .iter()
                .map(|slot| slot.as_ref().map(binding))
                .collect();
            Ok(CapturedFrame::from_raw_location(
                routine,
                frame.receiver.as_ref().map(|r| r as &dyn Observed),
                locals,
                frame.location,
                frame.line_number,
            ))
        })
        .collect()
}

fn binding(local: &RawLocal) -> LocalBinding<'_> {
    if local.live {
        LocalBinding::live(
            local.name.clone(),
            local.declared_type.clone(),
            local.generic_type.clone(),
            local.value.as_ref().map(|v| v as &dyn Observed),
        )
    } else {
        LocalBinding::dead(
            local.name.clone(),
            local.declared_type.clone(),
            local.generic_type.clone(),
        )
    }
}
