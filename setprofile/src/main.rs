//! Write a single key/value pair into an INI-style profile file

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use setproxy_core::profile;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser, Debug)]
#[command(
    name = "setprofile",
    about = "Set one key in a section of an INI-style profile file",
    version
)]
struct Args {
    /// Profile file to update (created if missing)
    file: PathBuf,

    /// Section name, without brackets
    section: String,

    /// Key to set
    key: String,

    /// New value
    #[arg(allow_hyphen_values = true)]
    value: String,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    if args.section.trim().is_empty() || args.key.trim().is_empty() {
        anyhow::bail!("Section and key must not be empty");
    }

    profile::write_profile_string(&args.file, args.section.trim(), args.key.trim(), &args.value)
        .with_context(|| format!("Failed to set [{}] {}", args.section, args.key))
}
