//! Command line tool for switching the proxy mode and editing proxy exceptions

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use setproxy_core::{Action, ActionKind, ConfigLoader, OptionBuilder, Outcome, StoreBackend};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser, Debug)]
#[command(
    name = "setproxy",
    about = "Set the proxy mode and maintain the proxy exception list",
    version
)]
struct Args {
    #[command(flatten)]
    mode: ModeArgs,

    /// Config file path
    #[arg(long, short = 'c', env = "SETPROXY_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Settings store: system | file
    #[arg(long, value_name = "BACKEND")]
    store: Option<String>,

    /// Store file for the file backend
    #[arg(long, value_name = "PATH")]
    store_path: Option<PathBuf>,

    /// Edit this connection instead of the default one
    #[arg(long, value_name = "NAME")]
    connection: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Exactly one of these selects what to do
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct ModeArgs {
    /// Connect directly, without a proxy
    #[arg(long)]
    none: bool,

    /// Detect proxy settings automatically
    #[arg(long)]
    auto: bool,

    /// Use a proxy auto-configuration script
    #[arg(long, value_name = "PAC_URL")]
    pac: Option<String>,

    /// Use an HTTP proxy; bypass is a list of hosts that skip it
    #[arg(long, num_args = 3, value_names = ["HOST", "PORT", "BYPASS"], allow_hyphen_values = true)]
    http: Option<Vec<String>>,

    /// Use a SOCKS proxy; bypass is a list of hosts that skip it
    #[arg(long, num_args = 3, value_names = ["HOST", "PORT", "BYPASS"], allow_hyphen_values = true)]
    socks: Option<Vec<String>>,

    /// Add a host pattern to the proxy exceptions
    #[arg(long, value_name = "PATTERN")]
    add_exception: Option<String>,

    /// Remove a host pattern from the proxy exceptions
    #[arg(long, value_name = "PATTERN")]
    del_exception: Option<String>,
}

impl ModeArgs {
    /// The selected mode and the values given with it
    fn request(self) -> Option<(ActionKind, Vec<String>)> {
        let request = if self.none {
            (ActionKind::None, Vec::new())
        } else if self.auto {
            (ActionKind::Auto, Vec::new())
        } else if let Some(url) = self.pac {
            (ActionKind::Pac, vec![url])
        } else if let Some(values) = self.http {
            (ActionKind::Http, values)
        } else if let Some(values) = self.socks {
            (ActionKind::Socks, values)
        } else if let Some(pattern) = self.add_exception {
            (ActionKind::AddException, vec![pattern])
        } else if let Some(pattern) = self.del_exception {
            (ActionKind::DelException, vec![pattern])
        } else {
            return None;
        };
        Some(request)
    }
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

    // Initialize logging
    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(outcome) => {
            tracing::debug!("Finished: {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<Outcome> {
    // Argument problems are reported before any store access
    let (kind, values) = args.mode.request().context("No mode given")?;
    let action = Action::resolve(kind, &values)?;

    let mut config =
        ConfigLoader::load_or_default(args.config).context("Failed to load configuration")?;
    if let Some(backend) = args.store {
        config.store.backend = backend.parse::<StoreBackend>()?;
    }
    if let Some(path) = args.store_path {
        config.store.path = Some(path);
    }
    if let Some(connection) = args.connection {
        config.store.connection = Some(connection);
    }

    let mut store = config
        .store
        .open()
        .with_context(|| format!("Failed to open {} store", config.store.backend))?;
    let scope = config.store.scope();
    tracing::debug!("Applying {} to {}", action.kind(), scope);

    let outcome = OptionBuilder::new(&mut *store, scope).apply(&action)?;
    if let Outcome::Applied {
        refreshed: false, ..
    } = outcome
    {
        tracing::warn!("Settings were written but running applications were not notified");
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("setproxy").chain(argv.iter().copied()))
    }

    #[test]
    fn test_http_takes_three_values() {
        let args = parse(&["--http", "proxy.local", "8080", ""]).unwrap();
        let (kind, values) = args.mode.request().unwrap();
        assert_eq!(kind, ActionKind::Http);
        assert_eq!(values, vec!["proxy.local", "8080", ""]);
    }

    #[test]
    fn test_exception_modes() {
        let args = parse(&["--del-exception", "*.corp"]).unwrap();
        assert_eq!(
            args.mode.request().unwrap(),
            (ActionKind::DelException, vec!["*.corp".to_string()])
        );
    }

    #[test]
    fn test_modes_are_exclusive() {
        let err = parse(&["--none", "--auto"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_mode_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--socks", "s.local", "1080"]).is_err());
    }

    #[test]
    fn test_global_options() {
        let args = parse(&["--auto", "--store", "file", "--connection", "VPN", "-v"]).unwrap();
        assert_eq!(args.store.as_deref(), Some("file"));
        assert_eq!(args.connection.as_deref(), Some("VPN"));
        assert!(args.verbose);
    }

    #[test]
    fn test_run_against_file_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let store_path = dir.path().join("store.toml");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();
        let store_arg = store_path.to_str().unwrap();
        let config_arg = config_path.to_str().unwrap();

        let base = ["--config", config_arg, "--store", "file", "--store-path", store_arg];
        let with = |mode: &[&str]| {
            let argv: Vec<&str> = mode.iter().chain(base.iter()).copied().collect();
            run(parse(&argv).unwrap())
        };

        assert_eq!(
            with(&["--del-exception", "a.com"]).unwrap(),
            Outcome::NothingToDelete
        );
        assert!(with(&["--add-exception", "a.com"]).unwrap().wrote());
        assert!(with(&["--add-exception", "b.com"]).unwrap().wrote());
        assert_eq!(
            with(&["--add-exception", "a.com"]).unwrap(),
            Outcome::AlreadyPresent
        );

        let contents = std::fs::read_to_string(&store_path).unwrap();
        assert!(contents.contains("proxy_bypass = \"a.com;b.com\""));
    }

    #[test]
    fn test_run_rejects_empty_host() {
        let err = run(parse(&["--http", "", "8080", ""]).unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("non-empty host"));
    }

    #[test]
    fn test_malformed_store_reported_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let store_path = dir.path().join("store.toml");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&store_path, "connections = 3\n").unwrap();
        std::fs::write(&config_path, "[store]\nbackend = \"file\"\n").unwrap();

        let argv = ["--add-exception", "a.com", "--config", config_path.to_str().unwrap()];
        let err = run(parse(&argv).unwrap()).unwrap_err();
        let message = format!("{err:#}");

        assert!(message.starts_with("Cannot get current proxy bypass: malformed store file"));
        assert_eq!(message.matches("malformed store file").count(), 1);
        assert_eq!(message.matches("TOML parse error").count(), 1);
    }
}
