mod api;
mod config;
mod report;
mod server;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use pagewatch_logging::{init_tracing, LogFormat};

use crate::config::ProjectConfig;
use crate::server::ServeOptions;

#[derive(Parser, Debug)]
#[command(
    name = "pagewatch",
    about = "Harness for testing whether page markup changes are detected",
    version,
    author
)]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the monitored pages and the control API
    Serve {
        /// Directory holding the pages and pagewatch.toml (default: current directory)
        #[arg(short = 'd', long)]
        dir: Option<PathBuf>,

        /// Address to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Time between two reads of the active page (e.g. 20s, 500ms)
        #[arg(long, value_parser = parse_poll_interval)]
        poll_interval: Option<Duration>,

        /// Do not open the page in a browser
        #[arg(long)]
        no_open: bool,

        /// Directory for log files, relative to --dir
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Log to the console only
        #[arg(long)]
        no_log_file: bool,
    },

    /// Summarise a persisted event log
    Report {
        /// Snapshot file (default: from pagewatch.toml, else simulation_log.json)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Directory holding pagewatch.toml (default: current directory)
        #[arg(short = 'd', long)]
        dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_format: LogFormat = cli.log_format.into();

    match cli.command {
        Command::Serve {
            dir,
            host,
            port,
            poll_interval,
            no_open,
            log_dir,
            no_log_file,
        } => {
            let root = resolve_dir(dir)?;
            let project = ProjectConfig::load(&root)?.unwrap_or_default();

            let log_dir = (!no_log_file)
                .then(|| root.join(log_dir.unwrap_or_else(|| project.log_dir())));
            let (_guard, log_path) = init_tracing(&cli.log_level, log_format, log_dir.as_deref())
                .context("Failed to initialize logging")?;
            if let Some(path) = log_path {
                tracing::info!(path = %path.display(), "Logging to file");
            }

            let mut monitor = project.monitor_config(&root);
            if let Some(interval) = poll_interval {
                monitor = monitor.with_poll_interval(interval);
            }

            let options = ServeOptions {
                host: host.unwrap_or_else(|| project.host().to_string()),
                port: port.unwrap_or_else(|| project.port()),
                open_browser: !no_open && project.open_browser(),
                root,
                monitor,
            };

            server::handle_serve_command(options).await
        }
        Command::Report {
            snapshot,
            dir,
            json,
        } => {
            init_tracing(&cli.log_level, log_format, None)
                .context("Failed to initialize logging")?;

            let root = resolve_dir(dir)?;
            let snapshot = match snapshot {
                Some(path) => path,
                None => ProjectConfig::load(&root)?
                    .unwrap_or_default()
                    .monitor_config(&root)
                    .snapshot_path
                    .context("No snapshot file configured")?,
            };

            report::handle_report_command(&snapshot, json)
        }
    }
}

fn parse_poll_interval(value: &str) -> Result<Duration, String> {
    let interval = humantime::parse_duration(value).map_err(|e| e.to_string())?;
    if interval.is_zero() {
        return Err("poll interval must be greater than zero".to_string());
    }
    Ok(interval)
}

fn resolve_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().context("Failed to get current directory"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_poll_interval(args: &[&str]) -> Result<Option<Duration>, clap::Error> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Command::Serve { poll_interval, .. } => Ok(poll_interval),
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn test_poll_interval_accepts_humantime() {
        let parsed =
            serve_poll_interval(&["pagewatch", "serve", "--poll-interval", "20s"]).unwrap();
        assert_eq!(parsed, Some(Duration::from_secs(20)));

        let parsed =
            serve_poll_interval(&["pagewatch", "serve", "--poll-interval", "500ms"]).unwrap();
        assert_eq!(parsed, Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_poll_interval_defaults_to_config() {
        assert_eq!(serve_poll_interval(&["pagewatch", "serve"]).unwrap(), None);
    }

    #[test]
    fn test_poll_interval_rejects_zero() {
        let err =
            serve_poll_interval(&["pagewatch", "serve", "--poll-interval", "0s"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_poll_interval_rejects_garbage() {
        let err =
            serve_poll_interval(&["pagewatch", "serve", "--poll-interval", "soon"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
