//! `decoyscope` — terminal console for monitoring an SSH/Telnet decoy service.
//!
//! Built on [ratatui](https://ratatui.rs). Screens are navigable via number
//! keys (1-3): Overview, Logs, and Alerts. A background data bridge runs the
//! periodic refresh timer and forwards every fetch result into the action loop.
//!
//! Logs are written to a file (default `/tmp/decoyscope.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, config resolution, tracing setup, panic
//! hooks, and app launch.

mod action;
mod app;
mod bindings;
mod component;
mod data_bridge;
mod event;
mod overlay;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, bail};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use decoyscope_core::{ConsoleConfig, TlsVerification};

use crate::app::App;

/// Terminal console for watching a decoy SSH/Telnet service.
#[derive(Parser, Debug)]
#[command(name = "decoyscope", version, about)]
struct Cli {
    /// API base URL (e.g., http://localhost:8080/api/honeypot)
    #[arg(short = 'u', long, env = "DECOYSCOPE_URL")]
    url: Option<String>,

    /// Profile from the config file
    #[arg(short = 'p', long, env = "DECOYSCOPE_PROFILE")]
    profile: Option<String>,

    /// Automatic refresh period (e.g., 30s, 2m)
    #[arg(long)]
    refresh: Option<humantime::Duration>,

    /// Rows per log page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    page_size: Option<u32>,

    /// Per-request timeout (e.g., 10s)
    #[arg(long)]
    timeout: Option<humantime::Duration>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Directory HTML reports are written to
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Write a starter config file and exit
    #[arg(long)]
    init_config: bool,

    /// Log file path (defaults to /tmp/decoyscope.log)
    #[arg(long, default_value = "/tmp/decoyscope.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "decoyscope={log_level},decoyscope_core={log_level},decoyscope_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("decoyscope.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Config file + environment, then CLI flags on top.
fn resolve_config(cli: &Cli) -> Result<ConsoleConfig> {
    let file = decoyscope_config::load_config().wrap_err("failed to load config")?;
    let mut config = decoyscope_config::resolve_console_config(&file, cli.profile.as_deref())?;

    if let Some(url) = &cli.url {
        config.base_url.clone_from(url);
        config.url().wrap_err("invalid --url")?;
    }
    if let Some(refresh) = cli.refresh {
        if refresh.is_zero() {
            bail!("--refresh must be greater than zero");
        }
        config.refresh_interval = refresh.into();
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = Some(timeout.into());
    }
    if cli.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.init_config {
        let path = decoyscope_config::config_path();
        decoyscope_config::write_default_config(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    // Resolve before touching the terminal so errors print normally
    let config = resolve_config(&cli)?;
    let client = config.build_client().wrap_err("failed to build HTTP client")?;

    tui::install_hooks()?;
    let _guard = setup_tracing(&cli);

    info!(
        url = %config.base_url,
        refresh = %humantime::format_duration(config.refresh_interval),
        "starting decoyscope"
    );

    let mut app = App::new(&config, client, cli.export_dir.clone());
    app.run().await
}
