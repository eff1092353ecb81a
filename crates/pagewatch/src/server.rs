use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{info, warn};

use pagewatch_core::{FileSource, Monitor, MonitorConfig};

use crate::api;

/// Resolved settings for `pagewatch serve`.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub root: PathBuf,
    pub host: String,
    pub port: u16,
    pub open_browser: bool,
    pub monitor: MonitorConfig,
}

pub async fn handle_serve_command(options: ServeOptions) -> Result<()> {
    let source = Arc::new(FileSource::new(
        options.root.clone(),
        options.monitor.documents.clone(),
    ));
    let monitor = Monitor::new(options.monitor.clone(), source);
    let router = api::create_router(monitor.clone(), options.root.clone());

    let addr = format!("{}:{}", options.host, options.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind server to {}", addr))?;

    info!(
        %addr,
        root = %options.root.display(),
        poll_interval_secs = options.monitor.poll_interval.as_secs_f64(),
        "Starting server"
    );

    let url = format!("http://localhost:{}", options.port);
    eprintln!();
    eprintln!("  {} {}", "->".bright_green(), format!("Open {}", url).bold());
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();

    if options.open_browser {
        if let Err(e) = open::that(&url) {
            warn!(error = %e, "Failed to open browser (open {} manually)", url);
        }
    }

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if monitor.shutdown() {
        info!("Stopped running simulation on shutdown");
    }

    result.context("Server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    eprintln!("\nShutting down...");
}
