use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use pagewatch_core::{load_snapshot, EventKind, Report};

/// Summarise an event log snapshot written by a (possibly finished) server.
pub fn handle_report_command(snapshot: &Path, json: bool) -> Result<()> {
    let events = load_snapshot(snapshot)
        .with_context(|| format!("Failed to load snapshot {}", snapshot.display()))?;
    let report = Report::from_events(events);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &Report) {
    println!("{}", "=== Simulation Report ===".bright_blue().bold());
    println!("{}  {}", "Document Switches:".dimmed(), report.total_changes);
    println!("{}  {}", "Detected Changes:".dimmed(), report.detected_changes);
    println!("{}  {:.2}%", "Detection Accuracy:".dimmed(), report.accuracy);

    if report.log.is_empty() {
        println!();
        println!("{}", "No events recorded.".dimmed());
        return;
    }

    println!();
    println!("{}", format!("--- Events ({}) ---", report.log.len()).dimmed());
    for event in &report.log {
        let ts = event.timestamp.format("%Y-%m-%d %H:%M:%S");
        let detail = describe(&event.kind);
        let name = match event.kind {
            EventKind::ChangeDetected { .. } => event.kind.name().bright_green().to_string(),
            EventKind::DocumentSwitched { .. } => event.kind.name().bright_yellow().to_string(),
            _ => event.kind.name().bright_cyan().to_string(),
        };
        println!("  {} {:<28} {}", ts, name, detail);
    }
}

fn describe(kind: &EventKind) -> String {
    match kind {
        EventKind::SessionStarted { duration } => format!("duration={}", duration),
        EventKind::SessionEnded { status } => format!("status={}", status),
        EventKind::DocumentSwitched { document } => format!("document={}", document),
        EventKind::ChangeDetected { timestamp } => format!("at={}", timestamp.to_rfc3339()),
    }
}
