// SentinelMesh CLI - Fleet reliability report and query tool
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # SentinelMesh CLI
//!
//! Prints the fleet reliability report for an enriched events file, or
//! answers a single question about it.
//!
//! ## Usage
//!
//! ```bash
//! # Full report
//! sentinelmesh --events enriched_events.jsonl
//!
//! # One question
//! sentinelmesh --ask "Which gateway does Door Sensor 08 use?"
//!
//! # Fleet state at a past instant
//! sentinelmesh --replay-at 2025-01-01T12:00:00Z --json
//! ```

mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sentinelmesh::{parse_timestamp, EventStore, QueryEngine, ReportConfig, Timeline};
use serde_json::json;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use report::Report;

/// SentinelMesh fleet reliability report
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON report configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enriched events file (JSONL), overrides the config file
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// Number of maintenance priority entries, overrides the config file
    #[arg(short, long)]
    top: Option<usize>,

    /// Answer one question instead of printing the report
    #[arg(short, long)]
    ask: Option<String>,

    /// Print fleet state at this instant instead of the report
    #[arg(long)]
    replay_at: Option<String>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("SentinelMesh v{}", sentinelmesh::VERSION);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Resolve the configuration: file (or defaults), then CLI overrides.
fn load_config(args: &Args) -> sentinelmesh::Result<ReportConfig> {
    let mut config = match &args.config {
        Some(path) => ReportConfig::from_json_file(path)?,
        None => ReportConfig::default(),
    };
    if let Some(events) = &args.events {
        config = config.with_events_path(events);
    }
    if let Some(top) = args.top {
        config = config.with_top_n(top);
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    let store = EventStore::load_jsonl(&config.events_path)?;

    if let Some(question) = &args.ask {
        let answer = QueryEngine::new(&store).ask(question);
        if args.json {
            println!("{}", json!({ "question": question, "answer": answer }));
        } else {
            println!("{}", answer);
        }
        return Ok(());
    }

    if let Some(raw) = &args.replay_at {
        let at = parse_timestamp(raw).ok_or_else(|| format!("invalid timestamp: {}", raw))?;
        let timeline = Timeline::from_store(&store);
        let states = timeline.state_at(at);
        let warnings = timeline.active_warnings(at);
        if args.json {
            let body = json!({ "at": at, "states": states, "warnings": warnings });
            println!("{}", serde_json::to_string_pretty(&body)?);
        } else {
            println!("=== DEVICE STATE AT {} ===", at.to_rfc3339());
            for state in &states {
                println!("{} {:.1} {}", state.device, state.confidence, state.status);
            }
            println!();
            println!("=== ACTIVE WARNINGS ===");
            if warnings.is_empty() {
                println!("No devices below confidence threshold at this time.");
            }
            for warning in &warnings {
                println!("- {}", warning);
            }
        }
        return Ok(());
    }

    let report = Report::build(&store, config.maintenance_top_n);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }
    Ok(())
}
