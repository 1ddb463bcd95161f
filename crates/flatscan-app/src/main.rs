// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Flatscan — Document photo rectifier
//
// Entry point. Initialises logging, loads configuration, and runs one scan or
// manual correction per invocation.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use flatscan_core::error::Result;
use flatscan_core::human_errors::humanize_error;
use flatscan_core::types::{Point, Quad, StoredScan};
use flatscan_core::ScanConfig;

use services::data_dir::default_scan_dir;
use services::scan_service::ScanService;

#[derive(Parser, Debug)]
#[command(
    name = "flatscan",
    version,
    about = "Turns photographs of paper documents into flat, scan-like images."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Directory where results are stored
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,
    /// JSON file overriding pipeline parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print the stored record as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect the document automatically and rectify it
    Scan {
        /// Photograph to process
        input: PathBuf,
    },
    /// Rectify using corners you supply
    Correct {
        /// Photograph to process
        input: PathBuf,
        /// Four corners as x,y in original pixels, any order
        /// (defaults to a 5% inset from the image edges)
        #[arg(long, num_args = 4, value_parser = parse_point)]
        corners: Option<Vec<Point>>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("Flatscan starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let human = humanize_error(&err);
            tracing::error!(error = %err, severity = ?human.severity, "run failed");
            eprintln!("{} {}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.common.config {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::default(),
    };
    let out_dir = cli.common.out_dir.clone().unwrap_or_else(default_scan_dir);
    let service = ScanService::init(config, out_dir)?;

    let record = match &cli.command {
        Command::Scan { input } => service.scan_file(input).await?,
        Command::Correct { input, corners } => {
            let quad = corners.as_deref().and_then(quad_from_points);
            service.correct_file(input, quad).await?
        }
    };

    report(&service, &record, cli.common.json)
}

fn report(service: &ScanService, record: &StoredScan, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    let path = service.store().image_path(record);
    match record.corners {
        Some(quad) => {
            println!("Rectified scan saved to {}", path.display());
            println!(
                "  corners: ({:.0},{:.0}) ({:.0},{:.0}) ({:.0},{:.0}) ({:.0},{:.0})",
                quad.top_left.x,
                quad.top_left.y,
                quad.top_right.x,
                quad.top_right.y,
                quad.bottom_right.x,
                quad.bottom_right.y,
                quad.bottom_left.x,
                quad.bottom_left.y
            );
        }
        None => {
            println!("No document found; original saved to {}", path.display());
            println!("  try `flatscan correct` with --corners to mark the page by hand");
        }
    }
    println!("  confidence: {:.2}", record.confidence);
    println!("  id: {}", record.id);
    Ok(())
}

fn quad_from_points(points: &[Point]) -> Option<Quad> {
    <[Point; 4]>::try_from(points).ok().map(Quad::from_ordered)
}

/// Parse a corner given as `x,y`.
fn parse_point(s: &str) -> std::result::Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got `{s}`"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("`{v}` is not a number"))
    };
    Ok(Point::new(coord(x)?, coord(y)?))
}
