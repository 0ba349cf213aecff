//! TBM Soil - soil type and penetration rate advisor
//!
//! # Usage
//!
//! ```bash
//! # Single reading
//! tbm-soil match --thrust 3585 --torque 439 --speed 2.85
//!
//! # Top three candidates as JSON
//! tbm-soil match --thrust 5000 --torque 600 --speed 5.0 --top 3 --json
//!
//! # Classify a logged drive
//! tbm-soil batch --csv rings.csv
//!
//! # JSON API
//! tbm-soil serve --addr 0.0.0.0:8080
//! ```
//!
//! # Environment Variables
//!
//! - `TBM_CONFIG`: Path to a `tbm_config.toml`
//! - `TBM_LOG_FORMAT`: Set to `json` for JSON log lines
//! - `TBM_CORS_ORIGINS`: Allowed CORS origins for `serve`
//! - `RUST_LOG`: Logging level (default: info)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use tbm_soil::advisory::{self, MeasurementInput, Recommendation};
use tbm_soil::api::{create_app, ApiState};
use tbm_soil::config::{self, defaults, TbmConfig};
use tbm_soil::ingest::{self, LoggedReading};
use tbm_soil::matcher::ProfileTable;
use tbm_soil::types::Dimension;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "tbm-soil")]
#[command(about = "TBM soil type matcher and penetration rate advisor")]
#[command(version)]
struct CliArgs {
    /// Path to a tbm_config.toml (overrides TBM_CONFIG and ./tbm_config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Match one reading to a soil type
    Match {
        /// Thrust (kN)
        #[arg(long)]
        thrust: Option<f64>,
        /// Cutterhead torque (kNm)
        #[arg(long)]
        torque: Option<f64>,
        /// Cutter speed (rpm)
        #[arg(long)]
        speed: Option<f64>,
        /// Show this many ranked candidates
        #[arg(long, default_value = "1")]
        top: usize,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the active soil profiles
    Profiles {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Classify every row of a CSV log (thrust,torque,speed[,label])
    Batch {
        /// Path to the CSV file
        #[arg(long)]
        csv: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Serve the JSON API
    Serve {
        /// Override the server address (default from config: "0.0.0.0:8080")
        #[arg(short, long)]
        addr: Option<String>,
    },
}

// ============================================================================
// Logging
// ============================================================================

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var(defaults::LOG_FORMAT_ENV_VAR)
        .is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    // Logs go to stderr so stdout stays clean for results
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

// ============================================================================
// Subcommands
// ============================================================================

fn run_match(
    table: &ProfileTable,
    cfg: &TbmConfig,
    input: MeasurementInput,
    top: usize,
    json: bool,
) -> Result<()> {
    let reading = input.into_reading()?;
    let best = table.match_reading(&reading);
    let recommendation =
        Recommendation::from_match(&best, advisory::envelope_warnings(&cfg.envelope, &reading));

    for w in &recommendation.warnings {
        warn!("{}", w);
    }

    if top <= 1 {
        if json {
            println!("{}", serde_json::to_string_pretty(&recommendation)?);
        } else {
            println!("Soil Type:        {}", recommendation.soil_type);
            println!("Soil Group:       {}", recommendation.soil_group);
            println!("Penetration Rate: {}", recommendation.penetration_rate);
            println!(
                "Match:            {} (normalized distance {:.4})",
                recommendation.quality, recommendation.distance
            );
        }
        return Ok(());
    }

    let ranked: Vec<_> = table.rank(&reading).into_iter().take(top).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    } else {
        println!("Reading: {reading}");
        for (i, m) in ranked.iter().enumerate() {
            let flags: String = Dimension::ALL
                .iter()
                .map(|&d| if m.dimension(d).in_range { '+' } else { '-' })
                .collect();
            println!(
                "{:>2}. {:<36} {:>6.2} mm/rev  distance {:.4}  [{}]",
                i + 1,
                m.soil_type(),
                m.rop_mean,
                m.distance,
                flags
            );
        }
    }
    Ok(())
}

fn run_profiles(table: &ProfileTable, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(table)?);
        return Ok(());
    }
    println!(
        "{:<2} {:<36} {:<18} {:>11} {:>9} {:>11} {:>10}",
        "#", "Soil Type", "Group", "Thrust kN", "Torque kNm", "Speed rpm", "ROP mm/rev"
    );
    for (i, p) in table.profiles().iter().enumerate() {
        println!(
            "{:<2} {:<36} {:<18} {:>11} {:>9} {:>11} {:>10.3}",
            i,
            p.name(),
            p.group(),
            p.range(Dimension::Thrust).to_string(),
            p.range(Dimension::Torque).to_string(),
            p.range(Dimension::Speed).to_string(),
            p.rop_mean()
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct BatchRow {
    #[serde(flatten)]
    logged: LoggedReading,
    recommendation: Recommendation,
}

fn run_batch(table: &ProfileTable, cfg: &TbmConfig, csv: &Path, json: bool) -> Result<()> {
    let readings = ingest::read_readings_csv(csv)
        .with_context(|| format!("Failed to load readings from {}", csv.display()))?;
    if readings.is_empty() {
        return Err(anyhow::anyhow!("No readings loaded from {}", csv.display()));
    }

    // The table is read-only; rows are independent
    let rows: Vec<BatchRow> = readings
        .into_par_iter()
        .map(|logged| {
            let m = table.match_reading(&logged.reading);
            let warnings = advisory::envelope_warnings(&cfg.envelope, &logged.reading);
            BatchRow {
                recommendation: Recommendation::from_match(&m, warnings),
                logged,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        println!(
            "line {:>5}  {:<12} {:<36} {}",
            row.logged.line,
            row.logged.label.as_deref().unwrap_or("-"),
            row.recommendation.soil_type,
            row.recommendation.penetration_rate
        );
    }

    let mut summary: BTreeMap<&str, usize> = BTreeMap::new();
    for row in &rows {
        *summary.entry(row.recommendation.soil_type.as_str()).or_default() += 1;
    }
    let exact = rows.iter().filter(|r| r.recommendation.all_in_range).count();
    println!();
    println!("{} readings, {} exact matches", rows.len(), exact);
    for (soil, count) in summary {
        println!("  {count:>5}  {soil}");
    }
    Ok(())
}

async fn run_server(table: Arc<ProfileTable>, cfg: &TbmConfig, addr: Option<String>) -> Result<()> {
    let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
    let app = create_app(ApiState::new(table, cfg.envelope));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received shutdown signal");
        })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = CliArgs::parse();

    let loaded = TbmConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    config::init(loaded);
    let cfg = config::get();
    let table = cfg.build_table().context("Failed to build soil table")?;
    info!(profiles = table.len(), "Soil table ready");

    match args.command {
        SubCommand::Match {
            thrust,
            torque,
            speed,
            top,
            json,
        } => run_match(
            &table,
            cfg,
            MeasurementInput::new(thrust, torque, speed),
            top,
            json,
        ),
        SubCommand::Profiles { json } => run_profiles(&table, json),
        SubCommand::Batch { csv, json } => run_batch(&table, cfg, &csv, json),
        SubCommand::Serve { addr } => run_server(table, cfg, addr).await,
    }
}
