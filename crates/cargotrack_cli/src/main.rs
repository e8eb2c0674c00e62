//! Developer CLI for the CargoTrack core.
//!
//! # Responsibility
//! - Verify `cargotrack_core` linkage without the mobile runtime.
//! - Run the sample filter and path reconstruction over JSON files.
//! - Replay a trajectory stored in a location database.

use anyhow::{Context, Result};
use cargotrack_core::db::open_db;
use cargotrack_core::{
    evaluate_sample, init_logging, reconstruct_path, GeoPoint, HistoryService, LocationSample,
    PathMode, SampleVerdict, SqliteLocationRepository, TrackingConfig,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "cargotrack")]
#[command(version, about = "Location sample filtering and path replay tools", long_about = None)]
struct Cli {
    /// Tracking configuration JSON; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when omitted
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print core ping and version
    Ping,

    /// Run the sample filter over a JSON array of samples
    Filter {
        /// File with `[{"latitude":..,"longitude":..,"accuracy_m":..,"captured_at_ms":..}]`
        samples: PathBuf,
    },

    /// Reconstruct a path from a JSON array of points
    Path {
        /// File with `[{"latitude":..,"longitude":..}]`
        points: PathBuf,

        #[arg(long, value_enum, default_value_t = ModeArg::Replay)]
        mode: ModeArg,
    },

    /// Reconstruct the trajectory stored in a location database
    Replay {
        #[arg(long)]
        db: PathBuf,

        /// Only use rows captured at or after this epoch millisecond
        #[arg(long)]
        since_ms: Option<i64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Live,
    Replay,
}

impl From<ModeArg> for PathMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Live => PathMode::Live,
            ModeArg::Replay => PathMode::Replay,
        }
    }
}

#[derive(Serialize)]
struct FilterLine {
    index: usize,
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Serialize)]
struct PathOutput {
    mode: &'static str,
    max_step_m: f64,
    input: usize,
    retained: usize,
    points: Vec<GeoPoint>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        init_logging(&cli.log_level, log_dir)?;
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ping => {
            println!("cargotrack_core ping={}", cargotrack_core::ping());
            println!("cargotrack_core version={}", cargotrack_core::core_version());
        }
        Commands::Filter { samples } => {
            let samples: Vec<LocationSample> = read_json(&samples)?;
            for (index, sample) in samples.iter().enumerate() {
                let line = match evaluate_sample(sample, &config.filter) {
                    SampleVerdict::Accepted => FilterLine {
                        index,
                        accepted: true,
                        reason: None,
                        detail: None,
                    },
                    SampleVerdict::Rejected(reason) => FilterLine {
                        index,
                        accepted: false,
                        reason: Some(reason.code()),
                        detail: Some(reason.to_string()),
                    },
                };
                println!("{}", serde_json::to_string(&line)?);
            }
        }
        Commands::Path { points, mode } => {
            let points: Vec<GeoPoint> = read_json(&points)?;
            let mode = PathMode::from(mode);
            let max_step_m = mode.max_step_m(&config.path);
            let input = points.len();
            let retained = reconstruct_path(points, max_step_m);
            print_path(PathOutput {
                mode: mode.label(),
                max_step_m,
                input,
                retained: retained.len(),
                points: retained,
            })?;
        }
        Commands::Replay { db, since_ms } => {
            let conn = open_db(&db)
                .with_context(|| format!("failed to open location db `{}`", db.display()))?;
            let repo = SqliteLocationRepository::try_new(&conn)?;
            let replay = HistoryService::new(repo, config).load_replay_since(since_ms)?;
            print_path(PathOutput {
                mode: PathMode::Replay.label(),
                max_step_m: PathMode::Replay.max_step_m(&config.path),
                input: replay.source_len,
                retained: replay.points.len(),
                points: replay.points,
            })?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<TrackingConfig> {
    let Some(path) = path else {
        return Ok(TrackingConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config `{}`", path.display()))?;
    Ok(TrackingConfig::from_json_str(&raw)?)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse `{}`", path.display()))
}

fn print_path(output: PathOutput) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
