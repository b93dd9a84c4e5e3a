use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_LOG_DIR: &str = "Logs/PositionAccuracy";
pub const DEFAULT_THRESHOLD: f64 = 1.5;

#[derive(Parser, Debug)]
#[command(
    name = "position-accuracy-gate",
    version,
    about = "CI gate for simulated vehicle position accuracy logs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate per-vehicle mean position error against a threshold.
    Check(CheckArgs),
    /// Print the log artifact discovery would select.
    Discover(DiscoverArgs),
}

#[derive(Args, Debug, Clone)]
pub struct LogSearchArgs {
    /// Directory to search when --log-file is omitted.
    #[arg(long, env = "POSITION_ACCURACY_LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,

    /// Filename glob used instead of the summary-then-CSV search order.
    #[arg(long)]
    pub pattern: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub search: LogSearchArgs,

    /// Explicit CSV or summary artifact; skips discovery.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Maximum allowed mean position error per vehicle, in meters.
    #[arg(
        long,
        env = "POSITION_ACCURACY_THRESHOLD",
        default_value_t = DEFAULT_THRESHOLD,
        value_parser = parse_threshold
    )]
    pub threshold: f64,

    /// Print the JSON report instead of the text table.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DiscoverArgs {
    #[command(flatten)]
    pub search: LogSearchArgs,
}

fn parse_threshold(raw: &str) -> Result<f64, String> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("threshold must be a finite non-negative number, got {raw}"));
    }
    Ok(value)
}
