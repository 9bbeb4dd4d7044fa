//! CLI argument definitions.

use crate::config::OutputFormat;
use crate::constants::MAX_MERGE_WINDOW_MINUTES;
use crate::utils::date::parse_utc_offset;
use chrono::FixedOffset;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Merge camera trap images into detections and summarise activity.
#[derive(Debug, Parser)]
#[command(name = "critters")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: platform config directory).
    #[arg(long, global = true, env = "CRITTERS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Merge an image table into a detection table.
    Detections(DetectionsArgs),
    /// Count detections by hour of day.
    Diel(ActivityArgs),
    /// Count detections by month of year.
    Monthly(MonthlyArgs),
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for the detections command.
#[derive(Debug, Args)]
pub struct DetectionsArgs {
    /// Image table (CSV).
    pub input: PathBuf,

    /// Largest gap between consecutive images of one detection, in minutes.
    #[arg(short, long, value_parser = parse_window, env = "CRITTERS_WINDOW")]
    pub window: Option<f64>,

    /// Collapse stations into sites (first four characters of the station id).
    #[arg(long)]
    pub by_site: bool,

    /// Output file (default: <input>-detections.csv next to the input).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not start CSV output with a UTF-8 BOM.
    #[arg(long)]
    pub no_bom: bool,
}

/// Arguments shared by the activity commands.
#[derive(Debug, Args)]
pub struct ActivityArgs {
    /// Detection table (CSV).
    pub input: PathBuf,

    /// Station group as NAME=STATION[,STATION...]; repeatable. Adds to groups from config.
    #[arg(short, long = "group", value_parser = parse_group)]
    pub groups: Vec<GroupArg>,

    /// Write probabilities instead of counts.
    #[arg(short, long)]
    pub probabilities: bool,

    /// Append totals across all stations.
    #[arg(short, long)]
    pub total: bool,

    /// Collapse stations, and group members, into sites.
    #[arg(long)]
    pub by_site: bool,

    /// Express detections in this UTC offset before counting (e.g. -7, -07:00).
    #[arg(long, value_parser = parse_offset, allow_hyphen_values = true, env = "CRITTERS_UTC_OFFSET")]
    pub utc_offset: Option<FixedOffset>,

    /// Output format.
    #[arg(short, long, env = "CRITTERS_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file (default: next to the input).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not start CSV output with a UTF-8 BOM.
    #[arg(long)]
    pub no_bom: bool,
}

/// Arguments for the monthly command.
#[derive(Debug, Args)]
pub struct MonthlyArgs {
    /// Options shared with diel activity.
    #[command(flatten)]
    pub activity: ActivityArgs,

    /// Station table (CSV) with set and removal dates.
    #[arg(short, long, env = "CRITTERS_STATIONS")]
    pub stations: Option<PathBuf>,

    /// Append detections per day of station uptime for each month.
    #[arg(long)]
    pub per_day: bool,
}

/// A named station group given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupArg {
    /// Group name.
    pub name: String,
    /// Member station ids.
    pub stations: Vec<String>,
}

/// Parse `NAME=S1,S2`.
fn parse_group(s: &str) -> Result<GroupArg, String> {
    let (name, stations) = s
        .split_once('=')
        .ok_or_else(|| format!("'{s}' is not NAME=STATION[,STATION...]"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("group '{s}' has no name"));
    }

    let stations: Vec<String> = stations
        .split(',')
        .map(str::trim)
        .filter(|station| !station.is_empty())
        .map(String::from)
        .collect();
    if stations.is_empty() {
        return Err(format!("group '{name}' has no stations"));
    }

    Ok(GroupArg {
        name: name.to_string(),
        stations,
    })
}

/// Parse and validate merge window.
fn parse_window(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(value > 0.0 && value <= MAX_MERGE_WINDOW_MINUTES) {
        return Err(format!(
            "window must be greater than 0 and at most {MAX_MERGE_WINDOW_MINUTES} minutes, got {value}"
        ));
    }

    Ok(value)
}

/// Parse a UTC offset.
fn parse_offset(s: &str) -> Result<FixedOffset, String> {
    parse_utc_offset(s).ok_or_else(|| format!("'{s}' is not a valid UTC offset"))
}
