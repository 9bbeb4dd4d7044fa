//! Configuration type definitions.

use crate::constants::DEFAULT_MERGE_WINDOW_MINUTES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default settings.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Station groups by name, each listing member station ids.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Default processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Largest gap between consecutive images of one detection, in minutes.
    pub window_minutes: f64,

    /// Collapse stations into sites.
    pub by_site: bool,

    /// Write probabilities instead of counts.
    pub probabilities: bool,

    /// Append a total row per identification.
    pub total: bool,

    /// UTC offset to express detections in before aggregating.
    pub utc_offset: Option<String>,

    /// Station table used for per-day rates.
    pub stations_file: Option<PathBuf>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            window_minutes: DEFAULT_MERGE_WINDOW_MINUTES,
            by_site: false,
            probabilities: false,
            total: false,
            utc_offset: None,
            stations_file: None,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Start CSV files with a UTF-8 BOM for Excel.
    pub csv_bom: bool,

    /// Activity output format.
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_bom: true,
            format: OutputFormat::Csv,
        }
    }
}

/// Supported activity output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CSV table.
    #[default]
    Csv,
    /// JSON document.
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
