//! Error types for critters.

/// Result type alias for critters operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for critters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Per-day activity rates were requested without station metadata.
    #[error("per-day activity rates require station metadata (use --stations)")]
    StationsRequired,

    /// A detection or group references a station missing from station metadata.
    #[error("station '{station}' not found in station metadata")]
    UnknownStation {
        /// Identifier of the unresolved station.
        station: String,
    },

    /// Month number outside 1-12.
    #[error("invalid month: {month} (must be 1 to 12)")]
    InvalidMonth {
        /// Invalid month value.
        month: u32,
    },

    /// Images within a station and identification were not in chronological order.
    #[error(
        "image at {time} for '{identification}' at station '{station}' is earlier than the preceding image at {previous}"
    )]
    OutOfOrder {
        /// Station of the offending image.
        station: String,
        /// Identification of the offending image.
        identification: String,
        /// Time of the offending image.
        time: String,
        /// Time of the latest image already merged.
        previous: String,
    },

    /// Detection ends before it starts.
    #[error("detection at station '{station}' ends ({end}) before it starts ({start})")]
    InvalidTimeRange {
        /// Station of the detection.
        station: String,
        /// Start time.
        start: String,
        /// End time.
        end: String,
    },

    /// Failed to read an input table.
    #[error("failed to read input file '{path}'")]
    InputRead {
        /// Path to the input file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Input table content is malformed.
    #[error("invalid input file format: {message}")]
    InvalidInputFormat {
        /// Description of the format error.
        message: String,
    },

    /// Failed to write an output table.
    #[error("failed to write output file '{path}'")]
    OutputWrite {
        /// Path to the output file.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Failed to write JSON output file.
    #[error("failed to write JSON output file '{path}'")]
    JsonWrite {
        /// Path to the JSON file.
        path: std::path::PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
}
