//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "critters";

/// Default maximum gap between consecutive images of one detection, in minutes.
pub const DEFAULT_MERGE_WINDOW_MINUTES: f64 = 5.0;

/// Longest merge window accepted from configuration or the command line, in minutes.
pub const MAX_MERGE_WINDOW_MINUTES: f64 = 24.0 * 60.0;

/// Number of leading characters of a station identifier that name its site.
pub const SITE_PREFIX_LEN: usize = 4;

/// Entity name used for the grand total activity row.
pub const TOTAL_ENTITY_NAME: &str = "total";

/// Separator between survey labels in activity output.
pub const SURVEY_SEPARATOR: &str = "|";

/// Separator used when appending free text during detection merges.
pub const TEXT_MERGE_SEPARATOR: &str = ", ";

/// Calendar constants.
pub mod calendar {
    /// Hours in a day, and the number of diel activity buckets.
    pub const HOURS_IN_DAY: usize = 24;

    /// Months in a year, and the number of monthly activity buckets.
    pub const MONTHS_IN_YEAR: usize = 12;

    /// Three letter month abbreviations used for monthly activity columns.
    pub const MONTH_ABBREVIATIONS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
}

/// Time formats used by the tabular adapters.
pub mod time_format {
    /// UTC timestamp format written to detection tables.
    pub const UTC_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%SZ";

    /// Alternative UTC timestamp formats accepted on input.
    pub const UTC_DATE_TIME_INPUT: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
    ];

    /// Date formats accepted in station tables.
    pub const DATE_INPUT: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%Y/%m/%d"];
}

/// Output file name suffixes, appended to the input file stem.
pub mod output_suffixes {
    /// Detections produced from an image table.
    pub const DETECTIONS: &str = "-detections";
    /// Diel activity produced from a detection table.
    pub const DIEL_ACTIVITY: &str = "-dielActivity";
    /// Monthly activity produced from a detection table.
    pub const MONTHLY_ACTIVITY: &str = "-monthlyActivity";
}

/// Column names of the tabular inputs and outputs.
pub mod columns {
    /// Detection table columns, in output order.
    pub const DETECTION: [&str; 16] = [
        "Station",
        "File",
        "RelativePath",
        "StartTime",
        "EndTime",
        "UtcOffset",
        "Duration",
        "TriggerSource",
        "Identification",
        "Confidence",
        "GroupType",
        "Age",
        "Pelage",
        "Activity",
        "Comments",
        "Survey",
    ];

    /// Leading activity table columns.
    pub const ACTIVITY_STATION: &str = "Station";
    /// Identification column of the activity table.
    pub const ACTIVITY_IDENTIFICATION: &str = "Identification";
    /// Detection count column of the activity table.
    pub const ACTIVITY_N: &str = "N";
    /// Survey column of the activity table.
    pub const ACTIVITY_SURVEY: &str = "Survey";
}

/// UTF-8 Byte Order Mark for Excel compatibility in CSV files.
pub const UTF8_BOM: &[u8; 3] = b"\xEF\xBB\xBF";
