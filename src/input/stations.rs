//! Station table reader.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use super::fields::{invalid_row, parse_date, parse_optional_date};
use crate::Error;
use crate::critters::{Station, StationRegistry};

/// Internal record for CSV deserialization.
#[derive(Debug, Deserialize)]
struct StationRecord {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "DateSet")]
    date_set: String,
    #[serde(rename = "DateRemoved", default)]
    date_removed: String,
}

/// Read a station table into a registry.
///
/// A blank `DateRemoved` means the station is still operating. Repeated ids
/// widen the station's operating period.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is
/// missing, a date cannot be parsed, or a station is removed before it is set.
pub fn read_stations(path: &Path) -> Result<StationRegistry, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::InputRead {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut registry = StationRegistry::new();
    for (index, result) in reader.deserialize::<StationRecord>().enumerate() {
        let record = result.map_err(|e| invalid_row(index, e))?;
        if record.id.is_empty() {
            warn!("Skipping station without ID on line {}", index + 2);
            continue;
        }

        let date_set = parse_date(&record.date_set).map_err(|e| invalid_row(index, e))?;
        let date_removed =
            parse_optional_date(&record.date_removed).map_err(|e| invalid_row(index, e))?;
        if let Some(removed) = date_removed
            && removed < date_set
        {
            return Err(invalid_row(
                index,
                format!("station '{}' removed ({removed}) before set ({date_set})", record.id),
            ));
        }

        registry.insert(Station::new(record.id, record.name, date_set, date_removed));
    }

    Ok(registry)
}
