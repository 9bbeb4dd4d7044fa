//! Detection table reader.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use super::fields::{invalid_row, parse_field, parse_timestamp};
use crate::Error;
use crate::critters::{Classification, Detection};

/// Internal record for CSV deserialization.
///
/// `Duration` is ignored; it is recomputed from start and end.
#[derive(Debug, Deserialize)]
struct DetectionRecord {
    #[serde(rename = "Station")]
    station: String,
    #[serde(rename = "File", default)]
    file: String,
    #[serde(rename = "RelativePath", default)]
    relative_path: String,
    #[serde(rename = "StartTime")]
    start_time: String,
    #[serde(rename = "EndTime", default)]
    end_time: String,
    #[serde(rename = "UtcOffset", default)]
    utc_offset: String,
    #[serde(rename = "TriggerSource", default)]
    trigger_source: String,
    #[serde(rename = "Identification")]
    identification: String,
    #[serde(rename = "Confidence", default)]
    confidence: String,
    #[serde(rename = "GroupType", default)]
    group_type: String,
    #[serde(rename = "Age", default)]
    age: String,
    #[serde(rename = "Pelage", default)]
    pelage: String,
    #[serde(rename = "Activity", default)]
    activity: String,
    #[serde(rename = "Comments", default)]
    comments: String,
    #[serde(rename = "Survey", default)]
    survey: String,
}

impl DetectionRecord {
    fn classification(&self) -> Result<Classification, String> {
        Ok(Classification {
            activity: parse_field(&self.activity)?,
            age: parse_field(&self.age)?,
            confidence: parse_field(&self.confidence)?,
            group_type: parse_field(&self.group_type)?,
            pelage: self.pelage.clone(),
            comments: self.comments.clone(),
        })
    }
}

/// Read a detection table, as written by the `detections` command.
///
/// A blank `EndTime` means a single-image detection. Rows without an
/// identification record no animal and are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is
/// missing, a cell cannot be parsed, or a detection ends before it starts.
pub fn read_detections(path: &Path) -> Result<Vec<Detection>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::InputRead {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut detections = Vec::new();
    for (index, result) in reader.deserialize::<DetectionRecord>().enumerate() {
        let record = result.map_err(|e| invalid_row(index, e))?;
        if record.identification.is_empty() {
            warn!("Skipping detection without identification on line {}", index + 2);
            continue;
        }

        let start = parse_timestamp(&record.start_time, &record.utc_offset)
            .map_err(|e| invalid_row(index, e))?;
        let end = if record.end_time.is_empty() {
            start
        } else {
            parse_timestamp(&record.end_time, &record.utc_offset)
                .map_err(|e| invalid_row(index, e))?
                .with_timezone(start.offset())
        };

        let classification = record.classification().map_err(|e| invalid_row(index, e))?;
        let trigger_source =
            parse_field(&record.trigger_source).map_err(|e| invalid_row(index, e))?;

        let detection = Detection::new(record.station, record.identification, start, end)
            .map_err(|e| invalid_row(index, e))?
            .with_source(
                record.file,
                record.relative_path,
                record.survey,
                trigger_source,
            )
            .with_classification(classification);
        detections.push(detection);
    }

    Ok(detections)
}
