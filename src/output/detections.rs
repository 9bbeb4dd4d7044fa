//! Detection table writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::constants::UTF8_BOM;
use crate::constants::columns::DETECTION;
use crate::constants::time_format::UTC_DATE_TIME;
use crate::critters::Detection;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use crate::utils::date::{format_duration, format_utc_offset};

/// Writes detections as CSV, one row per detection.
///
/// Times are written in UTC with the detection's offset in its own column,
/// so the table reads back to the same wall clock.
pub struct DetectionCsvWriter {
    writer: csv::Writer<BufWriter<File>>,
    path: PathBuf,
}

impl DetectionCsvWriter {
    /// Create the output file, optionally starting it with a UTF-8 BOM.
    pub fn new(path: &Path, bom: bool) -> Result<Self> {
        let mut file = BufWriter::new(File::create(path)?);
        if bom {
            file.write_all(UTF8_BOM)?;
        }
        Ok(Self {
            writer: csv::Writer::from_writer(file),
            path: path.to_path_buf(),
        })
    }

    fn map_err(&self) -> impl Fn(csv::Error) -> Error + '_ {
        |source| Error::OutputWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl OutputWriter for DetectionCsvWriter {
    type Record = Detection;

    fn write_header(&mut self) -> Result<()> {
        self.writer.write_record(DETECTION).map_err(self.map_err())
    }

    fn write_record(&mut self, detection: &Detection) -> Result<()> {
        let classification = detection.classification();
        let fields = [
            detection.station().to_string(),
            detection.file().to_string(),
            detection.relative_path().to_string(),
            detection
                .start()
                .with_timezone(&Utc)
                .format(UTC_DATE_TIME)
                .to_string(),
            detection
                .end()
                .with_timezone(&Utc)
                .format(UTC_DATE_TIME)
                .to_string(),
            format_utc_offset(detection.utc_offset()),
            format_duration(detection.duration()),
            detection.trigger_source().to_string(),
            detection.identification().to_string(),
            classification.confidence.to_string(),
            classification.group_type.to_string(),
            classification.age.to_string(),
            classification.pelage.clone(),
            classification.activity.to_string(),
            classification.comments.clone(),
            detection.survey().to_string(),
        ];
        self.writer.write_record(&fields).map_err(self.map_err())
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::critters::{ActivityFlags, Classification, TriggerSource};
    use chrono::DateTime;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detection_writer() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DetectionCsvWriter::new(file.path(), false).unwrap();

        let detection = Detection::new(
            "HOLA1",
            "fox",
            DateTime::parse_from_rfc3339("2021-06-01T10:00:00-07:00").unwrap(),
            DateTime::parse_from_rfc3339("2021-06-01T10:03:05-07:00").unwrap(),
        )
        .unwrap()
        .with_source("IMG_0001.JPG", "HOLA1/June", "2021", TriggerSource::Motion)
        .with_classification(Classification {
            activity: ActivityFlags::FEEDING | ActivityFlags::MOVING,
            pelage: "red, cross".to_string(),
            ..Classification::default()
        });

        writer.write_header().unwrap();
        writer.write_record(&detection).unwrap();
        writer.finalize().unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), DETECTION.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "HOLA1,IMG_0001.JPG,HOLA1/June,2021-06-01T17:00:00Z,2021-06-01T17:03:05Z,-7,00:03:05,motion,fox,unknown,unknown,unknown,\"red, cross\",\"feeding, moving\",,2021"
        );
    }

    #[test]
    fn test_detection_writer_bom() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DetectionCsvWriter::new(file.path(), true).unwrap();
        writer.write_header().unwrap();
        writer.finalize().unwrap();

        let bytes = std::fs::read(file.path()).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
    }
}
