//! Image table reader.

use std::path::Path;

use serde::Deserialize;

use super::fields::{invalid_row, parse_field, parse_timestamp};
use crate::Error;
use crate::critters::{Classification, ImageEvent};

/// Internal record for CSV deserialization.
#[derive(Debug, Deserialize)]
struct ImageRecord {
    #[serde(rename = "File", default)]
    file: String,
    #[serde(rename = "RelativePath", default)]
    relative_path: String,
    #[serde(rename = "DateTime")]
    date_time: String,
    #[serde(rename = "UtcOffset", default)]
    utc_offset: String,
    #[serde(rename = "Survey", default)]
    survey: String,
    #[serde(rename = "Station")]
    station: String,
    #[serde(rename = "TriggerSource", default)]
    trigger_source: String,
    #[serde(rename = "Confidence", default)]
    confidence: String,
    #[serde(rename = "Identification", default)]
    identification: String,
    #[serde(rename = "Age", default)]
    age: String,
    #[serde(rename = "GroupType", default)]
    group_type: String,
    #[serde(rename = "Activity", default)]
    activity: String,
    #[serde(rename = "Pelage", default)]
    pelage: String,
    #[serde(rename = "Comments", default)]
    comments: String,
}

impl ImageRecord {
    fn into_image(self) -> Result<ImageEvent, String> {
        Ok(ImageEvent {
            time: parse_timestamp(&self.date_time, &self.utc_offset)?,
            trigger_source: parse_field(&self.trigger_source)?,
            classification: Classification {
                activity: parse_field(&self.activity)?,
                age: parse_field(&self.age)?,
                confidence: parse_field(&self.confidence)?,
                group_type: parse_field(&self.group_type)?,
                pelage: self.pelage,
                comments: self.comments,
            },
            file: self.file,
            relative_path: self.relative_path,
            survey: self.survey,
            station: self.station,
            identification: self.identification,
        })
    }
}

/// Read an image table.
///
/// Requires `DateTime` and `Station` columns; every other column may be
/// absent. `DateTime` is UTC unless it carries its own offset, and is moved
/// to `UtcOffset` (decimal hours) when that is given. Rows without an
/// identification are kept; the merge skips them.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is
/// missing, or a cell cannot be parsed. Messages carry the line number.
pub fn read_images(path: &Path) -> Result<Vec<ImageEvent>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::InputRead {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut images = Vec::new();
    for (index, result) in reader.deserialize::<ImageRecord>().enumerate() {
        let record = result.map_err(|e| invalid_row(index, e))?;
        images.push(record.into_image().map_err(|e| invalid_row(index, e))?);
    }

    Ok(images)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::critters::{ActivityFlags, Age, Confidence, GroupType, TriggerSource};
    use chrono::Timelike;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "File,RelativePath,DateTime,UtcOffset,Survey,Station,TriggerSource,Confidence,Identification,Age,GroupType,Activity,Pelage,Comments";

    #[test]
    fn test_read_full_row() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(
            file,
            "IMG_0001.JPG,HOLA1/2021-06,2021-06-01T17:00:00Z,-7,Spring 2021,HOLA1,Motion,High,fox,Adult,Single,\"feeding, moving\",red,\"limping, left\""
        )
        .unwrap();
        file.flush().unwrap();

        let images = read_images(file.path()).unwrap();
        assert_eq!(images.len(), 1);
        let image = &images[0];
        assert_eq!(image.file, "IMG_0001.JPG");
        assert_eq!(image.station, "HOLA1");
        assert_eq!(image.time.hour(), 10);
        assert_eq!(image.trigger_source, TriggerSource::Motion);
        assert_eq!(image.classification.confidence, Confidence::High);
        assert_eq!(image.classification.age, Age::Adult);
        assert_eq!(image.classification.group_type, GroupType::Single);
        assert_eq!(
            image.classification.activity,
            ActivityFlags::FEEDING | ActivityFlags::MOVING
        );
        assert_eq!(image.classification.comments, "limping, left");
    }

    #[test]
    fn test_read_minimal_columns() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Station,DateTime,Identification").unwrap();
        writeln!(file, "A,2021-06-01T17:00:00Z,fox").unwrap();
        writeln!(file, "A,2021-06-01T17:01:00Z,").unwrap();
        file.flush().unwrap();

        let images = read_images(file.path()).unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[0].has_identification());
        assert!(!images[1].has_identification());
        assert_eq!(images[0].classification, Classification::default());
    }

    #[test]
    fn test_read_with_bom() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(crate::constants::UTF8_BOM).unwrap();
        writeln!(file, "Station,DateTime,Identification").unwrap();
        writeln!(file, "A,2021-06-01T17:00:00Z,fox").unwrap();
        file.flush().unwrap();

        assert_eq!(read_images(file.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_enum_reports_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Station,DateTime,Identification,Age").unwrap();
        writeln!(file, "A,2021-06-01T17:00:00Z,fox,adult").unwrap();
        writeln!(file, "A,2021-06-01T17:02:00Z,fox,ancient").unwrap();
        file.flush().unwrap();

        let result = read_images(file.path());
        match result {
            Err(Error::InvalidInputFormat { message }) => assert!(message.starts_with("line 3:")),
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Station,Identification").unwrap();
        writeln!(file, "A,fox").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            read_images(file.path()),
            Err(Error::InvalidInputFormat { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = read_images(Path::new("/nonexistent/images.csv"));
        assert!(matches!(result, Err(Error::InputRead { .. })));
    }
}
