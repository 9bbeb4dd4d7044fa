//! Activity table writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::constants::{SURVEY_SEPARATOR, UTF8_BOM};
use crate::critters::ActivityRow;
use crate::error::{Error, Result};
use crate::output::OutputWriter;

/// Writes activity rows as CSV: entity, identification, values, count, surveys.
pub struct ActivityCsvWriter {
    writer: csv::Writer<BufWriter<File>>,
    path: PathBuf,
    headers: Vec<String>,
}

impl ActivityCsvWriter {
    /// Create the output file. `headers` must match the row layout.
    pub fn new(path: &Path, headers: Vec<String>, bom: bool) -> Result<Self> {
        let mut file = BufWriter::new(File::create(path)?);
        if bom {
            file.write_all(UTF8_BOM)?;
        }
        Ok(Self {
            writer: csv::Writer::from_writer(file),
            path: path.to_path_buf(),
            headers,
        })
    }

    fn write_fields<I, T>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(fields)
            .map_err(|source| Error::OutputWrite {
                path: self.path.clone(),
                source,
            })
    }
}

impl OutputWriter for ActivityCsvWriter {
    type Record = ActivityRow;

    fn write_header(&mut self) -> Result<()> {
        let headers = std::mem::take(&mut self.headers);
        self.write_fields(&headers)
    }

    fn write_record(&mut self, row: &ActivityRow) -> Result<()> {
        let mut fields = Vec::with_capacity(row.values.len() + 4);
        fields.push(row.entity.clone());
        fields.push(row.identification.clone());
        fields.extend(row.values.iter().map(f64::to_string));
        fields.push(row.total.to_string());
        fields.push(row.surveys.join(SURVEY_SEPARATOR));
        self.write_fields(&fields)
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
    use crate::critters::EntityKind;
    use tempfile::NamedTempFile;

    #[test]
    fn test_activity_writer() {
        let file = NamedTempFile::new().unwrap();
        let headers = ["Station", "Identification", "Jan", "Feb", "N", "Survey"]
            .map(String::from)
            .to_vec();
        let mut writer = ActivityCsvWriter::new(file.path(), headers, false).unwrap();

        writer.write_header().unwrap();
        writer
            .write_record(&ActivityRow {
                entity: "HOLA1".to_string(),
                kind: EntityKind::Station,
                identification: "fox".to_string(),
                values: vec![0.25, 3.0],
                total: 4,
                surveys: vec!["2020".to_string(), "2021".to_string()],
            })
            .unwrap();
        writer.finalize().unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(
            contents,
            "Station,Identification,Jan,Feb,N,Survey\nHOLA1,fox,0.25,3,4,2020|2021\n"
        );
    }
}
