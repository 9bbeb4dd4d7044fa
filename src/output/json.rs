//! JSON activity writer.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::critters::{ActivityRow, ActivityShape};
use crate::error::{Error, Result};
use crate::output::OutputWriter;

/// JSON activity file structure.
#[derive(Debug, Serialize)]
pub struct ActivityJsonFile<'a> {
    /// Detection table the activity was computed from.
    pub source_file: &'a str,
    /// When the file was written.
    pub generated: DateTime<Utc>,
    /// Bucketing used.
    pub shape: ActivityShape,
    /// Labels of the `values` entries.
    pub columns: &'a [String],
    /// Activity rows.
    pub rows: &'a [ActivityRow],
}

/// Collects activity rows and writes them as one JSON document at finalize.
pub struct ActivityJsonWriter {
    rows: Vec<ActivityRow>,
    output_path: PathBuf,
    source_file: String,
    shape: ActivityShape,
    columns: Vec<String>,
}

impl ActivityJsonWriter {
    /// Create a writer; nothing is written until [`OutputWriter::finalize`].
    pub fn new(output_path: &Path, source_file: &str, shape: ActivityShape) -> Self {
        Self {
            rows: Vec::new(),
            output_path: output_path.to_path_buf(),
            source_file: source_file.to_string(),
            shape,
            columns: shape.column_labels(),
        }
    }
}

impl OutputWriter for ActivityJsonWriter {
    type Record = ActivityRow;

    fn write_header(&mut self) -> Result<()> {
        // No header for JSON - written at finalize
        Ok(())
    }

    fn write_record(&mut self, row: &ActivityRow) -> Result<()> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let document = ActivityJsonFile {
            source_file: &self.source_file,
            generated: Utc::now(),
            shape: self.shape,
            columns: &self.columns,
            rows: &self.rows,
        };

        let writer = BufWriter::new(File::create(&self.output_path)?);
        serde_json::to_writer_pretty(writer, &document).map_err(|e| Error::JsonWrite {
            path: self.output_path.clone(),
            source: e,
        })
    }
}
