//! Output format writers.

mod activity;
mod detections;
mod json;
mod writer;

pub use activity::ActivityCsvWriter;
pub use detections::DetectionCsvWriter;
pub use json::{ActivityJsonFile, ActivityJsonWriter};
pub use writer::OutputWriter;
