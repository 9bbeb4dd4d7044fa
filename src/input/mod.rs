//! CSV readers for image, detection and station tables.

mod detections;
mod fields;
mod images;
mod stations;

pub use detections::read_detections;
pub use images::read_images;
pub use stations::read_stations;
