//! The `detections` command: image table in, detection table out.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use crate::cli::DetectionsArgs;
use crate::config::{Config, validate_window};
use crate::constants::output_suffixes;
use crate::critters::{MergeOptions, merge_images};
use crate::error::Result;
use crate::input::read_images;
use crate::output::{DetectionCsvWriter, OutputWriter};
use crate::pipeline::paths::resolve_output;

/// Outcome of a merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectResult {
    /// Images read.
    pub images: usize,
    /// Detections written.
    pub detections: usize,
    /// Detection table written.
    pub output: PathBuf,
}

/// Read images, merge them and write the detection table.
pub fn execute(args: &DetectionsArgs, config: &Config) -> Result<DetectResult> {
    let start = Instant::now();

    let window_minutes = args.window.unwrap_or(config.defaults.window_minutes);
    validate_window(window_minutes)?;
    let options = MergeOptions {
        by_site: args.by_site || config.defaults.by_site,
        ..MergeOptions::with_window_minutes(window_minutes)
    };

    let images = read_images(&args.input)?;
    info!("Read {} images from {}", images.len(), args.input.display());

    let detections = merge_images(&images, &options)?;
    if detections.is_empty() {
        warn!("No identified images in {}", args.input.display());
    }

    let output = resolve_output(
        args.output.as_deref(),
        &args.input,
        output_suffixes::DETECTIONS,
        "csv",
    );
    let mut writer = DetectionCsvWriter::new(&output, config.output.csv_bom && !args.no_bom)?;
    writer.write_header()?;
    for detection in &detections {
        writer.write_record(detection)?;
    }
    writer.finalize()?;

    info!(
        "Merged {} images into {} detections ({window_minutes} minute window) in {:.2}s: {}",
        images.len(),
        detections.len(),
        start.elapsed().as_secs_f64(),
        output.display()
    );

    Ok(DetectResult {
        images: images.len(),
        detections: detections.len(),
        output,
    })
}
