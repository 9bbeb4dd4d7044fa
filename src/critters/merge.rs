//! Merging images into detections.

use std::collections::HashMap;

use chrono::TimeDelta;
use tracing::debug;

use super::detection::Detection;
use super::image::ImageEvent;
use super::station::site_of;
use crate::constants::DEFAULT_MERGE_WINDOW_MINUTES;
use crate::error::{Error, Result};

/// Options for [`merge_images`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Largest gap between consecutive images of one detection.
    pub window: TimeDelta,
    /// Collapse stations into sites before merging.
    pub by_site: bool,
}

impl MergeOptions {
    /// Options with a window given in minutes.
    pub fn with_window_minutes(minutes: f64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let millis = (minutes * 60_000.0).round() as i64;
        Self {
            window: TimeDelta::milliseconds(millis),
            by_site: false,
        }
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self::with_window_minutes(DEFAULT_MERGE_WINDOW_MINUTES)
    }
}

/// Streaming merger over images of possibly many stations and identifications.
///
/// Within a station and identification, images must arrive in chronological
/// order. Anything earlier than the open detection's latest image is rejected
/// with [`Error::OutOfOrder`]. Partitions may interleave freely.
#[derive(Debug)]
pub struct DetectionMerger {
    window: TimeDelta,
    detections: Vec<Detection>,
    /// (station, identification) -> index of the open detection
    open: HashMap<(String, String), usize>,
}

impl DetectionMerger {
    /// Create a merger with the given window.
    pub fn new(window: TimeDelta) -> Self {
        Self {
            window,
            detections: Vec::new(),
            open: HashMap::new(),
        }
    }

    /// Push the next detection; it either extends the open detection of its
    /// partition or opens a new one.
    pub fn push(&mut self, candidate: Detection) -> Result<()> {
        let key = (
            candidate.station().to_string(),
            candidate.identification().to_string(),
        );

        if let Some(&index) = self.open.get(&key) {
            let open = &mut self.detections[index];
            if candidate.start() < open.end() {
                return Err(Error::OutOfOrder {
                    station: key.0,
                    identification: key.1,
                    time: candidate.start().to_rfc3339(),
                    previous: open.end().to_rfc3339(),
                });
            }
            if open.try_merge(&candidate, self.window) {
                return Ok(());
            }
        }

        self.open.insert(key, self.detections.len());
        self.detections.push(candidate);
        Ok(())
    }

    /// Push a single image.
    pub fn push_image(&mut self, image: &ImageEvent) -> Result<()> {
        self.push(Detection::from_image(image))
    }

    /// Number of detections so far.
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    /// Whether nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Consume the merger, returning detections in the order they were opened.
    pub fn finish(self) -> Vec<Detection> {
        self.detections
    }
}

/// Merge images into detections.
///
/// Images with a blank station or identification are skipped. Output lists
/// stations (or sites) in first-seen order, identifications in first-seen
/// order within a station, and detections chronologically within each.
pub fn merge_images(images: &[ImageEvent], options: &MergeOptions) -> Result<Vec<Detection>> {
    // station -> identification -> images, both in first-seen order
    let mut partitions: Vec<(String, Vec<(String, Vec<&ImageEvent>)>)> = Vec::new();
    let mut skipped = 0usize;

    for image in images {
        let station = image.station.trim();
        if station.is_empty() || !image.has_identification() {
            skipped += 1;
            continue;
        }

        let station = if options.by_site {
            site_of(station)
        } else {
            station
        };

        let index = match partitions.iter().position(|(s, _)| s == station) {
            Some(index) => index,
            None => {
                partitions.push((station.to_string(), Vec::new()));
                partitions.len() - 1
            }
        };
        let by_identification = &mut partitions[index].1;

        let identification = image.identification.trim();
        match by_identification
            .iter_mut()
            .find(|(id, _)| id == identification)
        {
            Some((_, group)) => group.push(image),
            None => by_identification.push((identification.to_string(), vec![image])),
        }
    }

    if skipped > 0 {
        debug!("Skipped {skipped} images without station or identification");
    }

    let mut detections = Vec::new();
    for (station, by_identification) in partitions {
        for (identification, mut group) in by_identification {
            group.sort_by_key(|image| image.time);

            let mut merger = DetectionMerger::new(options.window);
            for image in group {
                merger.push(Detection::from_image(image).relabel(&station, &identification))?;
            }

            debug!(
                "{station}/{identification}: {} detections",
                merger.len()
            );
            detections.extend(merger.finish());
        }
    }

    Ok(detections)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};

    fn image(station: &str, identification: &str, time: &str) -> ImageEvent {
        ImageEvent::new(
            station,
            identification,
            DateTime::parse_from_rfc3339(time).unwrap(),
        )
    }

    fn at(time: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(time).unwrap()
    }

    #[test]
    fn test_default_window_is_five_minutes() {
        assert_eq!(MergeOptions::default().window, TimeDelta::minutes(5));
        assert!(!MergeOptions::default().by_site);
    }

    #[test]
    fn test_window_minutes_fractional() {
        assert_eq!(
            MergeOptions::with_window_minutes(0.5).window,
            TimeDelta::seconds(30)
        );
    }

    #[test]
    fn test_gap_over_window_starts_new_detection() {
        let images = [
            image("A", "fox", "2021-06-01T10:00:00Z"),
            image("A", "fox", "2021-06-01T10:03:00Z"),
            image("A", "fox", "2021-06-01T10:20:00Z"),
        ];

        let detections = merge_images(&images, &MergeOptions::default()).unwrap();

        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].start(), at("2021-06-01T10:00:00Z"));
        assert_eq!(detections[0].end(), at("2021-06-01T10:03:00Z"));
        assert_eq!(detections[1].start(), at("2021-06-01T10:20:00Z"));
        assert_eq!(detections[1].duration(), TimeDelta::zero());
    }

    #[test]
    fn test_unsorted_input_is_sorted_within_partition() {
        let images = [
            image("A", "fox", "2021-06-01T10:04:00Z"),
            image("A", "fox", "2021-06-01T10:00:00Z"),
            image("A", "fox", "2021-06-01T10:02:00Z"),
        ];

        let detections = merge_images(&images, &MergeOptions::default()).unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].duration(), TimeDelta::minutes(4));
    }

    #[test]
    fn test_blank_station_and_identification_skipped() {
        let images = [
            image("", "fox", "2021-06-01T10:00:00Z"),
            image("A", "", "2021-06-01T10:00:00Z"),
            image("A", "  ", "2021-06-01T10:01:00Z"),
            image("A", "fox", "2021-06-01T10:02:00Z"),
        ];

        let detections = merge_images(&images, &MergeOptions::default()).unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].station(), "A");
    }

    #[test]
    fn test_output_order_first_seen() {
        let images = [
            image("B", "deer", "2021-06-01T12:00:00Z"),
            image("A", "fox", "2021-06-01T10:00:00Z"),
            image("B", "bear", "2021-06-01T09:00:00Z"),
            image("B", "deer", "2021-06-01T08:00:00Z"),
        ];

        let detections = merge_images(&images, &MergeOptions::default()).unwrap();
        let order: Vec<(&str, &str)> = detections
            .iter()
            .map(|d| (d.station(), d.identification()))
            .collect();

        assert_eq!(
            order,
            [("B", "deer"), ("B", "deer"), ("B", "bear"), ("A", "fox")]
        );
        assert!(detections[0].start() < detections[1].start());
    }

    #[test]
    fn test_by_site_merges_across_stations() {
        let images = [
            image("HOLA1", "fox", "2021-06-01T10:00:00Z"),
            image("HOLA2", "fox", "2021-06-01T10:02:00Z"),
            image("BRUN1", "fox", "2021-06-01T10:01:00Z"),
        ];
        let options = MergeOptions {
            by_site: true,
            ..MergeOptions::default()
        };

        let detections = merge_images(&images, &options).unwrap();

        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].station(), "HOLA");
        assert_eq!(detections[0].duration(), TimeDelta::minutes(2));
        assert_eq!(detections[1].station(), "BRUN");
    }

    #[test]
    fn test_merger_rejects_out_of_order() {
        let mut merger = DetectionMerger::new(TimeDelta::minutes(5));
        merger
            .push_image(&image("A", "fox", "2021-06-01T10:00:00Z"))
            .unwrap();
        merger
            .push_image(&image("A", "fox", "2021-06-01T10:04:00Z"))
            .unwrap();

        let result = merger.push_image(&image("A", "fox", "2021-06-01T10:02:00Z"));

        assert!(matches!(result, Err(Error::OutOfOrder { .. })));
    }

    #[test]
    fn test_merger_partitions_interleave() {
        let mut merger = DetectionMerger::new(TimeDelta::minutes(5));
        for (station, identification, time) in [
            ("A", "fox", "2021-06-01T10:00:00Z"),
            ("B", "fox", "2021-06-01T09:00:00Z"),
            ("A", "deer", "2021-06-01T08:00:00Z"),
            ("A", "fox", "2021-06-01T10:01:00Z"),
        ] {
            merger
                .push_image(&image(station, identification, time))
                .unwrap();
        }

        let detections = merger.finish();
        assert_eq!(detections.len(), 3);
        assert_eq!(detections[0].duration(), TimeDelta::minutes(1));
    }

    #[test]
    fn test_merger_starts_new_detection_after_gap() {
        let mut merger = DetectionMerger::new(TimeDelta::minutes(5));
        merger
            .push_image(&image("A", "fox", "2021-06-01T10:00:00Z"))
            .unwrap();
        merger
            .push_image(&image("A", "fox", "2021-06-01T11:00:00Z"))
            .unwrap();
        merger
            .push_image(&image("A", "fox", "2021-06-01T11:04:00Z"))
            .unwrap();

        let detections = merger.finish();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[1].duration(), TimeDelta::minutes(4));
    }
}
