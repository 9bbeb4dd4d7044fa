//! Detection merging and activity aggregation.
//!
//! Images are merged into detections per station and identification
//! ([`merge_images`]), then counted by hour of day or month of year per
//! station, per group of stations, and overall ([`ActivityObservations`]).

pub mod activity;
pub mod detection;
pub mod image;
pub mod merge;
pub mod observations;
pub mod station;
pub mod types;

pub use activity::{
    ActivityAccumulator, ActivityEntity, ActivityShape, ActivitySummary, EntityKind,
};
pub use detection::Detection;
pub use image::ImageEvent;
pub use merge::{DetectionMerger, MergeOptions, merge_images};
pub use observations::{ActivityObservations, ActivityRow, RowOptions};
pub use station::{Station, StationRegistry, site_of};
pub use types::{ActivityFlags, Age, Classification, Confidence, GroupType, TriggerSource};
