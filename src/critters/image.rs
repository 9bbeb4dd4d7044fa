//! Camera trigger records.

use chrono::{DateTime, FixedOffset};

use super::types::{Classification, TriggerSource};

/// One camera trigger, as read from an image table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEvent {
    /// Image file name.
    pub file: String,
    /// Path of the image relative to the survey root.
    pub relative_path: String,
    /// When the image was taken, in the camera's UTC offset.
    pub time: DateTime<FixedOffset>,
    /// Station the camera was deployed at.
    pub station: String,
    /// Survey the image belongs to.
    pub survey: String,
    /// What caused the camera to fire.
    pub trigger_source: TriggerSource,
    /// Subject identification; empty means nothing was detected.
    pub identification: String,
    /// Observer-assigned attributes.
    pub classification: Classification,
}

impl ImageEvent {
    /// Create an image with default attributes.
    pub fn new(
        station: impl Into<String>,
        identification: impl Into<String>,
        time: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            file: String::new(),
            relative_path: String::new(),
            time,
            station: station.into(),
            survey: String::new(),
            trigger_source: TriggerSource::default(),
            identification: identification.into(),
            classification: Classification::default(),
        }
    }

    /// Whether the image has a subject identification.
    pub fn has_identification(&self) -> bool {
        !self.identification.trim().is_empty()
    }
}
