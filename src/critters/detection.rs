//! Consolidated detections.

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::Serialize;

use super::image::ImageEvent;
use super::types::{Classification, TriggerSource};
use crate::error::{Error, Result};

/// One or more images of the same subject at the same station, merged into a
/// single event.
///
/// Station and identification never change once a detection exists; a merge
/// with a different station or identification is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    station: String,
    identification: String,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    file: String,
    relative_path: String,
    survey: String,
    trigger_source: TriggerSource,
    classification: Classification,
}

impl Detection {
    /// Create a detection spanning `start` to `end`.
    pub fn new(
        station: impl Into<String>,
        identification: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Self> {
        let station = station.into();
        if end < start {
            return Err(Error::InvalidTimeRange {
                station,
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        Ok(Self {
            station,
            identification: identification.into(),
            start,
            end,
            file: String::new(),
            relative_path: String::new(),
            survey: String::new(),
            trigger_source: TriggerSource::default(),
            classification: Classification::default(),
        })
    }

    /// A zero-length detection covering a single image.
    pub fn from_image(image: &ImageEvent) -> Self {
        Self {
            station: image.station.clone(),
            identification: image.identification.clone(),
            start: image.time,
            end: image.time,
            file: image.file.clone(),
            relative_path: image.relative_path.clone(),
            survey: image.survey.clone(),
            trigger_source: image.trigger_source,
            classification: image.classification.clone(),
        }
    }

    /// Set the file, relative path, survey and trigger source of the first image.
    #[must_use]
    pub fn with_source(
        mut self,
        file: impl Into<String>,
        relative_path: impl Into<String>,
        survey: impl Into<String>,
        trigger_source: TriggerSource,
    ) -> Self {
        self.file = file.into();
        self.relative_path = relative_path.into();
        self.survey = survey.into();
        self.trigger_source = trigger_source;
        self
    }

    /// Set the observer-assigned attributes.
    #[must_use]
    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    /// Replace station and identification before any merge, used for
    /// trimming labels and collapsing stations into sites.
    pub(crate) fn relabel(mut self, station: &str, identification: &str) -> Self {
        station.clone_into(&mut self.station);
        identification.clone_into(&mut self.identification);
        self
    }

    /// Station identifier.
    pub fn station(&self) -> &str {
        &self.station
    }

    /// Subject identification.
    pub fn identification(&self) -> &str {
        &self.identification
    }

    /// Time of the first image.
    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    /// Time of the latest image.
    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    /// Time from the first to the latest image.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// UTC offset the start and end are expressed in.
    pub fn utc_offset(&self) -> FixedOffset {
        *self.start.offset()
    }

    /// File name of the first image.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Relative path of the first image.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Survey of the first image.
    pub fn survey(&self) -> &str {
        &self.survey
    }

    /// Trigger source of the first image.
    pub fn trigger_source(&self) -> TriggerSource {
        self.trigger_source
    }

    /// Merged observer-assigned attributes.
    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Fold `other` into this detection if it continues it.
    ///
    /// Returns `false`, leaving both detections untouched, when the gap
    /// between this detection's latest image and `other`'s start exceeds
    /// `window` or when station or identification differ. Callers must
    /// supply detections in chronological order within a station and
    /// identification; [`DetectionMerger`](super::merge::DetectionMerger)
    /// enforces this.
    pub fn try_merge(&mut self, other: &Self, window: TimeDelta) -> bool {
        debug_assert!(
            other.start >= self.start,
            "detections are expected to be ordered by start time"
        );

        if other.start - self.end > window
            || self.identification != other.identification
            || self.station != other.station
        {
            return false;
        }

        // file, relative path, survey and trigger source stay with the first image
        self.classification.merge(&other.classification);
        self.end = other.end;
        true
    }

    /// Express start and end in a different UTC offset.
    ///
    /// The instants and the duration are unchanged; only the wall clock
    /// reading, and so the hour and month the detection falls in, moves.
    pub fn rezone(&mut self, offset: FixedOffset) {
        self.start = self.start.with_timezone(&offset);
        self.end = self.end.with_timezone(&offset);
    }
}
