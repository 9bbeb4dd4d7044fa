//! Per-entity activity counters.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};
use serde::Serialize;

use super::detection::Detection;
use super::station::Station;
use crate::constants::calendar::{HOURS_IN_DAY, MONTHS_IN_YEAR};
use crate::error::{Error, Result};
use crate::utils::date::{hour_label, month_label, utc_today};

/// How detections are bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityShape {
    /// Hour of day of the detection start.
    Diel,
    /// Month of year of the detection start, optionally followed by
    /// detections per day of station uptime.
    Monthly {
        /// Append per-day rates after the monthly counts.
        per_day: bool,
    },
}

impl ActivityShape {
    /// Number of count buckets.
    pub const fn buckets(self) -> usize {
        match self {
            Self::Diel => HOURS_IN_DAY,
            Self::Monthly { .. } => MONTHS_IN_YEAR,
        }
    }

    /// Number of values in an activity row.
    pub const fn value_count(self) -> usize {
        match self {
            Self::Monthly { per_day: true } => 2 * MONTHS_IN_YEAR,
            _ => self.buckets(),
        }
    }

    /// Whether station metadata is needed to compute values.
    pub const fn requires_stations(self) -> bool {
        matches!(self, Self::Monthly { per_day: true })
    }

    /// Bucket a detection starting at `time` falls in, using its recorded offset.
    pub fn bucket_of(self, time: &DateTime<FixedOffset>) -> usize {
        match self {
            Self::Diel => time.hour() as usize,
            Self::Monthly { .. } => time.month0() as usize,
        }
    }

    /// Column labels of the values, in order.
    pub fn column_labels(self) -> Vec<String> {
        match self {
            Self::Diel => (0..HOURS_IN_DAY).map(hour_label).collect(),
            Self::Monthly { per_day } => {
                let mut labels: Vec<String> = (0..MONTHS_IN_YEAR)
                    .map(|m| month_label(m).to_string())
                    .collect();
                if per_day {
                    labels.extend((0..MONTHS_IN_YEAR).map(|m| format!("{}/day", month_label(m))));
                }
                labels
            }
        }
    }
}

/// What an accumulator aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// One camera station.
    Station,
    /// A named set of stations.
    Group,
    /// Every station.
    Total,
}

/// A station, group or the grand total, with the stations whose uptime it covers.
#[derive(Debug, Clone)]
pub struct ActivityEntity {
    /// Kind of entity.
    pub kind: EntityKind,
    /// Station id, group name or the total label.
    pub name: String,
    stations: Vec<Station>,
}

impl ActivityEntity {
    /// A single station.
    pub fn station(name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Station,
            name: name.into(),
            stations: Vec::new(),
        }
    }

    /// A named group covering the given member stations.
    pub fn group(name: impl Into<String>, members: Vec<Station>) -> Self {
        Self {
            kind: EntityKind::Group,
            name: name.into(),
            stations: members,
        }
    }

    /// The grand total.
    pub fn total(name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Total,
            name: name.into(),
            stations: Vec::new(),
        }
    }

    /// Stations whose uptime this entity covers.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Record that `station` contributed; group membership is fixed at construction.
    fn include(&mut self, station: &Station) {
        if self.kind != EntityKind::Group && !self.stations.iter().any(|s| s.id == station.id) {
            self.stations.push(station.clone());
        }
    }

    /// Summed uptime of the covered stations in `month` (1-12).
    pub fn uptime(&self, month: u32, today: NaiveDate) -> Result<u32> {
        self.stations
            .iter()
            .map(|station| station.uptime_as_of(month, today))
            .sum()
    }
}

/// Values and detection count for one identification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    /// Bucket counts, followed by per-day rates when requested.
    pub values: Vec<f64>,
    /// Number of detections.
    pub total: u32,
}

/// Counts detections of each identification into buckets for one entity.
#[derive(Debug, Clone)]
pub struct ActivityAccumulator {
    shape: ActivityShape,
    entity: ActivityEntity,
    counts: BTreeMap<String, Vec<u32>>,
    surveys: Vec<String>,
    as_of: Option<NaiveDate>,
}

impl ActivityAccumulator {
    /// Empty accumulator for `entity`.
    pub fn new(shape: ActivityShape, entity: ActivityEntity) -> Self {
        Self {
            shape,
            entity,
            counts: BTreeMap::new(),
            surveys: Vec::new(),
            as_of: None,
        }
    }

    /// Resolve still-operating stations' uptime up to `today` instead of the current date.
    #[must_use]
    pub fn with_as_of(mut self, today: NaiveDate) -> Self {
        self.as_of = Some(today);
        self
    }

    /// Bucket layout.
    pub fn shape(&self) -> ActivityShape {
        self.shape
    }

    /// Entity being aggregated.
    pub fn entity(&self) -> &ActivityEntity {
        &self.entity
    }

    /// Survey labels in first-seen order.
    pub fn surveys(&self) -> &[String] {
        &self.surveys
    }

    /// Identifications with at least one detection, ascending.
    pub fn identifications(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Raw bucket counts for an identification.
    pub fn counts(&self, identification: &str) -> Option<&[u32]> {
        self.counts.get(identification).map(Vec::as_slice)
    }

    /// Count a detection.
    ///
    /// `station` is the detection's resolved station. It is required when
    /// the shape needs uptime.
    pub fn add(&mut self, detection: &Detection, station: Option<&Station>) -> Result<()> {
        match station {
            Some(station) => self.entity.include(station),
            None if self.shape.requires_stations() => {
                return Err(Error::UnknownStation {
                    station: detection.station().to_string(),
                });
            }
            None => {}
        }

        let survey = detection.survey();
        if !survey.is_empty() && !self.surveys.iter().any(|s| s == survey) {
            self.surveys.push(survey.to_string());
        }

        let buckets = self.shape.buckets();
        let counts = self
            .counts
            .entry(detection.identification().to_string())
            .or_insert_with(|| vec![0; buckets]);
        counts[self.shape.bucket_of(&detection.start())] += 1;
        Ok(())
    }

    /// Counts, followed by per-day rates when the shape asks for them.
    ///
    /// A month without uptime has a rate of zero.
    pub fn activity(&self, identification: &str) -> Result<Option<ActivitySummary>> {
        let Some(counts) = self.counts.get(identification) else {
            return Ok(None);
        };

        let total = counts.iter().sum();
        let mut values: Vec<f64> = counts.iter().map(|&c| f64::from(c)).collect();

        if self.shape.requires_stations() {
            let today = self.as_of.unwrap_or_else(utc_today);
            for (month0, &count) in counts.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let uptime = self.entity.uptime(month0 as u32 + 1, today)?;
                values.push(if uptime == 0 {
                    0.0
                } else {
                    f64::from(count) / f64::from(uptime)
                });
            }
        }

        Ok(Some(ActivitySummary { values, total }))
    }

    /// As [`ActivityAccumulator::activity`], with every value divided by the
    /// detection count, per-day rates included.
    pub fn probability(&self, identification: &str) -> Result<Option<ActivitySummary>> {
        let Some(mut summary) = self.activity(identification)? else {
            return Ok(None);
        };

        if summary.total > 0 {
            let total = f64::from(summary.total);
            for value in &mut summary.values {
                *value /= total;
            }
        }
        Ok(Some(summary))
    }
}
