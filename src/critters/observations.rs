//! Activity across stations, groups and the grand total.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::activity::{ActivityAccumulator, ActivityEntity, ActivityShape, EntityKind};
use super::detection::Detection;
use super::station::{Station, StationRegistry};
use crate::constants::TOTAL_ENTITY_NAME;
use crate::constants::columns::{
    ACTIVITY_IDENTIFICATION, ACTIVITY_N, ACTIVITY_STATION, ACTIVITY_SURVEY,
};
use crate::error::{Error, Result};

/// Which rows to produce and how.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowOptions {
    /// Divide values by the detection count.
    pub probabilities: bool,
    /// Append the grand total after stations and groups.
    pub include_total: bool,
}

/// One output row: an entity's activity for one identification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRow {
    /// Station id, group name or total label.
    pub entity: String,
    /// Kind of entity.
    pub kind: EntityKind,
    /// Identification label.
    pub identification: String,
    /// Bucket values, counts or probabilities, then any per-day rates.
    pub values: Vec<f64>,
    /// Number of detections.
    pub total: u32,
    /// Surveys contributing to the entity.
    pub surveys: Vec<String>,
}

/// Routes detections to per-station, per-group and total accumulators.
#[derive(Debug)]
pub struct ActivityObservations {
    shape: ActivityShape,
    as_of: Option<NaiveDate>,
    registry: Option<StationRegistry>,
    by_station: BTreeMap<String, ActivityAccumulator>,
    /// Sorted by name.
    groups: Vec<ActivityAccumulator>,
    /// station -> indices into `groups`
    groups_by_station: HashMap<String, Vec<usize>>,
    total: ActivityAccumulator,
}

impl ActivityObservations {
    /// Set up accumulators for `groups` (name -> member stations).
    ///
    /// When the shape needs uptime, a registry is required and every group
    /// member must be in it.
    pub fn new(
        shape: ActivityShape,
        groups: &BTreeMap<String, Vec<String>>,
        registry: Option<StationRegistry>,
    ) -> Result<Self> {
        if shape.requires_stations() && registry.is_none() {
            return Err(Error::StationsRequired);
        }

        let mut group_accumulators = Vec::with_capacity(groups.len());
        let mut groups_by_station: HashMap<String, Vec<usize>> = HashMap::new();

        // BTreeMap iteration keeps groups sorted by name
        for (index, (name, members)) in groups.iter().enumerate() {
            let mut resolved: Vec<Station> = Vec::new();
            for member in members {
                if let Some(registry) = &registry {
                    if shape.requires_stations() {
                        resolved.push(registry.require(member)?.clone());
                    } else if let Some(station) = registry.get(member) {
                        resolved.push(station.clone());
                    }
                }

                let indices = groups_by_station.entry(member.clone()).or_default();
                if !indices.contains(&index) {
                    indices.push(index);
                }
            }

            debug!("Group {name}: {} stations", members.len());
            group_accumulators.push(ActivityAccumulator::new(
                shape,
                ActivityEntity::group(name.clone(), resolved),
            ));
        }

        Ok(Self {
            shape,
            as_of: None,
            registry,
            by_station: BTreeMap::new(),
            groups: group_accumulators,
            groups_by_station,
            total: ActivityAccumulator::new(shape, ActivityEntity::total(TOTAL_ENTITY_NAME)),
        })
    }

    /// Build observations and add every detection.
    pub fn from_detections<'a>(
        shape: ActivityShape,
        groups: &BTreeMap<String, Vec<String>>,
        registry: Option<StationRegistry>,
        detections: impl IntoIterator<Item = &'a Detection>,
    ) -> Result<Self> {
        let mut observations = Self::new(shape, groups, registry)?;
        for detection in detections {
            observations.add(detection)?;
        }
        Ok(observations)
    }

    /// Resolve still-operating stations' uptime up to `today`.
    #[must_use]
    pub fn with_as_of(mut self, today: NaiveDate) -> Self {
        self.as_of = Some(today);
        self.groups = self
            .groups
            .into_iter()
            .map(|group| group.with_as_of(today))
            .collect();
        self.by_station = self
            .by_station
            .into_iter()
            .map(|(name, acc)| (name, acc.with_as_of(today)))
            .collect();
        self.total = self.total.with_as_of(today);
        self
    }

    /// Count a detection for its station, every group containing the
    /// station, and the total.
    pub fn add(&mut self, detection: &Detection) -> Result<()> {
        let id = detection.station();
        let station = match &self.registry {
            Some(registry) if self.shape.requires_stations() => Some(registry.require(id)?),
            Some(registry) => registry.get(id),
            None => None,
        };

        let accumulator = self.by_station.entry(id.to_string()).or_insert_with(|| {
            let acc = ActivityAccumulator::new(self.shape, ActivityEntity::station(id));
            match self.as_of {
                Some(today) => acc.with_as_of(today),
                None => acc,
            }
        });
        accumulator.add(detection, station)?;

        if let Some(indices) = self.groups_by_station.get(id) {
            for &index in indices {
                self.groups[index].add(detection, station)?;
            }
        }

        self.total.add(detection, station)
    }

    /// Bucket layout shared by every accumulator.
    pub fn shape(&self) -> ActivityShape {
        self.shape
    }

    /// Per-station accumulators, by station name.
    pub fn stations(&self) -> impl Iterator<Item = &ActivityAccumulator> {
        self.by_station.values()
    }

    /// Group accumulators, by group name.
    pub fn groups(&self) -> &[ActivityAccumulator] {
        &self.groups
    }

    /// Grand total accumulator.
    pub fn total(&self) -> &ActivityAccumulator {
        &self.total
    }

    /// Header matching [`ActivityObservations::rows`].
    pub fn column_headers(&self) -> Vec<String> {
        let mut headers = vec![
            ACTIVITY_STATION.to_string(),
            ACTIVITY_IDENTIFICATION.to_string(),
        ];
        headers.extend(self.shape.column_labels());
        headers.push(ACTIVITY_N.to_string());
        headers.push(ACTIVITY_SURVEY.to_string());
        headers
    }

    /// Output rows: stations by name, then groups by name, then the total if
    /// asked for; identifications ascending within each.
    pub fn rows(&self, options: RowOptions) -> Result<Vec<ActivityRow>> {
        let total = options.include_total.then_some(&self.total);
        let accumulators = self.by_station.values().chain(&self.groups).chain(total);

        let mut rows = Vec::new();
        for accumulator in accumulators {
            for identification in accumulator.identifications() {
                let summary = if options.probabilities {
                    accumulator.probability(identification)?
                } else {
                    accumulator.activity(identification)?
                };
                let Some(summary) = summary else {
                    continue;
                };

                let entity = accumulator.entity();
                rows.push(ActivityRow {
                    entity: entity.name.clone(),
                    kind: entity.kind,
                    identification: identification.to_string(),
                    values: summary.values,
                    total: summary.total,
                    surveys: accumulator.surveys().to_vec(),
                });
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};

    fn at(time: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(time).unwrap()
    }

    fn detection(station: &str, identification: &str, time: &str) -> Detection {
        Detection::new(station, identification, at(time), at(time)).unwrap()
    }

    fn groups(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(name, members)| {
                (
                    (*name).to_string(),
                    members.iter().map(|m| (*m).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_routes_to_station_group_and_total_once() {
        let groups = groups(&[("G1", &["S1", "S1", "S2"]), ("G2", &["S3"])]);
        let mut observations =
            ActivityObservations::new(ActivityShape::Diel, &groups, None).unwrap();

        observations
            .add(&detection("S1", "fox", "2021-06-01T05:00:00Z"))
            .unwrap();

        let g1 = &observations.groups()[0];
        assert_eq!(g1.counts("fox").unwrap()[5], 1);
        assert!(observations.groups()[1].counts("fox").is_none());
        assert_eq!(observations.total().counts("fox").unwrap()[5], 1);
        assert_eq!(observations.stations().count(), 1);
    }

    #[test]
    fn test_row_order() {
        let groups = groups(&[("Zed", &["B"]), ("Alpha", &["A"])]);
        let mut observations =
            ActivityObservations::new(ActivityShape::Monthly { per_day: false }, &groups, None)
                .unwrap();
        for (station, identification) in [("B", "fox"), ("A", "fox"), ("A", "bear")] {
            observations
                .add(&detection(station, identification, "2021-03-01T00:00:00Z"))
                .unwrap();
        }

        let rows = observations
            .rows(RowOptions {
                probabilities: false,
                include_total: true,
            })
            .unwrap();
        let order: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.entity.as_str(), r.identification.as_str()))
            .collect();

        assert_eq!(
            order,
            [
                ("A", "bear"),
                ("A", "fox"),
                ("B", "fox"),
                ("Alpha", "bear"),
                ("Alpha", "fox"),
                ("Zed", "fox"),
                ("total", "bear"),
                ("total", "fox"),
            ]
        );
        assert_eq!(rows[7].total, 2);
        assert_eq!(rows[7].values[2], 2.0);
    }

    #[test]
    fn test_total_omitted_by_default() {
        let mut observations =
            ActivityObservations::new(ActivityShape::Diel, &BTreeMap::new(), None).unwrap();
        observations
            .add(&detection("A", "fox", "2021-03-01T00:00:00Z"))
            .unwrap();

        let rows = observations.rows(RowOptions::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, EntityKind::Station);
    }

    #[test]
    fn test_per_day_without_registry_fails() {
        let result = ActivityObservations::new(
            ActivityShape::Monthly { per_day: true },
            &BTreeMap::new(),
            None,
        );
        assert!(matches!(result, Err(Error::StationsRequired)));
    }

    #[test]
    fn test_per_day_unknown_group_member_fails() {
        let registry = StationRegistry::from_stations([Station::new(
            "A",
            "A",
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            None,
        )]);
        let result = ActivityObservations::new(
            ActivityShape::Monthly { per_day: true },
            &groups(&[("G", &["A", "B"])]),
            Some(registry),
        );
        assert!(matches!(result, Err(Error::UnknownStation { station }) if station == "B"));
    }

    #[test]
    fn test_per_day_unknown_detection_station_fails() {
        let registry = StationRegistry::from_stations([Station::new(
            "A",
            "A",
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            None,
        )]);
        let mut observations = ActivityObservations::new(
            ActivityShape::Monthly { per_day: true },
            &BTreeMap::new(),
            Some(registry),
        )
        .unwrap();

        let result = observations.add(&detection("B", "fox", "2021-03-01T00:00:00Z"));
        assert!(matches!(result, Err(Error::UnknownStation { .. })));
    }

    #[test]
    fn test_column_headers() {
        let observations =
            ActivityObservations::new(ActivityShape::Diel, &BTreeMap::new(), None).unwrap();
        let headers = observations.column_headers();
        assert_eq!(headers.len(), 2 + 24 + 2);
        assert_eq!(headers[0], "Station");
        assert_eq!(headers[2], "00:30");
        assert_eq!(headers[27], "Survey");
    }
}
