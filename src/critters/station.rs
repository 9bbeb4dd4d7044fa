//! Station operating periods and uptime.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::constants::SITE_PREFIX_LEN;
use crate::error::{Error, Result};
use crate::utils::date::{days_in_month, is_in_month, utc_today};

/// A camera station and the period it was operating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Station {
    /// Station identifier, as used in image and detection tables.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Date the camera was set.
    pub date_set: NaiveDate,
    /// Date the camera was removed; `None` while still operating.
    pub date_removed: Option<NaiveDate>,
}

impl Station {
    /// Create a station.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        date_set: NaiveDate,
        date_removed: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date_set,
            date_removed,
        }
    }

    /// Days the station was operating in `month` (1-12), summed over every
    /// year it was deployed. A station still operating counts up to today.
    pub fn uptime(&self, month: u32) -> Result<u32> {
        self.uptime_as_of(month, utc_today())
    }

    /// As [`Station::uptime`], with `today` standing in for a missing removal date.
    pub fn uptime_as_of(&self, month: u32, today: NaiveDate) -> Result<u32> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidMonth { month });
        }

        let start = self.date_set;
        let end = self.date_removed.unwrap_or(today);
        if end < start {
            return Ok(0);
        }

        let mut days = 0;
        for year in start.year()..=end.year() {
            let Some(length) = days_in_month(year, month) else {
                continue;
            };
            let (Some(first), Some(last)) = (
                NaiveDate::from_ymd_opt(year, month, 1),
                NaiveDate::from_ymd_opt(year, month, length),
            ) else {
                continue;
            };

            let began = is_in_month(start, year, month);
            let ended = is_in_month(end, year, month);

            days += if start <= first && last <= end {
                length
            } else if began && ended {
                end.day() - start.day()
            } else if began {
                length - start.day()
            } else if ended {
                end.day()
            } else {
                0
            };
        }

        Ok(days)
    }

    /// Widen this station's operating period to cover `other`'s.
    pub fn merge_uptime(&mut self, other: &Self) {
        self.date_set = self.date_set.min(other.date_set);
        self.date_removed = match (self.date_removed, other.date_removed) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
    }
}

/// Site identifier of a station: the first four characters of its id.
pub fn site_of(station: &str) -> &str {
    match station.char_indices().nth(SITE_PREFIX_LEN) {
        Some((index, _)) => &station[..index],
        None => station,
    }
}

/// Stations keyed by identifier, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    stations: Vec<Station>,
    index: HashMap<String, usize>,
}

impl StationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, merging the operating periods of duplicate ids.
    pub fn from_stations(stations: impl IntoIterator<Item = Station>) -> Self {
        let mut registry = Self::new();
        for station in stations {
            registry.insert(station);
        }
        registry
    }

    /// Add a station; a duplicate id widens the existing station's period.
    pub fn insert(&mut self, station: Station) {
        match self.index.get(&station.id) {
            Some(&i) => self.stations[i].merge_uptime(&station),
            None => {
                self.index.insert(station.id.clone(), self.stations.len());
                self.stations.push(station);
            }
        }
    }

    /// Look up a station.
    pub fn get(&self, id: &str) -> Option<&Station> {
        self.index.get(id).map(|&i| &self.stations[i])
    }

    /// Look up a station that must exist.
    pub fn require(&self, id: &str) -> Result<&Station> {
        self.get(id).ok_or_else(|| Error::UnknownStation {
            station: id.to_string(),
        })
    }

    /// Whether a station is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate stations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether no stations are registered.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Collapse stations into sites, merging operating periods.
    ///
    /// Each site takes its name from the first station seen for it.
    pub fn sites(&self) -> Self {
        Self::from_stations(self.stations.iter().map(|station| {
            let mut site = station.clone();
            site.id = site_of(&station.id).to_string();
            site
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn station(set: NaiveDate, removed: Option<NaiveDate>) -> Station {
        Station::new("HOLA1", "Hollow A", set, removed)
    }

    #[test]
    fn test_uptime_full_month() {
        let s = station(date(2021, 1, 1), Some(date(2021, 12, 31)));
        assert_eq!(s.uptime(3).unwrap(), 31);
        assert_eq!(s.uptime(2).unwrap(), 28);
    }

    #[test]
    fn test_uptime_began_and_ended_same_month() {
        let s = station(date(2021, 3, 5), Some(date(2021, 3, 26)));
        assert_eq!(s.uptime(3).unwrap(), 21);
        assert_eq!(s.uptime(4).unwrap(), 0);
    }

    #[test]
    fn test_uptime_invalid_month() {
        let s = station(date(2021, 3, 5), Some(date(2021, 3, 26)));
        assert!(matches!(s.uptime(0), Err(Error::InvalidMonth { month: 0 })));
        assert!(matches!(s.uptime(13), Err(Error::InvalidMonth { month: 13 })));
    }

    #[test]
    fn test_uptime_still_operating_uses_today() {
        let s = station(date(2021, 5, 10), None);
        let today = date(2021, 6, 20);
        assert_eq!(s.uptime_as_of(5, today).unwrap(), 21);
        assert_eq!(s.uptime_as_of(6, today).unwrap(), 20);
        assert_eq!(s.uptime_as_of(7, today).unwrap(), 0);
    }

    #[test]
    fn test_merge_uptime_widens() {
        let mut a = station(date(2021, 3, 1), Some(date(2021, 6, 1)));
        a.merge_uptime(&station(date(2021, 2, 1), Some(date(2021, 5, 1))));
        assert_eq!(a.date_set, date(2021, 2, 1));
        assert_eq!(a.date_removed, Some(date(2021, 6, 1)));

        a.merge_uptime(&station(date(2021, 4, 1), None));
        assert_eq!(a.date_removed, None);
    }

    #[test]
    fn test_site_of() {
        assert_eq!(site_of("HOLA1"), "HOLA");
        assert_eq!(site_of("HOL"), "HOL");
        assert_eq!(site_of("ÅÄÖÜX"), "ÅÄÖÜ");
    }

    #[test]
    fn test_registry_require_unknown() {
        let registry = StationRegistry::from_stations([station(date(2021, 1, 1), None)]);
        assert!(registry.require("HOLA1").is_ok());
        assert!(matches!(
            registry.require("NOPE"),
            Err(Error::UnknownStation { station }) if station == "NOPE"
        ));
    }

    #[test]
    fn test_registry_duplicates_merge() {
        let registry = StationRegistry::from_stations([
            station(date(2021, 3, 1), Some(date(2021, 4, 1))),
            station(date(2021, 1, 1), Some(date(2021, 2, 1))),
        ]);
        assert_eq!(registry.len(), 1);
        let merged = registry.get("HOLA1").unwrap();
        assert_eq!(merged.date_set, date(2021, 1, 1));
        assert_eq!(merged.date_removed, Some(date(2021, 4, 1)));
    }

    #[test]
    fn test_registry_sites() {
        let registry = StationRegistry::from_stations([
            Station::new("HOLA1", "a", date(2021, 3, 1), Some(date(2021, 4, 1))),
            Station::new("HOLA2", "b", date(2021, 2, 1), Some(date(2021, 3, 15))),
            Station::new("BRUN1", "c", date(2021, 1, 1), None),
        ]);

        let sites = registry.sites();

        assert_eq!(sites.len(), 2);
        let hola = sites.get("HOLA").unwrap();
        assert_eq!(hola.name, "a");
        assert_eq!(hola.date_set, date(2021, 2, 1));
        assert_eq!(hola.date_removed, Some(date(2021, 4, 1)));
        assert!(sites.contains("BRUN"));
    }
}
