//! Ground stations and station directories
use std::collections::BTreeMap;

use crate::prelude::{Error, StationError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Station location as reported by a directory.
/// Directories may omit coordinates: this is a station data error,
/// reported when the station gets resolved.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationLocation {
    /// Latitude (decimal degrees)
    #[cfg_attr(feature = "serde", serde(default))]
    pub lat: Option<f64>,
    /// Longitude (decimal degrees)
    #[cfg_attr(feature = "serde", serde(default))]
    pub lon: Option<f64>,
    /// Height (m), 0 when not provided
    #[cfg_attr(feature = "serde", serde(default))]
    pub height: Option<f64>,
}

impl StationLocation {
    /// Builds a complete [StationLocation]
    pub fn new(lat: f64, lon: f64, height: f64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            height: Some(height),
        }
    }
}

/// GNSS ground station, resolved for one run.
/// Identity is the (upper case) station code.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GroundStation {
    /// Station code, upper case
    pub id: String,
    /// Readable name
    pub name: String,
    /// Latitude (decimal degrees)
    pub latitude: f64,
    /// Longitude (decimal degrees)
    pub longitude: f64,
    /// Height (m)
    pub height: f64,
}

impl GroundStation {
    /// Builds a new [GroundStation], named after its code.
    pub fn new(id: &str, latitude: f64, longitude: f64, height: f64) -> Self {
        let id = normalize_id(id);
        Self {
            name: id.clone(),
            id,
            latitude,
            longitude,
            height,
        }
    }
    /// Copies and returns Self with updated name
    pub fn with_name(&self, name: &str) -> Self {
        let mut s = self.clone();
        s.name = name.to_string();
        s
    }
    /// Resolves a [GroundStation] from a directory entry.
    pub fn from_location(id: &str, location: &StationLocation) -> Result<Self, StationError> {
        match (location.lat, location.lon) {
            (Some(lat), Some(lon)) => Ok(Self::new(id, lat, lon, location.height.unwrap_or(0.0))),
            _ => Err(StationError::MissingCoordinates(normalize_id(id))),
        }
    }
    /// Coordinates sanity check
    pub fn validate(&self) -> Result<(), StationError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(StationError::InvalidLatitude(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(StationError::InvalidLongitude(self.longitude));
        }
        Ok(())
    }
}

/// Station identities are case insensitive
pub fn normalize_id(id: &str) -> String {
    id.trim().to_uppercase()
}

/// Station metadata provider
pub trait StationDirectory {
    /// Lists all known station identities
    fn list_ids(&self) -> Result<Vec<String>, Error>;
    /// Returns the location of given station, `Ok(None)` when unknown.
    fn location(&self, id: &str) -> Result<Option<StationLocation>, Error>;
}

impl<T: StationDirectory + ?Sized> StationDirectory for &T {
    fn list_ids(&self) -> Result<Vec<String>, Error> {
        (**self).list_ids()
    }
    fn location(&self, id: &str) -> Result<Option<StationLocation>, Error> {
        (**self).location(id)
    }
}

impl<T: StationDirectory + ?Sized> StationDirectory for Box<T> {
    fn list_ids(&self) -> Result<Vec<String>, Error> {
        (**self).list_ids()
    }
    fn location(&self, id: &str) -> Result<Option<StationLocation>, Error> {
        (**self).location(id)
    }
}

/// One entry of a station table, in the layout of the station API
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationEntry {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: StationLocation,
}

/// In memory [StationDirectory]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationTable {
    /// Insertion ordered codes
    ids: Vec<String>,
    locations: BTreeMap<String, StationLocation>,
}

impl StationTable {
    /// Inserts (or replaces) a station
    pub fn insert(&mut self, id: &str, location: StationLocation) {
        let id = normalize_id(id);
        if self.locations.insert(id.clone(), location).is_none() {
            self.ids.push(id);
        }
    }
    /// Copies and returns Self with one more station
    pub fn with_station(&self, id: &str, location: StationLocation) -> Self {
        let mut s = self.clone();
        s.insert(id, location);
        s
    }
    pub fn len(&self) -> usize {
        self.ids.len()
    }
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<StationEntry> for StationTable {
    fn from_iter<I: IntoIterator<Item = StationEntry>>(iter: I) -> Self {
        let mut table = Self::default();
        for entry in iter {
            table.insert(&entry.id, entry.location);
        }
        table
    }
}

impl StationDirectory for StationTable {
    fn list_ids(&self) -> Result<Vec<String>, Error> {
        Ok(self.ids.clone())
    }
    fn location(&self, id: &str) -> Result<Option<StationLocation>, Error> {
        Ok(self.locations.get(&normalize_id(id)).copied())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn case_insensitive() {
        let table = StationTable::default()
            .with_station("erkg", StationLocation::new(55.0, 37.0, 150.0))
            .with_station("BRUX", StationLocation::new(50.8, 4.36, 158.0));
        assert_eq!(table.len(), 2);
        assert_eq!(table.list_ids().unwrap(), vec!["ERKG", "BRUX"]);
        assert!(table.location("ErKg").unwrap().is_some());
        assert!(table.location("brux ").unwrap().is_some());
        assert!(table.location("XYZQ").unwrap().is_none());
    }
    #[test]
    fn resolution() {
        let station =
            GroundStation::from_location("erkg", &StationLocation::new(55.0, 37.0, 150.0)).unwrap();
        assert_eq!(station.id, "ERKG");
        assert_eq!(station.name, "ERKG");
        assert!(station.validate().is_ok());

        let partial = StationLocation {
            lat: Some(10.0),
            lon: None,
            height: None,
        };
        assert_eq!(
            GroundStation::from_location("abcd", &partial),
            Err(StationError::MissingCoordinates("ABCD".to_string()))
        );

        let no_height = StationLocation {
            lat: Some(10.0),
            lon: Some(20.0),
            height: None,
        };
        let station = GroundStation::from_location("abcd", &no_height).unwrap();
        assert_eq!(station.height, 0.0);
    }
    #[test]
    fn validation() {
        assert_eq!(
            GroundStation::new("a", 91.0, 0.0, 0.0).validate(),
            Err(StationError::InvalidLatitude(91.0))
        );
        assert_eq!(
            GroundStation::new("a", 0.0, -180.5, 0.0).validate(),
            Err(StationError::InvalidLongitude(-180.5))
        );
        assert!(GroundStation::new("a", -90.0, 180.0, 0.0).validate().is_ok());
    }
}
