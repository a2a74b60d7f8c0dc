//! Radius query mode: pierce points close to an event location
use gnss::prelude::SV;
use hifitime::Epoch;

use crate::geometry::{great_circle_distance, SubIonosphericPoint};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Pierce point within range of an event
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PointOfInterest {
    /// Station code
    pub station: String,
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::serdes::sv"))]
    pub satellite: SV,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "time", serialize_with = "crate::serdes::iso8601")
    )]
    pub epoch: Epoch,
    /// Great circle distance to the event (m)
    pub distance: f64,
    /// Pierce point latitude (decimal degrees)
    pub latitude: f64,
    /// Pierce point longitude (decimal degrees)
    pub longitude: f64,
    /// Shell height (m)
    pub height: f64,
}

/// Great circle distances (m) between an event (decimal degrees)
/// and every pierce point of a series, aligned with it.
pub fn event_distances(
    latitude: f64,
    longitude: f64,
    sips: &[SubIonosphericPoint],
    earth_radius: f64,
) -> Vec<f64> {
    sips.iter()
        .map(|sip| great_circle_distance(latitude, longitude, sip.latitude, sip.longitude, earth_radius))
        .collect()
}

/// Indexes of the distances strictly below `max_distance` (m)
pub fn distance_mask(distances: &[f64], max_distance: f64) -> Vec<usize> {
    distances
        .iter()
        .enumerate()
        .filter_map(|(i, d)| if *d < max_distance { Some(i) } else { None })
        .collect()
}

/// Pierce points of each satellite, seen from `station`, that lie
/// within `max_distance` (m) of the event, in satellite order.
pub fn points_of_interest(
    station: &str,
    event: (f64, f64),
    max_distance: f64,
    shell_height: f64,
    sips: &[(SV, Vec<SubIonosphericPoint>)],
    earth_radius: f64,
) -> Vec<PointOfInterest> {
    let (latitude, longitude) = event;
    let mut points = Vec::new();
    for (sv, series) in sips {
        let distances = event_distances(latitude, longitude, series, earth_radius);
        for i in distance_mask(&distances, max_distance) {
            points.push(PointOfInterest {
                station: station.to_string(),
                satellite: *sv,
                epoch: series[i].epoch,
                distance: distances[i],
                latitude: series[i].latitude,
                longitude: series[i].longitude,
                height: shell_height,
            });
        }
    }
    points
}
