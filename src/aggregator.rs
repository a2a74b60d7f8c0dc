//! Merges per station results into a single [RunResult]
use gnss::prelude::SV;
use hifitime::Epoch;

use crate::{
    pipeline::{ProcessingResult, RunMode},
    prelude::Error,
    time::{iso8601, TimeRange},
};

#[cfg(feature = "serde")]
use serde::Serialize;

/// One retained pierce point, as exported
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OutputPoint {
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::serdes::sv"))]
    pub satellite: SV,
    /// SIP latitude (decimal degrees)
    pub latitude: f64,
    /// SIP longitude (decimal degrees)
    pub longitude: f64,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "time", serialize_with = "crate::serdes::iso8601")
    )]
    pub epoch: Epoch,
    /// Elevation (degrees)
    pub elevation: f64,
    /// Azimuth (degrees)
    pub azimuth: f64,
    /// Station code
    pub station: String,
    pub station_name: String,
    pub station_lat: f64,
    pub station_lon: f64,
}

impl OutputPoint {
    /// ISO-8601 timestamp
    pub fn time(&self) -> String {
        iso8601(self.epoch)
    }
}

/// Summary of a station that contributed points
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ProcessedStation {
    pub code: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub satellites_with_intersections: usize,
    pub intersection_points: usize,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RunMetadata {
    /// "single_station" or "discovery"
    pub mode: String,
    /// Processed calendar day (YYYY-MM-DD)
    pub date: String,
    pub stations_processed: usize,
    pub stations_failed: usize,
    pub stations_with_intersections: usize,
    pub total_intersection_points: usize,
    pub satellites_processed: usize,
    pub time_range: TimeRange,
    pub polygon_points_count: usize,
    pub processed_stations: Vec<ProcessedStation>,
    /// Run level failure
    pub error: Option<String>,
}

/// Flat outcome of a run. Always returned, even on failure:
/// failures are described by `metadata.error` (run level) or by
/// each station `error` (station level).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RunResult {
    /// Retained points: station processing order, then satellite order
    pub points: Vec<OutputPoint>,
    pub metadata: RunMetadata,
    /// Per station outcomes, processing order
    pub stations: Vec<ProcessingResult>,
}

impl RunResult {
    /// True unless the run failed as a whole
    pub fn success(&self) -> bool {
        self.metadata.error.is_none()
    }
}

/// Accumulates [ProcessingResult]s
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    metadata: RunMetadata,
    points: Vec<OutputPoint>,
    stations: Vec<ProcessingResult>,
}

impl ResultAggregator {
    pub fn new(mode: &RunMode, range: TimeRange, polygon_points_count: usize) -> Self {
        let (y, m, d, _, _, _, _) = range.start.to_gregorian_utc();
        Self {
            metadata: RunMetadata {
                mode: mode.label().to_string(),
                date: format!("{:04}-{:02}-{:02}", y, m, d),
                stations_processed: 0,
                stations_failed: 0,
                stations_with_intersections: 0,
                total_intersection_points: 0,
                satellites_processed: 0,
                time_range: range,
                polygon_points_count,
                processed_stations: Vec::new(),
                error: None,
            },
            points: Vec::new(),
            stations: Vec::new(),
        }
    }
    /// Declares how many satellites survived sampling
    pub fn set_satellites_processed(&mut self, satellites: usize) {
        self.metadata.satellites_processed = satellites;
    }
    /// Stacks a new station result, preserving insertion order
    pub fn push(&mut self, result: ProcessingResult) {
        self.metadata.stations_processed += 1;
        if !result.success() {
            self.metadata.stations_failed += 1;
        } else if result.intersection_points > 0 {
            self.metadata.stations_with_intersections += 1;
            self.metadata.total_intersection_points += result.intersection_points;
            if let Some(station) = &result.station {
                self.metadata.processed_stations.push(ProcessedStation {
                    code: station.id.clone(),
                    name: station.name.clone(),
                    lat: station.latitude,
                    lon: station.longitude,
                    satellites_with_intersections: result.satellites_with_intersections,
                    intersection_points: result.intersection_points,
                });
            }
        }
        self.points.extend(result.trajectory_points.iter().cloned());
        self.stations.push(result);
    }
    /// Number of stations collected so far
    pub fn stations(&self) -> usize {
        self.stations.len()
    }
    /// Number of points collected so far
    pub fn points(&self) -> usize {
        self.points.len()
    }
    pub fn finish(self) -> RunResult {
        RunResult {
            points: self.points,
            metadata: self.metadata,
            stations: self.stations,
        }
    }
    /// Run level failure: empty point list, `error` set.
    /// Station results gathered so far are preserved.
    pub fn fail(mut self, error: &Error) -> RunResult {
        self.metadata.error = Some(error.to_string());
        self.points.clear();
        self.finish()
    }
}
