//! Processing observers.
//!
//! The pipeline never logs by itself: it notifies an [Observer]
//! at well defined stage boundaries.
use gnss::prelude::SV;

use crate::{
    pipeline::{ProcessingResult, RunMode, Stage},
    prelude::Error,
    time::TimeRange,
};

/// Reason why a satellite did not make it
#[derive(Debug, Clone, PartialEq)]
pub enum Exclusion {
    /// Not enough valid samples, with the valid sample ratio
    DataQuality(f64),
    /// Numerical failure while computing angles or pierce points
    Computation,
}

impl std::fmt::Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::DataQuality(ratio) => write!(f, "only {:.1}% valid samples", ratio * 100.0),
            Self::Computation => f.write_str("numerical failure"),
        }
    }
}

/// Pipeline events. Every method has a no-op default,
/// implementors pick what they need.
pub trait Observer {
    fn run_started(&self, _mode: &RunMode, _range: &TimeRange) {}
    /// Ephemeris sampling is over
    fn sampling_done(&self, _retained: usize, _requested: usize) {}
    /// `sv` has been dropped: for this run (data quality),
    /// or for the current station (computation).
    fn satellite_excluded(&self, _sv: SV, _reason: &Exclusion) {}
    /// Too few satellites left to be representative
    fn few_satellites(&self, _retained: usize) {}
    /// Discovery mode: `candidates` stations passed the geofence pre-filter
    fn discovery_done(&self, _examined: usize, _candidates: usize, _skipped: usize) {}
    fn station_started(&self, _station: &str) {}
    fn stage_completed(&self, _station: &str, _stage: Stage) {}
    fn stage_failed(&self, _station: &str, _stage: Stage, _error: &Error) {}
    fn station_done(&self, _result: &ProcessingResult) {}
    fn run_failed(&self, _error: &Error) {}
    fn run_done(&self, _stations: usize, _points: usize) {}
}

/// Discards all events
#[derive(Debug, Default, Copy, Clone)]
pub struct NullObserver;

impl Observer for NullObserver {}

/// Forwards all events to the [log] facade
#[derive(Debug, Default, Copy, Clone)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn run_started(&self, mode: &RunMode, range: &TimeRange) {
        info!(
            "{} - {} | {}",
            crate::time::iso8601(range.start),
            crate::time::iso8601(range.end),
            mode
        );
    }
    fn sampling_done(&self, retained: usize, requested: usize) {
        info!("ephemeris: {}/{} satellites retained", retained, requested);
    }
    fn satellite_excluded(&self, sv: SV, reason: &Exclusion) {
        match reason {
            Exclusion::DataQuality(ratio) => {
                debug!("{}", Error::DataQuality { sv, ratio: *ratio })
            },
            Exclusion::Computation => warn!("{} excluded: {}", sv, reason),
        }
    }
    fn few_satellites(&self, retained: usize) {
        warn!(
            "only {} satellites with valid ephemeris: trajectories may be sparse",
            retained
        );
    }
    fn discovery_done(&self, examined: usize, candidates: usize, skipped: usize) {
        info!(
            "discovery: {} stations examined, {} within geofence ({} skipped)",
            examined, candidates, skipped
        );
    }
    fn station_started(&self, station: &str) {
        info!("{}: processing", station);
    }
    fn stage_completed(&self, station: &str, stage: Stage) {
        debug!("{}: {:?} completed", station, stage);
    }
    fn stage_failed(&self, station: &str, stage: Stage, error: &Error) {
        warn!("{}: {:?} failed: {}", station, stage, error);
    }
    fn station_done(&self, result: &ProcessingResult) {
        if result.success() {
            info!(
                "{}: {}/{} satellites, {} points within geofence",
                result.station_id,
                result.satellites_with_intersections,
                result.satellites_total,
                result.intersection_points
            );
        }
    }
    fn run_failed(&self, error: &Error) {
        error!("run failed: {}", error);
    }
    fn run_done(&self, stations: usize, points: usize) {
        info!("run completed: {} stations, {} points", stations, points);
    }
}
