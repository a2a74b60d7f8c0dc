//! Station processing pipeline.
//!
//! Each station goes through
//! `ResolveStation → ValidateCoordinates → ComputeAngles → ComputeSips
//! → FilterByPolygon → Aggregate → Done`, and may end up `Failed`
//! at any stage. A station failure never aborts the run: only
//! the lack of usable ephemeris, or an empty discovery, does.
use std::collections::HashMap;

use gnss::prelude::SV;
use itertools::Itertools;

use crate::{
    aggregator::{OutputPoint, ResultAggregator, RunResult},
    cfg::Config,
    constants::MIN_SATELLITES_WARNING,
    ephemeris::EphemerisSource,
    geometry::{
        elevation_azimuth_series, station_ecef, sub_ionospheric_series, ElevationAzimuth,
        SubIonosphericPoint,
    },
    observer::{Exclusion, NullObserver, Observer},
    polygon::{filter_trajectory, Geofence},
    prelude::{Error, StationError},
    sampler::SampledEphemeris,
    station::{normalize_id, GroundStation, StationDirectory},
    time::TimeRange,
};

#[cfg(feature = "serde")]
use serde::Serialize;

/// How stations are selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// One station, designated by its code. Any of its pierce points
    /// may fall within the geofence.
    SingleStation(String),
    /// Every station of the directory whose own ground location
    /// lies within the geofence.
    Discovery,
}

impl RunMode {
    /// Short label
    pub fn label(&self) -> &'static str {
        match self {
            Self::SingleStation(_) => "single_station",
            Self::Discovery => "discovery",
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::SingleStation(id) => write!(f, "single station {}", normalize_id(id)),
            Self::Discovery => f.write_str("station discovery"),
        }
    }
}

/// Station processing stages
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Stage {
    ResolveStation,
    ValidateCoordinates,
    ComputeAngles,
    ComputeSips,
    FilterByPolygon,
    Aggregate,
    Done,
    Failed,
}

impl Stage {
    /// Next stage on success
    pub fn next(&self) -> Self {
        match self {
            Self::ResolveStation => Self::ValidateCoordinates,
            Self::ValidateCoordinates => Self::ComputeAngles,
            Self::ComputeAngles => Self::ComputeSips,
            Self::ComputeSips => Self::FilterByPolygon,
            Self::FilterByPolygon => Self::Aggregate,
            Self::Aggregate | Self::Done => Self::Done,
            Self::Failed => Self::Failed,
        }
    }
}

/// Outcome of one station
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ProcessingResult {
    /// Station code, as requested
    pub station_id: String,
    /// Resolved station (when resolution succeeded)
    pub station: Option<GroundStation>,
    /// Final stage: [Stage::Done] or [Stage::Failed]
    pub stage: Stage,
    /// Stage that failed
    pub failed_stage: Option<Stage>,
    /// Satellites processed for this station
    pub satellites_total: usize,
    /// Satellites with at least one point within the geofence
    pub satellites_with_intersections: usize,
    /// Satellites dropped on numerical failure
    pub satellites_failed: usize,
    /// Total number of points within the geofence
    pub intersection_points: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub trajectory_points: Vec<OutputPoint>,
    pub error: Option<String>,
}

impl ProcessingResult {
    fn failure(station_id: &str, progress: Progress, e: &Error) -> Self {
        Self {
            station_id: station_id.to_string(),
            station: progress.station,
            stage: Stage::Failed,
            failed_stage: Some(progress.stage),
            satellites_total: progress.satellites_total,
            satellites_with_intersections: 0,
            satellites_failed: progress.satellites_failed,
            intersection_points: 0,
            trajectory_points: Vec::new(),
            error: Some(e.to_string()),
        }
    }
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Station to be processed
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    /// To be resolved from the station directory
    Code(String),
    /// Already resolved (discovery)
    Resolved(GroundStation),
}

impl Candidate {
    fn id(&self) -> String {
        match self {
            Self::Code(code) => normalize_id(code),
            Self::Resolved(station) => station.id.clone(),
        }
    }
}

/*
 * Per satellite products of one station
 */
struct Products {
    angles: HashMap<SV, Vec<ElevationAzimuth>>,
    sips: Vec<(SV, Vec<SubIonosphericPoint>)>,
    failed: usize,
    first_failure: Option<SV>,
}

/*
 * What is known about a station while it goes through the stages,
 * kept on failure.
 */
struct Progress {
    stage: Stage,
    station: Option<GroundStation>,
    satellites_total: usize,
    satellites_failed: usize,
}

/// Drives stations through all processing stages
pub struct StationProcessingPipeline<'a> {
    cfg: &'a Config,
    observer: &'a dyn Observer,
}

impl<'a> StationProcessingPipeline<'a> {
    /// Builds a new silent pipeline
    pub fn new(cfg: &'a Config) -> Self {
        Self {
            cfg,
            observer: &NullObserver,
        }
    }
    /// Copies and returns Self, reporting to given [Observer]
    pub fn with_observer(&self, observer: &'a dyn Observer) -> Self {
        Self {
            cfg: self.cfg,
            observer,
        }
    }
    /// Processes one calendar day. Never fails: run level failures
    /// are described in the returned [RunResult].
    pub fn run<E, D>(
        &self,
        mode: &RunMode,
        ephemeris: &E,
        directory: &D,
        geofence: &Geofence,
        range: TimeRange,
    ) -> RunResult
    where
        E: EphemerisSource + ?Sized,
        D: StationDirectory + ?Sized,
    {
        self.observer.run_started(mode, &range);
        let mut aggregator = ResultAggregator::new(mode, range, geofence.vertices_count());

        let candidates = match mode {
            RunMode::SingleStation(code) => vec![Candidate::Code(code.clone())],
            RunMode::Discovery => match self.discover(directory, geofence) {
                Ok(stations) => stations.into_iter().map(Candidate::Resolved).collect(),
                Err(e) => {
                    self.observer.run_failed(&e);
                    return aggregator.fail(&e);
                },
            },
        };

        let sampled = self.cfg.sampler().sample(
            ephemeris,
            &self.cfg.satellites,
            range.start,
            range.end,
            self.observer,
        );
        if sampled.is_empty() {
            let e = Error::NoUsableEphemeris;
            self.observer.run_failed(&e);
            return aggregator.fail(&e);
        }
        if sampled.len() < MIN_SATELLITES_WARNING {
            self.observer.few_satellites(sampled.len());
        }
        aggregator.set_satellites_processed(sampled.len());

        for candidate in candidates {
            let result = self.process_station(&candidate, directory, &sampled, geofence);
            self.observer.station_done(&result);
            aggregator.push(result);
        }

        self.observer.run_done(aggregator.stations(), aggregator.points());
        aggregator.finish()
    }

    /// Lists the directory and returns the stations whose ground location
    /// lies within the geofence. Stations that cannot be resolved,
    /// or with invalid coordinates, are skipped.
    pub fn discover<D>(
        &self,
        directory: &D,
        geofence: &Geofence,
    ) -> Result<Vec<GroundStation>, Error>
    where
        D: StationDirectory + ?Sized,
    {
        let ids = directory
            .list_ids()?
            .iter()
            .map(|id| normalize_id(id))
            .unique()
            .collect::<Vec<_>>();
        let total = ids.len();
        // a null limit means no limit
        let limit = match self.cfg.discovery_limit {
            Some(limit) if limit > 0 => limit,
            _ => total,
        };
        let step = std::cmp::max(1, total / std::cmp::max(1, limit));

        let (mut examined, mut skipped) = (0, 0);
        let mut candidates = Vec::new();

        for id in ids.iter().step_by(step).take(limit) {
            examined += 1;
            let station = match directory.location(id) {
                Ok(Some(location)) => match GroundStation::from_location(id, &location) {
                    Ok(station) => station,
                    Err(_) => {
                        skipped += 1;
                        continue;
                    },
                },
                _ => {
                    skipped += 1;
                    continue;
                },
            };
            if station.validate().is_err() {
                skipped += 1;
                continue;
            }
            if geofence.contains(station.latitude, station.longitude) {
                candidates.push(station);
            }
        }

        self.observer.discovery_done(examined, candidates.len(), skipped);

        if candidates.is_empty() {
            Err(Error::NoCandidateStation)
        } else {
            Ok(candidates)
        }
    }

    /// Resolves a station from the directory
    pub fn resolve<D>(&self, directory: &D, code: &str) -> Result<GroundStation, Error>
    where
        D: StationDirectory + ?Sized,
    {
        match directory.location(code)? {
            Some(location) => Ok(GroundStation::from_location(code, &location)?),
            None => Err(StationError::UnknownStation(normalize_id(code)).into()),
        }
    }

    /// Runs one station through all stages.
    pub fn process_station<D>(
        &self,
        candidate: &Candidate,
        directory: &D,
        sampled: &SampledEphemeris,
        geofence: &Geofence,
    ) -> ProcessingResult
    where
        D: StationDirectory + ?Sized,
    {
        let id = candidate.id();
        self.observer.station_started(&id);

        let mut progress = Progress {
            stage: Stage::ResolveStation,
            station: None,
            satellites_total: 0,
            satellites_failed: 0,
        };

        match self.try_process(candidate, directory, sampled, geofence, &mut progress) {
            Ok(result) => result,
            Err(e) => {
                self.observer.stage_failed(&id, progress.stage, &e);
                ProcessingResult::failure(&id, progress, &e)
            },
        }
    }

    /*
     * Stage machine. "progress.stage" always describes the stage being
     * executed, so it points to the failing stage on error.
     */
    fn try_process<D>(
        &self,
        candidate: &Candidate,
        directory: &D,
        sampled: &SampledEphemeris,
        geofence: &Geofence,
        progress: &mut Progress,
    ) -> Result<ProcessingResult, Error>
    where
        D: StationDirectory + ?Sized,
    {
        let id = candidate.id();

        // ResolveStation
        let station = match candidate {
            Candidate::Code(code) => self.resolve(directory, code)?,
            Candidate::Resolved(station) => station.clone(),
        };
        progress.station = Some(station.clone());
        self.advance(&id, &mut progress.stage);

        // ValidateCoordinates
        station.validate()?;
        self.advance(&id, &mut progress.stage);

        // ComputeAngles
        progress.satellites_total = sampled.len();
        let rx = station_ecef(station.latitude, station.longitude, station.height);
        let angles = sampled
            .series
            .iter()
            .map(|series| {
                (
                    series.sv,
                    elevation_azimuth_series(
                        rx,
                        &sampled.epochs,
                        &series.positions(),
                        self.cfg.earth_radius_m,
                    ),
                )
            })
            .collect::<Vec<_>>();
        self.advance(&id, &mut progress.stage);

        // ComputeSips
        let products = self.pierce_points(&station, sampled, angles);
        progress.satellites_failed = products.failed;
        if products.sips.is_empty() {
            if let Some(sv) = products.first_failure {
                return Err(Error::Computation(sv));
            }
        }
        self.advance(&id, &mut progress.stage);

        // FilterByPolygon
        let segments = filter_trajectory(&products.sips, geofence);
        self.advance(&id, &mut progress.stage);

        // Aggregate
        let mut trajectory_points = Vec::new();
        for segment in segments.iter() {
            let angles = products
                .angles
                .get(&segment.sv)
                .ok_or(Error::Computation(segment.sv))?;
            for point in segment.points.iter() {
                let elaz = angles.get(point.index).ok_or(Error::Computation(segment.sv))?;
                trajectory_points.push(OutputPoint {
                    satellite: segment.sv,
                    latitude: point.latitude,
                    longitude: point.longitude,
                    epoch: point.epoch,
                    elevation: elaz.elevation.to_degrees(),
                    azimuth: elaz.azimuth.to_degrees(),
                    station: station.id.clone(),
                    station_name: station.name.clone(),
                    station_lat: station.latitude,
                    station_lon: station.longitude,
                });
            }
        }
        self.advance(&id, &mut progress.stage);

        Ok(ProcessingResult {
            station_id: id,
            station: Some(station),
            stage: progress.stage,
            failed_stage: None,
            satellites_total: sampled.len(),
            satellites_with_intersections: segments.len(),
            satellites_failed: products.failed,
            intersection_points: trajectory_points.len(),
            trajectory_points,
            error: None,
        })
    }

    /*
     * Projects all angles onto the ionosphere shell.
     * A satellite for which no valid sample could be projected is
     * dropped (numerical failure).
     */
    fn pierce_points(
        &self,
        station: &GroundStation,
        sampled: &SampledEphemeris,
        angles: Vec<(SV, Vec<ElevationAzimuth>)>,
    ) -> Products {
        let mut products = Products {
            angles: HashMap::with_capacity(angles.len()),
            sips: Vec::with_capacity(angles.len()),
            failed: 0,
            first_failure: None,
        };

        for ((sv, elaz), series) in angles.into_iter().zip(sampled.series.iter()) {
            let sips = sub_ionospheric_series(
                station.latitude,
                station.longitude,
                &elaz,
                self.cfg.shell_height_m,
                self.cfg.earth_radius_m,
            );
            let projected = sips
                .iter()
                .zip(series.samples.iter())
                .any(|(sip, sample)| sample.is_valid() && sip.is_finite());

            if projected {
                products.angles.insert(sv, elaz);
                products.sips.push((sv, sips));
            } else {
                self.observer.satellite_excluded(sv, &Exclusion::Computation);
                products.failed += 1;
                products.first_failure.get_or_insert(sv);
            }
        }
        products
    }

    fn advance(&self, id: &str, stage: &mut Stage) {
        self.observer.stage_completed(id, *stage);
        *stage = stage.next();
    }
}
