//! Satellite position sampling over a uniform time grid
use gnss::prelude::SV;
use hifitime::{Duration, Epoch};

use crate::{
    constants::MIN_VALID_RATIO,
    ephemeris::{EphemerisSample, EphemerisSource},
    observer::{Exclusion, Observer},
    time::uniform_grid,
    Vector3D,
};

/// Sampled positions of one satellite, aligned on the shared grid
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteSeries {
    pub sv: SV,
    pub samples: Vec<EphemerisSample>,
    /// Fraction of valid (non null) samples
    pub valid_ratio: f64,
}

impl SatelliteSeries {
    /// ECEF positions (m), null vector when absent
    pub fn positions(&self) -> Vec<Vector3D> {
        self.samples.iter().map(|s| s.position).collect()
    }
}

/// Outcome of the sampling stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledEphemeris {
    /// Shared time grid
    pub epochs: Vec<Epoch>,
    /// Retained satellites, in requested order
    pub series: Vec<SatelliteSeries>,
    /// Satellites that did not pass the validity threshold,
    /// with their valid sample ratio
    pub excluded: Vec<(SV, f64)>,
}

impl SampledEphemeris {
    /// Number of retained satellites
    pub fn len(&self) -> usize {
        self.series.len()
    }
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Samples an [EphemerisSource] at fixed interval
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PositionSampler {
    /// Sampling interval
    pub interval: Duration,
    /// Satellites are retained when their valid sample ratio
    /// is strictly above this value.
    pub min_valid_ratio: f64,
}

impl Default for PositionSampler {
    fn default() -> Self {
        Self {
            interval: Duration::from_seconds(crate::constants::SAMPLING_INTERVAL_S),
            min_valid_ratio: MIN_VALID_RATIO,
        }
    }
}

impl PositionSampler {
    pub fn new(interval: Duration, min_valid_ratio: f64) -> Self {
        Self {
            interval,
            min_valid_ratio,
        }
    }
    /// Samples every satellite over [start, end]. Failures and absent
    /// positions are both stored as null sentinel: they never abort
    /// the series. Satellites with not enough valid samples are excluded,
    /// once and for all.
    pub fn sample<E: EphemerisSource + ?Sized>(
        &self,
        source: &E,
        satellites: &[SV],
        start: Epoch,
        end: Epoch,
        observer: &dyn Observer,
    ) -> SampledEphemeris {
        let mut sampled = SampledEphemeris {
            epochs: uniform_grid(start, end, self.interval),
            ..Default::default()
        };
        if sampled.epochs.is_empty() {
            observer.sampling_done(0, satellites.len());
            return sampled;
        }

        for sv in satellites {
            let samples: Vec<EphemerisSample> = sampled
                .epochs
                .iter()
                .map(|t| match source.position(*sv, *t) {
                    Ok(Some(position)) => EphemerisSample {
                        sv: *sv,
                        epoch: *t,
                        position,
                    },
                    _ => EphemerisSample::absent(*sv, *t),
                })
                .collect();

            let valid = samples.iter().filter(|s| s.is_valid()).count();
            let valid_ratio = valid as f64 / samples.len() as f64;

            if valid_ratio > self.min_valid_ratio {
                sampled.series.push(SatelliteSeries {
                    sv: *sv,
                    samples,
                    valid_ratio,
                });
            } else {
                observer.satellite_excluded(*sv, &Exclusion::DataQuality(valid_ratio));
                sampled.excluded.push((*sv, valid_ratio));
            }
        }
        observer.sampling_done(sampled.series.len(), satellites.len());
        sampled
    }
}
