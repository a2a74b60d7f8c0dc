//! Run configuration
use gnss::prelude::SV;
use hifitime::Duration;

use crate::{
    constants::{
        satellite_catalog, EARTH_RADIUS_M, IONOSPHERE_HEIGHT_M, MIN_VALID_RATIO,
        SAMPLING_INTERVAL_S,
    },
    sampler::PositionSampler,
};

#[cfg(feature = "serde")]
use serde::Deserialize;

fn default_earth_radius() -> f64 {
    EARTH_RADIUS_M
}

fn default_shell_height() -> f64 {
    IONOSPHERE_HEIGHT_M
}

fn default_sampling_interval() -> Duration {
    Duration::from_seconds(SAMPLING_INTERVAL_S)
}

fn default_min_valid_ratio() -> f64 {
    MIN_VALID_RATIO
}

fn default_satellites() -> Vec<SV> {
    satellite_catalog()
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Spherical Earth radius (m)
    #[cfg_attr(feature = "serde", serde(default = "default_earth_radius"))]
    pub earth_radius_m: f64,
    /// Thin shell ionosphere altitude (m)
    #[cfg_attr(feature = "serde", serde(default = "default_shell_height"))]
    pub shell_height_m: f64,
    /// Ephemeris sampling interval, expressed in seconds
    /// when deserialized.
    #[cfg_attr(
        feature = "serde",
        serde(
            default = "default_sampling_interval",
            deserialize_with = "crate::serdes::seconds"
        )
    )]
    pub sampling_interval: Duration,
    /// A satellite is retained when strictly more than
    /// this fraction of its samples are valid.
    #[cfg_attr(feature = "serde", serde(default = "default_min_valid_ratio"))]
    pub min_valid_ratio: f64,
    /// Satellites to consider, "G01" notation when deserialized.
    #[cfg_attr(
        feature = "serde",
        serde(default = "default_satellites", deserialize_with = "crate::serdes::sv_list")
    )]
    pub satellites: Vec<SV>,
    /// Maximal number of stations to examine in discovery mode.
    /// The directory listing is then strided evenly. 0 means no limit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub discovery_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            earth_radius_m: default_earth_radius(),
            shell_height_m: default_shell_height(),
            sampling_interval: default_sampling_interval(),
            min_valid_ratio: default_min_valid_ratio(),
            satellites: default_satellites(),
            discovery_limit: None,
        }
    }
}

impl Config {
    /// Copies and returns Self with updated satellites
    pub fn with_satellites(&self, satellites: &[SV]) -> Self {
        let mut s = self.clone();
        s.satellites = satellites.to_vec();
        s
    }
    /// Copies and returns Self with updated shell height (m)
    pub fn with_shell_height(&self, height_m: f64) -> Self {
        let mut s = self.clone();
        s.shell_height_m = height_m;
        s
    }
    /// Copies and returns Self with updated sampling interval
    pub fn with_sampling_interval(&self, interval: Duration) -> Self {
        let mut s = self.clone();
        s.sampling_interval = interval;
        s
    }
    /// Copies and returns Self with a discovery limit
    pub fn with_discovery_limit(&self, limit: usize) -> Self {
        let mut s = self.clone();
        s.discovery_limit = Some(limit);
        s
    }
    /// [PositionSampler] defined by Self
    pub fn sampler(&self) -> PositionSampler {
        PositionSampler::new(self.sampling_interval, self.min_valid_ratio)
    }
}
