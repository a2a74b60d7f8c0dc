//! Physical constants and processing defaults

use gnss::prelude::{Constellation, SV};

/// Spherical Earth radius used by every angular computation, in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_000.0;

/// Thin shell ionosphere altitude, in meters.
pub const IONOSPHERE_HEIGHT_M: f64 = 300_000.0;

/// Flattening used when building a station ECEF position from its
/// geodetic coordinates. Only applied there: the angular geometry
/// stays spherical.
pub const STATION_FLATTENING: f64 = 0.003353;

/// Default sampling interval, in seconds
pub const SAMPLING_INTERVAL_S: f64 = 30.0;

/// A satellite is retained when strictly more than this fraction
/// of its samples are valid.
pub const MIN_VALID_RATIO: f64 = 0.10;

/// Below this many retained satellites, the run is flagged as degraded.
pub const MIN_SATELLITES_WARNING: usize = 4;

/// Transport timeout for bulk ephemeris retrieval, in seconds.
pub const EPHEMERIS_TIMEOUT_S: f64 = 30.0;

/// Transport timeout for a single station lookup, in seconds.
pub const STATION_LOOKUP_TIMEOUT_S: f64 = 10.0;

/// Number of vehicles per constellation in the default catalog
const CATALOG: [(Constellation, u8); 4] = [
    (Constellation::GPS, 32),
    (Constellation::Glonass, 24),
    (Constellation::Galileo, 36),
    (Constellation::BeiDou, 40),
];

/// Default satellite catalog: G01-G32, R01-R24, E01-E36, C01-C40,
/// in that order.
pub fn satellite_catalog() -> Vec<SV> {
    CATALOG
        .iter()
        .flat_map(|(constellation, count)| (1..=*count).map(|prn| SV::new(*constellation, prn)))
        .collect()
}
