use gnss::prelude::SV;
use thiserror::Error;

/// Station related errors. Any of these excludes one station
/// from the run, never the run itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StationError {
    #[error("unknown station {0}")]
    UnknownStation(String),
    #[error("station {0}: missing coordinates")]
    MissingCoordinates(String),
    #[error("invalid latitude {0}°")]
    InvalidLatitude(f64),
    #[error("invalid longitude {0}°")]
    InvalidLongitude(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A remote collaborator failed to answer
    #[error("network error: {0}")]
    Network(String),
    /// Every mirror of an ordered list failed
    #[error("all {0} mirrors failed")]
    MirrorsExhausted(usize),
    /// Not enough valid samples for this satellite
    #[error("{sv}: valid sample ratio {ratio:.3} below threshold")]
    DataQuality { sv: SV, ratio: f64 },
    #[error("station data error: {0}")]
    StationData(#[from] StationError),
    /// Angle or SIP determination went numerically wrong
    #[error("{0}: numerical failure")]
    Computation(SV),
    #[error("no usable ephemeris for any satellite")]
    NoUsableEphemeris,
    #[error("no station found inside the geofence")]
    NoCandidateStation,
    #[error("invalid calendar date")]
    InvalidDate,
}
