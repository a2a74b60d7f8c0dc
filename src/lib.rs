#![doc(html_logo_url = "https://raw.githubusercontent.com/georust/meta/master/logo/logo.png")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::type_complexity)]

//! Sub-ionospheric point (SIP) trajectories of GNSS satellites.
//!
//! For one or several ground stations, this library samples the position
//! of every satellite over one calendar day, projects each line of sight
//! onto a thin ionospheric shell and only retains the pierce points that
//! fall within a user defined geofence (polygon or circle).
//!
//! ```
//! use gnss_sip::prelude::*;
//!
//! let polygon = Polygon::from_vertices(&[(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)]);
//! assert!(polygon.contains(0.0, 0.0));
//! assert!(!polygon.contains(5.0, 0.0));
//! ```

extern crate gnss_rs as gnss;

#[macro_use]
extern crate log;

pub mod aggregator;
pub mod cfg;
pub mod constants;
pub mod ephemeris;
pub mod error;
pub mod geometry;
pub mod mirror;
pub mod observer;
pub mod pipeline;
pub mod polygon;
pub mod radius;
pub mod sampler;
pub mod station;
pub mod time;

#[cfg(feature = "serde")]
mod serdes;

#[cfg(test)]
mod tests;

/// ECEF coordinates, in meters
pub type Vector3D = (f64, f64, f64);

/// Package to include all basic structures
pub mod prelude {
    pub use crate::{
        aggregator::{OutputPoint, ProcessedStation, ResultAggregator, RunMetadata, RunResult},
        cfg::Config,
        ephemeris::{EphemerisSample, EphemerisSource, TabulatedEphemeris},
        error::{Error, StationError},
        geometry::{ElevationAzimuth, SubIonosphericPoint},
        mirror::Mirrors,
        observer::{Exclusion, LogObserver, NullObserver, Observer},
        pipeline::{ProcessingResult, RunMode, Stage, StationProcessingPipeline},
        polygon::{Geofence, Polygon, TrajectoryPoint, TrajectorySegment, Vertex},
        radius::PointOfInterest,
        sampler::{PositionSampler, SampledEphemeris, SatelliteSeries},
        station::{GroundStation, StationDirectory, StationLocation, StationTable},
        time::TimeRange,
        Vector3D,
    };
    // pub re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale, Unit};
}
