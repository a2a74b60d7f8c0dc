//! Geofencing: point in polygon test and trajectory filtering
use gnss::prelude::SV;
use hifitime::Epoch;

use crate::{geometry::great_circle_distance, geometry::SubIonosphericPoint};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Polygon vertex, in decimal degrees
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    pub latitude: f64,
    pub longitude: f64,
}

/// Geographic polygon, as an ordered list of [Vertex].
/// Winding does not matter. Less than 3 vertices describe
/// a degenerate polygon which contains nothing.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polygon {
    pub vertices: Vec<Vertex>,
}

impl Polygon {
    /// Builds a [Polygon] from (latitude, longitude) pairs, in decimal degrees
    pub fn from_vertices(vertices: &[(f64, f64)]) -> Self {
        Self {
            vertices: vertices
                .iter()
                .map(|(latitude, longitude)| Vertex {
                    latitude: *latitude,
                    longitude: *longitude,
                })
                .collect(),
        }
    }
    /// Number of vertices
    pub fn len(&self) -> usize {
        self.vertices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
    /// True if at least 3 vertices are defined
    pub fn is_usable(&self) -> bool {
        self.vertices.len() >= 3
    }
    /// Ray casting (parity) point in polygon test, in (longitude, latitude) space.
    /// Points lying exactly on an edge or vertex may go either way.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let (x, y) = (longitude, latitude);
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (self.vertices[i].longitude, self.vertices[i].latitude);
            let (xj, yj) = (self.vertices[j].longitude, self.vertices[j].latitude);
            if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Area of interest
#[derive(Debug, Clone, PartialEq)]
pub enum Geofence {
    /// Geographic polygon
    Polygon(Polygon),
    /// Disk on the Earth surface: points strictly closer than `radius_m`
    /// (great circle distance) from the center are inside.
    Circle {
        latitude: f64,
        longitude: f64,
        radius_m: f64,
        /// Sphere radius the distance is evaluated on
        earth_radius_m: f64,
    },
}

impl From<Polygon> for Geofence {
    fn from(polygon: Polygon) -> Self {
        Self::Polygon(polygon)
    }
}

impl Geofence {
    /// True if (latitude, longitude) lies within Self.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        match self {
            Self::Polygon(polygon) => polygon.contains(latitude, longitude),
            Self::Circle {
                latitude: lat_c,
                longitude: lon_c,
                radius_m,
                earth_radius_m,
            } => {
                great_circle_distance(*lat_c, *lon_c, latitude, longitude, *earth_radius_m)
                    < *radius_m
            },
        }
    }
    /// Number of vertices describing Self (0 for a circle)
    pub fn vertices_count(&self) -> usize {
        match self {
            Self::Polygon(polygon) => polygon.len(),
            Self::Circle { .. } => 0,
        }
    }
    /// False for a degenerate polygon
    pub fn is_usable(&self) -> bool {
        match self {
            Self::Polygon(polygon) => polygon.is_usable(),
            Self::Circle { radius_m, .. } => *radius_m > 0.0,
        }
    }
}

/// One retained pierce point
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrajectoryPoint {
    pub epoch: Epoch,
    pub latitude: f64,
    pub longitude: f64,
    /// Index in the sampling grid, to recover other quantities
    /// sampled at the same instant.
    pub index: usize,
}

/// Retained pierce points of one satellite. Points are tested independently:
/// they are not necessarily contiguous in time.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySegment {
    pub sv: SV,
    pub points: Vec<TrajectoryPoint>,
}

impl TrajectorySegment {
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Retains the pierce points of each satellite that fall within `geofence`.
/// Satellites with no retained point are dropped, order is preserved.
/// This is a per point filter: no interpolation at the boundary.
pub fn filter_trajectory(
    sips: &[(SV, Vec<SubIonosphericPoint>)],
    geofence: &Geofence,
) -> Vec<TrajectorySegment> {
    if !geofence.is_usable() {
        return Vec::new();
    }
    sips.iter()
        .filter_map(|(sv, series)| {
            let points = series
                .iter()
                .enumerate()
                .filter(|(_, sip)| sip.is_finite() && geofence.contains(sip.latitude, sip.longitude))
                .map(|(index, sip)| TrajectoryPoint {
                    epoch: sip.epoch,
                    latitude: sip.latitude,
                    longitude: sip.longitude,
                    index,
                })
                .collect::<Vec<_>>();
            if points.is_empty() {
                None
            } else {
                Some(TrajectorySegment { sv: *sv, points })
            }
        })
        .collect()
}

/// [filter_trajectory] restricted to a [Polygon].
pub fn filter_trajectory_by_polygon(
    sips: &[(SV, Vec<SubIonosphericPoint>)],
    polygon: &Polygon,
) -> Vec<TrajectorySegment> {
    filter_trajectory(sips, &Geofence::Polygon(polygon.clone()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::EARTH_RADIUS_M;

    fn square() -> Polygon {
        Polygon::from_vertices(&[(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)])
    }

    #[test]
    fn square_containment() {
        let polygon = square();
        assert!(polygon.is_usable());
        assert!(polygon.contains(0.0, 0.0));
        assert!(polygon.contains(0.5, -0.5));
        assert!(!polygon.contains(2.0, 0.0));
        assert!(!polygon.contains(0.0, -1.5));
        assert!(!polygon.contains(f64::NAN, 0.0));
    }

    #[test]
    fn concave() {
        // U shape, opened to the north
        let polygon = Polygon::from_vertices(&[
            (0.0, 0.0),
            (0.0, 3.0),
            (3.0, 3.0),
            (3.0, 2.0),
            (1.0, 2.0),
            (1.0, 1.0),
            (3.0, 1.0),
            (3.0, 0.0),
        ]);
        assert!(polygon.contains(0.5, 1.5));
        assert!(polygon.contains(2.0, 0.5));
        assert!(polygon.contains(2.0, 2.5));
        assert!(!polygon.contains(2.0, 1.5));
    }

    #[test]
    fn degenerate() {
        let polygon = Polygon::from_vertices(&[(-1.0, -1.0), (1.0, 1.0)]);
        assert!(!polygon.is_usable());
        assert!(!polygon.contains(0.0, 0.0));
        assert!(!Polygon::default().contains(0.0, 0.0));
    }

    #[test]
    fn circle() {
        let circle = Geofence::Circle {
            latitude: 0.0,
            longitude: 0.0,
            radius_m: 200.0E3,
            earth_radius_m: EARTH_RADIUS_M,
        };
        assert!(circle.is_usable());
        assert!(circle.contains(0.0, 0.0));
        assert!(circle.contains(1.0, 1.0));
        assert!(!circle.contains(2.0, 0.0));
        assert_eq!(circle.vertices_count(), 0);
    }
}
