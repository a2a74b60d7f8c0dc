//! Spherical Earth geometry: ECEF conversions, topocentric angles,
//! ionospheric pierce points and great circle distances.
//!
//! Every function here is pure. Angular geometry relies on a spherical
//! Earth of radius [EARTH_RADIUS_M]; the only ellipsoidal formula is
//! [station_ecef], which builds the station position itself.
use hifitime::Epoch;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::{
    constants::{EARTH_RADIUS_M, STATION_FLATTENING},
    Vector3D,
};

/// Topocentric angles of one satellite, at one instant
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ElevationAzimuth {
    pub epoch: Epoch,
    /// Elevation above local horizon (radians). Not masked:
    /// may be negative.
    pub elevation: f64,
    /// Azimuth (radians) in [0, 2π[
    pub azimuth: f64,
}

/// Sub-ionospheric point: where the line of sight pierces the thin shell
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SubIonosphericPoint {
    pub epoch: Epoch,
    /// Latitude (decimal degrees)
    pub latitude: f64,
    /// Longitude (decimal degrees) in ]-180, 180]
    pub longitude: f64,
}

impl SubIonosphericPoint {
    /// False when the projection went singular (absent sample, polar station..)
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Spherical approximation of the geodetic coordinates of (x, y, z),
/// returned as (latitude (rad), longitude (rad), height above the sphere (m)).
/// Only meant for angular geometry: height is not a true geodetic height.
pub fn ecef_to_geodetic_approx(x: f64, y: f64, z: f64, earth_radius: f64) -> Vector3D {
    let r = (x.powi(2) + y.powi(2) + z.powi(2)).sqrt();
    let lon = y.atan2(x);
    let lat = (z / r).asin();
    (lat, lon, r - earth_radius)
}

/// Station ECEF position (m), from decimal degrees and height (m).
///
/// This one applies a flattening correction, which is inconsistent with
/// the spherical model used everywhere else. Both are kept as is:
/// unifying them would change the numerical output.
pub fn station_ecef(latitude: f64, longitude: f64, height: f64) -> Vector3D {
    let f = STATION_FLATTENING;
    let e2 = 2.0 * f - f.powi(2);
    let (lat, lon) = (latitude.to_radians(), longitude.to_radians());
    let n = EARTH_RADIUS_M / (1.0 - e2 * lat.sin().powi(2)).sqrt();
    (
        (n + height) * lat.cos() * lon.cos(),
        (n + height) * lat.cos() * lon.sin(),
        (n * (1.0 - f.powi(2)) + height) * lat.sin(),
    )
}

/// Elevation and azimuth (radians) of a satellite at `sv` (ECEF, m)
/// seen from a station at `rx` (ECEF, m).
/// A satellite at the zenith has σ = 0 and elevation = π/2.
pub fn elevation_azimuth(rx: Vector3D, sv: Vector3D, earth_radius: f64) -> (f64, f64) {
    let (x_0, y_0, z_0) = rx;
    let (x_s, y_s, z_s) = sv;

    let (b_0, l_0, _) = ecef_to_geodetic_approx(x_0, y_0, z_0, earth_radius);
    let (b_s, l_s, _) = ecef_to_geodetic_approx(x_s, y_s, z_s, earth_radius);
    let r_k = (x_s.powi(2) + y_s.powi(2) + z_s.powi(2)).sqrt();

    // angular separation between both sub points
    let cos_sigma = b_0.sin() * b_s.sin() + b_0.cos() * b_s.cos() * (l_s - l_0).cos();
    let sigma = (1.0 - cos_sigma.powi(2)).max(0.0).sqrt().atan2(cos_sigma);

    let (dx, dy, dz) = (x_s - x_0, y_s - y_0, z_s - z_0);
    let x_t = -dx * l_0.sin() + dy * l_0.cos();
    let y_t = -dx * l_0.cos() * b_0.sin() - dy * l_0.sin() * b_0.sin() + dz * b_0.cos();

    let elevation = (sigma.cos() - earth_radius / r_k).atan2(sigma.sin());
    let mut azimuth = x_t.atan2(y_t);
    if azimuth < 0.0 {
        azimuth += TAU;
    }
    (elevation, azimuth)
}

/// [elevation_azimuth] over a complete time series.
/// Output is aligned with (and as long as) `epochs` and `positions`.
pub fn elevation_azimuth_series(
    rx: Vector3D,
    epochs: &[Epoch],
    positions: &[Vector3D],
    earth_radius: f64,
) -> Vec<ElevationAzimuth> {
    epochs
        .iter()
        .zip(positions.iter())
        .map(|(epoch, sv)| {
            let (elevation, azimuth) = elevation_azimuth(rx, *sv, earth_radius);
            ElevationAzimuth {
                epoch: *epoch,
                elevation,
                azimuth,
            }
        })
        .collect()
}

/// Wraps a longitude (radians) into ]-π, π]
pub fn wrap_longitude(lon: f64) -> f64 {
    if !lon.is_finite() {
        return lon;
    }
    let mut lon = lon % TAU;
    if lon > PI {
        lon -= TAU;
    } else if lon <= -PI {
        lon += TAU;
    }
    lon
}

/// Thin shell projection of a line of sight, seen from a station at
/// (`latitude`, `longitude`) in decimal degrees, with `elevation` and `azimuth`
/// in radians. Returns the pierce point (latitude, longitude) in decimal degrees,
/// longitude in ]-180, 180].
///
/// Singular for a polar station (cos(latitude) = 0): this is not handled.
pub fn sub_ionospheric_point(
    latitude: f64,
    longitude: f64,
    elevation: f64,
    azimuth: f64,
    shell_height: f64,
    earth_radius: f64,
) -> (f64, f64) {
    let (lat, lon) = (latitude.to_radians(), longitude.to_radians());
    let psi = (FRAC_PI_2 - elevation)
        - (elevation.cos() * earth_radius / (earth_radius + shell_height)).asin();
    let sip_lat = (lat.sin() * psi.cos() + lat.cos() * psi.sin() * azimuth.cos()).asin();
    let sip_lon = lon + (psi.sin() * azimuth.sin() / lat.cos()).asin();
    (sip_lat.to_degrees(), wrap_longitude(sip_lon).to_degrees())
}

/// [sub_ionospheric_point] over a complete angle series, aligned with it.
pub fn sub_ionospheric_series(
    latitude: f64,
    longitude: f64,
    angles: &[ElevationAzimuth],
    shell_height: f64,
    earth_radius: f64,
) -> Vec<SubIonosphericPoint> {
    angles
        .iter()
        .map(|elaz| {
            let (lat, lon) = sub_ionospheric_point(
                latitude,
                longitude,
                elaz.elevation,
                elaz.azimuth,
                shell_height,
                earth_radius,
            );
            SubIonosphericPoint {
                epoch: elaz.epoch,
                latitude: lat,
                longitude: lon,
            }
        })
        .collect()
}

/// Great circle distance (m) between A and B, expressed in decimal degrees,
/// on a sphere of given radius (m). The longitude difference is wrapped
/// into [-π, π] prior applying the spherical law of cosines.
pub fn great_circle_distance(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64, radius: f64) -> f64 {
    let (lat_a, lat_b) = (lat_a.to_radians(), lat_b.to_radians());
    let mut dlon = lon_b.to_radians() - lon_a.to_radians();
    if dlon > PI {
        dlon -= TAU;
    } else if dlon < -PI {
        dlon += TAU;
    }
    let cos_gamma = lat_a.sin() * lat_b.sin() + lat_a.cos() * lat_b.cos() * dlon.cos();
    radius * cos_gamma.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::IONOSPHERE_HEIGHT_M;

    const GPS_ORBIT_RADIUS_M: f64 = 26_560_000.0;

    #[test]
    fn geodetic_approx() {
        let (lat, lon, h) = ecef_to_geodetic_approx(EARTH_RADIUS_M, 0.0, 0.0, EARTH_RADIUS_M);
        assert_eq!((lat, lon, h), (0.0, 0.0, 0.0));

        let (lat, lon, h) = ecef_to_geodetic_approx(0.0, 0.0, 2.0 * EARTH_RADIUS_M, EARTH_RADIUS_M);
        assert!((lat - FRAC_PI_2).abs() < 1.0E-12);
        assert_eq!(lon, 0.0);
        assert!((h - EARTH_RADIUS_M).abs() < 1.0E-6);

        let (_, lon, _) = ecef_to_geodetic_approx(0.0, 1.0E7, 0.0, EARTH_RADIUS_M);
        assert!((lon - FRAC_PI_2).abs() < 1.0E-12);
    }

    #[test]
    fn station_ecef_ellipsoidal() {
        let (x, y, z) = station_ecef(0.0, 0.0, 0.0);
        assert!((x - EARTH_RADIUS_M).abs() < 1.0E-6);
        assert!(y.abs() < 1.0E-6);
        assert!(z.abs() < 1.0E-6);

        let (x, y, z) = station_ecef(0.0, 90.0, 100.0);
        assert!(x.abs() < 1.0E-6);
        assert!((y - EARTH_RADIUS_M - 100.0).abs() < 1.0E-6);
        assert!(z.abs() < 1.0E-6);

        // polar radius is not the spherical one
        let (_, _, z) = station_ecef(90.0, 0.0, 0.0);
        assert!(z > EARTH_RADIUS_M);
    }

    #[test]
    fn zenith() {
        let rx = station_ecef(0.0, 0.0, 0.0);
        let (elev, azim) =
            elevation_azimuth(rx, (GPS_ORBIT_RADIUS_M, 0.0, 0.0), EARTH_RADIUS_M);
        assert!((elev - FRAC_PI_2).abs() < 1.0E-9, "elevation: {}", elev);
        assert!((0.0..TAU).contains(&azim));

        let rx = station_ecef(45.0, 45.0, 0.0);
        let (lat, lon) = (45.0_f64.to_radians(), 45.0_f64.to_radians());
        let sv = (
            GPS_ORBIT_RADIUS_M * lat.cos() * lon.cos(),
            GPS_ORBIT_RADIUS_M * lat.cos() * lon.sin(),
            GPS_ORBIT_RADIUS_M * lat.sin(),
        );
        // station latitude is ellipsoidal, the satellite's is not
        let (elev, _) = elevation_azimuth(rx, sv, EARTH_RADIUS_M);
        assert!((elev - FRAC_PI_2).abs() < 1.0E-4, "elevation: {}", elev);
    }

    #[test]
    fn cardinal_azimuths() {
        let rx = station_ecef(0.0, 0.0, 0.0);
        for (sv, expected) in [
            // north of the station
            ((GPS_ORBIT_RADIUS_M * 0.9, 0.0, GPS_ORBIT_RADIUS_M * 0.2), 0.0),
            // east
            ((GPS_ORBIT_RADIUS_M * 0.9, GPS_ORBIT_RADIUS_M * 0.2, 0.0), FRAC_PI_2),
            // south
            ((GPS_ORBIT_RADIUS_M * 0.9, 0.0, -GPS_ORBIT_RADIUS_M * 0.2), PI),
            // west
            ((GPS_ORBIT_RADIUS_M * 0.9, -GPS_ORBIT_RADIUS_M * 0.2, 0.0), 3.0 * FRAC_PI_2),
        ] {
            let (elev, azim) = elevation_azimuth(rx, sv, EARTH_RADIUS_M);
            assert!(elev > 0.0 && elev < FRAC_PI_2);
            assert!((azim - expected).abs() < 1.0E-9, "azimuth {} != {}", azim, expected);
        }
    }

    #[test]
    fn below_horizon_is_not_masked() {
        let rx = station_ecef(0.0, 0.0, 0.0);
        // opposite side of the Earth
        let (elev, _) = elevation_azimuth(rx, (-GPS_ORBIT_RADIUS_M, 1.0, 0.0), EARTH_RADIUS_M);
        assert!(elev < 0.0);
    }

    #[test]
    fn zenith_sip_is_station() {
        for (lat, lon) in [(0.0, 0.0), (45.0, 45.0), (-33.0, 151.0), (60.0, -179.5)] {
            let (sip_lat, sip_lon) = sub_ionospheric_point(
                lat,
                lon,
                FRAC_PI_2,
                0.0,
                IONOSPHERE_HEIGHT_M,
                EARTH_RADIUS_M,
            );
            assert!((sip_lat - lat).abs() < 1.0E-9);
            assert!((sip_lon - lon).abs() < 1.0E-9);
        }
    }

    #[test]
    fn sip_moves_toward_azimuth() {
        let el = 30.0_f64.to_radians();
        let (lat, lon) =
            sub_ionospheric_point(10.0, 20.0, el, 0.0, IONOSPHERE_HEIGHT_M, EARTH_RADIUS_M);
        assert!(lat > 10.0);
        assert!((lon - 20.0).abs() < 1.0E-9);

        let (lat, lon) =
            sub_ionospheric_point(10.0, 20.0, el, FRAC_PI_2, IONOSPHERE_HEIGHT_M, EARTH_RADIUS_M);
        assert!(lon > 20.0);
        assert!(lat < 10.0 + 1.0E-6);
    }

    #[test]
    fn sip_wraps_antimeridian() {
        let el = 20.0_f64.to_radians();
        let (_, lon) =
            sub_ionospheric_point(0.0, 179.9, el, FRAC_PI_2, IONOSPHERE_HEIGHT_M, EARTH_RADIUS_M);
        assert!(lon < 0.0 && lon > -180.0, "longitude: {}", lon);
        let (_, lon) = sub_ionospheric_point(
            0.0,
            -179.9,
            el,
            3.0 * FRAC_PI_2,
            IONOSPHERE_HEIGHT_M,
            EARTH_RADIUS_M,
        );
        assert!(lon > 0.0 && lon <= 180.0, "longitude: {}", lon);
    }

    #[test]
    fn longitude_wrapping() {
        assert_eq!(wrap_longitude(0.0), 0.0);
        assert_eq!(wrap_longitude(PI), PI);
        assert!((wrap_longitude(-PI) - PI).abs() < 1.0E-12);
        assert!((wrap_longitude(PI + 0.5) - (-PI + 0.5)).abs() < 1.0E-12);
        assert!((wrap_longitude(-PI - 0.5) - (PI - 0.5)).abs() < 1.0E-12);
        assert!(wrap_longitude(f64::NAN).is_nan());
    }

    #[test]
    fn great_circle() {
        let quarter = great_circle_distance(0.0, 0.0, 0.0, 90.0, EARTH_RADIUS_M);
        assert!((quarter - EARTH_RADIUS_M * FRAC_PI_2).abs() < 1.0E-3);

        let half = great_circle_distance(90.0, 0.0, -90.0, 0.0, EARTH_RADIUS_M);
        assert!((half - EARTH_RADIUS_M * PI).abs() < 1.0E-3);

        // across the antimeridian
        let short = great_circle_distance(0.0, 179.0, 0.0, -179.0, EARTH_RADIUS_M);
        assert!((short - EARTH_RADIUS_M * 2.0_f64.to_radians()).abs() < 1.0E-3);
    }
}
