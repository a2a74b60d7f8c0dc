//! Randomized invariants
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    constants::{EARTH_RADIUS_M, IONOSPHERE_HEIGHT_M},
    geometry::{great_circle_distance, sub_ionospheric_point},
    observer::NullObserver,
    prelude::*,
    tests::toolkit::{day, sv},
};

const SEED: u64 = 0x5150;

#[test]
fn sip_longitude_range() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..10_000 {
        let lat = rng.gen_range(-60.0..60.0);
        let lon = rng.gen_range(-180.0..=180.0);
        let elevation = rng.gen_range(0.0..std::f64::consts::FRAC_PI_2);
        let azimuth = rng.gen_range(0.0..std::f64::consts::TAU);

        let (sip_lat, sip_lon) = sub_ionospheric_point(
            lat,
            lon,
            elevation,
            azimuth,
            IONOSPHERE_HEIGHT_M,
            EARTH_RADIUS_M,
        );
        assert!(sip_lat.is_finite() && sip_lon.is_finite());
        assert!((-90.0..=90.0).contains(&sip_lat));
        assert!(sip_lon > -180.0 && sip_lon <= 180.0, "longitude {}", sip_lon);
    }
}

#[test]
fn winding_invariance() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let vertices = [(-10.0, -20.0), (15.0, -5.0), (5.0, 25.0), (-20.0, 10.0)];
    let cw = Polygon::from_vertices(&vertices);
    let ccw = Polygon::from_vertices(&vertices.iter().rev().copied().collect::<Vec<_>>());

    for _ in 0..10_000 {
        let lat = rng.gen_range(-30.0..30.0);
        let lon = rng.gen_range(-30.0..30.0);
        assert_eq!(cw.contains(lat, lon), ccw.contains(lat, lon));
    }
}

#[test]
fn distance_metric() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..10_000 {
        let (lat_a, lon_a) = (rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0));
        let (lat_b, lon_b) = (rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0));

        let d_aa = great_circle_distance(lat_a, lon_a, lat_a, lon_a, EARTH_RADIUS_M);
        // acos is ill conditioned around 1
        assert!(d_aa < 1.0, "d(A, A) = {}", d_aa);

        let d_ab = great_circle_distance(lat_a, lon_a, lat_b, lon_b, EARTH_RADIUS_M);
        let d_ba = great_circle_distance(lat_b, lon_b, lat_a, lon_a, EARTH_RADIUS_M);
        assert!((d_ab - d_ba).abs() < 1.0E-6);
        assert!(d_ab >= 0.0 && d_ab <= std::f64::consts::PI * EARTH_RADIUS_M + 1.0E-6);
    }
}

/*
 * Blanks a random subset of samples
 */
struct Flaky {
    ratio: f64,
    rng: std::cell::RefCell<StdRng>,
}

impl EphemerisSource for Flaky {
    fn position(&self, _: SV, _: Epoch) -> Result<Option<Vector3D>, Error> {
        if self.rng.borrow_mut().gen_bool(self.ratio) {
            Ok(Some((26_560_000.0, 0.0, 0.0)))
        } else {
            Ok(None)
        }
    }
}

#[test]
fn all_absent_satellite() {
    let range = day();
    let sampler = PositionSampler::default();

    let never = Flaky {
        ratio: 0.0,
        rng: std::cell::RefCell::new(StdRng::seed_from_u64(SEED)),
    };
    let sampled = sampler.sample(&never, &[sv("R07")], range.start, range.end, &NullObserver);
    assert!(sampled.is_empty());
    assert_eq!(sampled.excluded, vec![(sv("R07"), 0.0)]);

    let often = Flaky {
        ratio: 0.5,
        rng: std::cell::RefCell::new(StdRng::seed_from_u64(SEED)),
    };
    let sampled = sampler.sample(&often, &[sv("R07")], range.start, range.end, &NullObserver);
    assert_eq!(sampled.len(), 1);
    let ratio = sampled.series[0].valid_ratio;
    assert!(ratio > 0.4 && ratio < 0.6, "valid ratio {}", ratio);
}
