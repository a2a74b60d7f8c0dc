//! Satellite position capability
use std::collections::BTreeMap;

use gnss::prelude::SV;
use hifitime::{Duration, Epoch};
use itertools::Itertools;

use crate::{prelude::Error, Vector3D};

/// Satellite ECEF position provider. Orbit determination happens elsewhere:
/// implementors only need to answer `position()` for any [SV] and any instant
/// within one calendar day.
pub trait EphemerisSource {
    /// Returns ECEF position (m) of `sv` at `t`.
    /// `Ok(None)` (absent) is a normal outcome, not an error.
    fn position(&self, sv: SV, t: Epoch) -> Result<Option<Vector3D>, Error>;
}

impl<T: EphemerisSource + ?Sized> EphemerisSource for &T {
    fn position(&self, sv: SV, t: Epoch) -> Result<Option<Vector3D>, Error> {
        (**self).position(sv, t)
    }
}

impl<T: EphemerisSource + ?Sized> EphemerisSource for Box<T> {
    fn position(&self, sv: SV, t: Epoch) -> Result<Option<Vector3D>, Error> {
        (**self).position(sv, t)
    }
}

/// One sampled position. Missing data is described by the null vector,
/// which is distinct from a missing time index.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EphemerisSample {
    pub sv: SV,
    pub epoch: Epoch,
    /// ECEF position (m), null when absent
    pub position: Vector3D,
}

impl EphemerisSample {
    /// Builds an absent sample
    pub fn absent(sv: SV, epoch: Epoch) -> Self {
        Self {
            sv,
            epoch,
            position: (0.0, 0.0, 0.0),
        }
    }
    /// True unless this is the null vector sentinel
    pub fn is_valid(&self) -> bool {
        let (x, y, z) = self.position;
        x != 0.0 || y != 0.0 || z != 0.0
    }
}

/// Default interpolation order of [TabulatedEphemeris]
pub const DEFAULT_INTERPOLATION_ORDER: usize = 9;

/// Tabulated ECEF positions (precise orbit products, decoded broadcast
/// orbits..), interpolated in between tabulation instants.
#[derive(Debug, Clone)]
pub struct TabulatedEphemeris {
    order: usize,
    data: BTreeMap<SV, Vec<(Epoch, Vector3D)>>,
}

impl Default for TabulatedEphemeris {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPOLATION_ORDER)
    }
}

impl TabulatedEphemeris {
    /// Builds an empty table, using odd `order` Lagrange interpolation.
    /// Even orders are rounded up to the next odd value.
    pub fn new(order: usize) -> Self {
        let order = if order % 2 == 0 { order + 1 } else { order };
        Self {
            order,
            data: Default::default(),
        }
    }
    /// Interpolation order
    pub fn order(&self) -> usize {
        self.order
    }
    /// Inserts a new position (ECEF, m) for `sv` at `t`.
    pub fn insert(&mut self, sv: SV, t: Epoch, position: Vector3D) {
        let series = self.data.entry(sv).or_default();
        match series.binary_search_by(|(e, _)| e.cmp(&t)) {
            Ok(index) => series[index] = (t, position),
            Err(index) => series.insert(index, (t, position)),
        }
    }
    /// Copies and returns Self with one more position
    pub fn with_position(&self, sv: SV, t: Epoch, position: Vector3D) -> Self {
        let mut s = self.clone();
        s.insert(sv, t, position);
        s
    }
    /// Returns an iterator over tabulated vehicles
    pub fn sv(&self) -> impl Iterator<Item = SV> + '_ {
        self.data.keys().copied()
    }
    /// Total number of tabulated positions
    pub fn len(&self) -> usize {
        self.data.values().map(|series| series.len()).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    /*
     * Tabulation interval: smallest spacing between two samples
     */
    fn interval(series: &[(Epoch, Vector3D)]) -> Option<Duration> {
        series
            .iter()
            .tuple_windows()
            .map(|((t0, _), (t1, _))| *t1 - *t0)
            .min()
    }
    /// Interpolates the position of `sv` at `t`, over `order + 1` samples
    /// centered on `t`. None when no sample lies within one tabulation interval
    /// of `t`, or when the interpolation window would exceed the table.
    pub fn interpolate(&self, sv: SV, t: Epoch) -> Option<Vector3D> {
        let series = self.data.get(&sv)?;
        if let Ok(index) = series.binary_search_by(|(e, _)| e.cmp(&t)) {
            return Some(series[index].1);
        }
        let interval = Self::interval(series)?;

        let center = series.iter().position(|(e, _)| (*e - t).abs() < interval)?;

        let half = (self.order + 1) / 2;
        if center < half || series.len() - center < half + 1 {
            /* can't design time window */
            return None;
        }

        let offset = center - half;
        let mut polynomials = Vector3D::default();

        for i in 0..self.order + 1 {
            let mut li = 1.0_f64;
            let (e_i, (x_i, y_i, z_i)) = series[offset + i];
            for j in 0..self.order + 1 {
                let (e_j, _) = series[offset + j];
                if j != i {
                    li *= (t - e_j).to_seconds();
                    li /= (e_i - e_j).to_seconds();
                }
            }
            polynomials.0 += x_i * li;
            polynomials.1 += y_i * li;
            polynomials.2 += z_i * li;
        }
        Some(polynomials)
    }
}

impl EphemerisSource for TabulatedEphemeris {
    fn position(&self, sv: SV, t: Epoch) -> Result<Option<Vector3D>, Error> {
        Ok(self.interpolate(sv, t))
    }
}
