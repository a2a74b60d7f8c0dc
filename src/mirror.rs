//! Ordered mirror fallback.
//!
//! Mirrors are tried in sequence, first to last. A mirror that fails
//! (or does not know the requested item) hands over to the next one.
//! There is no backoff and no retry beyond the list itself.
use gnss::prelude::SV;
use hifitime::Epoch;

use crate::{
    ephemeris::EphemerisSource,
    prelude::Error,
    station::{StationDirectory, StationLocation},
    Vector3D,
};

/// Ordered list of equivalent collaborators
#[derive(Debug, Clone)]
pub struct Mirrors<T> {
    mirrors: Vec<T>,
}

impl<T> Default for Mirrors<T> {
    fn default() -> Self {
        Self {
            mirrors: Vec::new(),
        }
    }
}

impl<T> Mirrors<T> {
    pub fn new(mirrors: Vec<T>) -> Self {
        Self { mirrors }
    }
    /// Returns Self with one more (last resort) mirror
    pub fn with_mirror(mut self, mirror: T) -> Self {
        self.mirrors.push(mirror);
        self
    }
    pub fn len(&self) -> usize {
        self.mirrors.len()
    }
    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }
    /*
     * Queries each mirror in order, until one returns Some.
     * Returns Ok(None) if at least one mirror answered, but none knew the item.
     */
    fn first_of<R, F>(&self, query: F) -> Result<Option<R>, Error>
    where
        F: Fn(&T) -> Result<Option<R>, Error>,
    {
        let mut answered = false;
        for (index, mirror) in self.mirrors.iter().enumerate() {
            match query(mirror) {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => answered = true,
                Err(e) => {
                    debug!("mirror #{} failed: {}", index, e);
                },
            }
        }
        if answered {
            Ok(None)
        } else {
            Err(Error::MirrorsExhausted(self.mirrors.len()))
        }
    }
}

impl<T: StationDirectory> StationDirectory for Mirrors<T> {
    fn list_ids(&self) -> Result<Vec<String>, Error> {
        for (index, mirror) in self.mirrors.iter().enumerate() {
            match mirror.list_ids() {
                Ok(ids) => return Ok(ids),
                Err(e) => {
                    debug!("mirror #{} failed: {}", index, e);
                },
            }
        }
        Err(Error::MirrorsExhausted(self.mirrors.len()))
    }
    fn location(&self, id: &str) -> Result<Option<StationLocation>, Error> {
        self.first_of(|mirror| mirror.location(id))
    }
}

impl<T: EphemerisSource> EphemerisSource for Mirrors<T> {
    fn position(&self, sv: SV, t: Epoch) -> Result<Option<Vector3D>, Error> {
        self.first_of(|mirror| mirror.position(sv, t))
    }
}
