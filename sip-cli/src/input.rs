//! JSON inputs: station tables and tabulated ephemeris
use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path, str::FromStr};

use gnss::prelude::SV;
use gnss_sip::{
    prelude::{Epoch, Mirrors, StationTable, TabulatedEphemeris},
    station::StationEntry,
};
use serde::Deserialize;

use crate::Error;

/// One tabulated position
#[derive(Debug, Deserialize)]
struct Position {
    epoch: String,
    x: f64,
    y: f64,
    z: f64,
}

/// Loads a station table, in the layout of the station API:
/// `[{"id": "ERKG", "location": {"lat": .., "lon": .., "height": ..}}, ..]`
pub fn station_table(path: &Path) -> Result<StationTable, Error> {
    let reader = BufReader::new(File::open(path)?);
    let entries: Vec<StationEntry> = serde_json::from_reader(reader)?;
    let table = entries.into_iter().collect::<StationTable>();
    info!("loaded {} stations from \"{}\"", table.len(), path.display());
    Ok(table)
}

/// Loads tabulated ECEF positions (m):
/// `{"G01": [{"epoch": "2024-06-01T00:00:00 UTC", "x": .., "y": .., "z": ..}, ..], ..}`
pub fn tabulated_ephemeris(path: &Path) -> Result<TabulatedEphemeris, Error> {
    let reader = BufReader::new(File::open(path)?);
    let content: BTreeMap<String, Vec<Position>> = serde_json::from_reader(reader)?;

    let mut table = TabulatedEphemeris::default();
    for (desc, positions) in content.iter() {
        let sv = parse_sv(desc)?;
        for position in positions.iter() {
            let t = Epoch::from_str(position.epoch.trim())
                .map_err(|e| Error::InvalidEpoch(format!("{}: {}", position.epoch, e)))?;
            table.insert(sv, t, (position.x, position.y, position.z));
        }
    }
    info!(
        "loaded {} positions ({} satellites) from \"{}\"",
        table.len(),
        table.sv().count(),
        path.display()
    );
    Ok(table)
}

fn parse_sv(desc: &str) -> Result<SV, Error> {
    let desc = desc.trim();
    if desc.len() < 2 || !desc.is_ascii() {
        return Err(Error::InvalidSatellite(desc.to_string()));
    }
    SV::from_str(desc).map_err(|_| Error::InvalidSatellite(desc.to_string()))
}

/// Loads every file as one mirror, in order of appearance.
pub fn mirrors<T, F>(paths: &[&Path], loader: F) -> Result<Mirrors<T>, Error>
where
    F: Fn(&Path) -> Result<T, Error>,
{
    let mut mirrors = Mirrors::default();
    for path in paths {
        mirrors = mirrors.with_mirror(loader(*path)?);
    }
    Ok(mirrors)
}
