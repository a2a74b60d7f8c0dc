//! Command line tool to compute geofenced sub-ionospheric point trajectories
//! of GNSS satellites, over one calendar day.
mod cli;
mod input;

use std::{fs::File, io::Write};

extern crate gnss_rs as gnss;

use gnss_sip::prelude::{LogObserver, NullObserver, Observer, StationProcessingPipeline};

use cli::Cli;

use env_logger::{Builder, Target};

#[macro_use]
extern crate log;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error")]
    StdioError(#[from] std::io::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("missing argument --{0}")]
    MissingArgument(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid date \"{0}\"")]
    InvalidDate(String),
    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),
    #[error("invalid satellite \"{0}\"")]
    InvalidSatellite(String),
    #[error("invalid epoch {0}")]
    InvalidEpoch(String),
    #[error("run failed: {0}")]
    RunFailed(String),
}

pub fn main() -> Result<(), Error> {
    let cli = Cli::new();

    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stderr)
        .format_timestamp_secs()
        .format_module_path(false);
    if cli.quiet() {
        builder.filter_level(log::LevelFilter::Off);
    }
    builder.init();

    let cfg = cli.config()?;
    let range = cli.time_range()?;
    let geofence = cli.geofence(&cfg)?;
    let mode = cli.mode();

    let directory = input::mirrors(&cli.station_tables(), input::station_table)?;
    let ephemeris = input::mirrors(&cli.ephemeris_files(), input::tabulated_ephemeris)?;

    let observer: &dyn Observer = if cli.quiet() {
        &NullObserver
    } else {
        &LogObserver
    };

    let pipeline = StationProcessingPipeline::new(&cfg).with_observer(observer);
    let result = pipeline.run(&mode, &ephemeris, &directory, &geofence, range);

    let content = serde_json::to_string_pretty(&result)?;
    match cli.output() {
        Some(path) => {
            let mut fd = File::create(path)?;
            writeln!(fd, "{}", content)?;
            info!("results generated: \"{}\"", path.display());
        },
        None => {
            println!("{}", content);
        },
    }

    match result.metadata.error {
        Some(e) => Err(Error::RunFailed(e)),
        None => Ok(()),
    }
}
