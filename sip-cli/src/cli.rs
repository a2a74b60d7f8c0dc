use std::path::Path;

use clap::{value_parser, Arg, ArgAction, ArgMatches, ColorChoice, Command};

use gnss_sip::prelude::{Config, Geofence, Polygon, RunMode, TimeRange};

use crate::Error;

pub struct Cli {
    /// Arguments passed by user
    pub matches: ArgMatches,
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

impl Cli {
    /// Build new command line interface
    pub fn new() -> Self {
        Self {
            matches: {
                Command::new("sip-cli")
                    .version(env!("CARGO_PKG_VERSION"))
                    .about("Geofenced sub-ionospheric point trajectories")
                    .long_about("sip-cli projects the line of sight of every satellite,
seen from one or several ground stations, onto a thin ionospheric shell,
over one calendar day, and only retains the pierce points that
fall within the area of interest.")
                    .arg_required_else_help(true)
                    .color(ColorChoice::Always)
                    .next_help_heading("Time frame")
                    .arg(Arg::new("date")
                        .long("date")
                        .short('d')
                        .value_name("YYYY-MM-DD")
                        .required(true)
                        .help("UTC calendar day to process."))
                    .next_help_heading("Area of interest")
                    .arg(Arg::new("polygon")
                        .long("polygon")
                        .short('p')
                        .value_name("LAT,LON;LAT,LON;..")
                        .required_unless_present("circle")
                        .conflicts_with("circle")
                        .help("Polygon vertices, in decimal degrees. At least 3 vertices are expected."))
                    .arg(Arg::new("circle")
                        .long("circle")
                        .value_name("LAT,LON,RADIUS_KM")
                        .help("Circular area: center in decimal degrees, radius in kilometers."))
                    .next_help_heading("Stations")
                    .arg(Arg::new("station")
                        .long("station")
                        .short('s')
                        .value_name("CODE")
                        .help("Process this station only. When omitted, every station
located within the area of interest gets processed (discovery)."))
                    .arg(Arg::new("stations")
                        .long("stations")
                        .value_name("FILE")
                        .action(ArgAction::Append)
                        .required(true)
                        .help("Station table (JSON). Several tables act as ordered mirrors."))
                    .arg(Arg::new("limit")
                        .long("limit")
                        .value_name("N")
                        .value_parser(value_parser!(usize))
                        .help("Maximal number of stations to examine in discovery mode."))
                    .next_help_heading("Ephemeris")
                    .arg(Arg::new("ephemeris")
                        .long("ephemeris")
                        .short('e')
                        .value_name("FILE")
                        .action(ArgAction::Append)
                        .required(true)
                        .help("Tabulated ECEF positions (JSON). Several files act as ordered mirrors."))
                    .next_help_heading("Settings")
                    .arg(Arg::new("cfg")
                        .long("cfg")
                        .short('c')
                        .value_name("FILE")
                        .help("Configuration (JSON). Flags below take precedence."))
                    .arg(Arg::new("step")
                        .long("step")
                        .value_name("SECONDS")
                        .value_parser(value_parser!(f64))
                        .help("Sampling interval, in seconds."))
                    .arg(Arg::new("height")
                        .long("height")
                        .value_name("KM")
                        .value_parser(value_parser!(f64))
                        .help("Ionosphere shell height, in kilometers."))
                    .next_help_heading("Output")
                    .arg(Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("FILE")
                        .help("Write results to this file, instead of stdout."))
                    .arg(Arg::new("quiet")
                        .long("quiet")
                        .short('q')
                        .action(ArgAction::SetTrue)
                        .help("Disable all logs."))
                    .get_matches()
            },
        }
    }
    pub fn quiet(&self) -> bool {
        self.matches.get_flag("quiet")
    }
    /// Processed calendar day
    pub fn time_range(&self) -> Result<TimeRange, Error> {
        let date = self
            .matches
            .get_one::<String>("date")
            .ok_or(Error::MissingArgument("date"))?;
        parse_date(date)
    }
    /// Area of interest
    pub fn geofence(&self, cfg: &Config) -> Result<Geofence, Error> {
        if let Some(circle) = self.matches.get_one::<String>("circle") {
            parse_circle(circle, cfg.earth_radius_m)
        } else {
            let polygon = self
                .matches
                .get_one::<String>("polygon")
                .ok_or(Error::MissingArgument("polygon"))?;
            parse_polygon(polygon)
        }
    }
    pub fn mode(&self) -> RunMode {
        match self.matches.get_one::<String>("station") {
            Some(code) => RunMode::SingleStation(code.clone()),
            None => RunMode::Discovery,
        }
    }
    pub fn station_tables(&self) -> Vec<&Path> {
        self.matches
            .get_many::<String>("stations")
            .map(|paths| paths.map(Path::new).collect())
            .unwrap_or_default()
    }
    pub fn ephemeris_files(&self) -> Vec<&Path> {
        self.matches
            .get_many::<String>("ephemeris")
            .map(|paths| paths.map(Path::new).collect())
            .unwrap_or_default()
    }
    pub fn output(&self) -> Option<&Path> {
        self.matches.get_one::<String>("output").map(Path::new)
    }
    /// Configuration: file content (or defaults), then flags.
    pub fn config(&self) -> Result<Config, Error> {
        let mut cfg = match self.matches.get_one::<String>("cfg") {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content)?
            },
            None => Config::default(),
        };
        if let Some(step) = self.matches.get_one::<f64>("step") {
            if *step <= 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "sampling interval must be positive, got {}",
                    step
                )));
            }
            cfg = cfg.with_sampling_interval(hifitime::Duration::from_seconds(*step));
        }
        if let Some(height) = self.matches.get_one::<f64>("height") {
            cfg = cfg.with_shell_height(height * 1.0E3);
        }
        if let Some(limit) = self.matches.get_one::<usize>("limit") {
            cfg = cfg.with_discovery_limit(*limit);
        }
        Ok(cfg)
    }
}

/*
 * "YYYY-MM-DD"
 */
fn parse_date(date: &str) -> Result<TimeRange, Error> {
    let items = date.trim().split('-').collect::<Vec<_>>();
    if items.len() != 3 {
        return Err(Error::InvalidDate(date.to_string()));
    }
    let y = items[0]
        .parse::<i32>()
        .map_err(|_| Error::InvalidDate(date.to_string()))?;
    let m = items[1]
        .parse::<u8>()
        .map_err(|_| Error::InvalidDate(date.to_string()))?;
    let d = items[2]
        .parse::<u8>()
        .map_err(|_| Error::InvalidDate(date.to_string()))?;
    TimeRange::calendar_day(y, m, d).map_err(|_| Error::InvalidDate(date.to_string()))
}

/*
 * "lat,lon" in decimal degrees
 */
fn parse_coordinates(desc: &str) -> Option<(f64, f64)> {
    let (lat, lon) = desc.trim().split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lon = lon.trim().parse::<f64>().ok()?;
    Some((lat, lon))
}

/*
 * "lat,lon;lat,lon;..". An optional closing vertex is tolerated.
 */
fn parse_polygon(desc: &str) -> Result<Geofence, Error> {
    let mut vertices = Vec::new();
    for item in desc.split(';').filter(|item| !item.trim().is_empty()) {
        let vertex =
            parse_coordinates(item).ok_or_else(|| Error::InvalidPolygon(item.to_string()))?;
        vertices.push(vertex);
    }
    if vertices.len() > 3 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if vertices.len() < 3 {
        return Err(Error::InvalidPolygon(format!(
            "{} vertices, at least 3 expected",
            vertices.len()
        )));
    }
    Ok(Geofence::Polygon(Polygon::from_vertices(&vertices)))
}

/*
 * "lat,lon,radius_km"
 */
fn parse_circle(desc: &str, earth_radius_m: f64) -> Result<Geofence, Error> {
    let (center, radius) = desc
        .trim()
        .rsplit_once(',')
        .ok_or_else(|| Error::InvalidArgument(desc.to_string()))?;
    let (latitude, longitude) =
        parse_coordinates(center).ok_or_else(|| Error::InvalidArgument(desc.to_string()))?;
    let radius_km = radius
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidArgument(desc.to_string()))?;
    if radius_km <= 0.0 {
        return Err(Error::InvalidArgument(format!("invalid radius {}", radius_km)));
    }
    Ok(Geofence::Circle {
        latitude,
        longitude,
        radius_m: radius_km * 1.0E3,
        earth_radius_m,
    })
}
