use crate::{
    ephemeris::TabulatedEphemeris,
    observer::NullObserver,
    prelude::*,
    tests::toolkit::{
        day, square, stations, sv, FailingSource, Overhead, Recorder, Sparse, GPS_ORBIT_RADIUS_M,
    },
};

#[test]
fn retained_and_excluded() {
    let range = day();
    let sampler = PositionSampler::default();
    let recorder = Recorder::default();

    let sampled = sampler.sample(
        &Overhead::new(&["G01"]),
        &[sv("G01"), sv("G05")],
        range.start,
        range.end,
        &recorder,
    );
    assert_eq!(sampled.epochs.len(), 2880);
    assert_eq!(sampled.len(), 1);
    assert_eq!(sampled.series[0].sv, sv("G01"));
    assert_eq!(sampled.series[0].valid_ratio, 1.0);
    assert_eq!(sampled.series[0].samples.len(), 2880);
    assert_eq!(sampled.excluded, vec![(sv("G05"), 0.0)]);
    assert!(recorder.contains("excluded:G05:quality"));
    assert!(recorder.contains("sampling:1/2"));
}

#[test]
fn strict_threshold() {
    let range = day();
    let sampler = PositionSampler::default();
    let overhead = Overhead::new(&["G01"]);

    // exactly 10% valid: excluded
    let tenth = Sparse {
        inner: &overhead,
        sv: sv("G01"),
        keep_one_in: 10,
        t0: range.start,
        interval: sampler.interval,
    };
    let sampled = sampler.sample(&tenth, &[sv("G01")], range.start, range.end, &NullObserver);
    assert!(sampled.is_empty());
    assert_eq!(sampled.excluded.len(), 1);
    assert_eq!(sampled.excluded[0].1, 0.1);

    // 1 out of 9 (> 10%): retained, sentinels preserved
    let ninth = Sparse {
        inner: &overhead,
        sv: sv("G01"),
        keep_one_in: 9,
        t0: range.start,
        interval: sampler.interval,
    };
    let sampled = sampler.sample(&ninth, &[sv("G01")], range.start, range.end, &NullObserver);
    assert_eq!(sampled.len(), 1);
    let samples = &sampled.series[0].samples;
    assert_eq!(samples.len(), 2880);
    assert!(samples[0].is_valid());
    assert!(!samples[1].is_valid());
    assert_eq!(samples[1].position, (0.0, 0.0, 0.0));
    assert_eq!(samples[1].epoch, range.start + 30.0 * Unit::Second);
}

#[test]
fn failures_are_sentinels() {
    let range = day();
    let sampled = PositionSampler::default().sample(
        &FailingSource,
        &[sv("G01"), sv("E11")],
        range.start,
        range.end,
        &NullObserver,
    );
    assert!(sampled.is_empty());
    assert_eq!(sampled.excluded, vec![(sv("G01"), 0.0), (sv("E11"), 0.0)]);
}

#[test]
fn sampling_interval() {
    let cfg = Config::default()
        .with_satellites(&[sv("G01")])
        .with_sampling_interval(Duration::from_seconds(60.0));

    let pipeline = StationProcessingPipeline::new(&cfg);
    let result = pipeline.run(
        &RunMode::SingleStation("EQAT".to_string()),
        &Overhead::new(&["G01"]),
        &stations(),
        &square(0.0, 0.0, 1.0),
        day(),
    );
    assert_eq!(result.points.len(), 1440);
    assert_eq!(result.points[1].time(), "2024-06-01T00:01:00");
}

#[test]
fn ephemeris_mirrors() {
    let cfg = Config::default().with_satellites(&[sv("G01")]);
    let pipeline = StationProcessingPipeline::new(&cfg);

    let mirrors: Mirrors<Box<dyn EphemerisSource>> =
        Mirrors::new(vec![Box::new(FailingSource), Box::new(Overhead::new(&["G01"]))]);

    let result = pipeline.run(
        &RunMode::SingleStation("EQAT".to_string()),
        &mirrors,
        &stations(),
        &square(0.0, 0.0, 1.0),
        day(),
    );
    assert!(result.success());
    assert_eq!(result.points.len(), 2880);

    let down: Mirrors<Box<dyn EphemerisSource>> =
        Mirrors::new(vec![Box::new(FailingSource), Box::new(FailingSource)]);
    assert_eq!(
        down.position(sv("G01"), day().start),
        Err(Error::MirrorsExhausted(2))
    );
}

#[test]
fn tabulated_ephemeris() {
    let range = day();
    let g01 = sv("G01");
    let mut table = TabulatedEphemeris::default();
    assert_eq!(table.order(), 9);

    // 15' tabulation, with margins around the day
    let mut t = range.start - 2.0 * Unit::Hour;
    while t <= range.end + 2.0 * Unit::Hour {
        table.insert(g01, t, (GPS_ORBIT_RADIUS_M, 0.0, 0.0));
        t += 15.0 * Unit::Minute;
    }

    let cfg = Config::default().with_satellites(&[g01, sv("G02")]);
    let pipeline = StationProcessingPipeline::new(&cfg);
    let result = pipeline.run(
        &RunMode::SingleStation("EQAT".to_string()),
        &table,
        &stations(),
        &square(0.0, 0.0, 1.0),
        range,
    );
    assert!(result.success());
    assert_eq!(result.metadata.satellites_processed, 1);
    assert_eq!(result.points.len(), 2880);
    assert!(result.points.iter().all(|p| (p.elevation - 90.0).abs() < 1.0E-3));
}

#[test]
fn null_sampling_interval() {
    let range = day();
    let recorder = Recorder::default();
    for interval in [Duration::ZERO, -30.0 * Unit::Second] {
        let sampler = PositionSampler::new(interval, 0.1);
        let sampled = sampler.sample(
            &Overhead::new(&["G01"]),
            &[sv("G01")],
            range.start,
            range.end,
            &recorder,
        );
        assert!(sampled.epochs.is_empty());
        assert!(sampled.is_empty());
    }
    assert_eq!(recorder.count("sampling:0/1"), 2);

    let cfg = Config::default()
        .with_satellites(&[sv("G01")])
        .with_sampling_interval(Duration::ZERO);

    let pipeline = StationProcessingPipeline::new(&cfg);
    let result = pipeline.run(
        &RunMode::SingleStation("EQAT".to_string()),
        &Overhead::new(&["G01"]),
        &stations(),
        &square(0.0, 0.0, 1.0),
        range,
    );
    assert!(!result.success());
    assert!(result.points.is_empty());
    assert_eq!(
        result.metadata.error,
        Some(Error::NoUsableEphemeris.to_string())
    );
}
