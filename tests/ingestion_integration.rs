//! Ingestion Integration Test
//!
//! Writes four sensor CSV files into a temp directory, replays them through
//! `FileDatasource`, classifies the windows and serializes the result, the
//! same path the CLI takes.

use std::fs;
use std::path::Path;

use road_vision::sensors::{FileDatasource, IngestionError, SensorFiles};
use road_vision::transmission::JsonLinesSink;
use road_vision::{Classifier, RoadState, WindChillState};
use tempfile::TempDir;

const ROWS: usize = 40;

/// Four CSV files with a wide bump at rows 10..22 and a gust at row 30.
fn ride_files(dir: &Path) -> SensorFiles {
    let mut accelerometer = String::from("X,Y,Z\n");
    let mut gps = String::from("longitude,latitude\n");
    let mut humidex = String::from("temperature,humidity\n");
    let mut anemometer = String::from("speed,direction\n");

    for i in 0..ROWS {
        let z = if (10..22).contains(&i) { 18_000 } else { 16_000 };
        let speed = if i == 30 { 28.0 } else { 4.0 };
        accelerometer.push_str(&format!("0,0,{z}\n"));
        gps.push_str(&format!("30.52,{:.4}\n", 50.45 + i as f64 * 1e-4));
        humidex.push_str("22.5,55\n");
        anemometer.push_str(&format!("{speed},180\n"));
    }

    let files = SensorFiles {
        accelerometer: dir.join("accelerometer.csv"),
        gps: dir.join("gps.csv"),
        humidex: dir.join("humidex.csv"),
        anemometer: dir.join("anemometer.csv"),
    };
    fs::write(&files.accelerometer, accelerometer).unwrap();
    fs::write(&files.gps, gps).unwrap();
    fs::write(&files.humidex, humidex).unwrap();
    fs::write(&files.anemometer, anemometer).unwrap();
    files
}

#[test]
fn replayed_files_classify_end_to_end() {
    let dir = TempDir::new().unwrap();
    let mut source = FileDatasource::new(ride_files(dir.path()), 5);
    source.start_reading().unwrap();

    let window = source.read(ROWS).unwrap();
    assert_eq!(window.len(), ROWS);
    assert!(window.iter().all(|r| r.user_id == 5));
    assert!(window.windows(2).all(|p| p[0].timestamp <= p[1].timestamp));

    let processed = Classifier::default().classify_batch(window).unwrap();
    let bumps: Vec<usize> = (0..ROWS)
        .filter(|&i| processed[i].road_state == RoadState::Bump)
        .collect();
    assert_eq!(bumps, vec![10]);
    assert_eq!(processed[30].wind_chill_state, WindChillState::StrongWind);

    let mut sink = JsonLinesSink::new(Vec::new());
    sink.write_records(&processed).unwrap();
    let out = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(out.lines().count(), ROWS);

    source.stop_reading();
    assert!(matches!(source.read(1), Err(IngestionError::NotStarted)));
}

#[test]
fn reads_past_end_of_file_wrap_around() {
    let dir = TempDir::new().unwrap();
    let mut source = FileDatasource::new(ride_files(dir.path()), 1);
    source.start_reading().unwrap();

    let first = source.read(ROWS).unwrap();
    let second = source.read(ROWS).unwrap();
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.accelerometer, b.accelerometer);
        assert_eq!(a.anemometer, b.anemometer);
    }
    assert!(first[ROWS - 1].timestamp <= second[0].timestamp);
}

#[test]
fn bad_row_names_file_and_line() {
    let dir = TempDir::new().unwrap();
    let files = ride_files(dir.path());
    fs::write(&files.anemometer, "speed,direction\n4.0,180\n4.0,360\n").unwrap();

    let mut source = FileDatasource::new(files.clone(), 1);
    source.start_reading().unwrap();
    match source.read(5) {
        Err(IngestionError::Invalid { path, line, .. }) => {
            assert_eq!(path, files.anemometer);
            assert_eq!(line, 3);
        }
        other => panic!("expected invalid row, got {other:?}"),
    }
}

#[test]
fn missing_file_fails_on_start() {
    let dir = TempDir::new().unwrap();
    let files = ride_files(dir.path());
    fs::remove_file(&files.gps).unwrap();

    let mut source = FileDatasource::new(files, 1);
    assert!(matches!(
        source.start_reading(),
        Err(IngestionError::Io { .. })
    ));
}

#[test]
fn bad_row_keeps_sensors_in_step() {
    let dir = TempDir::new().unwrap();
    let files = ride_files(dir.path());

    // Per-row markers: temperature = 20 + row, speed = 1 + row.
    let mut humidex = String::from("temperature,humidity\n");
    let mut anemometer = String::from("speed,direction\n");
    for i in 0..ROWS {
        let humidity = if i == 1 { 500 } else { 55 };
        humidex.push_str(&format!("{},{humidity}\n", 20 + i));
        anemometer.push_str(&format!("{},180\n", 1 + i));
    }
    fs::write(&files.humidex, humidex).unwrap();
    fs::write(&files.anemometer, anemometer).unwrap();

    let mut source = FileDatasource::new(files, 1);
    source.start_reading().unwrap();
    assert!(matches!(
        source.read(2),
        Err(IngestionError::Invalid { line: 3, .. })
    ));

    // Resumes at row 2 for every sensor, and stays aligned after that.
    let resumed = source.read(3).unwrap();
    for (offset, record) in resumed.iter().enumerate() {
        let row = 2 + offset;
        assert_eq!(record.humidex.temperature, (20 + row) as f64);
        assert_eq!(record.anemometer.speed, (1 + row) as f64);
        assert!((record.gps.latitude - (50.45 + row as f64 * 1e-4)).abs() < 1e-9);
    }
}
