//! Sensor data ingestion from CSV files
//!
//! Each sensor writes its own CSV file with a header row. A
//! [`SensorFileReader`] replays one file through a [`ReadingParser`],
//! rewinding to the first data row when it runs out, and a
//! [`FileDatasource`] zips the four readers into [`AgentRecord`]s.
//!
//! Expected headers (case-insensitive, any column order):
//! - accelerometer: `x,y,z`
//! - GPS: `longitude,latitude`
//! - humidex: `temperature,humidity`
//! - anemometer: `speed,direction`

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::IngestionConfig;
use crate::types::{
    AccelerometerReading, AgentRecord, AnemometerReading, GpsReading, HumidexReading,
    ValidationError,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Readers not started, call start_reading() first")]
    NotStarted,

    #[error("No {0} CSV path configured")]
    MissingPath(&'static str),

    #[error("{} has no data rows", .0.display())]
    Empty(PathBuf),

    #[error("{}:{line}: expected {expected} fields, found {found}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{}:{line}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        line: usize,
        #[source]
        source: ValidationError,
    },
}

// ============================================================================
// Rows and Parsers
// ============================================================================

/// One CSV data row keyed by lowercase header name.
#[derive(Debug, Clone)]
pub struct CsvRow {
    fields: HashMap<String, String>,
}

impl CsvRow {
    pub fn new(header: &[String], values: &[&str]) -> Self {
        Self {
            fields: header
                .iter()
                .zip(values)
                .map(|(h, v)| (h.clone(), v.trim().to_string()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Result<&str, ValidationError> {
        self.fields
            .get(column)
            .map(String::as_str)
            .ok_or_else(|| ValidationError::MissingField(column.to_string()))
    }

    pub fn number(&self, column: &str) -> Result<f64, ValidationError> {
        let raw = self.get(column)?;
        raw.parse::<f64>().map_err(|_| ValidationError::InvalidNumber {
            field: column.to_string(),
            raw: raw.to_string(),
        })
    }
}

/// Turns a loosely-typed row into one validated sensor reading.
pub trait ReadingParser {
    type Reading;

    fn parse(&self, row: &CsvRow) -> Result<Self::Reading, ValidationError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccelerometerParser;

impl ReadingParser for AccelerometerParser {
    type Reading = AccelerometerReading;

    fn parse(&self, row: &CsvRow) -> Result<AccelerometerReading, ValidationError> {
        let reading = AccelerometerReading {
            x: row.number("x")?,
            y: row.number("y")?,
            z: row.number("z")?,
        };
        reading.validate()?;
        Ok(reading)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GpsParser;

impl ReadingParser for GpsParser {
    type Reading = GpsReading;

    fn parse(&self, row: &CsvRow) -> Result<GpsReading, ValidationError> {
        let reading = GpsReading {
            latitude: row.number("latitude")?,
            longitude: row.number("longitude")?,
        };
        reading.validate()?;
        Ok(reading)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HumidexParser;

impl ReadingParser for HumidexParser {
    type Reading = HumidexReading;

    fn parse(&self, row: &CsvRow) -> Result<HumidexReading, ValidationError> {
        let reading = HumidexReading {
            temperature: row.number("temperature")?,
            humidity: row.number("humidity")?,
        };
        reading.validate()?;
        Ok(reading)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnemometerParser;

impl ReadingParser for AnemometerParser {
    type Reading = AnemometerReading;

    fn parse(&self, row: &CsvRow) -> Result<AnemometerReading, ValidationError> {
        let reading = AnemometerReading {
            speed: row.number("speed")?,
            direction: row.number("direction")?,
        };
        reading.validate()?;
        Ok(reading)
    }
}

// ============================================================================
// Single-File Reader
// ============================================================================

/// Replays one sensor CSV file forever, rewinding at end of file.
pub struct SensorFileReader<P: ReadingParser> {
    path: PathBuf,
    parser: P,
    header: Vec<String>,
    lines: Option<Lines<BufReader<File>>>,
    line_num: usize,
}

impl<P: ReadingParser> SensorFileReader<P> {
    pub fn new(path: impl Into<PathBuf>, parser: P) -> Self {
        Self {
            path: path.into(),
            parser,
            header: Vec::new(),
            lines: None,
            line_num: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_started(&self) -> bool {
        self.lines.is_some()
    }

    /// Open the file and consume its header row.
    pub fn start(&mut self) -> Result<(), IngestionError> {
        let file = File::open(&self.path).map_err(|source| IngestionError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut lines = BufReader::new(file).lines();

        let header = match lines.next() {
            Some(line) => line.map_err(|source| IngestionError::Io {
                path: self.path.clone(),
                source,
            })?,
            None => return Err(IngestionError::Empty(self.path.clone())),
        };
        self.header = header
            .split(',')
            .map(|h| h.trim().to_lowercase())
            .collect();
        self.lines = Some(lines);
        self.line_num = 1;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.lines = None;
    }

    /// Next reading, rewinding to the first data row at end of file.
    pub fn next_reading(&mut self) -> Result<P::Reading, IngestionError> {
        if let Some(reading) = self.read_data_row()? {
            return Ok(reading);
        }

        tracing::debug!(path = %self.path.display(), rows = self.line_num - 1, "Rewinding sensor file");
        self.start()?;
        self.read_data_row()?
            .ok_or_else(|| IngestionError::Empty(self.path.clone()))
    }

    fn read_data_row(&mut self) -> Result<Option<P::Reading>, IngestionError> {
        let lines = self.lines.as_mut().ok_or(IngestionError::NotStarted)?;

        for line_result in lines.by_ref() {
            self.line_num += 1;
            let line = line_result.map_err(|source| IngestionError::Io {
                path: self.path.clone(),
                source,
            })?;

            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            let values: Vec<&str> = line.split(',').collect();
            if values.len() != self.header.len() {
                return Err(IngestionError::Malformed {
                    path: self.path.clone(),
                    line: self.line_num,
                    expected: self.header.len(),
                    found: values.len(),
                });
            }

            let row = CsvRow::new(&self.header, &values);
            return self
                .parser
                .parse(&row)
                .map(Some)
                .map_err(|source| IngestionError::Invalid {
                    path: self.path.clone(),
                    line: self.line_num,
                    source,
                });
        }

        Ok(None)
    }
}

// ============================================================================
// Four-Sensor Datasource
// ============================================================================

/// Paths of the four sensor CSV files.
#[derive(Debug, Clone)]
pub struct SensorFiles {
    pub accelerometer: PathBuf,
    pub gps: PathBuf,
    pub humidex: PathBuf,
    pub anemometer: PathBuf,
}

impl SensorFiles {
    /// Paths from config; every one must be set.
    pub fn from_config(config: &IngestionConfig) -> Result<Self, IngestionError> {
        Ok(Self {
            accelerometer: config
                .accelerometer_csv
                .clone()
                .ok_or(IngestionError::MissingPath("accelerometer"))?,
            gps: config.gps_csv.clone().ok_or(IngestionError::MissingPath("gps"))?,
            humidex: config
                .humidex_csv
                .clone()
                .ok_or(IngestionError::MissingPath("humidex"))?,
            anemometer: config
                .anemometer_csv
                .clone()
                .ok_or(IngestionError::MissingPath("anemometer"))?,
        })
    }
}

/// Reads one row from each sensor file per tick and aggregates them.
pub struct FileDatasource {
    accelerometer: SensorFileReader<AccelerometerParser>,
    gps: SensorFileReader<GpsParser>,
    humidex: SensorFileReader<HumidexParser>,
    anemometer: SensorFileReader<AnemometerParser>,
    user_id: i64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl FileDatasource {
    pub fn new(files: SensorFiles, user_id: i64) -> Self {
        Self {
            accelerometer: SensorFileReader::new(files.accelerometer, AccelerometerParser),
            gps: SensorFileReader::new(files.gps, GpsParser),
            humidex: SensorFileReader::new(files.humidex, HumidexParser),
            anemometer: SensorFileReader::new(files.anemometer, AnemometerParser),
            user_id,
            last_timestamp: None,
        }
    }

    /// Open all four files. Must be called before `read()`.
    pub fn start_reading(&mut self) -> Result<(), IngestionError> {
        self.accelerometer.start()?;
        self.gps.start()?;
        self.humidex.start()?;
        self.anemometer.start()?;
        tracing::info!(
            accelerometer = %self.accelerometer.path().display(),
            gps = %self.gps.path().display(),
            humidex = %self.humidex.path().display(),
            anemometer = %self.anemometer.path().display(),
            "Started sensor file readers"
        );
        Ok(())
    }

    pub fn stop_reading(&mut self) {
        self.accelerometer.stop();
        self.gps.stop();
        self.humidex.stop();
        self.anemometer.stop();
    }

    /// Read `batch_size` ticks. Timestamps never decrease across calls.
    ///
    /// A row that fails validation aborts the whole batch. Every reader
    /// still advances past the failing tick, so the four files stay in
    /// step and the next `read()` resumes at the following tick.
    pub fn read(&mut self, batch_size: usize) -> Result<Vec<AgentRecord>, IngestionError> {
        let started = self.accelerometer.is_started()
            && self.gps.is_started()
            && self.humidex.is_started()
            && self.anemometer.is_started();
        if !started {
            return Err(IngestionError::NotStarted);
        }

        let mut records = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            // Advance all four before surfacing any error.
            let accelerometer = self.accelerometer.next_reading();
            let gps = self.gps.next_reading();
            let humidex = self.humidex.next_reading();
            let anemometer = self.anemometer.next_reading();
            let (accelerometer, gps, humidex, anemometer) =
                (accelerometer?, gps?, humidex?, anemometer?);

            let now = Utc::now();
            let timestamp = self.last_timestamp.map_or(now, |last| last.max(now));
            self.last_timestamp = Some(timestamp);

            records.push(AgentRecord::new(
                self.user_id,
                accelerometer,
                gps,
                humidex,
                anemometer,
                timestamp,
            ));
        }

        tracing::debug!(count = records.len(), "Read sensor batch");
        Ok(records)
    }
}

// ============================================================================
// Synthetic Ride
// ============================================================================

/// Generate a deterministic synthetic ride.
///
/// 100 one-second ticks, one default classification window:
/// - 0..40 smooth road
/// - 40..52 wide bump (z = 18 000)
/// - 52..60 smooth road
/// - 60..78 sustained pothole dip (z = 14 000)
/// - 78..100 smooth road, with a 30 m/s gust at tick 90
pub fn generate_ride_test_data(user_id: i64) -> Vec<AgentRecord> {
    let start = Utc
        .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);

    (0..100usize)
        .map(|i| {
            let t = i as f64;
            let ripple = 16_000.0 + 150.0 * (t * 0.7).sin();
            let z = match i {
                40..=51 => 18_000.0,
                60..=77 => 14_000.0,
                _ => ripple,
            };
            let speed = if i == 90 { 30.0 } else { 4.0 + 1.5 * (t * 0.3).sin() };

            AgentRecord::new(
                user_id,
                AccelerometerReading { x: 20.0 * (t * 0.5).cos(), y: 15.0 * (t * 0.4).sin(), z },
                GpsReading {
                    latitude: 50.4501 + t * 1.0e-4,
                    longitude: 30.5234 + t * 0.5e-4,
                },
                HumidexReading {
                    temperature: 24.0 + 6.0 * (t / 100.0),
                    humidity: 55.0 + 10.0 * (t * 0.05).sin(),
                },
                AnemometerReading {
                    speed,
                    direction: (200.0 + 20.0 * (t * 0.1).sin()).rem_euclid(360.0),
                },
                start + Duration::seconds(i as i64),
            )
        })
        .collect()
}
