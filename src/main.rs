//! Road Vision - ride-condition classification CLI
//!
//! Reads sensor records, classifies them, and prints or posts the result.
//!
//! # Usage
//!
//! ```bash
//! # Classify the built-in synthetic ride, print JSON lines
//! road-vision
//!
//! # Replay four sensor CSV files, three windows of 200 records
//! road-vision --accelerometer data/accelerometer.csv --gps data/gps.csv \
//!     --humidex data/humidex.csv --anemometer data/anemometer.csv \
//!     --batch-size 200 --batches 3
//!
//! # Per-record policy, posted to the store service
//! road-vision --policy single --store-url http://127.0.0.1:8000
//! ```
//!
//! # Environment Variables
//!
//! - `ROAD_VISION_CONFIG`: Path to a TOML config file
//! - `ROAD_VISION_STORE_URL`: Same as `--store-url`
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};

use road_vision::config::PipelineConfig;
use road_vision::sensors::{generate_ride_test_data, FileDatasource, SensorFiles};
use road_vision::transmission::{JsonLinesSink, RecordSink, StoreClient};
use road_vision::types::{AgentRecord, ProcessedRecord};
use road_vision::Classifier;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    /// Each record on its own, fixed thresholds
    Single,
    /// Whole window, peak shape
    Batch,
}

#[derive(Parser, Debug)]
#[command(name = "road-vision")]
#[command(about = "Classify road surface, heat comfort and wind hazard from ride sensor data")]
#[command(version)]
struct CliArgs {
    /// Path to TOML config (otherwise $ROAD_VISION_CONFIG, then ./road_vision.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Classification policy
    #[arg(long, value_enum, default_value_t = Policy::Batch)]
    policy: Policy,

    /// Records per window (overrides ingestion.batch_size)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Number of windows to process
    #[arg(long, default_value = "1")]
    batches: usize,

    /// Accelerometer CSV (x,y,z)
    #[arg(long, requires_all = ["gps", "humidex", "anemometer"])]
    accelerometer: Option<PathBuf>,

    /// GPS CSV (longitude,latitude)
    #[arg(long, requires_all = ["accelerometer", "humidex", "anemometer"])]
    gps: Option<PathBuf>,

    /// Temperature/humidity CSV (temperature,humidity)
    #[arg(long, requires_all = ["accelerometer", "gps", "anemometer"])]
    humidex: Option<PathBuf>,

    /// Anemometer CSV (speed,direction)
    #[arg(long, requires_all = ["accelerometer", "gps", "humidex"])]
    anemometer: Option<PathBuf>,

    /// Store service base URL; records are printed to stdout when unset
    #[arg(long, env = "ROAD_VISION_STORE_URL")]
    store_url: Option<String>,
}

impl CliArgs {
    /// Fold command-line overrides into the loaded config.
    fn apply_to(&self, config: &mut PipelineConfig) {
        if let Some(size) = self.batch_size {
            config.ingestion.batch_size = size;
        }
        if let Some(path) = &self.accelerometer {
            config.ingestion.accelerometer_csv = Some(path.clone());
        }
        if let Some(path) = &self.gps {
            config.ingestion.gps_csv = Some(path.clone());
        }
        if let Some(path) = &self.humidex {
            config.ingestion.humidex_csv = Some(path.clone());
        }
        if let Some(path) = &self.anemometer {
            config.ingestion.anemometer_csv = Some(path.clone());
        }
        if let Some(url) = &self.store_url {
            config.transmission.store_url = Some(url.clone());
        }
    }
}

// ============================================================================
// Record Sources
// ============================================================================

enum RecordSource {
    Files(FileDatasource),
    Synthetic(std::vec::IntoIter<AgentRecord>),
}

impl RecordSource {
    fn from_config(config: &PipelineConfig) -> Result<Self> {
        let ingestion = &config.ingestion;
        let any_file = ingestion.accelerometer_csv.is_some()
            || ingestion.gps_csv.is_some()
            || ingestion.humidex_csv.is_some()
            || ingestion.anemometer_csv.is_some();

        if !any_file {
            info!("No sensor files configured, classifying synthetic ride");
            return Ok(Self::Synthetic(
                generate_ride_test_data(ingestion.user_id).into_iter(),
            ));
        }

        let files = SensorFiles::from_config(ingestion).context("Incomplete sensor file set")?;
        let mut source = FileDatasource::new(files, ingestion.user_id);
        source.start_reading().context("Failed to open sensor files")?;
        Ok(Self::Files(source))
    }

    /// Next window, or `None` once the synthetic ride is used up.
    fn next_window(&mut self, batch_size: usize) -> Result<Option<Vec<AgentRecord>>> {
        match self {
            Self::Files(source) => Ok(Some(source.read(batch_size)?)),
            Self::Synthetic(ride) => {
                let window: Vec<AgentRecord> = ride.by_ref().take(batch_size).collect();
                Ok((!window.is_empty()).then_some(window))
            }
        }
    }

    fn stop(&mut self) {
        if let Self::Files(source) = self {
            source.stop_reading();
        }
    }
}

fn classify(classifier: &Classifier, policy: Policy, window: Vec<AgentRecord>) -> Result<Vec<ProcessedRecord>> {
    let processed = match policy {
        Policy::Single => window
            .into_iter()
            .map(|record| classifier.classify_one(record))
            .collect::<Result<Vec<_>, _>>()?,
        Policy::Batch => classifier.classify_batch(window)?,
    };
    Ok(processed)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::load(),
    };
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;
    ensure!(args.batches > 0, "--batches must be at least 1");

    let classifier = Classifier::from_config(&config);
    let mut sink: Box<dyn RecordSink> = match &config.transmission.store_url {
        Some(_) => Box::new(
            StoreClient::from_config(&config.transmission).context("Failed to build store client")?,
        ),
        None => Box::new(JsonLinesSink::new(std::io::stdout())),
    };

    info!(
        policy = ?args.policy,
        batch_size = config.ingestion.batch_size,
        batches = args.batches,
        sink = sink.sink_name(),
        "Starting classification"
    );

    let mut source = RecordSource::from_config(&config)?;
    let mut total = 0usize;
    for batch in 0..args.batches {
        let Some(window) = source.next_window(config.ingestion.batch_size)? else {
            warn!(batch, "Synthetic ride exhausted, stopping early");
            break;
        };

        let processed = classify(&classifier, args.policy, window)
            .with_context(|| format!("Classification failed for batch {batch}"))?;
        let sent = sink
            .send_batch(&processed)
            .await
            .with_context(|| format!("Failed to deliver batch {batch} to {}", sink.sink_name()))?;
        total += sent;
    }
    source.stop();

    info!(records = total, "Done");
    Ok(())
}
