//! Transmission of classified records
//!
//! [`StoreClient`] posts batches to the store service; [`JsonLinesSink`]
//! writes them as JSON lines. Both sit behind [`RecordSink`].

use async_trait::async_trait;
use std::io::Write;
use std::time::Duration;

use crate::config::TransmissionConfig;
use crate::types::ProcessedRecord;

/// Path the store service accepts processed batches on.
pub const PROCESSED_DATA_PATH: &str = "/processed_agent_data/";

/// Transmission errors
#[derive(Debug, thiserror::Error)]
pub enum TransmissionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Store returned status {0}")]
    ServerError(reqwest::StatusCode),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Write error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No store URL configured")]
    MissingStoreUrl,
}

/// Destination for classified batches.
#[async_trait]
pub trait RecordSink: Send {
    /// Deliver one batch, returning how many records were accepted.
    async fn send_batch(&mut self, records: &[ProcessedRecord]) -> Result<usize, TransmissionError>;

    /// Name for logging.
    fn sink_name(&self) -> &str;
}

// ============================================================================
// HTTP Store Client
// ============================================================================

/// HTTP client for the store service
#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    store_url: String,
}

impl StoreClient {
    pub fn new(store_url: &str, timeout: Duration) -> Result<Self, TransmissionError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            store_url: store_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &TransmissionConfig) -> Result<Self, TransmissionError> {
        let url = config
            .store_url
            .as_deref()
            .ok_or(TransmissionError::MissingStoreUrl)?;
        Self::new(url, Duration::from_secs(config.timeout_secs))
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.store_url, PROCESSED_DATA_PATH)
    }

    /// POST the batch as a JSON array.
    ///
    /// Any 2xx status counts as accepted.
    pub async fn post(&self, records: &[ProcessedRecord]) -> Result<usize, TransmissionError> {
        let body = serde_json::to_vec(records)?;

        let resp = self
            .http
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(records.len())
        } else {
            Err(TransmissionError::ServerError(resp.status()))
        }
    }
}

#[async_trait]
impl RecordSink for StoreClient {
    async fn send_batch(&mut self, records: &[ProcessedRecord]) -> Result<usize, TransmissionError> {
        let sent = self.post(records).await?;
        tracing::info!(url = %self.endpoint(), records = sent, "Batch accepted by store");
        Ok(sent)
    }

    fn sink_name(&self) -> &str {
        "store"
    }
}

// ============================================================================
// JSON Lines Sink
// ============================================================================

/// Writes one JSON object per record per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_records(&mut self, records: &[ProcessedRecord]) -> Result<usize, TransmissionError> {
        for record in records {
            serde_json::to_writer(&mut self.writer, record)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(records.len())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    async fn send_batch(&mut self, records: &[ProcessedRecord]) -> Result<usize, TransmissionError> {
        self.write_records(records)
    }

    fn sink_name(&self) -> &str {
        "json-lines"
    }
}
