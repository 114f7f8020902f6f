//! Entry aggregation, ingest listener, and store pull.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use crate::report::{build_tree, DetailReport, Dimension, ReportData, ReportEntry};

/// Accumulates report entries from pushes and pulls.
#[derive(Debug, Default)]
pub struct Aggregator {
    entries: Mutex<Vec<ReportEntry>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a batch of entries to the aggregate.
    pub fn merge(&self, data: ReportData) {
        let mut entries = self.entries.lock().unwrap();
        entries.extend(data.entries);
    }

    /// Number of accumulated entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds the nested detail tree over everything collected so far.
    pub fn report(&self, order: &[Dimension]) -> DetailReport {
        let entries = self.entries.lock().unwrap();
        build_tree(&entries, order)
    }
}

/// Accepts ingest connections forever. Each connection is one pushed JSON
/// document: read to EOF, parse, merge. Bad payloads are logged and the
/// connection dropped; the listener keeps accepting.
pub async fn run_ingest(listener: TcpListener, aggregator: Arc<Aggregator>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!(client = %addr, "Ingest connection");
                let aggregator = Arc::clone(&aggregator);
                tokio::spawn(async move {
                    if let Err(e) = ingest_one(stream, &aggregator).await {
                        warn!(client = %addr, error = %e, "Ingest failed");
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept ingest connection: {}", e);
            }
        }
    }
}

/// Reads one pushed document from a connection and merges it.
async fn ingest_one(mut stream: TcpStream, aggregator: &Aggregator) -> anyhow::Result<()> {
    let mut payload = Vec::new();
    stream
        .read_to_end(&mut payload)
        .await
        .context("reading ingest payload")?;

    let data: ReportData = serde_json::from_slice(&payload).context("parsing ingest payload")?;
    let received = data.entries.len();
    aggregator.merge(data);

    info!(entries = received, "Merged pushed entries");
    Ok(())
}

/// Dials the store, issues `SENDJSON`, and merges the response.
///
/// # Returns
///
/// The number of entries merged.
pub async fn pull_from_store(aggregator: &Aggregator, store_addr: &str) -> anyhow::Result<usize> {
    let stream = TcpStream::connect(store_addr)
        .await
        .with_context(|| format!("connecting to store at {}", store_addr))?;
    let mut stream = BufReader::new(stream);

    stream
        .get_mut()
        .write_all(b"SENDJSON\n")
        .await
        .context("sending SENDJSON")?;

    let mut line = String::new();
    stream
        .read_line(&mut line)
        .await
        .context("reading SENDJSON response")?;

    let data: ReportData =
        serde_json::from_str(line.trim_end()).context("parsing SENDJSON response")?;
    let pulled = data.entries.len();
    aggregator.merge(data);

    info!(entries = pulled, store = store_addr, "Pulled entries from store");
    Ok(pulled)
}

/// Writes a report tree to `path` as pretty-printed JSON.
pub fn save_report(report: &DetailReport, path: &Path) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)?;
    info!(path = %path.display(), "Report saved");
    Ok(())
}
