//! Statsd - Statistics Aggregation Service
//!
//! Listens for pushed JSON report batches, optionally pulls from the store
//! with `SENDJSON` on an interval, and writes a nested detail report to
//! disk on shutdown.

use linkstore::report::Dimension;
use linkstore::stats::{pull_from_store, run_ingest, save_report, Aggregator};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Aggregator configuration
struct Config {
    /// Host to bind the ingest listener to
    host: String,
    /// Port the ingest listener uses
    port: u16,
    /// Store address to pull from periodically, if any
    store: Option<String>,
    /// Seconds between pulls
    pull_interval: u64,
    /// Grouping order of the report tree
    order: Vec<Dimension>,
    /// Where the report is written on shutdown
    report: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: linkstore::DEFAULT_HOST.to_string(),
            port: linkstore::STATS_PORT,
            store: None,
            pull_interval: 30,
            order: vec![
                Dimension::SourceIp,
                Dimension::TimeInterval,
                Dimension::Url,
            ],
            report: PathBuf::from("reportStat.json"),
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    if i + 1 < args.len() {
                        config.host = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --host requires a value");
                        std::process::exit(1);
                    }
                }
                "--port" | "-p" => {
                    if i + 1 < args.len() {
                        config.port = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --port requires a value");
                        std::process::exit(1);
                    }
                }
                "--store" | "-s" => {
                    if i + 1 < args.len() {
                        config.store = Some(args[i + 1].clone());
                        i += 2;
                    } else {
                        eprintln!("Error: --store requires a value");
                        std::process::exit(1);
                    }
                }
                "--pull-interval" => {
                    if i + 1 < args.len() {
                        config.pull_interval = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid pull interval");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --pull-interval requires a value");
                        std::process::exit(1);
                    }
                }
                "--order" | "-o" => {
                    if i + 1 < args.len() {
                        config.order = args[i + 1]
                            .split_whitespace()
                            .map(|name| {
                                name.parse().unwrap_or_else(|e| {
                                    eprintln!("Error: {}", e);
                                    std::process::exit(1);
                                })
                            })
                            .collect();
                        i += 2;
                    } else {
                        eprintln!("Error: --order requires a value");
                        std::process::exit(1);
                    }
                }
                "--report" | "-r" => {
                    if i + 1 < args.len() {
                        config.report = PathBuf::from(&args[i + 1]);
                        i += 2;
                    } else {
                        eprintln!("Error: --report requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("statsd version {}", linkstore::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_help() {
    println!(
        r#"
Statsd - Statistics Aggregation Service

USAGE:
    statsd [OPTIONS]

OPTIONS:
    -h, --host <HOST>          Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>          Ingest port (default: 9090)
    -s, --store <ADDR>         Pull from this store with SENDJSON
        --pull-interval <SEC>  Seconds between pulls (default: 30)
    -o, --order <DIMS>         Report grouping order, space-separated
                               (default: "SourceIP TimeInterval URL")
    -r, --report <FILE>        Report file (default: reportStat.json)
    -v, --version              Print version information
        --help                 Print this help message

On Ctrl+C a nested detail report grouped by the requested dimensions is
written to the report file.
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let aggregator = Arc::new(Aggregator::new());

    // Ingest listener for pushed batches
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Ingest listening on {}", config.bind_address());
    tokio::spawn(run_ingest(listener, Arc::clone(&aggregator)));

    // Periodic pull from the store, when configured
    if let Some(store) = config.store.clone() {
        let aggregator = Arc::clone(&aggregator);
        let interval = Duration::from_secs(config.pull_interval);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if let Err(e) = pull_from_store(&aggregator, &store).await {
                    warn!(store = %store, error = %e, "Pull failed");
                }
            }
        });
    }

    signal::ctrl_c().await?;
    info!("Shutdown signal received, writing report...");

    let report = aggregator.report(&config.order);
    save_report(&report, &config.report)?;
    info!(
        "Report over {} entries written to {}",
        aggregator.len(),
        config.report.display()
    );

    Ok(())
}
