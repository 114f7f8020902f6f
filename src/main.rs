//! LinkStore - An In-Memory Data Store for URL Shortening
//!
//! This is the main entry point for the store server.
//! It loads the snapshot, sets up the TCP listener, and handles incoming
//! connections until Ctrl+C, then snapshots the store back to disk.

use linkstore::commands::CommandProcessor;
use linkstore::connection::{handle_connection, ConnectionStats};
use linkstore::storage::{snapshot, SharedStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// Snapshot file loaded on startup and written on shutdown
    snapshot: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: linkstore::DEFAULT_HOST.to_string(),
            port: linkstore::DEFAULT_PORT,
            snapshot: PathBuf::from(linkstore::SNAPSHOT_FILE),
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
                "--snapshot" | "-s" => {
                    if i + 1 < args.len() {
                        config.snapshot = PathBuf::from(&args[i + 1]);
                        i += 2;
                    } else {
                        eprintln!("Error: --snapshot requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("linkstore version {}", linkstore::VERSION);
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
LinkStore - An In-Memory Data Store for URL Shortening

USAGE:
    linkstore [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>        Port to listen on (default: 6379)
    -s, --snapshot <FILE>    Snapshot file (default: DBMS.txt)
    -v, --version            Print version information
        --help               Print this help message

EXAMPLES:
    linkstore                          # Start on 127.0.0.1:6379
    linkstore --port 6380              # Start on port 6380
    linkstore --snapshot /tmp/db.txt   # Custom snapshot location

CONNECTING:
    Any line-oriented TCP client works:
    $ nc 127.0.0.1 6379
    SHORTLINK ab12cd https://example.com
    OK
    GET ab12cd
    https://example.com
"#
    );
}

fn print_banner(config: &Config) {
    println!(
        r#"
LinkStore v{} - In-Memory Data Store for URL Shortening
──────────────────────────────────────────────────────────────
Server started on {}
Snapshot file: {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        linkstore::VERSION,
        config.bind_address(),
        config.snapshot.display()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Print the banner
    print_banner(&config);

    // Load the snapshot (a missing file means a fresh, empty store)
    let store = snapshot::load(&config.snapshot)?.into_shared();
    info!(
        "Store loaded, {} keys in table",
        store.lock().unwrap().table.len()
    );

    // Create connection statistics
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());

    // Set up graceful shutdown
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    // Main accept loop
    tokio::select! {
        _ = accept_loop(listener, Arc::clone(&store), stats) => {}
        _ = shutdown => {}
    }

    // Snapshot the store on the way out. A panicked connection task
    // poisons the lock but leaves the data intact, so recover the guard
    // rather than losing the final save.
    {
        let store = store.lock().unwrap_or_else(|e| e.into_inner());
        snapshot::save(&store, &config.snapshot)?;
    }
    info!("Snapshot written to {}", config.snapshot.display());

    info!("Server shutdown complete");
    Ok(())
}

/// Main loop that accepts incoming connections
async fn accept_loop(listener: TcpListener, store: SharedStore, stats: Arc<ConnectionStats>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                // Each connection tags its inserts with the peer address
                let processor =
                    CommandProcessor::new(Arc::clone(&store)).with_peer(addr.ip().to_string());
                let stats = Arc::clone(&stats);

                // Spawn a task to handle this connection
                tokio::spawn(async move {
                    handle_connection(stream, addr, processor, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
