//! Shortener - Interactive URL-Shortening Client
//!
//! Reads URLs from stdin, registers a fresh short code for each one with
//! the store, and prints the redirect link. Type `exit` to quit.

use linkstore::shortlink::StoreClient;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Client configuration
struct Config {
    /// Address of the store server
    store: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: format!("{}:{}", linkstore::DEFAULT_HOST, linkstore::DEFAULT_PORT),
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
                "--store" | "-s" => {
                    if i + 1 < args.len() {
                        config.store = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --store requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("shortener version {}", linkstore::VERSION);
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
}

fn print_help() {
    println!(
        r#"
Shortener - Interactive URL-Shortening Client

USAGE:
    shortener [OPTIONS]

OPTIONS:
    -s, --store <ADDR>    Store server address (default: 127.0.0.1:6379)
    -v, --version         Print version information
        --help            Print this help message

Type a URL per line; type 'exit' to quit.
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_target(false)
        .init();

    let client = StoreClient::new(config.store);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout
            .write_all(b"Enter a URL to shorten (type 'exit' to quit): ")
            .await?;
        stdout.flush().await?;

        let line = match stdin.next_line().await? {
            Some(line) => line,
            None => break,
        };
        let url = line.trim();

        if url.is_empty() {
            continue;
        }
        if url == "exit" {
            break;
        }

        match client.shorten(url).await {
            Ok(code) => {
                println!("Shortened link: localhost:8080/redirect/{}", code);
            }
            Err(e) => {
                eprintln!("Failed to shorten link: {:#}", e);
            }
        }
    }

    Ok(())
}
