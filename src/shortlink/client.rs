//! Short-code generator and line-protocol store client.

use anyhow::Context;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

/// Length of generated short codes.
pub const CODE_LEN: usize = 6;

/// Generates a random short code from `[a-zA-Z0-9]`.
pub fn generate_code(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// A client that speaks the store's line protocol.
///
/// Each call opens its own connection, sends one command line, and reads
/// one response line — the collaborator pattern the store is designed for.
#[derive(Debug, Clone)]
pub struct StoreClient {
    addr: String,
}

impl StoreClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Sends one command line and returns the response line (without the
    /// trailing newline).
    pub async fn send(&self, line: &str) -> anyhow::Result<String> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .with_context(|| format!("connecting to store at {}", self.addr))?;
        let mut stream = BufReader::new(stream);

        stream
            .get_mut()
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .context("sending command to store")?;

        let mut response = String::new();
        stream
            .read_line(&mut response)
            .await
            .context("reading response from store")?;

        let response = response.trim_end().to_string();
        debug!(command = line, response = %response, "Store roundtrip");
        Ok(response)
    }

    /// Registers a fresh short code for `url` and returns the code.
    pub async fn shorten(&self, url: &str) -> anyhow::Result<String> {
        let code = generate_code(CODE_LEN);
        let response = self.send(&format!("SHORTLINK {} {}", code, url)).await?;
        anyhow::ensure!(response == "OK", "store rejected short link: {}", response);
        Ok(code)
    }

    /// Resolves a short code back to its original URL, if registered.
    pub async fn resolve(&self, code: &str) -> anyhow::Result<Option<String>> {
        let response = self.send(&format!("GET {}", code)).await?;
        if response == "NOT FOUND" {
            Ok(None)
        } else {
            Ok(Some(response))
        }
    }
}
