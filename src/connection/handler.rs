//! Connection Handler
//!
//! One async task per accepted client. The task reads newline-terminated
//! command lines, runs each through the command processor (which takes and
//! releases the global lock), and writes the single response line back.
//!
//! ## Lifecycle
//!
//! ```text
//! ACCEPTED ──> READING ──(line)──> DISPATCHING ──> READING ──> ... ──> CLOSED
//! ```
//!
//! TCP is a stream, so a read may deliver a partial line or several lines at
//! once; a `BytesMut` buffer accumulates data and complete lines are carved
//! off as they appear. The response is written only after the store lock has
//! been released — slow or failing socket I/O never holds up other
//! connections.
//!
//! A read error or peer close ends only this task; the listener keeps
//! accepting.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, error, info, trace, warn};

use crate::commands::CommandProcessor;
use crate::protocol::Response;

/// Maximum bytes buffered for a single line (64 KB)
const MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Process-wide connection counters, shared across all handler tasks.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total command lines processed
    pub commands_processed: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Errors that end a connection's handler task.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client closed the connection with no pending data
    #[error("client disconnected")]
    ClientDisconnected,

    /// Stream ended mid-line
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// A single line exceeded the buffer cap
    #[error("line length limit exceeded")]
    BufferFull,
}

/// Manages the buffer, framing, and response writing for one client.
pub struct ConnectionHandler {
    stream: BufWriter<TcpStream>,
    addr: SocketAddr,
    buffer: BytesMut,
    processor: CommandProcessor,
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        processor: CommandProcessor,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            processor,
            stats,
        }
    }

    /// Runs the read-dispatch-respond loop until the client disconnects or
    /// an error occurs.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected"),
            Err(ConnectionError::ClientDisconnected) => {
                debug!(client = %self.addr, "Client disconnected")
            }
            Err(ConnectionError::Io(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(line) = self.extract_line()? {
                let response = match std::str::from_utf8(&line) {
                    // The lock is taken and released inside execute();
                    // by the time we write the response it is free.
                    Ok(line) => self.processor.execute(line),
                    Err(_) => Response::error("invalid utf-8"),
                };
                self.stats.command_processed();

                trace!(client = %self.addr, response = %response, "Dispatched command");
                self.send_response(&response).await?;
            }

            self.read_more_data().await?;
        }
    }

    /// Carves one `\n`-terminated line off the buffer, stripping the
    /// terminator and any preceding `\r`.
    fn extract_line(&mut self) -> Result<Option<Vec<u8>>, ConnectionError> {
        match self.buffer.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                let mut line = self.buffer.split_to(pos + 1);
                line.truncate(pos);
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                Ok(Some(line.to_vec()))
            }
            None if self.buffer.len() >= MAX_BUFFER_SIZE => {
                error!(client = %self.addr, size = self.buffer.len(), "Line length limit exceeded");
                Err(ConnectionError::BufferFull)
            }
            None => Ok(None),
        }
    }

    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(4096);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            if self.buffer.has_remaining() {
                return Err(ConnectionError::UnexpectedEof);
            }
            return Err(ConnectionError::ClientDisconnected);
        }

        trace!(client = %self.addr, bytes = n, "Read data");
        Ok(())
    }

    async fn send_response(&mut self, response: &Response) -> Result<(), ConnectionError> {
        let line = response.to_line();
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

/// Creates a handler for one client and runs it to completion.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    processor: CommandProcessor,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, processor, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::Io(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SharedStore, Store};
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};

    async fn create_test_server() -> (SocketAddr, SharedStore, Arc<ConnectionStats>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let store = Store::new().into_shared();
        let stats = Arc::new(ConnectionStats::new());

        let store_clone = Arc::clone(&store);
        let stats_clone = Arc::clone(&stats);

        tokio::spawn(async move {
            while let Ok((stream, client_addr)) = listener.accept().await {
                let processor = CommandProcessor::new(Arc::clone(&store_clone))
                    .with_peer(client_addr.ip().to_string());
                let stats = Arc::clone(&stats_clone);
                tokio::spawn(handle_connection(stream, client_addr, processor, stats));
            }
        });

        (addr, store, stats)
    }

    async fn connect(addr: SocketAddr) -> BufReader<TcpStream> {
        BufReader::new(TcpStream::connect(addr).await.unwrap())
    }

    async fn roundtrip(client: &mut BufReader<TcpStream>, line: &str) -> String {
        client
            .get_mut()
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .unwrap();
        let mut response = String::new();
        client.read_line(&mut response).await.unwrap();
        response.trim_end().to_string()
    }

    #[tokio::test]
    async fn test_shortlink_then_get() {
        let (addr, _, _) = create_test_server().await;
        let mut client = connect(addr).await;

        assert_eq!(
            roundtrip(&mut client, "SHORTLINK ab12cd https://example.com").await,
            "OK"
        );
        assert_eq!(
            roundtrip(&mut client, "GET ab12cd").await,
            "https://example.com"
        );
    }

    #[tokio::test]
    async fn test_pop_on_empty_store() {
        let (addr, _, _) = create_test_server().await;
        let mut client = connect(addr).await;

        assert_eq!(roundtrip(&mut client, "POP").await, "EMPTY");
    }

    #[tokio::test]
    async fn test_sendjson_end_to_end() {
        let (addr, _, _) = create_test_server().await;
        let mut client = connect(addr).await;

        roundtrip(&mut client, "SHORTLINK ab12cd https://example.com").await;
        let json = roundtrip(&mut client, "SENDJSON").await;

        let data: crate::report::ReportData = serde_json::from_str(&json).unwrap();
        assert_eq!(data.entries.len(), 1);
        assert_eq!(data.entries[0].short_url, "ab12cd");
        assert_eq!(data.entries[0].original_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_unknown_command_keeps_connection_open() {
        let (addr, _, _) = create_test_server().await;
        let mut client = connect(addr).await;

        assert_eq!(
            roundtrip(&mut client, "FROB x").await,
            "ERROR: unknown command"
        );
        assert_eq!(
            roundtrip(&mut client, "SHORTLINK k https://example.com").await,
            "OK"
        );
    }

    #[tokio::test]
    async fn test_bad_arguments_touch_nothing() {
        let (addr, store, _) = create_test_server().await;
        let mut client = connect(addr).await;

        assert_eq!(
            roundtrip(&mut client, "SHORTLINK onlykey").await,
            "ERROR: bad arguments"
        );
        assert!(store.lock().unwrap().table.is_empty());
    }

    #[tokio::test]
    async fn test_pipelined_lines_each_get_a_response() {
        let (addr, _, _) = create_test_server().await;
        let mut client = connect(addr).await;

        client
            .get_mut()
            .write_all(b"PUSH a\nPUSH b\nPOP\n")
            .await
            .unwrap();

        let mut responses = Vec::new();
        for _ in 0..3 {
            let mut line = String::new();
            client.read_line(&mut line).await.unwrap();
            responses.push(line.trim_end().to_string());
        }
        assert_eq!(responses, vec!["OK", "OK", "b"]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_keeps_connection_open() {
        let (addr, _, _) = create_test_server().await;
        let mut client = connect(addr).await;

        client.get_mut().write_all(b"\xff\xfe bad\n").await.unwrap();
        let mut line = String::new();
        client.read_line(&mut line).await.unwrap();
        assert_eq!(line.trim_end(), "ERROR: invalid utf-8");

        assert_eq!(roundtrip(&mut client, "PUSH v").await, "OK");
    }

    #[tokio::test]
    async fn test_crlf_terminated_lines() {
        let (addr, _, _) = create_test_server().await;
        let mut client = connect(addr).await;

        client
            .get_mut()
            .write_all(b"PUSH a\r\nPOP\r\n")
            .await
            .unwrap();

        let mut responses = Vec::new();
        for _ in 0..2 {
            let mut line = String::new();
            client.read_line(&mut line).await.unwrap();
            responses.push(line.trim_end().to_string());
        }
        assert_eq!(responses, vec!["OK", "a"]);
    }

    #[tokio::test]
    async fn test_oversized_line_ends_only_that_connection() {
        let (addr, store, _) = create_test_server().await;

        // One unterminated line past the cap. The server may reset the
        // connection mid-write, so the write itself is allowed to fail.
        let mut big = TcpStream::connect(addr).await.unwrap();
        let _ = big.write_all(&vec![b'a'; MAX_BUFFER_SIZE + 8192]).await;

        // The server drops the connection without ever responding.
        let mut buf = [0u8; 64];
        loop {
            match big.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => panic!("server responded to an unterminated line"),
            }
        }

        // Listener and shared store are unaffected.
        let mut client = connect(addr).await;
        assert_eq!(roundtrip(&mut client, "PUSH v").await, "OK");
        assert_eq!(store.lock().unwrap().stack.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_shortlink_get_no_lost_updates() {
        let (addr, store, _) = create_test_server().await;

        const CONNECTIONS: usize = 8;
        const PAIRS: usize = 25;

        let mut handles = Vec::new();
        for c in 0..CONNECTIONS {
            handles.push(tokio::spawn(async move {
                let mut client = connect(addr).await;
                for i in 0..PAIRS {
                    let key = format!("key-{}-{}", c, i);
                    let url = format!("https://example.com/{}-{}", c, i);
                    assert_eq!(
                        roundtrip(&mut client, &format!("SHORTLINK {} {}", key, url)).await,
                        "OK"
                    );
                    assert_eq!(roundtrip(&mut client, &format!("GET {}", key)).await, url);
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.lock().unwrap().table.len(), CONNECTIONS * PAIRS);
    }

    #[tokio::test]
    async fn test_one_connection_error_does_not_stop_listener() {
        let (addr, _, stats) = create_test_server().await;

        // First client disappears abruptly.
        let client = TcpStream::connect(addr).await.unwrap();
        drop(client);

        // A later client still gets served.
        let mut client = connect(addr).await;
        assert_eq!(roundtrip(&mut client, "PUSH v").await, "OK");

        assert!(stats.connections_accepted.load(Ordering::Relaxed) >= 2);
    }

    #[tokio::test]
    async fn test_connection_stats() {
        let (addr, _, stats) = create_test_server().await;

        let mut client = connect(addr).await;
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 1);

        roundtrip(&mut client, "PUSH v").await;
        assert!(stats.commands_processed.load(Ordering::Relaxed) >= 1);

        drop(client);
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
    }
}
