//! # LinkStore - An In-Memory Data Store for URL Shortening
//!
//! LinkStore is a command-driven, in-memory data store spoken to over a
//! line-oriented TCP protocol. It was built as the storage backbone of a
//! URL-shortening suite, but the structures it exposes are general: a
//! fixed-capacity hash table, a string set, a stack, and a queue.
//!
//! ## Features
//!
//! - **Line Protocol**: One command per line, one response line per command
//! - **Four Structures**: Hash table, set, stack, and queue in one store
//! - **Persistence**: Snapshot the store to a replayable command file
//! - **Reporting**: `SENDJSON` exports hash-table entries as JSON for the
//!   statistics aggregator
//! - **Async I/O**: Built on Tokio, one task per client connection
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                            LinkStore                               │
//! │                                                                    │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐        │
//! │  │ TCP Server  │───>│ Connection  │───>│ CommandProcessor │        │
//! │  │ (Listener)  │    │  Handler    │    │ (parse+dispatch) │        │
//! │  └─────────────┘    └─────────────┘    └────────┬─────────┘        │
//! │                                                 │ Mutex            │
//! │                                                 ▼                  │
//! │  ┌──────────────────────────────────────────────────────────────┐  │
//! │  │                           Store                              │  │
//! │  │  ┌───────────┐  ┌───────┐  ┌───────┐  ┌───────┐              │  │
//! │  │  │ HashTable │  │  Set  │  │ Stack │  │ Queue │              │  │
//! │  │  └───────────┘  └───────┘  └───────┘  └───────┘              │  │
//! │  └──────────────────────────────────────────────────────────────┘  │
//! │             │ SAVE / load on startup                               │
//! │             ▼                                                      │
//! │        DBMS.txt (replayable command lines)                         │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole store sits behind a single `Mutex`; every command runs to
//! completion under it, so clients observe a strict serial order.
//!
//! ## Supported Commands
//!
//! ### Hash Table
//! - `SHORTLINK key url`
//! - `GET key`
//! - `DEL key`
//!
//! ### Set
//! - `SADD member` / `SREM member` / `SISMEMBER member`
//!
//! ### Stack and Queue
//! - `PUSH value` / `POP`
//! - `ENQUEUE value` / `DEQUEUE`
//!
//! ### Server
//! - `SAVE path`
//! - `SENDJSON`
//!
//! ## Module Overview
//!
//! - [`protocol`]: Command grammar and response types
//! - [`storage`]: The four data structures, the shared store, and snapshots
//! - [`commands`]: Dispatch of parsed commands against the store
//! - [`connection`]: Client connection management
//! - [`shortlink`]: Short-code generation and the store client
//! - [`report`]: JSON report entries and nested detail trees
//! - [`stats`]: The statistics aggregation service

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod report;
pub mod shortlink;
pub mod stats;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandProcessor;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{parse_line, Command, ParseError, Response};
pub use storage::{SharedStore, Store};

/// The default port the store listens on
pub const DEFAULT_PORT: u16 = 6379;

/// The default host the store binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// The default port the statistics aggregator listens on
pub const STATS_PORT: u16 = 9090;

/// Default snapshot file name
pub const SNAPSHOT_FILE: &str = "DBMS.txt";

/// Version of LinkStore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
