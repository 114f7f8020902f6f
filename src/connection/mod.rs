//! Connection Server
//!
//! Per-connection async tasks over a shared store:
//!
//! ```text
//! ┌───────────────┐  accept   ┌────────────────────────────────────────┐
//! │ TCP Listener  │ ────────> │ ConnectionHandler (one task per client)│
//! │  (main.rs)    │           │  read line -> dispatch under lock ->   │
//! └───────────────┘           │  write one response line               │
//!                             └────────────────────────────────────────┘
//! ```
//!
//! The listener never stops accepting because one connection errors; a
//! handler task's failure is logged and dies with the task.

pub mod handler;

pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
