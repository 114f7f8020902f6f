//! Command Processing
//!
//! The layer between the wire protocol and the store:
//!
//! ```text
//! Client line
//!      │
//!      ▼
//! ┌──────────────┐   parse    ┌───────────────┐  lock + dispatch  ┌────────┐
//! │  protocol    │ ─────────> │ CommandProcessor│ ───────────────> │ Store  │
//! └──────────────┘            └───────────────┘                   └────────┘
//!                                     │
//!                                     ▼
//!                              one Response line
//! ```
//!
//! Exactly one response line per command; parse failures degrade to
//! `ERROR:` responses; the global lock is released before any socket I/O.

pub mod handler;

pub use handler::CommandProcessor;
