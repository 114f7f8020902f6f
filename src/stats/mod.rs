//! Statistics Aggregation Service
//!
//! The peer service of the store. It collects short-link entries from two
//! directions:
//!
//! - **push**: clients open a connection to the ingest listener, write one
//!   JSON `ReportData` document, and close; the entries are merged into the
//!   aggregate.
//! - **pull**: the aggregator dials the store, issues `SENDJSON`, and merges
//!   the one-line JSON response.
//!
//! From the accumulated entries it builds nested detail reports
//! (see [`crate::report`]) and writes them to disk as pretty-printed JSON.

pub mod aggregator;

pub use aggregator::{pull_from_store, run_ingest, save_report, Aggregator};
