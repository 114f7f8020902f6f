//! Report Data Model
//!
//! The JSON vocabulary shared by the store's `SENDJSON` command and the
//! statistics aggregator: flat short-link entries going over the wire, and
//! the nested detail tree the aggregator builds from them.

pub mod tree;

pub use tree::{build_tree, current_interval, DetailReport, Dimension, ReportData, ReportEntry};
