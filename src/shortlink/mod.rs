//! Short-Link Generation and Store Client
//!
//! The shortener is an external collaborator of the store: it generates a
//! random short code, opens a short-lived TCP connection, issues one command
//! line, and reads the single response line back. It owns no concurrency or
//! persistence concerns itself.

pub mod client;

pub use client::{generate_code, StoreClient, CODE_LEN};
