//! Command Processor
//!
//! Translates one line of text into a typed command, runs it against the
//! shared store under the process-wide lock, and produces exactly one
//! response line — never more, never fewer, regardless of success or
//! failure.
//!
//! The lock is acquired inside [`CommandProcessor::execute`] and released
//! before the response is returned, so socket I/O never happens while the
//! lock is held. Structural misses (missing key, empty stack) are sentinel
//! responses, not errors; they never escalate past this layer.

use std::path::Path;

use crate::protocol::{parse_line, Command, Response};
use crate::report::{current_interval, ReportData, ReportEntry};
use crate::storage::{snapshot, Entry, SharedStore};

/// Executes commands against the shared store.
///
/// One processor is created per connection so it can record the peer
/// address as the provenance of `SHORTLINK` insertions; the store handle
/// itself is shared.
#[derive(Clone)]
pub struct CommandProcessor {
    store: SharedStore,
    /// Peer address recorded on entries inserted through this processor
    peer: String,
}

impl CommandProcessor {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            peer: "local".to_string(),
        }
    }

    /// Records the peer address stamped on SHORTLINK insertions.
    pub fn with_peer(mut self, peer: impl Into<String>) -> Self {
        self.peer = peer.into();
        self
    }

    /// Parses and executes one command line.
    pub fn execute(&self, line: &str) -> Response {
        let command = match parse_line(line) {
            Ok(command) => command,
            // Malformed input degrades to an error response; no structure
            // is touched and the connection stays usable.
            Err(e) => return e.into(),
        };

        self.dispatch(command)
    }

    /// Runs a parsed command under the global lock.
    fn dispatch(&self, command: Command) -> Response {
        let mut store = self.store.lock().unwrap();

        match command {
            Command::ShortLink { key, url } => {
                store
                    .table
                    .put(key, url, self.peer.clone(), current_interval());
                Response::Ok
            }
            Command::Get { key } => match store.table.touch(&key) {
                Some(value) => Response::Value(value.to_string()),
                None => Response::NotFound,
            },
            Command::Del { key } => {
                if store.table.delete(&key) {
                    Response::Ok
                } else {
                    Response::NotFound
                }
            }
            Command::SetAdd { member } => {
                if store.set.add(member) {
                    Response::Ok
                } else {
                    Response::Exists
                }
            }
            Command::SetRemove { member } => {
                if store.set.remove(&member) {
                    Response::Ok
                } else {
                    Response::NotFound
                }
            }
            Command::SetContains { member } => Response::Flag(store.set.contains(&member)),
            Command::Push { value } => {
                store.stack.push(value);
                Response::Ok
            }
            Command::Pop => match store.stack.pop() {
                Some(value) => Response::Value(value),
                None => Response::Empty,
            },
            Command::Enqueue { value } => {
                store.queue.enqueue(value);
                Response::Ok
            }
            Command::Dequeue => match store.queue.dequeue() {
                Some(value) => Response::Value(value),
                None => Response::Empty,
            },
            Command::Save { path } => match snapshot::save(&store, Path::new(&path)) {
                Ok(()) => Response::Ok,
                // A failed save is reported to the caller; in-memory state
                // is untouched and the store stays usable.
                Err(e) => Response::error(format!("save failed: {}", e)),
            },
            Command::SendJson => {
                let data = ReportData {
                    entries: store.table.iter().map(entry_to_report).collect(),
                };
                match serde_json::to_string(&data) {
                    Ok(json) => Response::Json(json),
                    Err(e) => Response::error(format!("serialize failed: {}", e)),
                }
            }
        }
    }
}

/// Maps a table entry onto the wire-level report schema.
fn entry_to_report(entry: &Entry) -> ReportEntry {
    ReportEntry {
        id: entry.id,
        pid: None,
        original_url: entry.value.clone(),
        short_url: entry.key.clone(),
        source_ip: entry.source_ip.clone(),
        time_interval: entry.time_interval.clone(),
        count: entry.hits,
    }
}
