//! Snapshot Persistence
//!
//! The store is persisted as a sequence of replayable command lines — the
//! same grammar clients speak over TCP:
//!
//! ```text
//! SHORTLINK ab12cd https://example.com
//! SADD member
//! PUSH value
//! ENQUEUE value
//! ```
//!
//! The stack is written bottom-to-top and the queue head-to-tail, so
//! replaying the file in order reconstructs both exactly.
//!
//! Saves go to a temporary sibling file first and are renamed into place, so
//! a crash mid-save leaves the previous snapshot intact. Loading a missing
//! file yields an empty store — a fresh deployment is not an error.
//! Unparseable lines are logged and skipped rather than aborting the load.
//!
//! Entry provenance (ids, source addresses, hit counts) is not part of the
//! command grammar and therefore does not survive a restart; key/value
//! content, set membership, and stack/queue order do.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use crate::protocol::{parse_line, Command};
use crate::report::current_interval;
use crate::storage::Store;

/// Source address recorded on entries reconstructed from a snapshot.
const REPLAY_SOURCE: &str = "snapshot";

/// Serializes the whole store to `path`, overwriting any previous snapshot.
///
/// Writes to `<path>.tmp` and renames into place.
pub fn save(store: &Store, path: &Path) -> io::Result<()> {
    let mut out = String::new();

    for entry in store.table.iter() {
        let _ = writeln!(out, "SHORTLINK {} {}", entry.key, entry.value);
    }
    for member in store.set.iter() {
        let _ = writeln!(out, "SADD {}", member);
    }
    for value in store.stack.iter() {
        let _ = writeln!(out, "PUSH {}", value);
    }
    for value in store.queue.iter() {
        let _ = writeln!(out, "ENQUEUE {}", value);
    }

    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");

    fs::write(&tmp, &out)?;
    fs::rename(&tmp, path)?;

    info!(path = %path.display(), bytes = out.len(), "Snapshot saved");
    Ok(())
}

/// Reconstructs a store from a snapshot file.
///
/// A missing file yields an empty store. I/O failures other than
/// not-found are propagated.
pub fn load(path: &Path) -> io::Result<Store> {
    let mut store = Store::new();

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No snapshot found, starting empty");
            return Ok(store);
        }
        Err(e) => return Err(e),
    };

    let mut replayed = 0usize;
    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(command) => {
                replay(&mut store, command);
                replayed += 1;
            }
            Err(e) => warn!(line, error = %e, "Skipping unparseable snapshot line"),
        }
    }

    info!(path = %path.display(), commands = replayed, "Snapshot loaded");
    Ok(store)
}

/// Applies one snapshot command to the store being rebuilt.
fn replay(store: &mut Store, command: Command) {
    match command {
        Command::ShortLink { key, url } => {
            store
                .table
                .put(key, url, REPLAY_SOURCE.to_string(), current_interval());
        }
        Command::SetAdd { member } => {
            store.set.add(member);
        }
        Command::Push { value } => store.stack.push(value),
        Command::Enqueue { value } => store.queue.enqueue(value),
        // save() only ever emits the four mutating commands above; anything
        // else in the file is noise.
        other => warn!(command = ?other, "Ignoring non-snapshot command during replay"),
    }
}
