//! Command and Response Types
//!
//! The wire protocol is newline-delimited UTF-8 text: a client writes one
//! command line, the server writes exactly one response line back.
//!
//! `Command` is a closed tagged variant — parsing produces a typed command,
//! and the processor matches it exhaustively. "Unknown command" is a parse
//! error, not a fallthrough arm.
//!
//! ## Grammar
//!
//! | Command     | Args                      | Response                  |
//! |-------------|---------------------------|---------------------------|
//! | `SHORTLINK` | `<shortKey> <originalURL>`| `OK`                      |
//! | `GET`       | `<key>`                   | value or `NOT FOUND`      |
//! | `DEL`       | `<key>`                   | `OK` or `NOT FOUND`       |
//! | `SADD`      | `<member>`                | `OK` or `EXISTS`          |
//! | `SREM`      | `<member>`                | `OK` or `NOT FOUND`       |
//! | `SISMEMBER` | `<member>`                | `1` or `0`                |
//! | `PUSH`      | `<value>`                 | `OK`                      |
//! | `POP`       | —                         | value or `EMPTY`          |
//! | `ENQUEUE`   | `<value>`                 | `OK`                      |
//! | `DEQUEUE`   | —                         | value or `EMPTY`          |
//! | `SAVE`      | `<filename>`              | `OK` or error text        |
//! | `SENDJSON`  | —                         | one-line JSON document    |

use std::fmt;

/// A parsed command, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `SHORTLINK <shortKey> <originalURL>` — insert/overwrite in the table
    ShortLink { key: String, url: String },
    /// `GET <key>` — table lookup
    Get { key: String },
    /// `DEL <key>` — table delete
    Del { key: String },
    /// `SADD <member>` — set add
    SetAdd { member: String },
    /// `SREM <member>` — set remove
    SetRemove { member: String },
    /// `SISMEMBER <member>` — set membership test
    SetContains { member: String },
    /// `PUSH <value>` — stack push
    Push { value: String },
    /// `POP` — stack pop
    Pop,
    /// `ENQUEUE <value>` — queue tail append
    Enqueue { value: String },
    /// `DEQUEUE` — queue head removal
    Dequeue,
    /// `SAVE <filename>` — persist a snapshot of the whole store
    Save { path: String },
    /// `SENDJSON` — serialize all short-link entries as a JSON document
    SendJson,
}

/// One response line. Every command produces exactly one of these — never
/// more, never fewer, regardless of success or failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `OK`
    Ok,
    /// `NOT FOUND` — key or member absent
    NotFound,
    /// `EXISTS` — set member already present
    Exists,
    /// `EMPTY` — pop/dequeue on an empty structure
    Empty,
    /// `1` / `0` — membership test result
    Flag(bool),
    /// A stored value
    Value(String),
    /// A one-line JSON document
    Json(String),
    /// `ERROR: ...` — malformed command or failed save
    Error(String),
}

impl Response {
    /// Convenience constructor for `ERROR:` responses.
    pub fn error(msg: impl Into<String>) -> Self {
        Response::Error(format!("ERROR: {}", msg.into()))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    /// Serializes the response as a newline-terminated wire line.
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok => write!(f, "OK"),
            Response::NotFound => write!(f, "NOT FOUND"),
            Response::Exists => write!(f, "EXISTS"),
            Response::Empty => write!(f, "EMPTY"),
            Response::Flag(true) => write!(f, "1"),
            Response::Flag(false) => write!(f, "0"),
            Response::Value(s) => write!(f, "{}", s),
            Response::Json(s) => write!(f, "{}", s),
            Response::Error(s) => write!(f, "{}", s),
        }
    }
}
