//! Wire Protocol
//!
//! A line-oriented text protocol: one newline-terminated command in, exactly
//! one newline-terminated response out.
//!
//! - `types`: the closed [`Command`] variant and the [`Response`] line
//! - `parser`: whitespace-token line parser with typed errors

pub mod parser;
pub mod types;

pub use parser::{parse_line, ParseError};
pub use types::{Command, Response};
