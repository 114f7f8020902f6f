//! Command Line Parser
//!
//! Turns one line of text into a typed [`Command`]. Tokens are split on
//! whitespace; the first token is the command name and is case-sensitive.
//!
//! The parser never panics on bad input. A wrong argument count or an
//! unknown command name comes back as a [`ParseError`], which the command
//! processor turns into a one-line `ERROR:` response without touching any
//! structure — the connection stays open for further commands.

use thiserror::Error;

use crate::protocol::types::{Command, Response};

/// Errors produced while parsing a command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line contained no tokens
    #[error("empty command line")]
    EmptyLine,

    /// The first token is not a known command name
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// A known command with the wrong number of arguments
    #[error("wrong number of arguments for '{0}'")]
    BadArguments(&'static str),
}

impl From<ParseError> for Response {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnknownCommand(_) => Response::error("unknown command"),
            ParseError::EmptyLine | ParseError::BadArguments(_) => {
                Response::error("bad arguments")
            }
        }
    }
}

/// Parses one command line into a [`Command`].
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next().ok_or(ParseError::EmptyLine)?;
    let args: Vec<&str> = tokens.collect();

    match name {
        "SHORTLINK" => match args.as_slice() {
            [key, url] => Ok(Command::ShortLink {
                key: (*key).to_string(),
                url: (*url).to_string(),
            }),
            _ => Err(ParseError::BadArguments("SHORTLINK")),
        },
        "GET" => match args.as_slice() {
            [key] => Ok(Command::Get {
                key: (*key).to_string(),
            }),
            _ => Err(ParseError::BadArguments("GET")),
        },
        "DEL" => match args.as_slice() {
            [key] => Ok(Command::Del {
                key: (*key).to_string(),
            }),
            _ => Err(ParseError::BadArguments("DEL")),
        },
        "SADD" => match args.as_slice() {
            [member] => Ok(Command::SetAdd {
                member: (*member).to_string(),
            }),
            _ => Err(ParseError::BadArguments("SADD")),
        },
        "SREM" => match args.as_slice() {
            [member] => Ok(Command::SetRemove {
                member: (*member).to_string(),
            }),
            _ => Err(ParseError::BadArguments("SREM")),
        },
        "SISMEMBER" => match args.as_slice() {
            [member] => Ok(Command::SetContains {
                member: (*member).to_string(),
            }),
            _ => Err(ParseError::BadArguments("SISMEMBER")),
        },
        "PUSH" => match args.as_slice() {
            [value] => Ok(Command::Push {
                value: (*value).to_string(),
            }),
            _ => Err(ParseError::BadArguments("PUSH")),
        },
        "POP" => match args.as_slice() {
            [] => Ok(Command::Pop),
            _ => Err(ParseError::BadArguments("POP")),
        },
        "ENQUEUE" => match args.as_slice() {
            [value] => Ok(Command::Enqueue {
                value: (*value).to_string(),
            }),
            _ => Err(ParseError::BadArguments("ENQUEUE")),
        },
        "DEQUEUE" => match args.as_slice() {
            [] => Ok(Command::Dequeue),
            _ => Err(ParseError::BadArguments("DEQUEUE")),
        },
        "SAVE" => match args.as_slice() {
            [path] => Ok(Command::Save {
                path: (*path).to_string(),
            }),
            _ => Err(ParseError::BadArguments("SAVE")),
        },
        "SENDJSON" => match args.as_slice() {
            [] => Ok(Command::SendJson),
            _ => Err(ParseError::BadArguments("SENDJSON")),
        },
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}
