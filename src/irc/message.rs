//! Inbound line parsing.
//!
//! A raw line is split on whitespace into an optional `:origin`, a command
//! or numeric reply code, and the remaining parameter tokens. Parameters
//! are kept as a single string re-joined with single spaces, so runs of
//! whitespace inside trailing text collapse to one space.

use super::error::{Error, Result};

/// A parsed inbound protocol line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Sender prefix without the leading `:`. Empty when the line had none.
    pub origin: String,
    /// Named command. Empty when the line carried a numeric reply.
    pub command: String,
    /// Numeric reply code, `0` when the line carried a named command. Any
    /// base-10 integer token counts, sign included, not only three-digit
    /// replies.
    pub reply_code: i64,
    /// Everything after the command token, single-space separated.
    pub parameters: String,
}

impl Message {
    /// Parse a single line (without its terminator).
    pub fn parse(raw: &str) -> Result<Self> {
        let mut tokens = raw.split_whitespace().peekable();

        let origin = match tokens.next_if(|t| t.starts_with(':')) {
            Some(prefix) => prefix[1..].to_string(),
            None => String::new(),
        };

        let rest: Vec<&str> = tokens.collect();
        if rest.len() < 2 {
            return Err(Error::MalformedMessage(raw.to_string()));
        }

        let (command, reply_code) = match rest[0].parse::<i64>() {
            Ok(code) => (String::new(), code),
            Err(_) => (rest[0].to_string(), 0),
        };

        Ok(Self {
            origin,
            command,
            reply_code,
            parameters: rest[1..].join(" "),
        })
    }

    /// Whether this message carries a numeric reply instead of a command.
    pub fn is_numeric(&self) -> bool {
        self.command.is_empty()
    }
}
