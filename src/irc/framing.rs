//! Outbound line construction.
//!
//! Builders return a single protocol line without its `\r\n` terminator;
//! the connection appends it on write. Any `\r` or `\n` inside an argument
//! is replaced with a space so one call can never produce two lines.

use std::borrow::Cow;

use super::error::{Error, Result};

/// Default ceiling for an outbound line, terminator excluded.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 400;

/// RFC 1459 allows 512 bytes per line including `\r\n`.
pub const PROTOCOL_MAX_LINE_LENGTH: usize = 510;

fn sanitize(arg: &str) -> Cow<'_, str> {
    if arg.contains(['\r', '\n']) {
        Cow::Owned(arg.replace(['\r', '\n'], " "))
    } else {
        Cow::Borrowed(arg)
    }
}

/// `USER <nick> 8 * :<real name>`
pub fn user(nick: &str, real_name: &str) -> String {
    format!("USER {} 8 * :{}", sanitize(nick), sanitize(real_name))
}

pub fn nick(nick: &str) -> String {
    format!("NICK {}", sanitize(nick))
}

/// `JOIN <channel> [<key>]`
pub fn join(channel: &str, key: &str) -> String {
    let mut line = format!("JOIN {}", sanitize(channel));
    if !key.is_empty() {
        line.push(' ');
        line.push_str(&sanitize(key));
    }
    line
}

/// `JOIN <channel> [<key>] 0`, the trailing `0` being the exclusive limit
/// sentinel.
pub fn join_exclusive(channel: &str, key: &str) -> String {
    let mut line = join(channel, key);
    line.push_str(" 0");
    line
}

/// `PART <channel> [:<message>]`
pub fn part(channel: &str, message: &str) -> String {
    if message.is_empty() {
        format!("PART {}", sanitize(channel))
    } else {
        format!("PART {} :{}", sanitize(channel), sanitize(message))
    }
}

/// `QUIT [:<message>]`
pub fn quit(message: &str) -> String {
    if message.is_empty() {
        "QUIT".to_string()
    } else {
        format!("QUIT :{}", sanitize(message))
    }
}

/// `PONG <argument>`, echoing a server `PING` with its `:` stripped. A bare
/// `PING` gets a bare `PONG`.
pub fn pong(argument: &str) -> String {
    let argument = argument.trim_start_matches(':');
    if argument.is_empty() {
        "PONG".to_string()
    } else {
        format!("PONG {}", sanitize(argument))
    }
}

/// Frame `text` into as many `PRIVMSG <target> :<text>` lines as needed to
/// keep each line within `limit` bytes.
///
/// Text is only ever cut at whitespace; the whitespace at the cut is
/// dropped. A word that cannot fit on a line of its own is an error and no
/// lines are produced. Empty text produces no lines.
pub fn frame_privmsg(target: &str, text: &str, limit: usize) -> Result<Vec<String>> {
    let text = sanitize(text);
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let prefix = format!("PRIVMSG {} :", sanitize(target));
    let budget = limit
        .checked_sub(prefix.len())
        .filter(|b| *b > 0)
        .ok_or_else(|| Error::Framing {
            limit,
            reason: format!("target {target:?} leaves no room for text"),
        })?;

    let mut lines = Vec::new();
    let mut rest: &str = &text;
    while !rest.is_empty() {
        if rest.len() <= budget {
            lines.push(format!("{prefix}{rest}"));
            break;
        }

        let cut = rest
            .char_indices()
            .take_while(|(i, _)| *i <= budget)
            .filter(|(_, c)| c.is_whitespace())
            .last()
            .map(|(i, _)| i);

        let Some(cut) = cut else {
            let word = rest.split_whitespace().next().unwrap_or(rest);
            return Err(Error::Framing {
                limit,
                reason: format!(
                    "word of {} bytes exceeds the {} bytes left after the PRIVMSG prefix",
                    word.len(),
                    budget
                ),
            });
        };

        let chunk = rest[..cut].trim_end();
        if !chunk.is_empty() {
            lines.push(format!("{prefix}{chunk}"));
        }
        rest = rest[cut..].trim_start();
    }

    Ok(lines)
}
