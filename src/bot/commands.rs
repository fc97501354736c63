//! Bot command parser.
//!
//! Turns the text of a [`PrivateMessage`] into a typed [`BotCommand`]. In a
//! channel, commands must be addressed to the bot (`shelbot version`,
//! `shelbot: version`); in a private query the bare command is enough.
//! Any message ending in `++` or `--` adjusts karma instead.

use super::convert::Unit;
use crate::irc::PrivateMessage;

/// Names listed by `help`, in display order.
pub const COMMAND_NAMES: &[&str] = &[
    "help",
    "version",
    "query",
    "topten",
    "bottomten",
    "convertmph",
    "convertkmh",
    "convertc",
    "convertf",
];

/// A parsed bot command.
#[derive(Debug, Clone, PartialEq)]
pub enum BotCommand {
    Help,
    Version,
    Query { items: Vec<String> },
    TopTen,
    BottomTen,
    /// `value` is `None` when no number was given.
    Convert { unit: Unit, value: Option<f64> },
    Karma { item: String, delta: KarmaDelta },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KarmaDelta {
    Up,
    Down,
}

/// Parse `pm` as seen by a bot called `nick`.
///
/// Returns `None` for ordinary chatter and unknown commands.
pub fn parse_command(pm: &PrivateMessage, nick: &str) -> Option<BotCommand> {
    let text = pm.text.trim();

    let words: Vec<&str> = text.split_whitespace().collect();
    let args = match words.first() {
        Some(first) if is_address(first, nick) => Some(&words[1..]),
        Some(_) if pm.is_private() => Some(&words[..]),
        _ => None,
    };
    if let Some(command) = args.and_then(parse_words) {
        return Some(command);
    }

    parse_karma(text)
}

fn is_address(word: &str, nick: &str) -> bool {
    word.trim_end_matches([':', ',']).eq_ignore_ascii_case(nick)
}

fn parse_words(words: &[&str]) -> Option<BotCommand> {
    let (cmd, args) = words.split_first()?;
    let value = || args.first().and_then(|v| v.parse::<f64>().ok()).filter(|v| v.is_finite());

    match cmd.to_lowercase().as_str() {
        "help" => Some(BotCommand::Help),
        "version" => Some(BotCommand::Version),
        "query" => Some(BotCommand::Query {
            items: args.iter().map(|s| s.to_string()).collect(),
        }),
        "topten" => Some(BotCommand::TopTen),
        "bottomten" => Some(BotCommand::BottomTen),
        "convertmph" => Some(BotCommand::Convert { unit: Unit::Mph, value: value() }),
        "convertkmh" => Some(BotCommand::Convert { unit: Unit::Kmh, value: value() }),
        "convertc" => Some(BotCommand::Convert { unit: Unit::Celsius, value: value() }),
        "convertf" => Some(BotCommand::Convert { unit: Unit::Fahrenheit, value: value() }),
        _ => None,
    }
}

/// `foo++` / `foo--`, using the last word of the message.
fn parse_karma(text: &str) -> Option<BotCommand> {
    let delta = if text.ends_with("++") {
        KarmaDelta::Up
    } else if text.ends_with("--") {
        KarmaDelta::Down
    } else {
        return None;
    };

    let item = text
        .split_whitespace()
        .last()?
        .trim_matches([':', '+', '-']);
    if item.is_empty() {
        return None;
    }
    Some(BotCommand::Karma {
        item: item.to_string(),
        delta,
    })
}
