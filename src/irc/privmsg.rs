//! Extraction of chat messages from parsed `PRIVMSG` lines.

use super::error::{Error, Result};
use super::message::Message;

/// Sigils recognised as channel prefixes when none are configured.
pub const DEFAULT_CHANNEL_SIGILS: &str = "#";

/// A chat message addressed to a channel or directly to us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivateMessage {
    /// The `user@host` half of the origin, empty when the origin had no `!`.
    pub user: String,
    pub nick: String,
    /// The target token as sent by the server.
    pub channel: String,
    pub text: String,
    /// Where a reply belongs: the channel itself, or the sender's nick when
    /// the message was a private query.
    pub reply_channel: String,
}

impl PrivateMessage {
    /// Build a [`PrivateMessage`] from a parsed `PRIVMSG` line.
    ///
    /// `sigils` lists the characters that mark a target as a channel name
    /// (the server's `CHANTYPES`, usually just `#`).
    pub fn from_message(msg: &Message, sigils: &str) -> Result<Self> {
        let (nick, user) = match msg.origin.split_once('!') {
            Some((nick, user)) => (nick.to_string(), user.to_string()),
            None => (msg.origin.clone(), String::new()),
        };

        let (channel, text) = msg
            .parameters
            .split_once(':')
            .ok_or_else(|| Error::MalformedParameters(msg.parameters.clone()))?;
        let channel = channel.trim().to_string();

        let reply_channel = if is_channel(&channel, sigils) {
            channel.clone()
        } else {
            nick.clone()
        };

        Ok(Self {
            user,
            nick,
            channel,
            text: text.to_string(),
            reply_channel,
        })
    }

    /// Whether the message was sent directly to us rather than to a channel.
    pub fn is_private(&self) -> bool {
        self.reply_channel != self.channel || self.channel == self.nick
    }
}

/// Whether `name` starts with one of the channel `sigils`.
pub fn is_channel(name: &str, sigils: &str) -> bool {
    name.chars().next().is_some_and(|c| sigils.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(line: &str) -> Result<PrivateMessage> {
        PrivateMessage::from_message(&Message::parse(line).unwrap(), DEFAULT_CHANNEL_SIGILS)
    }

    #[test]
    fn channel_message() {
        let pm = extract(":a!b PRIVMSG #c :hello world").unwrap();
        assert_eq!(
            pm,
            PrivateMessage {
                user: "b".into(),
                nick: "a".into(),
                channel: "#c".into(),
                text: "hello world".into(),
                reply_channel: "#c".into(),
            }
        );
        assert!(!pm.is_private());
    }

    #[test]
    fn query_replies_to_sender() {
        let pm = extract(":a!b PRIVMSG a :hello").unwrap();
        assert_eq!(pm.channel, "a");
        assert_eq!(pm.reply_channel, "a");

        let pm = extract(":alice!al@host PRIVMSG shelbot :version").unwrap();
        assert_eq!(pm.channel, "shelbot");
        assert_eq!(pm.reply_channel, "alice");
        assert!(pm.is_private());
    }

    #[test]
    fn origin_without_user() {
        let pm = extract(":services PRIVMSG #c :hi").unwrap();
        assert_eq!(pm.nick, "services");
        assert_eq!(pm.user, "");
    }

    #[test]
    fn text_keeps_later_colons() {
        let pm = extract(":a!b PRIVMSG #c :time is 12:30").unwrap();
        assert_eq!(pm.text, "time is 12:30");
    }

    #[test]
    fn missing_colon_is_malformed() {
        let err = extract(":a!b PRIVMSG #c hello").unwrap_err();
        assert!(matches!(err, Error::MalformedParameters(_)));
    }

    #[test]
    fn configured_sigils() {
        let msg = Message::parse(":a!b PRIVMSG &local :hi").unwrap();
        let pm = PrivateMessage::from_message(&msg, DEFAULT_CHANNEL_SIGILS).unwrap();
        assert_eq!(pm.reply_channel, "a");

        let pm = PrivateMessage::from_message(&msg, "#&").unwrap();
        assert_eq!(pm.reply_channel, "&local");
    }
}
