//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a sensible default so the bot starts with an empty file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::irc::framing::DEFAULT_MAX_LINE_LENGTH;
use crate::irc::privmsg::DEFAULT_CHANNEL_SIGILS;
use crate::irc::ClientConfig;

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where to connect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Identity and behaviour of the bot on the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_nick")]
    pub nick: String,
    #[serde(default = "default_real_name")]
    pub real_name: String,
    /// Channel joined after registration. A leading `#` is added if missing.
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default)]
    pub channel_key: String,
    #[serde(default = "default_quit_message")]
    pub quit_message: String,
    /// Karma database path; `~/` is expanded.
    #[serde(default = "default_karma_file")]
    pub karma_file: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            nick: default_nick(),
            real_name: default_real_name(),
            channel: default_channel(),
            channel_key: String::new(),
            quit_message: default_quit_message(),
            karma_file: default_karma_file(),
        }
    }
}

/// Line protocol tunables passed through to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Pause after every outbound line, in milliseconds.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Channel-type prefixes, as advertised by the server's `CHANTYPES`.
    #[serde(default = "default_channel_sigils")]
    pub channel_sigils: String,
    #[serde(default = "default_message_buffer")]
    pub message_buffer: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            pause_ms: default_pause_ms(),
            max_line_length: default_max_line_length(),
            channel_sigils: default_channel_sigils(),
            message_buffer: default_message_buffer(),
        }
    }
}

impl ProtocolConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            pause: Duration::from_millis(self.pause_ms),
            max_line_length: self.max_line_length,
            channel_sigils: self.channel_sigils.clone(),
            message_buffer: self.message_buffer,
            ..ClientConfig::default()
        }
    }
}

/// Diagnostic log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for daily log files; `~/` is expanded.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            filter: default_filter(),
        }
    }
}

fn default_host() -> String {
    "irc.libera.chat".to_string()
}
fn default_port() -> u16 {
    6667
}
fn default_nick() -> String {
    "shelbot".to_string()
}
fn default_real_name() -> String {
    "Sheldon Cooper".to_string()
}
fn default_channel() -> String {
    "#shelbot".to_string()
}
fn default_quit_message() -> String {
    "Bazinga!".to_string()
}
fn default_karma_file() -> String {
    "~/.shelbot.json".to_string()
}
fn default_pause_ms() -> u64 {
    1000
}
fn default_max_line_length() -> usize {
    DEFAULT_MAX_LINE_LENGTH
}
fn default_channel_sigils() -> String {
    DEFAULT_CHANNEL_SIGILS.to_string()
}
fn default_message_buffer() -> usize {
    16
}
fn default_log_dir() -> String {
    "~/.local/share/shelbot/logs".to_string()
}
fn default_filter() -> String {
    "shelbot=info".to_string()
}
