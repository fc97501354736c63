pub mod model;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

pub use model::{AppConfig, BotConfig, LoggingConfig, ProtocolConfig, ServerConfig};

use crate::irc::framing::PROTOCOL_MAX_LINE_LENGTH;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "SHELBOT_CONFIG";

const MIN_LINE_LENGTH: usize = 64;

pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shelbot")
        .join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

/// Load and validate the config at `path`. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let mut config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    validate(&mut config)?;
    Ok(config)
}

/// Check ranges and normalise the channel name.
pub fn validate(config: &mut AppConfig) -> Result<()> {
    if config.server.port == 0 {
        bail!("The port option must be a number between 1 and 65535");
    }
    if config.server.host.trim().is_empty() {
        bail!("The host option must not be empty");
    }
    if config.bot.nick.trim().is_empty() || config.bot.nick.contains(char::is_whitespace) {
        bail!("The nick option must be a single non-empty word");
    }
    let len = config.protocol.max_line_length;
    if !(MIN_LINE_LENGTH..=PROTOCOL_MAX_LINE_LENGTH).contains(&len) {
        bail!(
            "max_line_length must be between {} and {}, got {}",
            MIN_LINE_LENGTH,
            PROTOCOL_MAX_LINE_LENGTH,
            len
        );
    }
    if config.protocol.channel_sigils.is_empty() {
        bail!("channel_sigils must name at least one channel prefix");
    }
    if !config.bot.channel.starts_with('#') {
        config.bot.channel = format!("#{}", config.bot.channel);
    }
    Ok(())
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}
