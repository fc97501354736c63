//! The karma bot: consumes private messages from the client and replies
//! through its send operations.

pub mod commands;
pub mod convert;
pub mod karma;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::BotConfig;
use crate::irc::{self, Client, PrivateMessage};
use commands::{parse_command, BotCommand, KarmaDelta, COMMAND_NAMES};
use karma::KarmaStore;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const RANKING_SIZE: usize = 10;

pub struct Bot<T> {
    client: Arc<Client<T>>,
    config: BotConfig,
    karma: KarmaStore,
    karma_path: Option<PathBuf>,
}

impl<T> Bot<T>
where
    T: AsyncRead + AsyncWrite,
{
    /// `karma_path` is where the store is saved after every change; `None`
    /// keeps karma in memory only.
    pub fn new(
        client: Arc<Client<T>>,
        config: BotConfig,
        karma: KarmaStore,
        karma_path: Option<PathBuf>,
    ) -> Self {
        Self {
            client,
            config,
            karma,
            karma_path,
        }
    }

    pub fn karma(&self) -> &KarmaStore {
        &self.karma
    }

    /// Persist the karma store, if it has a path.
    pub fn save_karma(&self) -> anyhow::Result<()> {
        match &self.karma_path {
            Some(path) => self.karma.save(path),
            None => Ok(()),
        }
    }

    /// Handle private messages until the queue closes or a send hits a
    /// transport error.
    pub async fn run(&mut self, mut private_messages: mpsc::Receiver<PrivateMessage>) -> irc::Result<()> {
        while let Some(pm) = private_messages.recv().await {
            match self.handle(&pm).await {
                Ok(()) => {}
                Err(e @ irc::Error::Transport(_)) => return Err(e),
                Err(e) => warn!(error = %e, reply_to = %pm.reply_channel, "reply failed"),
            }
        }
        Ok(())
    }

    pub async fn handle(&mut self, pm: &PrivateMessage) -> irc::Result<()> {
        let Some(command) = parse_command(pm, &self.config.nick) else {
            return Ok(());
        };
        info!(nick = %pm.nick, channel = %pm.channel, ?command, "command");
        let to = pm.reply_channel.as_str();

        match command {
            BotCommand::Help => {
                let names: Vec<String> = COMMAND_NAMES.iter().map(|c| format!("\"{}\"", c)).collect();
                self.client
                    .send(to, &format!("{} commands available: {}", self.config.nick, names.join(", ")))
                    .await?;
                self.client
                    .send(to, "Karma can be adjusted thusly: \"foo++\" and \"bar--\"")
                    .await
            }
            BotCommand::Version => {
                self.client
                    .send(to, &format!("{} version {}.", self.config.nick, VERSION))
                    .await
            }
            BotCommand::Query { items } => {
                for item in items {
                    let reply = format!("Karma for {} is {}.", item, self.karma.query(&item));
                    self.client.send(to, &reply).await?;
                }
                Ok(())
            }
            BotCommand::TopTen => self.send_ranking(to, self.karma.top(RANKING_SIZE)).await,
            BotCommand::BottomTen => {
                self.send_ranking(to, self.karma.bottom(RANKING_SIZE)).await
            }
            BotCommand::Convert { unit, value } => {
                let reply = match value {
                    Some(value) => convert::describe(unit, value),
                    None => "Please provide a value.".to_string(),
                };
                self.client.send(to, &reply).await
            }
            BotCommand::Karma { item, delta } => {
                let total = match delta {
                    KarmaDelta::Up => self.karma.increment(&item),
                    KarmaDelta::Down => self.karma.decrement(&item),
                };
                if let Err(e) = self.save_karma() {
                    error!(error = %e, "Error saving karma db");
                }
                self.client
                    .send(to, &format!("Karma for {} now {}", item, total))
                    .await
            }
        }
    }

    async fn send_ranking(&self, to: &str, ranking: Vec<(&str, i64)>) -> irc::Result<()> {
        for (item, score) in ranking {
            self.client
                .send(to, &format!("Karma for {} is {}.", item, score))
                .await?;
        }
        Ok(())
    }
}
