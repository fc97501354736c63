use anyhow::{Context, Result};
use shelbot::bot::karma::KarmaStore;
use shelbot::bot::{Bot, VERSION};
use shelbot::config::{self, AppConfig};
use shelbot::irc::Client;
use shelbot::logging;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

/// How long to wait for the dispatch loop after sending `QUIT`.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load_config()?;
    let log_file = logging::init(&cfg.logging)?;
    info!(version = VERSION, log_file = ?log_file, "Starting shelbot");

    let karma_path = config::expand_home(&cfg.bot.karma_file);
    let karma = KarmaStore::load(&karma_path).context("Error loading karma DB")?;
    info!(entries = karma.len(), path = %karma_path.display(), "Karma loaded");

    if let Err(e) = run_bot(cfg, karma, karma_path).await {
        error!(error = %format!("{:#}", e), "shelbot exiting on error");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run_bot(cfg: AppConfig, karma: KarmaStore, karma_path: PathBuf) -> Result<()> {
    let stream = TcpStream::connect((cfg.server.host.as_str(), cfg.server.port))
        .await
        .with_context(|| {
            format!(
                "Failed to connect to IRC server {}:{}",
                cfg.server.host, cfg.server.port
            )
        })?;
    info!(server = %cfg.server.host, peer = ?stream.peer_addr().ok(), "Connected to IRC server");

    let (client, events) = Client::new(stream, cfg.protocol.client_config());
    let client = Arc::new(client);

    let mut listener = tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.listen().await }
    });

    // Generic server traffic is only logged.
    let mut messages = events.messages;
    tokio::spawn(async move {
        while let Some(msg) = messages.recv().await {
            debug!(
                origin = %msg.origin,
                command = %msg.command,
                code = msg.reply_code,
                params = %msg.parameters,
                "server message"
            );
        }
    });

    client.connect(&cfg.bot.nick, &cfg.bot.real_name).await?;
    client.join(&cfg.bot.channel, &cfg.bot.channel_key).await?;
    client
        .send(
            &cfg.bot.channel,
            &format!("{} version {} reporting for duty.", cfg.bot.nick, VERSION),
        )
        .await?;

    let mut bot = Bot::new(
        Arc::clone(&client),
        cfg.bot.clone(),
        karma,
        Some(karma_path),
    );

    let outcome: Result<()> = tokio::select! {
        _ = shutdown_signal() => {
            info!("Received shutdown signal, exiting");
            Ok(())
        }
        joined = &mut listener => match joined {
            Ok(Ok(())) => {
                info!("Connection closed");
                Ok(())
            }
            Ok(Err(e)) => Err(e).context("Lost connection to IRC server"),
            Err(e) => Err(e).context("Dispatch loop panicked"),
        },
        result = bot.run(events.private_messages) => {
            result.context("Failed to reply")
        }
    };

    if let Err(e) = client.quit(&cfg.bot.quit_message).await {
        warn!(error = %e, "QUIT not delivered");
    }
    if tokio::time::timeout(SHUTDOWN_GRACE, client.wait_stopped())
        .await
        .is_err()
    {
        warn!("Dispatch loop did not stop in time");
    }

    bot.save_karma().context("Error saving karma db")?;
    info!("Karma saved");

    outcome
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
