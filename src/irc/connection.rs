//! The client connection: outbound framing over a shared writer, the
//! inbound dispatch loop, and the stop/wait lifecycle.
//!
//! A [`Client`] is built on an already-connected byte stream. The stream is
//! split into independent halves: [`Client::listen`] owns the read half for
//! the lifetime of the loop, while every outbound operation serialises on a
//! mutex around the write half. Each written line is followed by the
//! configured pause with the writer still held, so the pause throttles the
//! connection as a whole.
//!
//! Inbound lines are routed to the two queues handed out as [`Events`]:
//! chat messages are delivered with a blocking hand-off (the loop waits for
//! the consumer), everything else is offered without waiting and dropped
//! when the queue is full.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info, trace, warn};

use super::error::{is_closed, Error, Result};
use super::framing::{self, DEFAULT_MAX_LINE_LENGTH, PROTOCOL_MAX_LINE_LENGTH};
use super::message::Message;
use super::privmsg::{PrivateMessage, DEFAULT_CHANNEL_SIGILS};
use super::reader::{Inbound, LineReader};

/// Tunables for a [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Delay after every written line.
    pub pause: Duration,
    /// Outbound line ceiling, terminator excluded. Clamped to 510.
    pub max_line_length: usize,
    /// Characters that mark a `PRIVMSG` target as a channel.
    pub channel_sigils: String,
    /// Capacity of the generic message queue.
    pub message_buffer: usize,
    /// Capacity of the private message queue.
    pub private_message_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs(1),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            channel_sigils: DEFAULT_CHANNEL_SIGILS.to_string(),
            message_buffer: 16,
            private_message_buffer: 1,
        }
    }
}

/// The receiving ends of a client's delivery queues.
pub struct Events {
    /// Best-effort stream of everything that is not a `PRIVMSG`.
    pub messages: mpsc::Receiver<Message>,
    /// Every `PRIVMSG`, in server order. Never dropped while the receiver lives.
    pub private_messages: mpsc::Receiver<PrivateMessage>,
}

/// Where the dispatch loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// [`Client::listen`] has not been called yet.
    Idle,
    Running,
    /// Stop was signalled; the loop exits at its next suspension point.
    Stopping,
    Stopped,
}

pub struct Client<T> {
    writer: Mutex<WriteHalf<T>>,
    reader: Mutex<Option<ReadHalf<T>>>,
    config: ClientConfig,
    quit_sent: AtomicBool,
    stop_fired: AtomicBool,
    stop_tx: watch::Sender<bool>,
    state_tx: watch::Sender<LoopState>,
    messages: mpsc::Sender<Message>,
    private_messages: mpsc::Sender<PrivateMessage>,
}

impl<T> Client<T>
where
    T: AsyncRead + AsyncWrite,
{
    /// Bind a client to an already-open transport.
    pub fn new(io: T, mut config: ClientConfig) -> (Self, Events) {
        config.max_line_length = config.max_line_length.min(PROTOCOL_MAX_LINE_LENGTH);

        let (reader, writer) = tokio::io::split(io);
        let (messages_tx, messages_rx) = mpsc::channel(config.message_buffer.max(1));
        let (private_tx, private_rx) = mpsc::channel(config.private_message_buffer.max(1));
        let (stop_tx, _) = watch::channel(false);
        let (state_tx, _) = watch::channel(LoopState::Idle);

        let client = Self {
            writer: Mutex::new(writer),
            reader: Mutex::new(Some(reader)),
            config,
            quit_sent: AtomicBool::new(false),
            stop_fired: AtomicBool::new(false),
            stop_tx,
            state_tx,
            messages: messages_tx,
            private_messages: private_tx,
        };
        let events = Events {
            messages: messages_rx,
            private_messages: private_rx,
        };
        (client, events)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Register with the server: `USER` then `NICK`.
    pub async fn connect(&self, nick: &str, real_name: &str) -> Result<()> {
        info!(nick, "registering");
        self.write_lines(&[framing::user(nick, real_name), framing::nick(nick)])
            .await
    }

    pub async fn join(&self, channel: &str, key: &str) -> Result<()> {
        self.write_lines(&[framing::join(channel, key)]).await
    }

    /// Join with the exclusive `0` limit parameter appended.
    pub async fn join_exclusive(&self, channel: &str, key: &str) -> Result<()> {
        self.write_lines(&[framing::join_exclusive(channel, key)]).await
    }

    pub async fn part(&self, channel: &str, message: &str) -> Result<()> {
        self.write_lines(&[framing::part(channel, message)]).await
    }

    /// Send `text` to `target`, split across as many `PRIVMSG` lines as the
    /// line limit requires. Nothing is written if the text cannot be framed.
    pub async fn send(&self, target: &str, text: &str) -> Result<()> {
        let lines = framing::frame_privmsg(target, text, self.config.max_line_length)?;
        self.write_lines(&lines).await
    }

    /// Send `QUIT` and signal the dispatch loop to stop.
    ///
    /// Only the first call writes the `QUIT` line and fires the stop signal;
    /// later and concurrent calls return `Ok(())` without side effects. The
    /// stop signal fires even when the write fails.
    pub async fn quit(&self, message: &str) -> Result<()> {
        if self.quit_sent.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let written = self.write_lines(&[framing::quit(message)]).await;
        self.stop();
        written
    }

    /// Signal the dispatch loop to stop without writing anything.
    ///
    /// Returns `true` for the call that actually fired the signal.
    pub fn stop(&self) -> bool {
        if self.stop_fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        info!("stop requested");
        self.stop_tx.send_replace(true);
        // Always notifies, so waiters re-check `is_stopped` even from `Idle`.
        self.state_tx.send_modify(|state| {
            if *state == LoopState::Running {
                *state = LoopState::Stopping;
            }
        });
        true
    }

    /// Whether the stop signal has fired.
    pub fn is_stopped(&self) -> bool {
        self.stop_fired.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> LoopState {
        *self.state_tx.borrow()
    }

    /// Resolve once the dispatch loop has exited. If [`listen`](Self::listen)
    /// was never started this resolves as soon as stop has been signalled.
    pub async fn wait_stopped(&self) {
        let mut state = self.state_tx.subscribe();
        let _ = state
            .wait_for(|s| match s {
                LoopState::Stopped => true,
                LoopState::Idle => self.is_stopped(),
                LoopState::Running | LoopState::Stopping => false,
            })
            .await
            .map(|_| ());
    }

    /// Run the dispatch loop until stop is signalled, the server closes the
    /// connection, or the transport fails.
    ///
    /// `PING` is answered inline and never surfaces as an event. Lines that
    /// fail to parse, and lines over the inbound length cap, are logged and
    /// skipped. Invalid UTF-8 is decoded lossily. A closed connection ends the
    /// loop with `Ok(())`; any other read error is returned.
    pub async fn listen(&self) -> Result<()> {
        let reader = self
            .reader
            .lock()
            .await
            .take()
            .ok_or(Error::AlreadyListening)?;

        let _stopped = MarkStopped(&self.state_tx);
        let mut stop = self.stop_tx.subscribe();
        if *stop.borrow_and_update() {
            info!("stop already requested, not listening");
            return Ok(());
        }
        self.state_tx.send_replace(LoopState::Running);
        info!("ready to listen");

        let mut lines = LineReader::new(reader);
        loop {
            let read = tokio::select! {
                biased;
                _ = stop_requested(&mut stop) => {
                    info!("listen exiting");
                    return Ok(());
                }
                read = lines.next_line() => read,
            };

            let line = match read {
                Ok(Some(Inbound::Line(line))) => line,
                Ok(Some(Inbound::Oversized(len))) => {
                    warn!(bytes = len, "skipping oversized line");
                    continue;
                }
                Ok(None) => {
                    info!("connection closed by server");
                    return Ok(());
                }
                Err(e) if is_closed(&e) => {
                    info!(error = %e, "connection already closed");
                    return Ok(());
                }
                Err(e) => {
                    error!(error = %e, "read failed");
                    return Err(Error::Transport(e));
                }
            };
            debug!(line = %line, "<-");

            if let Some(argument) = ping_argument(&line) {
                self.write_lines(&[framing::pong(argument)]).await?;
                continue;
            }

            let msg = match Message::parse(&line) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!(error = %e, "skipping unparseable line");
                    continue;
                }
            };

            if msg.command == "PRIVMSG" {
                let pm = match PrivateMessage::from_message(&msg, &self.config.channel_sigils) {
                    Ok(pm) => pm,
                    Err(e) => {
                        warn!(error = %e, "skipping malformed PRIVMSG");
                        continue;
                    }
                };
                tokio::select! {
                    biased;
                    _ = stop_requested(&mut stop) => {
                        info!("listen exiting with a private message undelivered");
                        return Ok(());
                    }
                    sent = self.private_messages.send(pm) => {
                        if sent.is_err() {
                            debug!("private message receiver dropped, discarding");
                        }
                    }
                }
            } else {
                match self.messages.try_send(msg) {
                    Ok(()) | Err(TrySendError::Closed(_)) => {}
                    Err(TrySendError::Full(msg)) => {
                        trace!(command = %msg.command, code = msg.reply_code, "message queue full, dropping");
                    }
                }
            }
        }
    }

    async fn write_lines(&self, lines: &[String]) -> Result<()> {
        let mut writer = self.writer.lock().await;
        for line in lines {
            debug!(line = %line, "->");
            writer.write_all(format!("{line}\r\n").as_bytes()).await?;
            writer.flush().await?;
            if !self.config.pause.is_zero() {
                tokio::time::sleep(self.config.pause).await;
            }
        }
        Ok(())
    }
}

async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|fired| *fired).await.map(|_| ());
}

/// The argument of a `PING` line, or `None` if the line is something else.
fn ping_argument(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let rest = line.strip_prefix("PING")?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

struct MarkStopped<'a>(&'a watch::Sender<LoopState>);

impl Drop for MarkStopped<'_> {
    fn drop(&mut self) {
        self.0.send_replace(LoopState::Stopped);
        info!("dispatch loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncBufReadExt, BufReader, DuplexStream, Lines, ReadBuf};
    use crate::irc::reader::MAX_INBOUND_LINE_LENGTH;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    fn test_config() -> ClientConfig {
        ClientConfig {
            pause: Duration::ZERO,
            ..ClientConfig::default()
        }
    }

    /// The server end of an in-memory connection.
    struct Server {
        lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
        writer: WriteHalf<DuplexStream>,
    }

    impl Server {
        async fn send(&mut self, line: &str) {
            self.send_raw(format!("{line}\r\n").as_bytes()).await;
        }

        async fn send_raw(&mut self, bytes: &[u8]) {
            self.writer.write_all(bytes).await.unwrap();
        }

        async fn recv(&mut self) -> String {
            timeout(WAIT, self.lines.next_line())
                .await
                .expect("timed out waiting for a line")
                .unwrap()
                .expect("client closed the connection")
        }
    }

    fn pair(config: ClientConfig) -> (Arc<Client<DuplexStream>>, Events, Server) {
        let (client_io, server_io) = tokio::io::duplex(64 * 1024);
        let (client, events) = Client::new(client_io, config);
        let (read, writer) = tokio::io::split(server_io);
        let server = Server {
            lines: BufReader::new(read).lines(),
            writer,
        };
        (Arc::new(client), events, server)
    }

    fn spawn_listen<T>(client: &Arc<Client<T>>) -> JoinHandle<Result<()>>
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        let client = Arc::clone(client);
        tokio::spawn(async move { client.listen().await })
    }

    /// A transport whose reads always fail with the given error kind.
    struct FailingRead(io::ErrorKind);

    impl AsyncRead for FailingRead {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::from(self.0)))
        }
    }

    impl AsyncWrite for FailingRead {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[test]
    fn ping_detection() {
        assert_eq!(ping_argument("PING :server123"), Some(":server123"));
        assert_eq!(ping_argument("PING server123"), Some("server123"));
        assert_eq!(ping_argument("PING"), Some(""));
        assert_eq!(ping_argument("PINGER x"), None);
        assert_eq!(ping_argument(":srv PRIVMSG #c :PING"), None);
    }

    #[tokio::test]
    async fn connect_sends_user_then_nick() {
        let (client, _events, mut server) = pair(test_config());
        client.connect("shelbot", "Sheldon Cooper").await.unwrap();
        assert_eq!(server.recv().await, "USER shelbot 8 * :Sheldon Cooper");
        assert_eq!(server.recv().await, "NICK shelbot");
    }

    #[tokio::test]
    async fn channel_operations() {
        let (client, _events, mut server) = pair(test_config());
        client.join("#bazinga", "").await.unwrap();
        client.join_exclusive("#bazinga", "key").await.unwrap();
        client.part("#bazinga", "").await.unwrap();
        client.part("#bazinga", "later").await.unwrap();
        assert_eq!(server.recv().await, "JOIN #bazinga");
        assert_eq!(server.recv().await, "JOIN #bazinga key 0");
        assert_eq!(server.recv().await, "PART #bazinga");
        assert_eq!(server.recv().await, "PART #bazinga :later");
    }

    #[tokio::test]
    async fn short_send_is_a_single_line() {
        let (client, _events, mut server) = pair(test_config());
        client.send("#c", "hello world").await.unwrap();
        client.send("#c", "next").await.unwrap();
        assert_eq!(server.recv().await, "PRIVMSG #c :hello world");
        assert_eq!(server.recv().await, "PRIVMSG #c :next");
    }

    #[tokio::test]
    async fn oversized_word_writes_nothing() {
        let (client, _events, mut server) = pair(test_config());
        let err = client.send("#c", &"y".repeat(600)).await.unwrap_err();
        assert!(matches!(err, Error::Framing { .. }));
        client.send("#c", "after").await.unwrap();
        assert_eq!(server.recv().await, "PRIVMSG #c :after");
    }

    #[tokio::test]
    async fn line_limit_is_clamped_to_protocol_ceiling() {
        let (client, _events, _server) = pair(ClientConfig {
            max_line_length: 4096,
            ..test_config()
        });
        assert_eq!(client.config().max_line_length, PROTOCOL_MAX_LINE_LENGTH);
    }

    #[tokio::test]
    async fn ping_is_answered_without_events() {
        let (client, mut events, mut server) = pair(test_config());
        let listener = spawn_listen(&client);

        server.send("PING :server123").await;
        server.send(":a!b PRIVMSG #c :after ping").await;

        assert_eq!(server.recv().await, "PONG server123");
        let pm = timeout(WAIT, events.private_messages.recv()).await.unwrap().unwrap();
        assert_eq!(pm.text, "after ping");
        assert!(events.messages.try_recv().is_err());

        client.stop();
        timeout(WAIT, listener).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn bare_ping_gets_bare_pong() {
        let (client, _events, mut server) = pair(test_config());
        let listener = spawn_listen(&client);

        server.send("PING").await;
        assert_eq!(server.recv().await, "PONG");

        client.stop();
        timeout(WAIT, listener).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn invalid_utf8_does_not_end_the_loop() {
        let (client, mut events, mut server) = pair(test_config());
        let listener = spawn_listen(&client);

        server
            .send_raw(b":a!b PRIVMSG #c :caf\xe9\r\n:a!b PRIVMSG #c :after\r\n")
            .await;

        let first = timeout(WAIT, events.private_messages.recv()).await.unwrap().unwrap();
        assert_eq!(first.text, "caf\u{FFFD}");
        let second = timeout(WAIT, events.private_messages.recv()).await.unwrap().unwrap();
        assert_eq!(second.text, "after");
        assert_eq!(client.state(), LoopState::Running);

        client.stop();
        timeout(WAIT, listener).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn oversized_inbound_line_is_skipped() {
        let (client, mut events, mut server) = pair(test_config());
        let listener = spawn_listen(&client);

        let flood = format!(":a!b PRIVMSG #c :{}", "z".repeat(MAX_INBOUND_LINE_LENGTH));
        server.send(&flood).await;
        server.send(":a!b PRIVMSG #c :still here").await;

        let pm = timeout(WAIT, events.private_messages.recv()).await.unwrap().unwrap();
        assert_eq!(pm.text, "still here");

        client.stop();
        timeout(WAIT, listener).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_sends_do_not_interleave() {
        let (client, _events, mut server) = pair(ClientConfig {
            pause: Duration::from_millis(10),
            max_line_length: 64,
            ..test_config()
        });
        let text_a = "alpha ".repeat(30);
        let text_b = "bravo ".repeat(30);
        let lines_a = framing::frame_privmsg("#a", &text_a, 64).unwrap();
        let lines_b = framing::frame_privmsg("#b", &text_b, 64).unwrap();
        assert!(lines_a.len() > 2 && lines_b.len() > 2);

        let (a, b) = tokio::join!(client.send("#a", &text_a), client.send("#b", &text_b));
        a.unwrap();
        b.unwrap();

        let mut received = Vec::new();
        for _ in 0..lines_a.len() + lines_b.len() {
            received.push(server.recv().await);
        }
        let a_first: Vec<String> = lines_a.iter().chain(&lines_b).cloned().collect();
        let b_first: Vec<String> = lines_b.iter().chain(&lines_a).cloned().collect();
        assert!(
            received == a_first || received == b_first,
            "lines interleaved: {received:#?}"
        );
    }

    #[tokio::test]
    async fn routes_messages_to_their_queues() {
        let (client, mut events, mut server) = pair(test_config());
        let listener = spawn_listen(&client);

        server.send(":irc.example.net 001 shelbot :Welcome").await;
        server.send("this-is-not-valid").await;
        server.send(":a!b PRIVMSG #c :hello world").await;
        server.send(":a!b PRIVMSG #c no colon here").await;
        server.send(":a!b PRIVMSG shelbot :psst").await;

        let first = timeout(WAIT, events.private_messages.recv()).await.unwrap().unwrap();
        assert_eq!(first.nick, "a");
        assert_eq!(first.user, "b");
        assert_eq!(first.channel, "#c");
        assert_eq!(first.text, "hello world");
        assert_eq!(first.reply_channel, "#c");

        let second = timeout(WAIT, events.private_messages.recv()).await.unwrap().unwrap();
        assert_eq!(second.text, "psst");
        assert_eq!(second.reply_channel, "a");

        let welcome = events.messages.try_recv().unwrap();
        assert_eq!(welcome.reply_code, 1);
        assert_eq!(welcome.origin, "irc.example.net");
        assert!(events.messages.try_recv().is_err());

        drop(server);
        timeout(WAIT, listener).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn generic_messages_drop_when_queue_is_full() {
        let (client, mut events, mut server) = pair(ClientConfig {
            message_buffer: 1,
            ..test_config()
        });
        let listener = spawn_listen(&client);

        server.send(":srv NOTICE * :first").await;
        server.send(":srv NOTICE * :second").await;
        server.send(":srv NOTICE * :third").await;
        server.send(":a!b PRIVMSG #c :sync").await;
        timeout(WAIT, events.private_messages.recv()).await.unwrap().unwrap();

        let kept = events.messages.try_recv().unwrap();
        assert_eq!(kept.parameters, "* :first");
        assert!(events.messages.try_recv().is_err());

        client.stop();
        timeout(WAIT, listener).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn private_messages_are_never_dropped() {
        let (client, mut events, mut server) = pair(test_config());
        let listener = spawn_listen(&client);

        for i in 0..20 {
            server.send(&format!(":a!b PRIVMSG #c :message {i}")).await;
        }
        for i in 0..20 {
            let pm = timeout(WAIT, events.private_messages.recv()).await.unwrap().unwrap();
            assert_eq!(pm.text, format!("message {i}"));
        }

        client.stop();
        timeout(WAIT, listener).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn stop_interrupts_blocked_delivery() {
        let (client, _events, mut server) = pair(test_config());
        let listener = spawn_listen(&client);

        // Capacity is 1 and nobody receives, so the loop blocks on the second.
        server.send(":a!b PRIVMSG #c :one").await;
        server.send(":a!b PRIVMSG #c :two").await;
        server.send("PING :sync").await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(client.stop());
        timeout(WAIT, listener).await.unwrap().unwrap().unwrap();
        assert_eq!(client.state(), LoopState::Stopped);
    }

    #[tokio::test]
    async fn concurrent_quit_fires_once() {
        let (client, _events, mut server) = pair(test_config());
        let listener = spawn_listen(&client);

        let (a, b) = tokio::join!(client.quit("Bazinga!"), client.quit("Bazinga!"));
        a.unwrap();
        b.unwrap();
        assert!(client.is_stopped());
        assert!(!client.stop());

        timeout(WAIT, client.wait_stopped()).await.unwrap();
        timeout(WAIT, listener).await.unwrap().unwrap().unwrap();
        assert_eq!(client.state(), LoopState::Stopped);

        client.send("#c", "still writable").await.unwrap();
        assert_eq!(server.recv().await, "QUIT :Bazinga!");
        assert_eq!(server.recv().await, "PRIVMSG #c :still writable");
    }

    #[tokio::test]
    async fn wait_stopped_without_listen() {
        let (client, _events, _server) = pair(test_config());
        assert_eq!(client.state(), LoopState::Idle);

        let waiter = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.wait_stopped().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        client.stop();
        timeout(WAIT, waiter).await.unwrap().unwrap();

        // A listen after stop returns immediately.
        client.listen().await.unwrap();
        assert_eq!(client.state(), LoopState::Stopped);
    }

    #[tokio::test]
    async fn listen_only_once() {
        let (client, _events, server) = pair(test_config());
        let listener = spawn_listen(&client);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(matches!(client.listen().await, Err(Error::AlreadyListening)));

        drop(server);
        timeout(WAIT, listener).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn eof_is_a_clean_exit() {
        let (client, _events, server) = pair(test_config());
        drop(server);
        timeout(WAIT, client.listen()).await.unwrap().unwrap();
        assert_eq!(client.state(), LoopState::Stopped);
    }

    #[tokio::test]
    async fn closed_read_is_a_clean_exit() {
        let (client, _events) =
            Client::new(FailingRead(io::ErrorKind::NotConnected), test_config());
        timeout(WAIT, client.listen()).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn read_error_is_surfaced() {
        let (client, _events) =
            Client::new(FailingRead(io::ErrorKind::ConnectionReset), test_config());
        let err = timeout(WAIT, client.listen()).await.unwrap().unwrap_err();
        match err {
            Error::Transport(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("expected transport error, got {other:?}"),
        }
        assert_eq!(client.state(), LoopState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn every_line_is_followed_by_the_pause() {
        let (client, _events, mut server) = pair(ClientConfig {
            pause: Duration::from_secs(1),
            ..test_config()
        });

        let started = tokio::time::Instant::now();
        client.connect("shelbot", "Sheldon").await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));

        assert_eq!(server.recv().await, "USER shelbot 8 * :Sheldon");
        assert_eq!(server.recv().await, "NICK shelbot");
    }
}
