//! shelbot: an IRC karma bot built on a small async IRC line-protocol client.
//!
//! The [`irc`] module is usable on its own: bind a [`irc::Client`] to any
//! connected `AsyncRead + AsyncWrite` stream, drive [`irc::Client::listen`]
//! on a task, and consume the [`irc::Events`] queues.

pub mod bot;
pub mod config;
pub mod irc;
pub mod logging;
