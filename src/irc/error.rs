use std::io;

/// Errors produced by the IRC protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An inbound line could not be parsed into a [`Message`](super::Message).
    #[error("malformed message: {0:?}")]
    MalformedMessage(String),

    /// A `PRIVMSG` had no `:`-delimited text segment.
    #[error("malformed PRIVMSG parameters: {0:?}")]
    MalformedParameters(String),

    /// An outbound line cannot be framed within the line length limit.
    #[error("cannot frame line within {limit} bytes: {reason}")]
    Framing { limit: usize, reason: String },

    /// The transport failed. Fatal to the dispatch loop.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("client is already listening")]
    AlreadyListening,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Whether a read error means the connection was already closed, which the
/// dispatch loop treats as a clean shutdown rather than a failure.
pub fn is_closed(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::UnexpectedEof | io::ErrorKind::NotConnected | io::ErrorKind::ConnectionAborted
    )
}
