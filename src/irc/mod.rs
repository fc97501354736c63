//! IRC line protocol: inbound parsing, outbound framing, and the client
//! connection that ties them to a transport.

pub mod connection;
pub mod error;
pub mod framing;
pub mod message;
pub mod privmsg;
pub mod reader;

pub use connection::{Client, ClientConfig, Events, LoopState};
pub use error::{Error, Result};
pub use framing::frame_privmsg;
pub use message::Message;
pub use privmsg::PrivateMessage;
