//! Chat protocol plumbing: byte framing, line classification, connection.

pub mod connection;
pub mod framer;
pub mod message;

pub use connection::{Credentials, connect};
pub use framer::LineFramer;
pub use message::{ChatMessage, Inbound, Outbound, parse_line};
