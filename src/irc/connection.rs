//! TCP connection setup for the chat server.

use crate::error::{ChatMorseError, Result};
use tokio::net::TcpStream;

/// Login and channel details sent right after connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth token, usually `oauth:...`.
    pub token: String,
    pub nickname: String,
    /// Channel to join, with or without the leading `#`.
    pub channel: String,
}

/// Open a plaintext TCP connection.
///
/// No timeout is applied; a host that never answers blocks until the OS
/// gives up.
pub async fn connect(server: &str, port: u16) -> Result<TcpStream> {
    let stream = TcpStream::connect((server, port))
        .await
        .map_err(|e| ChatMorseError::Connection {
            message: format!("Failed to connect to {}:{}: {}", server, port, e),
        })?;
    stream
        .set_nodelay(true)
        .map_err(|e| ChatMorseError::Connection {
            message: format!("Failed to configure socket: {}", e),
        })?;
    Ok(stream)
}
