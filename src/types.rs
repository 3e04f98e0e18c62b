use serde::Serialize;
use std::fmt;
use ulid::Ulid;

/// Opaque identity of one accepted WebSocket session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(Ulid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why an endpoint loop stopped without a transport error
#[derive(Debug, Clone, PartialEq)]
pub enum Disconnect {
    /// Peer sent a close frame
    Closed { code: Option<u16>, reason: String },
    /// Inbound stream ended without a close frame
    StreamEnded,
}
