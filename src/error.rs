use crate::types::ConnectionId;

/// Registry contract violations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("connection {0} is not tracked by the registry")]
    NotTracked(ConnectionId),
}

/// Send or receive failure on a single connection, other than a clean close
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("send to connection {id} failed: {source}")]
    Send {
        id: ConnectionId,
        #[source]
        source: axum::Error,
    },

    #[error("receive on connection {id} failed: {source}")]
    Receive {
        id: ConnectionId,
        #[source]
        source: axum::Error,
    },
}

impl TransportError {
    pub fn connection_id(&self) -> ConnectionId {
        match self {
            Self::Send { id, .. } | Self::Receive { id, .. } => *id,
        }
    }
}

/// Process-level failures that stop the server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}
