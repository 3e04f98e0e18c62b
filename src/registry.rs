//! Connection registry: the set of open WebSocket sessions plus unicast and
//! broadcast send primitives.
//!
//! The registry never creates or closes sockets. Endpoint tasks `add` a
//! connection right after the upgrade completes and `remove` it exactly once
//! when their loop ends.

use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::sink::{Sink, SinkExt};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::error::{RegistryError, TransportError};
use crate::types::ConnectionId;

/// Outbound half of a WebSocket, boxed so tests can substitute channels
pub type OutboundSink = Pin<Box<dyn Sink<Message, Error = axum::Error> + Send>>;

/// One open session. Sends are serialized through the inner mutex, so a
/// connection's own frames go out in the order they were issued.
pub struct Connection {
    id: ConnectionId,
    connected_at: DateTime<Utc>,
    sender: Mutex<OutboundSink>,
}

impl Connection {
    pub fn new<S>(sender: S) -> Self
    where
        S: Sink<Message, Error = axum::Error> + Send + 'static,
    {
        Self {
            id: ConnectionId::new(),
            connected_at: Utc::now(),
            sender: Mutex::new(Box::pin(sender)),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Send one text frame to this peer
    pub async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.send(Message::Text(text.to_owned().into())).await
    }

    async fn send(&self, message: Message) -> Result<(), TransportError> {
        let mut sender = self.sender.lock().await;
        sender
            .send(message)
            .await
            .map_err(|source| TransportError::Send {
                id: self.id,
                source,
            })
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}

/// Per-recipient outcome of a [`ConnectionManager::broadcast`]
#[derive(Debug, Default)]
pub struct BroadcastReport {
    /// Number of recipients the frame was written to
    pub delivered: usize,
    /// Recipients whose send failed, in registry order
    pub failed: Vec<(ConnectionId, TransportError)>,
}

impl BroadcastReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Shared registry of open connections, in insertion order.
///
/// Cloning is cheap and every clone refers to the same registry.
#[derive(Clone, Default)]
pub struct ConnectionManager {
    connections: Arc<RwLock<Vec<Arc<Connection>>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a connection whose handshake already succeeded.
    /// Adding an id that is already tracked leaves the registry unchanged.
    pub async fn add(&self, connection: Arc<Connection>) {
        let mut connections = self.connections.write().await;
        if connections.iter().any(|c| c.id == connection.id) {
            tracing::debug!(conn_id = %connection.id, "Connection already tracked");
            return;
        }
        tracing::debug!(conn_id = %connection.id, "Tracking connection");
        connections.push(connection);
    }

    /// Stop tracking a connection.
    ///
    /// Removing an id that is not tracked is a caller bug and returns
    /// [`RegistryError::NotTracked`].
    pub async fn remove(&self, id: ConnectionId) -> Result<Arc<Connection>, RegistryError> {
        let mut connections = self.connections.write().await;
        let index = connections
            .iter()
            .position(|c| c.id == id)
            .ok_or(RegistryError::NotTracked(id))?;
        Ok(connections.remove(index))
    }

    /// Unicast to exactly one connection
    pub async fn send_to(&self, connection: &Connection, text: &str) -> Result<(), TransportError> {
        connection.send_text(text).await
    }

    /// Send `text` to every tracked connection.
    ///
    /// Works on a snapshot taken under the read lock; the lock is released
    /// before any I/O so connects and disconnects are never blocked by a slow
    /// peer. Sends run concurrently and a failure on one recipient does not
    /// affect the others. Failed recipients stay registered: their own
    /// endpoint loop owns removal.
    pub async fn broadcast(&self, text: &str) -> BroadcastReport {
        let snapshot: Vec<Arc<Connection>> = self.connections.read().await.clone();

        let outcomes = join_all(snapshot.iter().map(|c| c.send_text(text))).await;

        let mut report = BroadcastReport::default();
        for (connection, outcome) in snapshot.iter().zip(outcomes) {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(conn_id = %connection.id, error = %e, "Broadcast send failed");
                    report.failed.push((connection.id, e));
                }
            }
        }

        tracing::debug!(
            delivered = report.delivered,
            failed = report.failed.len(),
            "Broadcast finished"
        );
        report
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.iter().any(|c| c.id == id)
    }

    /// Tracked ids in registry order
    pub async fn ids(&self) -> Vec<ConnectionId> {
        self.connections.read().await.iter().map(|c| c.id).collect()
    }
}
