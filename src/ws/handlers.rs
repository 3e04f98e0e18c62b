//! Inbound frame dispatch for the echo endpoint
//!
//! Text frames are answered on the same connection, close frames end the
//! session, everything else is ignored.

use axum::extract::ws::Message;
use futures::stream::{Stream, StreamExt};

use crate::error::TransportError;
use crate::protocol::format_reply;
use crate::registry::{Connection, ConnectionManager};
use crate::types::Disconnect;

/// What the loop does after a frame has been handled
#[derive(Debug, PartialEq)]
pub enum Flow {
    Continue,
    Stop(Disconnect),
}

/// Handle a single inbound frame
pub async fn handle_frame(
    frame: Message,
    connection: &Connection,
    registry: &ConnectionManager,
) -> Result<Flow, TransportError> {
    match frame {
        Message::Text(text) => {
            tracing::debug!(conn_id = %connection.id(), len = text.as_str().len(), "Received message");
            registry
                .send_to(connection, &format_reply(text.as_str()))
                .await?;
            Ok(Flow::Continue)
        }
        Message::Close(frame) => {
            let (code, reason) = match frame {
                Some(f) => (Some(f.code), f.reason.as_str().to_owned()),
                None => (None, String::new()),
            };
            Ok(Flow::Stop(Disconnect::Closed { code, reason }))
        }
        Message::Binary(data) => {
            tracing::debug!(
                conn_id = %connection.id(),
                len = data.len(),
                "Ignoring binary frame"
            );
            Ok(Flow::Continue)
        }
        // Pings are answered by the transport when it next flushes
        Message::Ping(_) | Message::Pong(_) => Ok(Flow::Continue),
    }
}

/// Receive frames until the peer disconnects or the transport fails.
///
/// Each reply is sent before the next frame is read, so replies keep the
/// order of the frames that caused them.
pub async fn run_echo_loop<S>(
    receiver: &mut S,
    connection: &Connection,
    registry: &ConnectionManager,
) -> Result<Disconnect, TransportError>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    while let Some(frame) = receiver.next().await {
        let frame = frame.map_err(|source| TransportError::Receive {
            id: connection.id(),
            source,
        })?;

        if let Flow::Stop(disconnect) = handle_frame(frame, connection, registry).await? {
            return Ok(disconnect);
        }
    }

    Ok(Disconnect::StreamEnded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::{channel_connection, text_of};
    use axum::extract::ws::CloseFrame;
    use futures::stream;

    fn text(s: &str) -> Result<Message, axum::Error> {
        Ok(Message::Text(s.to_string().into()))
    }

    #[tokio::test]
    async fn test_text_frame_is_echoed_with_prefix() {
        let registry = ConnectionManager::new();
        let (conn, mut rx) = channel_connection();

        let flow = handle_frame(Message::Text("hello".to_string().into()), &conn, &registry)
            .await
            .unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(text_of(rx.next().await.unwrap()), "Message received: hello");
    }

    #[tokio::test]
    async fn test_replies_keep_frame_order() {
        let registry = ConnectionManager::new();
        let (conn, mut rx) = channel_connection();
        let mut inbound = stream::iter(vec![text("one"), text(""), text("three")]);

        let outcome = run_echo_loop(&mut inbound, &conn, &registry).await.unwrap();

        assert_eq!(outcome, Disconnect::StreamEnded);
        assert_eq!(text_of(rx.next().await.unwrap()), "Message received: one");
        assert_eq!(text_of(rx.next().await.unwrap()), "Message received: ");
        assert_eq!(text_of(rx.next().await.unwrap()), "Message received: three");
    }

    #[tokio::test]
    async fn test_close_frame_stops_loop() {
        let registry = ConnectionManager::new();
        let (conn, mut rx) = channel_connection();
        let close = Message::Close(Some(CloseFrame {
            code: 1000,
            reason: "bye".to_string().into(),
        }));
        let mut inbound = stream::iter(vec![text("before"), Ok(close), text("after")]);

        let outcome = run_echo_loop(&mut inbound, &conn, &registry).await.unwrap();

        assert_eq!(
            outcome,
            Disconnect::Closed {
                code: Some(1000),
                reason: "bye".to_string()
            }
        );
        assert_eq!(text_of(rx.next().await.unwrap()), "Message received: before");
        assert!(rx.try_next().is_err(), "frames after close are not read");
    }

    #[tokio::test]
    async fn test_control_and_binary_frames_get_no_reply() {
        let registry = ConnectionManager::new();
        let (conn, mut rx) = channel_connection();
        let mut inbound = stream::iter(vec![
            Ok(Message::Binary(vec![1u8, 2, 3].into())),
            Ok(Message::Ping(vec![9u8].into())),
            Ok(Message::Pong(vec![7u8].into())),
        ]);

        let outcome = run_echo_loop(&mut inbound, &conn, &registry).await.unwrap();

        assert_eq!(outcome, Disconnect::StreamEnded);
        assert!(rx.try_next().is_err(), "no frame is written back");
    }

    #[tokio::test]
    async fn test_receive_error_is_reported() {
        let registry = ConnectionManager::new();
        let (conn, _rx) = channel_connection();
        let broken = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let mut inbound = stream::iter(vec![Err(axum::Error::new(broken))]);

        let err = run_echo_loop(&mut inbound, &conn, &registry)
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Receive { .. }));
    }

    #[tokio::test]
    async fn test_send_error_is_reported() {
        let registry = ConnectionManager::new();
        let (conn, rx) = channel_connection();
        drop(rx);
        let mut inbound = stream::iter(vec![text("lost")]);

        let err = run_echo_loop(&mut inbound, &conn, &registry)
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Send { .. }));
    }
}
