//! In-process connection pair backed by tokio channels.

use tokio::sync::{mpsc, Mutex};

use crate::{next_connection_id, Connection, ConnectionId, TransportError};

/// One end of an in-memory, message-oriented connection.
///
/// Created in pairs with [`MemoryConnection::pair`]. Frames are delivered
/// whole and in order. Closing (or dropping) one end makes the other end's
/// `recv` return `Ok(None)` after it has drained anything already sent.
pub struct MemoryConnection {
    id: ConnectionId,
    tx: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl MemoryConnection {
    /// Creates two connected ends. Whatever one sends, the other receives.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        let a = Self {
            id: next_connection_id(),
            tx: Mutex::new(Some(a_tx)),
            rx: Mutex::new(a_rx),
        };
        let b = Self {
            id: next_connection_id(),
            tx: Mutex::new(Some(b_tx)),
            rx: Mutex::new(b_rx),
        };
        (a, b)
    }
}

impl Connection for MemoryConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let tx = self.tx.lock().await;
        let Some(tx) = tx.as_ref() else {
            return Err(TransportError::ConnectionClosed(
                "send after local close".into(),
            ));
        };
        tx.send(data.to_vec()).map_err(|_| {
            TransportError::ConnectionClosed("peer dropped".into())
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.rx.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), TransportError> {
        // Dropping the sender is what the peer observes as a close.
        self.tx.lock().await.take();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
