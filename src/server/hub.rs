//! Broadcast hub: the set of connected preview clients.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use axum::extract::ws::Message;
use tokio::sync::mpsc;

use super::types::ChangeMessage;
use crate::error::{PreviewError, Result};

/// Outbound frames queued per client before its socket task drains them.
/// A client that falls further behind than this simply misses updates.
const CLIENT_QUEUE: usize = 32;

/// Connection set for one preview session.
///
/// Clients register on socket upgrade and deregister when their socket
/// closes or errors; there is no heartbeat probing in between. `broadcast`
/// serializes a message once and fans the identical frame out to every
/// registered client.
pub struct BroadcastHub {
    clients: Mutex<HashMap<u64, mpsc::Sender<Message>>>,
    next_id: AtomicU64,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a connection. Returns its id and the outbound frame queue
    /// the socket task drains.
    pub fn register(&self) -> Result<(u64, mpsc::Receiver<Message>)> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE);
        self.clients
            .lock()
            .map_err(|_| PreviewError::LockPoisoned)?
            .insert(id, tx);
        Ok((id, rx))
    }

    /// Drop a connection from the set. Safe to call more than once.
    pub fn deregister(&self, id: u64) {
        if let Ok(mut clients) = self.clients.lock() {
            clients.remove(&id);
        }
    }

    /// Serialize `message` once and hand the frame to every open client.
    ///
    /// A client whose queue is full misses this update but stays
    /// registered; a client whose queue is closed is dropped from the set.
    /// Returns the number of clients the frame reached.
    pub fn broadcast(&self, message: &ChangeMessage) -> usize {
        let frame = Message::Text(message.to_json().into());
        let Ok(mut clients) = self.clients.lock() else {
            return 0;
        };
        let mut delivered = 0;
        clients.retain(|_, tx| match tx.try_send(frame.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            // Not ready right now: skip this update, keep the client.
            Err(mpsc::error::TrySendError::Full(_)) => true,
            // Socket task is gone: forget the client.
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        delivered
    }

    /// Number of currently registered clients.
    pub fn client_count(&self) -> usize {
        self.clients.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Disconnect every client and empty the set.
    ///
    /// Dropping a client's sender ends its outbound queue, which tells the
    /// socket task to send a close frame and exit.
    pub fn close(&self) {
        if let Ok(mut clients) = self.clients.lock() {
            clients.clear();
        }
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
