//! Registry of live order-notification connections with broadcast fan-out.
//!
//! Each registered connection owns an unbounded queue drained by its own
//! writer task, so a slow client buffers instead of stalling the fan-out.
//! The registry map itself sits behind a single mutex; add, remove, and
//! broadcast are each one serialized critical section. Fine at the tens to
//! low hundreds of connections this server sees.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Identity of a registered connection. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(u64);

impl std::fmt::Display for ConnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A live connection's registration. Dropping the receiver (or the whole
/// registration) makes the next broadcast evict the entry.
pub struct Registration {
    pub id: ConnId,
    pub rx: UnboundedReceiver<String>,
}

/// Tracks live connections and fans messages out to all of them.
///
/// Owned by the composition root and shared via router state. Once a
/// connection is registered the hub owns its lifecycle: removal drops the
/// sender, which ends the writer task and closes the socket.
pub struct Hub {
    clients: Mutex<HashMap<ConnId, UnboundedSender<String>>>,
    next_id: AtomicU64,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new connection. Returns its id and the receiving end of
    /// its message queue.
    pub fn register(&self) -> Registration {
        let id = ConnId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.lock().unwrap().insert(id, tx);
        Registration { id, rx }
    }

    /// Remove a connection. No-op if it was already evicted.
    pub fn unregister(&self, id: ConnId) {
        if self.clients.lock().unwrap().remove(&id).is_some() {
            debug!(conn = %id, "connection unregistered");
        }
    }

    /// Send `payload` to every live connection. A dead connection does not
    /// abort delivery to the rest; it is evicted in the same pass. Returns
    /// the number of connections the payload was queued for.
    pub fn broadcast(&self, payload: &str) -> usize {
        let mut clients = self.clients.lock().unwrap();
        let mut delivered = 0;
        clients.retain(|id, tx| {
            if tx.send(payload.to_string()).is_ok() {
                delivered += 1;
                true
            } else {
                debug!(conn = %id, "evicting dead connection during broadcast");
                false
            }
        });
        delivered
    }

    /// Number of currently registered connections.
    pub fn client_count(&self) -> usize {
        self.clients.lock().unwrap().len()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}
