//! Registry of connected player channels.
//!
//! The engine only ever talks to players through this registry, which hands
//! each peer a typed message sender. Production bridges the sender to a
//! WebSocket; tests plug in plain channels and read the messages back.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::dto::wire::HostMessage;

#[derive(Clone)]
/// Handle used to push messages to a connected player.
pub struct PeerConnection {
    /// Opaque channel identifier; doubles as the player id in the roster.
    pub id: Uuid,
    /// Typed outbound message channel for this peer.
    pub tx: mpsc::UnboundedSender<HostMessage>,
}

/// Per-peer logical channels keyed by their identifier.
#[derive(Default)]
pub struct PeerRegistry {
    peers: DashMap<Uuid, PeerConnection>,
}

impl PeerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer channel, replacing any previous one under the same id.
    pub fn insert(&self, connection: PeerConnection) {
        self.peers.insert(connection.id, connection);
    }

    /// Drop a peer channel. The roster entry, if any, is untouched.
    pub fn remove(&self, id: &Uuid) {
        self.peers.remove(id);
    }

    /// Whether a peer channel is currently connected.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.peers.contains_key(id)
    }

    /// Number of connected peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Whether no peer is connected.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Send a message to a single peer. A closed channel drops the
    /// registration; an unknown peer is ignored (disconnected players stay
    /// on the roster and simply miss the message).
    pub fn send(&self, id: &Uuid, message: HostMessage) -> bool {
        let Some(connection) = self.peers.get(id) else {
            return false;
        };
        let tx = connection.tx.clone();
        drop(connection);

        if tx.send(message).is_err() {
            warn!(peer = %id, "peer channel closed, dropping connection");
            self.peers.remove(id);
            return false;
        }
        true
    }

    /// Send a message to every connected peer.
    pub fn broadcast(&self, message: &HostMessage) {
        let ids: Vec<Uuid> = self.peers.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            self.send(&id, message.clone());
        }
    }

    /// Remove every peer channel, closing the outbound side of each socket.
    pub fn clear(&self) {
        self.peers.clear();
    }
}
