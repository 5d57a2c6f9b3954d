//! Broadcast hub feeding the presentation SSE stream.

use tokio::sync::broadcast;

use crate::dto::events::ServerEvent;

/// Simple broadcast hub wrapper used by the SSE services.
///
/// The game engine publishes every externally visible state change here so
/// any presentation layer (host screen, projector view) can follow along
/// without the engine knowing about it.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
